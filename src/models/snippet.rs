use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::share::{AccessMode, ExpiresIn};

/// A single shared file, reachable by its share-id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: String,
    pub filename: String,
    pub language: String,
    pub content: String,
    pub share_id: String,
    #[serde(rename = "type")]
    pub access: AccessMode,
    pub expires_in: ExpiresIn,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    pub fn new(
        filename: String,
        language: String,
        content: String,
        access: AccessMode,
        expires_in: ExpiresIn,
        share_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            filename,
            language,
            content,
            share_id,
            access,
            expires_in,
            expires_at: expires_in.expires_at(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Change the duration class, recomputing the absolute expiry from now.
    pub fn set_expires_in(&mut self, expires_in: ExpiresIn) {
        self.expires_in = expires_in;
        self.expires_at = expires_in.expires_at(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snippet {
        Snippet::new(
            "main.rs".to_string(),
            "rust".to_string(),
            "fn main() {}".to_string(),
            AccessMode::Editable,
            ExpiresIn::OneHour,
            "abc12345".to_string(),
        )
    }

    #[test]
    fn test_new_computes_expiry_from_creation() {
        let snippet = sample();
        let offset = (snippet.expires_at - snippet.created_at).num_milliseconds();
        assert_eq!(offset, 3_600_000);
    }

    #[test]
    fn test_set_expires_in_recomputes_from_now() {
        let mut snippet = sample();
        let before = Utc::now();
        snippet.set_expires_in(ExpiresIn::OneDay);
        assert_eq!(snippet.expires_in, ExpiresIn::OneDay);
        let offset = (snippet.expires_at - before).num_milliseconds();
        // Recomputed from "now", not from original creation time.
        assert!((offset - 86_400_000).abs() < 1_000);
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["shareId"], "abc12345");
        assert_eq!(value["type"], "editable");
        assert_eq!(value["expiresIn"], "1h");
    }
}
