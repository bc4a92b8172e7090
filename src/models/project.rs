use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::share::{AccessMode, ExpiresIn};

/// A named multi-file container, reachable by its slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub access: AccessMode,
    pub expires_in: ExpiresIn,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, access: AccessMode, expires_in: ExpiresIn, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            access,
            expires_in,
            expires_at: expires_in.expires_at(now),
            created_at: now,
        }
    }

    /// Change the duration class, recomputing the absolute expiry from now.
    pub fn set_expires_in(&mut self, expires_in: ExpiresIn) {
        self.expires_in = expires_in;
        self.expires_at = expires_in.expires_at(Utc::now());
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
