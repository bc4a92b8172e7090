//! Value types shared by snippets and projects: access mode, expiry
//! duration classes, and share-id generation.

use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Who may edit a shared snippet or project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    #[serde(rename = "editable")]
    Editable,
    #[serde(rename = "read-only")]
    ReadOnly,
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::Editable
    }
}

impl AccessMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "editable" => Some(Self::Editable),
            "read-only" => Some(Self::ReadOnly),
            _ => None,
        }
    }
}

/// The fixed set of expiry duration classes a share may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiresIn {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "2d")]
    TwoDays,
    #[serde(rename = "3d")]
    ThreeDays,
}

impl Default for ExpiresIn {
    fn default() -> Self {
        Self::OneHour
    }
}

impl ExpiresIn {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1m" => Some(Self::OneMinute),
            "1h" => Some(Self::OneHour),
            "24h" => Some(Self::OneDay),
            "2d" => Some(Self::TwoDays),
            "3d" => Some(Self::ThreeDays),
            _ => None,
        }
    }

    pub fn duration_ms(self) -> i64 {
        match self {
            Self::OneMinute => 60_000,
            Self::OneHour => 3_600_000,
            Self::OneDay => 86_400_000,
            Self::TwoDays => 172_800_000,
            Self::ThreeDays => 259_200_000,
        }
    }

    /// Absolute expiry timestamp for a share whose duration class was set
    /// (or changed) at `from`.
    pub fn expires_at(self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + Duration::milliseconds(self.duration_ms())
    }
}

/// Generate a random 8-character public identifier for a share link.
pub fn generate_share_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
