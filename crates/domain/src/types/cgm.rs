//! Canonical CGM readings

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Glucose concentration in mmol/L.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mmoll(pub f32);

impl From<f64> for Mmoll {
    fn from(value: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self(value as f32)
    }
}

impl fmt::Display for Mmoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<f32> for Mmoll {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

/// One stored reading. The store keeps at most one entry per timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CgmEntry {
    pub timestamp: DateTime<Utc>,
    pub mmoll: Mmoll,
}

impl CgmEntry {
    pub fn new(timestamp: DateTime<Utc>, mmoll: impl Into<Mmoll>) -> Self {
        Self { timestamp, mmoll: mmoll.into() }
    }
}

impl fmt::Display for CgmEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.mmoll, self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}
