//! Correlation IDs
//!
//! Opaque identifiers that link a user-visible error message to the
//! detailed diagnostic log entry for the same failure.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Correlation identifier: `YYYYMMDD_HHMMSS-xxxxxxxx`
///
/// The timestamp prefix keeps ids sortable and easy to match against
/// log lines; the random suffix keeps two failures in the same second apart.
///
/// Usage:
/// ```
/// use kernel::correlation::CorrelationId;
/// let id = CorrelationId::generate();
/// assert_eq!(id.as_str().len(), 24);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new id stamped with the current UTC time
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate a new id stamped with the given time
    pub fn generate_at(at: DateTime<Utc>) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", at.format("%Y%m%d_%H%M%S"), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}
