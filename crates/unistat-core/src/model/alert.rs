use serde::{Deserialize, Serialize};

use super::Attributes;

/// A controller-raised alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub archived: bool,
    pub message: String,
    /// The full raw alarm, passed through as attributes.
    pub fields: Attributes,
}
