//! Audit log vocabulary.
//!
//! Every membership change is recorded as an operation row whose `action`
//! column holds one of the strings below.

use serde::{Deserialize, Serialize};

/// Stored value for a membership insertion.
pub const ACTION_ADD: &str = "add";

/// Stored value for a membership removal.
pub const ACTION_DELETE: &str = "delete";

/// The kind of membership change an operation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationAction {
    Add,
    Delete,
}

impl OperationAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => ACTION_ADD,
            Self::Delete => ACTION_DELETE,
        }
    }

    /// Parse a stored action string. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ACTION_ADD => Some(Self::Add),
            ACTION_DELETE => Some(Self::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
