use crate::types::DbId;

/// Domain errors surfaced by segment and membership operations.
///
/// Every variant except [`CoreError::Internal`] is a caller error and carries
/// the name of the request field it relates to (see [`CoreError::field`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("{slug} doesn't exist")]
    SegmentMissing { slug: String },

    #[error("User ({user_id}) doesn't have segment {slug}")]
    UserLacksSegment { user_id: DbId, slug: String },

    #[error("segment {slug} doesn't exist")]
    SegmentDoesNotExist { slug: String },

    #[error("{slug} already exists")]
    AlreadyExists { slug: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The request field this error is attributed to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::SegmentMissing { .. } => Some("segments_to_add"),
            Self::UserLacksSegment { .. } => Some("segments_to_delete"),
            Self::SegmentDoesNotExist { .. } | Self::AlreadyExists { .. } => Some("slug"),
            Self::Internal(_) => None,
        }
    }
}
