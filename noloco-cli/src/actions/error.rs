//! Per-item action errors

use thiserror::Error;

use crate::api::ApiError;
use crate::api::query::FilterError;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("At least one field must be provided for update")]
    EmptyUpdate,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the remote API rather than the input
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

/// Failure that aborted a batch, tagged with the offending item
#[derive(Debug, Error)]
#[error("Item {index}: {source}")]
pub struct ItemError {
    pub index: usize,
    #[source]
    pub source: ActionError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ActionError::EmptyUpdate.to_string(),
            "At least one field must be provided for update"
        );
        assert_eq!(
            ActionError::MissingParameter("app".into()).to_string(),
            "Missing required parameter 'app'"
        );

        let err = ItemError {
            index: 2,
            source: ActionError::invalid("limit", "must be a positive number"),
        };
        assert_eq!(
            err.to_string(),
            "Item 2: Invalid value for parameter 'limit': must be a positive number"
        );
    }

    #[test]
    fn test_filter_error_converts() {
        let err: ActionError = crate::api::FilterExpression::parse("{nope").unwrap_err().into();
        assert!(err.to_string().starts_with("Invalid filter JSON format"));
        assert!(!err.is_remote());
    }
}
