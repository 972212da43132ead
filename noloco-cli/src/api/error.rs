//! API error types

use thiserror::Error;

/// Failure of a single call against the Noloco API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A key cannot be sent as a header value
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl ApiError {
    /// Build a decode error for the given response context
    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// HTTP status code if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode { .. } | Self::InvalidCredentials(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_))
            || matches!(self.status(), Some(401) | Some(403))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ApiError::Status {
            status: 404,
            body: "table not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (404): table not found");
        assert!(err.is_not_found());
        assert!(!err.is_auth_error());
    }

    #[test]
    fn test_decode_error_has_no_status() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::decode("table schema", source);
        assert_eq!(err.status(), None);
        assert!(err.to_string().starts_with("Failed to decode table schema"));
    }

    #[test]
    fn test_invalid_credentials_count_as_auth_error() {
        let err = ApiError::InvalidCredentials("account key".to_string());
        assert_eq!(err.status(), None);
        assert!(err.is_auth_error());
        assert_eq!(err.to_string(), "Invalid credentials: account key");
    }
}
