//! Error types
//!
//! Every manager operation returns [`Result`]. "Does not exist" answers from
//! existence checks are not errors; they come back as `false`.

use crate::geoserver::paths::ResourceKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with an unexpected status code
    #[error("{operation} {kind} '{name}' failed with status {status}: {body}")]
    Remote {
        operation: &'static str,
        kind: ResourceKind,
        name: String,
        status: u16,
        body: String,
    },

    /// A strict create hit a resource that is already there
    #[error("{kind} '{name}' already exists")]
    Conflict { kind: ResourceKind, name: String },

    /// An operation needs a resource that is not on the server
    #[error("{kind} '{name}' does not exist")]
    Missing { kind: ResourceKind, name: String },

    /// Missing or malformed input, raised before any request is sent
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message_names_kind_and_resource() {
        let err = Error::Remote {
            operation: "create",
            kind: ResourceKind::Datastore,
            name: "flat".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "create datastore 'flat' failed with status 500: boom"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_conflict_message() {
        let err = Error::Conflict {
            kind: ResourceKind::LayerGroup,
            name: "ch_group".to_string(),
        };
        assert_eq!(err.to_string(), "layergroup 'ch_group' already exists");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_encode_and_decode_messages_differ() {
        let decode: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        let encode = Error::Encode(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert!(decode.to_string().starts_with("failed to decode response body"));
        assert!(encode.to_string().starts_with("failed to encode request body"));
    }
}
