use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error during {operation} ({stage}): {details}")]
    NetworkError {
        operation: &'static str,
        stage: NetworkStage,
        details: String,
    },

    #[error("Update server responded with HTTP {status}{body_snippet}")]
    HttpStatus { status: u16, body_snippet: String },

    #[error("Unsupported endpoint {endpoint}: {reason}")]
    UnsupportedEndpoint {
        endpoint: String,
        reason: &'static str,
    },

    #[error("IO error ({kind}): {message}")]
    IoError {
        kind: std::io::ErrorKind,
        message: String,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStage {
    #[error("request")]
    Request,
    #[error("response body")]
    ResponseBody,
}

impl TransportError {
    pub fn network_request(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::Request,
            details: details.into(),
        }
    }

    pub fn network_request_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_request(operation, error.to_string())
    }

    pub fn network_body(operation: &'static str, details: impl Into<String>) -> Self {
        Self::NetworkError {
            operation,
            stage: NetworkStage::ResponseBody,
            details: details.into(),
        }
    }

    pub fn network_body_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network_body(operation, error.to_string())
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::IoError {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeserializeError {
    #[error("Update info payload is empty")]
    Empty,

    #[error("Malformed update info payload at line {line}, column {column}: {details}")]
    Malformed {
        line: usize,
        column: usize,
        details: String,
    },

    #[error("Invalid version {value:?} in channel {channel}: {details}")]
    InvalidVersion {
        channel: String,
        value: String,
        details: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{DeserializeError, NetworkStage, TransportError};

    #[test]
    fn io_error_conversion_maps_to_io_variant() {
        let mapped = TransportError::from(std::io::Error::other("permission denied"));
        assert!(
            matches!(mapped, TransportError::IoError { kind, ref message } if kind == std::io::ErrorKind::Other && message.contains("permission denied"))
        );
    }

    #[test]
    fn http_status_display_includes_snippet() {
        let error = TransportError::HttpStatus {
            status: 503,
            body_snippet: ": maintenance".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Update server responded with HTTP 503: maintenance"
        );
    }

    #[test]
    fn network_helpers_set_expected_stage() {
        let request = TransportError::network_request("fetch update info", "timed out");
        assert!(matches!(
            request,
            TransportError::NetworkError {
                operation: "fetch update info",
                stage: NetworkStage::Request,
                ..
            }
        ));

        let body = TransportError::network_body_from("fetch update info", "connection reset");
        assert!(matches!(
            body,
            TransportError::NetworkError {
                stage: NetworkStage::ResponseBody,
                ref details,
                ..
            } if details == "connection reset"
        ));
    }

    #[test]
    fn invalid_version_display_names_channel() {
        let error = DeserializeError::InvalidVersion {
            channel: "dev".to_string(),
            value: "banana".to_string(),
            details: "unexpected character".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Invalid version \"banana\" in channel dev: unexpected character"
        );
    }
}
