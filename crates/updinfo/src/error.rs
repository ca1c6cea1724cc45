use updinfo_core::FetchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppErrorDetail {
    Message(String),
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
}

impl std::fmt::Display for AppErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Io { kind, message } => write!(f, "{kind}: {message}"),
        }
    }
}

impl From<String> for AppErrorDetail {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for AppErrorDetail {
    fn from(value: &str) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<std::io::Error> for AppErrorDetail {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl From<updinfo_backend::TransportError> for AppErrorDetail {
    fn from(value: updinfo_backend::TransportError) -> Self {
        Self::Message(value.to_string())
    }
}

impl From<updinfo_platform::AppPathsError> for AppErrorDetail {
    fn from(value: updinfo_platform::AppPathsError) -> Self {
        Self::Message(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    Timeout {
        operation: &'static str,
        seconds: u64,
    },
    OperationFailed {
        operation: &'static str,
        details: AppErrorDetail,
    },
    FetchFailed {
        endpoint: String,
        error: FetchError,
    },
    ChannelNotPublished {
        channel: String,
    },
}

impl AppError {
    pub fn timeout(operation: &'static str, seconds: u64) -> Self {
        Self::Timeout { operation, seconds }
    }

    pub fn operation_failed(operation: &'static str, details: impl Into<AppErrorDetail>) -> Self {
        Self::OperationFailed {
            operation,
            details: details.into(),
        }
    }

    pub fn fetch_failed(endpoint: impl Into<String>, error: FetchError) -> Self {
        Self::FetchFailed {
            endpoint: endpoint.into(),
            error,
        }
    }

    pub fn channel_not_published(channel: impl Into<String>) -> Self {
        Self::ChannelNotPublished {
            channel: channel.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { operation, seconds } => {
                write!(f, "{operation} timed out after {seconds}s")
            }
            Self::OperationFailed { operation, details } => {
                write!(f, "{operation} failed: {details}")
            }
            Self::FetchFailed { endpoint, error } => {
                write!(f, "Fetching {endpoint} failed: {error}")
            }
            Self::ChannelNotPublished { channel } => {
                write!(f, "Channel {channel} is not published by the update server")
            }
        }
    }
}

impl std::error::Error for AppError {}
