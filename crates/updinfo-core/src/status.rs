use std::fmt;

/// Outcome of the most recently completed fetch attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FetchError {
    #[default]
    None = 0,
    ConnectionError = 1,
    DeserializationError = 2,
}

impl FetchError {
    #[must_use]
    pub fn is_error(self) -> bool {
        self != Self::None
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::ConnectionError,
            2 => Self::DeserializationError,
            _ => Self::None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "no error"),
            Self::ConnectionError => write!(f, "could not reach the update server"),
            Self::DeserializationError => write!(f, "update server sent invalid update info"),
        }
    }
}

/// Sent to every subscriber once per completed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchCompletion {
    /// Attempt number, starting at 1.
    pub attempt: u64,
    pub error: FetchError,
}
