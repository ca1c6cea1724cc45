use chrono::{DateTime, Utc};

use crate::version_number::VersionNumber;

/// One published build of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    label: String,
    number: VersionNumber,
    date: DateTime<Utc>,
    is_current: bool,
}

impl Version {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        number: VersionNumber,
        date: DateTime<Utc>,
        is_current: bool,
    ) -> Self {
        Self {
            label: label.into(),
            number,
            date,
            is_current,
        }
    }

    /// String handed back to the host application to select this build.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn number(&self) -> &VersionNumber {
        &self.number
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Whether this is the build currently running.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.is_current
    }
}
