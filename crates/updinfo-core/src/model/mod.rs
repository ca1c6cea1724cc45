//! In-memory model of the published update info.

mod changelog;
mod channel;
mod version;

use log::warn;
use updinfo_backend::{BuildIdentity, DeserializeError, WireManifest};

pub use changelog::{ChangelogEntry, ChangelogEntryItem};
pub use channel::Channel;
pub use version::Version;

use crate::version_number::VersionNumber;

/// The running build, resolved once per fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMarker {
    channel: String,
    version: Option<VersionNumber>,
}

impl BuildMarker {
    #[must_use]
    pub fn new(channel: impl Into<String>, version: Option<VersionNumber>) -> Self {
        Self {
            channel: channel.into(),
            version,
        }
    }

    /// Resolve the identity reported by the build, ignoring a version string
    /// that does not parse.
    #[must_use]
    pub fn from_identity(identity: &dyn BuildIdentity) -> Self {
        let version = identity
            .version()
            .and_then(|raw| match raw.parse::<VersionNumber>() {
                Ok(version) => Some(version),
                Err(error) => {
                    warn!("Ignoring unparseable build version {raw:?}: {error}");
                    None
                }
            });
        Self::new(identity.channel(), version)
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn version(&self) -> Option<&VersionNumber> {
        self.version.as_ref()
    }

    fn is_channel(&self, name: &str) -> bool {
        self.channel == name
    }

    fn is_running(&self, number: &VersionNumber) -> bool {
        self.version.as_ref() == Some(number)
    }

    fn is_older_than(&self, number: &VersionNumber) -> bool {
        self.version.as_ref().is_some_and(|running| number > running)
    }
}

/// Build the complete channel set from wire records. Nothing is returned
/// unless every channel converts.
///
/// # Errors
/// Returns [`DeserializeError::InvalidVersion`] when a version string in any
/// channel cannot be parsed.
pub fn build_channels(
    manifest: WireManifest,
    build: &BuildMarker,
) -> Result<Vec<Channel>, DeserializeError> {
    manifest
        .channels
        .into_iter()
        .map(|channel| Channel::from_wire(channel, build))
        .collect()
}
