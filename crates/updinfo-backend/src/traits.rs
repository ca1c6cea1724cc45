use async_trait::async_trait;

use crate::error::{DeserializeError, TransportError};
use crate::types::{Endpoint, WireManifest};

/// Retrieves the raw update info payload. Retry and timeout policy belongs to
/// the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, endpoint: &Endpoint) -> Result<Vec<u8>, TransportError>;
}

/// Turns a raw payload into wire records.
pub trait PayloadDeserializer: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, payload: &[u8]) -> Result<WireManifest, DeserializeError>;
}

/// Identity of the running build.
pub trait BuildIdentity: Send + Sync {
    /// Release channel the running build belongs to.
    fn channel(&self) -> &str;

    /// Version string of the running build, `None` when unknown.
    fn version(&self) -> Option<&str>;

    fn is_channel(&self, name: &str) -> bool {
        self.channel() == name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticBuildIdentity {
    channel: String,
    version: Option<String>,
}

impl StaticBuildIdentity {
    #[must_use]
    pub fn new(channel: impl Into<String>, version: Option<String>) -> Self {
        Self {
            channel: channel.into(),
            version,
        }
    }
}

impl BuildIdentity for StaticBuildIdentity {
    fn channel(&self) -> &str {
        &self.channel
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
