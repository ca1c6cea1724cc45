//! Collaborator seams for the update info fetcher.
//!
//! The fetcher never talks to the network or parses payloads itself; it goes
//! through the traits defined here:
//! - [`Transport`] retrieves the raw payload.
//! - [`PayloadDeserializer`] turns it into wire records.
//! - [`BuildIdentity`] describes the running build.

mod error;
mod traits;
mod types;

pub use error::{DeserializeError, NetworkStage, TransportError};
pub use traits::{BuildIdentity, PayloadDeserializer, StaticBuildIdentity, Transport};
pub use types::{
    Endpoint, WireChangelogEntry, WireChangelogItem, WireChannel, WireManifest, WireVersion,
};
