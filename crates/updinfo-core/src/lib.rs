//! Update info fetching for the updinfo workspace.
//!
//! This crate owns everything between the raw payload and the presentation
//! layer:
//! - The channel / version / changelog model and structured version numbers.
//! - The background fetcher and its read-only query facade.
//! - Memoized wrapping of changelog text.
//! - Concrete HTTP, file and JSON collaborators.

mod facade;
mod fetcher;
mod http;
mod json;
pub mod model;
mod status;
mod version_number;
mod wrap;

/// Fetch engine and the collaborators it is built from.
pub use fetcher::{Collaborators, UpdateInfoFetcher};
/// Read-only query handle and channel snapshots.
pub use facade::{ChannelRef, UpdateInfo};
/// Concrete transports.
pub use http::{FileTransport, HttpTransport};
/// JSON payload deserializer.
pub use json::JsonDeserializer;
pub use model::{BuildMarker, ChangelogEntry, ChangelogEntryItem, Channel, Version};
/// Fetch outcome and completion notification.
pub use status::{FetchCompletion, FetchError};
pub use version_number::{VersionNumber, VersionParseError};
pub use wrap::{WrapCache, wrap_text};
