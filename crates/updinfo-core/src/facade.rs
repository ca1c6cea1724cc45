use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::fetcher::SharedState;
use crate::model::Channel;
use crate::status::{FetchCompletion, FetchError};

/// Read-only view of a fetcher's published state.
///
/// Cheap to clone and safe to use from any thread; no locking is exposed.
/// Before the first successful fetch every query returns empty or default
/// values.
#[derive(Clone)]
pub struct UpdateInfo {
    shared: Arc<SharedState>,
}

impl UpdateInfo {
    pub(crate) fn new(shared: Arc<SharedState>) -> Self {
        Self { shared }
    }

    #[must_use]
    pub fn done(&self) -> bool {
        self.shared.done()
    }

    #[must_use]
    pub fn fetch_error(&self) -> FetchError {
        self.shared.fetch_error()
    }

    #[must_use]
    pub fn fetch_started(&self) -> bool {
        self.shared.fetch_started()
    }

    /// Snapshot of the published channels, in server order.
    #[must_use]
    pub fn channels(&self) -> Arc<[Channel]> {
        self.shared.channels()
    }

    /// Channel the running build belongs to, if the server published it.
    #[must_use]
    pub fn active_channel(&self) -> Option<ChannelRef> {
        self.shared.active_channel()
    }

    #[must_use]
    pub fn channel(&self, name: &str) -> Option<ChannelRef> {
        self.shared.channel(name)
    }

    #[must_use]
    pub fn build_channel(&self) -> &str {
        self.shared.identity().channel()
    }

    #[must_use]
    pub fn build_version(&self) -> Option<&str> {
        self.shared.identity().version()
    }

    #[must_use]
    pub fn subscribe(&self) -> Receiver<FetchCompletion> {
        self.shared.subscribe()
    }

    /// Block until the current attempt completes; `None` on timeout or when
    /// no fetch was started.
    #[must_use]
    pub fn wait_until_done(&self, timeout: Duration) -> Option<FetchError> {
        self.shared.wait_until_done(timeout)
    }
}

impl fmt::Debug for UpdateInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateInfo")
            .field("fetch_started", &self.fetch_started())
            .field("done", &self.done())
            .field("fetch_error", &self.fetch_error())
            .field("channels", &self.channels().len())
            .finish()
    }
}

/// One channel of a published snapshot. Keeps the whole snapshot alive, so
/// it stays valid after a later fetch replaces the channel set.
#[derive(Debug, Clone)]
pub struct ChannelRef {
    channels: Arc<[Channel]>,
    index: usize,
}

impl ChannelRef {
    pub(crate) fn find(channels: Arc<[Channel]>, name: &str) -> Option<Self> {
        let index = channels.iter().position(|channel| channel.name() == name)?;
        Some(Self { channels, index })
    }

    /// The full snapshot this channel belongs to.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<[Channel]> {
        &self.channels
    }
}

impl Deref for ChannelRef {
    type Target = Channel;

    fn deref(&self) -> &Channel {
        &self.channels[self.index]
    }
}
