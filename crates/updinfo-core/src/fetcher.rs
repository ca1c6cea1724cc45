use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use futures_util::FutureExt;
use log::{debug, error, info, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use updinfo_backend::{BuildIdentity, Endpoint, PayloadDeserializer, Transport};

use crate::facade::{ChannelRef, UpdateInfo};
use crate::model::{BuildMarker, Channel, build_channels};
use crate::status::{FetchCompletion, FetchError};

/// External collaborators the fetcher drives.
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub deserializer: Arc<dyn PayloadDeserializer>,
    pub identity: Arc<dyn BuildIdentity>,
}

/// State shared between the fetcher, its worker tasks and every
/// [`UpdateInfo`] handle.
pub(crate) struct SharedState {
    channels: RwLock<Arc<[Channel]>>,
    fetch_started: AtomicBool,
    done: AtomicBool,
    fetch_error: AtomicU8,
    attempts: AtomicU64,
    identity: Arc<dyn BuildIdentity>,
    subscribers: Mutex<Vec<Sender<FetchCompletion>>>,
}

impl SharedState {
    fn new(identity: Arc<dyn BuildIdentity>) -> Self {
        Self {
            channels: RwLock::new(Arc::from(Vec::new())),
            fetch_started: AtomicBool::new(false),
            done: AtomicBool::new(false),
            fetch_error: AtomicU8::new(FetchError::None.as_u8()),
            attempts: AtomicU64::new(0),
            identity,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub(crate) fn fetch_error(&self) -> FetchError {
        FetchError::from_u8(self.fetch_error.load(Ordering::Acquire))
    }

    pub(crate) fn fetch_started(&self) -> bool {
        self.fetch_started.load(Ordering::Acquire)
    }

    pub(crate) fn identity(&self) -> &dyn BuildIdentity {
        self.identity.as_ref()
    }

    pub(crate) fn channels(&self) -> Arc<[Channel]> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*channels)
    }

    pub(crate) fn channel(&self, name: &str) -> Option<ChannelRef> {
        ChannelRef::find(self.channels(), name)
    }

    pub(crate) fn active_channel(&self) -> Option<ChannelRef> {
        self.channel(self.identity.channel())
    }

    pub(crate) fn subscribe(&self) -> Receiver<FetchCompletion> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender);
        receiver
    }

    pub(crate) fn wait_until_done(&self, timeout: Duration) -> Option<FetchError> {
        if !self.fetch_started() {
            return None;
        }
        if self.done() {
            return Some(self.fetch_error());
        }

        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sender.clone());
        // Re-check after subscribing so a completion in between is not lost.
        let outcome = if self.done() {
            Some(self.fetch_error())
        } else {
            receiver
                .recv_timeout(timeout)
                .ok()
                .map(|completion| completion.error)
        };
        self.unsubscribe(&sender);
        outcome
    }

    fn unsubscribe(&self, sender: &Sender<FetchCompletion>) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|subscriber| !subscriber.same_channel(sender));
    }

    fn publish(&self, channels: Vec<Channel>) {
        let channels: Arc<[Channel]> = Arc::from(channels);
        let previous = std::mem::replace(
            &mut *self
                .channels
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            channels,
        );
        drop(previous);
    }

    fn complete(&self, attempt: u64, error: FetchError) {
        self.fetch_error.store(error.as_u8(), Ordering::Release);
        self.done.store(true, Ordering::Release);

        let completion = FetchCompletion { attempt, error };
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|subscriber| subscriber.send(completion).is_ok());
        debug!(
            "Update info fetch #{attempt} completed ({error}), notified {} subscribers",
            subscribers.len()
        );
    }

    fn close_subscribers(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Retrieves update info in the background and publishes it to
/// [`UpdateInfo`] readers.
///
/// At most one attempt is in flight at a time. Readers see either the channel
/// set that was published before an attempt started or the complete set it
/// produced, never anything in between.
pub struct UpdateInfoFetcher {
    shared: Arc<SharedState>,
    transport: Arc<dyn Transport>,
    deserializer: Arc<dyn PayloadDeserializer>,
    endpoint: Endpoint,
    runtime: Handle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl UpdateInfoFetcher {
    /// Create a fetcher whose attempts run on `runtime`.
    #[must_use]
    pub fn new(collaborators: Collaborators, endpoint: Endpoint, runtime: Handle) -> Self {
        let Collaborators {
            transport,
            deserializer,
            identity,
        } = collaborators;
        Self {
            shared: Arc::new(SharedState::new(identity)),
            transport,
            deserializer,
            endpoint,
            runtime,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Read-only handle for presentation code.
    #[must_use]
    pub fn info(&self) -> UpdateInfo {
        UpdateInfo::new(Arc::clone(&self.shared))
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Launch the first fetch attempt. Returns `false` without doing anything
    /// if a fetch was already started.
    pub fn start_fetch(&self) -> bool {
        if self
            .shared
            .fetch_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Update info fetch already started, ignoring start request");
            return false;
        }
        self.launch();
        true
    }

    /// Launch another attempt once the previous one has completed, whatever
    /// its outcome.
    ///
    /// The previous error and channel set stay visible until the new attempt
    /// completes. Returns `false` if no fetch was ever started or one is
    /// still in flight.
    pub fn retry_fetch(&self) -> bool {
        if !self.shared.fetch_started() {
            debug!("Update info retry requested before any fetch was started");
            return false;
        }
        if self
            .shared
            .done
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Update info fetch still in flight, ignoring retry request");
            return false;
        }
        self.launch();
        true
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

    #[must_use]
    pub fn channels(&self) -> Arc<[Channel]> {
        self.shared.channels()
    }

    #[must_use]
    pub fn active_channel(&self) -> Option<ChannelRef> {
        self.shared.active_channel()
    }

    /// Receiver for one [`FetchCompletion`] per attempt completed after this
    /// call.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<FetchCompletion> {
        self.shared.subscribe()
    }

    /// Block the calling thread until the current attempt completes. Must not
    /// be called from a task running on the fetcher's runtime.
    #[must_use]
    pub fn wait_until_done(&self, timeout: Duration) -> Option<FetchError> {
        self.shared.wait_until_done(timeout)
    }

    /// Wait for in-flight attempts to finish and disconnect all subscribers.
    /// [`UpdateInfo`] handles keep serving the last published state.
    pub async fn shutdown(self) {
        let tasks = std::mem::take(
            &mut *self
                .tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for task in tasks {
            if let Err(error) = task.await {
                warn!("Update info fetch task ended abnormally: {error}");
            }
        }
        self.shared.close_subscribers();
        debug!("Update info fetcher shut down");
    }

    fn launch(&self) {
        let attempt = self.shared.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Starting update info fetch #{attempt} from {}", self.endpoint);

        let job = FetchJob {
            shared: Arc::clone(&self.shared),
            transport: Arc::clone(&self.transport),
            deserializer: Arc::clone(&self.deserializer),
            endpoint: self.endpoint.clone(),
            attempt,
        };
        let task = self.runtime.spawn(job.run());

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(task);
    }
}

struct FetchJob {
    shared: Arc<SharedState>,
    transport: Arc<dyn Transport>,
    deserializer: Arc<dyn PayloadDeserializer>,
    endpoint: Endpoint,
    attempt: u64,
}

impl FetchJob {
    async fn run(self) {
        let attempt = self.attempt;
        let error = match AssertUnwindSafe(self.retrieve()).catch_unwind().await {
            Ok(Ok(channels)) => {
                info!(
                    "Update info fetch #{attempt} succeeded with {} channels",
                    channels.len()
                );
                self.shared.publish(channels);
                FetchError::None
            }
            Ok(Err(error)) => error,
            Err(_) => {
                error!("Update info fetch #{attempt} panicked");
                FetchError::ConnectionError
            }
        };
        self.shared.complete(attempt, error);
    }

    async fn retrieve(&self) -> Result<Vec<Channel>, FetchError> {
        let payload = self
            .transport
            .fetch(&self.endpoint)
            .await
            .map_err(|error| {
                warn!(
                    "Update info fetch #{} failed to reach {} via {}: {error}",
                    self.attempt,
                    self.endpoint,
                    self.transport.name()
                );
                FetchError::ConnectionError
            })?;
        debug!(
            "Update info fetch #{} received {} bytes",
            self.attempt,
            payload.len()
        );

        let manifest = self.deserializer.parse(&payload).map_err(|error| {
            warn!(
                "Update info fetch #{} could not parse payload with {}: {error}",
                self.attempt,
                self.deserializer.name()
            );
            FetchError::DeserializationError
        })?;

        let build = BuildMarker::from_identity(self.shared.identity());
        build_channels(manifest, &build).map_err(|error| {
            warn!(
                "Update info fetch #{} received invalid records: {error}",
                self.attempt
            );
            FetchError::DeserializationError
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use updinfo_backend::{DeserializeError, StaticBuildIdentity, TransportError, WireManifest};

    use super::*;
    use crate::model::Version;
    use crate::version_number::VersionNumber;

    struct UnreachableTransport;

    #[async_trait]
    impl Transport for UnreachableTransport {
        fn name(&self) -> &'static str {
            "unreachable"
        }

        async fn fetch(&self, _endpoint: &Endpoint) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::network_request("fetch update info", "offline"))
        }
    }

    struct EmptyDeserializer;

    impl PayloadDeserializer for EmptyDeserializer {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn parse(&self, _payload: &[u8]) -> Result<WireManifest, DeserializeError> {
            Ok(WireManifest::default())
        }
    }

    fn shared() -> SharedState {
        SharedState::new(Arc::new(StaticBuildIdentity::new("stable", None)))
    }

    fn channel(name: &str, versions: &[(u64, u64, u64)]) -> Channel {
        let versions = versions
            .iter()
            .map(|&(major, minor, patch)| {
                Version::new(
                    format!("{major}.{minor}.{patch}"),
                    VersionNumber::new(major, minor, patch),
                    chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
                    false,
                )
            })
            .collect();
        Channel::new(name, "", versions, Vec::new())
    }

    #[test]
    fn initial_state_is_idle() {
        let state = shared();

        assert!(!state.fetch_started());
        assert!(!state.done());
        assert_eq!(state.fetch_error(), FetchError::None);
        assert!(state.channels().is_empty());
        assert!(state.active_channel().is_none());
    }

    #[test]
    fn wait_until_done_returns_immediately_when_never_started() {
        let state = shared();
        assert_eq!(state.wait_until_done(Duration::from_secs(60)), None);
    }

    fn subscriber_count(state: &SharedState) -> usize {
        state
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[test]
    fn repeated_waits_after_completion_leave_no_subscribers() {
        let state = shared();
        state.fetch_started.store(true, Ordering::Release);
        state.complete(1, FetchError::None);

        for _ in 0..1_000 {
            assert_eq!(
                state.wait_until_done(Duration::from_secs(1)),
                Some(FetchError::None)
            );
        }

        assert_eq!(subscriber_count(&state), 0);
    }

    #[test]
    fn timed_out_wait_unsubscribes() {
        let state = shared();
        state.fetch_started.store(true, Ordering::Release);
        let completions = state.subscribe();

        assert_eq!(state.wait_until_done(Duration::from_millis(10)), None);
        assert_eq!(state.wait_until_done(Duration::from_millis(10)), None);

        assert_eq!(subscriber_count(&state), 1);
        state.complete(1, FetchError::ConnectionError);
        assert_eq!(
            completions.try_recv().map(|completion| completion.error),
            Ok(FetchError::ConnectionError)
        );
    }

    #[test]
    fn publish_replaces_channel_set_wholesale() {
        let state = shared();
        state.publish(vec![channel("stable", &[(1, 0, 0)])]);
        let before = state.channels();

        state.publish(vec![
            channel("stable", &[(2, 0, 0)]),
            channel("dev", &[(2, 1, 0)]),
        ]);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].versions()[0].number(), &VersionNumber::new(1, 0, 0));
        let after = state.channels();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].versions()[0].number(), &VersionNumber::new(2, 0, 0));
        assert_eq!(
            state.active_channel().map(|channel| channel.name().to_string()),
            Some("stable".to_string())
        );
    }

    #[test]
    fn complete_notifies_live_subscribers_and_drops_closed_ones() {
        let state = shared();
        let live = state.subscribe();
        drop(state.subscribe());

        state.complete(1, FetchError::ConnectionError);

        assert!(state.done());
        assert_eq!(state.fetch_error(), FetchError::ConnectionError);
        assert_eq!(
            live.try_recv().ok(),
            Some(FetchCompletion {
                attempt: 1,
                error: FetchError::ConnectionError
            })
        );
        assert_eq!(subscriber_count(&state), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn retry_is_refused_before_start() {
        let fetcher = UpdateInfoFetcher::new(
            Collaborators {
                transport: Arc::new(UnreachableTransport),
                deserializer: Arc::new(EmptyDeserializer),
                identity: Arc::new(StaticBuildIdentity::new("stable", None)),
            },
            Endpoint::new("mock://info"),
            Handle::current(),
        );

        assert!(!fetcher.retry_fetch());
        assert!(!fetcher.fetch_started());

        let completions = fetcher.subscribe();
        assert!(fetcher.start_fetch());
        let completion = tokio::task::spawn_blocking(move || {
            completions.recv_timeout(Duration::from_secs(5))
        })
        .await
        .expect("blocking wait joins")
        .expect("completion arrives");

        assert_eq!(completion.error, FetchError::ConnectionError);
        assert!(fetcher.done());
        fetcher.shutdown().await;
    }
}
