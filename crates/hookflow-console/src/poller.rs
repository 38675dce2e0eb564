//! Status polling bound to an observer's lifetime.
//!
//! A [`PollHandle`] is created when a status view opens and closed when it
//! goes away. While open, the poller fetches immediately and then once per
//! interval. Each result replaces the previous snapshot wholesale:
//!
//! - a snapshot is displayed and clears any error banner
//! - not-found means "no data yet", never an error
//! - any other failure raises the banner and polling carries on
//!
//! At most one fetch is in flight. Ticks that land while a fetch is
//! outstanding are skipped, and every fetch carries a sequence number so a
//! result older than the one on display is never applied.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hookflow_client::Result as ClientResult;

// ─────────────────────────────────────────────────────────────────────────────
// Sources
// ─────────────────────────────────────────────────────────────────────────────

/// A value produced by one poll.
pub trait Snapshot: Clone + Send + Sync + 'static {
    /// Whether the observed resource has stopped changing.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// Something a poller can ask for the latest snapshot.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    /// What one fetch yields.
    type Snapshot: Snapshot;

    /// Fetch the latest snapshot. `Ok(None)` means nothing exists yet.
    async fn fetch(&self) -> ClientResult<Option<Self::Snapshot>>;

    /// Banner text shown when a fetch fails.
    fn failure_message(&self) -> String {
        "Failed to refresh status".to_string()
    }

    /// Short description for logs.
    fn describe(&self) -> String;
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// What the poller does once a snapshot reports a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TerminalPolicy {
    /// Stop automatic polling. Manual refresh still works and resumes it.
    #[default]
    StopOnTerminal,
    /// Keep polling until the view closes.
    Continuous,
}

/// Poller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Time between fetches.
    pub interval: Duration,
    /// Behaviour on terminal snapshots.
    pub policy: TerminalPolicy,
}

impl PollConfig {
    /// Poll every `interval`, stopping on terminal states.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            policy: TerminalPolicy::default(),
        }
    }

    /// Set the terminal-state policy.
    pub fn with_policy(mut self, policy: TerminalPolicy) -> Self {
        self.policy = policy;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// What the view should show.
#[derive(Debug, Clone, PartialEq)]
pub enum Display<S> {
    /// No fetch has completed yet.
    Loading,
    /// The server has nothing for this resource yet.
    NoData,
    /// Latest snapshot.
    Snapshot(S),
}

/// Lifecycle of a poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fetching on every interval.
    Active,
    /// A terminal snapshot was seen; waiting for a manual refresh.
    Settled,
    /// The observer closed; nothing more will happen.
    Closed,
}

/// Published state of a poller.
#[derive(Debug, Clone)]
pub struct PollState<S> {
    /// Content to render.
    pub display: Display<S>,
    /// Banner for the most recent failure, cleared by the next good result.
    pub error: Option<String>,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Sequence number of the result on display.
    pub last_applied: u64,
    /// Number of results applied.
    pub fetches: u64,
    /// Ticks skipped because a fetch was still outstanding.
    pub skipped_ticks: u64,
}

impl<S> PollState<S> {
    fn new() -> Self {
        Self {
            display: Display::Loading,
            error: None,
            phase: Phase::Active,
            last_applied: 0,
            fetches: 0,
            skipped_ticks: 0,
        }
    }

    /// The snapshot on display, if any.
    pub fn snapshot(&self) -> Option<&S> {
        match &self.display {
            Display::Snapshot(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Apply the result of fetch number `seq`.
    ///
    /// Returns `false` and changes nothing when a newer result is already on
    /// display.
    pub(crate) fn apply(
        &mut self,
        seq: u64,
        result: ClientResult<Option<S>>,
        failure_message: &str,
    ) -> bool {
        if seq <= self.last_applied {
            return false;
        }
        self.last_applied = seq;
        self.fetches += 1;

        match result {
            Ok(Some(snapshot)) => {
                self.display = Display::Snapshot(snapshot);
                self.error = None;
            }
            Ok(None) => {
                self.display = Display::NoData;
                self.error = None;
            }
            Err(e) if e.is_not_found() => {
                self.display = Display::NoData;
                self.error = None;
            }
            Err(_) => {
                self.error = Some(failure_message.to_string());
            }
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Command {
    Refresh,
    DismissError,
}

/// Handle to a running poller.
///
/// Dropping the handle closes the poller; [`PollHandle::close`] does the same
/// and waits for the task to finish.
pub struct PollHandle<S: Snapshot> {
    state: watch::Receiver<PollState<S>>,
    commands: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<S: Snapshot> PollHandle<S> {
    /// Current state.
    pub fn state(&self) -> PollState<S> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PollState<S>> {
        self.state.clone()
    }

    /// Fetch now, and resume automatic polling if it had settled.
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    /// Hide the error banner until the next failure.
    pub fn dismiss_error(&self) {
        let _ = self.commands.send(Command::DismissError);
    }

    /// Whether the poller is still running.
    pub fn is_open(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop polling, abort any in-flight fetch and wait for the task to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "poller task ended abnormally");
        }
    }
}

impl<S: Snapshot> Drop for PollHandle<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Poll loop
// ─────────────────────────────────────────────────────────────────────────────

/// Start polling `source`. Must be called inside a Tokio runtime.
pub fn spawn<Src: StatusSource>(source: Src, config: PollConfig) -> PollHandle<Src::Snapshot> {
    let (state_tx, state_rx) = watch::channel(PollState::new());
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let poll_loop = PollLoop {
        source: Arc::new(source),
        config,
        state: state_tx,
        commands: command_rx,
        cancel: cancel.clone(),
        next_seq: 0,
    };
    let task = tokio::spawn(poll_loop.run());

    PollHandle {
        state: state_rx,
        commands: command_tx,
        cancel,
        task: Some(task),
    }
}

type Fetch<S> = BoxFuture<'static, (u64, ClientResult<Option<S>>)>;

struct PollLoop<Src: StatusSource> {
    source: Arc<Src>,
    config: PollConfig,
    state: watch::Sender<PollState<Src::Snapshot>>,
    commands: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
    next_seq: u64,
}

impl<Src: StatusSource> PollLoop<Src> {
    async fn run(mut self) {
        let description = self.source.describe();
        let failure_message = self.source.failure_message();
        info!(
            source = %description,
            interval_ms = self.config.interval.as_millis() as u64,
            "polling started"
        );

        // The first tick completes immediately, which gives the fetch-on-open.
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut in_flight: Option<Fetch<Src::Snapshot>> = None;
        let mut settled = false;
        let mut refresh_queued = false;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                Some(command) = self.commands.recv() => match command {
                    Command::Refresh => {
                        if settled {
                            settled = false;
                            ticker.reset();
                            self.state.send_modify(|s| s.phase = Phase::Active);
                            info!(source = %description, "polling resumed");
                        }
                        if in_flight.is_some() {
                            refresh_queued = true;
                        } else {
                            in_flight = Some(self.start_fetch());
                        }
                    }
                    Command::DismissError => {
                        self.state.send_if_modified(|s| s.error.take().is_some());
                    }
                },

                (seq, result) = next_result(&mut in_flight) => {
                    in_flight = None;

                    if let Err(e) = &result
                        && !e.is_not_found()
                    {
                        warn!(source = %description, seq, error = %e, "status fetch failed");
                    }

                    let mut terminal = false;
                    self.state.send_if_modified(|s| {
                        let applied = s.apply(seq, result, &failure_message);
                        terminal = applied && s.snapshot().is_some_and(Snapshot::is_terminal);
                        applied
                    });

                    if terminal && self.config.policy == TerminalPolicy::StopOnTerminal && !settled {
                        settled = true;
                        self.state.send_modify(|s| s.phase = Phase::Settled);
                        info!(source = %description, "terminal state observed; automatic polling stopped");
                    }

                    if refresh_queued {
                        refresh_queued = false;
                        in_flight = Some(self.start_fetch());
                    }
                }

                _ = ticker.tick(), if !settled => {
                    if in_flight.is_some() {
                        debug!(source = %description, "previous fetch outstanding; skipping tick");
                        self.state.send_modify(|s| s.skipped_ticks += 1);
                    } else {
                        in_flight = Some(self.start_fetch());
                    }
                }
            }
        }

        // Dropping the future aborts the request.
        drop(in_flight);
        self.state.send_modify(|s| {
            s.phase = Phase::Closed;
            s.display = Display::Loading;
            s.error = None;
        });
        info!(source = %description, "polling stopped");
    }

    fn start_fetch(&mut self) -> Fetch<Src::Snapshot> {
        self.next_seq += 1;
        let seq = self.next_seq;
        let source = Arc::clone(&self.source);
        debug!(seq, "fetching status");
        Box::pin(async move { (seq, source.fetch().await) })
    }
}

/// Resolve the in-flight fetch, or never when there is none.
async fn next_result<S>(in_flight: &mut Option<Fetch<S>>) -> (u64, ClientResult<Option<S>>) {
    match in_flight {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hookflow_client::{Error, ExecutionStatus};
    use parking_lot::Mutex;

    const INTERVAL: Duration = Duration::from_secs(2);

    #[derive(Debug, Clone, PartialEq)]
    struct Reading(ExecutionStatus);

    impl Snapshot for Reading {
        fn is_terminal(&self) -> bool {
            self.0.is_terminal()
        }
    }

    enum Step {
        Snap(ExecutionStatus),
        Missing,
        Fail,
    }

    #[derive(Default)]
    struct Counters {
        calls: AtomicUsize,
        concurrent: AtomicUsize,
        max_concurrent: AtomicUsize,
    }

    struct ScriptedSource {
        script: Mutex<VecDeque<Step>>,
        latency: Duration,
        counters: Arc<Counters>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> (Self, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            let source = Self {
                script: Mutex::new(steps.into()),
                latency: Duration::ZERO,
                counters: Arc::clone(&counters),
            };
            (source, counters)
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        type Snapshot = Reading;

        async fn fetch(&self) -> ClientResult<Option<Reading>> {
            self.counters.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.counters.concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.max_concurrent.fetch_max(now, Ordering::SeqCst);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let step = self.script.lock().pop_front().unwrap_or(Step::Missing);

            self.counters.concurrent.fetch_sub(1, Ordering::SeqCst);
            match step {
                Step::Snap(status) => Ok(Some(Reading(status))),
                Step::Missing => Ok(None),
                Step::Fail => Err(Error::Api {
                    status: 503,
                    error: None,
                    detail: None,
                    rule_errors: Vec::new(),
                }),
            }
        }

        fn failure_message(&self) -> String {
            "Failed to load reading".to_string()
        }

        fn describe(&self) -> String {
            "reading".to_string()
        }
    }

    async fn wait_for_fetches(handle: &PollHandle<Reading>, n: u64) -> PollState<Reading> {
        let mut rx = handle.subscribe();
        rx.wait_for(|s| s.fetches >= n).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_on_open() {
        let (source, counters) = ScriptedSource::new(vec![Step::Snap(ExecutionStatus::Running)]);
        let start = tokio::time::Instant::now();
        let handle = spawn(source, PollConfig::every(INTERVAL));

        let state = wait_for_fetches(&handle, 1).await;
        assert!(start.elapsed() < INTERVAL);
        assert_eq!(state.display, Display::Snapshot(Reading(ExecutionStatus::Running)));
        assert_eq!(counters.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_no_data_without_banner() {
        let (source, _) = ScriptedSource::new(vec![Step::Missing]);
        let handle = spawn(source, PollConfig::every(INTERVAL));

        let state = wait_for_fetches(&handle, 1).await;
        assert_eq!(state.display, Display::NoData);
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_banner_and_next_tick_still_fires() {
        let (source, counters) = ScriptedSource::new(vec![
            Step::Snap(ExecutionStatus::Running),
            Step::Fail,
            Step::Snap(ExecutionStatus::Polling),
        ]);
        let handle = spawn(source, PollConfig::every(INTERVAL));

        let state = wait_for_fetches(&handle, 2).await;
        assert_eq!(state.error.as_deref(), Some("Failed to load reading"));
        // The last good snapshot stays on screen under the banner
        assert_eq!(state.display, Display::Snapshot(Reading(ExecutionStatus::Running)));
        assert_eq!(state.phase, Phase::Active);

        let state = wait_for_fetches(&handle, 3).await;
        assert!(state.error.is_none());
        assert_eq!(state.display, Display::Snapshot(Reading(ExecutionStatus::Polling)));
        assert_eq!(counters.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_further_fetches() {
        let (source, counters) = ScriptedSource::new(Vec::new());
        let handle = spawn(source, PollConfig::every(INTERVAL));
        let mut rx = handle.subscribe();

        wait_for_fetches(&handle, 2).await;
        handle.close().await;
        let calls = counters.calls.load(Ordering::SeqCst);

        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(counters.calls.load(Ordering::SeqCst), calls);

        let last = rx.borrow_and_update().clone();
        assert_eq!(last.phase, Phase::Closed);
        assert_eq!(last.display, Display::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_closes_poller() {
        let (source, counters) = ScriptedSource::new(Vec::new());
        let handle = spawn(source, PollConfig::every(INTERVAL));
        let mut rx = handle.subscribe();
        wait_for_fetches(&handle, 1).await;

        drop(handle);
        rx.wait_for(|s| s.phase == Phase::Closed).await.unwrap();
        let calls = counters.calls.load(Ordering::SeqCst);

        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(counters.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_terminal_and_manual_refresh_resumes() {
        let (source, counters) = ScriptedSource::new(vec![
            Step::Snap(ExecutionStatus::Running),
            Step::Snap(ExecutionStatus::Completed),
            Step::Snap(ExecutionStatus::Running),
        ]);
        let handle = spawn(source, PollConfig::every(INTERVAL));

        let state = wait_for_fetches(&handle, 2).await;
        assert_eq!(state.phase, Phase::Settled);

        tokio::time::sleep(INTERVAL * 5).await;
        assert_eq!(counters.calls.load(Ordering::SeqCst), 2);

        handle.refresh();
        let state = wait_for_fetches(&handle, 3).await;
        assert_eq!(state.phase, Phase::Active);
        assert_eq!(state.display, Display::Snapshot(Reading(ExecutionStatus::Running)));

        // Automatic polling is back on
        wait_for_fetches(&handle, 4).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_policy_ignores_terminal_state() {
        let (source, _) = ScriptedSource::new(vec![
            Step::Snap(ExecutionStatus::Failed),
            Step::Snap(ExecutionStatus::Failed),
        ]);
        let config = PollConfig::every(INTERVAL).with_policy(TerminalPolicy::Continuous);
        let handle = spawn(source, config);

        let state = wait_for_fetches(&handle, 3).await;
        assert_eq!(state.phase, Phase::Active);
        assert_eq!(state.display, Display::NoData);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_skips_ticks_instead_of_overlapping() {
        let (source, counters) = ScriptedSource::new(Vec::new());
        let source = source.with_latency(Duration::from_secs(5));
        let handle = spawn(source, PollConfig::every(INTERVAL));

        let state = wait_for_fetches(&handle, 2).await;
        assert_eq!(counters.max_concurrent.load(Ordering::SeqCst), 1);
        assert!(state.skipped_ticks >= 2, "skipped {}", state.skipped_ticks);
        assert_eq!(state.last_applied, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_in_flight_queues_one_follow_up() {
        let (source, counters) = ScriptedSource::new(Vec::new());
        let source = source.with_latency(Duration::from_millis(500));
        let handle = spawn(source, PollConfig::every(Duration::from_secs(60)));

        // First fetch is outstanding; two refreshes collapse into one follow-up
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.refresh();
        handle.refresh();

        wait_for_fetches(&handle, 2).await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counters.calls.load(Ordering::SeqCst), 2);
        assert_eq!(counters.max_concurrent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_error() {
        let (source, _) = ScriptedSource::new(vec![Step::Fail]);
        let handle = spawn(source, PollConfig::every(Duration::from_secs(60)));

        let state = wait_for_fetches(&handle, 1).await;
        assert!(state.error.is_some());

        handle.dismiss_error();
        let mut rx = handle.subscribe();
        let state = rx.wait_for(|s| s.error.is_none()).await.unwrap().clone();
        assert_eq!(state.fetches, 1);
    }

    #[test]
    fn test_stale_result_is_not_applied() {
        let mut state = PollState::new();
        assert!(state.apply(2, Ok(Some(Reading(ExecutionStatus::Completed))), "x"));
        assert!(!state.apply(1, Ok(Some(Reading(ExecutionStatus::Running))), "x"));
        assert!(!state.apply(2, Ok(None), "x"));

        assert_eq!(state.display, Display::Snapshot(Reading(ExecutionStatus::Completed)));
        assert_eq!(state.fetches, 1);
    }

    #[test]
    fn test_not_found_error_counts_as_no_data() {
        let mut state: PollState<Reading> = PollState::new();
        state.error = Some("old".to_string());
        state.apply(1, Err(Error::NotFound("HTTP 404".into())), "x");
        assert_eq!(state.display, Display::NoData);
        assert!(state.error.is_none());
    }
}
