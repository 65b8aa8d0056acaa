//! Highlighting Pipeline
//!
//! Runs `tokenize → parse → highlight` over document snapshots and publishes the resulting
//! [`Highlighter`] for the rendering path.
//!
//! # Overview
//!
//! - Every trigger gets a monotonic request version. A pass works on the snapshot captured at
//!   trigger time, so edits made while it runs are never observed half-way.
//! - Results are published with a single reference swap ([`ArcSwapOption`]); readers never block
//!   and never see a half-built index.
//! - A result is applied only if its version is still the newest triggered one. Late results of
//!   superseded passes are discarded, so out-of-order completion cannot overwrite fresher
//!   highlighting.
//! - A failed pass leaves the previously published highlighter in place.
//!
//! # Example
//!
//! ```rust
//! use scribe_core::{Document, HighlightPipeline, PipelineConfig, PipelineState};
//! use scribe_lang::FrontEndRegistry;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(FrontEndRegistry::new());
//! let pipeline = HighlightPipeline::synchronous(registry, PipelineConfig::default());
//!
//! let mut doc = Document::from_text("plain text");
//! doc.set_path("notes.txt");
//! pipeline.trigger(doc.snapshot());
//!
//! // No front-end handles `.txt`: plain text, no highlighter.
//! assert!(pipeline.current().is_none());
//! assert_eq!(pipeline.state(), PipelineState::Idle);
//! ```

use crate::config::PipelineConfig;
use crate::document::Snapshot;
use crate::highlighter::{Highlighter, StyledSpan};
use crate::rope::Rope;
use arc_swap::ArcSwapOption;
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use scribe_lang::{FrontEndRegistry, HighlightError, Stage};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Observable state of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Nothing to do (never triggered, or the active file has no front-end).
    Idle,
    /// The current pass is tokenizing.
    Tokenizing,
    /// The current pass is parsing.
    Parsing,
    /// The current pass is walking the syntax tree.
    Highlighting,
    /// The newest pass succeeded and its highlighter is published.
    Ready,
    /// The newest pass failed; the previous highlighter (if any) is still published.
    Failed,
}

impl From<Stage> for PipelineState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Tokenizing => PipelineState::Tokenizing,
            Stage::Parsing => PipelineState::Parsing,
            Stage::Highlighting => PipelineState::Highlighting,
        }
    }
}

/// Result of one successful pass.
#[derive(Debug)]
pub enum PassOutcome {
    /// A front-end produced highlighting.
    Highlighted(Highlighter),
    /// No registered front-end handles the file; render plain text.
    Unsupported,
}

/// Run a whole pass over `text` for the file at `path`.
pub fn calculate_highlighting(
    registry: &FrontEndRegistry,
    path: Option<&Path>,
    text: &str,
) -> Result<PassOutcome, HighlightError> {
    run_pass(registry, path, text, &mut |_| {})
}

fn run_pass(
    registry: &FrontEndRegistry,
    path: Option<&Path>,
    text: &str,
    on_stage: &mut dyn FnMut(Stage),
) -> Result<PassOutcome, HighlightError> {
    let Some(front_end) = path.and_then(|path| registry.for_path(path)) else {
        return Ok(PassOutcome::Unsupported);
    };
    let tokens = front_end.highlight(text, on_stage)?;
    Ok(PassOutcome::Highlighted(Highlighter::new(tokens)))
}

struct Request {
    version: u64,
    snapshot: Snapshot,
}

#[derive(Debug)]
struct Status {
    state: PipelineState,
    /// Version of the highlighter currently published (0 = none yet).
    published_version: u64,
    /// Highest version whose pass has finished, been skipped or been discarded.
    settled_version: u64,
    last_error: Option<String>,
}

struct Shared {
    registry: Arc<FrontEndRegistry>,
    config: PipelineConfig,
    current: ArcSwapOption<Highlighter>,
    latest_version: AtomicU64,
    status: Mutex<Status>,
    settled: Condvar,
}

impl Shared {
    fn is_superseded(&self, version: u64) -> bool {
        version < self.latest_version.load(Ordering::SeqCst)
    }

    fn execute(&self, request: Request) -> bool {
        let Request { version, snapshot } = request;

        if self.is_superseded(version) {
            debug!("Skipping highlighting request {version}: superseded before start");
            self.settle(version);
            return false;
        }

        let text = snapshot.rope.to_string();
        let result = run_pass(
            &self.registry,
            snapshot.path.as_deref(),
            &text,
            &mut |stage| self.enter(version, stage.into()),
        );
        self.finish(version, result)
    }

    fn enter(&self, version: u64, state: PipelineState) {
        // Checked under the lock: a newer pass may publish between the check and the write.
        let mut status = self.status.lock();
        if self.is_superseded(version) {
            return;
        }
        debug!("Highlighting request {version}: {:?} -> {state:?}", status.state);
        status.state = state;
    }

    fn settle(&self, version: u64) {
        let mut status = self.status.lock();
        status.settled_version = status.settled_version.max(version);
        self.settled.notify_all();
    }

    /// Apply the result of pass `version`. Returns `true` if something was published.
    fn finish(&self, version: u64, result: Result<PassOutcome, HighlightError>) -> bool {
        let mut status = self.status.lock();
        status.settled_version = status.settled_version.max(version);
        self.settled.notify_all();

        // The version check and the swap happen under the same lock, so a late pass cannot
        // slip in between a newer pass's check and its store.
        let latest = self.latest_version.load(Ordering::SeqCst);
        let stale = version != latest || version <= status.published_version;

        match result {
            Err(err) => {
                warn!("Highlighting error: {err}");
                status.last_error = Some(err.to_string());
                if !stale {
                    status.state = PipelineState::Failed;
                }
                false
            }
            Ok(_) if stale => {
                info!("Discarding stale highlighting for request {version} (latest {latest})");
                false
            }
            Ok(PassOutcome::Highlighted(highlighter)) => {
                debug!(
                    "Publishing highlighting for request {version} ({} tokens)",
                    highlighter.len()
                );
                self.current.store(Some(Arc::new(highlighter)));
                status.published_version = version;
                status.state = PipelineState::Ready;
                true
            }
            Ok(PassOutcome::Unsupported) => {
                status.state = PipelineState::Idle;
                if self.config.clear_on_unsupported {
                    self.current.store(None);
                    status.published_version = version;
                    true
                } else {
                    false
                }
            }
        }
    }
}

fn worker_loop(shared: Arc<Shared>, receiver: mpsc::Receiver<Request>) {
    debug!("Highlighting worker started");
    while let Ok(request) = receiver.recv() {
        if !shared.config.debounce.is_zero() {
            thread::sleep(shared.config.debounce);
        }

        // Drain triggers that arrived during the debounce; only the newest matters.
        let request = receiver.try_iter().last().unwrap_or(request);
        shared.execute(request);
    }
    debug!("Highlighting worker stopped");
}

/// Orchestrates highlighting passes and publishes the newest result.
pub struct HighlightPipeline {
    shared: Arc<Shared>,
    sender: Option<mpsc::Sender<Request>>,
    worker: Option<JoinHandle<()>>,
    last_trigger: Mutex<Option<(Rope, Option<PathBuf>)>>,
}

impl HighlightPipeline {
    fn with_shared(registry: Arc<FrontEndRegistry>, config: PipelineConfig) -> Arc<Shared> {
        Arc::new(Shared {
            registry,
            config,
            current: ArcSwapOption::empty(),
            latest_version: AtomicU64::new(0),
            status: Mutex::new(Status {
                state: PipelineState::Idle,
                published_version: 0,
                settled_version: 0,
                last_error: None,
            }),
            settled: Condvar::new(),
        })
    }

    /// Create a pipeline that runs passes on a background worker thread.
    pub fn new(registry: Arc<FrontEndRegistry>, config: PipelineConfig) -> io::Result<Self> {
        let thread_name = config.thread_name.clone();
        let shared = Self::with_shared(registry, config);
        let (sender, receiver) = mpsc::channel();

        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name(thread_name)
            .spawn(move || worker_loop(worker_shared, receiver))?;

        Ok(Self {
            shared,
            sender: Some(sender),
            worker: Some(worker),
            last_trigger: Mutex::new(None),
        })
    }

    /// Create a pipeline without a worker: [`HighlightPipeline::trigger`] runs passes inline.
    pub fn synchronous(registry: Arc<FrontEndRegistry>, config: PipelineConfig) -> Self {
        Self {
            shared: Self::with_shared(registry, config),
            sender: None,
            worker: None,
            last_trigger: Mutex::new(None),
        }
    }

    /// The registry front-ends are selected from.
    pub fn registry(&self) -> &Arc<FrontEndRegistry> {
        &self.shared.registry
    }

    /// Allocate the next request version for `snapshot`.
    fn begin(&self, snapshot: &Snapshot) -> u64 {
        *self.last_trigger.lock() = Some((snapshot.rope.clone(), snapshot.path.clone()));
        let version = self.shared.latest_version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Highlighting request {version} for document version {} ({})",
            snapshot.version,
            snapshot
                .path
                .as_deref()
                .map_or_else(|| String::from("<unnamed>"), |p| p.display().to_string())
        );
        version
    }

    /// Schedule a pass for `snapshot`.
    ///
    /// Returns the request version, or `None` if the snapshot has the same text identity and
    /// file as the previous trigger.
    pub fn trigger(&self, snapshot: Snapshot) -> Option<u64> {
        {
            let last = self.last_trigger.lock();
            if let Some((rope, path)) = last.as_ref() {
                if rope.ptr_eq(&snapshot.rope) && *path == snapshot.path {
                    return None;
                }
            }
        }

        let version = self.begin(&snapshot);
        let request = Request { version, snapshot };
        match &self.sender {
            Some(sender) => {
                if let Err(mpsc::SendError(request)) = sender.send(request) {
                    warn!("Highlighting worker is gone; running request {version} inline");
                    self.shared.execute(request);
                }
            }
            None => {
                self.shared.execute(request);
            }
        }
        Some(version)
    }

    /// Run a whole pass for `snapshot` on the calling thread.
    ///
    /// Returns `true` if the result was published (it may be discarded if another pass was
    /// triggered while this one ran).
    pub fn run_now(&self, snapshot: Snapshot) -> bool {
        let version = self.begin(&snapshot);
        self.shared.execute(Request { version, snapshot })
    }

    /// Block until the pass for `version` (or a newer one) has settled, or `timeout` elapses.
    pub fn wait_for(&self, version: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut status = self.shared.status.lock();
        while status.settled_version < version {
            if self.shared.settled.wait_until(&mut status, deadline).timed_out() {
                return status.settled_version >= version;
            }
        }
        true
    }

    /// Block until every triggered pass has settled, or `timeout` elapses.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.wait_for(self.latest_version(), timeout)
    }

    /// The published highlighter, if any.
    pub fn current(&self) -> Option<Arc<Highlighter>> {
        self.shared.current.load_full()
    }

    /// Styled spans intersecting `[start, end)` from the published highlighter.
    pub fn highlight_range(&self, start: usize, end: usize) -> Vec<StyledSpan> {
        self.shared
            .current
            .load()
            .as_ref()
            .map(|highlighter| highlighter.highlight_range(start, end))
            .unwrap_or_default()
    }

    /// Current pipeline state.
    pub fn state(&self) -> PipelineState {
        self.shared.status.lock().state
    }

    /// Message of the most recent failed pass.
    pub fn last_error(&self) -> Option<String> {
        self.shared.status.lock().last_error.clone()
    }

    /// Newest request version handed out.
    pub fn latest_version(&self) -> u64 {
        self.shared.latest_version.load(Ordering::SeqCst)
    }

    /// Request version of the published highlighter (0 if nothing was published yet).
    pub fn published_version(&self) -> u64 {
        self.shared.status.lock().published_version
    }
}

impl Drop for HighlightPipeline {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Highlighting worker panicked");
            }
        }
    }
}
