//! Single-threaded serial task queues bound to one execution thread.
//!
//! A [`Looper`] owns a FIFO queue of work items and exactly one thread that
//! drains it. Items posted to the same looper run strictly in submission
//! order; there is no ordering between different loopers.
//!
//! Loopers come in two flavours:
//!
//! - [`Looper::spawn`] starts a dedicated named thread which lives until the
//!   looper quits or every handle is dropped.
//! - [`Looper::attach_current`] binds the calling thread. The returned
//!   [`LoopDriver`] must be pumped by its owner, which is how a host makes its
//!   own UI thread the main looper.
//!
//! # Example
//!
//! ```
//! use zimlx_core::looper::{Looper, LooperConfig};
//! use std::sync::mpsc;
//!
//! let looper = Looper::spawn(LooperConfig::with_name("icon-pack")).unwrap();
//! let (tx, rx) = mpsc::channel();
//!
//! looper.post(move || {
//!     tx.send(std::thread::current().name().map(str::to_owned)).unwrap();
//! }).unwrap();
//!
//! assert_eq!(rx.recv().unwrap().as_deref(), Some("icon-pack"));
//! looper.quit();
//! looper.join();
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, panic_message};
use crate::logging::targets;

/// What a looper does when a fire-and-forget work item panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicPolicy {
    /// Report the failure to the uncaught handler and keep serving the queue.
    #[default]
    Log,
    /// Report the failure, then resume unwinding. The looper thread dies and
    /// later posts fail with [`DispatchError::Closed`].
    Propagate,
}

/// A failure that escaped a work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncaughtFailure {
    /// Name of the looper the work ran on.
    pub looper: String,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Callback invoked for failures no caller observes.
pub type UncaughtHandler = Arc<dyn Fn(&UncaughtFailure) + Send + Sync>;

/// Configuration for creating a Looper.
#[derive(Debug, Clone)]
pub struct LooperConfig {
    /// Name of the looper and its thread.
    pub name: String,
    /// Stack size for the looper thread in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
    /// Behaviour when a work item panics.
    pub panic_policy: PanicPolicy,
}

impl Default for LooperConfig {
    fn default() -> Self {
        Self {
            name: "zimlx-looper".to_string(),
            stack_size: None,
            panic_policy: PanicPolicy::default(),
        }
    }
}

impl LooperConfig {
    /// Create a new configuration with the given name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the thread stack size.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Set the panic policy.
    pub fn panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.panic_policy = policy;
        self
    }
}

type Job = Box<dyn FnOnce() + Send + 'static>;

enum LooperTask {
    Run(Job),
    Quit,
}

/// State shared between looper handles and the looper thread.
struct LooperState {
    name: String,
    thread_id: ThreadId,
    /// Held for reading across every send, so no work lands behind `Quit`.
    running: RwLock<bool>,
    /// Items queued but not yet finished.
    pending: AtomicUsize,
    /// Items ever accepted by `post`.
    posted: AtomicU64,
    panic_policy: PanicPolicy,
    uncaught: RwLock<Option<UncaughtHandler>>,
}

impl LooperState {
    fn new(name: String, thread_id: ThreadId, panic_policy: PanicPolicy) -> Self {
        Self {
            name,
            thread_id,
            running: RwLock::new(true),
            pending: AtomicUsize::new(0),
            posted: AtomicU64::new(0),
            panic_policy,
            uncaught: RwLock::new(None),
        }
    }

    fn execute(&self, job: Job) {
        let _span =
            tracing::trace_span!(target: targets::LOOPER, "looper_item", looper = %self.name)
                .entered();
        let outcome = panic::catch_unwind(AssertUnwindSafe(job));
        self.pending.fetch_sub(1, Ordering::AcqRel);

        if let Err(payload) = outcome {
            self.report_uncaught(panic_message(&*payload));
            if self.panic_policy == PanicPolicy::Propagate {
                panic::resume_unwind(payload);
            }
        }
    }

    fn report_uncaught(&self, message: String) {
        let failure = UncaughtFailure {
            looper: self.name.clone(),
            message,
        };
        tracing::error!(
            target: targets::LOOPER,
            looper = %failure.looper,
            "uncaught failure in work item: {}",
            failure.message
        );
        let handler = self.uncaught.read().clone();
        if let Some(handler) = handler {
            handler(&failure);
        }
    }
}

/// Marks the looper as stopped when the looper thread exits, even by panic.
struct ExitGuard(Arc<LooperState>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        *self.0.running.write() = false;
        tracing::debug!(target: targets::LOOPER, looper = %self.0.name, "looper exited");
    }
}

/// Drain the queue until quit or until every sender is gone.
fn looper_loop(receiver: &Receiver<LooperTask>, state: &LooperState) {
    while let Ok(task) = receiver.recv() {
        match task {
            LooperTask::Run(job) => state.execute(job),
            LooperTask::Quit => {
                drain(receiver, state);
                break;
            }
        }
    }
}

/// Run whatever is still queued without blocking.
fn drain(receiver: &Receiver<LooperTask>, state: &LooperState) {
    while let Ok(task) = receiver.try_recv() {
        if let LooperTask::Run(job) = task {
            state.execute(job);
        }
    }
}

/// A handle to a named serial task queue bound to one thread.
///
/// `Looper` is cheap to clone; all clones refer to the same queue and thread.
#[derive(Clone)]
pub struct Looper {
    sender: Sender<LooperTask>,
    state: Arc<LooperState>,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Looper {
    /// Start a looper on a new dedicated thread.
    pub fn spawn(config: LooperConfig) -> Result<Self, DispatchError> {
        let (sender, receiver) = unbounded::<LooperTask>();
        let (state_tx, state_rx) = crossbeam_channel::bounded::<Arc<LooperState>>(1);

        let mut builder = thread::Builder::new().name(config.name.clone());
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || {
                // The state carries this thread's id, so it arrives after spawn.
                let Ok(state) = state_rx.recv() else {
                    return;
                };
                let _guard = ExitGuard(state.clone());
                looper_loop(&receiver, &state);
            })
            .map_err(|e| DispatchError::Spawn {
                name: config.name.clone(),
                message: e.to_string(),
            })?;

        let state = Arc::new(LooperState::new(
            config.name,
            handle.thread().id(),
            config.panic_policy,
        ));
        let _ = state_tx.send(state.clone());

        tracing::debug!(target: targets::LOOPER, looper = %state.name, "looper started");

        Ok(Self {
            sender,
            state,
            handle: Arc::new(Mutex::new(Some(handle))),
        })
    }

    /// Bind a looper to the calling thread.
    ///
    /// Work posted from other threads accumulates until the returned driver
    /// is pumped on this thread.
    pub fn attach_current(config: LooperConfig) -> (Self, LoopDriver) {
        let (sender, receiver) = unbounded::<LooperTask>();
        let state = Arc::new(LooperState::new(
            config.name,
            thread::current().id(),
            config.panic_policy,
        ));

        tracing::debug!(target: targets::LOOPER, looper = %state.name, "looper attached");

        let looper = Self {
            sender,
            state: state.clone(),
            handle: Arc::new(Mutex::new(None)),
        };
        let driver = LoopDriver {
            receiver,
            state,
            _not_send: PhantomData,
        };
        (looper, driver)
    }

    /// The looper's name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The id of the thread bound to this looper.
    pub fn thread_id(&self) -> ThreadId {
        self.state.thread_id
    }

    /// Check if the calling thread is this looper's thread.
    #[inline]
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.state.thread_id
    }

    /// Check if the looper still accepts work.
    pub fn is_running(&self) -> bool {
        *self.state.running.read()
    }

    /// Number of items queued or executing.
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    /// Total number of items ever accepted by [`post`](Self::post).
    pub fn posted_count(&self) -> u64 {
        self.state.posted.load(Ordering::Acquire)
    }

    /// Install the handler for failures of unobserved work.
    pub fn set_uncaught_handler(&self, handler: Option<UncaughtHandler>) {
        *self.state.uncaught.write() = handler;
    }

    /// Report a failure to this looper's uncaught handler.
    pub fn report_uncaught(&self, message: impl Into<String>) {
        self.state.report_uncaught(message.into());
    }

    /// Enqueue a work item at the back of the queue.
    ///
    /// The item always goes through the queue, even when called from the
    /// looper thread itself.
    pub fn post<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        let running = self.state.running.read();
        if !*running {
            return Err(self.closed());
        }

        self.state.pending.fetch_add(1, Ordering::AcqRel);
        match self.sender.send(LooperTask::Run(Box::new(work))) {
            Ok(()) => {
                self.state.posted.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
            Err(_) => {
                self.state.pending.fetch_sub(1, Ordering::AcqRel);
                Err(self.closed())
            }
        }
    }

    /// Run `work` inline when called on the looper thread, otherwise post it.
    pub fn run_or_post<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_current() {
            work();
            Ok(())
        } else {
            self.post(work)
        }
    }

    /// Stop accepting work. Items already queued still run.
    pub fn quit(&self) {
        let mut running = self.state.running.write();
        if *running {
            *running = false;
            let _ = self.sender.send(LooperTask::Quit);
        }
    }

    /// Wait for a spawned looper thread to finish.
    ///
    /// Returns `false` for attached loopers, when already joined, or when the
    /// thread died by panic.
    pub fn join(&self) -> bool {
        let handle = self.handle.lock().take();
        match handle {
            Some(h) => h.join().is_ok(),
            None => false,
        }
    }

    fn closed(&self) -> DispatchError {
        DispatchError::Closed {
            name: self.state.name.clone(),
        }
    }
}

impl fmt::Debug for Looper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Looper")
            .field("name", &self.state.name)
            .field("thread_id", &self.state.thread_id)
            .field("running", &self.is_running())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Pumps an attached looper on its own thread.
///
/// The driver is `!Send`: it can only be used on the thread it was created on.
pub struct LoopDriver {
    receiver: Receiver<LooperTask>,
    state: Arc<LooperState>,
    _not_send: PhantomData<*const ()>,
}

impl LoopDriver {
    /// Process items until the looper quits. Blocks the calling thread.
    ///
    /// Returns after draining the queue if the looper already quit, including
    /// when [`run_pending`](Self::run_pending) consumed the quit request.
    pub fn run(&self) {
        let _guard = ExitGuard(self.state.clone());
        if !*self.state.running.read() {
            drain(&self.receiver, &self.state);
            return;
        }
        looper_loop(&self.receiver, &self.state);
    }

    /// Process every item queued right now and return how many ran.
    ///
    /// Items posted by the processed items are left for the next call.
    pub fn run_pending(&self) -> usize {
        let available = self.receiver.len();
        let mut processed = 0;
        for _ in 0..available {
            match self.receiver.try_recv() {
                Ok(LooperTask::Run(job)) => {
                    self.state.execute(job);
                    processed += 1;
                }
                Ok(LooperTask::Quit) => {}
                Err(_) => break,
            }
        }
        processed
    }
}

impl fmt::Debug for LoopDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopDriver")
            .field("looper", &self.state.name)
            .field("queued", &self.receiver.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(Looper: Send, Sync, Clone);
static_assertions::assert_not_impl_any!(LoopDriver: Send);
