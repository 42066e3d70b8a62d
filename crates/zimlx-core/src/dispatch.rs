//! Thread-affinity dispatch across the launcher's logical threads.
//!
//! A [`ThreadContext`] owns one [`Looper`] per [`LogicalThread`]. It is built
//! once at startup and shared by `Arc` with everything that needs to move
//! work between threads.
//!
//! - [`ThreadContext::run_on`] runs work inline when the caller is already on
//!   the target thread and queues it there otherwise.
//! - [`ThreadContext::call_on_main`] blocks until the main thread has produced
//!   a value.
//!
//! Worker loopers are spawned lazily on first use and live as long as the
//! context. The main looper is supplied at construction, either attached to
//! the host's UI thread or spawned as a dedicated thread.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use zimlx_core::config::ThreadConfig;
//! use zimlx_core::dispatch::{LogicalThread, ThreadContext};
//!
//! let ctx = Arc::new(ThreadContext::with_spawned_main(ThreadConfig::default()).unwrap());
//!
//! let answer = ctx.call_on_main(|x: i32| x * 2, 21).unwrap();
//! assert_eq!(answer, 42);
//!
//! ctx.run_on(LogicalThread::IconPack, || {
//!     // Runs on the "icon-pack" thread.
//! }).unwrap();
//! ```
//!
//! # Deadlocks
//!
//! `call_on_main` blocks the caller. Calling it from a thread the main thread
//! is itself blocked on will deadlock. Calls made on the main thread never
//! block because they run inline.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam_channel::bounded;
use parking_lot::Mutex;

use crate::config::ThreadConfig;
use crate::error::DispatchError;
use crate::logging::targets;
use crate::looper::{LoopDriver, Looper, LooperConfig, UncaughtHandler};

/// A named execution context with a serial FIFO queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalThread {
    /// The UI thread.
    Main,
    /// Background work that feeds the UI.
    UiWorker,
    /// Icon pack loading and icon reloads.
    IconPack,
    /// UI-side icon pack work.
    IconPackUi,
}

impl LogicalThread {
    /// All logical threads, main first.
    pub const ALL: [Self; 4] = [Self::Main, Self::UiWorker, Self::IconPack, Self::IconPackUi];

    /// The thread name used for the backing looper.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::UiWorker => "ui-worker",
            Self::IconPack => "icon-pack",
            Self::IconPackUi => "icon-pack-ui",
        }
    }
}

impl fmt::Display for LogicalThread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Process-wide set of logical threads.
pub struct ThreadContext {
    main: Looper,
    ui_worker: OnceLock<Looper>,
    icon_pack: OnceLock<Looper>,
    icon_pack_ui: OnceLock<Looper>,
    /// Serializes lazy looper creation.
    spawn_lock: Mutex<()>,
    /// Set by `shutdown`; no looper is created afterwards.
    shut_down: AtomicBool,
    config: ThreadConfig,
    uncaught: Option<UncaughtHandler>,
    /// Work items that took a cross-thread hop.
    dispatches: AtomicU64,
}

impl ThreadContext {
    /// Create a context around an existing main looper.
    pub fn new(main: Looper, config: ThreadConfig) -> Self {
        Self {
            main,
            ui_worker: OnceLock::new(),
            icon_pack: OnceLock::new(),
            icon_pack_ui: OnceLock::new(),
            spawn_lock: Mutex::new(()),
            shut_down: AtomicBool::new(false),
            config,
            uncaught: None,
            dispatches: AtomicU64::new(0),
        }
    }

    /// Make the calling thread the main thread.
    ///
    /// The returned driver must be pumped on this thread for main-thread work
    /// posted from elsewhere to run.
    pub fn attach_main(config: ThreadConfig) -> (Self, LoopDriver) {
        let (main, driver) = Looper::attach_current(config.looper_config(LogicalThread::Main));
        (Self::new(main, config), driver)
    }

    /// Create a context whose main thread is a dedicated spawned thread.
    pub fn with_spawned_main(config: ThreadConfig) -> Result<Self, DispatchError> {
        let main = Looper::spawn(config.looper_config(LogicalThread::Main))?;
        Ok(Self::new(main, config))
    }

    /// Install a handler for failures of work nobody observes.
    ///
    /// Applies to the main looper and every worker looper created afterwards.
    pub fn with_uncaught_handler(mut self, handler: UncaughtHandler) -> Self {
        self.main.set_uncaught_handler(Some(handler.clone()));
        for cell in [&self.ui_worker, &self.icon_pack, &self.icon_pack_ui] {
            if let Some(looper) = cell.get() {
                looper.set_uncaught_handler(Some(handler.clone()));
            }
        }
        self.uncaught = Some(handler);
        self
    }

    /// The thread configuration.
    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    /// The main looper.
    pub fn main(&self) -> &Looper {
        &self.main
    }

    /// The looper backing `thread`, spawning it on first access.
    pub fn looper(&self, thread: LogicalThread) -> Result<&Looper, DispatchError> {
        let cell = match thread {
            LogicalThread::Main => return Ok(&self.main),
            LogicalThread::UiWorker => &self.ui_worker,
            LogicalThread::IconPack => &self.icon_pack,
            LogicalThread::IconPackUi => &self.icon_pack_ui,
        };

        if let Some(looper) = cell.get() {
            return Ok(looper);
        }

        let _guard = self.spawn_lock.lock();
        if let Some(looper) = cell.get() {
            return Ok(looper);
        }
        if self.shut_down.load(Ordering::Acquire) {
            return Err(DispatchError::Closed {
                name: thread.name().to_string(),
            });
        }
        let looper = Looper::spawn(self.looper_config(thread))?;
        looper.set_uncaught_handler(self.uncaught.clone());
        tracing::debug!(target: targets::DISPATCH, %thread, "created logical thread");
        Ok(cell.get_or_init(|| looper))
    }

    /// Check if the calling thread is `thread`.
    ///
    /// Never spawns: a worker that does not exist yet cannot be current.
    pub fn is_on(&self, thread: LogicalThread) -> bool {
        match thread {
            LogicalThread::Main => self.main.is_current(),
            LogicalThread::UiWorker => self.ui_worker.get().is_some_and(Looper::is_current),
            LogicalThread::IconPack => self.icon_pack.get().is_some_and(Looper::is_current),
            LogicalThread::IconPackUi => self.icon_pack_ui.get().is_some_and(Looper::is_current),
        }
    }

    /// Check if the calling thread is the main thread.
    pub fn is_main_thread(&self) -> bool {
        self.main.is_current()
    }

    /// Number of work items that were queued to another thread rather than run
    /// inline.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::Acquire)
    }

    /// Run `work` on `thread`.
    ///
    /// When the caller is already on `thread`, `work` runs before this returns.
    /// Otherwise it is queued behind earlier work on that thread and runs
    /// exactly once at some later time. Fails only if the looper has quit or
    /// cannot be created.
    pub fn run_on<F>(&self, thread: LogicalThread, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        let looper = self.looper(thread)?;
        if looper.is_current() {
            work();
            return Ok(());
        }
        looper.post(work)?;
        self.dispatches.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(target: targets::DISPATCH, %thread, "queued work");
        Ok(())
    }

    /// Run `work` on the main thread.
    pub fn run_on_main<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_on(LogicalThread::Main, work)
    }

    /// Run `work` on the UI worker thread.
    pub fn run_on_ui_worker<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_on(LogicalThread::UiWorker, work)
    }

    /// Run `work` on the icon pack thread.
    pub fn run_on_icon_pack<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_on(LogicalThread::IconPack, work)
    }

    /// Run `work` on the icon pack UI thread.
    pub fn run_on_icon_pack_ui<F>(&self, work: F) -> Result<(), DispatchError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.run_on(LogicalThread::IconPackUi, work)
    }

    /// Produce a value on the main thread, blocking until it is available.
    ///
    /// On the main thread `creator` runs inline with no queue hop, and a panic
    /// unwinds straight into the caller. From any other thread the call waits
    /// for the main looper:
    ///
    /// - [`DispatchError::Invocation`] if `creator` panicked on the main thread
    ///   (the main looper keeps running);
    /// - [`DispatchError::Interrupted`] if the main looper stopped before
    ///   producing a result.
    pub fn call_on_main<A, T, F>(&self, creator: F, arg: A) -> Result<T, DispatchError>
    where
        F: FnOnce(A) -> T + Send + 'static,
        A: Send + 'static,
        T: Send + 'static,
    {
        if self.main.is_current() {
            return Ok(creator(arg));
        }

        let (result_sender, result_receiver) = bounded(1);
        let submitted = self.main.post(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| creator(arg)))
                .map_err(|payload| DispatchError::from_panic(LogicalThread::Main, &*payload));
            let _ = result_sender.send(outcome);
        });
        if submitted.is_err() {
            return Err(DispatchError::Interrupted {
                thread: LogicalThread::Main,
            });
        }
        self.dispatches.fetch_add(1, Ordering::AcqRel);

        match result_receiver.recv() {
            Ok(outcome) => outcome,
            // The job was dropped without running.
            Err(_) => Err(DispatchError::Interrupted {
                thread: LogicalThread::Main,
            }),
        }
    }

    /// Wrap `creator` so every call produces its value on the main thread.
    pub fn ensure_on_main<A, T, F>(
        self: &Arc<Self>,
        creator: F,
    ) -> impl Fn(A) -> Result<T, DispatchError> + Send + Sync + 'static
    where
        F: Fn(A) -> T + Send + Sync + 'static,
        A: Send + 'static,
        T: Send + 'static,
    {
        let ctx = Arc::clone(self);
        let creator = Arc::new(creator);
        move |arg| {
            let creator = Arc::clone(&creator);
            ctx.call_on_main(move |a| creator(a), arg)
        }
    }

    /// Report a failure of unobserved work that ran on `thread`.
    pub fn report_uncaught(&self, thread: LogicalThread, message: impl Into<String>) {
        let message = message.into();
        match self.looper(thread) {
            Ok(looper) => looper.report_uncaught(message),
            Err(err) => tracing::error!(
                target: targets::DISPATCH,
                %thread,
                "uncaught failure ({err}): {message}"
            ),
        }
    }

    /// Quit every looper after draining its queue, then wait for the spawned
    /// ones to exit.
    ///
    /// Loopers that were never created stay that way. The calling thread's
    /// own looper is quit but not joined, and an attached main looper only
    /// finishes its queue when its driver is pumped.
    pub fn shutdown(&self) {
        let workers: Vec<&Looper> = {
            let _guard = self.spawn_lock.lock();
            self.shut_down.store(true, Ordering::Release);
            [&self.ui_worker, &self.icon_pack, &self.icon_pack_ui]
                .into_iter()
                .filter_map(OnceLock::get)
                .collect()
        };

        self.main.quit();
        for looper in &workers {
            looper.quit();
        }
        for looper in workers.into_iter().chain([&self.main]) {
            if !looper.is_current() {
                looper.join();
            }
        }
        tracing::debug!(target: targets::DISPATCH, "logical threads shut down");
    }

    fn looper_config(&self, thread: LogicalThread) -> LooperConfig {
        self.config.looper_config(thread)
    }
}

impl fmt::Debug for ThreadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadContext")
            .field("main", &self.main)
            .field("ui_worker", &self.ui_worker.get())
            .field("icon_pack", &self.icon_pack.get())
            .field("icon_pack_ui", &self.icon_pack_ui.get())
            .field("dispatches", &self.dispatch_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(ThreadContext: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::looper::UncaughtFailure;
    use std::sync::atomic::{AtomicBool, AtomicI32};
    use std::thread;
    use std::time::Duration;

    fn context() -> Arc<ThreadContext> {
        Arc::new(ThreadContext::with_spawned_main(ThreadConfig::default()).unwrap())
    }

    /// Wait until everything queued on `thread` so far has run.
    fn flush(ctx: &ThreadContext, thread: LogicalThread) {
        let (tx, rx) = bounded(1);
        ctx.looper(thread)
            .unwrap()
            .post(move || {
                let _ = tx.send(());
            })
            .unwrap();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    #[test]
    fn test_thread_names() {
        let names: Vec<_> = LogicalThread::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(names, ["main", "ui-worker", "icon-pack", "icon-pack-ui"]);
    }

    #[test]
    fn test_workers_are_lazy_and_stable() {
        let ctx = context();
        assert!(ctx.icon_pack.get().is_none());

        let first = ctx.looper(LogicalThread::IconPack).unwrap().thread_id();
        let second = ctx.looper(LogicalThread::IconPack).unwrap().thread_id();
        assert_eq!(first, second);
        assert_ne!(first, ctx.main().thread_id());
        assert!(ctx.ui_worker.get().is_none());
        ctx.shutdown();
    }

    #[test]
    fn test_run_on_lands_on_named_thread() {
        let ctx = context();
        let (tx, rx) = bounded(1);
        let inner = ctx.clone();

        ctx.run_on(LogicalThread::UiWorker, move || {
            let name = thread::current().name().map(str::to_owned);
            tx.send((name, inner.is_on(LogicalThread::UiWorker))).unwrap();
        })
        .unwrap();

        let (name, on_thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("ui-worker"));
        assert!(on_thread);
        assert_eq!(ctx.dispatch_count(), 1);
        ctx.shutdown();
    }

    #[test]
    fn test_run_on_same_thread_is_synchronous() {
        let ctx = context();
        let (tx, rx) = bounded(1);
        let inner = ctx.clone();

        ctx.run_on(LogicalThread::IconPack, move || {
            let ran = Arc::new(AtomicBool::new(false));
            let ran_clone = ran.clone();
            inner
                .run_on(LogicalThread::IconPack, move || {
                    ran_clone.store(true, Ordering::SeqCst);
                })
                .unwrap();
            tx.send(ran.load(Ordering::SeqCst)).unwrap();
        })
        .unwrap();

        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        // Only the outer hop was a dispatch.
        assert_eq!(ctx.dispatch_count(), 1);
        ctx.shutdown();
    }

    #[test]
    fn test_call_on_main_from_worker_returns_value() {
        let ctx = context();
        let main_id = ctx.main().thread_id();

        let (value, ran_on) = ctx
            .call_on_main(
                |s: String| (s.len(), thread::current().id()),
                "launcher".to_string(),
            )
            .unwrap();

        assert_eq!(value, 8);
        assert_eq!(ran_on, main_id);
        assert_eq!(ctx.dispatch_count(), 1);
        ctx.shutdown();
    }

    #[test]
    fn test_call_on_main_on_main_is_inline() {
        let ctx = context();
        let (tx, rx) = bounded(1);
        let inner = ctx.clone();

        ctx.run_on_main(move || {
            let before = inner.dispatch_count();
            let result = inner.call_on_main(|x: i32| x + 1, 41);
            tx.send((result, inner.dispatch_count() - before)).unwrap();
        })
        .unwrap();

        let (result, hops) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result, Ok(42));
        assert_eq!(hops, 0);
        ctx.shutdown();
    }

    #[test]
    fn test_call_on_main_wraps_panic() {
        let ctx = context();

        let err = ctx
            .call_on_main(|_: ()| -> i32 { panic!("creator failed") }, ())
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Invocation {
                thread: LogicalThread::Main,
                message: "creator failed".to_string(),
            }
        );

        // The main looper is still serving.
        assert_eq!(ctx.call_on_main(|x: u8| x, 7), Ok(7));
        ctx.shutdown();
    }

    #[test]
    fn test_call_on_main_after_shutdown_is_interrupted() {
        let ctx = context();
        ctx.shutdown();
        ctx.main().join();

        let err = ctx.call_on_main(|x: i32| x, 1).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Interrupted {
                thread: LogicalThread::Main
            }
        );
    }

    #[test]
    fn test_ensure_on_main() {
        let ctx = context();
        let main_id = ctx.main().thread_id();
        let create = ctx.ensure_on_main(|n: u32| (n * 3, thread::current().id()));

        let handle = thread::spawn(move || create(5));
        let (value, ran_on) = handle.join().unwrap().unwrap();

        assert_eq!(value, 15);
        assert_eq!(ran_on, main_id);
        ctx.shutdown();
    }

    #[test]
    fn test_attached_main_blocks_until_pumped() {
        let (ctx, driver) = ThreadContext::attach_main(ThreadConfig::default());
        let ctx = Arc::new(ctx);
        assert!(ctx.is_main_thread());

        let remote = ctx.clone();
        let caller = thread::spawn(move || remote.call_on_main(|x: i32| x * 10, 4));

        // Pump until the blocked caller's request has been served.
        let mut served = 0;
        while served == 0 {
            served = driver.run_pending();
            thread::yield_now();
        }

        assert_eq!(caller.join().unwrap(), Ok(40));
    }

    #[test]
    fn test_uncaught_handler_applies_to_lazy_workers() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let failures_clone = failures.clone();
        let ctx = ThreadContext::with_spawned_main(ThreadConfig::default())
            .unwrap()
            .with_uncaught_handler(Arc::new(move |f: &UncaughtFailure| {
                failures_clone.lock().push(f.clone());
            }));

        ctx.run_on(LogicalThread::UiWorker, || panic!("worker failed"))
            .unwrap();
        flush(&ctx, LogicalThread::UiWorker);

        let failures = failures.lock();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].looper, "ui-worker");
        assert_eq!(failures[0].message, "worker failed");
        ctx.shutdown();
    }

    #[test]
    fn test_fifo_per_thread_from_many_callers() {
        let ctx = context();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let total = Arc::new(AtomicI32::new(0));

        let handles: Vec<_> = (0..4)
            .map(|caller| {
                let ctx = ctx.clone();
                let seen = seen.clone();
                let total = total.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let seen = seen.clone();
                        let total = total.clone();
                        ctx.run_on(LogicalThread::IconPackUi, move || {
                            seen.lock().push((caller, i));
                            total.fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        flush(&ctx, LogicalThread::IconPackUi);

        assert_eq!(total.load(Ordering::SeqCst), 100);
        let seen = seen.lock();
        for caller in 0..4 {
            let order: Vec<_> = seen
                .iter()
                .filter(|(c, _)| *c == caller)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(order, (0..25).collect::<Vec<_>>());
        }
        ctx.shutdown();
    }

    #[test]
    fn test_shutdown_joins_workers_and_stops_lazy_creation() {
        let ctx = context();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        ctx.run_on(LogicalThread::IconPack, move || {
            thread::sleep(Duration::from_millis(20));
            ran_clone.store(true, Ordering::SeqCst);
        })
        .unwrap();

        ctx.shutdown();

        // Queued work finished before shutdown returned.
        assert!(ran.load(Ordering::SeqCst));
        assert!(!ctx.main().is_running());
        assert!(!ctx.looper(LogicalThread::IconPack).unwrap().is_running());
        assert!(matches!(
            ctx.looper(LogicalThread::UiWorker),
            Err(DispatchError::Closed { ref name }) if name == "ui-worker"
        ));
        assert!(ctx.ui_worker.get().is_none());
        assert!(ctx.run_on(LogicalThread::IconPack, || {}).is_err());
    }
}
