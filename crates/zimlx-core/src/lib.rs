//! Core systems for the ZimLX launcher.
//!
//! This crate provides:
//!
//! - **Loopers**: named single-threaded serial task queues
//! - **Dispatch**: thread-affinity helpers that run work on the main, UI
//!   worker and icon pack threads, inline when already there
//! - **Icon reload**: the fan-out that reloads icons across user profiles
//!   and refreshes predictions
//! - **Packages**: component keys and permission checks
//! - **Configuration**: TOML launcher configuration with feature flags
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use zimlx_core::{LauncherConfig, LogicalThread, ThreadContext};
//!
//! let config = LauncherConfig::default();
//! let ctx = Arc::new(ThreadContext::with_spawned_main(config.threads.clone())?);
//!
//! let worker = ctx.clone();
//! ctx.run_on(LogicalThread::UiWorker, move || {
//!     let title = worker.call_on_main(|n: usize| format!("{n} apps"), 12).unwrap();
//!     assert_eq!(title, "12 apps");
//! })?;
//! # Ok::<(), zimlx_core::Error>(())
//! ```

pub mod config;
pub mod dispatch;
mod error;
pub mod icons;
pub mod logging;
pub mod looper;
pub mod package;

pub use config::{FeatureFlags, LauncherConfig, Preferences, ThreadConfig};
pub use dispatch::{LogicalThread, ThreadContext};
pub use error::{ConfigError, DispatchError, Error, IconReloadError, PackageError, Result};
pub use icons::{IconReloadServices, ReloadSummary, reload_icons, reload_icons_from_components};
pub use looper::{LoopDriver, Looper, LooperConfig, PanicPolicy, UncaughtFailure, UncaughtHandler};
pub use package::{ComponentKey, ComponentName, PackageUserKey, UserHandle};
