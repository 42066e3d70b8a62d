//! Logging facilities for ZimLX.
//!
//! ZimLX uses the `tracing` crate for instrumentation. To see logs, install a
//! subscriber in the host application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // ...
//! }
//! ```
//!
//! Failures of fire-and-forget work are reported at `error` level under the
//! [`targets::LOOPER`] target, so they are never silently dropped even when
//! nothing observes the work item.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem, for
/// example `RUST_LOG=zimlx_core::icons=debug`.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "zimlx_core";
    /// Looper thread lifecycle and uncaught work failures.
    pub const LOOPER: &str = "zimlx_core::looper";
    /// Cross-thread dispatch.
    pub const DISPATCH: &str = "zimlx_core::dispatch";
    /// Icon and prediction reload.
    pub const ICONS: &str = "zimlx_core::icons";
    /// Package and permission lookups.
    pub const PACKAGE: &str = "zimlx_core::package";
    /// Configuration loading.
    pub const CONFIG: &str = "zimlx_core::config";
}

