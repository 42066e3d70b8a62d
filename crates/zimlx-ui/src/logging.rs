//! Logging targets for the launcher UI helpers.
//!
//! Like `zimlx_core`, this crate only emits `tracing` events; the host
//! installs the subscriber.

/// Target names for log filtering, for example `RUST_LOG=zimlx_ui::pager=warn`.
pub mod targets {
    /// View tree helpers and attach callbacks.
    pub const VIEW: &str = "zimlx_ui::view";
    /// Pager adapter.
    pub const PAGER: &str = "zimlx_ui::pager";
}
