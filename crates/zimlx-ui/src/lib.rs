//! UI helpers for the ZimLX launcher.
//!
//! Color math and themed color state lists, view tree traversal, the pager
//! adapter, animation interpolators and the small text, collection, XML and
//! JSON utilities the launcher UI is built from.
//!
//! # Example
//!
//! ```
//! use zimlx_ui::color::Argb;
//!
//! let accent = Argb::from_hex("#FF4285F4").unwrap();
//! let text = accent.foreground();
//! assert!(text.contrast_ratio(accent) >= 3.0);
//! ```

pub mod collections;
pub mod color;
mod error;
pub mod interpolator;
pub mod json;
pub mod logging;
pub mod math;
pub mod pager;
pub mod text;
pub mod theme;
pub mod view;
pub mod xml;

pub use color::Argb;
pub use error::{Error, Result};
pub use interpolator::{Interpolator, ReverseInput, ReverseOutput};
pub use math::DisplayMetrics;
pub use pager::ViewPagerAdapter;
pub use theme::{ColorStateList, StateSet, StyledAttributes};
pub use view::{AttachNotifier, View, ViewGroup};
