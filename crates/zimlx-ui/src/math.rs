//! Numeric helpers for layout and animation code.

use std::ops::{BitAnd, BitOr, Not};

/// Clamp `value` to `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics; with `min > max` the lower bound
/// is checked first.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Round half up to a whole number.
#[inline]
pub fn round(value: f32) -> f32 {
    (value + 0.5).floor()
}

#[inline]
pub fn ceil_to_int(value: f32) -> i32 {
    value.ceil() as i32
}

/// Bound `value` to `[lower, upper]`, the upper bound applied first.
#[inline]
pub fn bound_to_range<T: PartialOrd>(value: T, lower: T, upper: T) -> T {
    let capped = if value > upper { upper } else { value };
    if capped < lower { lower } else { capped }
}

/// Check whether any bit of `flag` is set in `value`.
#[inline]
pub fn has_flag<T>(value: T, flag: T) -> bool
where
    T: BitAnd<Output = T> + PartialEq + Default,
{
    (value & flag) != T::default()
}

/// Set or clear the bits of `flag` in `value`.
#[inline]
pub fn set_flag<T>(value: T, flag: T, on: bool) -> T
where
    T: BitAnd<Output = T> + BitOr<Output = T> + Not<Output = T>,
{
    if on { value | flag } else { value & !flag }
}

/// Screen density used to convert between density-independent and physical
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMetrics {
    /// Physical pixels per density-independent pixel.
    pub density: f32,
    /// Physical pixels per scaled pixel (density times font scale).
    pub scaled_density: f32,
}

impl DisplayMetrics {
    /// Metrics for `density` with the default font scale.
    pub fn new(density: f32) -> Self {
        Self {
            density,
            scaled_density: density,
        }
    }

    /// Apply a user font scale.
    pub fn with_font_scale(mut self, scale: f32) -> Self {
        self.scaled_density = self.density * scale;
        self
    }

    pub fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.density
    }

    pub fn px_to_dp(&self, px: f32) -> f32 {
        px / self.density
    }

    pub fn sp_to_px(&self, sp: f32) -> f32 {
        sp * self.scaled_density
    }

    /// `dp` in whole pixels, rounded.
    pub fn px_from_dp(&self, dp: f32) -> i32 {
        round(self.dp_to_px(dp)) as i32
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self::new(1.0)
    }
}
