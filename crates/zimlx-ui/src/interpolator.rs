//! Animation interpolators.
//!
//! An interpolator maps animation progress (0.0 to 1.0) to the fraction of
//! the change to apply. Any `Fn(f32) -> f32` is an interpolator, and the
//! reversing wrappers flip an existing one around either axis.

use std::f32::consts::PI;

/// Maps linear progress to eased progress.
pub trait Interpolator {
    fn interpolation(&self, input: f32) -> f32;
}

impl<F: Fn(f32) -> f32> Interpolator for F {
    #[inline]
    fn interpolation(&self, input: f32) -> f32 {
        self(input)
    }
}

/// The standard launcher curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Starts slow and speeds up.
    Accelerate,
    /// Starts fast and slows down.
    Decelerate,
    /// Slow at both ends.
    AccelerateDecelerate,
}

impl Interpolator for Easing {
    fn interpolation(&self, input: f32) -> f32 {
        match self {
            Easing::Linear => input,
            Easing::Accelerate => input * input,
            Easing::Decelerate => 1.0 - (1.0 - input) * (1.0 - input),
            Easing::AccelerateDecelerate => ((input + 1.0) * PI).cos() / 2.0 + 0.5,
        }
    }
}

/// Flips the output of `base`: `1 - f(x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReverseOutput<I> {
    base: I,
}

impl<I: Interpolator> ReverseOutput<I> {
    pub fn new(base: I) -> Self {
        Self { base }
    }
}

impl<I: Interpolator> Interpolator for ReverseOutput<I> {
    #[inline]
    fn interpolation(&self, input: f32) -> f32 {
        1.0 - self.base.interpolation(input)
    }
}

/// Flips the input of `base`: `f(1 - x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReverseInput<I> {
    base: I,
}

impl<I: Interpolator> ReverseInput<I> {
    pub fn new(base: I) -> Self {
        Self { base }
    }
}

impl<I: Interpolator> Interpolator for ReverseInput<I> {
    #[inline]
    fn interpolation(&self, input: f32) -> f32 {
        self.base.interpolation(1.0 - input)
    }
}

/// Interpolate between `start` and `end` with `interpolator`.
#[inline]
pub fn lerp_with(interpolator: &dyn Interpolator, start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * interpolator.interpolation(t)
}
