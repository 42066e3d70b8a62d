//! Packed ARGB colors and contrast math.
//!
//! Launcher colors are 32-bit `0xAARRGGBB` values, the format theme
//! attributes and preferences store them in. [`Argb`] wraps one and provides
//! the channel, compositing and contrast helpers used to derive accent and
//! text colors.

use std::fmt;

use zimlx_core::config::parse_color;

/// Alpha used for ripple and highlight tints (about 12%).
pub const RIPPLE_ALPHA: u8 = 31;

/// Contrast ratio for body text.
pub const MIN_CONTRAST_BODY_TEXT: f64 = 4.5;
/// Contrast ratio for title text.
pub const MIN_CONTRAST_TITLE_TEXT: f64 = 3.0;

const MIN_ALPHA_SEARCH_MAX_ITERATIONS: u32 = 10;
const MIN_ALPHA_SEARCH_PRECISION: u32 = 1;

/// A non-premultiplied color packed as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Argb(pub u32);

impl Argb {
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    /// Create a color from 8-bit channels.
    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Create an opaque color from 8-bit channels.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    /// Parse `#RRGGBB` or `#AARRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        parse_color(hex).map(Self)
    }

    #[inline]
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Replace the alpha channel.
    #[inline]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | (alpha as u32) << 24)
    }

    /// Scale the alpha channel by `factor`, truncating.
    ///
    /// `factor` is expected in `0.0..=1.0`; results saturate to the channel
    /// range.
    pub fn scale_alpha(self, factor: f32) -> Self {
        let alpha = factor * self.alpha() as f32;
        self.with_alpha(alpha as u8)
    }

    /// Check if the color is fully opaque.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Composite this color over `background` (source-over).
    pub fn composite_over(self, background: Self) -> Self {
        let fg_a = self.alpha() as u32;
        let bg_a = background.alpha() as u32;
        let a = 0xFF - ((0xFF - bg_a) * (0xFF - fg_a) / 0xFF);

        let channel = |fg: u8, bg: u8| -> u8 {
            if a == 0 {
                return 0;
            }
            ((0xFF * fg as u32 * fg_a + bg as u32 * bg_a * (0xFF - fg_a)) / (a * 0xFF)) as u8
        };

        Self::from_argb(
            a as u8,
            channel(self.red(), background.red()),
            channel(self.green(), background.green()),
            channel(self.blue(), background.blue()),
        )
    }

    /// Relative luminance in `0.0..=1.0` (sRGB, alpha ignored).
    pub fn luminance(self) -> f64 {
        fn linear(channel: u8) -> f64 {
            let c = channel as f64 / 255.0;
            if c < 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * linear(self.red()) + 0.7152 * linear(self.green()) + 0.0722 * linear(self.blue())
    }

    /// Check if the color reads as dark.
    pub fn is_dark(self) -> bool {
        self.luminance() < 0.5
    }

    /// Contrast ratio of this color drawn over `background`, in `1.0..=21.0`.
    ///
    /// The background is treated as opaque. A translucent foreground is
    /// composited over it first.
    pub fn contrast_ratio(self, background: Self) -> f64 {
        let background = background.with_alpha(0xFF);
        let foreground = if self.is_opaque() {
            self
        } else {
            self.composite_over(background)
        };

        let l1 = foreground.luminance() + 0.05;
        let l2 = background.luminance() + 0.05;
        l1.max(l2) / l1.min(l2)
    }

    /// The lowest alpha at which this color keeps `min_ratio` contrast over
    /// `background`, or `None` if even the opaque color falls short.
    pub fn minimum_alpha(self, background: Self, min_ratio: f64) -> Option<u8> {
        if self.with_alpha(0xFF).contrast_ratio(background) < min_ratio {
            return None;
        }

        let (mut min_alpha, mut max_alpha) = (0u32, 0xFFu32);
        let mut iterations = 0;
        while iterations <= MIN_ALPHA_SEARCH_MAX_ITERATIONS
            && max_alpha - min_alpha > MIN_ALPHA_SEARCH_PRECISION
        {
            let test_alpha = (min_alpha + max_alpha) / 2;
            if self.with_alpha(test_alpha as u8).contrast_ratio(background) < min_ratio {
                min_alpha = test_alpha;
            } else {
                max_alpha = test_alpha;
            }
            iterations += 1;
        }
        Some(max_alpha as u8)
    }

    /// Body text color for content drawn on this color.
    ///
    /// Prefers translucent white, then translucent black, each at the lowest
    /// alpha that keeps body and title text readable.
    pub fn foreground(self) -> Self {
        let background = self.with_alpha(0xFF);

        let light_body = Self::WHITE.minimum_alpha(background, MIN_CONTRAST_BODY_TEXT);
        let light_title = Self::WHITE.minimum_alpha(background, MIN_CONTRAST_TITLE_TEXT);
        if let (Some(body), Some(_)) = (light_body, light_title) {
            return Self::WHITE.with_alpha(body);
        }

        let dark_body = Self::BLACK.minimum_alpha(background, MIN_CONTRAST_BODY_TEXT);
        let dark_title = Self::BLACK.minimum_alpha(background, MIN_CONTRAST_TITLE_TEXT);
        if let (Some(body), Some(_)) = (dark_body, dark_title) {
            return Self::BLACK.with_alpha(body);
        }

        match light_body {
            Some(alpha) => Self::WHITE.with_alpha(alpha),
            None => Self::BLACK.with_alpha(dark_body.unwrap_or(0xFF)),
        }
    }
}

impl From<u32> for Argb {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Argb> for u32 {
    fn from(color: Argb) -> Self {
        color.0
    }
}

impl fmt::Display for Argb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

/// Pack 8-bit channels into a color.
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Argb {
    Argb::from_argb(a, r, g, b)
}

/// Replace the alpha channel of `color`.
pub const fn set_alpha_component(color: Argb, alpha: u8) -> Argb {
    color.with_alpha(alpha)
}

/// Scale the alpha of `color` by `factor`.
pub fn apply_alpha(factor: f32, color: Argb) -> Argb {
    color.scale_alpha(factor)
}

/// Composite `foreground` over `background`.
pub fn composite_colors(foreground: Argb, background: Argb) -> Argb {
    foreground.composite_over(background)
}

pub fn luminance(color: Argb) -> f64 {
    color.luminance()
}

pub fn contrast_ratio(foreground: Argb, background: Argb) -> f64 {
    foreground.contrast_ratio(background)
}

pub fn minimum_alpha(foreground: Argb, background: Argb, min_ratio: f64) -> Option<u8> {
    foreground.minimum_alpha(background, min_ratio)
}

pub fn is_dark(color: Argb) -> bool {
    color.is_dark()
}

/// Readable text color for content drawn on `color`.
pub fn foreground_color(color: Argb) -> Argb {
    color.foreground()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let c = Argb(0x8012_3456);
        assert_eq!(c.alpha(), 0x80);
        assert_eq!(c.red(), 0x12);
        assert_eq!(c.green(), 0x34);
        assert_eq!(c.blue(), 0x56);
        assert_eq!(Argb::from_argb(0x80, 0x12, 0x34, 0x56), c);
        assert_eq!(c.with_alpha(0xFF), Argb(0xFF12_3456));
        assert_eq!(c.to_string(), "#80123456");
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Argb::from_hex("#336699"), Some(Argb(0xFF33_6699)));
        assert_eq!(Argb::from_hex("#00336699"), Some(Argb(0x0033_6699)));
        assert_eq!(Argb::from_hex("nope"), None);
    }

    #[test]
    fn test_apply_alpha_truncates() {
        assert_eq!(apply_alpha(0.5, Argb(0xFF11_2233)), Argb(0x7F11_2233));
        assert_eq!(apply_alpha(1.0, Argb(0x8011_2233)), Argb(0x8011_2233));
        assert_eq!(apply_alpha(0.0, Argb::WHITE), Argb(0x00FF_FFFF));
    }

    #[test]
    fn test_luminance_extremes() {
        assert_eq!(Argb::BLACK.luminance(), 0.0);
        assert!((Argb::WHITE.luminance() - 1.0).abs() < 1e-9);
        assert!(Argb::BLACK.is_dark());
        assert!(!Argb::WHITE.is_dark());
        assert!(Argb::from_rgb(0x21, 0x21, 0x21).is_dark());
        assert!(!Argb::from_rgb(0xF5, 0xF5, 0xF5).is_dark());
    }

    #[test]
    fn test_contrast_ratio() {
        assert!((Argb::WHITE.contrast_ratio(Argb::BLACK) - 21.0).abs() < 1e-9);
        assert!((Argb::BLACK.contrast_ratio(Argb::WHITE) - 21.0).abs() < 1e-9);
        assert!((Argb::WHITE.contrast_ratio(Argb::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_over() {
        // Opaque foreground wins.
        assert_eq!(Argb(0xFF10_2030).composite_over(Argb::WHITE), Argb(0xFF10_2030));
        // Transparent foreground leaves the background.
        assert_eq!(Argb::TRANSPARENT.composite_over(Argb(0xFF40_5060)), Argb(0xFF40_5060));
        // Fully transparent on both sides.
        assert_eq!(Argb::TRANSPARENT.composite_over(Argb::TRANSPARENT), Argb::TRANSPARENT);
    }

    #[test]
    fn test_minimum_alpha() {
        // White on white can never reach 4.5:1.
        assert_eq!(Argb::WHITE.minimum_alpha(Argb::WHITE, 4.5), None);

        let alpha = Argb::WHITE.minimum_alpha(Argb::BLACK, 4.5).unwrap();
        assert!(Argb::WHITE.with_alpha(alpha).contrast_ratio(Argb::BLACK) >= 4.5);
        assert!(Argb::WHITE.with_alpha(alpha - 2).contrast_ratio(Argb::BLACK) < 4.5);
    }

    #[test]
    fn test_foreground() {
        let on_black = Argb::BLACK.foreground();
        assert_eq!(on_black.with_alpha(0xFF), Argb::WHITE);
        assert!(on_black.alpha() < 0xFF);

        let on_white = Argb::WHITE.foreground();
        assert_eq!(on_white.with_alpha(0xFF), Argb::BLACK);

        // Translucent input is judged as if opaque.
        assert_eq!(foreground_color(Argb(0x1000_0000)), on_black);
    }

    #[test]
    fn test_free_functions() {
        let c = argb(0xFF, 0x10, 0x20, 0x30);
        assert_eq!(set_alpha_component(c, RIPPLE_ALPHA), Argb(0x1F10_2030));
        assert_eq!(composite_colors(c, Argb::WHITE), c);
        assert!(is_dark(c));
        assert_eq!(luminance(Argb::BLACK), 0.0);
        assert!(contrast_ratio(Argb::WHITE, c) > 10.0);
        assert!(minimum_alpha(Argb::WHITE, c, MIN_CONTRAST_BODY_TEXT).is_some());
    }
}
