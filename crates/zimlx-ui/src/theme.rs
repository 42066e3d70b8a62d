//! Theme attribute lookups and state-dependent colors.
//!
//! Themes are reached through [`StyledAttributes`]. Every typed lookup falls
//! back to zero or `false` when the theme does not define the attribute or
//! defines it with a different type; a missing attribute is never an error.

use bitflags::bitflags;
use zimlx_core::Preferences;

use crate::color::{Argb, RIPPLE_ALPHA, apply_alpha};

/// A theme attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    ColorAccent,
    ColorForeground,
    ColorControlHighlight,
    DisabledAlpha,
    /// Any other attribute, by resource id.
    Custom(u32),
}

/// A resolved attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue {
    Color(Argb),
    Float(f32),
    /// A dimension already converted to pixels.
    Dimension(f32),
    Boolean(bool),
    /// A resource or style reference.
    Reference(u32),
}

/// Resolves attributes against the current theme.
pub trait StyledAttributes {
    /// The value of `attr`, or `None` if the theme does not define it.
    fn resolve(&self, attr: Attr) -> Option<AttrValue>;
}

/// The color of `attr`, or transparent.
pub fn color_attr(theme: &dyn StyledAttributes, attr: Attr) -> Argb {
    match theme.resolve(attr) {
        Some(AttrValue::Color(color)) => color,
        _ => Argb::TRANSPARENT,
    }
}

/// The resource referenced by `attr`, or 0.
pub fn theme_attr(theme: &dyn StyledAttributes, attr: Attr) -> u32 {
    match theme.resolve(attr) {
        Some(AttrValue::Reference(id)) => id,
        _ => 0,
    }
}

/// The dimension of `attr` as a whole pixel size, or 0.
///
/// Rounds to the nearest pixel, but a non-zero dimension never collapses to
/// zero pixels.
pub fn dimen_attr(theme: &dyn StyledAttributes, attr: Attr) -> i32 {
    let Some(AttrValue::Dimension(px)) = theme.resolve(attr) else {
        return 0;
    };
    let size = (if px >= 0.0 { px + 0.5 } else { px - 0.5 }) as i32;
    if size != 0 {
        size
    } else if px == 0.0 {
        0
    } else if px > 0.0 {
        1
    } else {
        -1
    }
}

/// The boolean of `attr`, or `false`.
pub fn boolean_attr(theme: &dyn StyledAttributes, attr: Attr) -> bool {
    matches!(theme.resolve(attr), Some(AttrValue::Boolean(true)))
}

/// The float of `attr`, or 0.
pub fn float_attr(theme: &dyn StyledAttributes, attr: Attr) -> f32 {
    match theme.resolve(attr) {
        Some(AttrValue::Float(value)) => value,
        _ => 0.0,
    }
}

/// The float of `attr` as an 8-bit alpha, rounded.
pub fn alpha_attr(theme: &dyn StyledAttributes, attr: Attr) -> u8 {
    (255.0 * float_attr(theme, attr) + 0.5) as u8
}

/// Scale the alpha of `color` by the float stored in `attr`.
pub fn apply_alpha_attr(theme: &dyn StyledAttributes, attr: Attr, color: Argb) -> Argb {
    apply_alpha(float_attr(theme, attr), color)
}

/// `color` at the theme's disabled alpha.
pub fn disabled_color(theme: &dyn StyledAttributes, color: Argb) -> Argb {
    apply_alpha_attr(theme, Attr::DisabledAlpha, color)
}

/// The theme's accent color.
pub fn color_accent(theme: &dyn StyledAttributes) -> Argb {
    color_attr(theme, Attr::ColorAccent)
}

/// The user's chosen accent color.
pub fn color_engine_accent(prefs: &Preferences) -> Argb {
    Argb(prefs.accent_color)
}

bitflags! {
    /// Drawable states a color can depend on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateSet: u32 {
        const ENABLED = 1 << 0;
        const CHECKED = 1 << 1;
        const SELECTED = 1 << 2;
        const PRESSED = 1 << 3;
        const FOCUSED = 1 << 4;
    }
}

/// A condition on the current state set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateSpec {
    /// States that must be present.
    pub required: StateSet,
    /// States that must be absent.
    pub forbidden: StateSet,
}

impl StateSpec {
    /// Matches every state set.
    pub const ANY: Self = Self {
        required: StateSet::empty(),
        forbidden: StateSet::empty(),
    };

    /// Require `states`.
    pub const fn with(states: StateSet) -> Self {
        Self {
            required: states,
            forbidden: StateSet::empty(),
        }
    }

    /// Forbid `states`.
    pub const fn without(states: StateSet) -> Self {
        Self {
            required: StateSet::empty(),
            forbidden: states,
        }
    }

    /// Check whether `states` satisfies this spec.
    pub fn matches(&self, states: StateSet) -> bool {
        states.contains(self.required) && !states.intersects(self.forbidden)
    }

    fn is_wildcard(&self) -> bool {
        self.required.is_empty() && self.forbidden.is_empty()
    }
}

/// Colors keyed by state; the first matching entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorStateList {
    entries: Vec<(StateSpec, Argb)>,
}

impl ColorStateList {
    /// Create a list from `(spec, color)` entries in priority order.
    pub fn new(entries: impl IntoIterator<Item = (StateSpec, Argb)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// A list holding one color for every state.
    pub fn value_of(color: Argb) -> Self {
        Self::new([(StateSpec::ANY, color)])
    }

    /// The color for `states`, or `default` if no entry matches.
    pub fn color_for_state(&self, states: StateSet, default: Argb) -> Argb {
        self.entries
            .iter()
            .find(|(spec, _)| spec.matches(states))
            .map_or(default, |(_, color)| *color)
    }

    /// The wildcard entry's color, else the first color, else transparent.
    pub fn default_color(&self) -> Argb {
        self.entries
            .iter()
            .find(|(spec, _)| spec.is_wildcard())
            .or_else(|| self.entries.first())
            .map_or(Argb::TRANSPARENT, |(_, color)| *color)
    }

    /// Check whether the color depends on state.
    pub fn is_stateful(&self) -> bool {
        self.entries.iter().any(|(spec, _)| !spec.is_wildcard())
    }

    pub fn entries(&self) -> &[(StateSpec, Argb)] {
        &self.entries
    }
}

/// `color` while enabled; the disabled foreground color otherwise.
pub fn create_disabled_color(theme: &dyn StyledAttributes, color: Argb) -> ColorStateList {
    ColorStateList::new([
        (
            StateSpec::without(StateSet::ENABLED),
            disabled_color(theme, color_attr(theme, Attr::ColorForeground)),
        ),
        (StateSpec::ANY, color),
    ])
}

/// Ripple for tabs: a faint accent when selected, the control highlight
/// otherwise.
pub fn tab_ripple(theme: &dyn StyledAttributes, accent: Argb) -> ColorStateList {
    ColorStateList::new([
        (StateSpec::with(StateSet::SELECTED), accent.with_alpha(RIPPLE_ALPHA)),
        (StateSpec::ANY, color_attr(theme, Attr::ColorControlHighlight)),
    ])
}

/// Thumb colors of the light material switch.
pub const SWITCH_THUMB_NORMAL: Argb = Argb(0xFFF1_F1F1);
pub const SWITCH_THUMB_DISABLED: Argb = Argb(0xFFBD_BDBD);

/// Tints for a switch's thumb and track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTint {
    pub thumb: ColorStateList,
    pub track: ColorStateList,
}

/// Tint a switch with `color` when checked.
pub fn switch_tint(theme: &dyn StyledAttributes, color: Argb) -> SwitchTint {
    let foreground = color_attr(theme, Attr::ColorForeground);
    let alpha_disabled = alpha_attr(theme, Attr::DisabledAlpha);

    let states = |disabled: Argb, unchecked: Argb| {
        ColorStateList::new([
            (StateSpec::without(StateSet::ENABLED), disabled),
            (StateSpec::with(StateSet::CHECKED), color),
            (StateSpec::ANY, unchecked),
        ])
    };

    SwitchTint {
        thumb: states(SWITCH_THUMB_DISABLED, SWITCH_THUMB_NORMAL),
        track: states(foreground.with_alpha(alpha_disabled), foreground),
    }
}

/// Ripple color for a button tinted with `color`.
pub fn button_ripple_color(color: Argb) -> ColorStateList {
    ColorStateList::value_of(color.with_alpha(RIPPLE_ALPHA))
}

/// A dialog button slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogButton {
    Negative,
    Neutral,
    Positive,
}

impl DialogButton {
    pub const ALL: [Self; 3] = [Self::Negative, Self::Neutral, Self::Positive];
}

/// A dialog whose buttons can be recolored.
pub trait AlertDialog {
    /// Set the text color of `button`. Returns `false` if the dialog has no
    /// such button.
    fn set_button_text_color(&mut self, button: DialogButton, color: Argb) -> bool;
}

/// Color every existing dialog button with the user's accent.
///
/// Returns how many buttons were recolored.
pub fn apply_accent_to_dialog(dialog: &mut dyn AlertDialog, prefs: &Preferences) -> usize {
    let accent = color_engine_accent(prefs);
    DialogButton::ALL
        .into_iter()
        .filter(|button| dialog.set_button_text_color(*button, accent))
        .count()
}

bitflags! {
    /// Configuration UI mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UiMode: u32 {
        const TYPE_NORMAL = 0x01;
        const TYPE_DESK = 0x02;
        const TYPE_CAR = 0x03;
        const TYPE_TELEVISION = 0x04;
        const TYPE_MASK = 0x0F;
        const NIGHT_NO = 0x10;
        const NIGHT_YES = 0x20;
        const NIGHT_MASK = 0x30;
    }
}

/// Check whether the night bits of `mode` select night mode.
pub fn using_night_mode(mode: UiMode) -> bool {
    mode.intersection(UiMode::NIGHT_MASK) == UiMode::NIGHT_YES
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Theme(HashMap<Attr, AttrValue>);

    impl StyledAttributes for Theme {
        fn resolve(&self, attr: Attr) -> Option<AttrValue> {
            self.0.get(&attr).copied()
        }
    }

    fn theme() -> Theme {
        Theme(HashMap::from([
            (Attr::ColorAccent, AttrValue::Color(Argb(0xFF00_8577))),
            (Attr::ColorForeground, AttrValue::Color(Argb(0xFF00_0000))),
            (Attr::ColorControlHighlight, AttrValue::Color(Argb(0x1F00_0000))),
            (Attr::DisabledAlpha, AttrValue::Float(0.5)),
            (Attr::Custom(1), AttrValue::Dimension(0.2)),
            (Attr::Custom(2), AttrValue::Dimension(12.6)),
            (Attr::Custom(3), AttrValue::Boolean(true)),
            (Attr::Custom(4), AttrValue::Reference(0x7f01_0001)),
            (Attr::Custom(5), AttrValue::Dimension(-12.6)),
            (Attr::Custom(6), AttrValue::Dimension(-0.2)),
        ]))
    }

    #[test]
    fn test_missing_attributes_default() {
        let empty = Theme(HashMap::new());
        assert_eq!(color_attr(&empty, Attr::ColorAccent), Argb::TRANSPARENT);
        assert_eq!(theme_attr(&empty, Attr::Custom(9)), 0);
        assert_eq!(dimen_attr(&empty, Attr::Custom(9)), 0);
        assert!(!boolean_attr(&empty, Attr::Custom(9)));
        assert_eq!(float_attr(&empty, Attr::DisabledAlpha), 0.0);
    }

    #[test]
    fn test_wrong_type_defaults() {
        let t = theme();
        assert_eq!(color_attr(&t, Attr::DisabledAlpha), Argb::TRANSPARENT);
        assert_eq!(float_attr(&t, Attr::ColorAccent), 0.0);
    }

    #[test]
    fn test_typed_attributes() {
        let t = theme();
        assert_eq!(color_accent(&t), Argb(0xFF00_8577));
        assert_eq!(dimen_attr(&t, Attr::Custom(1)), 1);
        assert_eq!(dimen_attr(&t, Attr::Custom(2)), 13);
        assert_eq!(dimen_attr(&t, Attr::Custom(5)), -13);
        assert_eq!(dimen_attr(&t, Attr::Custom(6)), -1);
        assert!(boolean_attr(&t, Attr::Custom(3)));
        assert_eq!(theme_attr(&t, Attr::Custom(4)), 0x7f01_0001);
        assert_eq!(alpha_attr(&t, Attr::DisabledAlpha), 128);
    }

    #[test]
    fn test_disabled_color() {
        let t = theme();
        assert_eq!(disabled_color(&t, Argb(0xFF12_3456)), Argb(0x7F12_3456));
    }

    #[test]
    fn test_engine_accent() {
        let prefs = Preferences {
            accent_color: 0xFFFF_5722,
            ..Default::default()
        };
        assert_eq!(color_engine_accent(&prefs), Argb(0xFFFF_5722));
    }

    #[test]
    fn test_state_list_first_match_wins() {
        let t = theme();
        let list = create_disabled_color(&t, Argb(0xFF33_6699));
        assert_eq!(list.color_for_state(StateSet::ENABLED, Argb::WHITE), Argb(0xFF33_6699));
        assert_eq!(list.color_for_state(StateSet::empty(), Argb::WHITE), Argb(0x7F00_0000));
        assert_eq!(list.default_color(), Argb(0xFF33_6699));
        assert!(list.is_stateful());
    }

    #[test]
    fn test_tab_ripple() {
        let list = tab_ripple(&theme(), Argb(0xFF00_8577));
        assert_eq!(list.color_for_state(StateSet::SELECTED, Argb::WHITE), Argb(0x1F00_8577));
        assert_eq!(list.color_for_state(StateSet::ENABLED, Argb::WHITE), Argb(0x1F00_0000));
    }

    #[test]
    fn test_switch_tint() {
        let accent = Argb(0xFF00_8577);
        let tint = switch_tint(&theme(), accent);
        let checked = StateSet::ENABLED | StateSet::CHECKED;

        assert_eq!(tint.thumb.color_for_state(checked, Argb::WHITE), accent);
        assert_eq!(tint.thumb.color_for_state(StateSet::ENABLED, Argb::WHITE), SWITCH_THUMB_NORMAL);
        // Disabled wins over checked.
        assert_eq!(tint.thumb.color_for_state(StateSet::CHECKED, Argb::WHITE), SWITCH_THUMB_DISABLED);
        assert_eq!(tint.track.color_for_state(StateSet::empty(), Argb::WHITE), Argb(0x8000_0000));
        assert_eq!(tint.track.color_for_state(StateSet::ENABLED, Argb::WHITE), Argb::BLACK);
    }

    #[test]
    fn test_button_ripple() {
        let list = button_ripple_color(Argb(0xFF00_8577));
        assert!(!list.is_stateful());
        assert_eq!(list.default_color(), Argb(0x1F00_8577));
    }

    #[derive(Default)]
    struct Dialog {
        has_neutral: bool,
        colors: Vec<(DialogButton, Argb)>,
    }

    impl AlertDialog for Dialog {
        fn set_button_text_color(&mut self, button: DialogButton, color: Argb) -> bool {
            if button == DialogButton::Neutral && !self.has_neutral {
                return false;
            }
            self.colors.push((button, color));
            true
        }
    }

    #[test]
    fn test_apply_accent_skips_missing_buttons() {
        let prefs = Preferences::default();
        let mut dialog = Dialog::default();
        assert_eq!(apply_accent_to_dialog(&mut dialog, &prefs), 2);
        assert_eq!(
            dialog.colors,
            vec![
                (DialogButton::Negative, Argb(prefs.accent_color)),
                (DialogButton::Positive, Argb(prefs.accent_color)),
            ]
        );
    }

    #[test]
    fn test_night_mode() {
        assert!(using_night_mode(UiMode::TYPE_NORMAL | UiMode::NIGHT_YES));
        assert!(!using_night_mode(UiMode::TYPE_NORMAL | UiMode::NIGHT_NO));
        assert!(!using_night_mode(UiMode::empty()));
        assert!(!using_night_mode(UiMode::from_bits_retain(0x31)));
    }
}
