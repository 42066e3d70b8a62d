//! Launcher configuration.
//!
//! Configuration is read from TOML. Every key is optional and missing keys
//! take the launcher defaults:
//!
//! ```toml
//! [threads]
//! stack_size = 262144
//! panic_policy = "log"
//!
//! [prefs]
//! accent_color = "#FF4285F4"
//! allow_rotation = false
//!
//! [flags]
//! qsb_in_hotseat = false
//! ```
//!
//! # Example
//!
//! ```
//! use zimlx_core::config::LauncherConfig;
//!
//! let config = LauncherConfig::from_toml_str("[prefs]\naccent_color = \"#00FF00\"").unwrap();
//! assert_eq!(config.prefs.accent_color, 0xFF00FF00);
//! assert!(config.flags.launcher3_direct_scroll);
//! ```

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dispatch::LogicalThread;
use crate::error::ConfigError;
use crate::logging::targets;
use crate::looper::{LooperConfig, PanicPolicy};

/// Default accent color (opaque Google blue).
pub const DEFAULT_ACCENT_COLOR: u32 = 0xFF42_85F4;

/// Complete launcher configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Logical thread settings.
    pub threads: ThreadConfig,
    /// User preferences.
    pub prefs: Preferences,
    /// Feature flags.
    pub flags: FeatureFlags,
}

impl LauncherConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded launcher config");
        Ok(config)
    }

    /// Load a configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: targets::CONFIG, "no launcher config found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))
    }
}

/// Settings shared by all logical threads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Stack size for spawned looper threads. `None` uses the platform default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_size: Option<usize>,
    /// What happens when fire-and-forget work panics.
    pub panic_policy: PanicPolicy,
}

impl ThreadConfig {
    /// Build the looper configuration for a logical thread.
    pub fn looper_config(&self, thread: LogicalThread) -> LooperConfig {
        let mut config = LooperConfig::with_name(thread.name()).panic_policy(self.panic_policy);
        config.stack_size = self.stack_size;
        config
    }
}

/// User-facing launcher preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Accent color as ARGB.
    #[serde(
        serialize_with = "serialize_color",
        deserialize_with = "deserialize_color"
    )]
    pub accent_color: u32,
    /// Whether the home screen may rotate.
    pub allow_rotation: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            accent_color: DEFAULT_ACCENT_COLOR,
            allow_rotation: false,
        }
    }
}

/// Parse `#RRGGBB` or `#AARRGGBB` into ARGB. `#RRGGBB` is made opaque.
pub fn parse_color(value: &str) -> Option<u32> {
    let hex = value.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let parsed = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(0xFF00_0000 | parsed),
        8 => Some(parsed),
        _ => None,
    }
}

fn serialize_color<S: Serializer>(color: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("#{color:08X}"))
}

fn deserialize_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse_color(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected #RRGGBB or #AARRGGBB, got '{value}'"))
    })
}

/// Flags controlling launcher behaviours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub is_dogfood_build: bool,
    /// Any point on the fast scrollbar starts dragging.
    pub launcher3_direct_scroll: bool,
    /// Promise icons show in all apps while an app installs.
    pub launcher3_promise_apps_in_all_apps: bool,
    /// Physics based motions.
    pub launcher3_physics: bool,
    /// Spring motions on icons.
    pub launcher3_spring_icons: bool,
    /// The all-apps icon is not added to the hotseat.
    pub no_all_apps_icon: bool,
    /// Dark status bar icons based on the top of the wallpaper.
    pub light_status_bar: bool,
    /// Move the search bar into the hotseat.
    pub qsb_in_hotseat: bool,
    pub go_disable_widgets: bool,
    /// Radial gradient scrim for all apps.
    pub launcher3_gradient_all_apps: bool,
    /// Search bar on the first workspace screen.
    pub qsb_on_first_screen: bool,
    /// Work profile tab in all apps.
    pub all_apps_tabs_enabled: bool,
    pub launcher3_disable_icon_normalization: bool,
    /// Load custom widgets.
    pub enable_custom_widgets: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            is_dogfood_build: false,
            launcher3_direct_scroll: true,
            launcher3_promise_apps_in_all_apps: true,
            launcher3_physics: true,
            launcher3_spring_icons: true,
            no_all_apps_icon: false,
            light_status_bar: true,
            qsb_in_hotseat: true,
            go_disable_widgets: false,
            launcher3_gradient_all_apps: true,
            qsb_on_first_screen: true,
            all_apps_tabs_enabled: true,
            launcher3_disable_icon_normalization: false,
            enable_custom_widgets: true,
        }
    }
}
