#![forbid(unsafe_code)]

//! Tunable parameters for [`SwipeEngine`](crate::SwipeEngine).
//!
//! [`SwipeConfig`] is plain data. With the `config` feature it can be loaded
//! from TOML or JSON, so thresholds can be tuned per surface without a
//! rebuild. Missing keys fall back to the defaults.
//!
//! ```toml
//! # swipe.toml
//! threshold = 80.0
//! max_swipe = 150.0
//! resistance = 0.4
//! auto_reset = true
//! reset_delay_ms = 100
//! ```
//!
//! ```rust,ignore
//! let config = SwipeConfig::from_toml_file("swipe.toml")?;
//! let config = SwipeConfig::load_validated("swipe.json")?;
//! ```
//!
//! The engine itself accepts any config, including ones that fail
//! [`SwipeConfig::validate`]; validation is for loaders and tooling.

use std::time::Duration;

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Default horizontal distance (px) a gesture must exceed to pick a direction.
pub const DEFAULT_THRESHOLD: f64 = 80.0;
/// Default distance (px) beyond which resistance applies.
pub const DEFAULT_MAX_SWIPE: f64 = 150.0;
/// Default fraction of the excess distance that still moves the offset.
pub const DEFAULT_RESISTANCE: f64 = 0.4;
/// Default delay before the snap-back fires.
pub const DEFAULT_RESET_DELAY_MS: u64 = 100;
/// Default vertical dominance ratio for scroll detection.
pub const DEFAULT_VERTICAL_RATIO: f64 = 1.5;
/// Default duration of the eased snap-back transition.
pub const DEFAULT_TRANSITION_MS: u64 = 300;

/// Parameters for one swipeable surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SwipeConfig {
    /// Horizontal distance (px) the raw delta must strictly exceed to set a
    /// direction (default: 80).
    pub threshold: f64,
    /// Distance (px) after which the offset is damped (default: 150).
    pub max_swipe: f64,
    /// Fraction in `[0, 1]` of the distance past `max_swipe` that still moves
    /// the offset. `1.0` disables damping, `0.0` is a hard stop (default: 0.4).
    pub resistance: f64,
    /// Schedule a snap-back to zero after a horizontal gesture commits
    /// (default: true).
    pub auto_reset: bool,
    /// Delay before the snap-back fires, in milliseconds (default: 100).
    pub reset_delay_ms: u64,
    /// A first move with `|dy| > |dx| * vertical_ratio` is treated as a
    /// vertical scroll (default: 1.5).
    pub vertical_ratio: f64,
    /// Drop any outstanding snap-back when a new gesture starts.
    ///
    /// Off by default: a snap-back scheduled by the previous gesture then
    /// fires in the middle of the next one, zeroing its offset and ending
    /// its tracking.
    pub cancel_pending_reset_on_start: bool,
    /// Duration of the eased transition reported while not tracking
    /// (default: 300).
    pub transition_ms: u64,
    /// CSS easing keyword for the eased transition (default: `ease`).
    pub transition_easing: String,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_swipe: DEFAULT_MAX_SWIPE,
            resistance: DEFAULT_RESISTANCE,
            auto_reset: true,
            reset_delay_ms: DEFAULT_RESET_DELAY_MS,
            vertical_ratio: DEFAULT_VERTICAL_RATIO,
            cancel_pending_reset_on_start: false,
            transition_ms: DEFAULT_TRANSITION_MS,
            transition_easing: "ease".to_string(),
        }
    }
}

impl SwipeConfig {
    /// Delay before the snap-back fires.
    #[inline]
    #[must_use]
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of violations. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.threshold.is_finite() || self.threshold < 0.0 {
            errors.push(format!(
                "threshold must be finite and >= 0, got {}",
                self.threshold
            ));
        }

        if !self.max_swipe.is_finite() || self.max_swipe < 0.0 {
            errors.push(format!(
                "max_swipe must be finite and >= 0, got {}",
                self.max_swipe
            ));
        }

        if !(0.0..=1.0).contains(&self.resistance) {
            errors.push(format!(
                "resistance must be in [0, 1], got {}",
                self.resistance
            ));
        }

        if !self.vertical_ratio.is_finite() || self.vertical_ratio <= 0.0 {
            errors.push(format!(
                "vertical_ratio must be finite and > 0, got {}",
                self.vertical_ratio
            ));
        }

        if self.transition_easing.trim().is_empty() {
            errors.push("transition_easing must not be empty".into());
        }

        errors
    }
}

#[cfg(feature = "config")]
impl SwipeConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Load from disk, choosing JSON for a `.json` extension and TOML
    /// otherwise.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_file(path)
        } else {
            Self::from_toml_file(path)
        }
    }

    /// [`from_path`](Self::from_path) followed by [`validate`](Self::validate).
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_path(path)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Serialize to a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlEncode)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a swipe configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlEncode(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlEncode(e) => write!(f, "TOML encode error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlEncode(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
