//! Engine configuration with defaults and `SCENE_*` environment overrides.

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_PADDING, BOUND_TEXT_PADDING};
use crate::error::SceneError;

pub const DEFAULT_FONT_SIZE: f64 = 20.0;
pub const DEFAULT_LINE_HEIGHT: f64 = 1.25;
pub const DEFAULT_POINT_HANDLE_SIZE: f64 = 10.0;
pub const DEFAULT_NUDGE_STEP: f64 = 1.0;
pub const DEFAULT_NUDGE_STEP_LARGE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether dragged endpoints attach to shapes at all.
    pub binding_enabled: bool,
    pub bound_text_padding: f64,
    pub default_font_size: f64,
    pub default_line_height: f64,
    pub elbow_base_padding: f64,
    /// Screen-pixel radius of a linear element's point handle.
    pub point_handle_size: f64,
    pub nudge_step: f64,
    /// Nudge distance while Shift is held.
    pub nudge_step_large: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binding_enabled: true,
            bound_text_padding: BOUND_TEXT_PADDING,
            default_font_size: DEFAULT_FONT_SIZE,
            default_line_height: DEFAULT_LINE_HEIGHT,
            elbow_base_padding: BASE_PADDING,
            point_handle_size: DEFAULT_POINT_HANDLE_SIZE,
            nudge_step: DEFAULT_NUDGE_STEP,
            nudge_step_large: DEFAULT_NUDGE_STEP_LARGE,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables on top of the defaults.
    ///
    /// Optional:
    /// - `SCENE_BINDING_ENABLED`: `true`/`false`/`1`/`0` (default true)
    /// - `SCENE_BOUND_TEXT_PADDING`: default 5
    /// - `SCENE_DEFAULT_FONT_SIZE`: default 20
    /// - `SCENE_DEFAULT_LINE_HEIGHT`: default 1.25
    /// - `SCENE_ELBOW_BASE_PADDING`: default 40
    /// - `SCENE_POINT_HANDLE_SIZE`: default 10
    /// - `SCENE_NUDGE_STEP`: default 1
    /// - `SCENE_NUDGE_STEP_LARGE`: default 5
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Config`] if `SCENE_BINDING_ENABLED` is not a boolean.
    pub fn from_env() -> Result<Self, SceneError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(v) => Some(v),
            Err(_) => None,
        })
    }

    /// Same as [`EngineConfig::from_env`] with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Config`] if `SCENE_BINDING_ENABLED` is not a boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SceneError> {
        let d = Self::default();
        Ok(Self {
            binding_enabled: parse_bool(lookup("SCENE_BINDING_ENABLED").as_deref(), d.binding_enabled)?,
            bound_text_padding: env_parse_f64(&lookup, "SCENE_BOUND_TEXT_PADDING", d.bound_text_padding),
            default_font_size: env_parse_f64(&lookup, "SCENE_DEFAULT_FONT_SIZE", d.default_font_size),
            default_line_height: env_parse_f64(&lookup, "SCENE_DEFAULT_LINE_HEIGHT", d.default_line_height),
            elbow_base_padding: env_parse_f64(&lookup, "SCENE_ELBOW_BASE_PADDING", d.elbow_base_padding),
            point_handle_size: env_parse_f64(&lookup, "SCENE_POINT_HANDLE_SIZE", d.point_handle_size),
            nudge_step: env_parse_f64(&lookup, "SCENE_NUDGE_STEP", d.nudge_step),
            nudge_step_large: env_parse_f64(&lookup, "SCENE_NUDGE_STEP_LARGE", d.nudge_step_large),
        })
    }
}

fn env_parse_f64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    match lookup(key).map(|v| v.trim().parse::<f64>()) {
        Some(Ok(v)) if v.is_finite() && v >= 0.0 => v,
        _ => default,
    }
}

fn parse_bool(raw: Option<&str>, default: bool) -> Result<bool, SceneError> {
    match raw.map(str::trim) {
        None => Ok(default),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(SceneError::Config(format!("invalid SCENE_BINDING_ENABLED: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
