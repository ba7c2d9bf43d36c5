//! Keyframes, settings, and the sampled per-frame zoom state.
//!
//! This module holds pure data: the state machine and sampler that produce
//! and consume these types live in `processing-core`.

use serde::{Deserialize, Serialize};

use crate::viewport::Point2D;

/// An easing curve applied over the unit interval `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Default for EasingFunction {
    fn default() -> Self {
        EasingFunction::EaseInOut
    }
}

impl EasingFunction {
    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t.powi(3),
            EasingFunction::EaseOut => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    4.0 * t.powi(3)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// A single point in a zoom timeline.
///
/// `scale == 1.0` carries no meaningful center; readers should treat
/// `center` as `(0.5, 0.5)` in that case regardless of the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomKeyframe {
    pub t: f64,
    pub scale: f64,
    pub center: Point2D,
    pub easing: EasingFunction,
}

impl ZoomKeyframe {
    pub fn idle(t: f64) -> Self {
        Self {
            t,
            scale: 1.0,
            center: Point2D::new(0.5, 0.5),
            easing: EasingFunction::Linear,
        }
    }
}

/// The phase classification exposed at a sampled instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    EaseIn,
    Hold,
    Follow,
    Pan,
    ZoomOutPanZoomIn,
    EaseOut,
}

/// Zoom state sampled at a single instant `t`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    pub scale: f64,
    pub center: Point2D,
    pub phase: Phase,
    pub is_active: bool,
}

impl ZoomState {
    pub fn new(scale: f64, center: Point2D, phase: Phase) -> Self {
        Self {
            scale,
            center,
            phase,
            is_active: scale > 1.01,
        }
    }

    pub fn idle() -> Self {
        Self::new(1.0, Point2D::new(0.5, 0.5), Phase::Idle)
    }
}

/// Visual style of a click highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    Pulse,
    DoubleRing,
}

impl HighlightKind {
    /// Lifetime of a ring of this kind, in seconds.
    pub fn duration(self) -> f64 {
        match self {
            HighlightKind::Pulse => 0.35,
            HighlightKind::DoubleRing => 0.35,
        }
    }
}

/// A click-ring highlight sampled at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub position_normalized: Point2D,
    pub kind: HighlightKind,
    pub color: [f32; 4],
    pub progress: f64,
    pub radius_scale: f64,
}

/// A sorted, immutable sequence of zoom keyframes spanning a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    keyframes: Vec<ZoomKeyframe>,
    duration: f64,
}

impl Timeline {
    /// Build a timeline from already-sorted keyframes. The caller (the
    /// timeline builder in `processing-core`) is responsible for ordering
    /// and boundary-keyframe invariants.
    pub fn new(keyframes: Vec<ZoomKeyframe>, duration: f64) -> Self {
        Self { keyframes, duration }
    }

    /// An Idle-only timeline: used for empty sessions and as the fallback
    /// when the caller chooses to recover from an invalid-input error.
    pub fn idle(duration: f64) -> Self {
        Self::new(vec![ZoomKeyframe::idle(0.0), ZoomKeyframe::idle(duration)], duration)
    }

    pub fn keyframes(&self) -> &[ZoomKeyframe] {
        &self.keyframes
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}

/// Errors raised validating a [`Settings`] value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("base_scale must be within [1.0, 6.0], got {0}")]
    BaseScaleOutOfRange(f64),
    #[error("hold_min ({hold_min}) must be <= hold_max ({hold_max})")]
    HoldMinExceedsMax { hold_min: f64, hold_max: f64 },
    #[error("hold_base ({hold_base}) must be within [hold_min, hold_max] = [{hold_min}, {hold_max}]")]
    HoldBaseOutOfRange {
        hold_base: f64,
        hold_min: f64,
        hold_max: f64,
    },
    #[error("large_distance_threshold must be within [0.1, 0.5], got {0}")]
    LargeDistanceThresholdOutOfRange(f64),
    #[error("follow_edge_margin must be within [0.0, 0.3], got {0}")]
    FollowEdgeMarginOutOfRange(f64),
    #[error("highlight_scale_when_zoomed must be within [1.0, 3.0], got {0}")]
    HighlightScaleOutOfRange(f64),
    #[error("reference_size must have strictly positive width/height, got {0:?}")]
    InvalidReferenceSize((f64, f64)),
    #[error("edge_factor_min ({edge_factor_min}) must be <= edge_factor_max ({edge_factor_max})")]
    EdgeFactorRangeInverted {
        edge_factor_min: f64,
        edge_factor_max: f64,
    },
    #[error("a negative duration field is not allowed: {field} = {value}")]
    NegativeDuration { field: &'static str, value: f64 },
    #[error("failed to parse settings JSON: {0}")]
    Json(String),
}

/// Spring-physics parameters for Follow/Pan motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: 210.0,
            friction: 26.0,
            mass: 1.0,
        }
    }
}

/// Every tunable named in the engine's settings surface. Immutable for the
/// duration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub auto_zoom_enabled: bool,
    pub base_scale: f64,
    pub max_scale: f64,

    pub hold_min: f64,
    pub hold_base: f64,
    pub hold_max: f64,
    pub hold_extension_per_event: f64,

    pub ease_in_duration: f64,
    pub ease_out_duration: f64,
    pub pan_duration: f64,

    pub idle_timeout: f64,

    pub click_merge_time: f64,
    pub click_merge_distance_px: f64,
    pub reference_size: (f64, f64),

    pub large_distance_threshold: f64,
    pub t_confirm: f64,

    pub dynamic_scale_enabled: bool,
    pub edge_factor_min: f64,
    pub edge_factor_max: f64,
    pub corner_boost: f64,

    pub follow_edge_margin: f64,

    pub spring: SpringConfig,

    pub zoom_out_on_keyboard: bool,
    pub keyboard_hold_buffer: f64,

    pub easing: EasingFunction,

    pub cursor_highlight_enabled: bool,
    pub highlight_scale_when_zoomed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_zoom_enabled: true,
            base_scale: 2.0,
            max_scale: 6.0,

            hold_min: 0.6,
            hold_base: 1.2,
            hold_max: 3.0,
            hold_extension_per_event: 0.15,

            ease_in_duration: 0.3,
            ease_out_duration: 0.4,
            pan_duration: 0.5,

            idle_timeout: 3.0,

            click_merge_time: 0.35,
            click_merge_distance_px: 120.0,
            reference_size: (1920.0, 1080.0),

            large_distance_threshold: 0.3,
            t_confirm: 0.18,

            dynamic_scale_enabled: true,
            edge_factor_min: 0.85,
            edge_factor_max: 1.25,
            corner_boost: 1.10,

            follow_edge_margin: 0.15,

            spring: SpringConfig::default(),

            zoom_out_on_keyboard: true,
            keyboard_hold_buffer: 5.0,

            easing: EasingFunction::EaseInOut,

            cursor_highlight_enabled: true,
            highlight_scale_when_zoomed: 1.4,
        }
    }
}

impl Settings {
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            serde_json::from_str(s).map_err(|e| SettingsError::Json(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject internally inconsistent settings. See the `InconsistentSettings`
    /// error category: these checks run once, at build time.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1.0..=6.0).contains(&self.base_scale) {
            return Err(SettingsError::BaseScaleOutOfRange(self.base_scale));
        }
        if self.hold_min > self.hold_max {
            return Err(SettingsError::HoldMinExceedsMax {
                hold_min: self.hold_min,
                hold_max: self.hold_max,
            });
        }
        if self.hold_base < self.hold_min || self.hold_base > self.hold_max {
            return Err(SettingsError::HoldBaseOutOfRange {
                hold_base: self.hold_base,
                hold_min: self.hold_min,
                hold_max: self.hold_max,
            });
        }
        if !(0.1..=0.5).contains(&self.large_distance_threshold) {
            return Err(SettingsError::LargeDistanceThresholdOutOfRange(
                self.large_distance_threshold,
            ));
        }
        if !(0.0..=0.3).contains(&self.follow_edge_margin) {
            return Err(SettingsError::FollowEdgeMarginOutOfRange(self.follow_edge_margin));
        }
        if !(1.0..=3.0).contains(&self.highlight_scale_when_zoomed) {
            return Err(SettingsError::HighlightScaleOutOfRange(
                self.highlight_scale_when_zoomed,
            ));
        }
        if self.reference_size.0 <= 0.0 || self.reference_size.1 <= 0.0 {
            return Err(SettingsError::InvalidReferenceSize(self.reference_size));
        }
        if self.edge_factor_min > self.edge_factor_max {
            return Err(SettingsError::EdgeFactorRangeInverted {
                edge_factor_min: self.edge_factor_min,
                edge_factor_max: self.edge_factor_max,
            });
        }
        for (field, value) in [
            ("ease_in_duration", self.ease_in_duration),
            ("ease_out_duration", self.ease_out_duration),
            ("pan_duration", self.pan_duration),
            ("idle_timeout", self.idle_timeout),
            ("click_merge_time", self.click_merge_time),
            ("t_confirm", self.t_confirm),
            ("keyboard_hold_buffer", self.keyboard_hold_buffer),
        ] {
            if value < 0.0 {
                return Err(SettingsError::NegativeDuration { field, value });
            }
        }
        Ok(())
    }

    /// `click_merge_distance_px` expressed in normalized units, per the
    /// configured reference canvas size.
    pub fn click_merge_distance_normalized(&self) -> f64 {
        self.click_merge_distance_px / self.reference_size.0.max(self.reference_size.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ease_in_out_is_continuous_at_midpoint() {
        let e = EasingFunction::EaseInOut;
        let left = e.apply(0.5 - 1e-9);
        let right = e.apply(0.5 + 1e-9);
        assert!((left - right).abs() < 1e-6);
    }

    #[test]
    fn default_settings_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn hold_min_exceeding_hold_max_is_rejected() {
        let mut settings = Settings::default();
        settings.hold_min = 5.0;
        settings.hold_max = 1.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::HoldMinExceedsMax { .. })
        ));
    }

    #[test]
    fn click_merge_distance_normalizes_against_reference_size() {
        let settings = Settings::default();
        let d = settings.click_merge_distance_normalized();
        assert!((d - 120.0 / 1920.0).abs() < 1e-9);
    }

    #[test]
    fn idle_timeline_returns_to_scale_one() {
        let timeline = Timeline::idle(10.0);
        assert_eq!(timeline.keyframes().first().unwrap().scale, 1.0);
        assert_eq!(timeline.keyframes().last().unwrap().scale, 1.0);
        assert_eq!(timeline.duration(), 10.0);
    }
}
