//! Viewer options, parsed from the JSON object handed over by the host page.
//!
//! Every field has a default so `{}` is a valid configuration.

use crate::domain::chart::Color;
use crate::domain::errors::AppError;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// What a press-and-release without movement does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZeroDragPolicy {
    /// Treat it as a plain click: no overlay is left behind.
    #[default]
    Discard,
    /// Freeze a zero-width, zero-percent overlay.
    Freeze,
}

/// Modifier key that turns a press inside a frozen overlay into a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SplitModifier {
    #[default]
    Shift,
    Alt,
    Ctrl,
    Meta,
}

/// Modifier keys held during a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl SplitModifier {
    pub fn is_held(&self, modifiers: Modifiers) -> bool {
        match self {
            SplitModifier::Shift => modifiers.shift,
            SplitModifier::Alt => modifiers.alt,
            SplitModifier::Ctrl => modifiers.ctrl,
            SplitModifier::Meta => modifiers.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub zero_drag: ZeroDragPolicy,
    /// Horizontal movement at or below this many pixels counts as no movement.
    pub click_tolerance_px: f64,
    pub split_modifier: SplitModifier,
    pub tooltip_edge_margin_px: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            zero_drag: ZeroDragPolicy::Discard,
            click_tolerance_px: 2.0,
            split_modifier: SplitModifier::Shift,
            tooltip_edge_margin_px: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub up_color: Color,
    pub down_color: Color,
    pub overlay_fill: Color,
    pub divider_color: Color,
    pub tag_background: Color,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            up_color: Color::from_hex(0x22c55e),
            down_color: Color::from_hex(0xef4444),
            overlay_fill: Color::from_hex(0x60a5fa),
            divider_color: Color::from_hex(0xe5e7eb),
            tag_background: Color::from_hex(0x1f2633),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    /// Blank rows kept above and below the sparkline.
    pub padding_px: f64,
    pub line_color: Color,
    pub viewport_fill: Color,
    pub viewport_stroke: Color,
    pub premarket_band: Color,
    pub market_band: Color,
    pub afterhours_band: Color,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        let accent = Color::from_hex(0x60a5fa);
        Self {
            padding_px: 4.0,
            line_color: accent,
            viewport_fill: accent,
            viewport_stroke: accent,
            premarket_band: Color::from_hex(0xfbbf24),
            market_band: Color::from_hex(0x4ade80),
            afterhours_band: Color::from_hex(0xa78bfa),
        }
    }
}

/// Opacities are fixed; the configurable part is the hue.
pub const BAND_ALPHA: f32 = 0.12;
pub const LINE_ALPHA: f32 = 0.5;
pub const VIEWPORT_FILL_ALPHA: f32 = 0.15;
pub const VIEWPORT_STROKE_ALPHA: f32 = 0.6;
pub const OVERLAY_FILL_ALPHA: f32 = 0.12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub overlay: OverlayConfig,
    pub theme: ThemeConfig,
    pub minimap: MinimapConfig,
    /// Offset applied to wall-clock labels.
    pub display_utc_offset_minutes: i32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            overlay: OverlayConfig::default(),
            theme: ThemeConfig::default(),
            minimap: MinimapConfig::default(),
            display_utc_offset_minutes: 8 * 60,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| AppError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
        assert_eq!(ViewerConfig::from_json("  ").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_overlay_section_keeps_other_defaults() {
        let cfg = ViewerConfig::from_json(r#"{"overlay":{"zero_drag":"freeze","split_modifier":"alt"}}"#)
            .unwrap();
        assert_eq!(cfg.overlay.zero_drag, ZeroDragPolicy::Freeze);
        assert_eq!(cfg.overlay.split_modifier, SplitModifier::Alt);
        assert_eq!(cfg.overlay.tooltip_edge_margin_px, 16.0);
        assert_eq!(cfg.display_utc_offset_minutes, 480);
    }

    #[test]
    fn bad_color_is_a_configuration_error() {
        let err = ViewerConfig::from_json(r#"{"theme":{"up_color":"green"}}"#).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn split_modifier_checks_matching_key() {
        let held = Modifiers { alt: true, ..Modifiers::default() };
        assert!(SplitModifier::Alt.is_held(held));
        assert!(!SplitModifier::Shift.is_held(held));
    }
}
