//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are hot-reloadable
//! through the watcher in [`crate::ron`]. Every field has a serde default so a
//! settings file only needs to list what it overrides.
pub mod loader;

use bevy::prelude::{KeyCode, Resource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How light sampling runs and how Bevy light units map to gameplay brightness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingSettings {
    #[serde(default = "LightingSettings::default_enabled")]
    pub enabled: bool, // Sample lights and drive effects. When false the effect hooks are left untouched.
    #[serde(default)]
    pub sample_interval: f32, // Seconds between samples. 0 samples every frame.
    #[serde(default = "LightingSettings::default_lumens_per_unit")]
    pub lumens_per_unit: f32, // Point/spot luminous power equal to one unit of brightness (Bevy's default point light).
    #[serde(default = "LightingSettings::default_lux_per_unit")]
    pub lux_per_unit: f32, // Directional illuminance equal to one unit of brightness (ambient daylight).
    #[serde(default)]
    pub log_intensity: bool, // Log every sampled intensity at info level.
}

impl LightingSettings {
    fn default_enabled() -> bool { true }
    fn default_lumens_per_unit() -> f32 { 1_000_000.0 }
    fn default_lux_per_unit() -> f32 { 10_000.0 }
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            sample_interval: 0.0,
            lumens_per_unit: Self::default_lumens_per_unit(),
            lux_per_unit: Self::default_lux_per_unit(),
            log_intensity: false,
        }
    }
}

/// Endpoints for a linear interpolation driven by the light intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LerpRange {
    pub from: f32,
    pub to: f32,
}

impl LerpRange {
    #[must_use]
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    /// Interpolate with an unclamped `t`; values outside `0..=1` extrapolate.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> f32 {
        crate::effects::lerp(self.from, self.to, t)
    }
}

/// Intensity thresholds and the ranges each effect is interpolated over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectCurves {
    #[serde(default = "EffectCurves::default_bright_threshold")]
    pub bright_threshold: f32, // Above this intensity depth of field turns on.
    #[serde(default = "EffectCurves::default_dark_threshold")]
    pub dark_threshold: f32, // Below this intensity vignette, desaturation and grain kick in.
    #[serde(default = "EffectCurves::default_focal_distance")]
    pub focal_distance: LerpRange,
    #[serde(default = "EffectCurves::default_blur_size")]
    pub blur_size: LerpRange,
    #[serde(default = "EffectCurves::default_vignette")]
    pub vignette: LerpRange,
    #[serde(default = "EffectCurves::default_saturation")]
    pub saturation: LerpRange,
    #[serde(default = "EffectCurves::default_film_grain")]
    pub film_grain: LerpRange,
}

impl EffectCurves {
    fn default_bright_threshold() -> f32 { 1.2 }
    fn default_dark_threshold() -> f32 { 0.65 }
    fn default_focal_distance() -> LerpRange { LerpRange::new(10.0, 50.0) }
    fn default_blur_size() -> LerpRange { LerpRange::new(1.0, 2.8) }
    fn default_vignette() -> LerpRange { LerpRange::new(0.45, 1.0) }
    fn default_saturation() -> LerpRange { LerpRange::new(0.15, 1.0) }
    fn default_film_grain() -> LerpRange { LerpRange::new(0.05, 0.1) }
}

impl Default for EffectCurves {
    fn default() -> Self {
        Self {
            bright_threshold: Self::default_bright_threshold(),
            dark_threshold: Self::default_dark_threshold(),
            focal_distance: Self::default_focal_distance(),
            blur_size: Self::default_blur_size(),
            vignette: Self::default_vignette(),
            saturation: Self::default_saturation(),
            film_grain: Self::default_film_grain(),
        }
    }
}

/// Values written to the effect hooks when they are first acquired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectBaseline {
    #[serde(default = "EffectBaseline::default_sharpen")]
    pub sharpen: f32,
    #[serde(default = "EffectBaseline::default_film_grain_intensity")]
    pub film_grain_intensity: f32,
    #[serde(default = "EffectBaseline::default_film_grain_response")]
    pub film_grain_response: f32,
    #[serde(default = "EffectBaseline::default_vignette_intensity")]
    pub vignette_intensity: f32,
    #[serde(default = "EffectBaseline::default_vignette_roundness")]
    pub vignette_roundness: f32,
    #[serde(default = "EffectBaseline::default_vignette_smoothness")]
    pub vignette_smoothness: f32,
    #[serde(default)]
    pub vignette_color: [f32; 3], // Linear RGB, black by default.
    #[serde(default = "EffectBaseline::default_saturation")]
    pub saturation: f32,
    #[serde(default)]
    pub motion_blur_scale: f32,
}

impl EffectBaseline {
    fn default_sharpen() -> f32 { 0.3 }
    fn default_film_grain_intensity() -> f32 { 0.035 }
    fn default_film_grain_response() -> f32 { 1.0 }
    fn default_vignette_intensity() -> f32 { 0.02 }
    fn default_vignette_roundness() -> f32 { 0.2 }
    fn default_vignette_smoothness() -> f32 { 0.9 }
    fn default_saturation() -> f32 { 1.0 }
}

impl Default for EffectBaseline {
    fn default() -> Self {
        Self {
            sharpen: Self::default_sharpen(),
            film_grain_intensity: Self::default_film_grain_intensity(),
            film_grain_response: Self::default_film_grain_response(),
            vignette_intensity: Self::default_vignette_intensity(),
            vignette_roundness: Self::default_vignette_roundness(),
            vignette_smoothness: Self::default_vignette_smoothness(),
            vignette_color: [0.0; 3],
            saturation: Self::default_saturation(),
            motion_blur_scale: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSettings {
    #[serde(default)]
    pub baseline: EffectBaseline,
    #[serde(default)]
    pub curves: EffectCurves,
    #[serde(default = "EffectSettings::default_coc_per_blur_unit")]
    pub coc_per_blur_unit: f32, // Max circle-of-confusion diameter (px) per unit of blur size.
}

impl EffectSettings {
    fn default_coc_per_blur_unit() -> f32 { 16.0 }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            baseline: EffectBaseline::default(),
            curves: EffectCurves::default(),
            coc_per_blur_unit: Self::default_coc_per_blur_unit(),
        }
    }
}

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsSettings {
    #[serde(default)]
    pub invert_y: bool, // Invert mouse Y axis
    #[serde(default)]
    pub invert_x: bool, // Invert mouse X axis
    #[serde(default = "ControlsSettings::default_sensitivity")]
    pub mouse_sensitivity: f32, // Mouse sensitivity multiplier
    #[serde(default = "ControlsSettings::default_move_speed")]
    pub move_speed: f32, // Fly speed in world units per second
    #[serde(default = "ControlsSettings::default_keybinds")]
    pub keybinds: HashMap<String, String>, // Map of action names to key identifiers (editable by user)
}

impl ControlsSettings {
    fn default_sensitivity() -> f32 { 1.0 }
    fn default_move_speed() -> f32 { 6.0 }

    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("up", "Space"),
            ("down", "LShift"),
            ("flashlight", "F"),
            ("pause", "Escape"),
            ("toggle_overlay", "F1"),
            ("toggle_gizmos", "F2"),
            ("dump_debug", "F3"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// Resolve an action to a key, falling back to `default` when the action
    /// is unbound or names an unknown key.
    #[must_use]
    pub fn key_for(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            mouse_sensitivity: Self::default_sensitivity(),
            move_speed: Self::default_move_speed(),
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub lighting: LightingSettings,
    #[serde(default)]
    pub effects: EffectSettings,
    #[serde(default)]
    pub controls: ControlsSettings,
}

impl Settings {
    #[must_use]
    pub fn defaults() -> Self { Settings::default() }

    /// Short description of each setting, grouped by section, for tooling
    /// that presents the settings file to users.
    #[must_use]
    pub fn field_descriptions() -> HashMap<&'static str, HashMap<&'static str, &'static str>> {
        let mut out = HashMap::new();

        out.insert("lighting", HashMap::from([
            ("enabled", "Sample nearby lights and drive post-processing from the result."),
            ("sample_interval", "Seconds between light samples (0 = every frame)."),
            ("lumens_per_unit", "Point/spot light power (lumens) that counts as brightness 1.0."),
            ("lux_per_unit", "Directional light illuminance (lux) that counts as brightness 1.0."),
            ("log_intensity", "Log the sampled light intensity every pass."),
        ]));

        out.insert("effects", HashMap::from([
            ("baseline", "Post-processing values applied once when the camera hooks are created."),
            ("curves", "Intensity thresholds and interpolation ranges for each effect."),
            ("coc_per_blur_unit", "Depth of field blur diameter in pixels per unit of blur size."),
        ]));

        out.insert("controls", HashMap::from([
            ("invert_y", "Invert the vertical look/mouse Y axis."),
            ("invert_x", "Invert the horizontal look/mouse X axis."),
            ("mouse_sensitivity", "Mouse look sensitivity multiplier."),
            ("move_speed", "Fly speed in world units per second."),
            ("keybinds", "Map of action names to key identifiers (editable by user)."),
        ]));

        out
    }

    /// Convert a key identifier from `controls.keybinds` (e.g. "W", "Space",
    /// "F1") into a Bevy `KeyCode`.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        let s = name.trim().to_ascii_uppercase();

        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            const LETTERS: [KeyCode; 26] = [
                KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
                KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
                KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
                KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
                KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
                KeyCode::KeyZ,
            ];
            const DIGITS: [KeyCode; 10] = [
                KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3,
                KeyCode::Digit4, KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7,
                KeyCode::Digit8, KeyCode::Digit9,
            ];
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }

        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
            const FUNCTION: [KeyCode; 12] = [
                KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
                KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
            ];
            return FUNCTION.get(usize::from(n).checked_sub(1)?).copied();
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" | "CONTROL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_curves() {
        let s = Settings::defaults();
        assert_eq!(s.effects.curves.bright_threshold, 1.2);
        assert_eq!(s.effects.curves.dark_threshold, 0.65);
        assert_eq!(s.effects.curves.focal_distance, LerpRange::new(10.0, 50.0));
        assert_eq!(s.effects.baseline.sharpen, 0.3);
        assert_eq!(s.effects.baseline.vignette_color, [0.0, 0.0, 0.0]);
        assert_eq!(s.effects.baseline.motion_blur_scale, 0.0);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let text = "(lighting: (sample_interval: 0.25), effects: (curves: (dark_threshold: 0.5)))";
        let s: Settings = ron::from_str(text).unwrap();
        assert_eq!(s.lighting.sample_interval, 0.25);
        assert!(s.lighting.enabled);
        assert_eq!(s.lighting.lumens_per_unit, 1_000_000.0);
        assert_eq!(s.effects.curves.dark_threshold, 0.5);
        assert_eq!(s.effects.curves.bright_threshold, 1.2);
        assert_eq!(s.controls.key_for("forward", KeyCode::ArrowUp), KeyCode::KeyW);
    }

    #[test]
    fn keycodes_parse() {
        assert_eq!(Settings::keycode_from_str("w"), Some(KeyCode::KeyW));
        assert_eq!(Settings::keycode_from_str("7"), Some(KeyCode::Digit7));
        assert_eq!(Settings::keycode_from_str("F3"), Some(KeyCode::F3));
        assert_eq!(Settings::keycode_from_str("f12"), Some(KeyCode::F12));
        assert_eq!(Settings::keycode_from_str("Space"), Some(KeyCode::Space));
        assert_eq!(Settings::keycode_from_str("F0"), None);
        assert_eq!(Settings::keycode_from_str("F13"), None);
        assert_eq!(Settings::keycode_from_str("nope"), None);
    }

    #[test]
    fn unknown_binding_falls_back() {
        let mut controls = ControlsSettings::default();
        controls.keybinds.insert("flashlight".into(), "???".into());
        assert_eq!(controls.key_for("flashlight", KeyCode::KeyF), KeyCode::KeyF);
        assert_eq!(controls.key_for("missing", KeyCode::KeyQ), KeyCode::KeyQ);
    }
}
