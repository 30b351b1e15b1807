//! Camera control and cursor helpers.
//!
//! `camera_look` accumulates mouse motion for the current update and applies
//! yaw/pitch to the player's transform. `cursor_grab` locks the cursor on
//! click and releases it on the pause key.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::player::Player;
use crate::settings::{ControlsSettings, Settings};

const CAMERA_MAX_PITCH_DEG: f32 = 85.0;

// Raw mouse deltas are in pixels; this brings sensitivity 1.0 to a usable speed.
const MOUSE_SCALE: f32 = 1.0 / 1_000.0;

/// The player's look orientation in radians.
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct PlayerLook {
    /// Horizontal angle around Y.
    pub yaw: f32,
    /// Vertical angle around X, clamped to +-85 degrees.
    pub pitch: f32,
}

impl PlayerLook {
    /// Apply a raw mouse delta with the player's sensitivity and inversion.
    pub fn apply_delta(&mut self, mut delta: Vec2, controls: &ControlsSettings) {
        let max_pitch = CAMERA_MAX_PITCH_DEG.to_radians();
        if controls.invert_x {
            delta.x = -delta.x;
        }
        if controls.invert_y {
            delta.y = -delta.y;
        }

        let scale = controls.mouse_sensitivity * MOUSE_SCALE;
        self.yaw -= delta.x * scale;
        self.pitch = (self.pitch - delta.y * scale).clamp(-max_pitch, max_pitch);
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(bevy::math::EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Apply mouse look while the cursor is grabbed.
#[allow(clippy::needless_pass_by_value)]
pub fn camera_look(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut motion: EventReader<MouseMotion>,
    mut query: Query<(&mut Transform, &mut PlayerLook), With<Player>>,
    settings: Res<Settings>,
) {
    let delta: Vec2 = motion.read().map(|ev| ev.delta).sum();
    if delta == Vec2::ZERO {
        return;
    }

    let Ok(window) = windows.get_single() else { return };
    if window.cursor.visible {
        return;
    }

    for (mut transform, mut look) in &mut query {
        look.apply_delta(delta, &settings.controls);
        transform.rotation = look.rotation();
    }
}

/// Lock the cursor on left click, release it on the pause key.
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_grab(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
) {
    let Ok(mut window) = windows.get_single_mut() else { return };

    if mouse.just_pressed(MouseButton::Left) {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    }

    if keys.just_pressed(settings.controls.key_for("pause", KeyCode::Escape)) {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_clamped() {
        let controls = ControlsSettings::default();
        let mut look = PlayerLook::default();
        look.apply_delta(Vec2::new(0.0, -1.0e6), &controls);
        assert!((look.pitch - 85f32.to_radians()).abs() < 1e-5);
        look.apply_delta(Vec2::new(0.0, 1.0e6), &controls);
        assert!((look.pitch + 85f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn inversion_flips_axes() {
        let mut controls = ControlsSettings::default();
        let mut a = PlayerLook::default();
        a.apply_delta(Vec2::new(10.0, 10.0), &controls);

        controls.invert_x = true;
        controls.invert_y = true;
        let mut b = PlayerLook::default();
        b.apply_delta(Vec2::new(10.0, 10.0), &controls);

        assert!((a.yaw + b.yaw).abs() < 1e-6);
        assert!((a.pitch + b.pitch).abs() < 1e-6);
    }
}
