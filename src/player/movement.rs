//! Free-fly movement and the player's flashlight.

use bevy::prelude::*;

use crate::player::Player;
use crate::settings::{ControlsSettings, Settings};

/// Spot light carried by the player, toggled with the flashlight key.
#[derive(Component, Default)]
pub struct Flashlight;

/// Movement direction for the pressed keys, relative to the camera and
/// flattened to the horizontal plane (up/down move along world Y).
#[must_use]
pub fn fly_direction(
    keys: &ButtonInput<KeyCode>,
    controls: &ControlsSettings,
    transform: &Transform,
) -> Vec3 {
    let forward = transform.forward();
    let forward = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right = transform.right();
    let right = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

    let bindings = [
        ("forward", KeyCode::KeyW, forward),
        ("back", KeyCode::KeyS, -forward),
        ("left", KeyCode::KeyA, -right),
        ("right", KeyCode::KeyD, right),
        ("up", KeyCode::Space, Vec3::Y),
        ("down", KeyCode::ShiftLeft, Vec3::NEG_Y),
    ];

    bindings
        .into_iter()
        .filter(|(action, default, _)| keys.pressed(controls.key_for(action, *default)))
        .map(|(_, _, dir)| dir)
        .sum::<Vec3>()
        .normalize_or_zero()
}

/// Move the player camera with WASD, Space and Shift.
#[allow(clippy::needless_pass_by_value)]
pub fn fly_movement(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    settings: Res<Settings>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    let controls = &settings.controls;
    for mut transform in &mut query {
        let dir = fly_direction(&keys, controls, &transform);
        if dir != Vec3::ZERO {
            transform.translation += dir * controls.move_speed * time.delta_seconds();
        }
    }
}

/// Show or hide the flashlight. Hidden lights are skipped by light sampling.
#[allow(clippy::needless_pass_by_value)]
pub fn toggle_flashlight(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut lights: Query<&mut Visibility, With<Flashlight>>,
) {
    if !keys.just_pressed(settings.controls.key_for("flashlight", KeyCode::KeyF)) {
        return;
    }
    for mut vis in &mut lights {
        *vis = match *vis {
            Visibility::Hidden => Visibility::Inherited,
            _ => Visibility::Hidden,
        };
        info!("flashlight {}", if *vis == Visibility::Hidden { "off" } else { "on" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_back_cancel() {
        let controls = ControlsSettings::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::KeyS);
        assert_eq!(fly_direction(&keys, &controls, &Transform::IDENTITY), Vec3::ZERO);
    }

    #[test]
    fn forward_is_negative_z_and_normalized() {
        let controls = ControlsSettings::default();
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);
        keys.press(KeyCode::Space);
        let dir = fly_direction(&keys, &controls, &Transform::IDENTITY);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.z < 0.0 && dir.y > 0.0);
    }

    #[test]
    fn flashlight_toggles_visibility() {
        let mut app = App::new();
        app.insert_resource(Settings::defaults())
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, toggle_flashlight);
        let light = app.world_mut().spawn((Flashlight, Visibility::Inherited)).id();

        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::KeyF);
        app.update();
        assert_eq!(app.world().get::<Visibility>(light), Some(&Visibility::Hidden));
    }
}
