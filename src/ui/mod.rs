//! Debug overlay and light-range gizmos.
//!
//! The overlay (toggle with the `toggle_overlay` key, F1 by default) shows
//! FPS, player position, the sampled light intensity and the current effect
//! values. The gizmos (`toggle_gizmos`, F2) draw a sphere for the range of
//! every sampled point and spot light.

use bevy::diagnostic::{Diagnostic, DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::effects::{DepthOfField, ScreenEffects};
use crate::lighting::{LightIntensity, LightKind, LightSample};
use crate::player::Player;
use crate::settings::Settings;

#[derive(Resource, Default)]
pub struct DebugOverlayState {
    pub visible: bool,
}

#[derive(Resource)]
pub struct DebugOverlayTimer(pub Timer);

impl Default for DebugOverlayTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(0.25, TimerMode::Repeating))
    }
}

#[derive(Resource, Default)]
pub struct LightGizmosVisible(pub bool);

#[derive(Component)]
pub struct DebugOverlayText;

pub fn spawn_debug_overlay(mut commands: Commands) {
    commands.spawn((
        TextBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font_size: 18.0,
                    color: Color::srgb(1.0, 1.0, 0.0),
                    ..default()
                },
            ),
            style: Style {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            ..default()
        },
        DebugOverlayText,
    ));
}

#[allow(clippy::needless_pass_by_value)]
pub fn toggle_debug_views(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut overlay: ResMut<DebugOverlayState>,
    mut gizmos: ResMut<LightGizmosVisible>,
) {
    let controls = &settings.controls;
    if keys.just_pressed(controls.key_for("toggle_overlay", KeyCode::F1)) {
        overlay.visible = !overlay.visible;
    }
    if keys.just_pressed(controls.key_for("toggle_gizmos", KeyCode::F2)) {
        gizmos.0 = !gizmos.0;
    }
}

/// Render the overlay text body. Split out so the format can be tested
/// without a window.
#[must_use]
pub fn overlay_text(
    fps: f64,
    player: Option<Vec3>,
    intensity: &LightIntensity,
    screen: Option<&ScreenEffects>,
    dof: Option<&DepthOfField>,
) -> String {
    let pos = player.map_or_else(
        || "Pos: N/A".to_string(),
        |p| format!("Pos: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z),
    );

    let mut out = format!(
        "FPS: {fps:.1}\n{pos}\nLight Intensity: {:.2} ({} of {} lights)",
        intensity.value,
        intensity.contributing,
        intensity.samples.len(),
    );

    if let Some(s) = screen {
        out.push_str(&format!(
            "\nSaturation: {:.3}  Vignette: {:.3}  Grain: {:.3}",
            s.saturation, s.vignette.intensity, s.film_grain.intensity
        ));
    }
    if let Some(d) = dof {
        if d.enabled {
            out.push_str(&format!(
                "\nDepth of field: focus {:.1}, blur {:.2}",
                d.focal_distance, d.blur_size
            ));
        } else {
            out.push_str("\nDepth of field: off");
        }
    }
    out
}

#[derive(SystemParam)]
pub struct DebugOverlayCtx<'w, 's> {
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub state: Res<'w, DebugOverlayState>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, DebugOverlayTimer>,
    pub intensity: Res<'w, LightIntensity>,
    pub text: Query<'w, 's, &'static mut Text, With<DebugOverlayText>>,
    pub player: Query<
        'w,
        's,
        (&'static GlobalTransform, Option<&'static ScreenEffects>, Option<&'static DepthOfField>),
        With<Player>,
    >,
}

/// Refresh the overlay text on a fixed interval.
pub fn update_debug_overlay(mut ctx: DebugOverlayCtx<'_, '_>) {
    if !ctx.timer.0.tick(ctx.time.delta()).just_finished() {
        return;
    }

    let Ok(mut text) = ctx.text.get_single_mut() else { return };

    if !ctx.state.visible {
        text.sections[0].value.clear();
        return;
    }

    let fps = ctx
        .diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(Diagnostic::smoothed)
        .unwrap_or(0.0);

    let player = ctx.player.get_single().ok();
    text.sections[0].value = overlay_text(
        fps,
        player.map(|(tf, _, _)| tf.translation()),
        &ctx.intensity,
        player.and_then(|(_, s, _)| s),
        player.and_then(|(_, _, d)| d),
    );
}

/// Colour for a light's range sphere: green while it reaches the player.
#[must_use]
pub fn gizmo_color(sample: &LightSample, player: Vec3) -> Color {
    if sample.contribution_at(player).is_some() {
        Color::srgb(0.1, 0.9, 0.2)
    } else {
        Color::srgb(0.45, 0.45, 0.45)
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn draw_light_gizmos(
    visible: Res<LightGizmosVisible>,
    intensity: Res<LightIntensity>,
    mut gizmos: Gizmos,
) {
    if !visible.0 {
        return;
    }

    let player = intensity.player_position;
    for sample in &intensity.samples {
        if sample.kind == LightKind::Ambient {
            continue;
        }
        gizmos.sphere(sample.position, Quat::IDENTITY, sample.range, gizmo_color(sample, player));
    }
}
