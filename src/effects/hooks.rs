//! Find-or-create of the effect hooks on the player camera.
use bevy::prelude::*;

use crate::effects::{DepthOfField, ScreenEffects};
use crate::player::Player;
use crate::settings::Settings;

/// Marks a camera whose hooks have been acquired and given their baseline.
#[derive(Component, Default)]
pub struct EffectHooksReady;

type PendingCameras<'w, 's> = Query<
    'w,
    's,
    (Entity, Option<&'static mut ScreenEffects>, Has<DepthOfField>),
    (With<Camera3d>, With<Player>, Without<EffectHooksReady>),
>;

/// Attach `ScreenEffects` and `DepthOfField` to the player camera, reusing
/// existing ones, and apply the baseline once.
///
/// Runs every frame but only touches cameras not yet marked
/// [`EffectHooksReady`], so the baseline is never re-applied.
#[allow(clippy::needless_pass_by_value)]
pub fn acquire_effect_hooks(mut commands: Commands, settings: Res<Settings>, mut cameras: PendingCameras<'_, '_>) {
    let baseline = &settings.effects.baseline;

    for (entity, screen, has_dof) in &mut cameras {
        let mut cmd = commands.entity(entity);

        match screen {
            Some(mut existing) => existing.apply_baseline(baseline),
            None => {
                cmd.insert(ScreenEffects::from_baseline(baseline));
            }
        }
        if !has_dof {
            cmd.insert(DepthOfField::default());
        }
        cmd.insert(EffectHooksReady);

        info!("effect hooks ready on camera {entity:?}");
    }
}

/// Request to force depth of field on with fixed parameters, e.g. while
/// aiming. The next light sample may switch it off again.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct DepthOfFieldOverride {
    pub focus_distance: f32,
    pub blur_size: f32,
}

/// Apply the most recent [`DepthOfFieldOverride`] of this frame.
pub fn apply_depth_of_field_overrides(
    mut events: EventReader<DepthOfFieldOverride>,
    mut hooks: Query<&mut DepthOfField, With<Player>>,
) {
    let Some(last) = events.read().last().copied() else {
        return;
    };
    for mut dof in &mut hooks {
        dof.set(last.focus_distance, last.blur_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.insert_resource(Settings::defaults())
            .add_systems(Update, acquire_effect_hooks);
        app
    }

    #[test]
    fn creates_missing_hooks() {
        let mut app = app();
        let cam = app.world_mut().spawn((Camera3d::default(), Player)).id();
        app.update();

        let world = app.world();
        assert_eq!(world.get::<ScreenEffects>(cam), Some(&ScreenEffects::default()));
        assert_eq!(world.get::<DepthOfField>(cam), Some(&DepthOfField::default()));
        assert!(world.get::<EffectHooksReady>(cam).is_some());
    }

    #[test]
    fn existing_hook_is_reset_to_baseline_once() {
        let mut app = app();
        let mut tweaked = ScreenEffects::default();
        tweaked.sharpen = 0.9;
        tweaked.saturation = 0.1;
        let cam = app.world_mut().spawn((Camera3d::default(), Player, tweaked)).id();
        app.update();
        assert_eq!(app.world().get::<ScreenEffects>(cam).map(|s| s.sharpen), Some(0.3));

        app.world_mut().get_mut::<ScreenEffects>(cam).unwrap().sharpen = 0.5;
        app.update();
        assert_eq!(app.world().get::<ScreenEffects>(cam).map(|s| s.sharpen), Some(0.5));
    }

    #[test]
    fn last_override_wins() {
        let mut app = App::new();
        app.add_event::<DepthOfFieldOverride>()
            .add_systems(Update, apply_depth_of_field_overrides);
        let cam = app.world_mut().spawn((Player, DepthOfField::default())).id();

        app.world_mut().send_event(DepthOfFieldOverride { focus_distance: 3.0, blur_size: 1.0 });
        app.world_mut().send_event(DepthOfFieldOverride { focus_distance: 8.0, blur_size: 2.5 });
        app.update();

        assert_eq!(
            app.world().get::<DepthOfField>(cam),
            Some(&DepthOfField { enabled: true, focal_distance: 8.0, blur_size: 2.5 })
        );
    }

    #[test]
    fn ignores_cameras_without_player() {
        let mut app = app();
        let cam = app.world_mut().spawn(Camera3d::default()).id();
        app.update();
        assert!(app.world().get::<ScreenEffects>(cam).is_none());
    }
}
