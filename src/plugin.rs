//! `GloomPlugin`: registers resources and schedules the sampling pipeline.
use bevy::prelude::*;

use crate::effects::{
    DepthOfFieldOverride, EffectHooksReady, acquire_effect_hooks, apply_depth_of_field_overrides,
    sync_camera_effects,
};
use crate::lighting::{LightIntensity, SampleTimer, sample_light_intensity};
use crate::settings::Settings;
use crate::settings::loader::{self, SettingsWatcher};

/// Ordering of the per-frame lighting work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GloomSet {
    /// Find or create the camera's effect hooks.
    Hooks,
    /// Sample lights and drive the hooks.
    Sample,
    /// Push hook values to Bevy's camera components.
    Sync,
}

/// Light-driven post-processing for the `Player` camera.
///
/// Inserts default `Settings` when the app has none. Hot reload is enabled
/// only when a [`SettingsWatcher`] resource is present.
#[derive(Default)]
pub struct GloomPlugin;

impl Plugin for GloomPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Settings>() {
            app.insert_resource(Settings::defaults());
        }

        app.init_resource::<LightIntensity>()
            .init_resource::<SampleTimer>()
            .add_event::<DepthOfFieldOverride>()
            .configure_sets(Update, (GloomSet::Hooks, GloomSet::Sample, GloomSet::Sync).chain())
            .add_systems(Update, acquire_effect_hooks.in_set(GloomSet::Hooks))
            .add_systems(
                Update,
                (sample_light_intensity, apply_depth_of_field_overrides)
                    .chain()
                    .in_set(GloomSet::Sample)
                    .run_if(any_with_component::<EffectHooksReady>),
            )
            .add_systems(Update, sync_camera_effects.in_set(GloomSet::Sync))
            .add_systems(
                PreUpdate,
                loader::check_settings_changes.run_if(resource_exists::<SettingsWatcher>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{DepthOfField, ScreenEffects};
    use crate::lighting::SampledLight;
    use crate::player::Player;

    #[test]
    fn full_pass_from_light_to_hooks() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(GloomPlugin);

        let cam = app
            .world_mut()
            .spawn((Camera3d::default(), Player, GlobalTransform::from_translation(Vec3::ZERO)))
            .id();
        app.world_mut().spawn((
            PointLight { intensity: 500_000.0, range: 10.0, ..default() },
            SampledLight::default(),
            GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 5.0)),
        ));

        // the first update attaches the hooks, the second samples with them settled
        app.update();
        app.update();

        // 0.5 / (1 + 25/100) = 0.4
        assert_eq!(app.world().resource::<LightIntensity>().value, 0.4);
        let screen = app.world().get::<ScreenEffects>(cam).unwrap();
        assert!((screen.saturation - (0.15 + 0.4 * 0.85)).abs() < 1e-5);
        assert!(!app.world().get::<DepthOfField>(cam).unwrap().enabled);
    }

    #[test]
    fn no_player_means_no_sampling() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(GloomPlugin);
        app.world_mut().spawn((
            PointLight::default(),
            SampledLight::default(),
            GlobalTransform::default(),
        ));
        app.update();

        let state = app.world().resource::<LightIntensity>();
        assert!(state.samples.is_empty());
        assert_eq!(state.value, 0.0);
    }
}
