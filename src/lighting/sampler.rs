//! Bevy side of light sampling.
//!
//! Point, spot and directional lights tagged with [`SampledLight`] are turned
//! into [`LightSample`]s each pass, fed through the [`EffectDriver`] for the
//! player camera, and the result is published in [`LightIntensity`].
use std::time::Duration;

use bevy::ecs::query::QuerySingleError;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::effects::{DepthOfField, EffectDriver, ScreenEffects};
use crate::lighting::{LightKind, LightSample};
use crate::player::Player;
use crate::settings::{LightingSettings, Settings};

/// Tags a Bevy light as one the player's light sampling should consider.
#[derive(Component, Clone, Copy, Debug)]
pub struct SampledLight {
    /// Scales point/spot brightness; ignored for directional lights.
    pub brightness_multiplier: f32,
}

impl Default for SampledLight {
    fn default() -> Self {
        Self { brightness_multiplier: 1.0 }
    }
}

/// Whether the last sampling pass found exactly one player to sample at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplerStatus {
    /// No pass has run yet.
    #[default]
    Waiting,
    Sampling,
    /// Hooks exist but no `Player` entity does.
    NoPlayer,
    /// More than one `Player` entity; the sampling position is ambiguous.
    MultiplePlayers,
}

/// Latest sampling result.
#[derive(Resource, Default, Debug, Clone)]
pub struct LightIntensity {
    pub value: f32,
    pub contributing: usize,
    /// Samples used for the last pass, kept for overlays and dumps.
    pub samples: Vec<LightSample>,
    pub player_position: Vec3,
    pub status: SamplerStatus,
}

/// Throttle for sampling when `lighting.sample_interval` is non-zero.
#[derive(Resource)]
pub struct SampleTimer {
    pub timer: Timer,
    rejected_interval: Option<f32>,
}

impl Default for SampleTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(0.0, TimerMode::Repeating),
            rejected_interval: None,
        }
    }
}

impl SampleTimer {
    /// Advance by `delta`; true when a sample is due. An interval of zero or
    /// less samples every call, and so does one that isn't a valid duration
    /// (NaN, infinite or too large), after a single warning.
    pub fn due(&mut self, delta: Duration, interval: f32) -> bool {
        if interval <= 0.0 {
            self.rejected_interval = None;
            return true;
        }
        let Ok(wanted) = Duration::try_from_secs_f32(interval) else {
            if self.rejected_interval.is_none_or(|prev| prev.to_bits() != interval.to_bits()) {
                warn!("lighting.sample_interval {interval} is not a valid duration, sampling every frame");
                self.rejected_interval = Some(interval);
            }
            return true;
        };
        self.rejected_interval = None;
        if self.timer.duration() != wanted {
            self.timer.set_duration(wanted);
            self.timer.reset();
        }
        self.timer.tick(delta).just_finished()
    }

    /// True while the configured interval is being ignored as invalid.
    #[must_use]
    pub fn interval_rejected(&self) -> bool {
        self.rejected_interval.is_some()
    }
}

/// Which Bevy light a tagged entity carries.
#[derive(Clone, Copy, Debug)]
pub enum LightSource<'a> {
    Point(&'a PointLight),
    Spot(&'a SpotLight),
    Directional(&'a DirectionalLight),
}

/// Build a sample from a Bevy light, converting photometric units to
/// gameplay brightness with the configured scales.
#[must_use]
pub fn sample_light(
    source: LightSource<'_>,
    position: Vec3,
    enabled: bool,
    tag: &SampledLight,
    lighting: &LightingSettings,
) -> LightSample {
    let (kind, brightness, multiplier, range) = match source {
        LightSource::Point(p) => (
            LightKind::Point,
            p.intensity / lighting.lumens_per_unit,
            tag.brightness_multiplier,
            p.range,
        ),
        LightSource::Spot(s) => (
            LightKind::Spot,
            s.intensity / lighting.lumens_per_unit,
            tag.brightness_multiplier,
            s.range,
        ),
        LightSource::Directional(d) => (
            LightKind::Ambient,
            d.illuminance / lighting.lux_per_unit,
            1.0,
            f32::INFINITY,
        ),
    };

    LightSample {
        kind,
        position,
        brightness,
        brightness_multiplier: multiplier,
        range,
        enabled,
    }
}

type TaggedLights<'w, 's> = Query<
    'w,
    's,
    (
        &'static GlobalTransform,
        Option<&'static Visibility>,
        Option<&'static InheritedVisibility>,
        &'static SampledLight,
        AnyOf<(&'static PointLight, &'static SpotLight, &'static DirectionalLight)>,
    ),
>;

#[derive(SystemParam)]
pub struct SamplerCtx<'w, 's> {
    pub settings: Res<'w, Settings>,
    pub time: Res<'w, Time>,
    pub timer: ResMut<'w, SampleTimer>,
    pub intensity: ResMut<'w, LightIntensity>,
    pub lights: TaggedLights<'w, 's>,
    pub player: Query<
        'w,
        's,
        (&'static GlobalTransform, &'static mut ScreenEffects, &'static mut DepthOfField),
        With<Player>,
    >,
}

/// Gather tagged lights, estimate the intensity at the player and drive the
/// camera's effect hooks.
///
/// Only scheduled once the player camera has its hooks (see
/// [`crate::plugin::GloomPlugin`]); with no such camera it does nothing.
pub fn sample_light_intensity(mut ctx: SamplerCtx<'_, '_>) {
    let lighting = &ctx.settings.lighting;
    if !lighting.enabled {
        return;
    }
    if !ctx.timer.due(ctx.time.delta(), lighting.sample_interval) {
        return;
    }

    let state = &mut *ctx.intensity;
    let (player_tf, mut screen, mut dof) = match ctx.player.get_single_mut() {
        Ok(player) => player,
        Err(err) => {
            let status = match err {
                QuerySingleError::NoEntities(_) => SamplerStatus::NoPlayer,
                QuerySingleError::MultipleEntities(_) => SamplerStatus::MultiplePlayers,
            };
            if state.status != status {
                match status {
                    SamplerStatus::MultiplePlayers => {
                        error!("light sampling paused: more than one Player entity, expected exactly one");
                    }
                    _ => warn!("light sampling paused: effect hooks exist but no Player entity does"),
                }
                state.status = status;
            }
            return;
        }
    };
    if state.status != SamplerStatus::Sampling {
        if matches!(state.status, SamplerStatus::NoPlayer | SamplerStatus::MultiplePlayers) {
            info!("light sampling resumed");
        }
        state.status = SamplerStatus::Sampling;
    }
    let player = player_tf.translation();

    state.samples.clear();
    state.samples.extend(ctx.lights.iter().filter_map(|(tf, vis, inherited, tag, (point, spot, dir))| {
        let source = match (point, spot, dir) {
            (Some(p), _, _) => LightSource::Point(p),
            (_, Some(s), _) => LightSource::Spot(s),
            (_, _, Some(d)) => LightSource::Directional(d),
            _ => return None,
        };
        // hidden parents hide the light too; bare lights fall back to their own visibility
        let enabled = match inherited {
            Some(inherited) => inherited.get(),
            None => vis.map_or(true, |v| *v != Visibility::Hidden),
        };
        Some(sample_light(source, tf.translation(), enabled, tag, lighting))
    }));

    let estimate = EffectDriver::new(&mut screen, &mut dof, &ctx.settings.effects.curves)
        .sample(player, &state.samples);

    if lighting.log_intensity {
        info!("Light Intensity: {}", estimate.intensity);
    }

    state.value = estimate.intensity;
    state.contributing = estimate.contributing;
    state.player_position = player;
}
