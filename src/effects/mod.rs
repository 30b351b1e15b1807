//! Camera effect hooks and the intensity-to-effect mapping.
//!
//! Two components live on the player camera: [`ScreenEffects`] (sharpen,
//! film grain, vignette, saturation, motion blur) and [`DepthOfField`].
//! [`EffectDriver`] borrows both for one pass, samples the light intensity
//! and rewrites the parameters that depend on it.
pub mod hooks;
pub mod sync;

use bevy::prelude::*;

use crate::lighting::{IntensityEstimate, LightSample, estimate_light_intensity};
use crate::settings::{EffectBaseline, EffectCurves};

pub use hooks::*;
pub use sync::*;

/// Linear interpolation with an unclamped `t`.
///
/// `t > 1` extrapolates past `b`; light intensities above 1 rely on this.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilmGrain {
    pub intensity: f32,
    pub response: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vignette {
    pub intensity: f32,
    pub roundness: f32,
    pub smoothness: f32,
    pub color: Color,
}

/// General post-processing hook on the camera.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct ScreenEffects {
    pub sharpen: f32,
    pub film_grain: FilmGrain,
    pub vignette: Vignette,
    pub saturation: f32,
    /// Fraction of the renderer's default shutter; 0 turns motion blur off.
    pub motion_blur_scale: f32,
}

impl ScreenEffects {
    #[must_use]
    pub fn from_baseline(baseline: &EffectBaseline) -> Self {
        let [r, g, b] = baseline.vignette_color;
        Self {
            sharpen: baseline.sharpen,
            film_grain: FilmGrain {
                intensity: baseline.film_grain_intensity,
                response: baseline.film_grain_response,
            },
            vignette: Vignette {
                intensity: baseline.vignette_intensity,
                roundness: baseline.vignette_roundness,
                smoothness: baseline.vignette_smoothness,
                color: Color::linear_rgb(r, g, b),
            },
            saturation: baseline.saturation,
            motion_blur_scale: baseline.motion_blur_scale,
        }
    }

    pub fn apply_baseline(&mut self, baseline: &EffectBaseline) {
        *self = Self::from_baseline(baseline);
    }
}

impl Default for ScreenEffects {
    fn default() -> Self {
        Self::from_baseline(&EffectBaseline::default())
    }
}

/// Depth-of-field hook on the camera.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct DepthOfField {
    pub enabled: bool,
    /// World units from the camera to the plane in focus.
    pub focal_distance: f32,
    pub blur_size: f32,
}

impl Default for DepthOfField {
    fn default() -> Self {
        Self { enabled: false, focal_distance: 10.0, blur_size: 1.0 }
    }
}

impl DepthOfField {
    /// Manual override: enable and set both parameters as given.
    pub fn set(&mut self, focus_distance: f32, blur_size: f32) {
        self.enabled = true;
        self.focal_distance = focus_distance;
        self.blur_size = blur_size;
    }
}

/// Map a light intensity onto the effect hooks.
///
/// The bright branch drives depth of field, the dark branch drives vignette,
/// desaturation and grain. The thresholds don't overlap so at most one of the
/// two special cases fires.
///
/// # Arguments
/// * `intensity` - Rounded light intensity at the player.
/// * `curves` - Thresholds and the ranges each effect is interpolated over.
/// * `screen` - Screen hook, written in place.
/// * `dof` - Depth of field hook, written in place.
pub fn adjust_effects(
    intensity: f32,
    curves: &EffectCurves,
    screen: &mut ScreenEffects,
    dof: &mut DepthOfField,
) {
    if intensity > curves.bright_threshold {
        screen.saturation = 1.0;
        dof.enabled = true;
        dof.focal_distance = curves.focal_distance.at(intensity);
        dof.blur_size = curves.blur_size.at(intensity);
    } else {
        dof.enabled = false;
    }

    if intensity < curves.dark_threshold {
        screen.vignette.intensity = curves.vignette.at(intensity);
        screen.saturation = curves.saturation.at(intensity);
        screen.film_grain.intensity = curves.film_grain.at(intensity);
    } else {
        screen.saturation = 1.0;
        screen.film_grain.intensity = 0.0;
    }
}

/// The light sampler and effect driver for one pass, borrowing the camera's
/// hooks without owning them.
pub struct EffectDriver<'a> {
    screen: &'a mut ScreenEffects,
    dof: &'a mut DepthOfField,
    curves: &'a EffectCurves,
}

impl<'a> EffectDriver<'a> {
    pub fn new(
        screen: &'a mut ScreenEffects,
        dof: &'a mut DepthOfField,
        curves: &'a EffectCurves,
    ) -> Self {
        Self { screen, dof, curves }
    }

    /// Estimate the light intensity at `player` and push it into the hooks.
    pub fn sample<'l, I>(&mut self, player: Vec3, lights: I) -> IntensityEstimate
    where
        I: IntoIterator<Item = &'l LightSample>,
    {
        let estimate = estimate_light_intensity(player, lights);
        self.adjust(estimate.intensity);
        estimate
    }

    /// Scalar form of [`EffectDriver::sample`].
    pub fn compute_light_intensity<'l, I>(&mut self, player: Vec3, lights: I) -> f32
    where
        I: IntoIterator<Item = &'l LightSample>,
    {
        self.sample(player, lights).intensity
    }

    pub fn adjust(&mut self, intensity: f32) {
        debug!("light intensity: {intensity}");
        adjust_effects(intensity, self.curves, self.screen, self.dof);
    }

    pub fn set_depth_of_field(&mut self, focus_distance: f32, blur_size: f32) {
        self.dof.set(focus_distance, blur_size);
    }
}
