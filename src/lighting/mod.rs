//! Light sampling math.
//!
//! Everything in this module is pure and works on plain `LightSample`s so
//! the ECS systems, benches and tests all share the same code path. The
//! Bevy-facing extraction lives in [`sampler`].
pub mod sampler;

use bevy::prelude::*;

pub use sampler::*;

/// Kind of light a sample was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Spot,
    /// Environment/sky light. Always in range, multiplier ignored.
    Ambient,
}

/// A single light as seen from the player for one sampling pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSample {
    pub kind: LightKind,
    pub position: Vec3,
    /// Brightness in gameplay units (roughly 0..2 for normal scenes).
    pub brightness: f32,
    pub brightness_multiplier: f32,
    pub range: f32,
    pub enabled: bool,
}

impl LightSample {
    #[must_use]
    pub fn point(position: Vec3, brightness: f32, range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            brightness,
            brightness_multiplier: 1.0,
            range,
            enabled: true,
        }
    }

    #[must_use]
    pub fn spot(position: Vec3, brightness: f32, range: f32) -> Self {
        Self { kind: LightKind::Spot, ..Self::point(position, brightness, range) }
    }

    #[must_use]
    pub fn ambient(position: Vec3, brightness: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            position,
            brightness,
            brightness_multiplier: 1.0,
            range: f32::INFINITY,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f32) -> Self {
        self.brightness_multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Brightness after the per-light multiplier. Ambient lights ignore it.
    #[inline]
    #[must_use]
    pub fn effective_brightness(&self) -> f32 {
        match self.kind {
            LightKind::Point | LightKind::Spot => self.brightness * self.brightness_multiplier,
            LightKind::Ambient => self.brightness,
        }
    }

    #[inline]
    #[must_use]
    pub fn effective_range(&self) -> f32 {
        match self.kind {
            LightKind::Point | LightKind::Spot => self.range,
            LightKind::Ambient => f32::INFINITY,
        }
    }

    /// Contribution of this light at `player`, or `None` when the light is
    /// disabled or the player is at or beyond its range.
    #[must_use]
    pub fn contribution_at(&self, player: Vec3) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        let range = self.effective_range();
        let distance = self.position.distance(player);
        if distance >= range {
            return None;
        }
        Some(attenuate(self.effective_brightness(), distance, range))
    }
}

/// Distance falloff normalized to `brightness` at the light and half of it at
/// `range`. An infinite range leaves `brightness` untouched.
#[inline]
#[must_use]
pub fn attenuate(brightness: f32, distance: f32, range: f32) -> f32 {
    if range.is_infinite() {
        return brightness;
    }
    brightness / (1.0 + distance * distance / (range * range))
}

/// Round to `digits` decimal places, ties to even.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn round_to(value: f32, digits: i32) -> f32 {
    let scale = 10f64.powi(digits);
    ((f64::from(value) * scale).round_ties_even() / scale) as f32
}

/// Aggregate of one sampling pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IntensityEstimate {
    /// Average contribution, rounded to two decimals.
    pub intensity: f32,
    /// How many lights were in range and enabled.
    pub contributing: usize,
}

/// Average attenuated brightness of every enabled, in-range light.
///
/// # Arguments
/// * `player` - World position the light is measured at.
/// * `lights` - Candidate lights; disabled and out-of-range ones are skipped.
///
/// # Return
/// The rounded average over contributing lights and how many contributed.
/// An estimate of `0.0` with zero contributors when nothing reaches the
/// player.
#[must_use]
pub fn estimate_light_intensity<'a, I>(player: Vec3, lights: I) -> IntensityEstimate
where
    I: IntoIterator<Item = &'a LightSample>,
{
    let mut total = 0.0_f32;
    let mut contributing = 0usize;

    for light in lights {
        if let Some(c) = light.contribution_at(player) {
            total += c;
            contributing += 1;
        }
    }

    if contributing == 0 {
        return IntensityEstimate::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let average = total / contributing as f32;
    IntensityEstimate {
        intensity: round_to(average, 2),
        contributing,
    }
}

/// Scalar form of [`estimate_light_intensity`].
#[must_use]
pub fn compute_light_intensity<'a, I>(player: Vec3, lights: I) -> f32
where
    I: IntoIterator<Item = &'a LightSample>,
{
    estimate_light_intensity(player, lights).intensity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_lights_is_zero() {
        let lights: Vec<LightSample> = Vec::new();
        let est = estimate_light_intensity(Vec3::ZERO, &lights);
        assert_eq!(est.intensity, 0.0);
        assert_eq!(est.contributing, 0);
    }

    #[test]
    fn light_on_player_gives_full_brightness() {
        let lights = [LightSample::point(Vec3::ZERO, 10.0, 10.0)];
        assert_eq!(compute_light_intensity(Vec3::ZERO, &lights), 10.0);
    }

    #[test]
    fn light_exactly_at_range_is_excluded() {
        let lights = [LightSample::point(Vec3::new(10.0, 0.0, 0.0), 10.0, 10.0)];
        let est = estimate_light_intensity(Vec3::ZERO, &lights);
        assert_eq!(est.intensity, 0.0);
        assert_eq!(est.contributing, 0);
    }

    #[test]
    fn disabled_and_far_lights_are_ignored() {
        let lights = [
            LightSample::point(Vec3::ZERO, 4.0, 10.0).disabled(),
            LightSample::spot(Vec3::new(0.0, 50.0, 0.0), 4.0, 10.0),
            LightSample::ambient(Vec3::ZERO, 3.0).disabled(),
        ];
        assert_eq!(compute_light_intensity(Vec3::ZERO, &lights), 0.0);
    }

    #[test]
    fn ambient_contributes_full_brightness_at_any_distance() {
        let lights = [LightSample::ambient(Vec3::new(5_000.0, 800.0, -3_000.0), 0.8)];
        assert_eq!(compute_light_intensity(Vec3::ZERO, &lights), 0.8);
    }

    #[test]
    fn ambient_ignores_multiplier() {
        let light = LightSample::ambient(Vec3::ZERO, 2.0).with_multiplier(5.0);
        assert_eq!(light.effective_brightness(), 2.0);
    }

    #[test]
    fn multiplier_scales_point_and_spot() {
        let p = LightSample::point(Vec3::ZERO, 2.0, 5.0).with_multiplier(1.5);
        let s = LightSample::spot(Vec3::ZERO, 2.0, 5.0).with_multiplier(0.5);
        assert_eq!(p.effective_brightness(), 3.0);
        assert_eq!(s.effective_brightness(), 1.0);
    }

    #[test]
    fn contribution_at_half_range() {
        // d = range / 2 -> 1 / (1 + 0.25)
        let light = LightSample::point(Vec3::new(0.0, 0.0, 5.0), 1.0, 10.0);
        let c = light.contribution_at(Vec3::ZERO).unwrap();
        assert!((c - 0.8).abs() < 1e-6);
    }

    #[test]
    fn contribution_never_exceeds_brightness() {
        for i in 0..100 {
            let d = i as f32 * 0.1;
            let light = LightSample::point(Vec3::new(d, 0.0, 0.0), 3.0, 10.0).with_multiplier(2.0);
            if let Some(c) = light.contribution_at(Vec3::ZERO) {
                assert!(c >= 0.0 && c <= 6.0);
            }
        }
    }

    #[test]
    fn averages_over_contributing_lights_only() {
        let lights = [
            LightSample::point(Vec3::ZERO, 1.0, 10.0),
            LightSample::ambient(Vec3::ZERO, 0.5),
            LightSample::point(Vec3::new(100.0, 0.0, 0.0), 9.0, 10.0),
        ];
        let est = estimate_light_intensity(Vec3::ZERO, &lights);
        assert_eq!(est.contributing, 2);
        assert_eq!(est.intensity, 0.75);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        // 1 / (1 + 9/100) = 0.917431...
        let lights = [LightSample::point(Vec3::new(3.0, 0.0, 0.0), 1.0, 10.0)];
        assert_eq!(compute_light_intensity(Vec3::ZERO, &lights), 0.92);
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(1.0 / 3.0, 2), 0.33);
    }

    #[test]
    fn result_is_never_negative() {
        let lights = [
            LightSample::point(Vec3::ZERO, 0.0, 1.0),
            LightSample::spot(Vec3::new(0.5, 0.0, 0.0), 0.2, 1.0),
        ];
        assert!(compute_light_intensity(Vec3::ZERO, &lights) >= 0.0);
    }
}
