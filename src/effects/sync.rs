//! Forward hook values into Bevy's own camera post-processing components.
//!
//! Saturation, sharpening and motion blur are only written when the camera
//! already carries the matching Bevy component. Depth of field is inserted
//! and removed to follow `DepthOfField::enabled`. Vignette and film grain
//! have no built-in counterpart and stay on the hook for custom passes.
use bevy::core_pipeline::contrast_adaptive_sharpening::ContrastAdaptiveSharpeningSettings;
use bevy::core_pipeline::dof::DepthOfFieldSettings;
use bevy::core_pipeline::motion_blur::MotionBlur;
use bevy::prelude::*;
use bevy::render::view::ColorGrading;

use crate::effects::{DepthOfField, ScreenEffects};
use crate::settings::Settings;

/// Bevy's default shutter angle, reached at a motion-blur scale of 1.
pub const FULL_SHUTTER_ANGLE: f32 = 0.5;

type BuiltinEffects = (
    Option<&'static mut ColorGrading>,
    Option<&'static mut ContrastAdaptiveSharpeningSettings>,
    Option<&'static mut MotionBlur>,
    Option<&'static mut DepthOfFieldSettings>,
);

/// Copy the hook parameters onto the camera's Bevy effect components.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_camera_effects(
    mut commands: Commands,
    settings: Res<Settings>,
    mut cameras: Query<
        (Entity, &ScreenEffects, &DepthOfField, BuiltinEffects),
        Or<(Changed<ScreenEffects>, Changed<DepthOfField>)>,
    >,
) {
    for (entity, screen, dof, (grading, cas, motion_blur, bevy_dof)) in &mut cameras {
        if let Some(mut grading) = grading {
            grading.global.post_saturation = screen.saturation;
        }

        if let Some(mut cas) = cas {
            cas.enabled = screen.sharpen > 0.0;
            cas.sharpening_strength = screen.sharpen;
        }

        if let Some(mut blur) = motion_blur {
            blur.shutter_angle = screen.motion_blur_scale * FULL_SHUTTER_ANGLE;
        }

        let coc = dof.blur_size * settings.effects.coc_per_blur_unit;
        match (dof.enabled, bevy_dof) {
            (true, Some(mut existing)) => {
                existing.focal_distance = dof.focal_distance;
                existing.max_circle_of_confusion_diameter = coc;
            }
            (true, None) => {
                commands.entity(entity).insert(DepthOfFieldSettings {
                    focal_distance: dof.focal_distance,
                    max_circle_of_confusion_diameter: coc,
                    ..default()
                });
            }
            (false, Some(_)) => {
                commands.entity(entity).remove::<DepthOfFieldSettings>();
            }
            (false, None) => {}
        }
    }
}
