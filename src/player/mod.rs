//! The local player: a camera entity that light sampling is measured from.
//!
//! `camera` holds mouse look and cursor grab, `movement` a free-fly
//! controller and the flashlight toggle.
//!
//! # Example:
//!
//! ```ignore
//! commands.spawn((
//!     Camera3dBundle::default(),
//!     Player,
//!     PlayerLook::default(),
//! ));
//! ```
pub mod camera;
pub mod movement;

use bevy::prelude::*;

pub use camera::*;
pub use movement::*;

/// Marks the local player's camera. Its `GlobalTransform` is the sampling
/// position and it carries the effect hooks.
#[derive(Component, Default, Clone, Copy, Debug)]
pub struct Player;
