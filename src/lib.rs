pub mod debug;
pub mod effects;
pub mod lighting;
pub mod player;
pub mod plugin;
pub mod ron;
pub mod settings;
pub mod ui;

pub use plugin::{GloomPlugin, GloomSet};
