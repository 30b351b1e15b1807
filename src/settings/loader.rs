//! Settings loading and hot-reloading.
//!
//! Settings are read from the RON files in a directory (`data/settings` by
//! default). The first file, by name, that parses wins; with none the
//! defaults are used.
use crate::ron::{RonWatcher, load_ron_files, setup_ron_watcher};
use crate::settings::Settings;
use bevy::prelude::{Res, ResMut, Resource, info};
use std::path::PathBuf;

pub const DEFAULT_SETTINGS_DIR: &str = "data/settings";

#[derive(Resource)]
pub struct SettingsWatcher {
    pub dir: PathBuf,
    watcher: RonWatcher,
}

impl SettingsWatcher {
    /// A watcher that never fires, for platforms without notify support or
    /// when the directory is missing.
    #[must_use]
    pub fn stub(dir: impl Into<PathBuf>) -> Self {
        SettingsWatcher { dir: dir.into(), watcher: RonWatcher::stub() }
    }

    pub fn mark_changed(&self) {
        self.watcher.mark_changed();
    }
}

/// Load settings from the RON files in `dir`.
#[must_use]
pub fn load_settings_from_dir(dir: impl AsRef<std::path::Path>) -> Settings {
    let items: Vec<Settings> = load_ron_files(dir);
    items.into_iter().next().unwrap_or_default()
}

/// Create a watcher for the settings directory.
///
/// # Arguments
/// * `dir` - Directory holding the settings `.ron` files.
///
/// # Return
/// A [`SettingsWatcher`] whose flag is raised when a file in `dir` is
/// created or modified.
///
/// # Errors
/// Propagates the `notify::Error` when the directory cannot be watched.
pub fn setup_settings_watcher(dir: impl Into<PathBuf>) -> Result<SettingsWatcher, notify::Error> {
    let dir = dir.into();
    let watcher = setup_ron_watcher(&dir)?;
    Ok(SettingsWatcher { dir, watcher })
}

/// Reload the `Settings` resource when the watched directory changed.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.watcher.take_changed() {
        info!("settings changed, reloading from {}", watcher.dir.display());
        *settings = load_settings_from_dir(&watcher.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::*;

    #[test]
    fn missing_dir_gives_defaults() {
        let s = load_settings_from_dir("/no/such/settings/dir");
        assert_eq!(s.lighting.lumens_per_unit, Settings::defaults().lighting.lumens_per_unit);
    }

    #[test]
    fn shipped_settings_parse() {
        let items: Vec<Settings> =
            load_ron_files(concat!(env!("CARGO_MANIFEST_DIR"), "/data/settings"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].effects.curves.dark_threshold, 0.65);
        assert_eq!(items[0].controls.key_for("flashlight", KeyCode::KeyQ), KeyCode::KeyF);
    }

    #[test]
    fn reloads_when_flag_is_raised() {
        let dir = std::env::temp_dir().join(format!("gloom-settings-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("settings.ron"), "(lighting: (enabled: false))").unwrap();

        let mut app = App::new();
        app.insert_resource(Settings::defaults())
            .insert_resource(SettingsWatcher::stub(&dir))
            .add_systems(Update, check_settings_changes);

        app.update();
        assert!(app.world().resource::<Settings>().lighting.enabled);

        app.world().resource::<SettingsWatcher>().mark_changed();
        app.update();
        assert!(!app.world().resource::<Settings>().lighting.enabled);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
