//! Helpers for reading RON files from a directory and watching it for edits.
//!
//! The watcher only raises a flag; systems poll it with
//! [`RonWatcher::take_changed`] and reload on the main thread.

use bevy::log::{error, warn};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// File-watcher handle for RON hot-reload.
pub struct RonWatcher {
    changed: Arc<AtomicBool>,
    handle: Option<RecommendedWatcher>, // dropped watcher stops delivering events
}

impl RonWatcher {
    /// A watcher with no OS backing; `take_changed` always returns `false`
    /// unless [`RonWatcher::mark_changed`] is called.
    #[must_use]
    pub fn stub() -> Self {
        RonWatcher {
            changed: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Consume the pending change flag.
    pub fn take_changed(&self) -> bool {
        self.changed.swap(false, Ordering::AcqRel)
    }

    /// Force a reload on the next poll.
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}

/// Parse every `.ron` file in `dir` as `T`, sorted by file name.
///
/// # Arguments
/// * `dir` - Directory to scan for `.ron` files.
///
/// # Return
/// Every successfully deserialized item. Unreadable directories yield an
/// empty list; files that fail to parse are skipped with a warning.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(dir: impl AsRef<Path>) -> Vec<T> {
    let Ok(entries) = std::fs::read_dir(dir.as_ref()) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("failed to read {}: {e}", path.display());
                    return None;
                }
            };
            match ron::from_str::<T>(&content) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("failed to parse {}: {e}", path.display());
                    None
                }
            }
        })
        .collect()
}

/// Watch `dir` (non-recursively) and flag any modification under it.
///
/// # Errors
/// Returns a `notify::Error` when the OS watcher cannot be created or cannot
/// register `dir`.
pub fn setup_ron_watcher(dir: impl AsRef<Path>) -> Result<RonWatcher, notify::Error> {
    let dir = dir.as_ref();
    let changed = Arc::new(AtomicBool::new(false));
    let flag = changed.clone();
    let watched: PathBuf = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                let relevant = matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) && event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched)
                });
                if relevant {
                    flag.store(true, Ordering::Release);
                }
            }
            Err(e) => error!("settings watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(RonWatcher { changed, handle: Some(watcher) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Item {
        value: u32,
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gloom-ron-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_sorted_and_skips_bad_files() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("b.ron"), "(value: 2)").unwrap();
        std::fs::write(dir.join("a.ron"), "(value: 1)").unwrap();
        std::fs::write(dir.join("broken.ron"), "(value: ").unwrap();
        std::fs::write(dir.join("notes.txt"), "(value: 9)").unwrap();

        let items: Vec<Item> = load_ron_files(&dir);
        assert_eq!(items, vec![Item { value: 1 }, Item { value: 2 }]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_dir_is_empty() {
        let items: Vec<Item> = load_ron_files("/definitely/not/a/real/dir");
        assert!(items.is_empty());
    }

    #[test]
    fn stub_flag_is_consumed_once() {
        let w = RonWatcher::stub();
        assert!(!w.is_live());
        assert!(!w.take_changed());
        w.mark_changed();
        assert!(w.take_changed());
        assert!(!w.take_changed());
    }
}
