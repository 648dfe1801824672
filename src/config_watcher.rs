use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub struct ConfigWatcher {
    rx: UnboundedReceiver<()>,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    /// Start watching the directory holding `config_path` for writes to that file.
    /// Returns `None` if the directory doesn't exist or the watcher fails to start.
    pub fn start(config_path: &Path) -> Option<Self> {
        let file_name = config_path.file_name()?.to_os_string();
        let watch_dir = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !watch_dir.is_dir() {
            log::info!("config watcher: {watch_dir:?} not found, skipping");
            return None;
        }

        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(e) => e,
                    Err(e) => {
                        log::warn!("config watcher error: {e}");
                        return;
                    }
                };

                if is_config_change(&event, &file_name) {
                    log::info!("config watcher: detected change in {file_name:?}");
                    let _ = tx.send(());
                }
            })
            .ok()?;

        if watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .is_err()
        {
            log::warn!("config watcher: failed to watch {watch_dir:?}");
            return None;
        }

        log::info!("config watcher started on {watch_dir:?}");
        Some(Self {
            rx,
            _watcher: watcher,
        })
    }

    /// Waits for the next change, then swallows any burst of events that
    /// arrived with it (editors often write a file in several steps).
    pub async fn changed(&mut self) -> Option<()> {
        self.rx.recv().await?;
        while self.rx.try_recv().is_ok() {}
        Some(())
    }
}

fn is_config_change(event: &notify::Event, file_name: &OsStr) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}

#[cfg(test)]
mod tests {
    use super::is_config_change;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::{Event, EventKind};
    use std::ffi::OsStr;
    use std::path::PathBuf;

    #[test]
    fn only_writes_to_the_config_file_count() {
        let name = OsStr::new("sky-color.json");
        let modified = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/etc/sky/sky-color.json"));
        assert!(is_config_change(&modified, name));

        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("sky-color.json"));
        assert!(is_config_change(&created, name));

        let other_file = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/etc/sky/settings.json"));
        assert!(!is_config_change(&other_file, name));

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/etc/sky/sky-color.json"));
        assert!(!is_config_change(&removed, name));
    }
}
