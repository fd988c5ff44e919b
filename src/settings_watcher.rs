//! Hot reload for the settings file.
//!
//! Watches the directory containing the settings file (editors often replace the
//! file instead of writing in place) and reports changes to that one file.

use crate::error::EngineResult;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use tracing::{debug, warn};

pub use crate::settings::default_settings_path;

/// Change observed on the watched settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsEvent {
    /// File was created or modified; reload it
    Changed,
    /// File was removed; fall back to defaults
    Removed,
}

pub struct SettingsWatcher {
    path: PathBuf,
    rx: Receiver<notify::Result<Event>>,
    // Dropping the watcher stops event delivery
    _watcher: RecommendedWatcher,
}

impl SettingsWatcher {
    pub fn new(path: PathBuf) -> EngineResult<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx)?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        debug!(path = %path.display(), "Watching settings file");
        Ok(Self {
            path,
            rx,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain pending file events, returning the most significant one for our file.
    pub fn poll(&mut self) -> Option<SettingsEvent> {
        let mut result = None;
        loop {
            match self.rx.try_recv() {
                Ok(Ok(event)) => {
                    if !self.concerns_settings_file(&event) {
                        continue;
                    }
                    match event.kind {
                        EventKind::Remove(_) => result = Some(SettingsEvent::Removed),
                        EventKind::Create(_) | EventKind::Modify(_) => {
                            result = Some(SettingsEvent::Changed)
                        }
                        _ => {}
                    }
                }
                Ok(Err(e)) => warn!(error = %e, "Settings watcher error"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        result
    }

    fn concerns_settings_file(&self, event: &Event) -> bool {
        let Some(name) = self.path.file_name() else {
            return false;
        };
        event.paths.iter().any(|p| p.file_name() == Some(name))
    }
}
