use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key/value persistence for session state (theme, favorites, queue).
///
/// Implementations must tolerate missing or mangled values: a fresh start
/// with nothing saved is the normal first run, not an error.
pub trait SessionStore: Send {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str);
    fn clear(&self, key: &str);
}

/// Lets callers keep an `Arc` to a store they have already handed out.
impl<S: SessionStore + Sync> SessionStore for Arc<S> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) {
        (**self).write(key, value);
    }

    fn clear(&self, key: &str) {
        (**self).clear(key);
    }
}

/// One file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> std::io::Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(err) = std::fs::write(self.path_for(key), value) {
            log::warn!("could not persist {key}: {err}");
        }
    }

    fn clear(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}

/// In-memory store, used by tests to observe what the app persists.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    values: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn clear(&self, key: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
    }
}

/// `$XDG_DATA_HOME/vibo`, falling back to `~/.local/share/vibo`.
pub fn default_data_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return Some(Path::new(&xdg).join("vibo"));
        }
    }
    std::env::var("HOME")
        .ok()
        .map(|home| Path::new(&home).join(".local").join("share").join("vibo"))
}
