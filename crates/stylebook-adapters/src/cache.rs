//! Template source cache keyed by path and modification time.
//!
//! Adapters read the same templates (layouts, includes, component files) for
//! many variants in one build. Entries are reused while the file's mtime is
//! unchanged and can be dropped explicitly when a component file is
//! registered again after an edit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CachedTemplate {
    modified: Option<SystemTime>,
    source: Arc<str>,
}

/// Shared cache of template sources (thread-safe).
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: DashMap<PathBuf, CachedTemplate>,
}

impl TemplateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the source of `path`, reading it if it is not cached or its
    /// mtime changed since it was cached.
    pub fn load(&self, path: &Path) -> io::Result<Arc<str>> {
        let modified = fs::metadata(path)?.modified().ok();

        if let Some(cached) = self.entries.get(path) {
            if modified.is_some() && cached.modified == modified {
                return Ok(Arc::clone(&cached.source));
            }
        }

        let source: Arc<str> = fs::read_to_string(path)?.into();
        tracing::debug!("Cached template {}", path.display());

        self.entries.insert(
            path.to_path_buf(),
            CachedTemplate {
                modified,
                source: Arc::clone(&source),
            },
        );

        Ok(source)
    }

    /// Drop the entry for `path`. Returns whether an entry existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Whether `path` is currently cached.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn caches_loaded_templates() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("button.html");
        fs::write(&file, "<button></button>").unwrap();

        let cache = TemplateCache::new();
        let first = cache.load(&file).unwrap();
        let second = cache.load(&file).unwrap();

        assert_eq!(&*first, "<button></button>");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reloads_after_modification() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("button.html");
        fs::write(&file, "old").unwrap();

        let cache = TemplateCache::new();
        assert_eq!(&*cache.load(&file).unwrap(), "old");

        fs::write(&file, "new").unwrap();
        let later = SystemTime::now() + Duration::from_secs(5);
        fs::File::options()
            .write(true)
            .open(&file)
            .unwrap()
            .set_modified(later)
            .unwrap();

        assert_eq!(&*cache.load(&file).unwrap(), "new");
    }

    #[test]
    fn invalidation_forces_reload() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("button.html");
        fs::write(&file, "content").unwrap();

        let cache = TemplateCache::new();
        cache.load(&file).unwrap();

        assert!(cache.invalidate(&file));
        assert!(!cache.contains(&file));
        assert!(!cache.invalidate(&file));
    }

    #[test]
    fn shared_between_threads() {
        let temp = tempdir().unwrap();
        let files: Vec<_> = (0..4)
            .map(|i| {
                let file = temp.path().join(format!("variant-{}.html", i));
                fs::write(&file, format!("<p>{}</p>", i)).unwrap();
                file
            })
            .collect();

        let cache = Arc::new(TemplateCache::new());
        let handles: Vec<_> = files
            .iter()
            .cloned()
            .map(|file| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        cache.load(&file).unwrap();
                    }
                    cache.invalidate(&file);
                    cache.load(&file).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(&*handle.join().unwrap(), format!("<p>{}</p>", i));
        }
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let cache = TemplateCache::new();

        assert!(cache.load(Path::new("/does/not/exist.html")).is_err());
        assert!(cache.is_empty());
    }
}
