use ahash::AHashMap;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Produces an icon for an application path, typically an encoded image
/// such as a `data:` URL. Extraction is platform specific and lives in the
/// host.
pub trait IconProvider: Send + Sync {
    fn icon_for(&self, path: &Path) -> Option<String>;
}

/// Provider for hosts without icon support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIcons;

impl IconProvider for NoIcons {
    fn icon_for(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// Memoizes an [`IconProvider`]. Misses are cached as well so a path that
/// has no icon is only asked for once.
pub struct IconCache {
    provider: Arc<dyn IconProvider>,
    icons: RwLock<AHashMap<String, Option<String>>>,
}

impl std::fmt::Debug for IconCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconCache")
            .field("cached", &self.icons.read().len())
            .finish()
    }
}

impl IconCache {
    pub fn new(provider: Arc<dyn IconProvider>) -> Self {
        Self {
            provider,
            icons: RwLock::new(AHashMap::new()),
        }
    }

    /// Returns the icon for `path`, or an empty string when none exists.
    pub fn get(&self, path: &str) -> String {
        if let Some(cached) = self.icons.read().get(path) {
            return cached.clone().unwrap_or_default();
        }

        let icon = self.provider.icon_for(Path::new(path));
        let mut icons = self.icons.write();
        icons
            .entry(path.to_string())
            .or_insert(icon)
            .clone()
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.icons.write().clear();
    }

    pub fn len(&self) -> usize {
        self.icons.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl IconProvider for CountingProvider {
        fn icon_for(&self, path: &Path) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            path.extension()
                .is_some_and(|ext| ext == "exe")
                .then(|| format!("icon:{}", path.display()))
        }
    }

    #[test]
    fn hits_and_misses_are_memoized() {
        let provider = Arc::new(CountingProvider::default());
        let cache = IconCache::new(provider.clone());

        assert_eq!(cache.get("C:/apps/app.exe"), "icon:C:/apps/app.exe");
        assert_eq!(cache.get("C:/apps/app.exe"), "icon:C:/apps/app.exe");
        assert_eq!(cache.get("C:/apps/readme.txt"), "");
        assert_eq!(cache.get("C:/apps/readme.txt"), "");

        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        cache.get("C:/apps/app.exe");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn no_icons_yields_empty() {
        let cache = IconCache::new(Arc::new(NoIcons));
        assert_eq!(cache.get("/usr/bin/vim"), "");
    }
}
