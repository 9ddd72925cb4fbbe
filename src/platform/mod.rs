//! Platform surface: local key-value storage and display metrics
//!
//! A sheet never talks to a host directly; it asks its platform for the store
//! it persists into and for the metrics it sizes surfaces against. Tests and
//! the CLI plug in the in-process implementations below.

pub mod device;
pub mod storage;

pub use device::{DisplayMetrics, SharedDisplay, ViewportMetrics};
#[cfg(feature = "json-store")]
pub use storage::JsonFileStore;
pub use storage::{KeyValueStore, MemoryStore};

use std::sync::Arc;

pub trait PlatformApi: Send + Sync {
    fn storage(&self) -> Arc<dyn KeyValueStore>;
    fn display(&self) -> Arc<dyn DisplayMetrics>;
}

/// Platform assembled from a store and a display handle.
#[derive(Clone)]
pub struct LocalPlatform {
    storage: Arc<dyn KeyValueStore>,
    display: Arc<dyn DisplayMetrics>,
}

impl LocalPlatform {
    pub fn new(storage: Arc<dyn KeyValueStore>, display: Arc<dyn DisplayMetrics>) -> Self {
        LocalPlatform { storage, display }
    }

    /// Memory store and default metrics.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SharedDisplay::default()))
    }

    pub fn with_store(storage: Arc<dyn KeyValueStore>, metrics: ViewportMetrics) -> Self {
        Self::new(storage, Arc::new(SharedDisplay::new(metrics)))
    }
}

impl Default for LocalPlatform {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl PlatformApi for LocalPlatform {
    fn storage(&self) -> Arc<dyn KeyValueStore> {
        self.storage.clone()
    }

    fn display(&self) -> Arc<dyn DisplayMetrics> {
        self.display.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_platform_shares_its_handles() {
        let p = LocalPlatform::in_memory();
        p.storage().set("canvas0", "v").unwrap();
        assert_eq!(p.storage().get("canvas0").unwrap().as_deref(), Some("v"));

        p.display().set_metrics(ViewportMetrics {
            container_width: 800.0,
            device_pixel_ratio: 2.0,
            touch: false,
        });
        assert_eq!(p.display().metrics().container_width, 800.0);
    }
}
