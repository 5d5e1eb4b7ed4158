pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreKind};
use crate::core::store::RateStore;
use disk::DiskRateStore;
use memory::MemoryRateStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Opens the store selected in `config`.
///
/// A disk store that cannot be opened degrades to an in-memory one so the app
/// still works, just without persistence.
pub fn open(config: &AppConfig) -> Arc<dyn RateStore> {
    match config.store {
        StoreKind::Memory => {
            debug!("Using in-memory rate store");
            Arc::new(MemoryRateStore::new())
        }
        StoreKind::Disk => {
            let opened = config
                .data_path()
                .map_err(|e| e.to_string())
                .and_then(|path| {
                    DiskRateStore::open(&path.join("cache")).map_err(|e| e.to_string())
                });
            match opened {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!("Falling back to in-memory rate store: {}", e);
                    Arc::new(MemoryRateStore::new())
                }
            }
        }
    }
}
