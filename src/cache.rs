use crate::graph::StreetNetwork;
use crate::network::NetworkType;

use lazy_static::lazy_static;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const GRAPH_CACHE_SIZE: usize = 16;

lazy_static! {
    static ref GRAPH_CACHE: Mutex<LruCache<String, StreetNetwork>> = {
        let cache_size = NonZeroUsize::new(GRAPH_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Mutex::new(LruCache::new(cache_size))
    };
}

// A panic while holding the lock leaves the cache itself intact.
fn lock_cache() -> MutexGuard<'static, LruCache<String, StreetNetwork>> {
    GRAPH_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn cache_key(osm_file: &Path, network_type: NetworkType, retain_all: bool) -> String {
    format!("{}|{}|{}", osm_file.display(), network_type, retain_all)
}

pub fn check_cache(key: &str) -> Option<StreetNetwork> {
    lock_cache().get(key).cloned()
}

pub fn insert_into_cache(key: String, graph: StreetNetwork) {
    lock_cache().put(key, graph);
}
