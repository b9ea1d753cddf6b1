//! ResourceArc Wrappers
//!
//! Selector caches handed to the BEAM as opaque references.

use std::sync::Arc;

use rustler::ResourceArc;

use crate::cache::SelectorCache;
use crate::selector::CompilerOptions;

/// A private selector cache owned by an Elixir process
pub struct CacheResource {
    pub cache: Arc<SelectorCache>,
}

impl CacheResource {
    pub fn new(options: CompilerOptions) -> Self {
        CacheResource {
            cache: Arc::new(SelectorCache::new(options)),
        }
    }
}

#[rustler::resource_impl]
impl rustler::Resource for CacheResource {}

impl Default for CacheResource {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

/// Type alias for the ResourceArc
pub type CacheRef = ResourceArc<CacheResource>;

/// The cache behind `cache_ref`, or the process-wide cache for `nil`
pub fn resolve(cache_ref: Option<&CacheRef>) -> Arc<SelectorCache> {
    match cache_ref {
        Some(resource) => Arc::clone(&resource.cache),
        None => SelectorCache::global(),
    }
}
