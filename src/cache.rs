//! Compiled Selector Cache
//!
//! Maps clause text to its compiled XPath. Entries are published once and
//! never changed afterwards; nothing is evicted unless the cache is cleared or
//! replaced. Reads take the shared lock and use `peek`, so concurrent lookups
//! never reorder the underlying LRU list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace, warn};
use lru::LruCache;

use crate::error::Result;
use crate::selector::{compiler, CompiledSelector, CompilerOptions};

static GLOBAL: OnceLock<Arc<SelectorCache>> = OnceLock::new();

/// Hit/miss counters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe selector compilation cache
#[derive(Debug)]
pub struct SelectorCache {
    options: CompilerOptions,
    entries: RwLock<LruCache<String, Arc<str>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SelectorCache {
    /// Create an empty cache compiling with `options`
    pub fn new(options: CompilerOptions) -> Self {
        SelectorCache {
            options,
            entries: RwLock::new(LruCache::unbounded()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The process-wide cache, created on first use with default options
    pub fn global() -> Arc<SelectorCache> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SelectorCache::default())))
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a selector, serving each clause from the cache when possible
    pub fn compile(&self, selector: &str) -> Result<CompiledSelector> {
        let clauses = compiler::split_clauses(selector)?;
        let mut compiled = Vec::with_capacity(clauses.len());
        for clause in clauses {
            compiled.push(self.compile_clause(clause)?);
        }
        Ok(CompiledSelector::new(compiled))
    }

    /// Compile a single clause. The key is the clause text without
    /// surrounding whitespace; inner whitespace and case are significant.
    pub fn compile_clause(&self, clause: &str) -> Result<Arc<str>> {
        let clause = clause.trim();

        if let Some(hit) = self.read().peek(clause) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!("selector cache hit: {clause:?}");
            return Ok(Arc::clone(hit));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let xpath: Arc<str> = compiler::compile_clause(clause, &self.options)?.into();
        debug!("compiled selector {clause:?} -> {xpath}");

        let mut entries = self.write();
        if let Some(existing) = entries.peek(clause) {
            return Ok(Arc::clone(existing));
        }
        entries.put(clause.to_string(), Arc::clone(&xpath));
        Ok(xpath)
    }

    /// Look up a clause without compiling it
    pub fn get(&self, clause: &str) -> Option<Arc<str>> {
        self.read().peek(clause.trim()).cloned()
    }

    pub fn contains(&self, clause: &str) -> bool {
        self.read().peek(clause.trim()).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All entries as `(clause, xpath)`, sorted by clause
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .read()
            .iter()
            .map(|(clause, xpath)| (clause.clone(), xpath.to_string()))
            .collect();
        entries.sort_unstable();
        entries
    }

    /// Swap the whole cache content for `entries`
    pub fn replace<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut fresh = LruCache::unbounded();
        for (clause, xpath) in entries {
            fresh.put(clause, Arc::<str>::from(xpath));
        }
        debug!("selector cache replaced with {} entries", fresh.len());
        *self.write() = fresh;
    }

    /// Add `entries` without overwriting clauses that are already cached.
    /// Returns how many entries were inserted.
    pub fn extend<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut cache = self.write();
        let mut inserted = 0;
        for (clause, xpath) in entries {
            if cache.peek(clause.as_str()).is_none() {
                cache.put(clause, Arc::<str>::from(xpath));
                inserted += 1;
            }
        }
        debug!("selector cache extended with {inserted} entries");
        inserted
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.write().clear();
        debug!("selector cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    // Entries are immutable once published, so a poisoned lock still guards
    // a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, LruCache<String, Arc<str>>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("selector cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, LruCache<String, Arc<str>>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("selector cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for SelectorCache {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}
