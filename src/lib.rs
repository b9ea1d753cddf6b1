//! RustySelect - CSS selectors compiled to XPath 1.0
//!
//! Layers:
//! A: Selector compiler (segments, predicates, chains, unions)
//! B: Shared compilation cache
//! C: Query execution against an external XPath provider
//! D: Parallel warm-up and batch queries
//!
//! The crate is usable as a plain Rust library and is also loaded by the BEAM
//! as `Elixir.RustySelect.Native`.

use rustler::{Atom, Env, NifResult, Term};

pub mod cache;
pub mod error;
pub mod query;
pub mod selector;

mod resource;
mod term;

pub use cache::{CacheStats, SelectorCache};
pub use error::{Error, Result};
pub use query::template::ElementTemplate;
pub use query::{Match, NodeKind, Query, QueryType, XPathProvider};
pub use selector::{compile, CaseFolding, CompiledSelector, CompilerOptions};

use resource::{CacheRef, CacheResource};
use term::{stats_to_term, xpath_result_to_term, xpath_results_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Compilation (process-wide cache)
// ============================================================================

/// Compile a selector to a document-rooted XPath
/// Returns {:ok, xpath} or {:error, {kind, message}}
#[rustler::nif(name = "compile")]
fn compile_selector<'a>(env: Env<'a>, selector: &str) -> NifResult<Term<'a>> {
    let result = SelectorCache::global()
        .compile(selector)
        .map(|compiled| compiled.to_xpath());
    xpath_result_to_term(env, result)
}

/// Compile a selector to an XPath rooted at a context node
#[rustler::nif]
fn compile_relative<'a>(env: Env<'a>, selector: &str) -> NifResult<Term<'a>> {
    let result = SelectorCache::global()
        .compile(selector)
        .map(|compiled| compiled.to_relative_xpath());
    xpath_result_to_term(env, result)
}

/// Compile many selectors at once, filling the process-wide cache
#[rustler::nif(schedule = "DirtyCpu")]
fn compile_parallel<'a>(env: Env<'a>, selectors: Vec<&str>) -> NifResult<Term<'a>> {
    let cache = SelectorCache::global();
    let results = query::parallel::warm(&cache, &selectors)
        .into_iter()
        .map(|result| result.map(|compiled| compiled.to_xpath()))
        .collect();
    xpath_results_to_term(env, results)
}

// ============================================================================
// Cache Management
// ============================================================================

/// Create a private cache (returns ResourceArc)
/// `ascii_folding` selects `translate()` instead of `lower-case()`
#[rustler::nif]
fn cache_new(ascii_folding: bool) -> CacheRef {
    let case_folding = if ascii_folding {
        CaseFolding::Ascii
    } else {
        CaseFolding::LowerCase
    };
    CacheRef::new(CacheResource::new(CompilerOptions { case_folding }))
}

#[rustler::nif]
fn cache_compile<'a>(env: Env<'a>, cache_ref: CacheRef, selector: &str) -> NifResult<Term<'a>> {
    let result = cache_ref
        .cache
        .compile(selector)
        .map(|compiled| compiled.to_xpath());
    xpath_result_to_term(env, result)
}

/// All `{clause, xpath}` entries; `nil` means the process-wide cache
#[rustler::nif]
fn cache_entries(cache_ref: Option<CacheRef>) -> Vec<(String, String)> {
    resource::resolve(cache_ref.as_ref()).entries()
}

/// Replace the cache content with previously dumped entries
/// Returns the number of entries now cached
#[rustler::nif]
fn cache_load(cache_ref: Option<CacheRef>, entries: Vec<(String, String)>) -> usize {
    let cache = resource::resolve(cache_ref.as_ref());
    cache.replace(entries);
    cache.len()
}

#[rustler::nif]
fn cache_clear(cache_ref: Option<CacheRef>) -> Atom {
    resource::resolve(cache_ref.as_ref()).clear();
    term::ok()
}

#[rustler::nif]
fn cache_stats<'a>(env: Env<'a>, cache_ref: Option<CacheRef>) -> NifResult<Term<'a>> {
    stats_to_term(env, resource::resolve(cache_ref.as_ref()).stats())
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.RustySelect.Native");
