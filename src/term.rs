//! Elixir Term Conversion Utilities
//!
//! Converts compilation results, errors and cache statistics to Elixir terms.

use rustler::{Atom, Encoder, Env, NifResult, Term};

use crate::cache::CacheStats;
use crate::error::{Error, Result};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    hits,
    misses,
    entries,
    hit_ratio,
}

/// `{:error, {kind, message}}`, the kind atom named by [`Error::kind`]
pub fn error_to_term<'a>(env: Env<'a>, err: &Error) -> NifResult<Term<'a>> {
    let kind = Atom::from_str(env, err.kind())?;
    Ok((error(), (kind, err.to_string())).encode(env))
}

/// `{:ok, xpath}` or `{:error, {kind, message}}`
pub fn xpath_result_to_term<'a>(env: Env<'a>, result: Result<String>) -> NifResult<Term<'a>> {
    match result {
        Ok(xpath) => Ok((ok(), xpath).encode(env)),
        Err(err) => error_to_term(env, &err),
    }
}

/// Encode a list of results, keeping input order
pub fn xpath_results_to_term<'a>(env: Env<'a>, results: Vec<Result<String>>) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);
    for result in results.into_iter().rev() {
        list = list.list_prepend(xpath_result_to_term(env, result)?);
    }
    Ok(list)
}

/// `%{hits: _, misses: _, entries: _, hit_ratio: _}`
pub fn stats_to_term<'a>(env: Env<'a>, stats: CacheStats) -> NifResult<Term<'a>> {
    Term::map_new(env)
        .map_put(hits(), stats.hits)?
        .map_put(misses(), stats.misses)?
        .map_put(entries(), stats.entries)?
        .map_put(hit_ratio(), stats.hit_ratio())
}
