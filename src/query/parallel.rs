//! Parallel Selector Compilation and Evaluation
//!
//! Uses Rayon to compile or run many selectors at once. All workers share one
//! cache, so clauses common to several selectors are compiled only once.

use rayon::prelude::*;

use super::{Query, QueryType, XPathProvider};
use crate::cache::SelectorCache;
use crate::error::Result;
use crate::selector::CompiledSelector;

/// Compile `selectors` in parallel, populating `cache`
pub fn warm(cache: &SelectorCache, selectors: &[&str]) -> Vec<Result<CompiledSelector>> {
    selectors
        .par_iter()
        .map(|selector| cache.compile(selector))
        .collect()
}

/// Evaluate multiple CSS selectors in parallel
pub fn find_parallel<P>(
    query: &Query<'_, P>,
    selectors: &[&str],
    context: Option<&P::Node>,
) -> Vec<Result<Vec<P::Node>>>
where
    P: XPathProvider + Sync,
    P::Node: Send + Sync,
{
    selectors
        .par_iter()
        .map(|selector| query.find_nodes(selector, QueryType::Css, context))
        .collect()
}

/// Evaluate keyed selectors in parallel, failing on the first error
pub fn find_keyed<P>(
    query: &Query<'_, P>,
    selectors: &[(&str, &str)], // (key, selector)
    context: Option<&P::Node>,
) -> Result<Vec<(String, Vec<P::Node>)>>
where
    P: XPathProvider + Sync,
    P::Node: Send + Sync,
{
    selectors
        .par_iter()
        .map(|(key, selector)| {
            query
                .find_nodes(selector, QueryType::Css, context)
                .map(|nodes| (key.to_string(), nodes))
        })
        .collect()
}
