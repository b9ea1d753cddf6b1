//! Query Execution
//!
//! Runs compiled selectors against an external tree/XPath engine. The engine
//! is reached through [`XPathProvider`]; this module only decides which
//! expression to send and how to classify what comes back.

pub mod parallel;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod semantics;

use std::error::Error as StdError;
use std::sync::Arc;

use log::debug;

use crate::cache::SelectorCache;
use crate::error::{Error, Result};

/// Kind of a node returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Attribute,
    /// Anything else, named by the provider
    Other(String),
}

/// Access to a tree and its XPath engine
pub trait XPathProvider {
    /// Node handle
    type Node: Clone + PartialEq;
    /// Host wrapper for element nodes
    type Element;
    type Error: StdError + Send + Sync + 'static;

    /// Evaluate `xpath` from `context` (the document root when `None`) and
    /// return the resulting node-set in document order
    fn evaluate(
        &self,
        xpath: &str,
        context: Option<&Self::Node>,
    ) -> std::result::Result<Vec<Self::Node>, Self::Error>;

    fn node_kind(&self, node: &Self::Node) -> NodeKind;

    /// String value of a text or attribute node
    fn string_value(&self, node: &Self::Node) -> String;

    /// Wrap an element node
    fn wrap(&self, node: Self::Node) -> Self::Element;
}

/// Dialect of a query expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    #[default]
    Css,
    XPath,
}

/// A classified query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match<E> {
    Element(E),
    Text(String),
    Attribute(String),
}

impl<E> Match<E> {
    pub fn as_element(&self) -> Option<&E> {
        match self {
            Match::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn into_element(self) -> Option<E> {
        match self {
            Match::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text content or attribute value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Match::Text(value) | Match::Attribute(value) => Some(value),
            Match::Element(_) => None,
        }
    }
}

/// A query session over one provider
///
/// Owns the selector cache it compiles through; the process-wide cache is
/// used unless another one is injected with [`Query::with_cache`].
pub struct Query<'p, P: XPathProvider> {
    provider: &'p P,
    cache: Arc<SelectorCache>,
}

impl<'p, P: XPathProvider> Query<'p, P> {
    pub fn new(provider: &'p P) -> Self {
        Query {
            provider,
            cache: SelectorCache::global(),
        }
    }

    /// Use `cache` instead of the process-wide cache
    pub fn with_cache(mut self, cache: Arc<SelectorCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<SelectorCache> {
        &self.cache
    }

    pub fn provider(&self) -> &'p P {
        self.provider
    }

    /// The expression that will be sent to the provider.
    ///
    /// CSS is compiled through the cache; when `relative` is set every clause
    /// of the union is rooted at the context node. XPath passes through.
    pub fn expression(&self, expression: &str, query_type: QueryType, relative: bool) -> Result<String> {
        match query_type {
            QueryType::XPath => Ok(expression.to_string()),
            QueryType::Css => {
                let compiled = self.cache.compile(expression)?;
                Ok(if relative {
                    compiled.to_relative_xpath()
                } else {
                    compiled.to_xpath()
                })
            }
        }
    }

    /// Evaluate and return the raw node handles
    pub fn find_nodes(
        &self,
        expression: &str,
        query_type: QueryType,
        context: Option<&P::Node>,
    ) -> Result<Vec<P::Node>> {
        let xpath = self.expression(expression, query_type, context.is_some())?;
        self.evaluate(&xpath, context)
    }

    /// Evaluate and classify every result
    pub fn find(
        &self,
        expression: &str,
        query_type: QueryType,
        context: Option<&P::Node>,
    ) -> Result<Vec<Match<P::Element>>> {
        self.find_nodes(expression, query_type, context)?
            .into_iter()
            .map(|node| self.classify(node))
            .collect()
    }

    /// The result at `index`, if there are that many
    pub fn find_index(
        &self,
        expression: &str,
        index: usize,
        query_type: QueryType,
        context: Option<&P::Node>,
    ) -> Result<Option<Match<P::Element>>> {
        let node = self
            .find_nodes(expression, query_type, context)?
            .into_iter()
            .nth(index);
        node.map(|node| self.classify(node)).transpose()
    }

    /// The first result in document order, evaluated as `(expr)[1]`
    pub fn first(
        &self,
        expression: &str,
        query_type: QueryType,
        context: Option<&P::Node>,
    ) -> Result<Option<Match<P::Element>>> {
        let xpath = self.expression(expression, query_type, context.is_some())?;
        let node = self
            .evaluate(&format!("({xpath})[1]"), context)?
            .into_iter()
            .next();
        node.map(|node| self.classify(node)).transpose()
    }

    pub fn has(
        &self,
        expression: &str,
        query_type: QueryType,
        context: Option<&P::Node>,
    ) -> Result<bool> {
        Ok(!self.find_nodes(expression, query_type, context)?.is_empty())
    }

    pub fn count(
        &self,
        expression: &str,
        query_type: QueryType,
        context: Option<&P::Node>,
    ) -> Result<usize> {
        Ok(self.find_nodes(expression, query_type, context)?.len())
    }

    /// Raw XPath query
    pub fn xpath(&self, expression: &str, context: Option<&P::Node>) -> Result<Vec<Match<P::Element>>> {
        self.find(expression, QueryType::XPath, context)
    }

    /// Whether `node` is selected by `selector` evaluated over the whole
    /// document
    pub fn matches(&self, node: &P::Node, selector: &str) -> Result<bool> {
        Ok(self
            .find_nodes(selector, QueryType::Css, None)?
            .iter()
            .any(|candidate| candidate == node))
    }

    /// Nearest ancestor of `node` matched by `selector`
    pub fn closest(&self, node: &P::Node, selector: &str) -> Result<Option<P::Node>> {
        let matched = self.find_nodes(selector, QueryType::Css, None)?;
        if matched.is_empty() {
            return Ok(None);
        }
        let ancestors = self.evaluate("ancestor::*", Some(node))?;
        Ok(ancestors
            .into_iter()
            .rev()
            .find(|ancestor| matched.contains(ancestor)))
    }

    /// Map a node to its result form by kind
    pub fn classify(&self, node: P::Node) -> Result<Match<P::Element>> {
        match self.provider.node_kind(&node) {
            NodeKind::Element => Ok(Match::Element(self.provider.wrap(node))),
            NodeKind::Text => Ok(Match::Text(self.provider.string_value(&node))),
            NodeKind::Attribute => Ok(Match::Attribute(self.provider.string_value(&node))),
            NodeKind::Other(kind) => Err(Error::UnknownNodeKind { kind }),
        }
    }

    fn evaluate(&self, xpath: &str, context: Option<&P::Node>) -> Result<Vec<P::Node>> {
        debug!("evaluating {xpath}");
        self.provider.evaluate(xpath, context).map_err(Error::provider)
    }
}
