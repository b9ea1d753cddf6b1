//! Error types
//!
//! Every failure in the crate is a synchronous return-time error. A selector
//! that fails to compile is never partially applied and never cached.

use std::error::Error as StdError;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Selector compilation and query errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Selector text that cannot be tokenized or translated
    #[error("malformed selector {selector:?}: {reason}")]
    MalformedSelector { selector: String, reason: String },

    /// Pseudo-class the compiler does not know
    #[error("unsupported pseudo-class {pseudo:?}")]
    UnsupportedSelector { pseudo: String },

    /// The provider returned a node that is not an element, text or attribute
    #[error("unknown node kind: {kind}")]
    UnknownNodeKind { kind: String },

    /// Failure reported by the XPath provider, passed through unchanged
    #[error("xpath provider error: {0}")]
    Provider(#[source] Box<dyn StdError + Send + Sync + 'static>),
}

impl Error {
    pub(crate) fn malformed(selector: &str, reason: impl Into<String>) -> Self {
        Error::MalformedSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(pseudo: &str) -> Self {
        Error::UnsupportedSelector {
            pseudo: pseudo.to_string(),
        }
    }

    pub(crate) fn provider<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Provider(Box::new(err))
    }

    /// Stable snake_case name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MalformedSelector { .. } => "malformed_selector",
            Error::UnsupportedSelector { .. } => "unsupported_selector",
            Error::UnknownNodeKind { .. } => "unknown_node_kind",
            Error::Provider(_) => "provider_error",
        }
    }
}
