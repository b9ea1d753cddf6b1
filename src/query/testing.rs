//! Test providers
//!
//! `MockProvider` answers canned expressions and records every call.
//! `SxdProvider` runs expressions on sxd-xpath, a real XPath 1.0 engine, with
//! `lower-case` and `ends-with` registered as extension functions.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use sxd_document::dom::Document;
use sxd_document::{parser, Package};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{context, function, Context, Factory, Value};

use super::{NodeKind, XPathProvider};

#[derive(Debug)]
pub struct ProviderError(pub String);

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ProviderError {}

// ============================================================================
// Canned provider
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum MockNode {
    Element(&'static str),
    Text(&'static str),
    Attribute(&'static str),
    Comment,
}

#[derive(Default)]
pub struct MockProvider {
    results: HashMap<String, Vec<MockNode>>,
    calls: Mutex<Vec<(String, bool)>>,
    fail: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result(mut self, xpath: &str, nodes: Vec<MockNode>) -> Self {
        self.results.insert(xpath.to_string(), nodes);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// `(xpath, had_context)` for every evaluation so far
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

impl XPathProvider for MockProvider {
    type Node = MockNode;
    type Element = String;
    type Error = ProviderError;

    fn evaluate(&self, xpath: &str, context: Option<&MockNode>) -> Result<Vec<MockNode>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((xpath.to_string(), context.is_some()));
        if self.fail {
            return Err(ProviderError("provider unavailable".to_string()));
        }
        Ok(self.results.get(xpath).cloned().unwrap_or_default())
    }

    fn node_kind(&self, node: &MockNode) -> NodeKind {
        match node {
            MockNode::Element(_) => NodeKind::Element,
            MockNode::Text(_) => NodeKind::Text,
            MockNode::Attribute(_) => NodeKind::Attribute,
            MockNode::Comment => NodeKind::Other("comment".to_string()),
        }
    }

    fn string_value(&self, node: &MockNode) -> String {
        match node {
            MockNode::Element(value) | MockNode::Text(value) | MockNode::Attribute(value) => {
                value.to_string()
            }
            MockNode::Comment => String::new(),
        }
    }

    fn wrap(&self, node: MockNode) -> String {
        self.string_value(&node)
    }
}

// ============================================================================
// sxd-xpath provider
// ============================================================================

pub fn parse(xml: &str) -> Package {
    parser::parse(xml).expect("test document must be well-formed")
}

/// Element as seen by tests: local name and string value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestElement {
    pub name: String,
    pub text: String,
}

struct LowerCase;

impl function::Function for LowerCase {
    fn evaluate<'c, 'd>(
        &self,
        _context: &context::Evaluation<'c, 'd>,
        args: Vec<Value<'d>>,
    ) -> Result<Value<'d>, function::Error> {
        let text = args.first().map(Value::string).unwrap_or_default();
        Ok(Value::String(text.to_lowercase()))
    }
}

struct EndsWith;

impl function::Function for EndsWith {
    fn evaluate<'c, 'd>(
        &self,
        _context: &context::Evaluation<'c, 'd>,
        args: Vec<Value<'d>>,
    ) -> Result<Value<'d>, function::Error> {
        let haystack = args.first().map(Value::string).unwrap_or_default();
        let needle = args.get(1).map(Value::string).unwrap_or_default();
        Ok(Value::Boolean(haystack.ends_with(&needle)))
    }
}

pub struct SxdProvider<'d> {
    document: Document<'d>,
    factory: Factory,
    context: Context<'d>,
}

impl<'d> SxdProvider<'d> {
    pub fn new(document: Document<'d>) -> Self {
        let mut context = Context::new();
        context.set_function("lower-case", LowerCase);
        context.set_function("ends-with", EndsWith);
        SxdProvider {
            document,
            factory: Factory::new(),
            context,
        }
    }
}

impl<'d> XPathProvider for SxdProvider<'d> {
    type Node = Node<'d>;
    type Element = TestElement;
    type Error = ProviderError;

    fn evaluate(&self, xpath: &str, context: Option<&Node<'d>>) -> Result<Vec<Node<'d>>, ProviderError> {
        let compiled = self
            .factory
            .build(xpath)
            .map_err(|err| ProviderError(format!("{xpath}: {err:?}")))?
            .ok_or_else(|| ProviderError(format!("{xpath}: empty expression")))?;
        let node: Node<'d> = match context {
            Some(node) => *node,
            None => self.document.root().into(),
        };
        match compiled
            .evaluate(&self.context, node)
            .map_err(|err| ProviderError(format!("{xpath}: {err:?}")))?
        {
            Value::Nodeset(nodes) => Ok(nodes.document_order()),
            other => Err(ProviderError(format!("{xpath}: not a node-set: {other:?}"))),
        }
    }

    fn node_kind(&self, node: &Node<'d>) -> NodeKind {
        match node {
            Node::Element(_) => NodeKind::Element,
            Node::Text(_) => NodeKind::Text,
            Node::Attribute(_) => NodeKind::Attribute,
            other => NodeKind::Other(format!("{other:?}")),
        }
    }

    fn string_value(&self, node: &Node<'d>) -> String {
        node.string_value()
    }

    fn wrap(&self, node: Node<'d>) -> TestElement {
        let name = match node {
            Node::Element(element) => element.name().local_part().to_string(),
            _ => String::new(),
        };
        TestElement {
            name,
            text: node.string_value(),
        }
    }
}
