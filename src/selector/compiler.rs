//! Selector Chain Compiler
//!
//! Compiles a selector into XPath location paths: one path per clause of a
//! comma-separated union, each built from the translated segments of the
//! clause and an optional `::text` / `::attr(...)` property step.

use std::fmt;
use std::sync::Arc;

use super::scanner::{rfind_top_level, split_top_level, unquote, Scanner};
use super::segment::{parse_segment, Combinator};
use super::translate::{literal, translate_segment};
use crate::error::{Error, Result};

/// How the case-insensitive `:contains()` folds case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaseFolding {
    /// `lower-case()`: Unicode-aware, needs XPath 2.0 or a registered
    /// extension function
    #[default]
    LowerCase,
    /// `translate()` over A-Z, works on any XPath 1.0 engine
    Ascii,
}

/// Compiler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompilerOptions {
    pub case_folding: CaseFolding,
}

/// Where the first step of a compiled clause is rooted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `//a`, `/a`
    Document,
    /// `.//a`, `./a` (used inside `:has()`)
    Relative,
    /// `a` (used inside `:not()` as `self::a`)
    SelfTest,
}

impl Anchor {
    fn descendant(self) -> &'static str {
        match self {
            Anchor::Document => "//",
            Anchor::Relative => ".//",
            Anchor::SelfTest => "",
        }
    }

    fn child(self) -> &'static str {
        match self {
            Anchor::Document => "/",
            Anchor::Relative => "./",
            Anchor::SelfTest => "",
        }
    }
}

/// A compiled selector: one XPath path per clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSelector {
    clauses: Vec<Arc<str>>,
}

impl CompiledSelector {
    pub(crate) fn new(clauses: Vec<Arc<str>>) -> Self {
        CompiledSelector { clauses }
    }

    /// Compiled clauses in selector order
    pub fn clauses(&self) -> &[Arc<str>] {
        &self.clauses
    }

    /// Union of all clauses, rooted at the document
    pub fn to_xpath(&self) -> String {
        self.clauses.join("|")
    }

    /// Union of all clauses, each rooted at the context node
    pub fn to_relative_xpath(&self) -> String {
        self.clauses
            .iter()
            .map(|clause| format!(".{clause}"))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for CompiledSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// Compile a selector without going through a cache
pub fn compile(selector: &str, options: &CompilerOptions) -> Result<CompiledSelector> {
    let clauses = compile_union_anchored(selector, Anchor::Document, options)?;
    Ok(CompiledSelector::new(
        clauses.into_iter().map(Arc::<str>::from).collect(),
    ))
}

/// Split a selector into trimmed clauses on top-level commas
pub fn split_clauses(selector: &str) -> Result<Vec<&str>> {
    let parts = split_top_level(selector, b',')
        .ok_or_else(|| Error::malformed(selector, "unterminated quote"))?;
    let clauses: Vec<&str> = parts.into_iter().map(str::trim).collect();
    if clauses.iter().any(|clause| clause.is_empty()) {
        return Err(Error::malformed(selector, "selector must not be empty"));
    }
    Ok(clauses)
}

/// Compile every clause of `selector` against `anchor`
pub(crate) fn compile_union_anchored(
    selector: &str,
    anchor: Anchor,
    options: &CompilerOptions,
) -> Result<Vec<String>> {
    split_clauses(selector)?
        .into_iter()
        .map(|clause| compile_clause_anchored(clause, anchor, options))
        .collect()
}

/// Compile a single clause rooted at the document
pub fn compile_clause(clause: &str, options: &CompilerOptions) -> Result<String> {
    compile_clause_anchored(clause, Anchor::Document, options)
}

pub(crate) fn compile_clause_anchored(
    clause: &str,
    anchor: Anchor,
    options: &CompilerOptions,
) -> Result<String> {
    let source = clause.trim();
    if source.is_empty() {
        return Err(Error::malformed(clause, "selector must not be empty"));
    }

    let (body, property) = match rfind_top_level(source, "::") {
        Some(at) => (&source[..at], Some(property_step(&source[at + 2..], source)?)),
        None => (source, None),
    };

    let mut body = body.trim();
    let mut prefix = anchor.descendant();
    if let Some(rest) = body.strip_prefix('>') {
        prefix = anchor.child();
        body = rest.trim_start();
    }
    if body.is_empty() {
        return Err(Error::malformed(source, "expected a segment"));
    }

    let mut xpath = String::with_capacity(body.len() * 4);
    let mut pos = 0;
    let mut trailing = Combinator::Descendant;

    while pos < body.len() {
        let (segment, consumed) = parse_segment(body, pos, source)?;
        let step = translate_segment(&segment, options, source)?;

        xpath.push_str(prefix);
        xpath.push_str(&step.render());

        prefix = match segment.combinator {
            Combinator::Child => "/",
            Combinator::Descendant => "//",
        };
        trailing = segment.combinator;
        pos += consumed;
    }

    if trailing == Combinator::Child {
        return Err(Error::malformed(source, "'>' must be followed by a segment"));
    }

    if let Some(property) = property {
        xpath.push('/');
        xpath.push_str(&property);
    }

    Ok(xpath)
}

/// Translate the text after `::` into a final location step
fn property_step(text: &str, source: &str) -> Result<String> {
    let mut scanner = Scanner::new(text.trim());
    let name = scanner
        .read_name()
        .ok_or_else(|| Error::malformed(source, "property name must not be empty"))?;
    let args = if scanner.eat(b'(') {
        Some(
            scanner
                .read_parenthesized()
                .ok_or_else(|| Error::malformed(source, "unterminated '('"))?,
        )
    } else {
        None
    };
    if !scanner.is_eof() {
        return Err(Error::malformed(
            source,
            format!("unexpected text after ::{name}"),
        ));
    }

    match (name, args) {
        ("text", None) => Ok("text()".to_string()),
        ("attr", Some(args)) => {
            let tests: Vec<String> = args
                .split('|')
                .map(|attr| unquote(attr.trim()))
                .filter(|attr| !attr.is_empty())
                .map(|attr| format!("name() = {}", literal(attr)))
                .collect();
            if tests.is_empty() {
                return Err(Error::malformed(source, "::attr() requires attribute names"));
            }
            Ok(format!("@*[{}]", tests.join(" or ")))
        }
        ("text", Some(_)) => Err(Error::malformed(source, "::text takes no arguments")),
        ("attr", None) => Err(Error::malformed(source, "::attr() requires attribute names")),
        (other, _) => Err(Error::malformed(
            source,
            format!("unknown property ::{other}"),
        )),
    }
}
