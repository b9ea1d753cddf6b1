//! Segment → XPath predicate translation
//!
//! Owns the selector semantics: how ids, classes, attribute operators and
//! pseudo-classes map onto XPath 1.0 boolean expressions.

use super::compiler::{compile_union_anchored, Anchor, CaseFolding, CompilerOptions};
use super::nth::Nth;
use super::scanner::{split_top_level, unquote};
use super::segment::{AttributeOp, AttributeTest, Pseudo, Segment};
use crate::error::{Error, Result};

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Node test and predicates for one location step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub tag: String,
    pub predicates: Vec<String>,
}

impl Step {
    /// Render the step body (without the axis prefix)
    pub fn render(&self) -> String {
        match self.predicates.as_slice() {
            [] => self.tag.clone(),
            [only] => format!("{}[{}]", self.tag, only),
            many => format!("{}[({})]", self.tag, many.join(") and (")),
        }
    }
}

/// Translate a parsed segment into a location step
pub fn translate_segment(segment: &Segment, options: &CompilerOptions, source: &str) -> Result<Step> {
    let mut tag = segment.tag.clone().unwrap_or_else(|| "*".to_string());
    let mut predicates = Vec::new();

    if let Some(id) = &segment.id {
        predicates.push(format!("@id={}", literal(id)));
    }

    for class in &segment.classes {
        predicates.push(token_test("@class", class));
    }

    for attribute in &segment.attributes {
        predicates.push(translate_attribute(attribute));
    }

    if let Some(pseudo) = &segment.pseudo {
        predicates.push(translate_pseudo(pseudo, &mut tag, options, source)?);
    }

    if predicates.is_empty() && segment.tag.is_none() {
        return Err(Error::malformed(
            source,
            "segment must contain a tag name or at least one constraint",
        ));
    }

    Ok(Step { tag, predicates })
}

/// Translate one attribute test
pub fn translate_attribute(test: &AttributeTest) -> String {
    let name = &test.name;
    let value = test.value.as_deref();

    match (test.op, value) {
        (AttributeOp::Plain, None) => format!("@{name}"),
        (AttributeOp::Plain, Some(v)) => format!("@{name}={}", literal(v)),
        (AttributeOp::NamePrefix, None) => {
            format!("@*[starts-with(name(), {})]", literal(name))
        }
        (AttributeOp::NamePrefix, Some(v)) => format!(
            "@*[starts-with(name(), {})]={}",
            literal(name),
            literal(v)
        ),
        (AttributeOp::Absent, _) => format!("not(@{name})"),
        (AttributeOp::StartsWith, v) => {
            format!("starts-with(@{name}, {})", literal(v.unwrap_or_default()))
        }
        (AttributeOp::EndsWith, v) => {
            format!("ends-with(@{name}, {})", literal(v.unwrap_or_default()))
        }
        (AttributeOp::Contains, v) => {
            format!("contains(@{name}, {})", literal(v.unwrap_or_default()))
        }
        (AttributeOp::NotEquals, v) => {
            format!("not(@{name}={})", literal(v.unwrap_or_default()))
        }
        (AttributeOp::Includes, v) => token_test(&format!("@{name}"), v.unwrap_or_default()),
    }
}

/// Translate a pseudo-class. `tag` may be rewritten to `*`.
fn translate_pseudo(
    pseudo: &Pseudo,
    tag: &mut String,
    options: &CompilerOptions,
    source: &str,
) -> Result<String> {
    let name = pseudo.name.as_str();

    match name {
        "first-child" => Ok("position() = 1".to_string()),
        "last-child" => Ok("position() = last()".to_string()),
        "empty" => Ok("count(descendant::*) = 0".to_string()),
        "not-empty" => Ok("count(descendant::*) > 0".to_string()),
        "nth-child" => {
            let position = nth(pseudo, source)?;
            let predicate = if tag.as_str() == "*" {
                position
            } else {
                format!("(name()={}) and ({})", literal(tag), position)
            };
            *tag = "*".to_string();
            Ok(predicate)
        }
        "nth-of-type" => nth(pseudo, source),
        "contains" => {
            let args = required_args(pseudo, source)?;
            let parts = split_top_level(args, b',')
                .ok_or_else(|| Error::malformed(source, "unterminated quote in :contains()"))?;
            let text = unquote(parts[0].trim());
            let case_sensitive = parts.get(1).is_some_and(|flag| flag.trim() == "true");
            Ok(text_equals(text, case_sensitive, options.case_folding))
        }
        "has" => {
            let inner = required_args(pseudo, source)?;
            let clauses = compile_union_anchored(inner, Anchor::Relative, options)?;
            Ok(clauses.join(" | "))
        }
        "not" => {
            let inner = required_args(pseudo, source)?;
            let clauses = compile_union_anchored(inner, Anchor::SelfTest, options)?;
            Ok(clauses
                .iter()
                .map(|clause| format!("not(self::{clause})"))
                .collect::<Vec<_>>()
                .join(" and "))
        }
        _ => Err(Error::unsupported(name)),
    }
}

fn required_args<'p>(pseudo: &'p Pseudo, source: &str) -> Result<&'p str> {
    match pseudo.args.as_deref() {
        Some(args) if !args.is_empty() => Ok(args),
        _ => Err(Error::malformed(
            source,
            format!(":{}() requires an argument", pseudo.name),
        )),
    }
}

fn nth(pseudo: &Pseudo, source: &str) -> Result<String> {
    let args = required_args(pseudo, source)?;
    Nth::parse(args)
        .map(Nth::to_predicate)
        .ok_or_else(|| Error::malformed(source, format!("invalid An+B expression {args:?}")))
}

/// Equality against the element's text, optionally case-folded.
///
/// The case-sensitive form compares direct text children (`text()`), the
/// folded forms compare the full string value (`.`), so `<p><b>Foo</b></p>`
/// only matches the folded form.
fn text_equals(text: &str, case_sensitive: bool, folding: CaseFolding) -> String {
    if case_sensitive {
        return format!("text() = {}", literal(text));
    }
    match folding {
        CaseFolding::LowerCase => {
            format!("lower-case(.) = lower-case({})", literal(text))
        }
        CaseFolding::Ascii => format!(
            "translate(., \"{UPPER}\", \"{LOWER}\") = {}",
            literal(&text.to_ascii_lowercase())
        ),
    }
}

/// Whitespace-separated token membership, as used by `.class` and `~=`
fn token_test(attribute: &str, token: &str) -> String {
    format!(
        "contains(concat(\" \", normalize-space({attribute}), \" \"), {})",
        literal(&format!(" {token} "))
    )
}

/// Quote `value` as an XPath string literal
pub fn literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{value}\"")
    } else if !value.contains('\'') {
        format!("'{value}'")
    } else {
        let parts: Vec<String> = value.split('"').map(|part| format!("\"{part}\"")).collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
