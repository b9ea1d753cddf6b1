//! Selector semantics checked on a real XPath engine

use std::sync::Arc;

use sxd_document::Package;
use sxd_xpath::nodeset::Node;

use super::testing::{parse, SxdProvider, TestElement};
use super::{Match, Query, QueryType};
use crate::cache::SelectorCache;
use crate::error::Error;
use crate::selector::{CaseFolding, CompilerOptions};

struct Fixture {
    package: Package,
}

impl Fixture {
    fn new(xml: &str) -> Self {
        Fixture { package: parse(xml) }
    }

    fn texts(&self, selector: &str) -> Vec<String> {
        self.texts_with(selector, CompilerOptions::default())
    }

    fn texts_with(&self, selector: &str, options: CompilerOptions) -> Vec<String> {
        let provider = SxdProvider::new(self.package.as_document());
        let query = Query::new(&provider).with_cache(Arc::new(SelectorCache::new(options)));
        query
            .find(selector, QueryType::Css, None)
            .unwrap()
            .into_iter()
            .map(|found| match found {
                Match::Element(TestElement { text, .. }) => text,
                Match::Text(text) | Match::Attribute(text) => text,
            })
            .collect()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

const LIST: &str = "<root><ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul>\
                    <ol><li>a</li><li>b</li></ol></root>";

#[test]
fn test_nth_child_odd_equals_2n_plus_1() {
    let doc = Fixture::new(LIST);
    assert_eq!(doc.texts("ul > li:nth-child(odd)"), strings(&["1", "3", "5"]));
    assert_eq!(doc.texts("ul > li:nth-child(2n+1)"), strings(&["1", "3", "5"]));
    assert_eq!(doc.texts("li:nth-child(odd)"), strings(&["1", "3", "5", "a"]));
}

#[test]
fn test_nth_child_formulas() {
    let doc = Fixture::new(LIST);
    assert_eq!(doc.texts("ul > li:nth-child(even)"), strings(&["2", "4"]));
    assert_eq!(doc.texts("ul > li:nth-child(3n-2)"), strings(&["1", "4"]));
    assert_eq!(doc.texts("ul > li:nth-child(n+4)"), strings(&["4", "5"]));
    assert_eq!(doc.texts("ul > li:nth-child(-n+2)"), strings(&["1", "2"]));
}

#[test]
fn test_nth_child_past_the_end_is_empty() {
    let doc = Fixture::new(LIST);
    assert_eq!(doc.texts("ol > li:nth-child(3)"), Vec::<String>::new());
    assert_eq!(doc.texts("li:nth-child(3)"), strings(&["3"]));
}

#[test]
fn test_nth_child_counts_other_siblings() {
    let doc = Fixture::new("<div><p>a</p><span>b</span><p>c</p></div>");
    assert_eq!(doc.texts("p:nth-child(2)"), Vec::<String>::new());
    assert_eq!(doc.texts("p:nth-child(3)"), strings(&["c"]));
    assert_eq!(doc.texts("p:nth-of-type(2)"), strings(&["c"]));
}

#[test]
fn test_first_and_last_child() {
    let doc = Fixture::new(LIST);
    assert_eq!(doc.texts("li:first-child"), strings(&["1", "a"]));
    assert_eq!(doc.texts("li:last-child"), strings(&["5", "b"]));
}

#[test]
fn test_child_vs_descendant() {
    let doc = Fixture::new("<root><div><p>1</p><section><p>2</p></section></div><p>3</p></root>");
    assert_eq!(doc.texts("div > p"), strings(&["1"]));
    assert_eq!(doc.texts("div p"), strings(&["1", "2"]));
    assert_eq!(doc.texts("p"), strings(&["1", "2", "3"]));
}

#[test]
fn test_class_order_is_irrelevant() {
    let doc = Fixture::new(
        "<root><a class='foo bar'>1</a><a class='bar'>2</a><a class=' bar  foo x'>3</a><a class='foobar'>4</a></root>",
    );
    assert_eq!(doc.texts("a.foo.bar"), strings(&["1", "3"]));
    assert_eq!(doc.texts("a.bar.foo"), doc.texts("a.foo.bar"));
}

#[test]
fn test_attribute_presence_and_value() {
    let doc = Fixture::new(
        "<root><i data-x='1'>a</i><i data-x='10'>b</i><i data-x=''>c</i><i>d</i></root>",
    );
    assert_eq!(doc.texts("i[data-x]"), strings(&["a", "b", "c"]));
    assert_eq!(doc.texts("i[data-x=1]"), strings(&["a"]));
    assert_eq!(doc.texts("i[!data-x]"), strings(&["d"]));
    assert_eq!(doc.texts("i[data-x!=1]"), strings(&["b", "c", "d"]));
}

#[test]
fn test_attribute_string_operators() {
    let doc = Fixture::new(
        "<root><a href='http://x.org/a.pdf' rel='next nofollow'>1</a>\
         <a href='ftp://x.org/b.txt' rel='prev'>2</a><a data-role='menu'>3</a></root>",
    );
    assert_eq!(doc.texts("a[href^=http]"), strings(&["1"]));
    assert_eq!(doc.texts("a[href$='.pdf']"), strings(&["1"]));
    assert_eq!(doc.texts("a[href*=x.org]"), strings(&["1", "2"]));
    assert_eq!(doc.texts("a[rel~=next]"), strings(&["1"]));
    assert_eq!(doc.texts("a[^data]"), strings(&["3"]));
    assert_eq!(doc.texts("a[^data=menu]"), strings(&["3"]));
}

#[test]
fn test_contains_case_folding() {
    let doc = Fixture::new("<root><p>foo</p><p>Foo</p><p>FOO</p><p>bar</p></root>");
    assert_eq!(doc.texts("p:contains(Foo)"), strings(&["foo", "Foo", "FOO"]));
    assert_eq!(doc.texts("p:contains(Foo, true)"), strings(&["Foo"]));

    let ascii = CompilerOptions {
        case_folding: CaseFolding::Ascii,
    };
    assert_eq!(doc.texts_with("p:contains(Foo)", ascii), strings(&["foo", "Foo", "FOO"]));
}

#[test]
fn test_contains_sensitive_form_reads_direct_text_only() {
    let doc = Fixture::new("<root><p><b>Foo</b></p><p>Foo</p></root>");
    assert_eq!(doc.texts("p:contains(Foo)").len(), 2);
    assert_eq!(doc.texts("p:contains(Foo, true)").len(), 1);
}

#[test]
fn test_quoted_double_colon() {
    let doc = Fixture::new("<root><a title='x::y'>1</a><a title='x'>2</a><p>a::b</p></root>");
    assert_eq!(doc.texts(r#"a[title="x::y"]"#), strings(&["1"]));
    assert_eq!(doc.texts(r#"a[title="x::y"]::text"#), strings(&["1"]));
    assert_eq!(doc.texts(r#"p:contains("A::B")"#), strings(&["a::b"]));
}

#[test]
fn test_has_not_empty() {
    let doc = Fixture::new(
        "<root><div id='a'><p class='x'/></div><div id='b'><p/></div><div id='c'></div></root>",
    );
    assert_eq!(doc.texts("div:has(p.x)::attr(id)"), strings(&["a"]));
    assert_eq!(doc.texts("div:not(#b)::attr(id)"), strings(&["a", "c"]));
    assert_eq!(doc.texts("div:empty::attr(id)"), strings(&["c"]));
    assert_eq!(doc.texts("div:not-empty::attr(id)"), strings(&["a", "b"]));
}

#[test]
fn test_text_and_attr_properties() {
    let doc = Fixture::new("<root><a href='/x' title='X'>go</a></root>");
    assert_eq!(doc.texts("a::text"), strings(&["go"]));
    let mut values = doc.texts("a::attr(title|href)");
    values.sort();
    assert_eq!(values, strings(&["/x", "X"]));
}

#[test]
fn test_union_against_context() {
    let package = parse(
        "<root><section id='s'><a>1</a><b class='c'>2</b><b>x</b></section><a>3</a><b class='c'>4</b></root>",
    );
    let provider = SxdProvider::new(package.as_document());
    let query = Query::new(&provider).with_cache(Arc::new(SelectorCache::default()));

    let section: Node<'_> = query.find_nodes("#s", QueryType::Css, None).unwrap()[0];
    let union = query.find_nodes("a, b.c", QueryType::Css, Some(&section)).unwrap();

    let mut separate = query.find_nodes("a", QueryType::Css, Some(&section)).unwrap();
    separate.extend(query.find_nodes("b.c", QueryType::Css, Some(&section)).unwrap());

    assert_eq!(union.len(), 2);
    assert_eq!(union, separate);
}

#[test]
fn test_matches_and_closest() {
    let package = parse("<root><div class='card'><ul><li id='x'>1</li></ul></div></root>");
    let provider = SxdProvider::new(package.as_document());
    let query = Query::new(&provider).with_cache(Arc::new(SelectorCache::default()));

    let li = query.find_nodes("#x", QueryType::Css, None).unwrap()[0];
    assert!(query.matches(&li, "ul > li").unwrap());
    assert!(!query.matches(&li, "div > li").unwrap());

    let card = query.closest(&li, ".card").unwrap().expect("card ancestor");
    assert!(query.matches(&card, "div.card").unwrap());
    assert_eq!(query.closest(&li, "li").unwrap(), None);

    let ul = query.closest(&li, "ul, div").unwrap().expect("nearest ancestor");
    assert!(query.matches(&ul, "ul").unwrap());
}

#[test]
fn test_first_with_context() {
    let package = parse("<root><ul><li>1</li><li>2</li></ul><li>0</li></root>");
    let provider = SxdProvider::new(package.as_document());
    let query = Query::new(&provider).with_cache(Arc::new(SelectorCache::default()));

    let ul = query.find_nodes("ul", QueryType::Css, None).unwrap()[0];
    let first = query.first("li", QueryType::Css, Some(&ul)).unwrap();
    assert_eq!(
        first,
        Some(Match::Element(TestElement {
            name: "li".to_string(),
            text: "1".to_string(),
        }))
    );
}

#[test]
fn test_declared_errors() {
    let package = parse("<root/>");
    let provider = SxdProvider::new(package.as_document());
    let query = Query::new(&provider).with_cache(Arc::new(SelectorCache::default()));

    assert!(matches!(
        query.find("", QueryType::Css, None),
        Err(Error::MalformedSelector { .. })
    ));
    assert!(matches!(
        query.find("div[", QueryType::Css, None),
        Err(Error::MalformedSelector { .. })
    ));
    assert!(matches!(
        query.find(":frobnicate", QueryType::Css, None),
        Err(Error::UnsupportedSelector { .. })
    ));
}
