//! CSS Selector → XPath Compiler
//!
//! - Segment tokenizer (tag, id, classes, attributes, pseudo-class, combinator)
//! - Predicate translation, including An+B arithmetic
//! - Chain compilation with unions and `::text` / `::attr()` properties

pub mod scanner;
pub mod segment;
pub mod nth;
pub mod translate;
pub mod compiler;

pub use compiler::{
    compile, compile_clause, split_clauses, CaseFolding, CompiledSelector, CompilerOptions,
};
pub use nth::Nth;
pub use segment::{AttributeOp, AttributeTest, Combinator, Pseudo, Segment};
