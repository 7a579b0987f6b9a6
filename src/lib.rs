//! Tree-walking evaluator for a small Lisp-like numeric expression language.
//!
//! An external parser builds one root AST per top-level expression through
//! the factory methods on [`ast::Arena`], honoring the ownership contract
//! (owned operand/sibling/child links, non-owning parent back-references).
//! [`interpreter::Interpreter::evaluate`] then walks the tree and returns one
//! [`value::Value`] per root; [`ast::Arena::release`] frees an owned subtree
//! exactly once.

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod interpreter;
pub mod printer;
pub mod value;
