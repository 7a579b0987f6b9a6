//! Per-scope binding environment.
//!
//! An `Environment` is attached to exactly one node — the child of a scope
//! node — and holds the head of an arena-allocated binding chain. Insertion
//! is head-first and lookup is a linear scan returning the first match, so
//! re-binding a name in the same scope legally shadows the earlier binding.
//! Resolution across scopes is not handled here: the evaluator walks parent
//! back-references and consults each attached environment in turn.

use log::debug;
use serde::Serialize;

use crate::ast::{Arena, BindingId, NodeId};

#[derive(Debug, Clone, Serialize)]
pub struct Environment {
    head: Option<BindingId>,
}

impl Environment {
    pub fn new(head: Option<BindingId>) -> Self {
        Environment { head }
    }

    /// Head of the binding chain, `None` for an empty scope.
    pub fn head(&self) -> Option<BindingId> {
        self.head
    }

    /// Linear scan for an exact identifier match; the first (most recently
    /// prepended) hit wins. Returns the bound expression, unevaluated.
    pub fn lookup(&self, arena: &Arena, name: &str) -> Option<NodeId> {
        let mut cur = self.head;
        while let Some(bid) = cur {
            let binding = arena.binding(bid);
            if binding.id == name {
                debug!("environment: '{}' resolved to {:?}", name, binding.expr);
                return Some(binding.expr);
            }
            cur = binding.next;
        }
        None
    }

    /// Iterate `(identifier, bound expression)` pairs in chain order.
    pub fn iter<'a>(&self, arena: &'a Arena) -> impl Iterator<Item = (&'a str, NodeId)> {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let bid = cur?;
            let binding = arena.binding(bid);
            cur = binding.next;
            Some((binding.id.as_str(), binding.expr))
        })
    }
}
