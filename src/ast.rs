//! AST arena for the numlisp expression language.
//!
//! Nodes form a closed sum type (number, builtin call, symbol reference,
//! scope block) and live in an [`Arena`] addressed by copyable ids, the
//! index-based rendition of the language's ownership model:
//!
//! - **owning** edges are the operand/sibling chain (`next`), a scope's
//!   `child`, and each binding's bound expression — [`Arena::release`] walks
//!   exactly these;
//! - the **parent** back-reference is non-owning and exists only so symbol
//!   lookup can climb toward the root; release never follows it, so no cycle
//!   can cause a double free.
//!
//! The factory methods here are the construction surface an external parser
//! drives bottom-up: leaves first, then the enclosing function and scope
//! nodes, which wire parents and attach environments at build time. The tree
//! is immutable from then on; evaluation never mutates it.

use log::debug;
use phf::phf_map;
use serde::Serialize;
use std::fmt;

use crate::diagnostics::fatal;
use crate::environment::Environment;
use crate::value::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Builtin function kinds (compile-time perfect hash for name resolution)
// ─────────────────────────────────────────────────────────────────────────────

static BUILTINS: phf::Map<&'static str, FuncKind> = phf_map! {
    "neg"       => FuncKind::Neg,
    "abs"       => FuncKind::Abs,
    "add"       => FuncKind::Add,
    "sub"       => FuncKind::Sub,
    "mult"      => FuncKind::Mult,
    "div"       => FuncKind::Div,
    "remainder" => FuncKind::Remainder,
    "exp"       => FuncKind::Exp,
    "exp2"      => FuncKind::Exp2,
    "pow"       => FuncKind::Pow,
    "log"       => FuncKind::Log,
    "sqrt"      => FuncKind::Sqrt,
    "cbrt"      => FuncKind::Cbrt,
    "hypot"     => FuncKind::Hypot,
    "max"       => FuncKind::Max,
    "min"       => FuncKind::Min,
};

/// The fixed set of builtin functions, plus the `Custom` extension point for
/// user-defined functions, which has no evaluation rule yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuncKind {
    Neg,
    Abs,
    Add,
    Sub,
    Mult,
    Div,
    Remainder,
    Exp,
    Exp2,
    Pow,
    Log,
    Sqrt,
    Cbrt,
    Hypot,
    Max,
    Min,

    /// Declared extension point: reaching this at dispatch is fatal.
    Custom,
}

impl FuncKind {
    /// Maps a function name to its kind; unknown names resolve to `Custom`.
    pub fn resolve(name: &str) -> FuncKind {
        BUILTINS.get(name).copied().unwrap_or(FuncKind::Custom)
    }

    /// The surface-syntax name of this builtin.
    pub fn name(self) -> &'static str {
        match self {
            FuncKind::Neg => "neg",
            FuncKind::Abs => "abs",
            FuncKind::Add => "add",
            FuncKind::Sub => "sub",
            FuncKind::Mult => "mult",
            FuncKind::Div => "div",
            FuncKind::Remainder => "remainder",
            FuncKind::Exp => "exp",
            FuncKind::Exp2 => "exp2",
            FuncKind::Pow => "pow",
            FuncKind::Log => "log",
            FuncKind::Sqrt => "sqrt",
            FuncKind::Cbrt => "cbrt",
            FuncKind::Hypot => "hypot",
            FuncKind::Max => "max",
            FuncKind::Min => "min",
            FuncKind::Custom => "custom",
        }
    }
}

impl fmt::Display for FuncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Nodes and bindings
// ─────────────────────────────────────────────────────────────────────────────

/// Index of a node slot in the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeId(usize);

/// Index of a binding slot in the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BindingId(usize);

/// Kind-specific payload of an AST node.
#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    /// Numeric literal, evaluated to itself.
    Number(Value),

    /// Builtin call over an owned operand chain (head of the `next` list).
    Function {
        func: FuncKind,
        op_list: Option<NodeId>,
    },

    /// Reference to a lexically bound identifier; owns its name.
    SymbolRef { id: String },

    /// Scope block introducing an environment for its single child.
    Scope { child: NodeId },
}

/// One AST node.
///
/// `next` is the owned sibling link used for operand lists. `parent` points
/// to the lexically enclosing node and is never owning. `env` is present only
/// on nodes that are the child of a scope node.
#[derive(Debug, Clone, Serialize)]
pub struct AstNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub env: Option<Environment>,
    pub next: Option<NodeId>,
}

/// A named, lexically scoped association between an identifier (owned) and an
/// unevaluated bound expression (owned subtree). Chained head-first.
#[derive(Debug, Clone, Serialize)]
pub struct Binding {
    pub id: String,
    pub expr: NodeId,
    pub next: Option<BindingId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Arena
// ─────────────────────────────────────────────────────────────────────────────

/// Slot-vector arena owning every node and binding of one or more trees.
///
/// A released slot is `None`; accessing one is a producer contract violation
/// and routes through the fatal channel. Allocation relies on the infallible
/// global allocator, so out-of-memory aborts rather than unwinding.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Option<AstNode>>,
    bindings: Vec<Option<Binding>>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    // ───────────────────────────── accessors ────────────────────────────────

    /// Borrow a live node. Released or out-of-range ids are fatal.
    pub fn node(&self, id: NodeId) -> &AstNode {
        match self.nodes.get(id.0) {
            Some(Some(node)) => node,
            _ => fatal("released or invalid node id passed into Arena::node"),
        }
    }

    /// Borrow a live binding. Released or out-of-range ids are fatal.
    pub fn binding(&self, id: BindingId) -> &Binding {
        match self.bindings.get(id.0) {
            Some(Some(binding)) => binding,
            _ => fatal("released or invalid binding id passed into Arena::binding"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut AstNode {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => fatal("released or invalid node id passed into Arena::node_mut"),
        }
    }

    /// Iterate a sibling chain starting at `head` (operand lists).
    pub fn siblings(&self, head: Option<NodeId>) -> Siblings<'_> {
        Siblings { arena: self, cur: head }
    }

    /// Count of live (unreleased) node slots.
    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Count of live (unreleased) binding slots.
    pub fn live_bindings(&self) -> usize {
        self.bindings.iter().filter(|slot| slot.is_some()).count()
    }

    // ───────────────────────────── factory ──────────────────────────────────

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(AstNode {
            kind,
            parent: None,
            env: None,
            next: None,
        }));
        id
    }

    /// Leaf numeric literal; owns nothing further.
    pub fn number(&mut self, value: Value) -> NodeId {
        debug!("arena: number node {:?}", value);
        self.alloc(NodeKind::Number(value))
    }

    /// Symbol reference; takes ownership of the identifier string.
    pub fn symbol_ref(&mut self, id: impl Into<String>) -> NodeId {
        let id = id.into();
        debug!("arena: symbol node '{}'", id);
        self.alloc(NodeKind::SymbolRef { id })
    }

    /// Builtin call node; takes ownership of the operand chain and wires each
    /// operand's parent to the new node, so nested calls can resolve symbols
    /// through it up to whatever scope encloses it. Function nodes are
    /// transparent for lookup, not scope boundaries.
    pub fn function(&mut self, func: FuncKind, op_list: Option<NodeId>) -> NodeId {
        debug!("arena: function node '{}'", func);
        let node = self.alloc(NodeKind::Function { func, op_list });

        let mut cur = op_list;
        while let Some(op) = cur {
            let operand = self.node_mut(op);
            operand.parent = Some(node);
            cur = operand.next;
        }

        node
    }

    /// Scope node; takes ownership of `child` and of the binding chain.
    /// Attaches the bindings as `child`'s environment, wires `child`'s parent
    /// to the scope node, and points every bound expression's parent at
    /// `child` — a bound expression can therefore see sibling bindings in the
    /// same scope and everything enclosing it.
    pub fn scope(&mut self, bindings: Option<BindingId>, child: NodeId) -> NodeId {
        debug!("arena: scope node over child {:?}", child);
        let node = self.alloc(NodeKind::Scope { child });

        {
            let child_node = self.node_mut(child);
            child_node.parent = Some(node);
            child_node.env = Some(Environment::new(bindings));
        }

        let mut cur = bindings;
        while let Some(bid) = cur {
            let (expr, next) = {
                let binding = self.binding(bid);
                (binding.expr, binding.next)
            };
            self.node_mut(expr).parent = Some(child);
            cur = next;
        }

        node
    }

    /// One binding; takes ownership of the identifier and the bound subtree.
    pub fn binding_node(&mut self, id: impl Into<String>, expr: NodeId) -> BindingId {
        let id = id.into();
        debug!("arena: binding '{}' -> {:?}", id, expr);
        let bid = BindingId(self.bindings.len());
        self.bindings.push(Some(Binding {
            id,
            expr,
            next: None,
        }));
        bid
    }

    /// Head insertion into an operand chain; the new node becomes the head.
    pub fn prepend_op(&mut self, new: NodeId, chain: Option<NodeId>) -> NodeId {
        self.node_mut(new).next = chain;
        new
    }

    /// Head insertion into a binding chain; re-binding a name already present
    /// shadows the earlier binding (first match wins on lookup).
    pub fn prepend_binding(&mut self, new: BindingId, chain: Option<BindingId>) -> BindingId {
        match self.bindings.get_mut(new.0) {
            Some(Some(binding)) => binding.next = chain,
            _ => fatal("released or invalid binding id passed into Arena::prepend_binding"),
        }
        new
    }

    // ───────────────────────────── release ──────────────────────────────────

    /// Recursively release an owned subtree: kind-specific substructure first
    /// (operand chain, scope child, identifier string), then the attached
    /// environment, then the sibling chain, then the node slot itself.
    ///
    /// Never traverses `parent`. Releasing an already-released slot is a
    /// no-op, so each allocation is freed exactly once.
    pub fn release(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };

        match node.kind {
            NodeKind::Function { op_list, .. } => {
                if let Some(head) = op_list {
                    self.release(head);
                }
            }

            NodeKind::Scope { child } => self.release(child),

            // Identifier string is owned by the node and dropped with it.
            NodeKind::SymbolRef { .. } | NodeKind::Number(_) => {}
        }

        if let Some(env) = node.env {
            self.release_bindings(env.head());
        }

        if let Some(next) = node.next {
            self.release(next);
        }

        debug!("arena: released node {:?}", id);
    }

    fn release_bindings(&mut self, head: Option<BindingId>) {
        let mut cur = head;
        while let Some(bid) = cur {
            let Some(binding) = self.bindings.get_mut(bid.0).and_then(Option::take) else {
                return;
            };
            self.release(binding.expr);
            cur = binding.next;
        }
    }
}

/// Iterator over an owned sibling chain, yielding node ids in list order.
pub struct Siblings<'a> {
    arena: &'a Arena,
    cur: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.arena.node(id).next;
        Some(id)
    }
}
