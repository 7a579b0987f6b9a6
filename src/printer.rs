//! Renders an arena subtree back to prefix s-expression form, for logs and
//! test assertions. Output is `(add 1 2)` for calls and
//! `(let ((x 1)) body)` for scope blocks; bindings print in chain order
//! (most recently prepended first).

use crate::ast::{Arena, NodeId, NodeKind};
use crate::value::NumKind;

pub struct SexprPrinter;

impl SexprPrinter {
    pub fn print(arena: &Arena, node: NodeId) -> String {
        match &arena.node(node).kind {
            NodeKind::Number(value) => {
                if value.kind == NumKind::Int && value.value.is_finite() {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();
                    buf.format(value.value as i64).to_string()
                } else {
                    value.value.to_string()
                }
            }

            NodeKind::SymbolRef { id } => id.clone(),

            NodeKind::Function { func, op_list } => {
                let mut s = format!("({}", func);
                for op in arena.siblings(*op_list) {
                    s.push(' ');
                    s.push_str(&Self::print(arena, op));
                }
                s.push(')');
                s
            }

            NodeKind::Scope { child } => {
                let mut s = String::from("(let (");
                if let Some(env) = &arena.node(*child).env {
                    let mut first = true;
                    for (name, expr) in env.iter(arena) {
                        if !first {
                            s.push(' ');
                        }
                        first = false;
                        s.push('(');
                        s.push_str(name);
                        s.push(' ');
                        s.push_str(&Self::print(arena, expr));
                        s.push(')');
                    }
                }
                s.push_str(") ");
                s.push_str(&Self::print(arena, *child));
                s.push(')');
                s
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::FuncKind;
    use crate::value::Value;

    #[test]
    fn prints_call_in_prefix_form() {
        let mut arena = Arena::new();
        let two = arena.number(Value::int(2.0));
        let one = arena.number(Value::double(1.5));
        let chain = arena.prepend_op(one, Some(two));
        let call = arena.function(FuncKind::Add, Some(chain));

        assert_eq!(SexprPrinter::print(&arena, call), "(add 1.5 2)");
    }

    #[test]
    fn prints_scope_with_bindings() {
        let mut arena = Arena::new();
        let bound = arena.number(Value::int(1.0));
        let binding = arena.binding_node("x", bound);
        let body = arena.symbol_ref("x");
        let scope = arena.scope(Some(binding), body);

        assert_eq!(SexprPrinter::print(&arena, scope), "(let ((x 1)) x)");
    }
}
