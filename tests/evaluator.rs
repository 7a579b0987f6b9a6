#[cfg(test)]
mod evaluator_tests {
    use numlisp as lisp;

    use lisp::ast::{Arena, FuncKind, NodeId};
    use lisp::diagnostics::Warning;
    use lisp::interpreter::Interpreter;
    use lisp::printer::SexprPrinter;
    use lisp::value::{NumKind, Value};

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Builds `(func op1 op2 ...)` over numeric literals.
    fn call(arena: &mut Arena, func: FuncKind, operands: &[Value]) -> NodeId {
        let mut chain = None;
        for value in operands.iter().rev() {
            let node = arena.number(*value);
            chain = Some(arena.prepend_op(node, chain));
        }
        arena.function(func, chain)
    }

    fn eval_one(arena: &Arena, root: NodeId) -> (Value, Vec<Warning>) {
        let mut interpreter = Interpreter::new();
        let result = interpreter.evaluate(arena, root);
        (result, interpreter.take_warnings())
    }

    #[test]
    fn promotion_mixed_operands_yield_double() {
        init_logs();
        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Add, &[Value::int(1.0), Value::double(2.5)]);

        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::double(3.5));
        assert!(warnings.is_empty());
    }

    #[test]
    fn promotion_int_operands_stay_int() {
        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Add, &[Value::int(1.0), Value::int(2.0)]);

        let (result, _) = eval_one(&arena, root);
        assert_eq!(result, Value::int(3.0));
        assert_eq!(result.to_string(), "Integer : 3");
    }

    #[test]
    fn add_without_operands_is_int_zero_plus_one_warning() {
        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Add, &[]);

        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::int(0.0));
        assert_eq!(
            warnings,
            vec![Warning::NoOperands {
                func: FuncKind::Add
            }]
        );
    }

    #[test]
    fn mult_without_operands_is_int_one_plus_one_warning() {
        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Mult, &[]);

        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::int(1.0));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn div_of_ints_floors() {
        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Div, &[Value::int(7.0), Value::int(2.0)]);

        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::int(3.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn max_and_min_propagate_the_winners_own_kind() {
        let operands = [Value::int(3.0), Value::double(7.5), Value::int(2.0)];

        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Max, &operands);
        let (result, _) = eval_one(&arena, root);
        assert_eq!(result, Value::double(7.5));
        assert_eq!(result.to_string(), "Double : 7.500000");

        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Min, &operands);
        let (result, _) = eval_one(&arena, root);
        assert_eq!(result, Value::int(2.0));
        assert_eq!(result.to_string(), "Integer : 2");
    }

    #[test]
    fn nested_scope_shadows_outer_binding() {
        init_logs();

        // (let ((x 1)) (add (let ((x 2)) x) x))
        let mut arena = Arena::new();

        let inner_bound = arena.number(Value::int(2.0));
        let inner_binding = arena.binding_node("x", inner_bound);
        let inner_body = arena.symbol_ref("x");
        let inner_scope = arena.scope(Some(inner_binding), inner_body);

        let outer_ref = arena.symbol_ref("x");
        let chain = arena.prepend_op(inner_scope, Some(outer_ref));
        let add = arena.function(FuncKind::Add, Some(chain));

        let outer_bound = arena.number(Value::int(1.0));
        let outer_binding = arena.binding_node("x", outer_bound);
        let root = arena.scope(Some(outer_binding), add);

        let mut interpreter = Interpreter::new();

        // a reference inside the inner scope sees the inner binding
        assert_eq!(interpreter.evaluate(&arena, inner_scope), Value::int(2.0));

        // a sibling expression still in the outer scope sees the outer one
        assert_eq!(interpreter.evaluate(&arena, outer_ref), Value::int(1.0));

        assert_eq!(interpreter.evaluate(&arena, root), Value::int(3.0));
        assert!(interpreter.warnings().is_empty());

        assert_eq!(
            SexprPrinter::print(&arena, root),
            "(let ((x 1)) (add (let ((x 2)) x) x))"
        );
    }

    #[test]
    fn bound_expression_sees_sibling_bindings() {
        // (let ((y 5) (z (add y 1))) z)  =>  6
        let mut arena = Arena::new();

        let y_bound = arena.number(Value::int(5.0));
        let y_binding = arena.binding_node("y", y_bound);

        let y_ref = arena.symbol_ref("y");
        let one = arena.number(Value::int(1.0));
        let op_chain = arena.prepend_op(y_ref, Some(one));
        let z_bound = arena.function(FuncKind::Add, Some(op_chain));
        let z_binding = arena.binding_node("z", z_bound);

        let bindings = arena.prepend_binding(z_binding, Some(y_binding));
        let body = arena.symbol_ref("z");
        let root = arena.scope(Some(bindings), body);

        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::int(6.0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn rebinding_in_one_scope_shadows_head_first() {
        // (let ((x 1) (x 2)) x) with "x 2" prepended last => 2
        let mut arena = Arena::new();

        let old = arena.number(Value::int(1.0));
        let old_binding = arena.binding_node("x", old);
        let new = arena.number(Value::int(2.0));
        let new_binding = arena.binding_node("x", new);
        let bindings = arena.prepend_binding(new_binding, Some(old_binding));

        let body = arena.symbol_ref("x");
        let root = arena.scope(Some(bindings), body);

        let (result, _) = eval_one(&arena, root);
        assert_eq!(result, Value::int(2.0));
    }

    #[test]
    fn undefined_symbol_warns_once_and_poisons_enclosing_add() {
        let mut arena = Arena::new();

        let unknown = arena.symbol_ref("mystery");
        let five = arena.number(Value::int(5.0));
        let chain = arena.prepend_op(unknown, Some(five));
        let root = arena.function(FuncKind::Add, Some(chain));

        let (result, warnings) = eval_one(&arena, root);
        assert!(result.is_nan());
        assert_eq!(
            warnings,
            vec![Warning::UndefinedSymbol {
                id: "mystery".to_string()
            }]
        );
    }

    #[test]
    fn symbol_is_reevaluated_on_every_reference() {
        // (let ((w (max))) (add w w)) — the bound expression runs fresh per
        // reference, so its warning appears twice
        let mut arena = Arena::new();

        let w_bound = arena.function(FuncKind::Max, None);
        let w_binding = arena.binding_node("w", w_bound);

        let first_ref = arena.symbol_ref("w");
        let second_ref = arena.symbol_ref("w");
        let chain = arena.prepend_op(first_ref, Some(second_ref));
        let add = arena.function(FuncKind::Add, Some(chain));
        let root = arena.scope(Some(w_binding), add);

        let (result, warnings) = eval_one(&arena, root);
        assert!(result.is_nan());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn hypot_without_operands_is_int_zero_plus_warning() {
        let mut arena = Arena::new();
        let root = call(&mut arena, FuncKind::Hypot, &[]);

        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::int(0.0));
        assert_eq!(result.kind, NumKind::Int);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn release_accounts_for_every_node_and_binding() {
        init_logs();

        // one scope with three bindings and one nested function call
        let mut arena = Arena::new();

        let a_bound = arena.number(Value::int(1.0));
        let a_binding = arena.binding_node("a", a_bound);
        let b_bound = arena.number(Value::int(2.0));
        let b_binding = arena.binding_node("b", b_bound);
        let c_bound = arena.number(Value::int(3.0));
        let c_binding = arena.binding_node("c", c_bound);

        let mut bindings = arena.prepend_binding(b_binding, Some(a_binding));
        bindings = arena.prepend_binding(c_binding, Some(bindings));

        let b_ref = arena.symbol_ref("b");
        let c_ref = arena.symbol_ref("c");
        let mult_chain = arena.prepend_op(b_ref, Some(c_ref));
        let mult = arena.function(FuncKind::Mult, Some(mult_chain));

        let a_ref = arena.symbol_ref("a");
        let add_chain = arena.prepend_op(a_ref, Some(mult));
        let add = arena.function(FuncKind::Add, Some(add_chain));

        let root = arena.scope(Some(bindings), add);

        assert_eq!(arena.live_nodes(), 9);
        assert_eq!(arena.live_bindings(), 3);

        // evaluate first to confirm the tree is intact, then tear down
        let (result, warnings) = eval_one(&arena, root);
        assert_eq!(result, Value::int(7.0));
        assert!(warnings.is_empty());

        arena.release(root);
        assert_eq!(arena.live_nodes(), 0);
        assert_eq!(arena.live_bindings(), 0);

        // releasing again changes nothing
        arena.release(root);
        assert_eq!(arena.live_nodes(), 0);
    }

    #[test]
    fn warnings_serialize_for_structured_consumers() {
        let warning = Warning::UndefinedSymbol { id: "q".to_string() };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["UndefinedSymbol"]["id"], "q");

        let value = serde_json::to_value(Value::int(3.0)).unwrap();
        assert_eq!(value["kind"], "Int");
        assert_eq!(value["value"], 3.0);
    }
}
