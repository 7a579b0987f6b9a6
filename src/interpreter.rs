//! Tree-walking evaluator for numlisp ASTs.
//!
//! `Interpreter::evaluate` dispatches on the closed node sum type and runs
//! the fixed builtin rule set. Evaluation is single-threaded, call-stack
//! recursive, strictly left-to-right over operand chains, and never mutates
//! the tree or any environment. Recursion depth is bounded only by stack
//! capacity.
//!
//! Malformed input (wrong operand count, unresolved symbol) raises exactly
//! one [`Warning`] and continues with the NaN sentinel or the documented
//! neutral value; the sentinel then propagates through surrounding
//! combinators by ordinary IEEE arithmetic. Producer contract violations
//! (an unimplemented function kind reaching dispatch) go through the fatal
//! channel instead.

use log::{debug, info};

use crate::ast::{Arena, FuncKind, NodeId, NodeKind};
use crate::diagnostics::{fatal, DiagnosticSink, Warning};
use crate::value::{NumKind, Value};

pub struct Interpreter {
    warnings: Vec<Warning>,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    /// Creates an interpreter that only buffers warnings.
    pub fn new() -> Self {
        info!("Initializing Interpreter");

        Interpreter {
            warnings: Vec::new(),
            sink: None,
        }
    }

    /// Creates an interpreter that additionally forwards each warning to
    /// `sink` as it is raised.
    pub fn with_sink(sink: Box<dyn DiagnosticSink>) -> Self {
        let mut interpreter = Interpreter::new();
        interpreter.sink = Some(sink);
        interpreter
    }

    /// Installs or replaces the diagnostic sink.
    pub fn set_sink(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.sink = Some(sink);
    }

    /// Warnings raised so far, in evaluation order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Drains the warning buffer, e.g. between top-level expressions.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, warning: Warning) {
        debug!("raising warning: {}", warning);
        if let Some(sink) = self.sink.as_mut() {
            sink.report(&warning);
        }
        self.warnings.push(warning);
    }

    /// Evaluates one node and returns its `(kind, value)` result.
    pub fn evaluate(&mut self, ast: &Arena, node: NodeId) -> Value {
        debug!("Evaluating node {:?}", node);

        let value = match &ast.node(node).kind {
            NodeKind::Number(value) => *value,

            NodeKind::SymbolRef { id } => self.evaluate_symbol(ast, node, id),

            NodeKind::Function { func, op_list } => {
                self.evaluate_function(ast, *func, *op_list)
            }

            // the scope node itself carries no value
            NodeKind::Scope { child } => self.evaluate(ast, *child),
        };

        debug!("Node {:?} evaluated to {}", node, value);
        value
    }

    /// Resolves a symbol by walking the back-reference chain starting at the
    /// reference itself, scanning each attached environment in binding order.
    /// A hit evaluates the bound expression fresh — no memoization, every
    /// reference re-executes it. Exhausting the chain warns and yields the
    /// NaN sentinel.
    fn evaluate_symbol(&mut self, ast: &Arena, node: NodeId, name: &str) -> Value {
        debug!("Looking up symbol '{}'", name);

        let mut scope = Some(node);
        while let Some(scope_id) = scope {
            let current = ast.node(scope_id);

            if let Some(env) = &current.env {
                if let Some(expr) = env.lookup(ast, name) {
                    info!("Symbol '{}' resolved at {:?}", name, scope_id);
                    return self.evaluate(ast, expr);
                }
            }

            scope = current.parent;
        }

        self.warn(Warning::UndefinedSymbol {
            id: name.to_string(),
        });
        Value::NAN
    }

    fn evaluate_function(&mut self, ast: &Arena, func: FuncKind, ops: Option<NodeId>) -> Value {
        debug!("Evaluating builtin '{}'", func);

        match func {
            FuncKind::Neg
            | FuncKind::Abs
            | FuncKind::Exp
            | FuncKind::Exp2
            | FuncKind::Log
            | FuncKind::Sqrt
            | FuncKind::Cbrt => self.evaluate_unary(ast, func, ops),

            FuncKind::Add | FuncKind::Mult => self.evaluate_fold(ast, func, ops),

            FuncKind::Sub | FuncKind::Div | FuncKind::Remainder | FuncKind::Pow => {
                self.evaluate_binary(ast, func, ops)
            }

            FuncKind::Hypot => self.evaluate_hypot(ast, ops),

            FuncKind::Max | FuncKind::Min => self.evaluate_extremum(ast, func, ops),

            // declared extension point, not a recoverable input error
            FuncKind::Custom => {
                fatal("custom function kind reached dispatch without an evaluation rule")
            }
        }
    }

    // ───────────────────────────── builtin rules ────────────────────────────

    /// Unary rules. Arity policy: no operands warns and yields NaN; operands
    /// beyond the first are warned about once and never evaluated.
    fn evaluate_unary(&mut self, ast: &Arena, func: FuncKind, ops: Option<NodeId>) -> Value {
        let Some(first) = ops else {
            self.warn(Warning::NoOperands { func });
            return Value::NAN;
        };

        if ast.node(first).next.is_some() {
            self.warn(Warning::ExtraOperands { func });
        }

        let operand = self.evaluate(ast, first);

        match func {
            // kind passes through unchanged
            FuncKind::Neg => Value::new(operand.kind, -operand.value),
            FuncKind::Abs => Value::new(operand.kind, operand.value.abs()),

            // unconditionally double
            FuncKind::Exp => Value::double(operand.value.exp()),
            FuncKind::Log => Value::double(operand.value.ln()),
            FuncKind::Sqrt => Value::double(operand.value.sqrt()),
            FuncKind::Cbrt => Value::double(operand.value.cbrt()),

            // double only for a negative operand, else kind passes through
            FuncKind::Exp2 => {
                let kind = if operand.value < 0.0 {
                    NumKind::Double
                } else {
                    operand.kind
                };
                Value::new(kind, operand.value.exp2())
            }

            _ => fatal("non-unary function kind passed into evaluate_unary"),
        }
    }

    /// `add` / `mult`: left-to-right reduction under the default promotion
    /// rule. Zero operands warn and return the neutral element (INT 0 for
    /// add, INT 1 for mult).
    fn evaluate_fold(&mut self, ast: &Arena, func: FuncKind, ops: Option<NodeId>) -> Value {
        let Some(first) = ops else {
            self.warn(Warning::NoOperands { func });
            return match func {
                FuncKind::Add => Value::ZERO,
                FuncKind::Mult => Value::ONE,
                _ => fatal("non-reducing function kind passed into evaluate_fold"),
            };
        };

        let mut result = self.evaluate(ast, first);
        let mut cur = ast.node(first).next;

        while let Some(id) = cur {
            let operand = self.evaluate(ast, id);

            result.kind = result.kind.promote(operand.kind);
            result.value = match func {
                FuncKind::Add => result.value + operand.value,
                FuncKind::Mult => result.value * operand.value,
                _ => fatal("non-reducing function kind passed into evaluate_fold"),
            };

            cur = ast.node(id).next;
        }

        result
    }

    /// Binary rules (`sub`, `div`, `remainder`, `pow`). Fewer than two
    /// operands warns and yields NaN; operands beyond the second are warned
    /// about once and never evaluated.
    fn evaluate_binary(&mut self, ast: &Arena, func: FuncKind, ops: Option<NodeId>) -> Value {
        let Some(first) = ops else {
            self.warn(Warning::NoOperands { func });
            return Value::NAN;
        };

        let Some(second) = ast.node(first).next else {
            self.warn(Warning::MissingOperand { func });
            return Value::NAN;
        };

        if ast.node(second).next.is_some() {
            self.warn(Warning::ExtraOperands { func });
        }

        let left = self.evaluate(ast, first);
        let right = self.evaluate(ast, second);
        let kind = left.kind.promote(right.kind);

        match func {
            FuncKind::Sub => Value::new(kind, left.value - right.value),

            FuncKind::Pow => Value::new(kind, left.value.powf(right.value)),

            // floating modulo; stays INT only when both operands are INT
            FuncKind::Remainder => Value::new(kind, left.value % right.value),

            FuncKind::Div => {
                if kind == NumKind::Int {
                    // floor is the documented policy, not round or truncate
                    Value::int((left.value / right.value).floor())
                } else {
                    Value::double(left.value / right.value)
                }
            }

            _ => fatal("non-binary function kind passed into evaluate_binary"),
        }
    }

    /// `hypot`: square root of the sum of squares over all operands; the
    /// result is unconditionally double. Zero operands warn and return INT 0.
    fn evaluate_hypot(&mut self, ast: &Arena, ops: Option<NodeId>) -> Value {
        if ops.is_none() {
            self.warn(Warning::NoOperands {
                func: FuncKind::Hypot,
            });
            return Value::ZERO;
        }

        let mut sum = 0.0;
        let mut cur = ops;
        while let Some(id) = cur {
            let operand = self.evaluate(ast, id);
            sum += operand.value.powi(2);
            cur = ast.node(id).next;
        }

        Value::double(sum.sqrt())
    }

    /// `max` / `min`: returns the extremal operand's own `(kind, value)`
    /// pair, not a recomputed value. Comparison is strict, so the first
    /// extremum wins ties and a NaN candidate never displaces the current
    /// extremum. Zero operands warn and yield NaN.
    fn evaluate_extremum(&mut self, ast: &Arena, func: FuncKind, ops: Option<NodeId>) -> Value {
        let Some(first) = ops else {
            self.warn(Warning::NoOperands { func });
            return Value::NAN;
        };

        let mut result = self.evaluate(ast, first);
        let mut cur = ast.node(first).next;

        while let Some(id) = cur {
            let candidate = self.evaluate(ast, id);

            let wins = match func {
                FuncKind::Max => candidate.value > result.value,
                FuncKind::Min => candidate.value < result.value,
                _ => fatal("non-extremum function kind passed into evaluate_extremum"),
            };
            if wins {
                result = candidate;
            }

            cur = ast.node(id).next;
        }

        result
    }
}
