//! Centralised diagnostics for the **numlisp** evaluator.
//!
//! Two channels, kept strictly apart:
//!
//! - **warning** — malformed user input (wrong operand count, unresolved
//!   symbol). Structured as a [`Warning`] value the caller can inspect; the
//!   interpreter records every warning and forwards it to a configurable
//!   [`DiagnosticSink`]. Evaluation always continues with a sentinel or
//!   neutral value.
//! - **fatal** — producer contract violations and allocation failure. Never
//!   reachable from user input; [`fatal`] terminates through the panic
//!   boundary.
//!
//! The module **does not** print diagnostics itself; rendering belongs to
//! whichever sink the caller installs.

use std::io::Write;

use log::{debug, error};
use serde::Serialize;
use thiserror::Error;

use crate::ast::FuncKind;

const RED: &str = "\x1b[31m";
const RESET_COLOR: &str = "\x1b[0m";

/// Recoverable diagnostics raised while evaluating malformed input.
///
/// Exactly one warning is emitted per malformed case; the evaluation rule
/// that raised it then returns the NaN sentinel or its documented neutral
/// value.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum Warning {
    /// A builtin received no operands at all.
    #[error("no operands passed into {func}")]
    NoOperands { func: FuncKind },

    /// A binary builtin received only one operand.
    #[error("only one operand passed into {func}")]
    MissingOperand { func: FuncKind },

    /// Operands beyond the builtin's arity; they are ignored, not evaluated.
    #[error("{func} called with extra (ignored) operands")]
    ExtraOperands { func: FuncKind },

    /// A symbol reference exhausted the lexical chain without a match.
    #[error("undefined symbol: {id}")]
    UndefinedSymbol { id: String },
}

/// Destination for warnings as they are raised.
///
/// The interpreter buffers every [`Warning`] regardless; a sink only adds a
/// side channel (terminal, test capture, ...).
pub trait DiagnosticSink {
    fn report(&mut self, warning: &Warning);
}

/// Sink that renders each warning as a `WARNING: ...` line on a writer,
/// colored red unless disabled.
pub struct WriteSink<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> WriteSink<W> {
    pub fn new(out: W) -> Self {
        WriteSink { out, color: true }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl<W: Write> DiagnosticSink for WriteSink<W> {
    fn report(&mut self, warning: &Warning) {
        let result = if self.color {
            writeln!(self.out, "{RED}WARNING: {warning}{RESET_COLOR}")
        } else {
            writeln!(self.out, "WARNING: {warning}")
        };

        if let Err(e) = result {
            debug!("diagnostic sink write failed: {}", e);
        }
    }
}

/// Fatal channel: logs and terminates through the panic boundary.
///
/// Reserved for producer bugs — an unimplemented function kind reaching
/// dispatch, or access to a released arena slot. Malformed user input must
/// never route here; it goes through [`Warning`] instead.
pub fn fatal(message: &str) -> ! {
    error!("{}", message);
    panic!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_messages() {
        let w = Warning::NoOperands {
            func: FuncKind::Add,
        };
        assert_eq!(w.to_string(), "no operands passed into add");

        let w = Warning::UndefinedSymbol { id: "x".into() };
        assert_eq!(w.to_string(), "undefined symbol: x");
    }

    #[test]
    fn write_sink_renders_warning_lines() {
        let mut out: Vec<u8> = Vec::new();
        {
            let mut sink = WriteSink::new(&mut out).with_color(false);
            sink.report(&Warning::MissingOperand {
                func: FuncKind::Sub,
            });
        }

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "WARNING: only one operand passed into sub\n");
    }

    #[test]
    fn write_sink_colors_by_default() {
        let mut out: Vec<u8> = Vec::new();
        {
            let mut sink = WriteSink::new(&mut out);
            sink.report(&Warning::ExtraOperands {
                func: FuncKind::Div,
            });
        }

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b[31m"));
        assert!(text.contains("WARNING: div called with extra (ignored) operands"));
    }
}
