#![forbid(unsafe_code)]

//! Score expressions over aggregate column statistics, e.g.
//! `SUM('Area') / COUNT('Area') - 2 * MIN('Mean')`.
//!
//! [`evaluate`] is total over all input text: every call ends in
//! [`EvalOutcome::Empty`], [`EvalOutcome::Value`] or
//! [`EvalOutcome::Diagnostic`]. It touches nothing but its arguments and only
//! reads from the column provider, so concurrent or abandoned evaluations
//! cannot leave shared state behind.

use std::fmt;

use sx_columnar::ColumnProvider;
use sx_types::{Token, render_number};
use thiserror::Error;

pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use diagnostics::{ReferenceString, render_error};
pub use lexer::{TokenizeError, tokenize};
pub use parser::{MAX_DEPTH, ParseError, ParseErrorKind, TokenQueue, parse_complete, parse_expr};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A failed evaluation: the structured error and its rendered report.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub error: EvalError,
    pub rendered: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    /// The text held no tokens.
    Empty,
    Value(f64),
    Diagnostic(Diagnostic),
}

impl EvalOutcome {
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(*value),
            Self::Empty | Self::Diagnostic(_) => None,
        }
    }

    /// Only a numeric outcome counts as a usable result.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Diagnostic(diagnostic) => Some(diagnostic),
            Self::Empty | Self::Value(_) => None,
        }
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Value(_) => "value",
            Self::Diagnostic(_) => "diagnostic",
        }
    }
}

/// Feedback text: nothing for `Empty`, the number, or the diagnostic report.
impl fmt::Display for EvalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Value(value) => f.write_str(&render_number(*value)),
            Self::Diagnostic(diagnostic) => fmt::Display::fmt(diagnostic, f),
        }
    }
}

/// Tokenize, parse and evaluate `text` against `columns`.
///
/// `columns` is `None` when no results table exists at all; expressions
/// without aggregators still evaluate in that case.
#[must_use]
pub fn evaluate(text: &str, columns: Option<&dyn ColumnProvider>) -> EvalOutcome {
    let outcome = evaluate_tokens(text, columns);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "sx_expr",
        outcome = outcome.kind_label(),
        value = ?outcome.value(),
        "evaluated expression"
    );
    outcome
}

fn evaluate_tokens(text: &str, columns: Option<&dyn ColumnProvider>) -> EvalOutcome {
    let tokens = match tokenize(text) {
        Ok(tokens) => tokens,
        Err(err) => {
            let rendered = err.to_string();
            return EvalOutcome::Diagnostic(Diagnostic {
                error: err.into(),
                rendered,
            });
        }
    };
    if tokens.is_empty() {
        return EvalOutcome::Empty;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(target: "sx_expr", token_count = tokens.len(), "tokenized expression");

    // Two views of one tokenization: the reference keeps its own copy for
    // caret placement while the parser drains the queue.
    let reference = ReferenceString::new(tokens.clone());
    let mut queue: TokenQueue = tokens.into_iter().collect();

    match parse_complete(&mut queue, columns) {
        Ok(value) => EvalOutcome::Value(value),
        Err(err) => {
            let rendered = render_error(&reference, err.remaining, &err.to_string());
            EvalOutcome::Diagnostic(Diagnostic {
                error: err.into(),
                rendered,
            })
        }
    }
}

/// Canonical re-serialization of `text`, or `None` if it does not tokenize.
#[must_use]
pub fn normalize(text: &str) -> Option<String> {
    let tokens = tokenize(text).ok()?;
    Some(
        tokens
            .iter()
            .map(Token::render)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

#[cfg(test)]
mod tests {
    use sx_columnar::ResultsTable;

    use super::{EvalError, EvalOutcome, ParseErrorKind, TokenizeError, evaluate, normalize};

    fn table() -> ResultsTable {
        ResultsTable::new()
            .with_column("x", vec![1.0, 2.0, 3.0, 4.0])
            .expect("x")
            .with_column("empty", Vec::new())
            .expect("empty")
    }

    #[test]
    fn blank_text_is_empty_not_an_error() {
        assert_eq!(evaluate("   ", None), EvalOutcome::Empty);
        assert_eq!(evaluate("/* only a comment */", None), EvalOutcome::Empty);
        assert_eq!(evaluate("", None).to_string(), "");
    }

    #[test]
    fn arithmetic_without_table() {
        assert_eq!(evaluate("2 * (3 + 4)", None).value(), Some(14.0));
        assert_eq!(evaluate("-(-5)", None).value(), Some(5.0));
        assert_eq!(evaluate("10 - 4 - 1", None).value(), Some(7.0));
    }

    #[test]
    fn tokenize_failure_renders_message_only() {
        let outcome = evaluate("1 $ 2", None);
        let diagnostic = outcome.diagnostic().expect("diagnostic");
        assert_eq!(
            diagnostic.error,
            EvalError::Tokenize(TokenizeError::InvalidCharacter('$'))
        );
        assert_eq!(diagnostic.rendered, "invalid character: $");
        assert!(!outcome.is_valid());
    }

    #[test]
    fn parse_failure_renders_caret_report() {
        let table = table();
        let outcome = evaluate("SUM('nope')", Some(&table));
        let diagnostic = outcome.diagnostic().expect("diagnostic");
        match &diagnostic.error {
            EvalError::Parse(err) => {
                assert_eq!(err.kind, ParseErrorKind::ColumnNotFound("nope".to_owned()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            diagnostic.rendered,
            "sum ( 'nope' )\n      ^\ncolumn not found: nope"
        );
    }

    #[test]
    fn value_display_keeps_float_shape() {
        let table = table();
        assert_eq!(evaluate("COUNT('x')", Some(&table)).to_string(), "4.0");
        assert_eq!(evaluate("AVERAGE('empty')", Some(&table)).to_string(), "NaN");
    }

    #[test]
    fn normalize_reserializes_canonically() {
        assert_eq!(
            normalize("sum('x')/COUNT ( 'x' ) // mean").as_deref(),
            Some("sum ( 'x' ) / count ( 'x' )")
        );
        assert_eq!(normalize("1 ? 2"), None);
    }
}
