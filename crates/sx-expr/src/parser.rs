//! Recursive-descent evaluation straight off the token queue.
//!
//!   expr   → term ( ("+" | "-") expr )?
//!   term   → factor ( ("*" | "/") term )?
//!   factor → "-" factor | NUMBER | AGGREGATOR column | "(" expr ")"
//!   column → "(" column ")" | COLUMN_ID
//!
//! Operands of a chain are collected left to right and folded from the
//! right, so chains group to the right: `10 - 4 - 1` is `10 - (4 - 1)` and
//! `8 / 4 / 2` is `8 / (4 / 2)`. Only parentheses and unary minus nest.
//!
//! The queue is consumed front to back and never rewound. It is borrowed for
//! the duration of one parse call and not retained past it.

use std::collections::VecDeque;

use sx_aggregate::reduce;
use sx_columnar::ColumnProvider;
use sx_types::Token;
use thiserror::Error;

pub type TokenQueue = VecDeque<Token>;

/// Nesting bound for parentheses and unary minus.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("you seem to be missing something here (found {0})")]
    UnexpectedToken(String),
    #[error("expecting more, but ran into the end of the expression")]
    UnexpectedEnd,
    #[error("mismatched parentheses: expected ')'")]
    MismatchedParenthesis,
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("a results table is necessary, but no results table was found")]
    NoDataSource,
    #[error("there is extra input after the end of the expression")]
    TrailingInput,
    #[error("expression nests deeper than {} levels", MAX_DEPTH)]
    NestingTooDeep,
}

/// A parse failure and the number of tokens still queued when it happened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub remaining: usize,
}

/// Parse and evaluate one `expr` from the front of `queue`.
///
/// Tokens after a complete expression are left in the queue.
pub fn parse_expr(
    queue: &mut TokenQueue,
    columns: Option<&dyn ColumnProvider>,
) -> Result<f64, ParseError> {
    Parser::new(queue, columns).expr()
}

/// Evaluate the whole queue as a single expression.
pub fn parse_complete(
    queue: &mut TokenQueue,
    columns: Option<&dyn ColumnProvider>,
) -> Result<f64, ParseError> {
    let mut parser = Parser::new(queue, columns);
    let value = parser.expr()?;
    if !parser.queue.is_empty() {
        return Err(parser.fail(ParseErrorKind::TrailingInput));
    }
    Ok(value)
}

type BinaryOp = fn(f64, f64) -> f64;

/// `first op1 v1 op2 v2 ... opN vN` as `first op1 (v1 op2 (... opN vN))`.
fn fold_right(first: f64, chain: Vec<(BinaryOp, f64)>) -> f64 {
    let mut rest = chain.into_iter().rev();
    let Some((mut op, mut acc)) = rest.next() else {
        return first;
    };
    for (left_op, value) in rest {
        acc = op(value, acc);
        op = left_op;
    }
    op(first, acc)
}

struct Parser<'q, 'c> {
    queue: &'q mut TokenQueue,
    columns: Option<&'c dyn ColumnProvider>,
    depth: usize,
}

impl<'q, 'c> Parser<'q, 'c> {
    fn new(queue: &'q mut TokenQueue, columns: Option<&'c dyn ColumnProvider>) -> Self {
        Self {
            queue,
            columns,
            depth: 0,
        }
    }

    fn fail(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            remaining: self.queue.len(),
        }
    }

    fn nested<T>(
        &mut self,
        step: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.fail(ParseErrorKind::NestingTooDeep));
        }
        self.depth += 1;
        let out = step(self);
        self.depth -= 1;
        out
    }

    fn expr(&mut self) -> Result<f64, ParseError> {
        let first = self.term()?;
        let mut chain = Vec::new();
        loop {
            let op: BinaryOp = match self.queue.front() {
                Some(Token::OpPlus) => |a: f64, b: f64| a + b,
                Some(Token::OpMinus) => |a: f64, b: f64| a - b,
                _ => break,
            };
            self.queue.pop_front();
            chain.push((op, self.term()?));
        }
        Ok(fold_right(first, chain))
    }

    fn term(&mut self) -> Result<f64, ParseError> {
        let first = self.factor()?;
        let mut chain = Vec::new();
        loop {
            let op: BinaryOp = match self.queue.front() {
                Some(Token::OpMult) => |a: f64, b: f64| a * b,
                Some(Token::OpDiv) => |a: f64, b: f64| a / b,
                _ => break,
            };
            self.queue.pop_front();
            chain.push((op, self.factor()?));
        }
        Ok(fold_right(first, chain))
    }

    fn factor(&mut self) -> Result<f64, ParseError> {
        match self.queue.front() {
            None => Err(self.fail(ParseErrorKind::UnexpectedEnd)),
            Some(Token::OpMinus) => {
                self.queue.pop_front();
                let value = self.nested(Self::factor)?;
                Ok(-value)
            }
            Some(Token::Literal(value)) => {
                let value = *value;
                self.queue.pop_front();
                Ok(value)
            }
            Some(Token::Aggregator(kind)) => {
                let kind = *kind;
                self.queue.pop_front();
                let values = self.column()?;
                Ok(reduce(kind, values))
            }
            Some(Token::LParen) => {
                self.queue.pop_front();
                let value = self.nested(Self::expr)?;
                self.close_paren()?;
                Ok(value)
            }
            Some(other) => Err(self.fail(ParseErrorKind::UnexpectedToken(other.render()))),
        }
    }

    fn column(&mut self) -> Result<&'c [f64], ParseError> {
        let Some(provider) = self.columns else {
            return Err(self.fail(ParseErrorKind::NoDataSource));
        };
        match self.queue.front() {
            None => Err(self.fail(ParseErrorKind::UnexpectedEnd)),
            Some(Token::LParen) => {
                self.queue.pop_front();
                let values = self.nested(Self::column)?;
                self.close_paren()?;
                Ok(values)
            }
            Some(Token::ColumnId(name)) => {
                let values = provider
                    .column_values(name)
                    .ok_or_else(|| self.fail(ParseErrorKind::ColumnNotFound(name.clone())))?;
                self.queue.pop_front();
                Ok(values)
            }
            Some(other) => Err(self.fail(ParseErrorKind::UnexpectedToken(other.render()))),
        }
    }

    /// Consume a `)`; anything else is left in place so the caret lands on it.
    fn close_paren(&mut self) -> Result<(), ParseError> {
        match self.queue.front() {
            Some(Token::RParen) => {
                self.queue.pop_front();
                Ok(())
            }
            _ => Err(self.fail(ParseErrorKind::MismatchedParenthesis)),
        }
    }
}

#[cfg(test)]
mod tests {
    use sx_columnar::{ColumnProvider, ResultsTable};
    use sx_types::{AggregatorKind, Token};

    use super::{MAX_DEPTH, ParseError, ParseErrorKind, TokenQueue, parse_complete, parse_expr};

    fn queue(tokens: Vec<Token>) -> TokenQueue {
        tokens.into_iter().collect()
    }

    fn table() -> ResultsTable {
        ResultsTable::new()
            .with_column("x", vec![1.0, 2.0, 3.0, 4.0])
            .expect("x")
    }

    #[test]
    fn parse_expr_stops_at_first_unusable_token() {
        let mut q = queue(vec![
            Token::Literal(1.0),
            Token::OpPlus,
            Token::Literal(2.0),
            Token::RParen,
            Token::Literal(9.0),
        ]);
        let value = parse_expr(&mut q, None).expect("prefix parses");
        assert_eq!(value, 3.0);
        assert_eq!(q.len(), 2);
        assert_eq!(q.front(), Some(&Token::RParen));
    }

    #[test]
    fn additive_chain_groups_right() {
        let mut q = queue(vec![
            Token::Literal(10.0),
            Token::OpMinus,
            Token::Literal(4.0),
            Token::OpMinus,
            Token::Literal(1.0),
        ]);
        assert_eq!(parse_complete(&mut q, None).expect("value"), 7.0);
    }

    #[test]
    fn multiplicative_chain_groups_right() {
        let mut q = queue(vec![
            Token::Literal(8.0),
            Token::OpDiv,
            Token::Literal(4.0),
            Token::OpDiv,
            Token::Literal(2.0),
        ]);
        assert_eq!(parse_complete(&mut q, None).expect("value"), 4.0);
    }

    #[test]
    fn aggregator_reads_column_through_provider() {
        let table = table();
        let provider: &dyn ColumnProvider = &table;
        let mut q = queue(vec![
            Token::Aggregator(AggregatorKind::Sum),
            Token::LParen,
            Token::ColumnId("x".to_owned()),
            Token::RParen,
        ]);
        assert_eq!(parse_complete(&mut q, Some(provider)).expect("sum"), 10.0);
        assert!(q.is_empty());
    }

    #[test]
    fn bare_column_after_aggregator_is_accepted() {
        let table = table();
        let mut q = queue(vec![
            Token::Aggregator(AggregatorKind::Max),
            Token::ColumnId("x".to_owned()),
        ]);
        assert_eq!(parse_complete(&mut q, Some(&table)).expect("max"), 4.0);
    }

    #[test]
    fn aggregator_without_provider_reports_no_data_source() {
        let mut q = queue(vec![
            Token::Aggregator(AggregatorKind::Sum),
            Token::LParen,
            Token::ColumnId("x".to_owned()),
            Token::RParen,
        ]);
        let err = parse_complete(&mut q, None).expect_err("no table");
        assert_eq!(
            err,
            ParseError {
                kind: ParseErrorKind::NoDataSource,
                remaining: 3,
            }
        );
    }

    #[test]
    fn missing_column_keeps_column_token_queued() {
        let table = table();
        let mut q = queue(vec![
            Token::Aggregator(AggregatorKind::Sum),
            Token::LParen,
            Token::ColumnId("nope".to_owned()),
            Token::RParen,
        ]);
        let err = parse_complete(&mut q, Some(&table)).expect_err("missing");
        assert_eq!(err.kind, ParseErrorKind::ColumnNotFound("nope".to_owned()));
        assert_eq!(err.remaining, 2);
    }

    #[test]
    fn unclosed_paren_reports_mismatch_at_end() {
        let mut q = queue(vec![Token::LParen, Token::Literal(1.0)]);
        let err = parse_complete(&mut q, None).expect_err("unclosed");
        assert_eq!(err.kind, ParseErrorKind::MismatchedParenthesis);
        assert_eq!(err.remaining, 0);
    }

    #[test]
    fn operator_in_factor_position_is_unexpected() {
        let mut q = queue(vec![Token::Literal(1.0), Token::OpPlus, Token::OpMult]);
        let err = parse_complete(&mut q, None).expect_err("unexpected");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken("*".to_owned()));
        assert_eq!(err.remaining, 1);
    }

    #[test]
    fn dangling_operator_reports_unexpected_end() {
        let mut q = queue(vec![Token::Literal(1.0), Token::OpMult]);
        let err = parse_complete(&mut q, None).expect_err("end");
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEnd);
        assert_eq!(err.remaining, 0);
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let mut q = queue(vec![Token::Literal(1.0), Token::Literal(2.0)]);
        let err = parse_complete(&mut q, None).expect_err("trailing");
        assert_eq!(err.kind, ParseErrorKind::TrailingInput);
        assert_eq!(err.remaining, 1);
    }

    #[test]
    fn mixed_chains_fold_from_the_right() {
        let mut q = queue(vec![
            Token::Literal(10.0),
            Token::OpMinus,
            Token::Literal(4.0),
            Token::OpPlus,
            Token::Literal(3.0),
            Token::OpMinus,
            Token::Literal(2.0),
        ]);
        assert_eq!(parse_complete(&mut q, None).expect("value"), 5.0);

        let mut q = queue(vec![
            Token::Literal(64.0),
            Token::OpDiv,
            Token::Literal(4.0),
            Token::OpMult,
            Token::Literal(2.0),
            Token::OpDiv,
            Token::Literal(8.0),
        ]);
        assert_eq!(parse_complete(&mut q, None).expect("value"), 64.0);
    }

    #[test]
    fn long_flat_chain_is_not_nesting() {
        let mut tokens = vec![Token::Literal(1.0)];
        for _ in 1..1000 {
            tokens.push(Token::OpPlus);
            tokens.push(Token::Literal(1.0));
        }
        let mut q = queue(tokens);
        assert_eq!(parse_complete(&mut q, None).expect("flat chain"), 1000.0);
    }

    #[test]
    fn runaway_nesting_is_bounded() {
        let mut tokens = vec![Token::OpMinus; MAX_DEPTH + 10];
        tokens.push(Token::Literal(1.0));
        let mut q = queue(tokens);
        let err = parse_complete(&mut q, None).expect_err("too deep");
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep);
    }

    #[test]
    fn nesting_below_the_bound_evaluates() {
        let mut tokens = vec![Token::OpMinus; 100];
        tokens.push(Token::Literal(3.0));
        let mut q = queue(tokens);
        assert_eq!(parse_complete(&mut q, None).expect("even negations"), 3.0);
    }
}
