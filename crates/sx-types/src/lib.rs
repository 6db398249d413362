#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delimiter wrapped around column identifiers, both in source text and in
/// the canonical rendering.
pub const QUOTE_CHAR: char = '\'';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregatorKind {
    Sum,
    Count,
    Average,
    Product,
    Min,
    Max,
}

impl AggregatorKind {
    /// Declaration order; this is also the order offered to expression editors.
    pub const ALL: [Self; 6] = [
        Self::Sum,
        Self::Count,
        Self::Average,
        Self::Product,
        Self::Min,
        Self::Max,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Count => "COUNT",
            Self::Average => "AVERAGE",
            Self::Product => "PRODUCT",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }

    /// Case-insensitive lookup; the word is normalized to uppercase first.
    #[must_use]
    pub fn from_name(word: &str) -> Option<Self> {
        let upper = word.to_ascii_uppercase();
        Self::ALL.into_iter().find(|kind| kind.name() == upper)
    }

    /// Lowercase spelling used when re-serializing a token stream.
    #[must_use]
    pub fn canonical(self) -> String {
        self.name().to_ascii_lowercase()
    }
}

impl fmt::Display for AggregatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregatorKind {
    type Err = TypeError;

    fn from_str(word: &str) -> Result<Self, Self::Err> {
        Self::from_name(word).ok_or_else(|| TypeError::UnknownAggregator(word.to_owned()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown aggregator: {0}")]
    UnknownAggregator(String),
}

/// Payload-free discriminator of [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Literal,
    OpPlus,
    OpMinus,
    OpMult,
    OpDiv,
    LParen,
    RParen,
    Aggregator,
    ColumnId,
}

impl TokenKind {
    /// The fixed source character of the operator and parenthesis kinds.
    #[must_use]
    pub const fn assoc_char(self) -> Option<char> {
        match self {
            Self::OpPlus => Some('+'),
            Self::OpMinus => Some('-'),
            Self::OpMult => Some('*'),
            Self::OpDiv => Some('/'),
            Self::LParen => Some('('),
            Self::RParen => Some(')'),
            Self::Literal | Self::Aggregator | Self::ColumnId => None,
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::OpPlus),
            '-' => Some(Self::OpMinus),
            '*' => Some(Self::OpMult),
            '/' => Some(Self::OpDiv),
            '(' => Some(Self::LParen),
            ')' => Some(Self::RParen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Token {
    Literal(f64),
    OpPlus,
    OpMinus,
    OpMult,
    OpDiv,
    LParen,
    RParen,
    Aggregator(AggregatorKind),
    ColumnId(String),
}

impl Token {
    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Literal(_) => TokenKind::Literal,
            Self::OpPlus => TokenKind::OpPlus,
            Self::OpMinus => TokenKind::OpMinus,
            Self::OpMult => TokenKind::OpMult,
            Self::OpDiv => TokenKind::OpDiv,
            Self::LParen => TokenKind::LParen,
            Self::RParen => TokenKind::RParen,
            Self::Aggregator(_) => TokenKind::Aggregator,
            Self::ColumnId(_) => TokenKind::ColumnId,
        }
    }

    /// Build the payload-free token for an operator or parenthesis character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        let token = match TokenKind::from_char(c)? {
            TokenKind::OpPlus => Self::OpPlus,
            TokenKind::OpMinus => Self::OpMinus,
            TokenKind::OpMult => Self::OpMult,
            TokenKind::OpDiv => Self::OpDiv,
            TokenKind::LParen => Self::LParen,
            TokenKind::RParen => Self::RParen,
            TokenKind::Literal | TokenKind::Aggregator | TokenKind::ColumnId => return None,
        };
        Some(token)
    }

    /// Canonical text of this token, used for re-serialization and diagnostics.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Literal(value) => render_number(*value),
            Self::Aggregator(kind) => kind.canonical(),
            Self::ColumnId(name) => column_expr(name),
            other => other
                .kind()
                .assoc_char()
                .map(String::from)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Wrap a column name in the identifier quote, e.g. `Area` -> `'Area'`.
#[must_use]
pub fn column_expr(name: &str) -> String {
    format!("{QUOTE_CHAR}{name}{QUOTE_CHAR}")
}

/// Decimal text for a number: `2.0`, `0.5`, `1e20`, `NaN`, `inf`.
///
/// Integral values keep a trailing `.0` so the text always reads back as a
/// float literal.
#[must_use]
pub fn render_number(value: f64) -> String {
    format!("{value:?}")
}
