//! Caret diagnostics for parse failures.
//!
//! The parser only knows how many tokens were still queued when it failed.
//! [`ReferenceString`] is built from an untouched copy of the token sequence
//! before parsing starts and maps every "tokens remaining" count to the
//! character column where the next token starts.

use sx_types::Token;

/// Canonical rendering of the original token sequence plus caret offsets.
///
/// Each token renders as its canonical text followed by one space; the
/// displayed text drops the final space.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceString {
    tokens: Vec<Token>,
    text: String,
    /// `offsets[k]` is the column of the token that is next when `k` remain.
    offsets: Vec<usize>,
}

impl ReferenceString {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let rendered = tokens.iter().map(Token::render).collect::<Vec<_>>();
        let total = rendered
            .iter()
            .map(|piece| piece.chars().count() + 1)
            .sum::<usize>();

        let mut offsets = Vec::with_capacity(rendered.len() + 1);
        offsets.push(total);
        let mut tail = 0;
        for piece in rendered.iter().rev() {
            tail += piece.chars().count() + 1;
            offsets.push(total - tail);
        }

        Self {
            tokens,
            text: rendered.join(" "),
            offsets,
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Caret column for a failure with `tokens_left` tokens still queued.
    ///
    /// Counts above the original length clamp to the first token.
    #[must_use]
    pub fn location(&self, tokens_left: usize) -> usize {
        let last = self.offsets.len() - 1;
        self.offsets[tokens_left.min(last)]
    }
}

/// Three-line report: reference text, caret under the failing token, message.
#[must_use]
pub fn render_error(reference: &ReferenceString, tokens_left: usize, message: &str) -> String {
    format!(
        "{}\n{}^\n{}",
        reference.text(),
        " ".repeat(reference.location(tokens_left)),
        message
    )
}
