use sx_types::{AggregatorKind, QUOTE_CHAR, Token};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("invalid character: {0}")]
    InvalidCharacter(char),
    #[error("unknown command: {0}")]
    UnknownIdentifier(String),
    #[error("unterminated column name: '{0}")]
    UnterminatedColumnId(String),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
}

/// Split expression text into tokens.
///
/// Whitespace and `//` / `/* */` comments separate tokens and are otherwise
/// dropped. Blank input yields an empty vector, not an error.
pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizeError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        let next = chars.get(i + 1).copied();
        match c {
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                i += 2;
                // An unclosed block comment runs to the end of the input.
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            QUOTE_CHAR => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != QUOTE_CHAR {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                if i >= chars.len() {
                    return Err(TokenizeError::UnterminatedColumnId(name));
                }
                tokens.push(Token::ColumnId(name));
                i += 1; // skip closing quote
            }
            _ if c.is_ascii_digit()
                || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) =>
            {
                let (value, end) = lex_number(&chars, i)?;
                tokens.push(Token::Literal(value));
                i = end;
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let kind = AggregatorKind::from_name(&word)
                    .ok_or(TokenizeError::UnknownIdentifier(word))?;
                tokens.push(Token::Aggregator(kind));
            }
            _ => {
                let token = Token::from_char(c).ok_or(TokenizeError::InvalidCharacter(c))?;
                tokens.push(token);
                i += 1;
            }
        }
    }
    Ok(tokens)
}

/// Scan `digits [. digits] [(e|E) [+|-] digits]` starting at `start`.
///
/// Literals that overflow to infinity are rejected.
///
/// The exponent is only taken when at least one digit follows it, so `2e`
/// lexes as the literal `2` followed by the word `e`.
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), TokenizeError> {
    let digits_from = |mut i: usize| {
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = digits_from(start);
    if chars.get(i) == Some(&'.') {
        i = digits_from(i + 1);
    }
    if matches!(chars.get(i), Some('e' | 'E')) {
        let mut j = i + 1;
        if matches!(chars.get(j), Some('+' | '-')) {
            j += 1;
        }
        if chars.get(j).is_some_and(char::is_ascii_digit) {
            i = digits_from(j);
        }
    }

    let text: String = chars[start..i].iter().collect();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok((value, i)),
        _ => Err(TokenizeError::InvalidNumber(text)),
    }
}
