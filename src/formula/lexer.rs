//! Tokenizer for equation strings.

use crate::error::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Number(v) => format!("number {v}"),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Plus => "`+`".into(),
            TokenKind::Minus => "`-`".into(),
            TokenKind::Star => "`*`".into(),
            TokenKind::Slash => "`/`".into(),
            TokenKind::Caret => "`^`".into(),
            TokenKind::LParen => "`(`".into(),
            TokenKind::RParen => "`)`".into(),
            TokenKind::Comma => "`,`".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

/// Splits `src` into tokens. `base` is added to every reported offset so
/// errors on the right-hand side point into the full equation string.
pub(crate) fn tokenize(src: &str, base: usize) -> Result<Vec<Token>, FormulaError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let offset = base + i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            let end = scan_number(bytes, i);
            let text = &src[i..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| FormulaError::BadNumber(text.to_string()))?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                offset,
            });
            i = end;
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(src[start..i].to_string()),
                offset,
            });
            continue;
        }

        let kind = match c {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'^' => TokenKind::Caret,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            _ => {
                let ch = src[i..].chars().next().unwrap_or('\u{fffd}');
                return Err(FormulaError::UnexpectedChar { ch, offset });
            }
        };
        tokens.push(Token { kind, offset });
        i += 1;
    }

    Ok(tokens)
}

/// Returns the end of the numeric literal starting at `start`.
///
/// An `e`/`E` is only an exponent when digits follow it (optionally after a
/// sign); otherwise it is left for the identifier scanner, so `25e` reads as
/// `25 * e`.
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, 0)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators_and_numbers() {
        assert_eq!(
            kinds("2*a - 4.5"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Star,
                TokenKind::Ident("a".into()),
                TokenKind::Minus,
                TokenKind::Number(4.5),
            ]
        );
    }

    #[test]
    fn test_exponent_only_with_digits() {
        assert_eq!(kinds("1e-3"), vec![TokenKind::Number(0.001)]);
        assert_eq!(
            kinds("25e + 1"),
            vec![
                TokenKind::Number(25.0),
                TokenKind::Ident("e".into()),
                TokenKind::Plus,
                TokenKind::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_leading_dot_number() {
        assert_eq!(kinds(".5"), vec![TokenKind::Number(0.5)]);
    }

    #[test]
    fn test_identifier_with_digits() {
        assert_eq!(kinds("x_1"), vec![TokenKind::Ident("x_1".into())]);
    }

    #[test]
    fn test_unexpected_char_reports_offset() {
        let err = tokenize("a $ b", 10).unwrap_err();
        assert_eq!(err, FormulaError::UnexpectedChar { ch: '$', offset: 12 });
    }
}
