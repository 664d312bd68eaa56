//! Tokenization of expression source using `nom`.
//!
//! Two modes exist. Plain mode reads a single expression. String mode
//! reads literal text in which `{...}` blocks embed expressions and
//! `\{`, `\}` and `\\` escape the literal characters.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{opt, recognize, value},
};

use crate::error::ExprParseError;
use crate::token::{Operator, Token, TokenKind};

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '~'
}

/// Marker failure for a quote that never closes.
fn unterminated(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}

/// Parses a single- or double-quoted string literal.
fn string_literal(input: &str) -> IResult<&str, TokenKind> {
    let (input, quote) = alt((char('\''), char('"'))).parse(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices();
    loop {
        match chars.next() {
            Some((idx, c)) if c == quote => {
                return Ok((&input[idx + c.len_utf8()..], TokenKind::String(result)));
            }
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, c @ ('\\' | '\'' | '"'))) => result.push(c),
                Some((_, c)) => {
                    result.push('\\');
                    result.push(c);
                }
                None => return Err(unterminated(input)),
            },
            Some((_, c)) => result.push(c),
            None => return Err(unterminated(input)),
        }
    }
}

/// Parses an unsigned decimal literal. Sign is handled by the parser.
fn number_literal(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) = recognize((digit1, opt((char('.'), digit1)))).parse(input)?;
    let number: f64 = text.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((rest, TokenKind::Number(number)))
}

/// Parses a keyword or identifier.
fn word(input: &str) -> IResult<&str, TokenKind> {
    let (rest, word) = take_while1(is_word_char)(input)?;
    let kind = match word {
        "true" => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        "nil" => TokenKind::Nil,
        "and" | "AND" => TokenKind::Operator(Operator::And),
        "or" | "OR" => TokenKind::Operator(Operator::Or),
        _ => TokenKind::Identifier(word.to_string()),
    };
    Ok((rest, kind))
}

fn operator(input: &str) -> IResult<&str, TokenKind> {
    let op = TokenKind::Operator;
    alt((
        value(op(Operator::NotEquals), tag("!=")),
        value(op(Operator::GreaterThanOrEqual), tag(">=")),
        value(op(Operator::LessThanOrEqual), tag("<=")),
        value(TokenKind::Negation, char('!')),
        value(op(Operator::ConditionStart), char('?')),
        value(op(Operator::ConditionElse), char(':')),
        value(op(Operator::Equals), char('=')),
        value(op(Operator::GreaterThan), char('>')),
        value(op(Operator::LessThan), char('<')),
        value(op(Operator::Plus), char('+')),
        value(op(Operator::Minus), char('-')),
        value(op(Operator::Multiply), char('*')),
        value(op(Operator::Divide), char('/')),
    ))
    .parse(input)
}

fn punctuation(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::ParensOpen, char('(')),
        value(TokenKind::ParensClose, char(')')),
        value(TokenKind::BracketOpen, char('[')),
        value(TokenKind::BracketClose, char(']')),
        value(TokenKind::CurlyBracketOpen, char('{')),
        value(TokenKind::CurlyBracketClose, char('}')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::Period, char('.')),
    ))
    .parse(input)
}

fn skip_whitespace(input: &str) -> &str {
    multispace0::<_, nom::error::Error<&str>>(input).map_or(input, |(rest, _)| rest)
}

fn single_token(input: &str) -> IResult<&str, TokenKind> {
    alt((string_literal, number_literal, word, operator, punctuation)).parse(input)
}

struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// 1-based character column of `rest` within the source.
    fn column(&self, rest: &str) -> usize {
        self.source[..self.source.len() - rest.len()].chars().count() + 1
    }

    fn push(&mut self, kind: TokenKind, at: &str) {
        let column = self.column(at);
        self.tokens.push(Token::new(kind, column));
    }

    /// Lexes expression tokens. When `embedded`, stops before an
    /// unmatched `}` and returns the input starting at it.
    fn expression(&mut self, mut remaining: &'a str, embedded: bool) -> Result<&'a str, ExprParseError> {
        let mut depth = 0usize;
        loop {
            remaining = skip_whitespace(remaining);
            if remaining.is_empty() {
                return Ok(remaining);
            }
            if embedded && depth == 0 && remaining.starts_with('}') {
                return Ok(remaining);
            }
            match single_token(remaining) {
                Ok((rest, kind)) => {
                    match kind {
                        TokenKind::CurlyBracketOpen => depth += 1,
                        TokenKind::CurlyBracketClose => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    self.push(kind, remaining);
                    remaining = rest;
                }
                Err(nom::Err::Failure(_)) => {
                    let quote = remaining.chars().next().unwrap_or('"');
                    let column = self.column(remaining);
                    return Err(ExprParseError::MissingQuoteClose(Token::new(
                        TokenKind::Other(quote.to_string()),
                        column,
                    )));
                }
                Err(_) => {
                    let c = remaining.chars().next().unwrap_or_default();
                    self.push(TokenKind::Other(c.to_string()), remaining);
                    remaining = &remaining[c.len_utf8()..];
                }
            }
        }
    }

    /// Lexes interpolated text.
    fn string_mode(&mut self, mut remaining: &'a str) -> Result<(), ExprParseError> {
        let mut text = String::new();
        let mut text_start = remaining;
        while let Some(c) = remaining.chars().next() {
            let after = &remaining[c.len_utf8()..];
            match c {
                '\\' => {
                    match after.chars().next() {
                        Some(escaped @ ('{' | '}' | '\\')) => {
                            text.push(escaped);
                            remaining = &after[1..];
                        }
                        _ => {
                            text.push('\\');
                            remaining = after;
                        }
                    }
                    continue;
                }
                '{' => {
                    if !text.is_empty() {
                        self.push(TokenKind::String(std::mem::take(&mut text)), text_start);
                    }
                    self.push(TokenKind::CurlyBracketOpen, remaining);
                    remaining = self.expression(after, true)?;
                    if let Some(rest) = remaining.strip_prefix('}') {
                        self.push(TokenKind::CurlyBracketClose, remaining);
                        remaining = rest;
                    }
                    text_start = remaining;
                    continue;
                }
                _ => text.push(c),
            }
            remaining = after;
        }
        if !text.is_empty() {
            self.push(TokenKind::String(text), text_start);
        }
        Ok(())
    }
}

/// Tokenizes expression source, appending an end-of-input token.
///
/// # Errors
///
/// Returns [`ExprParseError::MissingQuoteClose`] for an unterminated
/// string literal. Unknown characters become [`TokenKind::Other`] tokens
/// and are reported by the parser.
pub fn tokenize(input: &str, string_mode: bool) -> Result<Vec<Token>, ExprParseError> {
    let mut lexer = Lexer {
        source: input,
        tokens: Vec::new(),
    };
    if string_mode {
        lexer.string_mode(input)?;
    } else {
        let _ = lexer.expression(input, false)?;
    }
    let end = input.chars().count() + 1;
    lexer.tokens.push(Token::new(TokenKind::Eof, end));
    Ok(lexer.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str, string_mode: bool) -> Vec<TokenKind> {
        tokenize(input, string_mode)
            .expect("should tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenize_arithmetic() {
        assert_eq!(
            kinds("5 + 10 * 2", false),
            vec![
                TokenKind::Number(5.0),
                TokenKind::Operator(Operator::Plus),
                TokenKind::Number(10.0),
                TokenKind::Operator(Operator::Multiply),
                TokenKind::Number(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_keywords_in_both_cases() {
        assert_eq!(
            kinds("true AND nil or false", false),
            vec![
                TokenKind::Bool(true),
                TokenKind::Operator(Operator::And),
                TokenKind::Nil,
                TokenKind::Operator(Operator::Or),
                TokenKind::Bool(false),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_two_char_operators_first() {
        assert_eq!(
            kinds("a != b >= c <= d", false)[1],
            TokenKind::Operator(Operator::NotEquals)
        );
        assert_eq!(kinds("!a", false)[0], TokenKind::Negation);
    }

    #[test]
    fn tokenize_prefixed_identifiers() {
        assert_eq!(
            kinds("_~friend.~tag", false),
            vec![
                TokenKind::Identifier("_~friend".into()),
                TokenKind::Period,
                TokenKind::Identifier("~tag".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn columns_are_one_based() {
        let tokens = tokenize("ab + 1", false).expect("should tokenize");
        let columns: Vec<usize> = tokens.iter().map(|t| t.column).collect();
        assert_eq!(columns, vec![1, 4, 6, 7]);
    }

    #[test]
    fn quoted_strings_unescape() {
        assert_eq!(
            kinds(r#"'it\'s' "a\"b""#, false),
            vec![
                TokenKind::String("it's".into()),
                TokenKind::String("a\"b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("'abc", false).expect_err("should fail");
        assert!(matches!(err, ExprParseError::MissingQuoteClose(ref t) if t.column == 1));
    }

    #[test]
    fn unknown_character_becomes_other() {
        assert_eq!(kinds("#", false)[0], TokenKind::Other("#".into()));
    }

    #[test]
    fn string_mode_splits_text_and_blocks() {
        assert_eq!(
            kinds("Hello {name}!", true),
            vec![
                TokenKind::String("Hello ".into()),
                TokenKind::CurlyBracketOpen,
                TokenKind::Identifier("name".into()),
                TokenKind::CurlyBracketClose,
                TokenKind::String("!".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_mode_escapes_braces() {
        assert_eq!(
            kinds(r"a \{b\} \\", true),
            vec![TokenKind::String(r"a {b} \".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn string_mode_unclosed_block_ends_at_eof() {
        assert_eq!(
            kinds("x {a", true),
            vec![
                TokenKind::String("x ".into()),
                TokenKind::CurlyBracketOpen,
                TokenKind::Identifier("a".into()),
                TokenKind::Eof,
            ]
        );
    }
}
