//! Tokenization of CVU source text using `nom`.
//!
//! Produces a position-tracked stream of [`Token`]s for the parser. Spaces,
//! tabs and `/* ... */` block comments are discarded between tokens, while
//! newlines are kept because they terminate statements.

use std::fmt;

use cvu_common::types::Position;
use cvu_expr::value::format_number;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of, satisfy},
    combinator::{map, opt, recognize, value},
    sequence::preceded,
};

use super::error::CvuParseError;

/// Longest literal prefix quoted in an unterminated-string error.
const MAX_SNIPPET_CHARS: usize = 32;

/// The kind and payload of a CVU token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare name such as `color`, `thumbnail.grid` or `*`.
    Identifier(String),
    /// A `.name` reference; the payload omits the dot.
    NamedIdentifier(String),
    /// A quoted string without interpolation.
    String(String),
    /// A quoted string containing an unescaped `{`, kept as
    /// interpolation source.
    StringExpression(String),
    /// A `{{ ... }}` expression; the payload is the trimmed inner text.
    Expression(String),
    /// A numeric literal, optionally signed.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `nil`.
    Nil,
    /// A hex color including its `#`.
    Color(String),
    /// `:`.
    Colon,
    /// `,`.
    Comma,
    /// `;`.
    SemiColon,
    /// `=`.
    Equals,
    /// `[`.
    BracketOpen,
    /// `]`.
    BracketClose,
    /// `{`.
    CurlyBracketOpen,
    /// `}`.
    CurlyBracketClose,
    /// A line break.
    Newline,
    /// End of input.
    Eof,
}

/// A token and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind and payload.
    pub kind: TokenKind,
    /// 1-based position of the first character.
    pub position: Position,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub const fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Identifier(s) => write!(f, "Identifier('{s}')"),
            TokenKind::NamedIdentifier(s) => write!(f, "NamedIdentifier('.{s}')"),
            TokenKind::String(s) => write!(f, "String('{s}')"),
            TokenKind::StringExpression(s) => write!(f, "StringExpression('{s}')"),
            TokenKind::Expression(s) => write!(f, "Expression('{s}')"),
            TokenKind::Number(n) => write!(f, "Number({})", format_number(*n)),
            TokenKind::Bool(b) => write!(f, "Bool({b})"),
            TokenKind::Nil => write!(f, "Nil"),
            TokenKind::Color(s) => write!(f, "Color('{s}')"),
            TokenKind::Colon => write!(f, "Colon"),
            TokenKind::Comma => write!(f, "Comma"),
            TokenKind::SemiColon => write!(f, "SemiColon"),
            TokenKind::Equals => write!(f, "Equals"),
            TokenKind::BracketOpen => write!(f, "BracketOpen"),
            TokenKind::BracketClose => write!(f, "BracketClose"),
            TokenKind::CurlyBracketOpen => write!(f, "CurlyBracketOpen"),
            TokenKind::CurlyBracketClose => write!(f, "CurlyBracketClose"),
            TokenKind::Newline => write!(f, "Newline"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '~'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '~'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize((satisfy(is_ident_start), take_while(is_ident_continue))).parse(input)
}

/// Parses an identifier or keyword.
fn word(input: &str) -> IResult<&str, TokenKind> {
    map(identifier, |word| match word {
        "true" => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        "nil" => TokenKind::Nil,
        _ => TokenKind::Identifier(word.to_string()),
    })
    .parse(input)
}

/// Parses a `.name` reference.
fn named_identifier(input: &str) -> IResult<&str, TokenKind> {
    map(preceded(char('.'), identifier), |name| {
        TokenKind::NamedIdentifier(name.to_string())
    })
    .parse(input)
}

/// Parses a signed decimal literal.
fn number_literal(input: &str) -> IResult<&str, TokenKind> {
    let (rest, text) =
        recognize((opt(one_of("+-")), digit1, opt((char('.'), digit1)))).parse(input)?;
    let number: f64 = text.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((rest, TokenKind::Number(number)))
}

/// Parses a punctuation token.
fn symbol(input: &str) -> IResult<&str, TokenKind> {
    alt((
        value(TokenKind::Colon, char(':')),
        value(TokenKind::Comma, char(',')),
        value(TokenKind::SemiColon, char(';')),
        value(TokenKind::Equals, char('=')),
        value(TokenKind::BracketOpen, char('[')),
        value(TokenKind::BracketClose, char(']')),
        value(TokenKind::CurlyBracketOpen, char('{')),
        value(TokenKind::CurlyBracketClose, char('}')),
        value(TokenKind::Identifier("*".to_string()), char('*')),
    ))
    .parse(input)
}

fn simple_token(input: &str) -> IResult<&str, TokenKind> {
    alt((number_literal, named_identifier, word, symbol)).parse(input)
}

/// Cooked text and interpolation source of one string literal.
struct StringBody {
    cooked: String,
    code: String,
    interpolated: bool,
    consumed: usize,
}

/// Scans a string body starting right after the opening quote.
///
/// `cooked` has every escape applied. `code` keeps `\\`, `\{` and `\}`
/// escaped so the expression lexer can tell literal braces from blocks.
fn scan_string(body: &str, quote: char) -> Option<StringBody> {
    let mut cooked = String::new();
    let mut code = String::new();
    let mut interpolated = false;
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            c if c == quote => {
                return Some(StringBody {
                    cooked,
                    code,
                    interpolated,
                    consumed: idx + c.len_utf8(),
                });
            }
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => {
                        cooked.push('\n');
                        code.push('\n');
                    }
                    't' => {
                        cooked.push('\t');
                        code.push('\t');
                    }
                    '"' | '\'' => {
                        cooked.push(escaped);
                        code.push(escaped);
                    }
                    '\\' | '{' | '}' => {
                        cooked.push(escaped);
                        code.push('\\');
                        code.push(escaped);
                    }
                    other => {
                        cooked.push('\\');
                        cooked.push(other);
                        code.push('\\');
                        code.push(other);
                    }
                }
            }
            '{' => {
                interpolated = true;
                cooked.push(c);
                code.push(c);
            }
            other => {
                cooked.push(other);
                code.push(other);
            }
        }
    }
    None
}

/// Finds the end of a `{{ ... }}` body, skipping quoted strings.
/// Returns the byte offset of the closing `}}` within `body`.
fn scan_expression(body: &str) -> Option<usize> {
    let mut chars = body.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\'' | '"' => loop {
                match chars.next()? {
                    (_, '\\') => {
                        let _ = chars.next()?;
                    }
                    (_, q) if q == c => break,
                    _ => {}
                }
            },
            '}' if body[idx..].starts_with("}}") => return Some(idx),
            _ => {}
        }
    }
    None
}

struct Lexer<'a> {
    rest: &'a str,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    const fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Advances past `len` bytes, tracking line and column.
    fn consume(&mut self, len: usize) {
        let (taken, rest) = self.rest.split_at(len);
        for c in taken.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.rest = rest;
    }

    fn push(&mut self, kind: TokenKind, position: Position) {
        self.tokens.push(Token::new(kind, position));
    }

    fn comment(&mut self, start: Position) -> Result<(), CvuParseError> {
        let end = self.rest[2..]
            .find("*/")
            .ok_or(CvuParseError::UnterminatedComment(start))?;
        self.consume(2 + end + 2);
        Ok(())
    }

    fn string(&mut self, quote: char, start: Position) -> Result<(), CvuParseError> {
        let Some(body) = scan_string(&self.rest[1..], quote) else {
            let snippet: String = self
                .rest
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(MAX_SNIPPET_CHARS)
                .collect();
            return Err(CvuParseError::MissingQuoteClose(snippet, start));
        };
        self.consume(1 + body.consumed);
        let kind = if body.interpolated {
            TokenKind::StringExpression(body.code)
        } else {
            TokenKind::String(body.cooked)
        };
        self.push(kind, start);
        Ok(())
    }

    fn expression(&mut self, start: Position) -> Result<(), CvuParseError> {
        let body = &self.rest[2..];
        let end = scan_expression(body).ok_or(CvuParseError::MissingExpressionClose(start))?;
        let code = body[..end].trim().to_string();
        self.consume(2 + end + 2);
        self.push(TokenKind::Expression(code), start);
        Ok(())
    }

    fn color(&mut self, start: Position) -> Result<(), CvuParseError> {
        let hex: IResult<&str, &str> = take_while1(|c: char| c.is_ascii_hexdigit())(&self.rest[1..]);
        let digits = hex.map_or("", |(_, digits)| digits);
        let text = format!("#{digits}");
        if !matches!(digits.len(), 3 | 4 | 6 | 8) {
            return Err(CvuParseError::InvalidColor(text, start));
        }
        self.consume(text.len());
        self.push(TokenKind::Color(text), start);
        Ok(())
    }

    fn simple(&mut self, c: char, start: Position) -> Result<(), CvuParseError> {
        let (rest, kind) = simple_token(self.rest)
            .map_err(|_| CvuParseError::UnexpectedCharacter(c, start))?;
        self.consume(self.rest.len() - rest.len());
        self.push(kind, start);
        Ok(())
    }
}

/// Tokenizes CVU source into a vector of tokens ending with [`TokenKind::Eof`].
///
/// # Errors
///
/// Returns a lexical [`CvuParseError`] carrying the position of the
/// offending character: an unclosed string, expression or comment, a
/// malformed color or a character outside the language.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CvuParseError> {
    let mut lexer = Lexer::new(input);
    while let Some(c) = lexer.rest.chars().next() {
        let start = lexer.position();
        match c {
            ' ' | '\t' | '\r' => lexer.consume(1),
            '\n' => {
                lexer.consume(1);
                lexer.push(TokenKind::Newline, start);
            }
            '/' if lexer.rest.starts_with("/*") => lexer.comment(start)?,
            '"' | '\'' => lexer.string(c, start)?,
            '{' if lexer.rest.starts_with("{{") => lexer.expression(start)?,
            '#' => lexer.color(start)?,
            _ => lexer.simple(c, start)?,
        }
    }
    let end = lexer.position();
    lexer.push(TokenKind::Eof, end);
    Ok(lexer.tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("should tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenize_definition_header() {
        assert_eq!(
            kinds("[color = background]"),
            vec![
                TokenKind::BracketOpen,
                TokenKind::Identifier("color".into()),
                TokenKind::Equals,
                TokenKind::Identifier("background".into()),
                TokenKind::BracketClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_named_and_dotted_identifiers() {
        assert_eq!(
            kinds(".defaultView thumbnail.grid"),
            vec![
                TokenKind::NamedIdentifier("defaultView".into()),
                TokenKind::Identifier("thumbnail.grid".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_wildcard_type() {
        assert_eq!(
            kinds("*[]"),
            vec![
                TokenKind::Identifier("*".into()),
                TokenKind::BracketOpen,
                TokenKind::BracketClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_signed_numbers() {
        assert_eq!(
            kinds("-5 +2.5 10"),
            vec![
                TokenKind::Number(-5.0),
                TokenKind::Number(2.5),
                TokenKind::Number(10.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_keywords() {
        assert_eq!(
            kinds("true false nil"),
            vec![
                TokenKind::Bool(true),
                TokenKind::Bool(false),
                TokenKind::Nil,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_colors() {
        assert_eq!(
            kinds("#fff #330000 #33000080"),
            vec![
                TokenKind::Color("#fff".into()),
                TokenKind::Color("#330000".into()),
                TokenKind::Color("#33000080".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn invalid_color_length() {
        let err = tokenize("color: #12345").expect_err("should fail");
        assert_eq!(
            err,
            CvuParseError::InvalidColor("#12345".into(), Position::new(1, 8))
        );
    }

    #[test]
    fn tokenize_string_with_escapes() {
        assert_eq!(
            kinds(r#""line\nnew\ttab\\slash\"quote" 'it\'s'"#),
            vec![
                TokenKind::String("line\nnew\ttab\\slash\"quote".into()),
                TokenKind::String("it's".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_with_brace_becomes_expression() {
        assert_eq!(
            kinds(r#""Hello {name}" "literal \{brace\}""#),
            vec![
                TokenKind::StringExpression("Hello {name}".into()),
                TokenKind::String("literal {brace}".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn escaped_backslash_before_brace_still_interpolates() {
        assert_eq!(
            kinds(r#""a\\{b}""#),
            vec![TokenKind::StringExpression(r"a\\{b}".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn tokenize_raw_expression() {
        assert_eq!(
            kinds("{{ .name = '}}' }}"),
            vec![TokenKind::Expression(".name = '}}'".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unclosed_expression() {
        let err = tokenize("title: {{ .name").expect_err("should fail");
        assert_eq!(err, CvuParseError::MissingExpressionClose(Position::new(1, 8)));
    }

    #[test]
    fn comments_are_skipped_across_lines() {
        assert_eq!(
            kinds("a /* one\ntwo */ b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Identifier("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_comment() {
        let err = tokenize("a\n  /* open").expect_err("should fail");
        assert_eq!(err, CvuParseError::UnterminatedComment(Position::new(2, 3)));
    }

    #[test]
    fn missing_quote_reports_opening_position() {
        let err = tokenize("x: \"abc").expect_err("should fail");
        assert_eq!(
            err,
            CvuParseError::MissingQuoteClose("\"abc".into(), Position::new(1, 4))
        );
    }

    #[test]
    fn multi_line_strings_advance_lines() {
        let tokens = tokenize("\"a\nb\" c").expect("should tokenize");
        assert_eq!(tokens[0].kind, TokenKind::String("a\nb".into()));
        assert_eq!(tokens[1].position, Position::new(2, 4));
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokenize("Person {\n    name: 1\n}").expect("should tokenize");
        let positions: Vec<Position> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 1),
                Position::new(1, 8),
                Position::new(1, 9),
                Position::new(2, 5),
                Position::new(2, 9),
                Position::new(2, 11),
                Position::new(2, 12),
                Position::new(3, 1),
                Position::new(3, 2),
            ]
        );
    }

    #[test]
    fn unexpected_character() {
        let err = tokenize("a @b").expect_err("should fail");
        assert_eq!(err, CvuParseError::UnexpectedCharacter('@', Position::new(1, 3)));
    }

    #[test]
    fn token_display() {
        let token = Token::new(TokenKind::Color("#330000".into()), Position::new(1, 1));
        assert_eq!(token.to_string(), "Color('#330000')");
        assert_eq!(
            Token::new(TokenKind::Eof, Position::new(1, 1)).to_string(),
            "EOF"
        );
    }
}
