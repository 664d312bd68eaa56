//! CVU definition parser built on `nom`.
//!
//! Transforms raw CVU text into [`ParsedDefinition`] trees through lexing
//! and recursive-descent parsing. Semantic checks live in [`validator`]
//! and never block parsing.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod validator;

use std::sync::Arc;

use cvu_common::types::Position;
use cvu_expr::Expression;
use tracing::warn;

use self::ast::{DefinitionKind, ParsedDefinition, Properties, PropertyValue, UiElement};
use self::error::CvuParseError;
use self::lexer::{Token, TokenKind};

type Result<T> = std::result::Result<T, CvuParseError>;

/// What a `{ ... }` body may contain besides properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyContext {
    /// A definition: elements and nested `[...]` definitions.
    Definition,
    /// A UI element or nested object: elements only.
    Element,
}

/// Contents of one `{ ... }` body.
#[derive(Default)]
struct Body {
    properties: Properties,
    children: Vec<UiElement>,
    definitions: Vec<Arc<ParsedDefinition>>,
}

/// Cursor into a token stream for recursive-descent parsing.
struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// The token at the cursor; the final EOF token once exhausted.
    fn peek(&self) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &'a TokenKind {
        &self.peek().kind
    }

    /// The token after the cursor.
    fn peek_next(&self) -> &'a TokenKind {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + 1).min(last)].kind
    }

    fn advance(&mut self) -> &'a Token {
        let tok = self.peek();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect_char(&mut self, expected: &TokenKind, c: char) -> Result<()> {
        let tok = self.advance();
        if &tok.kind == expected {
            Ok(())
        } else {
            Err(CvuParseError::ExpectedCharacter(c, tok.clone()))
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline) {
            let _ = self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::SemiColon | TokenKind::Comma
        ) {
            let _ = self.advance();
        }
    }

    /// Returns `true` when a capitalized identifier, optionally followed by
    /// `:`, opens a `{` block: the shape of a UI element.
    fn at_element(&self) -> bool {
        let TokenKind::Identifier(name) = self.peek_kind() else {
            return false;
        };
        if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return false;
        }
        match self.peek_next() {
            TokenKind::CurlyBracketOpen => true,
            TokenKind::Colon => {
                let after = (self.pos + 2).min(self.tokens.len().saturating_sub(1));
                matches!(self.tokens[after].kind, TokenKind::CurlyBracketOpen)
            }
            _ => false,
        }
    }
}

/// Parses CVU source into its top-level definitions.
///
/// # Errors
///
/// Returns the first lexical or syntax error, carrying the offending
/// token or position.
pub fn parse_cvu(input: &str) -> Result<Vec<ParsedDefinition>> {
    tracing::info!(bytes = input.len(), "parsing CVU input");
    let tokens = lexer::tokenize(input)?;
    let mut cursor = TokenCursor::new(&tokens);
    let mut definitions = Vec::new();

    loop {
        cursor.skip_separators();
        if matches!(cursor.peek_kind(), TokenKind::Eof) {
            break;
        }
        definitions.push(parse_definition(&mut cursor)?);
    }

    Ok(definitions)
}

fn parse_definition(cursor: &mut TokenCursor<'_>) -> Result<ParsedDefinition> {
    let mut definition = parse_header(cursor)?;
    cursor.skip_newlines();
    cursor.expect_char(&TokenKind::CurlyBracketOpen, '{')?;
    let body = parse_body(cursor, BodyContext::Definition)?;
    definition.properties = body.properties;
    definition.children = body.children;
    definition.definitions = body.definitions;
    Ok(definition)
}

fn parse_header(cursor: &mut TokenCursor<'_>) -> Result<ParsedDefinition> {
    let tok = cursor.advance();
    match &tok.kind {
        TokenKind::BracketOpen => {
            let kind_tok = cursor.advance();
            let TokenKind::Identifier(keyword) = &kind_tok.kind else {
                return Err(CvuParseError::ExpectedIdentifier(kind_tok.clone()));
            };
            let kind = DefinitionKind::from_keyword(keyword)
                .ok_or_else(|| CvuParseError::UnknownDefinition(kind_tok.clone()))?;
            let selector = if matches!(cursor.peek_kind(), TokenKind::Equals) {
                let _ = cursor.advance();
                let name_tok = cursor.advance();
                match &name_tok.kind {
                    TokenKind::String(s) | TokenKind::Identifier(s) => Some(s.clone()),
                    _ => return Err(CvuParseError::ExpectedString(name_tok.clone())),
                }
            } else {
                None
            };
            cursor.expect_char(&TokenKind::BracketClose, ']')?;
            Ok(ParsedDefinition::new(kind, selector))
        }
        TokenKind::NamedIdentifier(name) => Ok(ParsedDefinition::new(
            DefinitionKind::Named,
            Some(name.clone()),
        )),
        TokenKind::Identifier(type_name) => {
            let kind = if matches!(cursor.peek_kind(), TokenKind::BracketOpen) {
                let _ = cursor.advance();
                cursor.expect_char(&TokenKind::BracketClose, ']')?;
                DefinitionKind::ListView
            } else {
                DefinitionKind::TypeView
            };
            Ok(ParsedDefinition::new(kind, Some(type_name.clone())))
        }
        _ => Err(CvuParseError::UnexpectedToken(tok.clone())),
    }
}

/// Parses a body after its opening `{`, through the closing `}`.
fn parse_body(cursor: &mut TokenCursor<'_>, context: BodyContext) -> Result<Body> {
    let mut body = Body::default();

    loop {
        cursor.skip_separators();
        let tok = cursor.peek();
        match &tok.kind {
            TokenKind::CurlyBracketClose => {
                let _ = cursor.advance();
                return Ok(body);
            }
            TokenKind::Eof => return Err(CvuParseError::UnexpectedToken(tok.clone())),
            TokenKind::BracketOpen if context == BodyContext::Definition => {
                body.definitions.push(Arc::new(parse_definition(cursor)?));
            }
            TokenKind::Identifier(_) if cursor.at_element() => {
                body.children.push(parse_element(cursor)?);
            }
            TokenKind::Identifier(key) | TokenKind::String(key) => {
                let _ = cursor.advance();
                let value = parse_property_value(cursor)?;
                insert_property(&mut body.properties, key, value, tok.position);
            }
            _ => return Err(CvuParseError::ExpectedKey(tok.clone())),
        }
    }
}

fn insert_property(properties: &mut Properties, key: &str, value: PropertyValue, at: Position) {
    if properties.insert(key.to_string(), value).is_some() {
        warn!(key, position = %at, "duplicate property replaces earlier value");
    }
}

fn parse_element(cursor: &mut TokenCursor<'_>) -> Result<UiElement> {
    let tok = cursor.advance();
    let TokenKind::Identifier(kind) = &tok.kind else {
        return Err(CvuParseError::ExpectedIdentifier(tok.clone()));
    };
    if matches!(cursor.peek_kind(), TokenKind::Colon) {
        let _ = cursor.advance();
    }
    cursor.expect_char(&TokenKind::CurlyBracketOpen, '{')?;
    let body = parse_body(cursor, BodyContext::Element)?;
    Ok(UiElement {
        kind: kind.clone(),
        properties: body.properties,
        children: body.children,
    })
}

const fn is_terminator(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Newline
            | TokenKind::SemiColon
            | TokenKind::Comma
            | TokenKind::CurlyBracketClose
            | TokenKind::Eof
    )
}

/// Parses what follows a key: `: value...` or a directly attached `{`.
/// Several values on one line form an array.
fn parse_property_value(cursor: &mut TokenCursor<'_>) -> Result<PropertyValue> {
    match cursor.peek_kind() {
        TokenKind::Colon => {
            let _ = cursor.advance();
            cursor.skip_newlines();
        }
        TokenKind::CurlyBracketOpen => {}
        _ => return Err(CvuParseError::ExpectedCharacter(':', cursor.peek().clone())),
    }

    let mut values = Vec::new();
    while !is_terminator(cursor.peek_kind()) {
        values.push(parse_value(cursor)?);
    }
    match values.len() {
        0 => Err(CvuParseError::UnexpectedToken(cursor.peek().clone())),
        1 => Ok(values.remove(0)),
        _ => Ok(PropertyValue::Array(values)),
    }
}

fn parse_value(cursor: &mut TokenCursor<'_>) -> Result<PropertyValue> {
    let tok = cursor.advance();
    let value = match &tok.kind {
        TokenKind::String(s) => PropertyValue::String(s.clone()),
        TokenKind::StringExpression(code) => {
            PropertyValue::Expression(Expression::string_mode(code.clone()))
        }
        TokenKind::Expression(code) => PropertyValue::Expression(Expression::new(code.clone())),
        TokenKind::Number(n) => PropertyValue::Number(*n),
        TokenKind::Bool(b) => PropertyValue::Bool(*b),
        TokenKind::Nil => PropertyValue::Nil,
        TokenKind::Color(c) => PropertyValue::Color(c.clone()),
        // A reference to a named view keeps its dot.
        TokenKind::NamedIdentifier(name) => PropertyValue::String(format!(".{name}")),
        TokenKind::CurlyBracketOpen => parse_object(cursor, None)?,
        TokenKind::BracketOpen => parse_array(cursor)?,
        TokenKind::Identifier(name) => {
            if matches!(cursor.peek_kind(), TokenKind::CurlyBracketOpen) {
                let _ = cursor.advance();
                parse_object(cursor, Some(name.clone()))?
            } else {
                PropertyValue::String(name.clone())
            }
        }
        _ => return Err(CvuParseError::UnexpectedToken(tok.clone())),
    };
    Ok(value)
}

/// Parses an object body after its opening `{`.
fn parse_object(cursor: &mut TokenCursor<'_>, name: Option<String>) -> Result<PropertyValue> {
    let body = parse_body(cursor, BodyContext::Element)?;
    let mut object = ParsedDefinition::new(DefinitionKind::Object, name);
    object.properties = body.properties;
    object.children = body.children;
    Ok(PropertyValue::Object(Box::new(object)))
}

/// Parses array items after the opening `[`, through the closing `]`.
fn parse_array(cursor: &mut TokenCursor<'_>) -> Result<PropertyValue> {
    let mut items = Vec::new();
    loop {
        while matches!(cursor.peek_kind(), TokenKind::Newline | TokenKind::Comma) {
            let _ = cursor.advance();
        }
        match cursor.peek_kind() {
            TokenKind::BracketClose => {
                let _ = cursor.advance();
                return Ok(PropertyValue::Array(items));
            }
            TokenKind::Eof => return Err(CvuParseError::UnexpectedToken(cursor.peek().clone())),
            _ => items.push(parse_value(cursor)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> ParsedDefinition {
        let mut defs = parse_cvu(input).expect("should parse");
        assert_eq!(defs.len(), 1, "expected one definition");
        defs.remove(0)
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_cvu("").expect("should parse").is_empty());
        assert!(parse_cvu("\n/* only a comment */\n").expect("should parse").is_empty());
    }

    #[test]
    fn parse_color_definition() {
        let def = parse_one("[color = background] {\n    light: #330000\n    dark: #ff0000\n}");
        assert_eq!(def.kind, DefinitionKind::Color);
        assert_eq!(def.selector.as_deref(), Some("background"));
        assert_eq!(def.get("light"), Some(&PropertyValue::Color("#330000".into())));
        assert!(def.domain.is_none());
    }

    #[test]
    fn parse_quoted_selector() {
        let def = parse_one("[renderer = \"thumbnail.grid\"] {}");
        assert_eq!(def.kind, DefinitionKind::Renderer);
        assert_eq!(def.selector.as_deref(), Some("thumbnail.grid"));
    }

    #[test]
    fn parse_header_forms() {
        let defs = parse_cvu(".all {}\nPerson {}\nPerson[] {}\n*[] {}\n[sessions] {}")
            .expect("should parse");
        let kinds: Vec<DefinitionKind> = defs.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DefinitionKind::Named,
                DefinitionKind::TypeView,
                DefinitionKind::ListView,
                DefinitionKind::ListView,
                DefinitionKind::Sessions,
            ]
        );
        assert_eq!(defs[3].selector.as_deref(), Some("*"));
        assert!(defs[4].selector.is_none());
    }

    #[test]
    fn parse_scalars_and_separators() {
        let def = parse_one("Note { title: \"Notes\"; count: 3, visible: true\n empty: nil }");
        assert_eq!(def.get("title"), Some(&PropertyValue::from("Notes")));
        assert_eq!(def.get("count"), Some(&PropertyValue::Number(3.0)));
        assert_eq!(def.get("visible"), Some(&PropertyValue::Bool(true)));
        assert_eq!(def.get("empty"), Some(&PropertyValue::Nil));
    }

    #[test]
    fn parse_multi_value_shorthand() {
        let def = parse_one("Note { padding: 1 2 3 4 }");
        assert_eq!(
            def.get("padding"),
            Some(&PropertyValue::Array(vec![
                PropertyValue::Number(1.0),
                PropertyValue::Number(2.0),
                PropertyValue::Number(3.0),
                PropertyValue::Number(4.0),
            ]))
        );
    }

    #[test]
    fn parse_arrays_with_mixed_separators() {
        let def = parse_one("Note { sortFields: [title, dateModified\n  dateCreated] }");
        let Some(PropertyValue::Array(items)) = def.get("sortFields") else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn parse_json_style_body() {
        let def = parse_one("Note { \"title\": \"x\", \"nested\": { \"a\": 1, }, }");
        assert_eq!(def.get("title"), Some(&PropertyValue::from("x")));
        let nested = def.get("nested").and_then(PropertyValue::as_object).expect("object");
        assert_eq!(nested.get("a"), Some(&PropertyValue::Number(1.0)));
    }

    #[test]
    fn parse_named_objects_in_arrays() {
        let def = parse_one(
            "Note {\n    actions: [\n        openView { view: .all }\n        star\n    ]\n}",
        );
        let Some(PropertyValue::Array(items)) = def.get("actions") else {
            panic!("expected array");
        };
        let open = items[0].as_object().expect("object");
        assert_eq!(open.selector.as_deref(), Some("openView"));
        assert_eq!(open.kind, DefinitionKind::Object);
        assert_eq!(open.get("view"), Some(&PropertyValue::from(".all")));
        assert_eq!(items[1], PropertyValue::from("star"));
    }

    #[test]
    fn named_object_value_and_colonless_object() {
        let def = parse_one("Note { onPress: delete { confirm: true }\n filter { a: 1 } }");
        assert_eq!(
            def.get("onPress")
                .and_then(PropertyValue::as_object)
                .and_then(|o| o.selector.as_deref()),
            Some("delete")
        );
        assert!(def.get("filter").and_then(PropertyValue::as_object).is_some());
    }

    #[test]
    fn parse_expressions() {
        let def = parse_one("Note { title: \"{.name}\"\n count: {{ .items.count() }} }");
        let Some(PropertyValue::Expression(title)) = def.get("title") else {
            panic!("expected expression");
        };
        assert!(title.is_string_mode());
        assert_eq!(title.code(), "{.name}");
        let Some(PropertyValue::Expression(count)) = def.get("count") else {
            panic!("expected expression");
        };
        assert!(!count.is_string_mode());
        assert_eq!(count.code(), ".items.count()");
    }

    #[test]
    fn parse_elements_and_hoisted_renderers() {
        let input = "Person {\n\
                     title: \"People\"\n\
                     [renderer = list] {\n\
                         VStack {\n\
                             spacing: 4\n\
                             Text { text: \"{.name}\" }\n\
                             Spacer: {}\n\
                         }\n\
                     }\n\
                     }";
        let def = parse_one(input);
        assert_eq!(def.definitions.len(), 1);
        let renderer = &def.definitions[0];
        assert!(renderer.is_renderer("list"));
        assert_eq!(renderer.children.len(), 1);
        let stack = &renderer.children[0];
        assert_eq!(stack.kind, "VStack");
        assert_eq!(stack.properties.get("spacing"), Some(&PropertyValue::Number(4.0)));
        let kinds: Vec<&str> = stack.children.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["Text", "Spacer"]);
    }

    #[test]
    fn repeated_key_replaces_in_place() {
        let def = parse_one("Note { a: 1\n b: 2\n a: 3 }");
        let keys: Vec<&str> = def.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(def.get("a"), Some(&PropertyValue::Number(3.0)));
    }

    #[test]
    fn newline_allowed_after_colon() {
        let def = parse_one("Note { title:\n    \"x\" }");
        assert_eq!(def.get("title"), Some(&PropertyValue::from("x")));
    }

    #[test]
    fn missing_close_brace_is_unexpected_eof() {
        let err = parse_cvu("Note {\n    a: 1\n").expect_err("should fail");
        assert!(
            matches!(err, CvuParseError::UnexpectedToken(ref t) if t.kind == TokenKind::Eof),
            "got {err:?}"
        );
    }

    #[test]
    fn unknown_definition_kind() {
        let err = parse_cvu("[widget = x] {}").expect_err("should fail");
        assert!(matches!(err, CvuParseError::UnknownDefinition(_)));
    }

    #[test]
    fn missing_bracket_in_header() {
        let err = parse_cvu("[color = x {}").expect_err("should fail");
        assert!(matches!(err, CvuParseError::ExpectedCharacter(']', _)));
    }

    #[test]
    fn selector_must_be_string_or_identifier() {
        let err = parse_cvu("[color = 5] {}").expect_err("should fail");
        assert!(matches!(err, CvuParseError::ExpectedString(_)));
    }

    #[test]
    fn key_must_be_identifier_or_string() {
        let err = parse_cvu("Note { 5: 1 }").expect_err("should fail");
        assert!(matches!(err, CvuParseError::ExpectedKey(_)));
    }

    #[test]
    fn key_needs_colon() {
        let err = parse_cvu("Note { title \"x\" }").expect_err("should fail");
        assert!(matches!(err, CvuParseError::ExpectedCharacter(':', _)));
    }

    #[test]
    fn missing_header_bracket_kind() {
        let err = parse_cvu("[= x] {}").expect_err("should fail");
        assert!(matches!(err, CvuParseError::ExpectedIdentifier(_)));
    }
}
