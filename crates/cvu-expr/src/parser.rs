//! Recursive-descent parser from expression tokens to an [`ExprNode`] tree.
//!
//! Precedence, lowest first: conditional, `and`/`or`, equality,
//! relational, additive, multiplicative, unary, primary.

use cvu_common::types::Cardinality;

use crate::ast::{BinaryOp, ExprNode, Variable};
use crate::error::ExprParseError;
use crate::lexer::tokenize;
use crate::token::{Operator, Token, TokenKind};

type ParseResult<T> = Result<T, ExprParseError>;

/// Parses expression source into an AST.
///
/// In string mode the source is interpolated text and the result is
/// always an [`ExprNode::StringMode`].
///
/// # Errors
///
/// Returns an [`ExprParseError`] pointing at the first offending token.
pub fn parse(source: &str, string_mode: bool) -> ParseResult<ExprNode> {
    let tokens = tokenize(source, string_mode)?;
    let mut cursor = TokenCursor::new(tokens);
    if string_mode {
        return cursor.parse_string_mode();
    }
    let node = cursor.parse_conditional()?;
    let trailing = cursor.peek();
    if !trailing.is_eof() {
        return Err(ExprParseError::UnexpectedToken(trailing.clone()));
    }
    Ok(node)
}

struct TokenCursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenCursor {
    const fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// The token at the cursor. The lexer always ends with an EOF token,
    /// which is returned once the stream is exhausted.
    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn peek_operator(&self) -> Option<Operator> {
        match self.peek().kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    /// Consumes the expected punctuation or fails with `ExpectedCharacter`.
    fn expect_char(&mut self, kind: &TokenKind, c: char) -> ParseResult<()> {
        if self.check(kind) {
            let _ = self.advance();
            Ok(())
        } else {
            Err(ExprParseError::ExpectedCharacter(c, self.peek().clone()))
        }
    }

    fn parse_string_mode(&mut self) -> ParseResult<ExprNode> {
        let mut fragments = Vec::new();
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::String(text) => fragments.push(ExprNode::String(text)),
                TokenKind::CurlyBracketOpen => {
                    fragments.push(self.parse_conditional()?);
                    self.expect_char(&TokenKind::CurlyBracketClose, '}')?;
                }
                _ => return Err(ExprParseError::UnexpectedToken(token)),
            }
        }
        Ok(ExprNode::StringMode(fragments))
    }

    fn parse_conditional(&mut self) -> ParseResult<ExprNode> {
        let condition = self.parse_logical()?;
        if self.peek_operator() != Some(Operator::ConditionStart) {
            return Ok(condition);
        }
        let _ = self.advance();
        let on_true = self.parse_conditional()?;
        if self.peek_operator() != Some(Operator::ConditionElse) {
            return Err(ExprParseError::ExpectedConditionElse(self.peek().clone()));
        }
        let _ = self.advance();
        let on_false = self.parse_conditional()?;
        Ok(ExprNode::Condition {
            condition: Box::new(condition),
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        })
    }

    /// Parses a left-associative chain of binary operators.
    fn parse_binary(
        &mut self,
        next: fn(&mut Self) -> ParseResult<ExprNode>,
        select: fn(Operator) -> Option<BinaryOp>,
    ) -> ParseResult<ExprNode> {
        let mut lhs = next(self)?;
        while let Some(op) = self.peek_operator().and_then(select) {
            let _ = self.advance();
            let rhs = next(self)?;
            lhs = ExprNode::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_logical(&mut self) -> ParseResult<ExprNode> {
        self.parse_binary(Self::parse_equality, |op| match op {
            Operator::And => Some(BinaryOp::And),
            Operator::Or => Some(BinaryOp::Or),
            _ => None,
        })
    }

    fn parse_equality(&mut self) -> ParseResult<ExprNode> {
        self.parse_binary(Self::parse_relational, |op| match op {
            Operator::Equals => Some(BinaryOp::Equals),
            Operator::NotEquals => Some(BinaryOp::NotEquals),
            _ => None,
        })
    }

    fn parse_relational(&mut self) -> ParseResult<ExprNode> {
        self.parse_binary(Self::parse_additive, |op| match op {
            Operator::GreaterThan => Some(BinaryOp::GreaterThan),
            Operator::GreaterThanOrEqual => Some(BinaryOp::GreaterThanOrEqual),
            Operator::LessThan => Some(BinaryOp::LessThan),
            Operator::LessThanOrEqual => Some(BinaryOp::LessThanOrEqual),
            _ => None,
        })
    }

    fn parse_additive(&mut self) -> ParseResult<ExprNode> {
        self.parse_binary(Self::parse_multiplicative, |op| match op {
            Operator::Plus => Some(BinaryOp::Add),
            Operator::Minus => Some(BinaryOp::Subtract),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> ParseResult<ExprNode> {
        self.parse_binary(Self::parse_unary, |op| match op {
            Operator::Multiply => Some(BinaryOp::Multiply),
            Operator::Divide => Some(BinaryOp::Divide),
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> ParseResult<ExprNode> {
        match self.peek().kind {
            TokenKind::Negation => {
                let _ = self.advance();
                Ok(ExprNode::Negation(Box::new(self.parse_unary()?)))
            }
            TokenKind::Operator(op @ (Operator::Minus | Operator::Plus)) => {
                let _ = self.advance();
                let negate = op == Operator::Minus;
                if let TokenKind::Number(n) = self.peek().kind {
                    let _ = self.advance();
                    return Ok(ExprNode::Number(if negate { -n } else { n }));
                }
                Ok(ExprNode::NumberCoercion {
                    inner: Box::new(self.parse_unary()?),
                    negate,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<ExprNode> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(ExprNode::Number(n)),
            TokenKind::String(s) => Ok(ExprNode::String(s)),
            TokenKind::Bool(b) => Ok(ExprNode::Bool(b)),
            TokenKind::Nil => Ok(ExprNode::Nil),
            TokenKind::ParensOpen => {
                let inner = self.parse_conditional()?;
                self.expect_char(&TokenKind::ParensClose, ')')?;
                Ok(inner)
            }
            TokenKind::Period => {
                let chain = vec![ExprNode::Variable(Variable::current_item())];
                if let TokenKind::Identifier(name) = &self.peek().kind {
                    let name = name.clone();
                    let _ = self.advance();
                    self.parse_chain(chain, &name)
                } else {
                    Ok(ExprNode::Lookup(chain))
                }
            }
            TokenKind::Identifier(name) => self.parse_chain(Vec::new(), &name),
            _ => Err(ExprParseError::ExpectedExpression(token)),
        }
    }

    /// Parses the rest of a lookup chain whose next name has already been
    /// consumed. Ends in a lookup or, when followed by `(`, a call.
    fn parse_chain(&mut self, mut chain: Vec<ExprNode>, first: &str) -> ParseResult<ExprNode> {
        let mut name = first.to_string();
        loop {
            if self.check(&TokenKind::BracketOpen) {
                let _ = self.advance();
                chain.push(ExprNode::Variable(Variable::new(&name, Cardinality::List)));
                if !self.check(&TokenKind::BracketClose) {
                    let filter = self.parse_conditional()?;
                    chain.push(filter);
                }
                self.expect_char(&TokenKind::BracketClose, ']')?;
            } else {
                chain.push(ExprNode::Variable(Variable::new(&name, Cardinality::Single)));
            }

            match self.peek().kind {
                TokenKind::Period => {
                    let _ = self.advance();
                    let token = self.advance();
                    match token.kind {
                        TokenKind::Identifier(next) => name = next,
                        _ => return Err(ExprParseError::ExpectedIdentifier(token)),
                    }
                }
                TokenKind::ParensOpen => {
                    let _ = self.advance();
                    let arguments = self.parse_arguments()?;
                    return Ok(ExprNode::Call {
                        lookup: chain,
                        arguments,
                    });
                }
                _ => return Ok(ExprNode::Lookup(chain)),
            }
        }
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<ExprNode>> {
        let mut arguments = Vec::new();
        if self.check(&TokenKind::ParensClose) {
            let _ = self.advance();
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_conditional()?);
            let token = self.advance();
            match token.kind {
                TokenKind::Comma => {}
                TokenKind::ParensClose => return Ok(arguments),
                _ => return Err(ExprParseError::ExpectedArgumentList(token)),
            }
        }
    }
}
