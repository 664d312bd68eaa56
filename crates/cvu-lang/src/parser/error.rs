//! Parse errors for CVU source and their source-annotated rendering.

use cvu_common::constants::DIAGNOSTIC_CONTEXT_LINES;
use cvu_common::types::Position;
use thiserror::Error;

use super::lexer::Token;

/// A failure to tokenize or parse CVU source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CvuParseError {
    /// A property key was required.
    #[error("Expected Key and found {0} instead at {pos}", pos = .0.position)]
    ExpectedKey(Token),

    /// A name was required, e.g. the kind inside `[...]`.
    #[error("Expected Identifier and found {0} instead at {pos}", pos = .0.position)]
    ExpectedIdentifier(Token),

    /// A specific punctuation character was required.
    #[error("Expected Character {0} and found {1} instead at {pos}", pos = .1.position)]
    ExpectedCharacter(char, Token),

    /// A selector string was required after `=`.
    #[error("Expected String and found {0} instead at {pos}", pos = .0.position)]
    ExpectedString(Token),

    /// A token is not valid at this point of the grammar.
    #[error("Unexpected Token and found {0} instead at {pos}", pos = .0.position)]
    UnexpectedToken(Token),

    /// `[kind]` names no known definition kind.
    #[error("Unknown Definition and found {0} instead at {pos}", pos = .0.position)]
    UnknownDefinition(Token),

    /// A string was not closed before the end of input. Carries the
    /// opening line of the literal, from its quote.
    #[error("Missing Quote Close and found {0} instead at {1}")]
    MissingQuoteClose(String, Position),

    /// A `{{` expression was not closed.
    #[error("Missing expression close token }}}} at {0}")]
    MissingExpressionClose(Position),

    /// A `/*` comment was not closed.
    #[error("Unterminated comment at {0}")]
    UnterminatedComment(Position),

    /// A character outside the language.
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedCharacter(char, Position),

    /// A `#` color with the wrong number of hex digits.
    #[error("Invalid color {0} at {1}")]
    InvalidColor(String, Position),
}

impl CvuParseError {
    /// Where in the source the error points.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::ExpectedKey(t)
            | Self::ExpectedIdentifier(t)
            | Self::ExpectedCharacter(_, t)
            | Self::ExpectedString(t)
            | Self::UnexpectedToken(t)
            | Self::UnknownDefinition(t) => t.position,
            Self::MissingQuoteClose(_, p)
            | Self::MissingExpressionClose(p)
            | Self::UnterminatedComment(p)
            | Self::UnexpectedCharacter(_, p)
            | Self::InvalidColor(_, p) => *p,
        }
    }

    /// Renders the message followed by the surrounding source, with a
    /// `---^` marker under the offending column.
    ///
    /// Shows up to ten lines before the offending one and up to ten after.
    #[must_use]
    pub fn render_diagnostic(&self, source: &str) -> String {
        let position = self.position();
        let lines: Vec<&str> = source
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let index = position.line.saturating_sub(1).min(lines.len().saturating_sub(1));
        let first = index.saturating_sub(DIAGNOSTIC_CONTEXT_LINES);
        let last = (index + 1 + DIAGNOSTIC_CONTEXT_LINES).min(lines.len());

        let mut out = format!("{self}\n\n");
        out.push_str(&lines[first..=index].join("\n"));
        out.push('\n');
        out.push_str(&"-".repeat(position.column.saturating_sub(1)));
        out.push('^');
        if index + 1 < last {
            out.push('\n');
            out.push_str(&lines[index + 1..last].join("\n"));
        }
        out
    }
}
