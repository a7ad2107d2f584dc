//! Error type for the Newick parser.

use thiserror::Error;

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;

/// Default length of context provided by parse errors
const DEFAULT_CONTEXT_LENGTH: usize = 50;

/// Errors raised while parsing Newick text.
///
/// Variants carry the byte position of the failure and, where useful, a short
/// window of the remaining input so the offending fragment is visible in the
/// message. All parse failures are fatal for the tree being parsed; there is
/// no partial result.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unbalanced parentheses at position {position}, near {context:?}")]
    Unbalanced { position: usize, context: String },

    #[error("missing ';' terminator at position {position}")]
    MissingTerminator { position: usize },

    #[error("unexpected character {found:?} at position {position}, near {context:?}")]
    UnexpectedCharacter { found: char, position: usize, context: String },

    #[error("invalid branch length {text:?} at position {position}")]
    InvalidBranchLength { text: String, position: usize },

    #[error("unclosed [ comment at position {position}")]
    UnclosedComment { position: usize },

    #[error("unclosed quoted label at position {position}")]
    UnclosedQuote { position: usize },

    #[error("unexpected trailing content after tree at position {position}, near {context:?}")]
    TrailingContent { position: usize, context: String },

    #[error("failed to read newick input: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub(crate) fn unbalanced<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        ParseError::Unbalanced {
            position: parser.position(),
            context: parser.context(DEFAULT_CONTEXT_LENGTH),
        }
    }

    pub(crate) fn missing_terminator<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        ParseError::MissingTerminator { position: parser.position() }
    }

    pub(crate) fn unexpected_character<S: ByteSource>(parser: &ByteParser<S>, found: u8) -> Self {
        ParseError::UnexpectedCharacter {
            found: found as char,
            position: parser.position(),
            context: parser.context(DEFAULT_CONTEXT_LENGTH),
        }
    }

    pub(crate) fn invalid_branch_length<S: ByteSource>(parser: &ByteParser<S>, text: String) -> Self {
        ParseError::InvalidBranchLength { text, position: parser.position() }
    }

    pub(crate) fn unclosed_comment<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        ParseError::UnclosedComment { position: parser.position() }
    }

    pub(crate) fn unclosed_quote<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        ParseError::UnclosedQuote { position: parser.position() }
    }

    pub(crate) fn trailing_content<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        ParseError::TrailingContent {
            position: parser.position(),
            context: parser.context(DEFAULT_CONTEXT_LENGTH),
        }
    }
}
