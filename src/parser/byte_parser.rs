//! Low-level byte-by-byte parser for ASCII text.
//!
//! This module provides [ByteParser] for parsing text-based tree formats with
//! support for peeking, consuming, and quote-aware label parsing. It is the
//! foundation of the [Newick parser](crate::newick::NewickParser).

use crate::parser::byte_source::{ByteSource, InMemoryByteSource};
use crate::parser::parse_error::ParseError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser for ASCII text.
///
/// # Features
/// - Works with any [ByteSource]
/// - Whitespace and `[...]` comment skipping
/// - Quote-aware label parsing (single quotes, doubled-quote escaping)
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use phylogeo::parser::ByteParser;
///
/// let mut parser = ByteParser::from_str("(A:1.0,B:1.0);");
/// assert!(parser.consume_if(b'('));
/// let label = parser.parse_label().unwrap();
/// assert_eq!(label, "A");
/// assert!(parser.consume_if(b':'));
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Creates a new `ByteParser` from a byte slice by copying it.
    pub fn from_bytes(input: &[u8]) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.to_vec()))
    }

    /// Creates a new `ByteParser` from a string by copying it.
    pub fn from_str(input: &str) -> Self {
        Self::from_bytes(input.as_bytes())
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new `ByteParser` from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it; `None` at EOF.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Consumes and returns the current byte; `None` at EOF.
    #[inline(always)]
    pub fn next(&mut self) -> Option<u8> {
        self.source.next()
    }

    /// Returns whether the end of data has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Returns a string of up to `k` bytes from the current position for
    /// error context. Invalid UTF-8 is replaced with `U+FFFD`.
    pub fn context(&self, k: usize) -> String {
        String::from_utf8_lossy(self.source.context(k)).into_owned()
    }

    /// Skips (consumes) all consecutive whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.next();
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a `[...]` comment if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at the current position
    /// * `Err(ParseError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParseError> {
        if !self.consume_if(b'[') {
            return Ok(false);
        }
        loop {
            match self.next() {
                Some(b']') => return Ok(true),
                Some(_) => {}
                None => return Err(ParseError::unclosed_comment(self)),
            }
        }
    }

    /// Skips all consecutive whitespace and comments.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParseError> {
        self.skip_whitespace();
        while self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Consumes the current byte if it equals `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.next();
            true
        } else {
            false
        }
    }

    /// Parses a label (quoted or unquoted), skipping leading whitespace and
    /// comments. An unquoted label may be empty.
    pub fn parse_label(&mut self) -> Result<String, ParseError> {
        self.skip_comment_and_whitespace()?;

        if self.peek() == Some(b'\'') {
            self.parse_quoted_label()
        } else {
            Ok(self.parse_unquoted_label())
        }
    }

    /// Parses a quoted label enclosed in single quotes. Single quotes within
    /// the label are escaped by doubling them (`'Wilson''s'` becomes
    /// `Wilson's`).
    ///
    /// # Errors
    /// Returns an error if the quoted label is not closed before EOF.
    fn parse_quoted_label(&mut self) -> Result<String, ParseError> {
        self.next(); // consume opening '

        let mut label = String::new();
        loop {
            match self.next() {
                Some(b'\'') => {
                    // Doubled quote is an escaped quote, single one ends the label
                    if self.peek() == Some(b'\'') {
                        label.push('\'');
                        self.next();
                    } else {
                        return Ok(label);
                    }
                }
                Some(b) => label.push(b as char),
                None => return Err(ParseError::unclosed_quote(self)),
            }
        }
    }

    /// Parses an unquoted label up to the next structural delimiter
    /// (parentheses, comma, colon, semicolon, brackets, whitespace).
    fn parse_unquoted_label(&mut self) -> String {
        let mut label = String::new();
        while let Some(b) = self.peek() {
            if LABEL_DELIMITERS.contains(&b) {
                break;
            }
            label.push(b as char);
            self.next();
        }
        label
    }
}

/// Newick label delimiters: parentheses, comma, colon, semicolon, brackets, whitespace
const LABEL_DELIMITERS: &[u8] = b"(),:;[] \t\n\r";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unquoted_label_up_to_delimiter() {
        let mut parser = ByteParser::from_str("taxon_1:0.5");
        assert_eq!(parser.parse_label().unwrap(), "taxon_1");
        assert_eq!(parser.peek(), Some(b':'));
    }

    #[test]
    fn parses_quoted_label_with_escaped_quote() {
        let mut parser = ByteParser::from_str("'Wilson''s Storm-petrel',");
        assert_eq!(parser.parse_label().unwrap(), "Wilson's Storm-petrel");
        assert_eq!(parser.peek(), Some(b','));
    }

    #[test]
    fn empty_label_is_allowed() {
        let mut parser = ByteParser::from_str(",B");
        assert_eq!(parser.parse_label().unwrap(), "");
        assert_eq!(parser.peek(), Some(b','));
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let mut parser = ByteParser::from_str(" [a comment] \n A");
        parser.skip_comment_and_whitespace().unwrap();
        assert_eq!(parser.peek(), Some(b'A'));
    }

    #[test]
    fn unclosed_comment_is_an_error() {
        let mut parser = ByteParser::from_str("[never closed");
        assert!(parser.skip_comment().is_err());
    }
}
