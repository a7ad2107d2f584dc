//! Byte-level parsing machinery shared by the format parsers.

pub mod byte_parser;
pub mod byte_source;
pub mod parse_error;

pub use byte_parser::ByteParser;
pub use byte_source::{ByteSource, InMemoryByteSource};
pub use parse_error::ParseError;
