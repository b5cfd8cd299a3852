#![doc = include_str!("../README.md")]

pub use quill_scan::{ScanError, ScanErrorKind, Scanner, Span, Token, TokenKind};
pub use quill_tree::Tree;

mod parser;
pub use parser::{ParseError, ParseErrorKind, Parser};

mod diagnostic;
pub use diagnostic::Error;

/// Scan and parse a complete Quill source string into a Document tree.
///
/// Fresh [`Scanner`] and [`Parser`] instances are used for every call; a
/// caller parsing many documents can instead own a [`Parser`] and feed it
/// new token sequences via [`Parser::reset`].
pub fn parse_str(source: &str) -> Result<Tree, Error> {
    let mut scanner = Scanner::new(source);
    let tokens = scanner.scan_all()?;
    let mut parser = Parser::new(tokens);
    Ok(parser.parse()?)
}
