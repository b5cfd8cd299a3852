//! Lexical analysis for the Quill configuration format.

mod span;
pub use span::Span;

mod token;
pub use token::{Token, TokenKind};

mod scanner;
pub use scanner::{ScanError, ScanErrorKind, Scanner};
