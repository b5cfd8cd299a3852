//! Scanner for the Quill configuration format.

use crate::{Span, Token, TokenKind};
use tracing::trace;

/// Characters that always terminate an unquoted string.
const RESERVED: [char; 6] = ['{', '}', '[', ']', ',', ';'];

/// Whether a character may appear in an unquoted string.
fn is_bare_char(c: char) -> bool {
    !RESERVED.contains(&c) && !matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// A lexical error with source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// The kind of error.
    pub kind: ScanErrorKind,
    /// Source location.
    pub span: Span,
}

/// Lexical error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// End of input before the closing quote of a quoted string.
    UnterminatedString,
    /// Raw newline inside a quoted string.
    NewlineInString,
    /// A character no token rule recognises.
    UnrecognizedCharacter(char),
}

impl ScanError {
    /// Create a new scan error.
    pub fn new(kind: ScanErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ScanErrorKind::UnterminatedString => write!(f, "unterminated quoted string"),
            ScanErrorKind::NewlineInString => write!(f, "illegal newline in quoted string"),
            ScanErrorKind::UnrecognizedCharacter(c) => {
                write!(f, "unrecognized character {c:?}")
            }
        }?;
        write!(f, " at offset {}", self.span.start)
    }
}

impl std::error::Error for ScanError {}

/// A scanner that produces tokens from Quill source text.
///
/// Holds a mutable cursor and is meant for one caller at a time; use
/// [`Scanner::reset`] to reuse an instance on a new source.
#[derive(Clone)]
pub struct Scanner<'src> {
    /// The source text being scanned.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
        }
    }

    /// Point the scanner at a new source, discarding all cursor state.
    pub fn reset(&mut self, source: &'src str) {
        self.source = source;
        self.remaining = source;
        self.pos = 0;
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Consume `prefix` if the remaining text starts with it.
    #[inline]
    fn accept(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.pos += prefix.len() as u32;
            self.remaining = &self.remaining[prefix.len()..];
            true
        } else {
            false
        }
    }

    /// Span from `start` to the current position.
    #[inline]
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.pos)
    }

    /// Skip whitespace, newlines, and `;` line comments before a token.
    /// Returns true when at least one newline or comment was skipped, which
    /// becomes the next token's `leading_newline` flag.
    fn skip_insignificant(&mut self) -> bool {
        let mut leading_newline = false;
        loop {
            if self.accept(" ") || self.accept("\t") {
                continue;
            }
            if self.accept("\r\n") || self.accept("\n") {
                leading_newline = true;
                continue;
            }
            if self.accept(";") {
                while !self.is_eof() {
                    if self.accept("\r\n") || self.accept("\n") {
                        break;
                    }
                    self.advance();
                }
                // A comment runs to end of line, so consuming one implies
                // consuming its newline (or hitting end of input).
                leading_newline = true;
                continue;
            }
            break;
        }
        leading_newline
    }

    /// Scan past insignificant input and produce the next token.
    /// Returns `Ok(None)` at end of input.
    pub fn scan_one(&mut self) -> Result<Option<Token>, ScanError> {
        let leading_newline = self.skip_insignificant();
        if self.is_eof() {
            return Ok(None);
        }

        let start = self.pos;
        let token = if self.accept("{") {
            Token::punct(TokenKind::LBrace, leading_newline, self.span_from(start))
        } else if self.accept("}") {
            Token::punct(TokenKind::RBrace, leading_newline, self.span_from(start))
        } else if self.accept("[") {
            Token::punct(TokenKind::LBracket, leading_newline, self.span_from(start))
        } else if self.accept("]") {
            Token::punct(TokenKind::RBracket, leading_newline, self.span_from(start))
        } else if self.accept(",") {
            Token::punct(TokenKind::Comma, leading_newline, self.span_from(start))
        } else if let Some(text) = self.scan_quoted()? {
            Token::string(
                TokenKind::QuotedString,
                text,
                leading_newline,
                self.span_from(start),
            )
        } else if let Some(text) = self.scan_multiline() {
            Token::string(
                TokenKind::MultilineString,
                text,
                leading_newline,
                self.span_from(start),
            )
        } else if let Some(text) = self.scan_bare() {
            Token::string(
                TokenKind::BareString,
                text,
                leading_newline,
                self.span_from(start),
            )
        } else {
            let c = self.peek().unwrap_or('\0');
            return Err(ScanError::new(
                ScanErrorKind::UnrecognizedCharacter(c),
                Span::new(start, start + c.len_utf8() as u32),
            ));
        };

        trace!("token {:?} at {:?}", token.kind, token.span);
        Ok(Some(token))
    }

    /// Scan the whole source, returning every token in order. Propagates the
    /// first lexical error encountered.
    pub fn scan_all(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.scan_one()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Attempt to scan a quoted string: `"..."`.
    ///
    /// The only recognised escape is `\"`. Returns `Ok(None)` when the
    /// current character is not an opening quote.
    fn scan_quoted(&mut self) -> Result<Option<String>, ScanError> {
        let start = self.pos;
        if !self.accept("\"") {
            return Ok(None);
        }

        let mut text = String::new();
        loop {
            if self.is_eof() {
                return Err(ScanError::new(
                    ScanErrorKind::UnterminatedString,
                    self.span_from(start),
                ));
            }
            if self.accept("\"") {
                break;
            }
            if self.starts_with("\r\n") || self.starts_with("\n") {
                return Err(ScanError::new(
                    ScanErrorKind::NewlineInString,
                    Span::empty(self.pos),
                ));
            }
            if self.accept("\\\"") {
                text.push('"');
                continue;
            }
            if let Some(c) = self.advance() {
                text.push(c);
            }
        }

        Ok(Some(text))
    }

    /// Attempt to scan a multi-line string: one or more lines each introduced
    /// by `>`, concatenated with no inserted separator. Returns `None` when
    /// the current character is not `>`.
    fn scan_multiline(&mut self) -> Option<String> {
        let mut text = self.scan_multiline_line()?;
        loop {
            // Only horizontal whitespace may sit between continuation lines;
            // anything else after it ends the multi-line string.
            while self.accept(" ") || self.accept("\t") {}
            match self.scan_multiline_line() {
                Some(line) => text.push_str(&line),
                None => break,
            }
        }
        Some(text)
    }

    /// Scan one `>` line, capturing its text up to (but not including) the
    /// terminating newline. The newline itself is consumed.
    fn scan_multiline_line(&mut self) -> Option<String> {
        if !self.accept(">") {
            return None;
        }
        let mut line = String::new();
        loop {
            if self.is_eof() || self.accept("\r\n") || self.accept("\n") {
                break;
            }
            if let Some(c) = self.advance() {
                line.push(c);
            }
        }
        Some(line)
    }

    /// Attempt to scan an unquoted string: the maximal run of characters not
    /// in the terminator set. Returns `None` on a zero-length run.
    fn scan_bare(&mut self) -> Option<String> {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !is_bare_char(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        if text.is_empty() { None } else { Some(text) }
    }
}
