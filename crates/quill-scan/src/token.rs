//! Token types for the Quill scanner.

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural tokens
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `,`
    Comma,

    // String tokens
    /// Unquoted string: `hello`, `42`, `/usr/bin`
    BareString,
    /// Quoted string: `"hello world"`
    QuotedString,
    /// Multi-line string: one or more lines each introduced by `>`
    MultilineString,
}

impl TokenKind {
    /// Whether tokens of this kind carry a string payload.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            TokenKind::BareString | TokenKind::QuotedString | TokenKind::MultilineString
        )
    }

    /// Human-readable name, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::BareString => "unquoted string",
            TokenKind::QuotedString => "quoted string",
            TokenKind::MultilineString => "multi-line string",
        }
    }
}

/// One lexical unit of a Quill document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Decoded payload. `Some` exactly when `kind.is_string()`; escape
    /// sequences are already resolved.
    pub spelling: Option<String>,
    /// True when one or more newlines or a line comment were skipped
    /// immediately before this token. The parser reads this flag as an
    /// implicit item separator.
    pub leading_newline: bool,
    /// The span in the source text.
    pub span: Span,
}

impl Token {
    /// Create a structural (non-string) token.
    pub(crate) fn punct(kind: TokenKind, leading_newline: bool, span: Span) -> Self {
        debug_assert!(!kind.is_string());
        Self {
            kind,
            spelling: None,
            leading_newline,
            span,
        }
    }

    /// Create a string token. The literal two-character sequence `\n` is
    /// resolved to a real newline here, for every string kind.
    pub(crate) fn string(
        kind: TokenKind,
        spelling: String,
        leading_newline: bool,
        span: Span,
    ) -> Self {
        debug_assert!(kind.is_string());
        Self {
            kind,
            spelling: Some(spelling.replace("\\n", "\n")),
            leading_newline,
            span,
        }
    }

    /// The payload of a string token.
    pub fn text(&self) -> Option<&str> {
        self.spelling.as_deref()
    }
}
