//! Backtracking recursive-descent parser for Quill.

use quill_scan::{Span, Token, TokenKind};
use quill_tree::{NodeId, Tree};
use tracing::trace;

/// A syntax error raised after a production has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Source location.
    pub span: Span,
}

/// Syntax error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A committed production required `expected` and found something else.
    /// `found` is `None` at end of input.
    Expected {
        /// The token kind the production required.
        expected: TokenKind,
        /// What was actually there, `None` at end of input.
        found: Option<TokenKind>,
    },
    /// Input continued past a complete document.
    TrailingInput {
        /// The first unexpected token.
        found: TokenKind,
    },
}

impl ParseError {
    fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::Expected {
                expected,
                found: Some(found),
            } => write!(
                f,
                "expected {}, found {}",
                expected.describe(),
                found.describe()
            ),
            ParseErrorKind::Expected {
                expected,
                found: None,
            } => write!(f, "expected {}, got end of input", expected.describe()),
            ParseErrorKind::TrailingInput { found } => {
                write!(f, "expected end of input, found {}", found.describe())
            }
        }?;
        write!(f, " at offset {}", self.span.start)
    }
}

impl std::error::Error for ParseError {}

/// Outcome of one speculative grammar rule. `Ok(None)` means the rule does
/// not apply at the current position (a recoverable mismatch, consumed inside
/// the parser); `Err` means the rule committed and the input is malformed.
type Rule<T> = Result<Option<T>, ParseError>;

/// Recursive-descent parser with speculative backtracking.
///
/// Holds a cursor over a scanned token sequence. One logical parse at a
/// time; [`Parser::reset`] re-targets an instance at a new sequence,
/// discarding all cursor state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a parser over a token sequence.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Re-target the parser at a new token sequence.
    pub fn reset(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
        self.pos = 0;
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos == self.tokens.len()
    }

    #[inline]
    fn cur(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Span reported for "end of input" errors.
    fn eof_span(&self) -> Span {
        self.tokens
            .last()
            .map_or(Span::empty(0), |t| Span::empty(t.span.end))
    }

    /// Consume the current token if it has the given kind.
    fn accept(&mut self, kind: TokenKind) -> Option<&Token> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Some(&self.tokens[self.pos - 1])
            }
            _ => None,
        }
    }

    /// Consume a string token of the given kind, returning its payload.
    fn accept_string(&mut self, kind: TokenKind) -> Option<String> {
        let token = self.accept(kind)?;
        Some(token.text().unwrap_or_default().to_owned())
    }

    /// Require the current token to have the given kind. Failing here is a
    /// hard syntax error: the enclosing production has already committed.
    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        match self.cur() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(ParseError::new(
                ParseErrorKind::Expected {
                    expected: kind,
                    found: Some(token.kind),
                },
                token.span,
            )),
            None => Err(ParseError::new(
                ParseErrorKind::Expected {
                    expected: kind,
                    found: None,
                },
                self.eof_span(),
            )),
        }
    }

    /// Item separator: an explicit comma is consumed; a next token flagged
    /// with a leading newline satisfies the separator without being consumed.
    fn accept_separator(&mut self) -> bool {
        if self.accept(TokenKind::Comma).is_some() {
            return true;
        }
        self.cur().is_some_and(|t| t.leading_newline)
    }

    /// Run a production speculatively: on a recoverable mismatch (`Ok(None)`)
    /// the token cursor and the tree arena are restored so the caller can try
    /// an alternative at the same position.
    fn speculate<T>(
        &mut self,
        tree: &mut Tree,
        rule: impl FnOnce(&mut Self, &mut Tree) -> Rule<T>,
    ) -> Rule<T> {
        let pos = self.pos;
        let mark = tree.mark();
        match rule(self, tree) {
            Ok(None) => {
                self.pos = pos;
                tree.rollback(mark);
                Ok(None)
            }
            outcome => outcome,
        }
    }

    /// document := record_content END
    ///
    /// Parse the token sequence into a Document tree. The cursor must be
    /// fully consumed afterwards; anything left over is a hard error.
    pub fn parse(&mut self) -> Result<Tree, ParseError> {
        let mut tree = Tree::new();
        let items = self.record_content(&mut tree)?;
        if let Some(token) = self.cur() {
            return Err(ParseError::new(
                ParseErrorKind::TrailingInput { found: token.kind },
                token.span,
            ));
        }
        let root = tree.root();
        for item in items {
            tree.attach(root, item);
        }
        trace!(
            "parsed document with {} items",
            tree.children(tree.root()).len()
        );
        Ok(tree)
    }

    /// record_content := (record_item (sep record_item)*)?
    ///
    /// Never a mismatch: zero items is a valid (empty) body. When a
    /// separator is present but no item follows, the list simply ends and
    /// the caller's closing-delimiter check surfaces any real problem.
    fn record_content(&mut self, tree: &mut Tree) -> Result<Vec<NodeId>, ParseError> {
        let mut items = Vec::new();
        let Some(first) = self.record_item(tree)? else {
            return Ok(items);
        };
        items.push(first);
        while self.accept_separator() {
            match self.record_item(tree)? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// record_item := record_key value
    fn record_item(&mut self, tree: &mut Tree) -> Rule<NodeId> {
        self.speculate(tree, |p, t| {
            let Some(key) = p.record_key(t)? else {
                return Ok(None);
            };
            let Some(value) = p.value(t)? else {
                return Ok(None);
            };
            Ok(Some(t.add_item(key, value)))
        })
    }

    /// record_key := QUOTED_STRING | UNQUOTED_STRING
    fn record_key(&mut self, tree: &mut Tree) -> Rule<NodeId> {
        for kind in [TokenKind::QuotedString, TokenKind::BareString] {
            if let Some(text) = self.accept_string(kind) {
                return Ok(Some(tree.add_string(text)));
            }
        }
        Ok(None)
    }

    /// value := string | record | array
    ///
    /// Strings first; the leading token makes the branches mutually
    /// exclusive, so the order only affects speed.
    fn value(&mut self, tree: &mut Tree) -> Rule<NodeId> {
        for kind in [
            TokenKind::QuotedString,
            TokenKind::BareString,
            TokenKind::MultilineString,
        ] {
            if let Some(text) = self.accept_string(kind) {
                return Ok(Some(tree.add_string(text)));
            }
        }
        if let Some(record) = self.record(tree)? {
            return Ok(Some(record));
        }
        self.array(tree)
    }

    /// record := '{' record_content '}'
    fn record(&mut self, tree: &mut Tree) -> Rule<NodeId> {
        self.speculate(tree, |p, t| {
            if p.accept(TokenKind::LBrace).is_none() {
                return Ok(None);
            }
            let items = p.record_content(t)?;
            p.expect(TokenKind::RBrace)?;
            let record = t.add_record();
            for item in items {
                t.attach(record, item);
            }
            Ok(Some(record))
        })
    }

    /// array := '[' array_content ']'
    fn array(&mut self, tree: &mut Tree) -> Rule<NodeId> {
        self.speculate(tree, |p, t| {
            if p.accept(TokenKind::LBracket).is_none() {
                return Ok(None);
            }
            let values = p.array_content(t)?;
            p.expect(TokenKind::RBracket)?;
            let array = t.add_array();
            for value in values {
                t.attach(array, value);
            }
            Ok(Some(array))
        })
    }

    /// array_content := (value (sep value)*)?
    fn array_content(&mut self, tree: &mut Tree) -> Result<Vec<NodeId>, ParseError> {
        let mut values = Vec::new();
        let Some(first) = self.value(tree)? else {
            return Ok(values);
        };
        values.push(first);
        while self.accept_separator() {
            match self.value(tree)? {
                Some(value) => values.push(value),
                None => break,
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, parse_str};
    use quill_scan::Scanner;
    use quill_tree::{NodeKind, pretty};
    use proptest::prelude::*;

    fn parse(source: &str) -> Tree {
        parse_str(source).expect("parse failed")
    }

    /// Key text and value id of a record item.
    fn pair(tree: &Tree, item: NodeId) -> (&str, NodeId) {
        let key = tree.item_key(item).expect("not a record item");
        (
            tree.text(key).expect("key is not a string"),
            tree.item_value(item).expect("item has no value"),
        )
    }

    #[test]
    fn test_empty_document() {
        let tree = parse("");
        assert!(tree.children(tree.root()).is_empty());
        let tree = parse("  ; only a comment\n");
        assert!(tree.children(tree.root()).is_empty());
    }

    #[test]
    fn test_single_pair() {
        let tree = parse("a b");
        let items = tree.children(tree.root());
        assert_eq!(items.len(), 1);
        let (key, value) = pair(&tree, items[0]);
        assert_eq!(key, "a");
        assert_eq!(tree.text(value), Some("b"));
    }

    #[test]
    fn test_quoted_and_bare_keys_are_equivalent() {
        assert_eq!(parse("a b"), parse("\"a\" \"b\""));
    }

    #[test]
    fn test_newline_separator_equivalent_to_comma() {
        assert_eq!(parse("r { a b\nc d }"), parse("r { a b, c d }"));
        assert_eq!(parse("a 1\nb 2"), parse("a 1, b 2"));
    }

    #[test]
    fn test_no_separator_needed_between_key_and_value() {
        let tree = parse("k {a b}");
        let (_, record) = pair(&tree, tree.children(tree.root())[0]);
        let items = tree.children(record);
        assert_eq!(items.len(), 1);
        let (key, value) = pair(&tree, items[0]);
        assert_eq!(key, "a");
        assert_eq!(tree.text(value), Some("b"));
    }

    #[test]
    fn test_comment_is_transparent_separator() {
        // The comment contributes no token, but its newline still separates.
        assert_eq!(parse("a 1 ; note\nb 2"), parse("a 1, b 2"));
    }

    #[test]
    fn test_multiline_string_value() {
        let tree = parse("motd >Welcome!\n     >Enjoy.");
        let (_, value) = pair(&tree, tree.children(tree.root())[0]);
        assert_eq!(tree.text(value), Some("Welcome!Enjoy."));
    }

    #[test]
    fn test_escapes_decode_in_payloads() {
        let tree = parse(r#"k "a\"b""#);
        let (_, value) = pair(&tree, tree.children(tree.root())[0]);
        assert_eq!(tree.text(value), Some("a\"b"));

        let tree = parse(r"k a\nb");
        let (_, value) = pair(&tree, tree.children(tree.root())[0]);
        assert_eq!(tree.text(value), Some("a\nb"));
    }

    #[test]
    fn test_nested_record() {
        let tree = parse("server { host localhost, port 8080 }");
        let (key, record) = pair(&tree, tree.children(tree.root())[0]);
        assert_eq!(key, "server");
        assert!(matches!(tree.kind(record), NodeKind::Record));
        let items = tree.children(record);
        assert_eq!(items.len(), 2);
        assert_eq!(pair(&tree, items[0]).0, "host");
        assert_eq!(pair(&tree, items[1]).0, "port");
    }

    #[test]
    fn test_array_values() {
        let tree = parse("tags [ a, b\nc ]");
        let (_, array) = pair(&tree, tree.children(tree.root())[0]);
        assert!(matches!(tree.kind(array), NodeKind::Array));
        let texts: Vec<_> = tree
            .children(array)
            .iter()
            .map(|&v| tree.text(v).unwrap())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_record_and_array() {
        let tree = parse("r {} a []");
        let (_, record) = pair(&tree, tree.children(tree.root())[0]);
        let (_, array) = pair(&tree, tree.children(tree.root())[1]);
        assert!(tree.children(record).is_empty());
        assert!(tree.children(array).is_empty());
    }

    #[test]
    fn test_array_of_mixed_values() {
        let tree = parse("m [ { k v } [ x ] y ]");
        let (_, array) = pair(&tree, tree.children(tree.root())[0]);
        let elements = tree.children(array);
        assert_eq!(elements.len(), 3);
        assert!(matches!(tree.kind(elements[0]), NodeKind::Record));
        assert!(matches!(tree.kind(elements[1]), NodeKind::Array));
        assert!(matches!(tree.kind(elements[2]), NodeKind::String(_)));
    }

    #[test]
    fn test_duplicate_keys_are_preserved() {
        let tree = parse("a 1\na 2");
        let items = tree.children(tree.root());
        assert_eq!(items.len(), 2);
        assert_eq!(pair(&tree, items[0]).0, "a");
        assert_eq!(pair(&tree, items[1]).0, "a");
    }

    #[test]
    fn test_key_without_value_inside_record() {
        // The dangling key makes the item production back off, so the
        // record's closing-brace check reports the problem.
        let err = parse_str("k { a").unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected a syntax error, got {err}");
        };
        assert_eq!(
            err.kind,
            ParseErrorKind::Expected {
                expected: TokenKind::RBrace,
                found: Some(TokenKind::BareString),
            }
        );
    }

    #[test]
    fn test_unclosed_record_at_end_of_input() {
        let err = parse_str("k {").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected '}', got end of input at offset 3"
        );
    }

    #[test]
    fn test_unclosed_array() {
        let err = parse_str("k [ a").unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(
            err.kind,
            ParseErrorKind::Expected {
                expected: TokenKind::RBracket,
                found: None,
            }
        );
    }

    #[test]
    fn test_trailing_input() {
        let err = parse_str("a b }").unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(
            err.kind,
            ParseErrorKind::TrailingInput {
                found: TokenKind::RBrace,
            }
        );
    }

    #[test]
    fn test_document_body_is_braceless() {
        // A document is a record body; a leading '{' is not an item.
        let err = parse_str("{a b}").unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(
            err.kind,
            ParseErrorKind::TrailingInput {
                found: TokenKind::LBrace,
            }
        );
    }

    #[test]
    fn test_lone_key_at_top_level() {
        let err = parse_str("a").unwrap_err();
        let Error::Parse(err) = err else {
            panic!("expected a syntax error");
        };
        assert_eq!(
            err.kind,
            ParseErrorKind::TrailingInput {
                found: TokenKind::BareString,
            }
        );
    }

    #[test]
    fn test_scan_error_propagates() {
        let err = parse_str("\"unterminated").unwrap_err();
        assert!(matches!(err, Error::Scan(_)));
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let source = "a { b [ 1, 2 ] }\nc >line";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn test_parser_reset_allows_reuse() {
        let first = Scanner::new("a 1").scan_all().unwrap();
        let second = Scanner::new("b { c 2 }").scan_all().unwrap();

        let mut parser = Parser::new(first);
        let tree = parser.parse().unwrap();
        assert_eq!(pair(&tree, tree.children(tree.root())[0]).0, "a");

        parser.reset(second);
        let tree = parser.parse().unwrap();
        assert_eq!(pair(&tree, tree.children(tree.root())[0]).0, "b");
    }

    #[test]
    fn test_backtracking_leaves_no_orphan_nodes() {
        // Every node allocated during speculation must either end up attached
        // or be rolled back; the arena holds no unreachable leftovers.
        let tree = parse("k { a b }");
        assert_eq!(tree.preorder(tree.root()).count(), tree.node_count());
    }

    #[test]
    fn test_merge_paths_after_parse() {
        let tree = parse("a { b \"x\" }");
        let (_, record) = pair(&tree, tree.children(tree.root())[0]);
        let (_, x) = pair(&tree, tree.children(record)[0]);
        assert_eq!(tree.merge_path(x), Some(vec!["a", "b"]));

        let tree = parse("a [ \"x\" \"y\" ]");
        let (_, array) = pair(&tree, tree.children(tree.root())[0]);
        assert_eq!(tree.merge_path(array), Some(vec!["a"]));
        for &element in tree.children(array) {
            assert_eq!(tree.merge_path(element), None);
        }
    }

    #[test]
    fn test_pretty_printed_parse() {
        let tree = parse("a b\nc { d e }");
        insta::assert_snapshot!(pretty(&tree, tree.root()), @r#"
        `- Document
           |- RecordItem
           |  |- String "a"
           |  `- String "b"
           `- RecordItem
              |- String "c"
              `- Record
                 `- RecordItem
                    |- String "d"
                    `- String "e"
        "#);
    }

    proptest! {
        #[test]
        fn parses_any_list_of_bare_pairs(
            pairs in proptest::collection::vec(("[a-z]{1,8}", "[a-z0-9]{1,8}"), 1..8)
        ) {
            let source = pairs
                .iter()
                .map(|(k, v)| format!("{k} {v}"))
                .collect::<Vec<_>>()
                .join("\n");
            let tree = parse_str(&source).unwrap();
            let items = tree.children(tree.root());
            prop_assert_eq!(items.len(), pairs.len());
            for (&item, (k, v)) in items.iter().zip(&pairs) {
                let (key, value) = pair(&tree, item);
                prop_assert_eq!(key, k.as_str());
                prop_assert_eq!(tree.text(value), Some(v.as_str()));
            }
        }
    }
}
