//! Diagnostic rendering for scan and parse errors.

use ariadne::{Color, Label, Report, ReportKind, Source};
use quill_scan::{ScanError, ScanErrorKind, Span};

use crate::{ParseError, ParseErrorKind};

/// Any error from [`parse_str`](crate::parse_str): either a lexical error
/// from the scanner or a syntax error from the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Lexical error.
    Scan(ScanError),
    /// Syntax error.
    Parse(ParseError),
}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Self {
        Error::Scan(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl Error {
    /// Source location of the error.
    pub fn span(&self) -> Span {
        match self {
            Error::Scan(err) => err.span,
            Error::Parse(err) => err.span,
        }
    }

    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source
    /// context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range: std::ops::Range<usize> = self.span().into();

        match self {
            Error::Scan(err) => match &err.kind {
                ScanErrorKind::UnterminatedString => {
                    Report::build(ReportKind::Error, (filename, range.clone()))
                        .with_message("unterminated quoted string")
                        .with_label(
                            Label::new((filename, range))
                                .with_message("string opened here")
                                .with_color(Color::Red),
                        )
                        .with_help("add a closing '\"'")
                }
                ScanErrorKind::NewlineInString => {
                    Report::build(ReportKind::Error, (filename, range.clone()))
                        .with_message("illegal newline in quoted string")
                        .with_label(
                            Label::new((filename, range))
                                .with_message("line ends inside the string")
                                .with_color(Color::Red),
                        )
                        .with_help(
                            "quoted strings stay on one line; use a '>' multi-line string instead",
                        )
                }
                ScanErrorKind::UnrecognizedCharacter(c) => {
                    Report::build(ReportKind::Error, (filename, range.clone()))
                        .with_message(format!("unrecognized character {c:?}"))
                        .with_label(
                            Label::new((filename, range))
                                .with_message("cannot start a token")
                                .with_color(Color::Red),
                        )
                }
            },
            Error::Parse(err) => match &err.kind {
                ParseErrorKind::Expected {
                    expected,
                    found: Some(found),
                } => Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!(
                        "expected {}, found {}",
                        expected.describe(),
                        found.describe()
                    ))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("unexpected token")
                            .with_color(Color::Red),
                    ),
                ParseErrorKind::Expected {
                    expected,
                    found: None,
                } => Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!("expected {}, got end of input", expected.describe()))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("input ends here")
                            .with_color(Color::Red),
                    ),
                ParseErrorKind::TrailingInput { found } => {
                    Report::build(ReportKind::Error, (filename, range.clone()))
                        .with_message(format!(
                            "expected end of input, found {}",
                            found.describe()
                        ))
                        .with_label(
                            Label::new((filename, range))
                                .with_message("trailing content starts here")
                                .with_color(Color::Red),
                        )
                        .with_help("a document is a single record body; nothing can follow it")
                }
            },
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Scan(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scan(err) => Some(err),
            Error::Parse(err) => Some(err),
        }
    }
}
