//! Error types and reporting

use crate::ast::{LineIndex, Span};
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ShankError>;

/// Any failure while lexing, parsing or running a Shank program
#[derive(Debug, Error)]
pub enum ShankError {
    #[error("Lex error on line {line}: {message}")]
    Lex {
        message: String,
        span: Span,
        line: usize,
    },

    #[error("Syntax error on line {line} at {token}: {message}")]
    Syntax {
        message: String,
        /// Text of the offending token, or `end of input`
        token: String,
        span: Span,
        line: usize,
    },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {message}")]
    Io { message: String },
}

impl ShankError {
    pub fn lex(message: impl Into<String>, span: Span, line: usize) -> Self {
        Self::Lex {
            message: message.into(),
            span,
            line,
        }
    }

    pub fn syntax(
        message: impl Into<String>,
        token: impl Into<String>,
        span: Span,
        line: usize,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            token: token.into(),
            span,
            line,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { span, .. } | Self::Syntax { span, .. } => Some(*span),
            Self::Runtime(_) | Self::Io { .. } => None,
        }
    }

    /// 1-based source line the error is attributed to, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lex { line, .. } | Self::Syntax { line, .. } => Some(*line),
            Self::Runtime(err) => err.line,
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lex { message, .. } | Self::Syntax { message, .. } | Self::Io { message } => {
                message
            }
            Self::Runtime(err) => &err.message,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Lex { .. } => "Lex",
            Self::Syntax { .. } => "Syntax",
            Self::Runtime(_) => "Runtime",
            Self::Io { .. } => "IO",
        }
    }
}

impl From<std::io::Error> for ShankError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Report error with ariadne
///
/// Runtime errors carry only a line number; the label then covers that
/// whole line.
pub fn report_error(filename: &str, source: &str, error: &ShankError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error
        .span()
        .or_else(|| error.line().map(|line| LineIndex::new(source).line_span(line)));

    let report = match span {
        Some(span) => Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{} error", error.kind()))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish(),
        None => Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{} error: {}", error.kind(), error.message()))
            .finish(),
    };

    if report.eprint((filename, Source::from(source))).is_err() {
        eprintln!("{error}");
    }
}
