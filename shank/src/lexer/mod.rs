//! Lexer implementation using logos
//!
//! Logos produces the raw token stream; [`tokenize`] then applies the
//! layout rules on top of it: one `Newline` per logical line, and
//! `Indent`/`Dedent` tokens whenever a line's indentation depth changes.

mod token;

pub use token::{Token, INT_MAGNITUDE_LIMIT};

use crate::ast::{LineIndex, Span};
use crate::error::{Result, ShankError};
use logos::Logos;
use serde::Serialize;

/// Columns per indentation level. A tab counts as a full level.
pub const INDENT_WIDTH: usize = 4;

/// A token together with its source text and location
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    /// Source text of the token; empty for synthesized layout tokens
    pub text: String,
    pub span: Span,
    /// 1-based line
    pub line: usize,
}

impl Lexeme {
    fn synthetic(token: Token, offset: usize, line: usize) -> Self {
        Self {
            token,
            text: String::new(),
            span: Span::point(offset),
            line,
        }
    }
}

/// Row emitted by `shank tokens --json`
#[derive(Debug, Serialize)]
pub struct TokenRow {
    pub kind: String,
    pub text: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl From<&Lexeme> for TokenRow {
    fn from(lexeme: &Lexeme) -> Self {
        Self {
            kind: format!("{:?}", lexeme.token),
            text: lexeme.text.clone(),
            line: lexeme.line,
            start: lexeme.span.start,
            end: lexeme.span.end,
        }
    }
}

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>> {
    let lines = LineIndex::new(source);
    let mut tokens: Vec<Lexeme> = Vec::new();
    let mut lexer = Token::lexer(source);
    let mut depth = 0usize;
    let mut line_open = false;
    // Offset just past the last raw newline
    let mut line_begin = 0usize;

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        let line = lines.line_of(span.start);
        let token = match result {
            Ok(token) => token,
            Err(()) => return Err(invalid_token(lexer.slice(), span, line)),
        };

        match token {
            Token::Newline => {
                line_begin = span.end;
                // Blank and comment-only lines produce nothing
                if line_open {
                    tokens.push(Lexeme {
                        token: Token::Newline,
                        text: "\n".to_string(),
                        span,
                        line,
                    });
                    line_open = false;
                }
            }
            Token::UnterminatedString => {
                return Err(ShankError::lex("unterminated string literal", span, line));
            }
            Token::UnterminatedChar => {
                return Err(ShankError::lex("malformed character literal", span, line));
            }
            Token::UnterminatedComment => {
                return Err(ShankError::lex("unterminated comment", span, line));
            }
            token => {
                if !line_open {
                    let new_depth = indentation(source, &lines, line_begin, span.start)?;
                    while depth < new_depth {
                        tokens.push(Lexeme::synthetic(Token::Indent, span.start, line));
                        depth += 1;
                    }
                    while depth > new_depth {
                        tokens.push(Lexeme::synthetic(Token::Dedent, span.start, line));
                        depth -= 1;
                    }
                    line_open = true;
                }
                tokens.push(Lexeme {
                    token,
                    text: lexer.slice().to_string(),
                    span,
                    line,
                });
            }
        }
    }

    let last_line = tokens.last().map_or(1, |t| t.line);
    if line_open {
        tokens.push(Lexeme::synthetic(Token::Newline, source.len(), last_line));
    }
    for _ in 0..depth {
        tokens.push(Lexeme::synthetic(Token::Dedent, source.len(), last_line));
    }

    tracing::debug!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

fn invalid_token(slice: &str, span: Span, line: usize) -> ShankError {
    let message = if !slice.is_empty() && slice.bytes().all(|b| b.is_ascii_digit()) {
        format!("integer literal `{slice}` does not fit in 32 bits")
    } else {
        format!("unexpected character: {slice:?}")
    };
    ShankError::lex(message, span, line)
}

/// Indentation depth of a logical line.
///
/// `line_begin` is where the physical line after the last newline starts and
/// `offset` is the line's first token. A comment in between may span several
/// physical lines; only whitespace before it counts.
fn indentation(source: &str, lines: &LineIndex, line_begin: usize, offset: usize) -> Result<usize> {
    let (width, columns) = source[line_begin..offset]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .fold((0, 0), |(width, columns), c| {
            (width + 1, columns + if c == '\t' { INDENT_WIDTH } else { 1 })
        });

    if columns % INDENT_WIDTH != 0 {
        return Err(ShankError::lex(
            format!("indentation of {columns} columns is not a multiple of {INDENT_WIDTH}"),
            Span::new(line_begin, line_begin + width),
            lines.line_of(line_begin),
        ));
    }
    Ok(columns / INDENT_WIDTH)
}

/// Render a token stream back to source text.
///
/// Tokens on a line are separated by single spaces and each line is
/// indented with one tab per level. Literals keep their source text, and
/// blank lines or empty comments fill the gaps where the original had
/// skipped lines, so re-lexing the result yields the same tokens on the
/// same lines.
pub fn reconstruct(tokens: &[Lexeme]) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    let mut at_line_start = true;
    let mut line = 1usize;

    for lexeme in tokens {
        match &lexeme.token {
            Token::Indent => depth += 1,
            Token::Dedent => depth = depth.saturating_sub(1),
            Token::Newline => {
                line = pad_with_comment(&mut out, line, lexeme.line);
                out.push('\n');
                line += 1;
                at_line_start = true;
            }
            token => {
                if at_line_start {
                    while line < lexeme.line {
                        out.push('\n');
                        line += 1;
                    }
                    out.extend(std::iter::repeat_n('\t', depth));
                    at_line_start = false;
                } else {
                    line = pad_with_comment(&mut out, line, lexeme.line);
                    out.push(' ');
                }
                let text = if lexeme.text.is_empty() {
                    token.to_string()
                } else {
                    lexeme.text.clone()
                };
                line += text.matches('\n').count();
                out.push_str(&text);
            }
        }
    }
    out
}

/// Move from `line` down to `target` inside a logical line with a comment.
fn pad_with_comment(out: &mut String, line: usize, target: usize) -> usize {
    if target <= line {
        return line;
    }
    out.push_str(" {");
    out.extend(std::iter::repeat_n('\n', target - line));
    out.push('}');
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|l| l.token).collect()
    }

    fn ident(name: &str) -> Token {
        Token::Ident(name.to_string())
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("\n\n   \n").unwrap().is_empty());
    }

    #[test]
    fn test_single_line_gets_newline() {
        assert_eq!(kinds("x := 1"), vec![ident("x"), Token::ColonEq, Token::IntLit(1), Token::Newline]);
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let source = "a\n\n{ note }\n   \nb\n";
        assert_eq!(kinds(source), vec![ident("a"), Token::Newline, ident("b"), Token::Newline]);
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "define f()\n    x := 1\n        y\n    z\nw\n";
        assert_eq!(
            kinds(source),
            vec![
                Token::Define,
                ident("f"),
                Token::LParen,
                Token::RParen,
                Token::Newline,
                Token::Indent,
                ident("x"),
                Token::ColonEq,
                Token::IntLit(1),
                Token::Newline,
                Token::Indent,
                ident("y"),
                Token::Newline,
                Token::Dedent,
                ident("z"),
                Token::Newline,
                Token::Dedent,
                ident("w"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_dedents_close_at_end_of_input() {
        let source = "a\n\tb\n\t\tc";
        let tokens = kinds(source);
        let indents = tokens.iter().filter(|t| **t == Token::Indent).count();
        let dedents = tokens.iter().filter(|t| **t == Token::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
        assert_eq!(&tokens[tokens.len() - 3..], &[Token::Newline, Token::Dedent, Token::Dedent]);
    }

    #[test]
    fn test_tab_equals_four_spaces() {
        assert_eq!(kinds("a\n\tb\n"), kinds("a\n    b\n"));
    }

    #[test]
    fn test_bad_indentation_width() {
        let err = tokenize("a\n   b\n").unwrap_err();
        assert!(matches!(err, ShankError::Lex { line: 2, .. }));
    }

    #[test]
    fn test_dedent_by_two_levels() {
        let tokens = kinds("a\n\t\tb\nc\n");
        assert_eq!(
            tokens,
            vec![
                ident("a"),
                Token::Newline,
                Token::Indent,
                Token::Indent,
                ident("b"),
                Token::Newline,
                Token::Dedent,
                Token::Dedent,
                ident("c"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\n\nb c\n").unwrap();
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 1, 3, 3, 3]);
    }

    #[test]
    fn test_lexeme_text() {
        let tokens = tokenize("total := 3.5").unwrap();
        assert_eq!(tokens[0].text, "total");
        assert_eq!(tokens[2].text, "3.5");
        assert_eq!(tokens[2].span, Span::new(9, 12));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("x := 1\ny := @\n").unwrap_err();
        match err {
            ShankError::Lex { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains('@'));
            }
            other => panic!("expected lex error, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_overflow() {
        let err = tokenize("x := 4294967296").unwrap_err();
        assert!(err.message().contains("32 bits"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("Write \"oops\n").unwrap_err();
        assert!(matches!(err, ShankError::Lex { line: 1, .. }));
        assert!(err.message().contains("unterminated string"));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("a\n{ open\nb\n").unwrap_err();
        assert!(matches!(err, ShankError::Lex { line: 2, .. }));
    }

    #[test]
    fn test_multiline_string_keeps_one_logical_line() {
        let tokens = kinds("s := \"a\nb\"\nt\n");
        assert_eq!(
            tokens,
            vec![
                ident("s"),
                Token::ColonEq,
                Token::StringLit("a\nb".to_string()),
                Token::Newline,
                ident("t"),
                Token::Newline,
            ]
        );
    }

    #[test]
    fn test_reconstruct_formats_layout() {
        let tokens = tokenize("define f()\n    x:=1\n").unwrap();
        assert_eq!(reconstruct(&tokens), "define f ( )\n\tx := 1\n");
    }

    #[test]
    fn test_relex_of_reconstruction_is_identical() {
        let source = "define main()\n\tvariables n: integer\n\tn := -3\n\tif n <> 4 then\n\t\tWrite \"n is\", n, 'c', 2.0\n";
        let first = tokenize(source).unwrap();
        let second = tokenize(&reconstruct(&first)).unwrap();
        let strip = |ts: &[Lexeme]| ts.iter().map(|t| (t.token.clone(), t.line)).collect::<Vec<_>>();
        assert_eq!(strip(&first), strip(&second));
    }

    #[test]
    fn test_reconstruction_is_a_fixed_point() {
        let source = "{ header }\n\ndefine main()\n    variables s: string\n\n    s := \"two\nlines\"\n";
        let once = reconstruct(&tokenize(source).unwrap());
        let twice = reconstruct(&tokenize(&once).unwrap());
        assert_eq!(once, twice);
    }

    fn lines_of(tokens: &[Lexeme]) -> Vec<(Token, usize)> {
        tokens.iter().map(|t| (t.token.clone(), t.line)).collect()
    }

    #[test]
    fn test_reconstruction_keeps_blank_and_comment_lines() {
        let source = "define main()\n\n    { set up }\n    Write 1\n\n\n    Write 2\n";
        let first = tokenize(source).unwrap();
        let rebuilt = reconstruct(&first);
        assert_eq!(lines_of(&tokenize(&rebuilt).unwrap()), lines_of(&first));
        assert_eq!(rebuilt, "define main ( )\n\n\n\tWrite 1\n\n\n\tWrite 2\n");
    }

    #[test]
    fn test_reconstruction_keeps_literal_text() {
        let source = "Write \"a\nb\", \"c\\nd\"\nWrite 'x'\n";
        let first = tokenize(source).unwrap();
        let rebuilt = reconstruct(&first);
        assert_eq!(lines_of(&tokenize(&rebuilt).unwrap()), lines_of(&first));
        assert_eq!(rebuilt, source.replace(",", " ,"));
    }

    #[test]
    fn test_reconstruction_bridges_comment_inside_a_line() {
        let source = "a { spans\ntwo } b\nc\n";
        let first = tokenize(source).unwrap();
        let rebuilt = reconstruct(&first);
        assert_eq!(rebuilt, "a {\n} b\nc\n");
        assert_eq!(lines_of(&tokenize(&rebuilt).unwrap()), lines_of(&first));
    }

    #[test]
    fn test_indentation_ignores_text_inside_leading_comment() {
        let source = "a\n{ note\n  more } b\n";
        assert_eq!(kinds(source), vec![ident("a"), Token::Newline, ident("b"), Token::Newline]);

        let source = "a\n\t{ x\n} b\n";
        assert_eq!(
            kinds(source),
            vec![ident("a"), Token::Newline, Token::Indent, ident("b"), Token::Newline, Token::Dedent]
        );
    }

    #[test]
    fn test_bad_indentation_reported_on_its_own_line() {
        let err = tokenize("a\n  { x\n} b\n").unwrap_err();
        assert!(matches!(err, ShankError::Lex { line: 2, .. }));
        assert_eq!(err.span(), Some(Span::new(2, 4)));
    }
}
