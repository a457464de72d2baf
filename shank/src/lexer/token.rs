//! Token definitions

use logos::Logos;

/// Largest integer literal the lexer accepts: the magnitude of `i32::MIN`.
pub const INT_MAGNITUDE_LIMIT: u32 = i32::MIN.unsigned_abs();

/// Shank token
///
/// `Indent` and `Dedent` carry no pattern: the layout pass in
/// [`super::tokenize`] synthesizes them from leading whitespace. The
/// `Unterminated*` tags are matched by logos but never leave the lexer;
/// they are turned into lex errors.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"\{[^}]*\}")]
pub enum Token {
    // Keywords
    #[token("define")]
    Define,
    #[token("variables")]
    Variables,
    #[token("constants")]
    Constants,
    #[token("const")]
    Const,
    #[token("var")]
    Var,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("elsif")]
    Elsif,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("from")]
    From,
    #[token("to")]
    To,
    #[token("while")]
    While,
    #[token("repeat")]
    Repeat,
    #[token("until")]
    Until,
    #[token("array")]
    Array,
    #[token("of")]
    Of,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Type names
    #[token("integer")]
    TyInteger,
    #[token("real")]
    TyReal,
    #[token("string")]
    TyString,
    #[token("character")]
    #[token("char")]
    TyCharacter,
    #[token("boolean")]
    TyBoolean,

    // Literals
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f32>().ok(), priority = 3)]
    RealLit(f32),

    /// Magnitude only. `2147483648` is accepted so that `-2147483648` can
    /// be written; the parser rejects it without a leading minus.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u32>().ok().filter(|&n| n <= INT_MAGNITUDE_LIMIT), priority = 2)]
    IntLit(u32),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1])
    })]
    StringLit(String),

    #[regex(r"'([^'\\]|\\.)'", |lex| {
        let s = lex.slice();
        let inner = unescape(&s[1..s.len() - 1]);
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    })]
    CharLit(char),

    #[regex(r"[A-Za-z][A-Za-z0-9]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    // Symbols
    #[token(":=")]
    ColonEq,
    #[token(":")]
    Colon,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("<>")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    // Layout
    #[token("\n")]
    Newline,
    Indent,
    Dedent,

    // Error tags: an opening delimiter that reaches end of input
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedString,
    #[regex(r"'([^'\\]|\\.)?")]
    UnterminatedChar,
    #[regex(r"\{[^}]*")]
    UnterminatedComment,
}

/// Resolve backslash escapes inside a string or character literal.
/// Unknown escapes are kept verbatim.
fn unescape(inner: &str) -> String {
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

/// Write `text` with quotes and backslashes escaped so it lexes back to
/// the same literal.
fn write_escaped(f: &mut std::fmt::Formatter<'_>, text: &str, quote: char) -> std::fmt::Result {
    for c in text.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}

impl Token {
    /// Whether the token is a keyword (including type names).
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Define
                | Token::Variables
                | Token::Constants
                | Token::Const
                | Token::Var
                | Token::If
                | Token::Then
                | Token::Elsif
                | Token::Else
                | Token::For
                | Token::From
                | Token::To
                | Token::While
                | Token::Repeat
                | Token::Until
                | Token::Array
                | Token::Of
                | Token::True
                | Token::False
                | Token::TyInteger
                | Token::TyReal
                | Token::TyString
                | Token::TyCharacter
                | Token::TyBoolean
        )
    }

    /// Short name used in diagnostics, e.g. `identifier` rather than the
    /// identifier's text.
    pub fn describe(&self) -> String {
        match self {
            Token::IntLit(_) => "integer literal".to_string(),
            Token::RealLit(_) => "real literal".to_string(),
            Token::StringLit(_) => "string literal".to_string(),
            Token::CharLit(_) => "character literal".to_string(),
            Token::Ident(name) => format!("identifier `{name}`"),
            Token::Newline => "end of line".to_string(),
            Token::Indent => "indentation".to_string(),
            Token::Dedent => "end of block".to_string(),
            other => format!("`{other}`"),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Define => write!(f, "define"),
            Token::Variables => write!(f, "variables"),
            Token::Constants => write!(f, "constants"),
            Token::Const => write!(f, "const"),
            Token::Var => write!(f, "var"),
            Token::If => write!(f, "if"),
            Token::Then => write!(f, "then"),
            Token::Elsif => write!(f, "elsif"),
            Token::Else => write!(f, "else"),
            Token::For => write!(f, "for"),
            Token::From => write!(f, "from"),
            Token::To => write!(f, "to"),
            Token::While => write!(f, "while"),
            Token::Repeat => write!(f, "repeat"),
            Token::Until => write!(f, "until"),
            Token::Array => write!(f, "array"),
            Token::Of => write!(f, "of"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::TyInteger => write!(f, "integer"),
            Token::TyReal => write!(f, "real"),
            Token::TyString => write!(f, "string"),
            Token::TyCharacter => write!(f, "character"),
            Token::TyBoolean => write!(f, "boolean"),
            Token::RealLit(n) if n.fract() == 0.0 => write!(f, "{n:.1}"),
            Token::RealLit(n) => write!(f, "{n}"),
            Token::IntLit(n) => write!(f, "{n}"),
            Token::StringLit(s) => {
                f.write_str("\"")?;
                write_escaped(f, s, '"')?;
                f.write_str("\"")
            }
            Token::CharLit(c) => {
                f.write_str("'")?;
                write_escaped(f, &c.to_string(), '\'')?;
                f.write_str("'")
            }
            Token::Ident(s) => write!(f, "{s}"),
            Token::ColonEq => write!(f, ":="),
            Token::Colon => write!(f, ":"),
            Token::EqEq => write!(f, "=="),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "<>"),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Newline => writeln!(f),
            Token::Indent | Token::Dedent => Ok(()),
            Token::UnterminatedString => write!(f, "\"<unterminated>"),
            Token::UnterminatedChar => write!(f, "'<unterminated>"),
            Token::UnterminatedComment => write!(f, "{{<unterminated>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn test_keywords_beat_identifiers() {
        assert_eq!(
            lex_all("define defined variables x1"),
            vec![
                Token::Define,
                Token::Ident("defined".to_string()),
                Token::Variables,
                Token::Ident("x1".to_string()),
            ]
        );
    }

    #[test]
    fn test_char_is_alias_for_character() {
        assert_eq!(lex_all("char character"), vec![Token::TyCharacter, Token::TyCharacter]);
    }

    #[test]
    fn test_real_wins_over_integer() {
        assert_eq!(lex_all("3.25 3"), vec![Token::RealLit(3.25), Token::IntLit(3)]);
    }

    #[test]
    fn test_integer_overflow_is_rejected() {
        let mut lexer = Token::lexer("99999999999");
        assert!(matches!(lexer.next(), Some(Err(_))));
        let mut lexer = Token::lexer("2147483649");
        assert!(matches!(lexer.next(), Some(Err(_))));
    }

    #[test]
    fn test_magnitude_of_min_integer_lexes() {
        assert_eq!(lex_all("2147483648"), vec![Token::IntLit(2_147_483_648)]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex_all(r#""a\"b\\c\nd""#),
            vec![Token::StringLit("a\"b\\c\nd".to_string())]
        );
    }

    #[test]
    fn test_string_may_span_lines() {
        assert_eq!(lex_all("\"one\ntwo\""), vec![Token::StringLit("one\ntwo".to_string())]);
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(
            lex_all(r"'a' '\'' '\n' 'é'"),
            vec![
                Token::CharLit('a'),
                Token::CharLit('\''),
                Token::CharLit('\n'),
                Token::CharLit('é'),
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            lex_all(":= : == = <> <= >= < >"),
            vec![
                Token::ColonEq,
                Token::Colon,
                Token::EqEq,
                Token::Eq,
                Token::NotEq,
                Token::LtEq,
                Token::GtEq,
                Token::Lt,
                Token::Gt,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex_all("x {a comment\nover two lines} y"),
            vec![Token::Ident("x".to_string()), Token::Ident("y".to_string())]
        );
    }

    #[test]
    fn test_unterminated_tags() {
        assert_eq!(lex_all("\"abc"), vec![Token::UnterminatedString]);
        assert_eq!(lex_all("{ never closed"), vec![Token::UnterminatedComment]);
        assert_eq!(lex_all("'ab'").first(), Some(&Token::UnterminatedChar));
    }

    #[test]
    fn test_display_round_trips_literals() {
        assert_eq!(Token::RealLit(2.0).to_string(), "2.0");
        assert_eq!(Token::RealLit(1.5).to_string(), "1.5");
        assert_eq!(Token::StringLit("say \"hi\"".to_string()).to_string(), r#""say \"hi\"""#);
        assert_eq!(Token::CharLit('\'').to_string(), r"'\''");
        assert_eq!(Token::NotEq.to_string(), "<>");
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Ident("x".to_string()).describe(), "identifier `x`");
        assert_eq!(Token::ColonEq.describe(), "`:=`");
        assert_eq!(Token::Newline.describe(), "end of line");
    }

    #[test]
    fn test_is_keyword() {
        assert!(Token::Elsif.is_keyword());
        assert!(Token::TyBoolean.is_keyword());
        assert!(!Token::Ident("elsif2".to_string()).is_keyword());
    }
}
