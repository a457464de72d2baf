//! Recursive-descent parser
//!
//! Works on the layout-aware token stream from [`crate::lexer::tokenize`].
//! Function names are collected in a pre-pass so that a statement
//! starting with an identifier can be classified as a call or an
//! assignment before the callee's definition has been parsed.

mod expr;
mod stmt;

#[cfg(test)]
mod tests;

use crate::ast::{Builtin, DataType, Function, FunctionBody, Program, Span, VariableDecl};
use crate::error::{Result, ShankError};
use crate::lexer::{Lexeme, Token};
use std::collections::HashSet;

/// Parse tokens into AST
pub fn parse(tokens: &[Lexeme]) -> Result<Program> {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    tracing::debug!(functions = program.functions().len(), "parsed program");
    Ok(program)
}

pub(crate) type ParseResult<T> = Result<T>;

struct Parser<'t> {
    tokens: &'t [Lexeme],
    pos: usize,
    /// Every callable name: built-ins plus all user functions in the file
    callables: HashSet<String>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Lexeme]) -> Self {
        let mut callables: HashSet<String> = Builtin::ALL.iter().map(|b| b.name().to_string()).collect();
        callables.extend(tokens.windows(2).filter_map(|pair| match (&pair[0].token, &pair[1].token) {
            (Token::Define, Token::Ident(name)) => Some(name.clone()),
            _ => None,
        }));
        Self {
            tokens,
            pos: 0,
            callables,
        }
    }

    // ---- cursor -------------------------------------------------------

    fn peek(&self) -> Option<&'t Lexeme> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&'t Token> {
        self.peek().map(|l| &l.token)
    }

    fn at(&self, token: &Token) -> bool {
        self.peek_token() == Some(token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&'t Lexeme> {
        let lexeme = self.tokens.get(self.pos);
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    /// Consume `token` if it is next.
    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> ParseResult<&'t Lexeme> {
        let tokens = self.tokens;
        match tokens.get(self.pos) {
            Some(lexeme) if &lexeme.token == token => {
                self.pos += 1;
                Ok(lexeme)
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<(String, &'t Lexeme)> {
        match self.peek() {
            Some(lexeme) => match &lexeme.token {
                Token::Ident(name) => {
                    self.pos += 1;
                    Ok((name.clone(), lexeme))
                }
                token if token.is_keyword() => Err(self.error(format!(
                    "expected {what}, but `{token}` is a reserved word"
                ))),
                _ => Err(self.error(format!("expected {what}"))),
            },
            None => Err(self.error(format!("expected {what}"))),
        }
    }

    fn expect_newline(&mut self) -> ParseResult<()> {
        self.expect(&Token::Newline, "end of line").map(|_| ())
    }

    /// Syntax error at the current token.
    fn error(&self, message: impl Into<String>) -> ShankError {
        match self.peek() {
            Some(lexeme) => ShankError::syntax(message, lexeme.token.describe(), lexeme.span, lexeme.line),
            None => {
                let (span, line) = self
                    .tokens
                    .last()
                    .map_or((Span::default(), 1), |l| (Span::point(l.span.end), l.line));
                ShankError::syntax(message, "end of input", span, line)
            }
        }
    }

    /// Syntax error pointing at an already consumed token.
    fn error_at(&self, lexeme: &Lexeme, message: impl Into<String>) -> ShankError {
        ShankError::syntax(message, lexeme.token.describe(), lexeme.span, lexeme.line)
    }

    fn is_callable(&self, name: &str) -> bool {
        self.callables.contains(name)
    }

    // ---- program and functions ----------------------------------------

    fn parse_program(&mut self) -> ParseResult<Program> {
        let mut program = Program::new();
        while !self.at_end() {
            let start = self.peek();
            let function = self.parse_function()?;
            if let Err(message) = program.define(function) {
                return Err(match start {
                    Some(lexeme) => self.error_at(lexeme, message),
                    None => self.error(message),
                });
            }
        }
        Ok(program)
    }

    /// `define name(params) NEWLINE INDENT decls statements DEDENT`
    fn parse_function(&mut self) -> ParseResult<Function> {
        let define = self.expect(&Token::Define, "`define` to start a function")?;
        let (name, _) = self.expect_ident("function name")?;
        tracing::trace!(function = %name, line = define.line, "parsing function");

        self.expect(&Token::LParen, "`(` after the function name")?;
        let params = if self.at(&Token::RParen) {
            Vec::new()
        } else {
            self.parse_params()?
        };
        self.expect(&Token::RParen, "`)` to close the parameter list")?;
        self.expect_newline()?;
        self.expect(&Token::Indent, "an indented function body")?;

        let mut names: HashSet<String> = HashSet::new();
        for param in &params {
            self.claim_name(&mut names, param)?;
        }

        let mut locals = Vec::new();
        loop {
            let section = if self.at(&Token::Constants) {
                self.parse_section(Token::Constants, Self::parse_constant_line)?
            } else if self.at(&Token::Variables) {
                self.parse_section(Token::Variables, Self::parse_variable_line)?
            } else {
                break;
            };
            for decl in &section {
                self.claim_name(&mut names, decl)?;
            }
            locals.extend(section);
        }

        let mut body = Vec::new();
        while !self.at(&Token::Dedent) && !self.at_end() {
            body.push(self.parse_statement()?);
        }
        let end = self.expect(&Token::Dedent, "end of the function body")?;

        Ok(Function {
            name,
            params,
            locals,
            body: FunctionBody::User(body),
            span: define.span.merge(end.span),
            line: define.line,
        })
    }

    fn claim_name(&self, names: &mut HashSet<String>, decl: &VariableDecl) -> ParseResult<()> {
        if names.insert(decl.name.clone()) {
            Ok(())
        } else {
            Err(ShankError::syntax(
                format!("`{}` is declared more than once", decl.name),
                format!("identifier `{}`", decl.name),
                decl.span,
                decl.line,
            ))
        }
    }

    /// `group ((';' | ',') group)*` where
    /// `group := 'var'? IDENT (',' IDENT)* ':' type`
    fn parse_params(&mut self) -> ParseResult<Vec<VariableDecl>> {
        let mut params = Vec::new();
        loop {
            let mutable = self.eat(&Token::Var);
            let mut names = vec![self.expect_ident("parameter name")?];
            while self.eat(&Token::Comma) {
                names.push(self.expect_ident("parameter name")?);
            }
            self.expect(&Token::Colon, "`:` before the parameter type")?;
            let ty = self.parse_type()?;
            for (name, lexeme) in names {
                params.push(VariableDecl::param(name, ty.clone(), mutable, lexeme.span, lexeme.line));
            }
            if !self.eat(&Token::Semi) && !self.eat(&Token::Comma) {
                return Ok(params);
            }
        }
    }

    /// A `constants` or `variables` section: either one declaration line
    /// after the keyword, or an indented block of them.
    fn parse_section(
        &mut self,
        keyword: Token,
        mut parse_line: impl FnMut(&mut Self) -> ParseResult<Vec<VariableDecl>>,
    ) -> ParseResult<Vec<VariableDecl>> {
        self.expect(&keyword, "a declaration section")?;
        if !self.eat(&Token::Newline) {
            return parse_line(self);
        }
        self.expect(&Token::Indent, "indented declarations")?;
        let mut decls = Vec::new();
        while !self.eat(&Token::Dedent) {
            if self.at_end() {
                return Err(self.error("expected end of the declaration block"));
            }
            decls.extend(parse_line(self)?);
        }
        Ok(decls)
    }

    /// `'const'? IDENT '=' literal (',' IDENT '=' literal)* NEWLINE`
    fn parse_constant_line(&mut self) -> ParseResult<Vec<VariableDecl>> {
        self.eat(&Token::Const);
        let mut decls = Vec::new();
        loop {
            let (name, lexeme) = self.expect_ident("constant name")?;
            self.expect(&Token::Eq, "`=` after the constant name")?;
            let value = self.parse_literal()?;
            decls.push(VariableDecl::constant(name, value, lexeme.span, lexeme.line));
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect_newline()?;
        Ok(decls)
    }

    /// `IDENT (',' IDENT)* ':' type range? NEWLINE` or `IDENT '=' literal NEWLINE`
    fn parse_variable_line(&mut self) -> ParseResult<Vec<VariableDecl>> {
        let (first, first_lexeme) = self.expect_ident("variable name")?;
        if self.eat(&Token::Eq) {
            let init = self.parse_literal()?;
            self.expect_newline()?;
            return Ok(vec![VariableDecl::initialized(first, init, first_lexeme.span, first_lexeme.line)]);
        }

        let mut names = vec![(first, first_lexeme)];
        while self.eat(&Token::Comma) {
            names.push(self.expect_ident("variable name")?);
        }
        self.expect(&Token::Colon, "`:` before the variable type")?;
        let ty = self.parse_type()?;
        let range = self.parse_range()?;
        self.expect_newline()?;

        names
            .into_iter()
            .map(|(name, lexeme)| {
                VariableDecl::variable(name, ty.clone(), range.clone(), lexeme.span, lexeme.line)
                    .map_err(|message| self.error_at(lexeme, message))
            })
            .collect()
    }

    /// `integer | real | string | character | boolean | 'array' 'of' type`
    fn parse_type(&mut self) -> ParseResult<DataType> {
        let ty = match self.peek_token() {
            Some(Token::TyInteger) => DataType::Integer,
            Some(Token::TyReal) => DataType::Real,
            Some(Token::TyString) => DataType::String,
            Some(Token::TyCharacter) => DataType::Character,
            Some(Token::TyBoolean) => DataType::Boolean,
            Some(Token::Array) => {
                self.pos += 1;
                self.expect(&Token::Of, "`of` after `array`")?;
                if self.at(&Token::Array) {
                    return Err(self.error("arrays of arrays are not supported"));
                }
                let elem = self.parse_type()?;
                return Ok(DataType::Array(Box::new(elem)));
            }
            _ => return Err(self.error("expected a type name")),
        };
        self.pos += 1;
        Ok(ty)
    }
}
