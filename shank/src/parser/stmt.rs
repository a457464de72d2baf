//! Statement parsing

use super::{ParseResult, Parser};
use crate::ast::{Argument, IfNode, Spanned, Statement, Stmt, VarRef};
use crate::lexer::Token;

impl Parser<'_> {
    /// One statement, including its terminating newline or block.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let Some(start) = self.peek() else {
            return Err(self.error("expected a statement"));
        };

        let node = match &start.token {
            Token::If => self.parse_if()?,
            Token::For => self.parse_for()?,
            Token::While => self.parse_while()?,
            Token::Repeat => self.parse_repeat()?,
            Token::Ident(name) if self.is_callable(name) => self.parse_call()?,
            Token::Ident(_) => self.parse_assignment()?,
            _ => return Err(self.error("expected a statement")),
        };

        let end = self.tokens[..self.pos].last().map_or(start.span, |l| l.span);
        Ok(Spanned::new(node, start.span.merge(end), start.line))
    }

    /// `NEWLINE INDENT statement* DEDENT`
    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect_newline()?;
        self.expect(&Token::Indent, "an indented block")?;
        let mut body = Vec::new();
        while !self.eat(&Token::Dedent) {
            if self.at_end() {
                return Err(self.error("expected end of block"));
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    /// `if c then block (elsif c then block)* (else block)?`
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.expect(&Token::If, "`if`")?;
        let mut branches = Vec::new();
        loop {
            let condition = self.parse_comparison()?;
            self.expect(&Token::Then, "`then` after the condition")?;
            branches.push((condition, self.parse_block()?));
            if !self.eat(&Token::Elsif) {
                break;
            }
        }
        let mut chain = if self.eat(&Token::Else) {
            Some(IfNode::otherwise(self.parse_block()?))
        } else {
            None
        };

        // Link from the last branch back to the first
        while let Some((condition, body)) = branches.pop() {
            chain = Some(IfNode::branch(condition, body, chain));
        }
        match chain {
            Some(node) => Ok(Stmt::If(node)),
            None => Err(self.error("expected an `if` branch")),
        }
    }

    /// `for IDENT from expr to expr block`
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        self.expect(&Token::For, "`for`")?;
        let (var, _) = self.expect_ident("loop variable after `for`")?;
        self.expect(&Token::From, "`from` after the loop variable")?;
        let from = self.parse_expr()?;
        self.expect(&Token::To, "`to` in the loop bounds")?;
        let to = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::For { var, from, to, body })
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.expect(&Token::While, "`while`")?;
        let condition = self.parse_comparison()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    /// `repeat until comparison block`
    fn parse_repeat(&mut self) -> ParseResult<Stmt> {
        self.expect(&Token::Repeat, "`repeat`")?;
        self.expect(&Token::Until, "`until` after `repeat`")?;
        let condition = self.parse_comparison()?;
        let body = self.parse_block()?;
        Ok(Stmt::Repeat { condition, body })
    }

    /// `name(args)` or `name args` up to the end of the line.
    ///
    /// A `(` right after the name opens an argument list only when its
    /// `)` ends the line; otherwise it starts the first bare argument, as
    /// in `Write (a + b) * 2`.
    fn parse_call(&mut self) -> ParseResult<Stmt> {
        let (name, _) = self.expect_ident("function name")?;
        if !self.at(&Token::LParen) {
            let args = self.parse_bare_arguments()?;
            return Ok(Stmt::Call { name, args });
        }

        let start = self.pos;
        let paren_err = match self.parse_paren_arguments() {
            Ok(args) if self.at(&Token::Newline) => {
                self.expect_newline()?;
                return Ok(Stmt::Call { name, args });
            }
            Ok(_) => None,
            Err(err) => Some(err),
        };
        self.pos = start;
        match self.parse_bare_arguments() {
            Ok(args) => Ok(Stmt::Call { name, args }),
            // The parenthesized reading explains the failure better
            Err(err) => Err(paren_err.unwrap_or(err)),
        }
    }

    /// Arguments up to and including the end of the line
    fn parse_bare_arguments(&mut self) -> ParseResult<Vec<Argument>> {
        let args = if self.at(&Token::Newline) {
            Vec::new()
        } else {
            self.parse_arguments()?
        };
        self.expect_newline()?;
        Ok(args)
    }

    /// `'(' (arg (',' arg)*)? ')'`
    fn parse_paren_arguments(&mut self) -> ParseResult<Vec<Argument>> {
        self.expect(&Token::LParen, "`(`")?;
        if self.eat(&Token::RParen) {
            return Ok(Vec::new());
        }
        let args = self.parse_arguments()?;
        self.expect(&Token::RParen, "`)` to close the argument list")?;
        Ok(args)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Argument>> {
        let mut args = vec![self.parse_argument()?];
        while self.eat(&Token::Comma) {
            args.push(self.parse_argument()?);
        }
        Ok(args)
    }

    /// `'var'? comparison`; a `var` argument must name a variable.
    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let Some(marker) = self.peek() else {
            return Err(self.error("expected an argument"));
        };
        if !self.eat(&Token::Var) {
            return Ok(Argument::value(self.parse_comparison()?));
        }
        let expr = self.parse_comparison()?;
        match expr.as_var_ref() {
            Some(var) => Ok(Argument::by_ref(var.clone())),
            None => Err(self.error_at(marker, format!("`var` argument must be a variable, found `{expr}`"))),
        }
    }

    /// `IDENT ('[' expr ']')? ':=' comparison NEWLINE`
    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let (name, _) = self.expect_ident("variable name")?;
        let target = if self.eat(&Token::LBracket) {
            let index = self.parse_expr()?;
            self.expect(&Token::RBracket, "`]` after the index")?;
            VarRef::indexed(name, index)
        } else {
            VarRef::plain(name)
        };
        self.expect(&Token::ColonEq, "`:=` in assignment")?;
        let value = self.parse_comparison()?;
        self.expect_newline()?;
        Ok(Stmt::Assign { target, value })
    }
}
