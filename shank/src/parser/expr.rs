//! Expression, literal and range parsing

use super::{ParseResult, Parser};
use crate::ast::{BinOp, CmpOp, Expr, Literal, Range, VarRef};
use crate::error::ShankError;
use crate::lexer::{Token, INT_MAGNITUDE_LIMIT};

fn comparison_op(token: &Token) -> Option<CmpOp> {
    match token {
        Token::Eq | Token::EqEq => Some(CmpOp::Eq),
        Token::NotEq => Some(CmpOp::NotEq),
        Token::Lt => Some(CmpOp::Lt),
        Token::LtEq => Some(CmpOp::LtEq),
        Token::Gt => Some(CmpOp::Gt),
        Token::GtEq => Some(CmpOp::GtEq),
        _ => None,
    }
}

fn additive_op(token: &Token) -> Option<BinOp> {
    match token {
        Token::Plus => Some(BinOp::Add),
        Token::Minus => Some(BinOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(token: &Token) -> Option<BinOp> {
    match token {
        Token::Star => Some(BinOp::Mul),
        Token::Slash => Some(BinOp::Div),
        Token::Percent => Some(BinOp::Mod),
        _ => None,
    }
}

impl Parser<'_> {
    /// `expr (cmp_op expr)?`. Comparisons do not chain.
    pub(super) fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let left = self.parse_expr()?;
        let Some(op) = self.peek_token().and_then(comparison_op) else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_expr()?;
        Ok(Expr::compare(left, op, right))
    }

    /// `term (('+' | '-') term)*`
    pub(super) fn parse_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek_token().and_then(additive_op) {
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    /// `factor (('*' | '/' | '%') factor)*`
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_factor()?;
        while let Some(op) = self.peek_token().and_then(multiplicative_op) {
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let Some(lexeme) = self.peek() else {
            return Err(self.error("expected an expression"));
        };

        match &lexeme.token {
            Token::Minus => {
                self.advance();
                if self.at_min_int_magnitude() {
                    self.advance();
                    return Ok(Expr::Literal(Literal::Integer(i32::MIN)));
                }
                Ok(Expr::Neg(Box::new(self.parse_factor()?)))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen, "`)` to close the expression")?;
                Ok(inner)
            }
            Token::Ident(name) => {
                self.advance();
                if !self.eat(&Token::LBracket) {
                    return Ok(Expr::Var(VarRef::plain(name.clone())));
                }
                let index = self.parse_expr()?;
                self.expect(&Token::RBracket, "`]` after the index")?;
                Ok(Expr::Var(VarRef::indexed(name.clone(), index)))
            }
            _ => match self.literal_at_cursor() {
                Some(lit) => {
                    self.advance();
                    Ok(Expr::Literal(lit))
                }
                None => Err(self.literal_error("expected an expression")),
            },
        }
    }

    /// `2147483648`, which only fits after a minus sign
    fn at_min_int_magnitude(&self) -> bool {
        matches!(self.peek_token(), Some(Token::IntLit(n)) if *n == INT_MAGNITUDE_LIMIT)
    }

    fn literal_error(&self, message: &str) -> ShankError {
        if self.at_min_int_magnitude() {
            self.error("integer literal 2147483648 only fits after a minus sign")
        } else {
            self.error(message)
        }
    }

    fn literal_at_cursor(&self) -> Option<Literal> {
        match self.peek_token()? {
            Token::IntLit(n) => i32::try_from(*n).ok().map(Literal::Integer),
            Token::RealLit(r) => Some(Literal::Real(*r)),
            Token::StringLit(s) => Some(Literal::String(s.clone())),
            Token::CharLit(c) => Some(Literal::Character(*c)),
            Token::True => Some(Literal::Boolean(true)),
            Token::False => Some(Literal::Boolean(false)),
            _ => None,
        }
    }

    /// `'-'? number | string | character | true | false`
    pub(super) fn parse_literal(&mut self) -> ParseResult<Literal> {
        let negative = self.eat(&Token::Minus);
        if negative && self.at_min_int_magnitude() {
            self.advance();
            return Ok(Literal::Integer(i32::MIN));
        }
        let lit = self
            .literal_at_cursor()
            .ok_or_else(|| self.literal_error("expected a literal value"))?;
        let lit = if negative {
            lit.negate()
                .ok_or_else(|| self.error("only numbers can be negated"))?
        } else {
            lit
        };
        self.advance();
        Ok(lit)
    }

    /// Optional `from literal to literal` after a declared type.
    pub(super) fn parse_range(&mut self) -> ParseResult<Option<Range>> {
        if !self.eat(&Token::From) {
            return Ok(None);
        }
        let from = self.parse_literal()?;
        self.expect(&Token::To, "`to` in the range")?;
        let to = self.parse_literal()?;
        Ok(Some(Range::new(from, to)))
    }
}
