//! Statement AST nodes

use super::{Expr, Spanned, VarRef};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};

/// Statement with its source location
pub type Statement = Spanned<Stmt>;

/// Statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `target := value`
    Assign { target: VarRef, value: Expr },

    /// `if .. then` with optional `elsif` / `else` branches
    If(IfNode),

    /// `for var from .. to ..`; the upper bound is exclusive
    For {
        var: String,
        from: Expr,
        to: Expr,
        body: Vec<Statement>,
    },

    While { condition: Expr, body: Vec<Statement> },

    /// `repeat until condition`; the body runs at least once
    Repeat { condition: Expr, body: Vec<Statement> },

    /// Function call used as a statement
    Call { name: String, args: Vec<Argument> },
}

/// Call-site argument. `by_ref` records an explicit `var` marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub expr: Expr,
    pub by_ref: bool,
}

impl Argument {
    pub fn value(expr: Expr) -> Self {
        Self { expr, by_ref: false }
    }

    pub fn by_ref(var: VarRef) -> Self {
        Self {
            expr: Expr::Var(var),
            by_ref: true,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            f.write_str("var ")?;
        }
        write!(f, "{}", self.expr)
    }
}

/// One link of an `if` / `elsif` / `else` chain.
///
/// A link with a condition may be followed by another link; the
/// unconditional `else` link always ends the chain. The constructors
/// are the only way to build a node, so both rules always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfNode {
    condition: Option<Expr>,
    body: Vec<Statement>,
    next: Option<Box<IfNode>>,
}

impl IfNode {
    /// `if` / `elsif` link
    pub fn branch(condition: Expr, body: Vec<Statement>, next: Option<IfNode>) -> Self {
        Self {
            condition: Some(condition),
            body,
            next: next.map(Box::new),
        }
    }

    /// Terminal `else` link
    pub fn otherwise(body: Vec<Statement>) -> Self {
        Self {
            condition: None,
            body,
            next: None,
        }
    }

    /// `None` only for the terminal `else` link.
    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }

    pub fn body(&self) -> &[Statement] {
        &self.body
    }

    pub fn next(&self) -> Option<&IfNode> {
        self.next.as_deref()
    }

    /// Walk the chain from this link to the end.
    pub fn links(&self) -> impl Iterator<Item = &IfNode> {
        std::iter::successors(Some(self), |node| node.next())
    }
}

const INDENT: &str = "    ";

/// Render statements one per line at the given nesting depth.
pub(crate) fn write_block(out: &mut String, body: &[Statement], depth: usize) -> fmt::Result {
    for stmt in body {
        write_stmt(out, &stmt.node, depth)?;
    }
    Ok(())
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    match stmt {
        Stmt::Assign { target, value } => writeln!(out, "{pad}{target} := {value}"),
        Stmt::Call { name, args } => {
            write!(out, "{pad}{name}")?;
            for (i, arg) in args.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(out, "{sep}{arg}")?;
            }
            writeln!(out)
        }
        Stmt::If(node) => {
            for (i, link) in node.links().enumerate() {
                match (link.condition(), i) {
                    (Some(cond), 0) => writeln!(out, "{pad}if {cond} then")?,
                    (Some(cond), _) => writeln!(out, "{pad}elsif {cond} then")?,
                    (None, _) => writeln!(out, "{pad}else")?,
                }
                write_block(out, link.body(), depth + 1)?;
            }
            Ok(())
        }
        Stmt::For { var, from, to, body } => {
            writeln!(out, "{pad}for {var} from {from} to {to}")?;
            write_block(out, body, depth + 1)
        }
        Stmt::While { condition, body } => {
            writeln!(out, "{pad}while {condition}")?;
            write_block(out, body, depth + 1)
        }
        Stmt::Repeat { condition, body } => {
            writeln!(out, "{pad}repeat until {condition}")?;
            write_block(out, body, depth + 1)
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_stmt(&mut out, self, 0)?;
        f.write_str(out.trim_end_matches('\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CmpOp, Literal, Span};

    fn stmt(node: Stmt) -> Statement {
        Spanned::new(node, Span::default(), 1)
    }

    fn call(name: &str) -> Statement {
        stmt(Stmt::Call {
            name: name.to_string(),
            args: vec![],
        })
    }

    #[test]
    fn test_if_chain_links() {
        let chain = IfNode::branch(
            Expr::var("a"),
            vec![call("A")],
            Some(IfNode::branch(
                Expr::var("b"),
                vec![call("B")],
                Some(IfNode::otherwise(vec![call("C")])),
            )),
        );
        let links: Vec<_> = chain.links().collect();
        assert_eq!(links.len(), 3);
        assert!(links[0].condition().is_some());
        assert!(links[1].condition().is_some());
        assert!(links[2].condition().is_none());
        assert!(links[2].next().is_none());
    }

    #[test]
    fn test_if_display() {
        let chain = IfNode::branch(
            Expr::compare(Expr::var("n"), CmpOp::Lt, Expr::Literal(Literal::Integer(0))),
            vec![call("Neg")],
            Some(IfNode::otherwise(vec![call("Pos")])),
        );
        assert_eq!(Stmt::If(chain).to_string(), "if n < 0 then\n    Neg\nelse\n    Pos");
    }

    #[test]
    fn test_call_display() {
        let s = Stmt::Call {
            name: "Write".to_string(),
            args: vec![
                Argument::value(Expr::Literal(Literal::String("n".to_string()))),
                Argument::by_ref(VarRef::plain("n")),
            ],
        };
        assert_eq!(s.to_string(), "Write \"n\", var n");
    }
}
