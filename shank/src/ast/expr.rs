//! Expression AST nodes

use super::DataType;
use serde::{Deserialize, Serialize};

/// Literal value as written in source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i32),
    Real(f32),
    String(String),
    Character(char),
    Boolean(bool),
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::Integer(_) => DataType::Integer,
            Literal::Real(_) => DataType::Real,
            Literal::String(_) => DataType::String,
            Literal::Character(_) => DataType::Character,
            Literal::Boolean(_) => DataType::Boolean,
        }
    }

    /// Numeric value widened to `f32`, if the literal is numeric.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Literal::Integer(n) => Some(*n as f32),
            Literal::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Negated numeric literal; `None` for non-numeric literals.
    pub fn negate(self) -> Option<Literal> {
        match self {
            Literal::Integer(n) => Some(Literal::Integer(n.wrapping_neg())),
            Literal::Real(r) => Some(Literal::Real(-r)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Real(r) if r.fract() == 0.0 => write!(f, "{r:.1}"),
            Literal::Real(r) => write!(f, "{r}"),
            Literal::String(s) => write!(f, "\"{s}\""),
            Literal::Character(c) => write!(f, "'{c}'"),
            Literal::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Reference to a variable, optionally indexed: `x` or `a[i + 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
    pub index: Option<Box<Expr>>,
}

impl VarRef {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(name: impl Into<String>, index: Expr) -> Self {
        Self {
            name: name.into(),
            index: Some(Box::new(index)),
        }
    }
}

impl std::fmt::Display for VarRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),

    /// Variable or array element
    Var(VarRef),

    /// Unary minus
    Neg(Box<Expr>),

    /// Arithmetic: `+ - * / %`
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Comparison; at most one per expression
    Compare {
        left: Box<Expr>,
        op: CmpOp,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn compare(left: Expr, op: CmpOp, right: Expr) -> Self {
        Expr::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(VarRef::plain(name))
    }

    /// The variable this expression names, if it can be written to.
    pub fn as_var_ref(&self) -> Option<&VarRef> {
        match self {
            Expr::Var(var) => Some(var),
            _ => None,
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Var(var) => write!(f, "{var}"),
            Expr::Neg(inner) => write!(f, "-{inner}"),
            Expr::Binary { left, op, right } => write!(f, "({left} {op} {right})"),
            Expr::Compare { left, op, right } => write!(f, "{left} {op} {right}"),
        }
    }
}

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        };
        write!(f, "{s}")
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "<>",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        };
        write!(f, "{s}")
    }
}
