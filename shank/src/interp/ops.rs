//! Arithmetic and comparison on runtime values
//!
//! Both go through [`promote`], which decides the common operand type
//! once. Arithmetic needs both operands to have the same type; comparison
//! additionally widens an integer to a real when the other side is real.

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::ast::{BinOp, CmpOp};
use std::cmp::Ordering;

/// Operands after promotion to a common type
#[derive(Debug, Clone, PartialEq)]
pub enum Operands {
    Integer(i32, i32),
    Real(f32, f32),
    String(String, String),
}

/// How mixed integer/real operands are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// Operand types must already match
    Exact,
    /// An integer meeting a real becomes a real
    Widen,
}

pub fn promote(op: &str, left: Value, right: Value, promotion: Promotion) -> InterpResult<Operands> {
    match (left, right, promotion) {
        (Value::Integer(a), Value::Integer(b), _) => Ok(Operands::Integer(a, b)),
        (Value::Real(a), Value::Real(b), _) => Ok(Operands::Real(a, b)),
        (Value::Integer(a), Value::Real(b), Promotion::Widen) => Ok(Operands::Real(a as f32, b)),
        (Value::Real(a), Value::Integer(b), Promotion::Widen) => Ok(Operands::Real(a, b as f32)),
        (Value::String(a), Value::String(b), _) => Ok(Operands::String(a, b)),
        (left, right, _) => Err(RuntimeError::invalid_operands(op, &left.type_name(), &right.type_name())),
    }
}

/// `+ - * / %`. Integer arithmetic wraps on overflow and fails on division
/// or remainder by zero. Reals follow IEEE `f32`. `+` on strings
/// concatenates.
pub fn arithmetic(op: BinOp, left: Value, right: Value) -> InterpResult<Value> {
    let symbol = op.to_string();
    match promote(&symbol, left, right, Promotion::Exact)? {
        Operands::Integer(a, b) => {
            let n = match op {
                BinOp::Add => a.wrapping_add(b),
                BinOp::Sub => a.wrapping_sub(b),
                BinOp::Mul => a.wrapping_mul(b),
                BinOp::Div | BinOp::Mod if b == 0 => return Err(RuntimeError::division_by_zero()),
                BinOp::Div => a.wrapping_div(b),
                BinOp::Mod => a.wrapping_rem(b),
            };
            Ok(Value::Integer(n))
        }
        Operands::Real(a, b) => {
            let r = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div => a / b,
                BinOp::Mod => a % b,
            };
            Ok(Value::Real(r))
        }
        Operands::String(a, b) => match op {
            BinOp::Add => Ok(Value::String(a + &b)),
            _ => Err(RuntimeError::invalid_operands(&symbol, "string", "string")),
        },
    }
}

/// Numeric comparison, plus `=` and `<>` on strings.
pub fn compare(op: CmpOp, left: Value, right: Value) -> InterpResult<bool> {
    let symbol = op.to_string();
    let ordering = match promote(&symbol, left, right, Promotion::Widen)? {
        Operands::Integer(a, b) => Some(a.cmp(&b)),
        Operands::Real(a, b) => a.partial_cmp(&b),
        Operands::String(a, b) => match op {
            CmpOp::Eq => return Ok(a == b),
            CmpOp::NotEq => return Ok(a != b),
            _ => return Err(RuntimeError::invalid_operands(&symbol, "string", "string")),
        },
    };

    // NaN compares unequal to everything
    let Some(ordering) = ordering else {
        return Ok(op == CmpOp::NotEq);
    };
    Ok(match op {
        CmpOp::Eq => ordering == Ordering::Equal,
        CmpOp::NotEq => ordering != Ordering::Equal,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::LtEq => ordering != Ordering::Greater,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::GtEq => ordering != Ordering::Less,
    })
}

/// Unary minus on integers (wrapping) and reals.
pub fn negate(value: Value) -> InterpResult<Value> {
    match value {
        Value::Integer(n) => Ok(Value::Integer(n.wrapping_neg())),
        Value::Real(r) => Ok(Value::Real(-r)),
        other => Err(RuntimeError::type_error("integer or real", &other.type_name())),
    }
}
