//! Runtime values for the interpreter

use super::error::{InterpResult, RuntimeError};
use crate::ast::{DataType, Literal, Range};
use std::fmt;

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Real(f32),
    String(String),
    Character(char),
    Boolean(bool),
    Array(ArrayValue),
}

/// Fixed-size array indexed from `lower`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub elem: DataType,
    pub lower: i32,
    pub items: Vec<Value>,
}

impl ArrayValue {
    fn slot(&self, index: i32) -> InterpResult<usize> {
        let offset = i64::from(index) - i64::from(self.lower);
        usize::try_from(offset)
            .ok()
            .filter(|&i| i < self.items.len())
            .ok_or_else(|| RuntimeError::index_out_of_bounds(index, self.lower, self.items.len()))
    }

    pub fn get(&self, index: i32) -> InterpResult<&Value> {
        Ok(&self.items[self.slot(index)?])
    }

    /// Store `value` at `index`; the value must have the element type.
    pub fn set(&mut self, name: &str, index: i32, value: Value) -> InterpResult<()> {
        let slot = self.slot(index)?;
        let got = value.data_type();
        if got != self.elem {
            return Err(RuntimeError::assignment_mismatch(&format!("{name}[{index}]"), &self.elem, &got));
        }
        self.items[slot] = value;
        Ok(())
    }
}

impl Value {
    /// Zero value for a declared type: `0`, `0.0`, `""`, `' '`, `false`.
    /// A range moves the zero to its nearest bound (for strings, pads to
    /// the minimum length). Arrays are filled with zero elements over
    /// their index range.
    pub fn default_for(ty: &DataType, range: Option<&Range>) -> Value {
        match ty {
            DataType::Integer => {
                let (lo, hi) = range.and_then(Range::int_bounds).unwrap_or((0, 0));
                Value::Integer(0.clamp(lo, hi.max(lo)))
            }
            DataType::Real => {
                let (lo, hi) = range.and_then(Range::real_bounds).unwrap_or((0.0, 0.0));
                Value::Real(0.0_f32.clamp(lo, hi.max(lo)))
            }
            DataType::String => {
                let min_len = range.and_then(Range::int_bounds).map_or(0, |(lo, _)| lo.max(0));
                Value::String(" ".repeat(min_len as usize))
            }
            DataType::Character => Value::Character(' '),
            DataType::Boolean => Value::Boolean(false),
            DataType::Array(elem) => {
                let (lower, upper) = range.and_then(Range::int_bounds).unwrap_or((0, -1));
                let len = usize::try_from(i64::from(upper) - i64::from(lower) + 1).unwrap_or(0);
                Value::Array(ArrayValue {
                    elem: (**elem).clone(),
                    lower,
                    items: vec![Value::default_for(elem, None); len],
                })
            }
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Real(_) => DataType::Real,
            Value::String(_) => DataType::String,
            Value::Character(_) => DataType::Character,
            Value::Boolean(_) => DataType::Boolean,
            Value::Array(array) => DataType::Array(Box::new(array.elem.clone())),
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> String {
        self.data_type().to_string()
    }

    /// Parse `text` as a value of the same variant as `self`.
    pub fn parse_as(&self, text: &str) -> InterpResult<Value> {
        let text = text.trim();
        let invalid = || RuntimeError::type_error(&self.type_name(), &format!("input {text:?}"));
        match self {
            Value::Integer(_) => text.parse().map(Value::Integer).map_err(|_| invalid()),
            Value::Real(_) => text.parse().map(Value::Real).map_err(|_| invalid()),
            Value::String(_) => Ok(Value::String(text.to_string())),
            Value::Character(_) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Character(c)),
                    _ => Err(invalid()),
                }
            }
            Value::Boolean(_) => match text {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(invalid()),
            },
            Value::Array(_) => Err(RuntimeError::type_error("a scalar variable", "array")),
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Integer(n) => Value::Integer(*n),
            Literal::Real(r) => Value::Real(*r),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Character(c) => Value::Character(*c),
            Literal::Boolean(b) => Value::Boolean(*b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{r:.1}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Character(c) => write!(f, "{c}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Array(array) => {
                write!(f, "[")?;
                for (i, item) in array.items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
