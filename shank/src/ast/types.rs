//! Type AST nodes

use super::Literal;
use serde::{Deserialize, Serialize};

/// Declared type of a variable, parameter or constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit signed integer
    Integer,
    /// 32-bit floating point
    Real,
    String,
    Character,
    Boolean,
    /// Fixed-size array; bounds live on the declaration's range
    Array(Box<DataType>),
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Integer => write!(f, "integer"),
            DataType::Real => write!(f, "real"),
            DataType::String => write!(f, "string"),
            DataType::Character => write!(f, "character"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Array(elem) => write!(f, "array of {elem}"),
        }
    }
}

/// Inclusive `from .. to` constraint on a declaration.
///
/// Numeric variables are limited to values in the range, strings to
/// lengths in the range, and arrays use it as their index bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub from: Literal,
    pub to: Literal,
}

impl Range {
    pub fn new(from: Literal, to: Literal) -> Self {
        Self { from, to }
    }

    /// Integer bounds, when both ends are integer literals.
    pub fn int_bounds(&self) -> Option<(i32, i32)> {
        match (&self.from, &self.to) {
            (Literal::Integer(lo), Literal::Integer(hi)) => Some((*lo, *hi)),
            _ => None,
        }
    }

    /// Bounds widened to reals, for checking real-valued variables.
    pub fn real_bounds(&self) -> Option<(f32, f32)> {
        Some((self.from.as_f32()?, self.to.as_f32()?))
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "from {} to {}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_display() {
        assert_eq!(DataType::Character.to_string(), "character");
        assert_eq!(DataType::Array(Box::new(DataType::Real)).to_string(), "array of real");
    }

    #[test]
    fn test_range_bounds() {
        let range = Range::new(Literal::Integer(0), Literal::Integer(10));
        assert_eq!(range.int_bounds(), Some((0, 10)));
        assert_eq!(range.real_bounds(), Some((0.0, 10.0)));
        assert_eq!(range.to_string(), "from 0 to 10");

        let real = Range::new(Literal::Real(0.5), Literal::Integer(2));
        assert_eq!(real.int_bounds(), None);
        assert_eq!(real.real_bounds(), Some((0.5, 2.0)));
    }
}
