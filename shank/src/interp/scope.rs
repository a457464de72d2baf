//! Variable storage for one function invocation
//!
//! Shank has no nested scopes: a call sees its own parameters, locals
//! and constants and nothing else. Each binding remembers its declared
//! type and range so that every store can be checked.

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::ast::{DataType, Range};
use std::collections::HashMap;

#[derive(Debug)]
struct Binding {
    value: Value,
    ty: DataType,
    range: Option<Range>,
    constant: bool,
}

/// Name to value map for a single call
#[derive(Debug, Default)]
pub struct CallScope {
    bindings: HashMap<String, Binding>,
}

impl CallScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_constant(&mut self, name: &str, value: Value) {
        let ty = value.data_type();
        self.bindings.insert(
            name.to_string(),
            Binding {
                value,
                ty,
                range: None,
                constant: true,
            },
        );
    }

    /// Bind a variable with its initial value, which must already satisfy
    /// the declared type and range.
    pub fn declare(&mut self, name: &str, ty: DataType, range: Option<Range>, value: Value) -> InterpResult<()> {
        check_value(name, &ty, range.as_ref(), &value)?;
        self.bindings.insert(
            name.to_string(),
            Binding {
                value,
                ty,
                range,
                constant: false,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    /// Replace a variable's value after checking that it is declared, not a
    /// constant, of the declared type and inside the declared range.
    pub fn assign(&mut self, name: &str, value: Value) -> InterpResult<()> {
        let binding = self.writable(name)?;
        if let (Value::Array(target), Value::Array(source)) = (&mut binding.value, &value) {
            if target.elem != source.elem || target.items.len() != source.items.len() {
                return Err(RuntimeError::assignment_mismatch(name, &binding.ty, &value.data_type()));
            }
            target.items.clone_from(&source.items);
            return Ok(());
        }
        check_value(name, &binding.ty, binding.range.as_ref(), &value)?;
        binding.value = value;
        Ok(())
    }

    /// Store one element of an array variable.
    pub fn assign_index(&mut self, name: &str, index: i32, value: Value) -> InterpResult<()> {
        let binding = self.writable(name)?;
        match &mut binding.value {
            Value::Array(array) => array.set(name, index, value),
            other => Err(RuntimeError::type_error("array", &other.type_name())),
        }
    }

    /// Remove and return a binding's value; used to copy `var` parameters
    /// back to the caller.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name).map(|b| b.value)
    }

    fn writable(&mut self, name: &str) -> InterpResult<&mut Binding> {
        match self.bindings.get_mut(name) {
            Some(binding) if binding.constant => Err(RuntimeError::constant_assignment(name)),
            Some(binding) => Ok(binding),
            None => Err(RuntimeError::undefined_variable(name)),
        }
    }
}

/// Exact type match plus the declared range, if any. Ranges bound the
/// value of numbers and the length of strings; an array's range is its
/// index bounds and does not constrain stored values.
fn check_value(name: &str, ty: &DataType, range: Option<&Range>, value: &Value) -> InterpResult<()> {
    let got = value.data_type();
    if got != *ty {
        return Err(RuntimeError::assignment_mismatch(name, ty, &got));
    }
    let Some(range) = range else {
        return Ok(());
    };

    let inside = match value {
        Value::Integer(n) => range.int_bounds().is_none_or(|(lo, hi)| (lo..=hi).contains(n)),
        Value::Real(r) => range.real_bounds().is_none_or(|(lo, hi)| (lo..=hi).contains(r)),
        Value::String(s) => {
            let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
            range
                .int_bounds()
                .is_none_or(|(lo, hi)| (i64::from(lo)..=i64::from(hi)).contains(&len))
        }
        Value::Character(_) | Value::Boolean(_) | Value::Array(_) => true,
    };

    if inside {
        Ok(())
    } else {
        let shown = match value {
            Value::String(s) => format!("{s:?} (length {})", s.chars().count()),
            other => other.to_string(),
        };
        Err(RuntimeError::out_of_range(name, &shown, &range.to_string()))
    }
}
