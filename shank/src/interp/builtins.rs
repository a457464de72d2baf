//! Native implementations of the built-in functions
//!
//! Every built-in works on a mutable argument slice: inputs are read
//! from it and outputs are written into it, and the caller copies the
//! output slots back into the argument variables.

use super::error::{InterpResult, RuntimeError};
use super::value::{ArrayValue, Value};
use crate::ast::Builtin;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Native function type
pub type NativeFn = fn(&mut Host<'_>, &mut [Value]) -> InterpResult<()>;

/// What the built-ins touch outside the program: console streams and the
/// random number source.
pub struct Host<'io> {
    input: Box<dyn BufRead + 'io>,
    output: Box<dyn Write + 'io>,
    /// Words read from the current input line but not consumed yet
    pending: VecDeque<String>,
    rng: StdRng,
}

impl<'io> Host<'io> {
    pub fn new(input: impl BufRead + 'io, output: impl Write + 'io) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            pending: VecDeque::new(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Fixed seed for reproducible `GetRandom` results.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Next whitespace-separated word, reading more lines as needed.
    fn next_word(&mut self) -> InterpResult<String> {
        loop {
            if let Some(word) = self.pending.pop_front() {
                return Ok(word);
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(RuntimeError::io_error("end of input while reading"));
            }
            self.pending.extend(line.split_whitespace().map(str::to_string));
        }
    }

    fn write_line(&mut self, line: &str) -> InterpResult<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    pub fn flush(&mut self) -> InterpResult<()> {
        self.output.flush()?;
        Ok(())
    }
}

/// Implementation for a built-in
pub fn native(builtin: Builtin) -> NativeFn {
    match builtin {
        Builtin::Read => builtin_read,
        Builtin::Write => builtin_write,
        Builtin::Left => builtin_left,
        Builtin::Right => builtin_right,
        Builtin::Substring => builtin_substring,
        Builtin::SquareRoot => builtin_square_root,
        Builtin::GetRandom => builtin_get_random,
        Builtin::IntegerToReal => builtin_integer_to_real,
        Builtin::RealToInteger => builtin_real_to_integer,
        Builtin::Start => builtin_start,
        Builtin::End => builtin_end,
    }
}

// ---- argument access --------------------------------------------------

fn string_arg<'v>(func: &str, args: &'v [Value], i: usize) -> InterpResult<&'v str> {
    args[i]
        .as_str()
        .ok_or_else(|| RuntimeError::type_error(&format!("string for argument {} of {func}", i + 1), &args[i].type_name()))
}

fn int_arg(func: &str, args: &[Value], i: usize) -> InterpResult<i32> {
    args[i]
        .as_int()
        .ok_or_else(|| RuntimeError::type_error(&format!("integer for argument {} of {func}", i + 1), &args[i].type_name()))
}

fn real_arg(func: &str, args: &[Value], i: usize) -> InterpResult<f32> {
    match args[i] {
        Value::Real(r) => Ok(r),
        ref other => Err(RuntimeError::type_error(&format!("real for argument {} of {func}", i + 1), &other.type_name())),
    }
}

fn array_arg<'v>(func: &str, args: &'v [Value], i: usize) -> InterpResult<&'v ArrayValue> {
    match &args[i] {
        Value::Array(array) => Ok(array),
        other => Err(RuntimeError::type_error(&format!("array for argument {} of {func}", i + 1), &other.type_name())),
    }
}

/// Characters `[start, start + len)` of `text`, counted in chars.
fn char_slice(func: &str, text: &str, start: i32, len: i32) -> InterpResult<String> {
    let total = text.chars().count();
    let (Ok(start), Ok(len)) = (usize::try_from(start), usize::try_from(len)) else {
        return Err(RuntimeError::string_bounds(
            func,
            format!("position {start} and length {len} must not be negative"),
        ));
    };
    if start.saturating_add(len) > total {
        return Err(RuntimeError::string_bounds(
            func,
            format!("{len} character(s) from position {start} exceed the {total} available"),
        ));
    }
    Ok(text.chars().skip(start).take(len).collect())
}

// ---- console ----------------------------------------------------------

/// `Read var a, var b, ...`: one word of input per argument, parsed as
/// the argument variable's type.
fn builtin_read(host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    for slot in args.iter_mut() {
        let word = host.next_word()?;
        *slot = slot.parse_as(&word)?;
    }
    Ok(())
}

/// `Write a, b, ...`: arguments separated by spaces, then a newline.
fn builtin_write(host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let line = args.iter().map(Value::to_string).collect::<Vec<_>>().join(" ");
    host.write_line(&line)
}

// ---- strings ----------------------------------------------------------

fn builtin_left(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let text = string_arg("Left", args, 0)?;
    let len = int_arg("Left", args, 1)?;
    args[2] = Value::String(char_slice("Left", text, 0, len)?);
    Ok(())
}

fn builtin_right(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let text = string_arg("Right", args, 0)?;
    let len = int_arg("Right", args, 1)?;
    let total = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    let start = if (0..=total).contains(&len) { total - len } else { 0 };
    args[2] = Value::String(char_slice("Right", text, start, len)?);
    Ok(())
}

/// `Substring text, index, length, var out` with a 0-based index.
fn builtin_substring(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let text = string_arg("Substring", args, 0)?;
    let start = int_arg("Substring", args, 1)?;
    let len = int_arg("Substring", args, 2)?;
    args[3] = Value::String(char_slice("Substring", text, start, len)?);
    Ok(())
}

// ---- numbers ----------------------------------------------------------

fn builtin_square_root(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let x = real_arg("SquareRoot", args, 0)?;
    args[1] = Value::Real(x.sqrt());
    Ok(())
}

fn builtin_get_random(host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    args[0] = Value::Integer(host.rng.random::<i32>());
    Ok(())
}

fn builtin_integer_to_real(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let n = int_arg("IntegerToReal", args, 0)?;
    args[1] = Value::Real(n as f32);
    Ok(())
}

/// Truncates toward zero; out-of-range values saturate.
fn builtin_real_to_integer(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let r = real_arg("RealToInteger", args, 0)?;
    args[1] = Value::Integer(r as i32);
    Ok(())
}

// ---- arrays -----------------------------------------------------------

fn builtin_start(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let array = array_arg("Start", args, 0)?;
    let first = array
        .items
        .first()
        .cloned()
        .ok_or_else(|| RuntimeError::index_out_of_bounds(array.lower, array.lower, 0))?;
    args[1] = first;
    Ok(())
}

fn builtin_end(_host: &mut Host<'_>, args: &mut [Value]) -> InterpResult<()> {
    let array = array_arg("End", args, 0)?;
    let last = array
        .items
        .last()
        .cloned()
        .ok_or_else(|| RuntimeError::index_out_of_bounds(array.lower, array.lower, 0))?;
    args[1] = last;
    Ok(())
}
