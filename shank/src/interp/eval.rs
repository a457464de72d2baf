//! Statement executor and expression evaluator

use super::builtins::{self, Host};
use super::error::{InterpResult, RuntimeError};
use super::ops;
use super::scope::CallScope;
use super::value::Value;
use crate::ast::{Argument, Expr, Function, FunctionBody, IfNode, Program, Statement, Stmt, VarRef};
use std::io::{self, BufRead, Write};

/// Default limit on nested user-function calls
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Run-time options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Function to run. When unset, every user function without
    /// parameters runs in definition order.
    pub entry: Option<String>,
    /// Seed for `GetRandom`; unset means seeded from the OS.
    pub seed: Option<u64>,
    pub max_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            entry: None,
            seed: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The interpreter
pub struct Interpreter<'io> {
    host: Host<'io>,
    config: InterpreterConfig,
    /// Current user-function call depth
    depth: usize,
}

impl Interpreter<'static> {
    /// Interpreter wired to the process's stdin and stdout
    pub fn new() -> Self {
        Interpreter::with_io(io::stdin().lock(), io::stdout())
    }
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'io> Interpreter<'io> {
    /// Interpreter reading `Read` input from `input` and sending `Write`
    /// output to `output`
    pub fn with_io(input: impl BufRead + 'io, output: impl Write + 'io) -> Self {
        Interpreter {
            host: Host::new(input, output),
            config: InterpreterConfig::default(),
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: InterpreterConfig) -> Self {
        if let Some(seed) = config.seed {
            self.host.reseed(seed);
        }
        self.config = config;
        self
    }

    /// Run the configured entry function, or every parameterless user
    /// function in definition order. Output is flushed even on error.
    pub fn run(&mut self, program: &Program) -> InterpResult<()> {
        let result = match self.config.entry.clone() {
            Some(entry) => self.call(program, &entry, &mut []),
            None => program
                .functions()
                .iter()
                .filter(|f| f.params.is_empty())
                .try_for_each(|f| self.call_function(program, f, &mut [])),
        };
        let flushed = self.host.flush();
        result.and(flushed)
    }

    /// Call a function by name. Slots of `var` parameters hold the
    /// function's final values for them afterwards.
    pub fn call(&mut self, program: &Program, name: &str, args: &mut [Value]) -> InterpResult<()> {
        let function = program
            .function(name)
            .ok_or_else(|| RuntimeError::undefined_function(name))?;
        self.call_function(program, function, args)
    }

    fn call_function(&mut self, program: &Program, function: &Function, args: &mut [Value]) -> InterpResult<()> {
        if let Some(expected) = function.arity() {
            if expected != args.len() {
                return Err(RuntimeError::arity_mismatch(&function.name, expected, args.len()));
            }
        }

        match &function.body {
            FunctionBody::Builtin(builtin) => {
                tracing::trace!(builtin = %builtin, args = args.len(), "native call");
                builtins::native(*builtin)(&mut self.host, args)
            }
            FunctionBody::User(body) => {
                if self.depth >= self.config.max_depth {
                    return Err(RuntimeError::stack_overflow(self.config.max_depth));
                }
                self.depth += 1;
                let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                    self.invoke(program, function, body, args)
                });
                self.depth -= 1;
                result
            }
        }
    }

    /// Set up a fresh scope (constants, then locals, then parameters),
    /// execute the body and copy `var` parameters back into `args`.
    fn invoke(
        &mut self,
        program: &Program,
        function: &Function,
        body: &[Statement],
        args: &mut [Value],
    ) -> InterpResult<()> {
        tracing::debug!(function = %function.name, depth = self.depth, "invoke");
        let mut scope = CallScope::new();

        for decl in function.constants() {
            if let Some(init) = &decl.init {
                scope.define_constant(&decl.name, Value::from(init));
            }
        }
        for decl in function.variables() {
            let value = match &decl.init {
                Some(init) => Value::from(init),
                None => Value::default_for(&decl.ty, decl.range.as_ref()),
            };
            scope
                .declare(&decl.name, decl.ty.clone(), decl.range.clone(), value)
                .map_err(|e| e.at_line(decl.line))?;
        }
        for (param, arg) in function.params.iter().zip(args.iter()) {
            scope.declare(&param.name, param.ty.clone(), param.range.clone(), arg.clone())?;
        }

        self.exec_block(program, &mut scope, body)?;

        for (param, slot) in function.params.iter().zip(args.iter_mut()) {
            if param.mutable {
                if let Some(value) = scope.take(&param.name) {
                    *slot = value;
                }
            }
        }
        Ok(())
    }

    fn exec_block(&mut self, program: &Program, scope: &mut CallScope, body: &[Statement]) -> InterpResult<()> {
        body.iter().try_for_each(|stmt| self.exec(program, scope, stmt))
    }

    fn exec(&mut self, program: &Program, scope: &mut CallScope, stmt: &Statement) -> InterpResult<()> {
        tracing::trace!(line = stmt.line, "exec");
        self.exec_inner(program, scope, &stmt.node)
            .map_err(|e| e.at_line(stmt.line))
    }

    fn exec_inner(&mut self, program: &Program, scope: &mut CallScope, stmt: &Stmt) -> InterpResult<()> {
        match stmt {
            Stmt::Assign { target, value } => {
                let value = eval(scope, value)?;
                store(scope, target, value)
            }
            Stmt::If(node) => self.exec_if(program, scope, node),
            Stmt::For { var, from, to, body } => {
                let start = eval_int(scope, from, "for loop start")?;
                let end = eval_int(scope, to, "for loop end")?;
                if start >= end {
                    return Err(RuntimeError::invalid_for_bounds(start, end));
                }
                for i in start..end {
                    scope.assign(var, Value::Integer(i))?;
                    self.exec_block(program, scope, body)?;
                }
                Ok(())
            }
            Stmt::While { condition, body } => {
                while eval_condition(scope, condition)? {
                    self.exec_block(program, scope, body)?;
                }
                Ok(())
            }
            Stmt::Repeat { condition, body } => loop {
                self.exec_block(program, scope, body)?;
                if eval_condition(scope, condition)? {
                    return Ok(());
                }
            },
            Stmt::Call { name, args } => self.exec_call(program, scope, name, args),
        }
    }

    fn exec_if(&mut self, program: &Program, scope: &mut CallScope, node: &IfNode) -> InterpResult<()> {
        for link in node.links() {
            let taken = match link.condition() {
                Some(condition) => eval_condition(scope, condition)?,
                None => true,
            };
            if taken {
                return self.exec_block(program, scope, link.body());
            }
        }
        Ok(())
    }

    /// Evaluate arguments, call, then store output slots back into the
    /// argument variables.
    fn exec_call(&mut self, program: &Program, scope: &mut CallScope, name: &str, args: &[Argument]) -> InterpResult<()> {
        let function = program
            .function(name)
            .ok_or_else(|| RuntimeError::undefined_function(name))?;

        for (i, arg) in args.iter().enumerate() {
            let output = function.is_output(i);
            if output && arg.expr.as_var_ref().is_none() {
                return Err(RuntimeError::not_a_variable(name, i + 1));
            }
            if arg.by_ref && !output {
                return Err(RuntimeError::unexpected_var(name, i + 1));
            }
        }

        let mut values = args
            .iter()
            .map(|arg| eval(scope, &arg.expr))
            .collect::<InterpResult<Vec<_>>>()?;
        self.call_function(program, function, &mut values)?;

        for (i, (arg, value)) in args.iter().zip(values).enumerate() {
            if !function.is_output(i) {
                continue;
            }
            if let Some(var) = arg.expr.as_var_ref() {
                store(scope, var, value)?;
            }
        }
        Ok(())
    }
}

/// Evaluate an expression in a call scope
pub fn eval(scope: &CallScope, expr: &Expr) -> InterpResult<Value> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || eval_inner(scope, expr))
}

fn eval_inner(scope: &CallScope, expr: &Expr) -> InterpResult<Value> {
    match expr {
        Expr::Literal(lit) => Ok(Value::from(lit)),
        Expr::Var(var) => load(scope, var),
        Expr::Neg(inner) => ops::negate(eval(scope, inner)?),
        Expr::Binary { left, op, right } => {
            let left = eval(scope, left)?;
            let right = eval(scope, right)?;
            ops::arithmetic(*op, left, right)
        }
        Expr::Compare { left, op, right } => {
            let left = eval(scope, left)?;
            let right = eval(scope, right)?;
            ops::compare(*op, left, right).map(Value::Boolean)
        }
    }
}

fn eval_int(scope: &CallScope, expr: &Expr, what: &str) -> InterpResult<i32> {
    let value = eval(scope, expr)?;
    value
        .as_int()
        .ok_or_else(|| RuntimeError::type_error(&format!("integer {what}"), &value.type_name()))
}

/// Conditions of `if`, `while` and `repeat` must be booleans.
fn eval_condition(scope: &CallScope, expr: &Expr) -> InterpResult<bool> {
    let value = eval(scope, expr)?;
    value
        .as_bool()
        .ok_or_else(|| RuntimeError::type_error("boolean condition", &value.type_name()))
}

fn load(scope: &CallScope, var: &VarRef) -> InterpResult<Value> {
    let value = scope
        .get(&var.name)
        .ok_or_else(|| RuntimeError::undefined_variable(&var.name))?;
    let Some(index) = &var.index else {
        return Ok(value.clone());
    };
    let index = eval_int(scope, index, "array index")?;
    match value {
        Value::Array(array) => array.get(index).cloned(),
        other => Err(RuntimeError::type_error("array", &other.type_name())),
    }
}

fn store(scope: &mut CallScope, var: &VarRef, value: Value) -> InterpResult<()> {
    match &var.index {
        None => scope.assign(&var.name, value),
        Some(index) => {
            let index = eval_int(scope, index, "array index")?;
            scope.assign_index(&var.name, index, value)
        }
    }
}
