//! Abstract Syntax Tree definitions

mod builtin;
mod expr;
mod span;
mod stmt;
mod types;

pub use builtin::*;
pub use expr::*;
pub use span::*;
pub use stmt::*;
pub use types::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Write as _};

/// A parsed program: user functions in definition order plus the
/// built-ins, all reachable by name.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    functions: Vec<Function>,
    #[serde(skip)]
    builtins: Vec<Function>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Program {
    /// Empty program with every built-in registered.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            builtins: Builtin::ALL.into_iter().map(Function::builtin).collect(),
            index: HashMap::new(),
        }
    }

    /// Add a user function. Fails with a message when the name is already
    /// taken by another function or a built-in.
    pub fn define(&mut self, function: Function) -> Result<(), String> {
        if Builtin::from_name(&function.name).is_some() {
            return Err(format!("`{}` is a built-in function and cannot be redefined", function.name));
        }
        if self.index.contains_key(&function.name) {
            return Err(format!("function `{}` is defined more than once", function.name));
        }
        self.index.insert(function.name.clone(), self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    /// Look up a user function or built-in by name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        match self.index.get(name) {
            Some(&i) => self.functions.get(i),
            None => Builtin::from_name(name).and_then(|b| self.builtins.get(b as usize)),
        }
    }

    /// User functions in definition order
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

/// Function definition, user-written or built-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<VariableDecl>,
    /// Constants and variables declared in the function, in source order
    pub locals: Vec<VariableDecl>,
    pub body: FunctionBody,
    pub span: Span,
    pub line: usize,
}

/// What runs when a function is called
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FunctionBody {
    User(Vec<Statement>),
    Builtin(Builtin),
}

impl Function {
    pub fn builtin(builtin: Builtin) -> Self {
        Self {
            name: builtin.name().to_string(),
            params: Vec::new(),
            locals: Vec::new(),
            body: FunctionBody::Builtin(builtin),
            span: Span::default(),
            line: 0,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.arity().is_none()
    }

    /// Expected argument count; `None` for variadic built-ins.
    pub fn arity(&self) -> Option<usize> {
        match self.body {
            FunctionBody::Builtin(b) => b.arity(),
            FunctionBody::User(_) => Some(self.params.len()),
        }
    }

    /// Whether the function writes argument `index` back to the caller.
    pub fn is_output(&self, index: usize) -> bool {
        match self.body {
            FunctionBody::Builtin(b) => b.is_output(index),
            FunctionBody::User(_) => self.params.get(index).is_some_and(|p| p.mutable),
        }
    }

    pub fn constants(&self) -> impl Iterator<Item = &VariableDecl> {
        self.locals.iter().filter(|d| !d.mutable)
    }

    pub fn variables(&self) -> impl Iterator<Item = &VariableDecl> {
        self.locals.iter().filter(|d| d.mutable)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            FunctionBody::Builtin(b) if self.is_variadic() => return writeln!(f, "define {b}(..) {{built-in}}"),
            FunctionBody::Builtin(b) => {
                let slots = vec!["_"; self.arity().unwrap_or(0)].join(", ");
                return writeln!(f, "define {b}({slots}) {{built-in}}");
            }
            FunctionBody::User(body) => body,
        };

        let params: Vec<String> = self.params.iter().map(VariableDecl::signature).collect();
        writeln!(f, "define {}({})", self.name, params.join("; "))?;

        let mut out = String::new();
        for decl in &self.locals {
            let keyword = if decl.mutable { "variables" } else { "constants" };
            writeln!(out, "    {keyword} {decl}")?;
        }
        write_block(&mut out, body, 1)?;
        f.write_str(&out)
    }
}

/// Parameter, local variable or constant declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub ty: DataType,
    /// `false` for constants and for parameters without `var`
    pub mutable: bool,
    /// Initial value; always present for constants
    pub init: Option<Literal>,
    pub range: Option<Range>,
    pub span: Span,
    pub line: usize,
}

impl VariableDecl {
    /// `name: type [from lo to hi]` in a `variables` section.
    ///
    /// Checks that the range suits the type: numeric bounds for numbers,
    /// non-negative lengths for strings, integer index bounds (required)
    /// for arrays, and no range at all for characters and booleans.
    pub fn variable(
        name: impl Into<String>,
        ty: DataType,
        range: Option<Range>,
        span: Span,
        line: usize,
    ) -> Result<Self, String> {
        let name = name.into();
        check_range(&name, &ty, range.as_ref())?;
        Ok(Self {
            name,
            ty,
            mutable: true,
            init: None,
            range,
            span,
            line,
        })
    }

    /// `name = literal` in a `variables` section; the type comes from the
    /// literal.
    pub fn initialized(name: impl Into<String>, init: Literal, span: Span, line: usize) -> Self {
        Self {
            name: name.into(),
            ty: init.data_type(),
            mutable: true,
            init: Some(init),
            range: None,
            span,
            line,
        }
    }

    pub fn constant(name: impl Into<String>, value: Literal, span: Span, line: usize) -> Self {
        Self {
            name: name.into(),
            ty: value.data_type(),
            mutable: false,
            init: Some(value),
            range: None,
            span,
            line,
        }
    }

    /// Function parameter; `mutable` marks a `var` parameter.
    pub fn param(name: impl Into<String>, ty: DataType, mutable: bool, span: Span, line: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            mutable,
            init: None,
            range: None,
            span,
            line,
        }
    }

    /// Rendering used in a function header: `var name: type`.
    pub fn signature(&self) -> String {
        let marker = if self.mutable { "var " } else { "" };
        format!("{marker}{}: {}", self.name, self.ty)
    }
}

/// Most elements an array may declare, and the largest minimum length a
/// string range may demand. Both are allocated when the variable is
/// created.
pub const MAX_EXTENT: i64 = 1 << 20;

fn check_range(name: &str, ty: &DataType, range: Option<&Range>) -> Result<(), String> {
    let Some(range) = range else {
        if matches!(ty, DataType::Array(_)) {
            return Err(format!("array `{name}` needs index bounds: `from <low> to <high>`"));
        }
        return Ok(());
    };

    match ty {
        DataType::Integer | DataType::String | DataType::Array(_) => {
            let (lo, hi) = range
                .int_bounds()
                .ok_or_else(|| format!("range of `{name}` must use integer bounds"))?;
            if lo > hi {
                return Err(format!("range of `{name}` is empty: {lo} is greater than {hi}"));
            }
            if *ty == DataType::String && lo < 0 {
                return Err(format!("length range of string `{name}` cannot be negative"));
            }
            if *ty == DataType::String && i64::from(lo) > MAX_EXTENT {
                return Err(format!(
                    "string `{name}` needs at least {lo} characters; the limit is {MAX_EXTENT}"
                ));
            }
            let extent = i64::from(hi) - i64::from(lo) + 1;
            if matches!(ty, DataType::Array(_)) && extent > MAX_EXTENT {
                return Err(format!(
                    "array `{name}` spans {extent} elements; the limit is {MAX_EXTENT}"
                ));
            }
            Ok(())
        }
        DataType::Real => {
            let (lo, hi) = range
                .real_bounds()
                .ok_or_else(|| format!("range of `{name}` must use numeric bounds"))?;
            if lo > hi {
                return Err(format!("range of `{name}` is empty: {lo} is greater than {hi}"));
            }
            Ok(())
        }
        DataType::Character | DataType::Boolean => {
            Err(format!("`{name}` has type {ty}, which cannot take a range"))
        }
    }
}

impl fmt::Display for VariableDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.init, &self.range) {
            (Some(init), _) => write!(f, "{} = {init}", self.name),
            (None, Some(range)) => write!(f, "{}: {} {range}", self.name, self.ty),
            (None, None) => write!(f, "{}: {}", self.name, self.ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> Function {
        Function {
            name: name.to_string(),
            params: vec![],
            locals: vec![],
            body: FunctionBody::User(vec![]),
            span: Span::default(),
            line: 1,
        }
    }

    fn int_range(lo: i32, hi: i32) -> Option<Range> {
        Some(Range::new(Literal::Integer(lo), Literal::Integer(hi)))
    }

    #[test]
    fn test_builtins_are_registered() {
        let program = Program::new();
        for builtin in Builtin::ALL {
            let function = program.function(builtin.name()).unwrap();
            assert!(matches!(function.body, FunctionBody::Builtin(b) if b == builtin));
        }
        assert!(program.functions().is_empty());
        assert!(program.function("Write").unwrap().is_variadic());
    }

    #[test]
    fn test_builtin_display_shows_slots() {
        let program = Program::new();
        assert_eq!(program.function("Write").unwrap().to_string(), "define Write(..) {built-in}\n");
        assert_eq!(program.function("Left").unwrap().to_string(), "define Left(_, _, _) {built-in}\n");
    }

    #[test]
    fn test_define_keeps_order() {
        let mut program = Program::new();
        program.define(user("main")).unwrap();
        program.define(user("helper")).unwrap();
        let names: Vec<_> = program.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "helper"]);
        assert!(program.function("helper").is_some());
        assert!(program.function("missing").is_none());
    }

    #[test]
    fn test_define_rejects_duplicates_and_builtins() {
        let mut program = Program::new();
        program.define(user("main")).unwrap();
        assert!(program.define(user("main")).unwrap_err().contains("more than once"));
        assert!(program.define(user("Write")).unwrap_err().contains("built-in"));
    }

    #[test]
    fn test_output_params() {
        let mut f = user("addTwo");
        f.params = vec![
            VariableDecl::param("x", DataType::Integer, false, Span::default(), 1),
            VariableDecl::param("sum", DataType::Integer, true, Span::default(), 1),
        ];
        assert_eq!(f.arity(), Some(2));
        assert!(!f.is_output(0));
        assert!(f.is_output(1));
        assert!(!f.is_output(2));
    }

    #[test]
    fn test_variable_range_rules() {
        let s = Span::default();
        assert!(VariableDecl::variable("v", DataType::Integer, int_range(0, 10), s, 1).is_ok());
        assert!(VariableDecl::variable("v", DataType::Integer, int_range(10, 0), s, 1).is_err());
        assert!(VariableDecl::variable("s", DataType::String, int_range(-1, 3), s, 1).is_err());
        assert!(VariableDecl::variable("b", DataType::Boolean, int_range(0, 1), s, 1).is_err());

        let real = Some(Range::new(Literal::Real(0.5), Literal::Integer(2)));
        assert!(VariableDecl::variable("r", DataType::Real, real.clone(), s, 1).is_ok());
        assert!(VariableDecl::variable("i", DataType::Integer, real, s, 1).is_err());
    }

    #[test]
    fn test_arrays_need_bounds() {
        let s = Span::default();
        let ty = DataType::Array(Box::new(DataType::Integer));
        let err = VariableDecl::variable("a", ty.clone(), None, s, 1).unwrap_err();
        assert!(err.contains("index bounds"));
        assert!(VariableDecl::variable("a", ty, int_range(1, 5), s, 1).is_ok());
    }

    #[test]
    fn test_allocation_size_is_capped() {
        let s = Span::default();
        let ty = DataType::Array(Box::new(DataType::Integer));
        let limit = MAX_EXTENT as i32;
        assert!(VariableDecl::variable("a", ty.clone(), int_range(1, limit), s, 1).is_ok());
        let err = VariableDecl::variable("a", ty, int_range(0, 2_000_000_000), s, 1).unwrap_err();
        assert!(err.contains("limit"));

        let err = VariableDecl::variable("s", DataType::String, int_range(1_000_000_000, i32::MAX), s, 1)
            .unwrap_err();
        assert!(err.contains("at least"));
        assert!(VariableDecl::variable("s", DataType::String, int_range(0, i32::MAX), s, 1).is_ok());
    }

    #[test]
    fn test_function_display() {
        let mut f = user("addTwo");
        f.params = vec![
            VariableDecl::param("x", DataType::Integer, false, Span::default(), 1),
            VariableDecl::param("sum", DataType::Integer, true, Span::default(), 1),
        ];
        f.locals = vec![VariableDecl::constant("k", Literal::Integer(2), Span::default(), 2)];
        f.body = FunctionBody::User(vec![Spanned::new(
            Stmt::Assign {
                target: VarRef::plain("sum"),
                value: Expr::binary(Expr::var("x"), BinOp::Mul, Expr::var("k")),
            },
            Span::default(),
            3,
        )]);
        insta::assert_snapshot!(f.to_string(), @r"
        define addTwo(x: integer; var sum: integer)
            constants k = 2
            sum := (x * k)
        ");
    }
}
