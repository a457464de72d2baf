//! Parser tests for Shank language features

use crate::ast::{
    BinOp, CmpOp, DataType, Expr, FunctionBody, Literal, Program, Range, Statement, Stmt, VarRef,
};
use crate::error::ShankError;
use crate::lexer::tokenize;
use crate::parser::parse;
use pretty_assertions::assert_eq;

/// Helper to parse a Shank program and return the AST
fn parse_program(source: &str) -> crate::Result<Program> {
    let tokens = tokenize(source)?;
    parse(&tokens)
}

/// Helper to parse and expect success
fn parse_ok(source: &str) -> Program {
    parse_program(source).expect("Parse should succeed")
}

/// Helper to parse and expect a syntax error; returns (message, line)
fn parse_err(source: &str) -> (String, usize) {
    match parse_program(source) {
        Err(ShankError::Syntax { message, line, .. }) => (message, line),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

fn body_of<'p>(program: &'p Program, name: &str) -> &'p [Statement] {
    match &program.function(name).expect("function exists").body {
        FunctionBody::User(body) => body,
        FunctionBody::Builtin(_) => panic!("{name} is a built-in"),
    }
}

fn int(n: i32) -> Expr {
    Expr::Literal(Literal::Integer(n))
}

// ============================================
// Functions and declarations
// ============================================

#[test]
fn test_parse_add_two() {
    let program = parse_ok(
        "define addTwo(x, y: integer; var sum: integer)\n    sum := x + y\n",
    );
    let f = program.function("addTwo").unwrap();
    let params: Vec<_> = f.params.iter().map(|p| (p.name.as_str(), p.ty.clone(), p.mutable)).collect();
    assert_eq!(
        params,
        vec![
            ("x", DataType::Integer, false),
            ("y", DataType::Integer, false),
            ("sum", DataType::Integer, true),
        ]
    );
    assert_eq!(
        body_of(&program, "addTwo")[0].node,
        Stmt::Assign {
            target: VarRef::plain("sum"),
            value: Expr::binary(Expr::var("x"), BinOp::Add, Expr::var("y")),
        }
    );
}

#[test]
fn test_parse_comma_separated_param_groups() {
    let program = parse_ok("define f(a: integer, var b: real)\n    b := 1.0\n");
    let f = program.function("f").unwrap();
    assert_eq!(f.params.len(), 2);
    assert_eq!(f.params[1].ty, DataType::Real);
    assert!(f.params[1].mutable);
}

#[test]
fn test_parse_variables_with_range() {
    let program = parse_ok("define main()\n    variables v: integer from 0 to 10\n    v := 3\n");
    let v = &program.function("main").unwrap().locals[0];
    assert_eq!(v.name, "v");
    assert_eq!(v.ty, DataType::Integer);
    assert_eq!(v.range, Some(Range::new(Literal::Integer(0), Literal::Integer(10))));
    assert!(v.mutable);
}

#[test]
fn test_parse_declaration_blocks() {
    let source = "\
define main()
    constants
        half = 0.5
        const big = 1000, small = -1
    variables
        a, b: integer
        name: string
        total = 0
    a := big
";
    let program = parse_ok(source);
    let f = program.function("main").unwrap();
    let constants: Vec<_> = f.constants().map(|d| (d.name.as_str(), d.init.clone())).collect();
    assert_eq!(
        constants,
        vec![
            ("half", Some(Literal::Real(0.5))),
            ("big", Some(Literal::Integer(1000))),
            ("small", Some(Literal::Integer(-1))),
        ]
    );
    let variables: Vec<_> = f.variables().map(|d| (d.name.as_str(), d.ty.clone())).collect();
    assert_eq!(
        variables,
        vec![
            ("a", DataType::Integer),
            ("b", DataType::Integer),
            ("name", DataType::String),
            ("total", DataType::Integer),
        ]
    );
}

#[test]
fn test_parse_array_declaration() {
    let program = parse_ok("define main()\n    variables a: array of real from 1 to 5\n    a[1] := 2.5\n");
    let a = &program.function("main").unwrap().locals[0];
    assert_eq!(a.ty, DataType::Array(Box::new(DataType::Real)));
    assert_eq!(a.range.as_ref().and_then(Range::int_bounds), Some((1, 5)));
    assert_eq!(
        body_of(&program, "main")[0].node,
        Stmt::Assign {
            target: VarRef::indexed("a", int(1)),
            value: Expr::Literal(Literal::Real(2.5)),
        }
    );
}

#[test]
fn test_array_without_bounds_fails() {
    let (message, line) = parse_err("define main()\n    variables a: array of integer\n    a[0] := 1\n");
    assert!(message.contains("index bounds"));
    assert_eq!(line, 2);
}

#[test]
fn test_nested_arrays_fail() {
    let (message, _) = parse_err("define main()\n    variables a: array of array of integer from 0 to 1\n    a := a\n");
    assert!(message.contains("arrays of arrays"));
}

#[test]
fn test_oversized_array_fails_before_running() {
    let (message, line) = parse_err("define main()\n    variables a: array of integer from 0 to 2000000000\n    a[0] := 1\n");
    assert!(message.contains("limit"));
    assert_eq!(line, 2);
}

#[test]
fn test_duplicate_declaration_fails() {
    let (message, line) = parse_err("define f(x: integer)\n    variables x: real\n    x := 1.0\n");
    assert!(message.contains("declared more than once"));
    assert_eq!(line, 2);
}

#[test]
fn test_duplicate_function_fails() {
    let (message, line) = parse_err("define f()\n    Write 1\ndefine f()\n    Write 2\n");
    assert!(message.contains("more than once"));
    assert_eq!(line, 3);
}

#[test]
fn test_builtin_name_cannot_be_redefined() {
    let (message, _) = parse_err("define Write()\n    x := 1\n");
    assert!(message.contains("built-in"));
}

#[test]
fn test_functions_keep_definition_order() {
    let program = parse_ok("define b()\n    Write 1\ndefine a()\n    Write 2\n");
    let names: Vec<_> = program.functions().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

// ============================================
// Statements
// ============================================

#[test]
fn test_call_before_definition_is_a_call() {
    let program = parse_ok("define main()\n    helper 1, 2\ndefine helper(a, b: integer)\n    Write a\n");
    assert_eq!(
        body_of(&program, "main")[0].node,
        Stmt::Call {
            name: "helper".to_string(),
            args: vec![
                crate::ast::Argument::value(int(1)),
                crate::ast::Argument::value(int(2)),
            ],
        }
    );
}

#[test]
fn test_parenthesized_and_bare_calls_agree() {
    let bare = parse_ok("define main()\n    Write \"count\", 7\n");
    let parens = parse_ok("define main()\n    Write(\"count\", 7)\n");
    assert_eq!(body_of(&bare, "main")[0].node, body_of(&parens, "main")[0].node);
}

#[test]
fn test_leading_parenthesized_argument_in_bare_call() {
    let program = parse_ok("define main()\n    variables a: integer\n    Write (a + 1) * 2, (a)\n");
    let Stmt::Call { args, .. } = &body_of(&program, "main")[0].node else {
        panic!("expected call");
    };
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["((a + 1) * 2)", "a"]);
}

#[test]
fn test_call_without_arguments() {
    let program = parse_ok("define main()\n    Write\n    Write()\n");
    for stmt in body_of(&program, "main") {
        assert!(matches!(&stmt.node, Stmt::Call { args, .. } if args.is_empty()));
    }
}

#[test]
fn test_var_argument() {
    let program = parse_ok("define main()\n    variables r: real\n    SquareRoot 2.0, var r\n");
    let Stmt::Call { args, .. } = &body_of(&program, "main")[0].node else {
        panic!("expected call");
    };
    assert!(!args[0].by_ref);
    assert!(args[1].by_ref);
    assert_eq!(args[1].expr, Expr::var("r"));
}

#[test]
fn test_var_argument_must_be_variable() {
    let (message, line) = parse_err("define main()\n    Write 1\n    GetRandom var 3\n");
    assert!(message.contains("must be a variable"));
    assert_eq!(line, 3);
}

#[test]
fn test_parenthesized_call_keeps_its_error() {
    let (message, line) = parse_err("define main()\n    GetRandom(var 3)\n");
    assert!(message.contains("must be a variable"));
    assert_eq!(line, 2);
}

#[test]
fn test_parse_if_chain() {
    let source = "\
define main()
    variables n: integer
    if n < 0 then
        Write \"neg\"
    elsif n = 0 then
        Write \"zero\"
    else
        Write \"pos\"
";
    let program = parse_ok(source);
    let Stmt::If(node) = &body_of(&program, "main")[0].node else {
        panic!("expected if");
    };
    let links: Vec<_> = node.links().collect();
    assert_eq!(links.len(), 3);
    assert_eq!(
        links[0].condition(),
        Some(&Expr::compare(Expr::var("n"), CmpOp::Lt, int(0)))
    );
    assert_eq!(
        links[1].condition(),
        Some(&Expr::compare(Expr::var("n"), CmpOp::Eq, int(0)))
    );
    assert_eq!(links[2].condition(), None);
}

#[test]
fn test_parse_if_without_else() {
    let program = parse_ok("define main()\n    if true then\n        Write 1\n    Write 2\n");
    let body = body_of(&program, "main");
    assert_eq!(body.len(), 2);
    let Stmt::If(node) = &body[0].node else {
        panic!("expected if");
    };
    assert!(node.next().is_none());
}

#[test]
fn test_parse_loops() {
    let source = "\
define main()
    variables i: integer
    for i from 0 to 3
        Write i
    while i > 0
        i := i - 1
    repeat until i >= 5
        i := i + 1
";
    let program = parse_ok(source);
    let body = body_of(&program, "main");
    assert!(matches!(&body[0].node, Stmt::For { var, from, to, body } if var == "i" && *from == int(0) && *to == int(3) && body.len() == 1));
    assert!(matches!(&body[1].node, Stmt::While { condition: Expr::Compare { op: CmpOp::Gt, .. }, .. }));
    assert!(matches!(&body[2].node, Stmt::Repeat { condition: Expr::Compare { op: CmpOp::GtEq, .. }, .. }));
}

#[test]
fn test_statement_lines() {
    let program = parse_ok("define main()\n    Write 1\n\n    Write 2\n");
    let lines: Vec<_> = body_of(&program, "main").iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 4]);
}

// ============================================
// Expressions
// ============================================

fn parse_value(expr: &str) -> Expr {
    let program = parse_ok(&format!("define main()\n    variables x, y, z: integer\n    x := {expr}\n"));
    match &body_of(&program, "main")[0].node {
        Stmt::Assign { value, .. } => value.clone(),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_precedence() {
    assert_eq!(parse_value("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
    assert_eq!(parse_value("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
    assert_eq!(parse_value("x - y - z").to_string(), "((x - y) - z)");
    assert_eq!(parse_value("x % y / z").to_string(), "((x % y) / z)");
}

#[test]
fn test_unary_minus() {
    assert_eq!(parse_value("-x * 2"), Expr::binary(Expr::Neg(Box::new(Expr::var("x"))), BinOp::Mul, int(2)));
}

#[test]
fn test_most_negative_integer() {
    assert_eq!(parse_value("-2147483648"), int(i32::MIN));
    assert_eq!(parse_value("-2147483647"), Expr::Neg(Box::new(int(i32::MAX))));

    let program = parse_ok("define main()\n    constants low = -2147483648\n    Write low\n");
    let low = &program.function("main").unwrap().locals[0];
    assert_eq!(low.init, Some(Literal::Integer(i32::MIN)));
}

#[test]
fn test_min_integer_magnitude_needs_minus() {
    let (message, line) = parse_err("define main()\n    variables x: integer\n    x := 2147483648\n");
    assert!(message.contains("minus"));
    assert_eq!(line, 3);
}

#[test]
fn test_both_equality_spellings() {
    assert_eq!(parse_value("x = 1"), parse_value("x == 1"));
}

#[test]
fn test_indexed_read() {
    assert_eq!(
        parse_value("y[x + 1]"),
        Expr::Var(VarRef::indexed("y", Expr::binary(Expr::var("x"), BinOp::Add, int(1))))
    );
}

#[test]
fn test_comparisons_do_not_chain() {
    let (message, line) = parse_err("define main()\n    if 1 < 2 < 3 then\n        Write 1\n");
    assert!(message.contains("then"));
    assert_eq!(line, 2);
}

// ============================================
// Errors
// ============================================

#[test]
fn test_missing_assignment_operator() {
    let (message, line) = parse_err("define main()\n    variables x: integer\n    x = 3\n");
    assert!(message.contains(":="));
    assert_eq!(line, 3);
}

#[test]
fn test_missing_body() {
    let (message, _) = parse_err("define main()\n");
    assert!(message.contains("indented"));
}

#[test]
fn test_keyword_as_name() {
    let (message, line) = parse_err("define main()\n    variables to: integer\n");
    assert!(message.contains("`to` is a reserved word"));
    assert_eq!(line, 2);
}

#[test]
fn test_statement_outside_function() {
    let (message, line) = parse_err("x := 1\n");
    assert!(message.contains("define"));
    assert_eq!(line, 1);
}

#[test]
fn test_error_reports_offending_token() {
    match parse_program("define main()\n    for 3 from 0 to 1\n        Write 1\n") {
        Err(ShankError::Syntax { token, .. }) => assert_eq!(token, "integer literal"),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_display_matches_source_shape() {
    let source = "\
define main()
    variables i: integer from 0 to 9
    for i from 0 to 3
        if i <> 2 then
            Write i
";
    let program = parse_ok(source);
    insta::assert_snapshot!(program.to_string(), @r"
    define main()
        variables i: integer from 0 to 9
        for i from 0 to 3
            if i <> 2 then
                Write i
    ");
}
