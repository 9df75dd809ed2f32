//! Parser edge cases and error tests.

mod common;

use common::parse_ok;
use luamin_rs::ast::{CallArgs, Field};
use luamin_rs::{Error, ExprKind, ParseErrorKind, Span, StatKind, parse, parse_str, tokenize};

// -----------------------------------------------------------
// Statements.
// -----------------------------------------------------------

#[test]
fn parse_every_statement_form() {
    let ast = parse_ok(
        "local a, b = 1\n\
         a, b = b, a\n\
         function m.f:g() end\n\
         local function h(...) end\n\
         if a then elseif b then else end\n\
         while a do break end\n\
         repeat until a\n\
         for i = 1, 2, 3 do end\n\
         for k, v in pairs(t) do end\n\
         do end\n\
         print(a)\n\
         return a",
    );
    let kinds: Vec<_> = ast
        .body
        .stats
        .iter()
        .map(|s| std::mem::discriminant(&s.kind))
        .collect();
    assert_eq!(kinds.len(), 12);
    assert!(matches!(ast.body.stats[0].kind, StatKind::Local { .. }));
    assert!(matches!(ast.body.stats[1].kind, StatKind::Assign { .. }));
    assert!(matches!(ast.body.stats[2].kind, StatKind::Function { .. }));
    assert!(matches!(ast.body.stats[3].kind, StatKind::LocalFunction { .. }));
    assert!(matches!(ast.body.stats[4].kind, StatKind::If { .. }));
    assert!(matches!(ast.body.stats[5].kind, StatKind::While { .. }));
    assert!(matches!(ast.body.stats[6].kind, StatKind::Repeat { .. }));
    assert!(matches!(ast.body.stats[7].kind, StatKind::NumericFor { .. }));
    assert!(matches!(ast.body.stats[8].kind, StatKind::GenericFor { .. }));
    assert!(matches!(ast.body.stats[9].kind, StatKind::Do(_)));
    assert!(matches!(ast.body.stats[10].kind, StatKind::Call(_)));
    assert!(matches!(ast.body.stats[11].kind, StatKind::Return(_)));
}

#[test]
fn parse_statement_spans() {
    let ast = parse_ok("x = 1\n  print(x)");
    assert_eq!(ast.body.stats[0].span, Span::new(1, 1));
    assert_eq!(ast.body.stats[1].span, Span::new(2, 3));
}

#[test]
fn parse_if_clauses() {
    let ast = parse_ok("if a then x() elseif b then y() elseif c then else z() end");
    let StatKind::If {
        clauses,
        else_block,
    } = &ast.body.stats[0].kind
    else {
        panic!("expected if");
    };
    assert_eq!(clauses.len(), 3);
    assert_eq!(else_block.as_ref().map(|b| b.stats.len()), Some(1));
}

#[test]
fn parse_break_ends_block() {
    let err = parse_str("while true do break x() end").unwrap_err();
    assert!(err.to_string().contains("end expected near `x`"));
}

// -----------------------------------------------------------
// Expressions.
// -----------------------------------------------------------

#[test]
fn parse_env_as_parameter() {
    let ast = parse_ok("return function(_ENV, ...) return x end");
    let StatKind::Return(values) = &ast.body.stats[0].kind else {
        panic!("expected return");
    };
    let ExprKind::Function(func) = &values[0].kind else {
        panic!("expected function");
    };
    assert_eq!(func.params[0].name, "_ENV");
    assert!(func.vararg.is_some());
}

#[test]
fn parse_string_and_table_calls() {
    let ast = parse_ok("require 'mod' f { 1, k = 2, [3] = 4 } s:format[[x]]");
    let args: Vec<_> = ast
        .body
        .stats
        .iter()
        .map(|s| match &s.kind {
            StatKind::Call(e) => match &e.kind {
                ExprKind::Call(call) => &call.args,
                _ => panic!("expected call"),
            },
            _ => panic!("expected call statement"),
        })
        .collect();
    assert!(matches!(args[0], CallArgs::Str(s) if s == "'mod'"));
    let CallArgs::Table(table) = args[1] else {
        panic!("expected table args");
    };
    assert!(matches!(table.fields[0], Field::Positional(_)));
    assert!(matches!(table.fields[1], Field::Named { .. }));
    assert!(matches!(table.fields[2], Field::Keyed { .. }));
    assert!(matches!(args[2], CallArgs::Str(s) if s == "[[x]]"));
}

#[test]
fn parse_chained_suffixes() {
    let ast = parse_ok("a.b[c]:d(e)(f).g = 1");
    let StatKind::Assign { targets, .. } = &ast.body.stats[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Member { base, name } = &targets[0].kind else {
        panic!("expected member");
    };
    assert_eq!(name, "g");
    assert!(matches!(base.kind, ExprKind::Call(_)));
}

#[test]
fn parse_comparison_is_left_associative() {
    let ast = parse_ok("return a < b == c");
    let StatKind::Return(values) = &ast.body.stats[0].kind else {
        panic!("expected return");
    };
    let ExprKind::Binary { lhs, .. } = &values[0].kind else {
        panic!("expected binary");
    };
    assert!(matches!(lhs.kind, ExprKind::Binary { .. }));
}

#[test]
fn parse_paren_keeps_grouping() {
    let ast = parse_ok("return (f())");
    let StatKind::Return(values) = &ast.body.stats[0].kind else {
        panic!("expected return");
    };
    assert!(matches!(values[0].kind, ExprKind::Paren(_)));
}

#[test]
fn parse_paren_on_next_line_inside_call_args() {
    let ast = parse_ok("print(f\n(1))");
    assert_eq!(ast.body.stats.len(), 1);
    let StatKind::Call(stat) = &ast.body.stats[0].kind else {
        panic!("expected call");
    };
    let ExprKind::Call(print) = &stat.kind else {
        panic!("expected call expression");
    };
    let CallArgs::Paren(args) = &print.args else {
        panic!("expected paren args");
    };
    assert_eq!(args.len(), 1);
    let ExprKind::Call(inner) = &args[0].kind else {
        panic!("expected `f(1)` as the argument");
    };
    assert!(matches!(&inner.callee.kind, ExprKind::Name(n) if n.name == "f"));
}

#[test]
fn parse_paren_on_next_line_inside_brackets() {
    assert_eq!(parse_ok("x = (f\n(1))").body.stats.len(), 1);
    assert_eq!(parse_ok("x = t[f\n(1)]").body.stats.len(), 1);
    assert_eq!(parse_ok("x = {f\n(1), k = g\n(2)}").body.stats.len(), 1);
}

#[test]
fn parse_paren_on_next_line_starts_statement() {
    assert_eq!(parse_ok("f()\n(g)()").body.stats.len(), 2);
    assert_eq!(parse_ok("local x = y\n(f)()").body.stats.len(), 2);
    // Function bodies inside brackets still split statements.
    let ast = parse_ok("g(function() a()\n(b)() end)");
    let StatKind::Call(stat) = &ast.body.stats[0].kind else {
        panic!("expected call");
    };
    let ExprKind::Call(call) = &stat.kind else {
        panic!("expected call expression");
    };
    let CallArgs::Paren(args) = &call.args else {
        panic!("expected paren args");
    };
    let ExprKind::Function(func) = &args[0].kind else {
        panic!("expected function");
    };
    assert_eq!(func.body.stats.len(), 2);
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn parse_error_range_bounds() {
    let err = parse_str("for foo = 1 do end").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(err.span(), Span::new(1, 13));
    assert!(
        err.to_string()
            .contains("expected 2 or 3 values for range bounds")
    );
}

#[test]
fn parse_error_after_carriage_return() {
    let err = parse_str("x = 1\ry = = 2").unwrap_err();
    assert!(err.to_string().starts_with("2:5:"), "{err}");
}

#[test]
fn parse_long_string_ending_on_later_line_takes_call() {
    assert_eq!(parse_ok("x = g[[a\rb]](f)()").body.stats.len(), 1);
    assert_eq!(parse_ok("x = g[[a\r\nb]](f)()").body.stats.len(), 1);
}

#[test]
fn parse_error_local_function_dotted_name() {
    let err = parse_str("local function foo.bar() end").unwrap_err();
    assert_eq!(err.span(), Span::new(1, 19));
    assert!(err.to_string().starts_with("1:19:"));
    assert!(err.to_string().contains("`(` expected"));
}

#[test]
fn parse_error_unexpected_symbol() {
    let err = parse_str("x = )").unwrap_err();
    let Error::Parse(err) = err else {
        panic!("expected parse error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedSymbol {
            found: ")".to_string()
        }
    );
    assert_eq!(err.to_string(), "1:5: Unexpected symbol near `)`");
}

#[test]
fn parse_error_unclosed_call_at_eof() {
    let err = parse_str("print(1").unwrap_err();
    assert!(err.to_string().contains("`)` expected near `<eof>`"));
}

#[test]
fn parse_error_bad_assignment_target() {
    let err = parse_str("a, f() = 1, 2").unwrap_err();
    assert!(err.to_string().starts_with("1:4: Bad left hand side of assignment"));
}

#[test]
fn parse_error_for_missing_in() {
    let err = parse_str("for k v do end").unwrap_err();
    assert!(err.to_string().contains("`=` or `in` expected"));
}

#[test]
fn parse_error_missing_then() {
    let err = parse_str("if x do end").unwrap_err();
    assert!(err.to_string().contains("then expected near `do`"));
}

#[test]
fn parse_str_lex_error() {
    let err = parse_str("x = 'unclosed").unwrap_err();
    assert!(matches!(err, Error::Lex(_)));
}

#[test]
fn parse_from_tokens() {
    let tokens = tokenize("return 1, 2").expect("tokenize");
    let ast = parse(&tokens).expect("parse");
    assert_eq!(ast.tokens, tokens);
}
