//! End-to-end pipeline tests: source in, transformed source out.

mod common;

use common::{parse_ok, roundtrip};
use luamin_rs::{
    Error, Style, beautify, beautify_str, format, minify, minify_str, parse_str, resolve, tokenize,
};

// -----------------------------------------------------------
// Minify.
// -----------------------------------------------------------

#[test]
fn minify_function_and_parameter() {
    assert_eq!(
        minify_str("function foo(bar) return bar end").unwrap(),
        "function a(b)return b end"
    );
}

#[test]
fn minify_vararg_function() {
    assert_eq!(
        minify_str("return function(...) end").unwrap(),
        "return function(...)end"
    );
}

#[test]
fn minify_keeps_statement_separator() {
    assert_eq!(
        minify_str("print();   (\"a\"):len()").unwrap(),
        "print();(\"a\"):len()"
    );
}

#[test]
fn minify_keeps_host_globals() {
    assert_eq!(
        minify_str("local message = 'hi'\nprint(string.upper(message))").unwrap(),
        "local a='hi'print(string.upper(a))"
    );
}

#[test]
fn minify_env_parameter_untouched() {
    assert_eq!(
        minify_str("local function sandbox(_ENV) return x end").unwrap(),
        "local function a(_ENV)return x end"
    );
}

#[test]
fn minify_keeps_method_self() {
    assert_eq!(
        minify_str("local obj = {} function obj:get() return self.value end").unwrap(),
        "local a={}function a:get()return self.value end"
    );
}

#[test]
fn minify_is_idempotent() {
    let source = "\
local function fib(n)
    if n < 2 then return n end
    return fib(n - 1) + fib(n - 2)
end
cache = {}
for i = 1, 10 do cache[i] = fib(i) end
print(cache[10])
";
    let once = minify_str(source).unwrap();
    let twice = minify_str(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn minify_with_precomputed_scopes() {
    let ast = parse_ok("local x = 1 return x");
    let tree = resolve(&ast);
    assert_eq!(minify(&ast, Some(&tree)), minify(&ast, None));
    assert_eq!(minify(&ast, None), "local a=1 return a");
}

// -----------------------------------------------------------
// Beautify.
// -----------------------------------------------------------

#[test]
fn beautify_minified_function() {
    let min = minify_str("function foo(bar) return bar end").unwrap();
    assert_eq!(
        beautify_str(&min).unwrap(),
        "\nfunction G_1(L_1_arg1)\n\treturn L_1_arg1\nend"
    );
}

#[test]
fn beautify_nested_scopes() {
    let source = "local a = 1 local function f(x) local y = x do local z = y end end";
    assert_eq!(
        beautify_str(source).unwrap(),
        "local L_1_1 = 1\n\n\
         local function L_1_2(L_2_arg1)\n\
         \tlocal L_2_1 = L_2_arg1\n\
         \tdo\n\
         \t\tlocal L_3_1 = L_2_1\n\
         \tend\n\
         end"
    );
}

#[test]
fn beautify_with_precomputed_scopes() {
    let ast = parse_ok("x = 1");
    let tree = resolve(&ast);
    assert_eq!(beautify(&ast, Some(&tree)), "G_1 = 1");
}

// -----------------------------------------------------------
// Literal round-trips and boundaries.
// -----------------------------------------------------------

#[test]
fn return_true_reprints_unchanged() {
    roundtrip("return true");
    let ast = parse_ok("return true");
    assert_eq!(format(&ast, Style::Compact), "return true");
    assert_eq!(format(&ast, Style::Expanded), "return true");
}

#[test]
fn empty_source() {
    let tokens = tokenize("").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    let ast = parse_ok("");
    assert!(ast.body.stats.is_empty());
    assert_eq!(minify(&ast, None), "");
    assert_eq!(beautify(&ast, None), "");
}

#[test]
fn long_comment_with_inner_closer() {
    let source = "--[==[\nthis ]] does not close\n]==]\nreturn 1";
    roundtrip(source);
    assert_eq!(minify_str(source).unwrap(), "return 1");
}

#[test]
fn unmatched_long_comment_opener() {
    let source = "--[=== not a long comment\nreturn 2";
    roundtrip(source);
    assert_eq!(minify_str(source).unwrap(), "return 2");
}

#[test]
fn call_split_across_lines_inside_arguments() {
    assert_eq!(minify_str("print(f\n(1))").unwrap(), "print(f(1))");
    assert_eq!(minify_str("f()\n(g)()").unwrap(), "f();(g)()");
}

// -----------------------------------------------------------
// Diagnostics.
// -----------------------------------------------------------

#[test]
fn errors_carry_line_and_column() {
    let cases = [
        ("for foo = 1 do end", "1:13: expected 2 or 3 values for range bounds, got 1"),
        ("local function foo.bar() end", "1:19: `(` expected near `.`"),
        ("x = \"abc", "1:5: Unfinished string"),
        ("x = '\\q'", "1:6: Invalid Escape Sequence `\\q`"),
        ("\n\nx = [[", "3:5: Unfinished long string"),
    ];
    for (source, expected) in cases {
        let err = parse_str(source).unwrap_err();
        assert_eq!(err.to_string(), expected, "{source}");
    }
}

#[test]
fn minify_surfaces_errors_unchanged() {
    let err = minify_str("x = = 1").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(err.to_string(), "1:5: Unexpected symbol near `=`");
}
