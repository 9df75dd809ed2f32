#![allow(dead_code)]

use luamin_rs::{Ast, Style, format, parse_str, tokenize};

pub fn parse_ok(input: &str) -> Ast {
    parse_str(input).unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

/// Parse then print with original trivia; must reproduce the input.
pub fn roundtrip(input: &str) {
    let tokens = tokenize(input).expect("tokenize failed");
    let ast = luamin_rs::parse(&tokens).expect("parse failed");
    let output = format(&ast, Style::Preserve);
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Print `ast` in `style`, parse it back, and check the re-parsed tree
/// prints to the same compact text as the original.
pub fn assert_reparses(ast: &Ast, style: Style) {
    let printed = format(ast, style);
    let reparsed = parse_str(&printed).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{printed}"
        )
    });
    assert_eq!(
        format(ast, Style::Compact),
        format(&reparsed, Style::Compact),
        "structure changed\n--- formatted ---\n{printed}"
    );
}

/// Compact, then compact again: the second pass must not change it.
pub fn assert_compact_stable(input: &str) {
    let ast = parse_ok(input);
    assert_reparses(&ast, Style::Compact);
    assert_reparses(&ast, Style::Expanded);
}
