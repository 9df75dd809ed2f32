//! Lexer edge cases and error tests.

use luamin_rs::{LexErrorKind, Span, TokenKind, tokenize};

// -----------------------------------------------------------
// Basic lexer behaviour.
// -----------------------------------------------------------

#[test]
fn lex_empty_input() {
    let tokens = tokenize("").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Eof);
    assert_eq!(tokens[0].span, Span::new(1, 1));
}

#[test]
fn lex_only_whitespace() {
    let tokens = tokenize("   \t  \n\n  ").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].leading_trivia, "   \t  \n\n  ");
    assert_eq!(tokens[0].span, Span::new(3, 3));
}

#[test]
fn lex_keywords_and_identifiers() {
    let tokens = tokenize("local function foo_1 goto").expect("tokenize");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword,
            TokenKind::Keyword,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lex_all_operators() {
    let input = "+ - * / // % ^ # & ~ | << >> == ~= <= >= < > = ( ) { } [ ] ; : , . .. ...";
    let tokens = tokenize(input).expect("tokenize");
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    let expected: Vec<_> = input.split(' ').chain([""]).collect();
    assert_eq!(texts, expected);
}

#[test]
fn lex_hex_and_exponents() {
    let tokens = tokenize("0x1F 0XaB.8p-2 1e10 2.5E-3").expect("tokenize");
    assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Number));
    assert_eq!(tokens[1].text, "0XaB.8p-2");
}

#[test]
fn lex_number_running_into_concat_is_malformed() {
    let err = tokenize("1..2").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::MalformedNumber("1..2".to_string()));

    let tokens = tokenize("1 ..2").expect("tokenize");
    let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["1", "..", "2", ""]);
}

#[test]
fn lex_exponent_without_digits_is_malformed() {
    let err = tokenize("x = 1e").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::MalformedNumber("1e".to_string()));
}

// -----------------------------------------------------------
// Strings.
// -----------------------------------------------------------

#[test]
fn lex_string_text_is_verbatim() {
    let tokens = tokenize(r#"x = "a\"b""#).expect("tokenize");
    assert_eq!(tokens[2].text, r#""a\"b""#);
}

#[test]
fn lex_escapes_accepted() {
    for s in [
        r#""\n\t\a\b\f\r\v\\\"\'""#,
        r#""\0\65\255""#,
        r#""\x41\u{48}\u{10FFFF}""#,
        "\"a\\z   \n  b\"",
        "\"line\\\nnext\"",
    ] {
        let tokens = tokenize(s).unwrap_or_else(|e| panic!("{s}: {e}"));
        assert_eq!(tokens[0].kind, TokenKind::String, "{s}");
    }
}

#[test]
fn lex_bad_hex_escape() {
    let err = tokenize(r#""\xZZ""#).unwrap_err();
    assert!(matches!(err.kind, LexErrorKind::InvalidEscape(_)));
    assert!(err.to_string().starts_with("1:2: Invalid Escape Sequence"));
}

#[test]
fn lex_unfinished_string_at_eof() {
    let err = tokenize("return 'abc").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnfinishedString);
    assert_eq!(err.span, Span::new(1, 8));
}

#[test]
fn lex_long_string_spans_lines() {
    let tokens = tokenize("s = [[\nline1\nline2]] t").expect("tokenize");
    assert_eq!(tokens[2].text, "[[\nline1\nline2]]");
    assert_eq!(tokens[3].span, Span::new(3, 9));
}

#[test]
fn lex_index_bracket_is_symbol() {
    let tokens = tokenize("t[ [=[x]=] ]").expect("tokenize");
    assert_eq!(tokens[1].kind, TokenKind::Symbol);
    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[3].text, "]");
}

// -----------------------------------------------------------
// Comments.
// -----------------------------------------------------------

#[test]
fn lex_long_comment_ignores_short_closers() {
    let input = "--[==[\nfirst ]] line\n]=] still\n]==]\nreturn";
    let tokens = tokenize(input).expect("tokenize");
    assert_eq!(tokens[0].text, "return");
    assert_eq!(tokens[0].span, Span::new(5, 1));
}

#[test]
fn lex_unmatched_long_opener_is_line_comment() {
    let tokens = tokenize("--[=== no closer anywhere\nreturn 1").expect("tokenize");
    assert_eq!(tokens[0].text, "return");
    assert_eq!(tokens[0].leading_trivia, "--[=== no closer anywhere\n");
}

#[test]
fn lex_unfinished_long_comment() {
    let err = tokenize("--[[ never closed").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnfinishedLongString { comment: true });
    assert_eq!(err.span, Span::new(1, 3));
}

#[test]
fn lex_comment_at_eof_without_newline() {
    let tokens = tokenize("x = 1 -- end").expect("tokenize");
    let eof = tokens.last().expect("eof");
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.leading_trivia, " -- end");
}

// -----------------------------------------------------------
// Lines and columns.
// -----------------------------------------------------------

#[test]
fn lex_line_endings() {
    let tokens = tokenize("x = 1\ry = 2").expect("tokenize");
    assert_eq!(tokens[3].text, "y");
    assert_eq!(tokens[3].span, Span::new(2, 1));

    let tokens = tokenize("a\r\nb\rc\r\rd").expect("tokenize");
    let lines: Vec<_> = tokens.iter().map(|t| t.span.line).collect();
    assert_eq!(lines, [1, 2, 3, 5, 5]);
}

#[test]
fn lex_comment_ends_at_carriage_return() {
    let tokens = tokenize("-- note\rx = 1").expect("tokenize");
    assert_eq!(tokens[0].text, "x");
    assert_eq!(tokens[0].span, Span::new(2, 1));

    let tokens = tokenize("--[[a\rb]] x").expect("tokenize");
    assert_eq!(tokens[0].span, Span::new(2, 5));
}

#[test]
fn lex_columns_count_characters() {
    let tokens = tokenize("s = 'é' t").expect("tokenize");
    assert_eq!(tokens[3].span, Span::new(1, 9));

    let err = tokenize("x = 'é\\q'").unwrap_err();
    assert!(matches!(err.kind, LexErrorKind::InvalidEscape(_)));
    assert_eq!(err.span, Span::new(1, 7));
}

// -----------------------------------------------------------
// Trivia reconstructs the source.
// -----------------------------------------------------------

#[test]
fn lex_trivia_plus_text_is_source() {
    let input = "#!/bin/lua\n-- c\nlocal  x\t= { 1 ,2 } --[[ x ]]\r\nreturn x\n";
    let tokens = tokenize(input).expect("tokenize");
    let rebuilt: String = tokens
        .iter()
        .map(|t| format!("{}{}", t.leading_trivia, t.text))
        .collect();
    assert_eq!(rebuilt, input);
}

#[test]
fn lex_error_display_format() {
    let err = tokenize("a\n  $").unwrap_err();
    assert_eq!(err.to_string(), "2:3: Bad symbol `$` in source");
}
