//! Demonstrate error handling for invalid Lua input.

fn main() {
    // Unterminated string
    match luamin_rs::parse_str("local greeting = \"hello\nprint(greeting)\n") {
        Ok(_) => println!("Parsed OK (unexpected)"),
        Err(luamin_rs::Error::Lex(e)) => {
            println!("Lex error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.span.line, e.span.column);
        }
        Err(luamin_rs::Error::Parse(e)) => {
            println!("Parse error: {e}");
        }
    }

    println!();

    // Missing `end`
    match luamin_rs::minify_str("if ready then\n\tstart()\n") {
        Ok(_) => println!("Minified OK (unexpected)"),
        Err(luamin_rs::Error::Lex(e)) => {
            println!("Lex error: {e}");
        }
        Err(luamin_rs::Error::Parse(e)) => {
            println!("Parse error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: line {}, column {}", e.span.line, e.span.column);
        }
    }
}
