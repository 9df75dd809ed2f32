//! Minify a Lua snippet, then beautify the result.

use luamin_rs::{Style, beautify, format, minify, parse_str, resolve};

fn main() {
    let input = "\
-- running total
local total = 0

function add(amount)
    total = total + amount
    return total
end

for _, n in ipairs({1, 2, 3}) do
    add(n)
end
print(total)
";

    let ast = parse_str(input).expect("parse failed");
    let scopes = resolve(&ast);

    println!("Statements: {}", ast.body.stats.len());
    println!("Variables: {}", scopes.variable_count());
    for (id, var) in scopes.variables() {
        if scopes.is_external(id) {
            println!("  External global: {}", var.name);
        }
    }

    let min = minify(&ast, Some(&scopes));
    println!("\nMinified ({} -> {} bytes):\n{min}", input.len(), min.len());

    let pretty = beautify(&parse_str(&min).expect("reparse failed"), None);
    println!("\nBeautified:\n{pretty}");

    println!("\nReformatted with original names:\n{}", format(&ast, Style::Expanded));
}
