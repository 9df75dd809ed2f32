//! Build a Lua chunk programmatically using the builder API.

use luamin_rs::ast::{BinOp, Field};
use luamin_rs::literal::LuaValue;
use luamin_rs::{AstBuilder, Block, Expr, Stat, Style, format, minify, to_lua_literal};

fn main() {
    let mut b = AstBuilder::new();

    let config = b.local(
        &["config"],
        vec![Expr::table(vec![
            Field::named("name", Expr::string("demo")),
            Field::named("retries", Expr::number(3)),
        ])],
    );

    let attempt = b.name("attempt");
    let limit = b.name("config").member("retries");
    let check = Stat::if_then(
        attempt.binary(BinOp::Gt, limit),
        Block::new().stat(Stat::ret(vec![Expr::boolean(false)])),
    );
    let log = b.name("print");
    let message = Expr::string("retrying").binary(BinOp::Concat, b.name("attempt"));
    let retry = b.function_decl(
        "retry",
        &["attempt"],
        Block::new()
            .stat(check)
            .stat(Stat::call(log.call(vec![message])))
            .stat(Stat::ret(vec![Expr::boolean(true)])),
    );

    let ast = b.finish(Block::new().stat(config).stat(retry));

    println!("Expanded:\n{}\n", format(&ast, Style::Expanded));
    println!("Minified:\n{}\n", minify(&ast, None));

    // Plain data as a Lua literal
    let data = LuaValue::record([
        ("name", LuaValue::from("demo")),
        ("ports", LuaValue::list([LuaValue::from(80_i64), 443_i64.into()])),
        ("debug", LuaValue::from(None::<bool>)),
    ]);
    println!("Literal:\nreturn {}", to_lua_literal(&data));
}
