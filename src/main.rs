//! CLI tool to minify, beautify, and check Lua source files.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "luamin", version, about = "Minify, beautify, and check Lua source files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rename variables to short names and strip whitespace
    Minify(Output),
    /// Rename variables to descriptive names and re-indent
    Beautify(Output),
    /// Check that file(s) tokenize and parse
    Check(Files),
    /// Print the token stream of file(s)
    Tokens(Files),
}

#[derive(Debug, Args)]
struct Files {
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct Output {
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Write the result here instead of stdout (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (files, output) = match &cli.command {
        Command::Minify(o) | Command::Beautify(o) => (&o.files, o.output.as_ref()),
        Command::Check(f) | Command::Tokens(f) => (&f.files, None),
    };

    if output.is_some() && files.len() > 1 {
        eprintln!("Error: --output takes a single input file");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in files {
        let display = path.display();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{display}: {e}");
                had_error = true;
                continue;
            }
        };

        let result = match &cli.command {
            Command::Minify(_) => luamin_rs::minify_str(&content),
            Command::Beautify(_) => luamin_rs::beautify_str(&content),
            Command::Check(_) => luamin_rs::parse_str(&content).map(|ast| {
                let stats = ast.body.stats.len();
                let tokens = ast.tokens.len().saturating_sub(1);
                eprintln!("{display}: valid ({stats} statement(s), {tokens} token(s))");
                String::new()
            }),
            Command::Tokens(_) => luamin_rs::tokenize(&content)
                .map(|tokens| {
                    tokens
                        .iter()
                        .map(|t| {
                            format!(
                                "{}:{}\t{:?}\t{}\n",
                                t.span.line, t.span.column, t.kind, t.text
                            )
                        })
                        .collect()
                })
                .map_err(luamin_rs::Error::from),
        };

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                eprintln!("{display}: {e}");
                had_error = true;
                continue;
            }
        };

        if let Some(out) = output {
            if let Err(e) = fs::write(out, &text) {
                eprintln!("{}: {e}", out.display());
                had_error = true;
            }
        } else if !text.is_empty() {
            print!("{text}");
            if !text.ends_with('\n')
                && matches!(cli.command, Command::Minify(_) | Command::Beautify(_))
            {
                println!();
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
