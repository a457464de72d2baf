//! Shank CLI

use clap::{Parser, Subcommand};
use shank::error::report_error;
use shank::interp::{Interpreter, InterpreterConfig, DEFAULT_MAX_DEPTH};
use shank::lexer::{self, TokenRow};
use shank::ShankError;
use std::path::{Path, PathBuf};
use std::sync::Once;

static TRACING: Once = Once::new();

#[derive(Parser)]
#[command(name = "shank", version, about = "Shank - indentation-structured teaching language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Shank program
    Run {
        /// Source file to run
        file: PathBuf,
        /// Run only this function instead of every parameterless one
        #[arg(long)]
        entry: Option<String>,
        /// Seed for GetRandom
        #[arg(long)]
        seed: Option<u64>,
        /// Maximum nested call depth
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
        /// One JSON object per token
        #[arg(long)]
        json: bool,
        /// Print the source rebuilt from the tokens instead
        #[arg(long, conflicts_with = "json")]
        reconstruct: bool,
    },
}

/// Install a subscriber only when RUST_LOG asks for one.
fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    TRACING.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let (file, result) = match cli.command {
        Command::Run {
            file,
            entry,
            seed,
            max_depth,
        } => {
            let config = InterpreterConfig {
                entry,
                seed,
                max_depth,
            };
            let result = run_file(&file, config);
            (file, result)
        }
        Command::Parse { file } => {
            let result = parse_file(&file);
            (file, result)
        }
        Command::Tokens {
            file,
            json,
            reconstruct,
        } => {
            let result = tokenize_file(&file, json, reconstruct);
            (file, result)
        }
    };

    if let Err((source, e)) = result {
        let filename = file.display().to_string();
        match source {
            Some(source) => report_error(&filename, &source, &e),
            None => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}

/// Failure plus the source it refers to, when the file could be read
type CliResult = Result<(), (Option<String>, ShankError)>;

fn read_source(path: &Path) -> Result<String, (Option<String>, ShankError)> {
    std::fs::read_to_string(path).map_err(|e| (None, ShankError::from(e)))
}

fn run_file(path: &Path, config: InterpreterConfig) -> CliResult {
    let source = read_source(path)?;
    let program = shank::parse(&source).map_err(|e| (Some(source.clone()), e))?;
    Interpreter::new()
        .with_config(config)
        .run(&program)
        .map_err(|e| (Some(source), ShankError::from(e)))
}

fn parse_file(path: &Path) -> CliResult {
    let source = read_source(path)?;
    let program = shank::parse(&source).map_err(|e| (Some(source.clone()), e))?;
    let json = serde_json::to_string_pretty(&program)
        .map_err(|e| (None, ShankError::io_error(e.to_string())))?;
    println!("{json}");
    Ok(())
}

fn tokenize_file(path: &Path, json: bool, reconstruct: bool) -> CliResult {
    let source = read_source(path)?;
    let tokens = lexer::tokenize(&source).map_err(|e| (Some(source.clone()), e))?;
    if reconstruct {
        print!("{}", lexer::reconstruct(&tokens));
        return Ok(());
    }
    for lexeme in &tokens {
        if json {
            let row = serde_json::to_string(&TokenRow::from(lexeme))
                .map_err(|e| (None, ShankError::io_error(e.to_string())))?;
            println!("{row}");
        } else {
            println!("{:>4}  {:?} @ {}", lexeme.line, lexeme.token, lexeme.span);
        }
    }
    Ok(())
}
