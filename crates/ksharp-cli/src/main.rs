use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use ksharp_ast::event::ParseEvent;
use ksharp_ast::token::Token;
use ksharp_cli::logging::{init_subscriber, level_for};
use ksharp_cli::pipeline::{load_source, load_tokens};
use ksharp_cli::report::{overall_line, render_semantic, syntax_summary, TagWriter};
use ksharp_parse::table::{render_table, write_table};
use ksharp_parse::{parse_tokens, tokenize, ParseOutcome};
use ksharp_types::check;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ksharp")]
#[command(about = "K#: tokenizer, parser and flat semantic checker")]
struct Cli {
    /// Log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenize a source file and print its token table
    Lex {
        /// Path to .ksh source file
        file: PathBuf,

        /// Also write the token table to this path
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = LexFormat::Table)]
        format: LexFormat,
    },

    /// Parse a program and print its parse events
    Parse {
        /// Path to .ksh source file, or a token table with --from-table
        input: PathBuf,

        /// Read a token table instead of source
        #[arg(long)]
        from_table: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Run the declaration and assignment checks
    Check {
        /// Path to .ksh source file, or a token table with --from-table
        input: PathBuf,

        /// Read a token table instead of source
        #[arg(long)]
        from_table: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// Run every stage in order and print an overall verdict
    Run {
        /// Path to .ksh source file
        file: PathBuf,

        /// Also write the token table to this path
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// JSON shape of `ksharp lex --format json`.
#[derive(Serialize)]
struct LexOutput<'a> {
    source: String,
    tokens: &'a [Token],
}

#[derive(ValueEnum, Clone, Debug)]
enum LexFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Clone, Debug)]
enum Format {
    Pretty,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    // ignore an already-installed subscriber
    let _ = init_subscriber(level_for(cli.verbose));

    let result = match cli.command {
        Commands::Lex { file, out, format } => cmd_lex(&file, out.as_deref(), format),
        Commands::Parse {
            input,
            from_table,
            format,
        } => cmd_parse(&input, from_table, format),
        Commands::Check {
            input,
            from_table,
            format,
        } => cmd_check(&input, from_table, format),
        Commands::Run { file, out } => cmd_run(&file, out.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn lex_and_save(file: &Path, out: Option<&Path>) -> Result<Vec<Token>> {
    let src = load_source(file)?;
    let tokens = tokenize(&src);
    if let Some(out) = out {
        write_table(out, &file.display().to_string(), &tokens)?;
        eprintln!("Token table written to {}", out.display());
    }
    Ok(tokens)
}

fn cmd_lex(file: &Path, out: Option<&Path>, format: LexFormat) -> Result<()> {
    let tokens = lex_and_save(file, out)?;
    let source = file.display().to_string();
    match format {
        LexFormat::Table => print!("{}", render_table(&source, &tokens)),
        LexFormat::Json => {
            let output = LexOutput {
                source,
                tokens: &tokens,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output).context("serializing tokens")?
            );
        }
    }
    Ok(())
}

/// Parse `tokens`, print the tag rendering, and send syntax errors to stderr.
fn parse_and_print(tokens: &[Token]) -> ParseOutcome {
    let mut tags = TagWriter::new();
    let outcome = parse_tokens(tokens, &mut tags);
    print!("{}", tags.into_string());
    for err in &outcome.errors {
        eprintln!("{}", err);
    }
    println!();
    println!("{}", syntax_summary(&outcome));
    outcome
}

fn cmd_parse(input: &Path, from_table: bool, format: Format) -> Result<()> {
    let tokens = load_tokens(input, from_table)?;
    match format {
        Format::Pretty => {
            parse_and_print(&tokens);
        }
        Format::Json => {
            let mut events: Vec<ParseEvent> = Vec::new();
            let outcome = parse_tokens(&tokens, &mut events);
            for err in &outcome.errors {
                eprintln!("{}", err);
            }
            // stdout stays pure JSON
            eprintln!("{}", syntax_summary(&outcome));
            println!(
                "{}",
                serde_json::to_string_pretty(&events).context("serializing parse events")?
            );
        }
    }
    Ok(())
}

fn cmd_check(input: &Path, from_table: bool, format: Format) -> Result<()> {
    let tokens = load_tokens(input, from_table)?;
    let report = check(&tokens);
    match format {
        Format::Pretty => print!("{}", render_semantic(&report, &input.display().to_string())),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing semantic report")?
        ),
    }
    Ok(())
}

fn cmd_run(file: &Path, out: Option<&Path>) -> Result<()> {
    let tokens = lex_and_save(file, out)?;
    let source = file.display().to_string();

    println!("=== Tokens ===");
    print!("{}", render_table(&source, &tokens));
    println!();

    println!("=== Syntax ===");
    let outcome = parse_and_print(&tokens);
    println!();

    println!("=== Semantics ===");
    let report = check(&tokens);
    print!("{}", render_semantic(&report, &source));
    println!();

    println!("{}", overall_line(outcome.is_ok() && !report.has_errors()));
    Ok(())
}
