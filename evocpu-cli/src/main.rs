//! evocpu CLI: run, trace, print and convert genomes.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input/decode/assembly error, or bad usage
//! - 3: Runtime error

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "evocpu", version)]
#[command(about = "Scope-structured virtual CPU for evolved genomes")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a genome and print the final state
    Run {
        /// Genome listing, or binary when the name ends in .gpb
        genome: PathBuf,
        #[command(flatten)]
        exec: ExecArgs,
    },
    /// Print the CPU state before every step
    Trace {
        /// Genome listing, or binary when the name ends in .gpb
        genome: PathBuf,
        #[command(flatten)]
        exec: ExecArgs,
    },
    /// Print a genome indented by scope
    Print {
        /// Genome listing, or binary when the name ends in .gpb
        genome: PathBuf,
    },
    /// Assemble a listing into a binary genome
    Assemble {
        input: PathBuf,
        /// Output path (default: input with a .gpb extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a binary genome as a flat listing
    Disassemble { input: PathBuf },
    /// List the default instruction set
    List,
}

/// Execution knobs shared by `run` and `trace`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Number of steps to run
    #[arg(long, default_value_t = 100)]
    pub steps: usize,

    /// Preset an input value
    #[arg(long = "input", value_name = "ID=VALUE", value_parser = parse_input)]
    pub inputs: Vec<(i64, f64)>,
}

fn parse_input(s: &str) -> Result<(i64, f64), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got '{s}'"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid input id '{id}'"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid input value '{value}'"))?;
    Ok((id, value))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run { genome, exec } => commands::run(&genome, &exec),
        Command::Trace { genome, exec } => commands::trace(&genome, &exec),
        Command::Print { genome } => commands::print(&genome),
        Command::Assemble { input, output } => commands::assemble(&input, output.as_deref()),
        Command::Disassemble { input } => commands::disassemble(&input),
        Command::List => commands::list(),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
