//! mtc - minimal static type checker for annotated Python
//!
//! Usage: mtc [OPTIONS] <FILES>...

use anyhow::Context;
use clap::Parser as ClapParser;
use mini_type_checker::driver::EXIT_FATAL;
use mini_type_checker::{CheckerConfig, SourceFile, check_files};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "mtc")]
#[command(author = "MTC Team")]
#[command(version)]
#[command(about = "Minimal static type checker for annotated Python", long_about = None)]
struct Args {
    /// Python source files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Omit error codes such as [assignment] from messages
    #[arg(long)]
    hide_error_codes: bool,

    /// Do not print the closing summary line
    #[arg(long)]
    no_error_summary: bool,

    /// Also render diagnostics with source context on stderr
    #[arg(long)]
    pretty: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> CheckerConfig {
        CheckerConfig {
            show_error_codes: !self.hide_error_codes,
            error_summary: !self.no_error_summary,
            pretty: self.pretty,
            dump_tokens: self.dump_tokens,
            dump_ast: self.dump_ast,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("mtc: {:#}", e);
            process::exit(EXIT_FATAL);
        }
    }
}

/// Logs go to stderr so stdout stays a clean report
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .try_init();
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let files = args
        .files
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path)
                .with_context(|| format!("can't read file '{}'", path.display()))?;
            Ok(SourceFile::new(path.display().to_string(), text))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let outcome = check_files(&files, &args.config());
    print!("{}", outcome.output);
    Ok(outcome.exit_code)
}
