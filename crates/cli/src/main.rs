//! `codescope` — size-bounded structural summaries of Python source trees,
//! emitted as JSON for downstream prompt assembly.

use clap::{Args, Parser, Subcommand};
use codescope_extractor::{extract, ExtractError, ExtractOptions};
use codescope_scanner::{Domain, OsFileSystem};
use std::path::PathBuf;

mod config;

use config::load_config;

#[derive(Parser)]
#[command(name = "codescope")]
#[command(about = "Extract a budgeted structural summary of a source tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML config file (defaults to ./.codescope.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize source files for test-writing context
    Tests(ScanArgs),
    /// Summarize source plus prose materials for documentation context
    Docs(ScanArgs),
    /// Summarize directory structure and components for design context
    Design(ScanArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Files or directories to include
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Additional gitignore-style exclude pattern (repeatable)
    #[arg(long = "exclude")]
    excludes: Vec<String>,

    /// Global character budget for the extracted context
    #[arg(long)]
    max_chars: Option<usize>,

    /// Include private (underscore-prefixed) members
    #[arg(long, overrides_with = "no_include_private")]
    include_private: bool,

    /// Exclude private members even when the config file enables them
    #[arg(long, overrides_with = "include_private")]
    no_include_private: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => {}
        Err(RunError::NoFiles) => {
            log::error!("no suitable files found for analysis");
            std::process::exit(2);
        }
        Err(RunError::Other(e)) => {
            log::error!("{e:#}");
            std::process::exit(1);
        }
    }
}

enum RunError {
    NoFiles,
    Other(anyhow::Error),
}

impl From<anyhow::Error> for RunError {
    fn from(e: anyhow::Error) -> Self {
        RunError::Other(e)
    }
}

fn run(cli: Cli) -> std::result::Result<(), RunError> {
    let cwd = std::env::current_dir().map_err(anyhow::Error::from)?;
    let mut cfg = load_config(&cwd, cli.config.as_deref());

    let (domain, args) = match &cli.command {
        Commands::Tests(args) => (Domain::Tests, args),
        Commands::Docs(args) => (Domain::Docs, args),
        Commands::Design(args) => (Domain::Design, args),
    };
    if let Some(max_chars) = args.max_chars {
        cfg.max_chars = max_chars;
    }
    cfg.include_private = resolved_include_private(cfg.include_private, args);
    let mut excludes = cfg.excludes.clone();
    excludes.extend(args.excludes.iter().cloned());

    let options = ExtractOptions {
        targets: args.paths.clone(),
        domain,
        excludes,
        match_root: cwd,
        budget: cfg.budget(),
    };

    let context = match extract(&OsFileSystem, &options) {
        Ok(context) => context,
        Err(ExtractError::NoFiles) => return Err(RunError::NoFiles),
        Err(e) => return Err(RunError::Other(e.into())),
    };

    let rendered =
        serde_json::to_string_pretty(&context).map_err(anyhow::Error::from)?;
    println!("{rendered}");
    Ok(())
}

/// Flags beat the config file; absent flags leave it alone.
fn resolved_include_private(configured: bool, args: &ScanArgs) -> bool {
    if args.include_private {
        true
    } else if args.no_include_private {
        false
    } else {
        configured
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    builder.target(env_logger::Target::Stderr).init();
}
