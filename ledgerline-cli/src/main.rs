use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ledgerline_core::StatementPeriod;
use ledgerline_ingest::{
    RuleBook, SourceDocument, TypeSelection, detect_statement_type, process_batch,
    process_batch_parallel,
};
use ledgerline_report::{
    render_summary, render_validation, validate_batch, write_balances_csv, write_json,
    write_transactions_csv,
};
use std::path::PathBuf;
use tracing::{info, warn};

mod config;
mod loader;
mod logging;
mod prompt;
mod state;

use config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LEDGERLINE_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "ledgerline",
    version,
    long_version = LONG_VERSION,
    about = "Parse bank statement text into deduplicated transactions"
)]
struct Cli {
    /// Config file (default: ~/.ledgerline/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse statement files (.txt, or .pdf via pdftotext) and export them
    Parse(ParseArgs),

    /// Show which statement type and period a file looks like
    Detect {
        file: PathBuf,

        #[arg(long)]
        password: Option<String>,
    },

    /// Manage ~/.ledgerline/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Files or folders (default: the configured input folder)
    paths: Vec<PathBuf>,

    /// credit_card, current_account or auto
    #[arg(long = "type", value_name = "TYPE")]
    statement_type: Option<TypeSelection>,

    /// Period for every file, e.g. "January 2024", "2024-01" or "2024-01-01..2024-01-31"
    #[arg(long)]
    period: Option<StatementPeriod>,

    /// Year assumed when a file neither declares nor shows a period
    #[arg(long)]
    year: Option<i32>,

    /// Write accepted transactions as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write accepted transactions as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write balance and total lines as CSV
    #[arg(long)]
    balances: Option<PathBuf>,

    /// Write the full batch report (per-file counts, warnings) as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Worker threads (1 = sequential)
    #[arg(long)]
    parallel: Option<usize>,

    /// PDF user password (asked for interactively when a PDF needs one)
    #[arg(long)]
    password: Option<String>,

    /// Ask for the statement type before parsing
    #[arg(short, long)]
    interactive: bool,

    /// Sample rows to print (default: 3)
    #[arg(long, default_value_t = 3)]
    samples: usize,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let config_path = match cli.config {
        Some(p) => p,
        None => config::default_config_path()?,
    };

    match cli.command {
        Command::Parse(args) => {
            let cfg = config::load_config(&config_path)?;
            parse(args, &cfg)?;
        }

        Command::Detect { file, password } => {
            let cfg = config::load_config(&config_path)?;
            let password = password.as_deref().or(cfg.input.password.as_deref());
            let mut passwords = prompt::PasswordPrompt::stdin();
            let doc = loader::load_document(&file, &cfg.input.pdftotext, password, &mut passwords)?;
            detect(&doc)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&config_path)?,
            ConfigCommand::Show => {
                let cfg = config::load_config(&config_path)?;
                println!("# {}", config_path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn parse(args: ParseArgs, cfg: &Config) -> Result<()> {
    let mut options = cfg.parser.options();
    if let Some(t) = args.statement_type {
        options.statement_type = t;
    }
    if args.interactive {
        options.statement_type = prompt::choose_statement_type()?;
    }
    if args.year.is_some() {
        options.fallback_year = args.year;
    }
    let workers = args.parallel.unwrap_or(cfg.parser.parallel);
    let password = args.password.as_deref().or(cfg.input.password.as_deref());

    let inputs = loader::collect_inputs(&args.paths, &cfg.input.folder)?;
    if inputs.is_empty() {
        println!("No .pdf or .txt statements found.");
        return Ok(());
    }

    let mut passwords = prompt::PasswordPrompt::stdin();
    let mut documents = Vec::with_capacity(inputs.len());
    for path in &inputs {
        match loader::load_document(path, &cfg.input.pdftotext, password, &mut passwords) {
            Ok(doc) => documents.push(match args.period {
                Some(period) => doc.with_period(period),
                None => doc,
            }),
            Err(err) => warn!(path = %path.display(), "skipping file: {err:#}"),
        }
    }
    info!(files = documents.len(), workers, "loaded statements");

    let rulebook = RuleBook::new()?;
    let output = if workers > 1 {
        process_batch_parallel(&rulebook, &documents, &options, workers)
    } else {
        process_batch(&rulebook, &documents, &options)
    };

    print!("{}", render_summary(&output, args.samples));
    let validation = render_validation(&validate_batch(&output));
    if !validation.is_empty() {
        print!("\n{}", validation);
    }

    if let Some(path) = args.csv.or_else(|| cfg.export.csv.clone()) {
        let n = write_transactions_csv(&path, output.transactions())?;
        println!("Saved {} transactions to {}", n, path.display());
    }
    if let Some(path) = args.json.or_else(|| cfg.export.json.clone()) {
        let records: Vec<_> = output.transactions().collect();
        write_json(&path, &records)?;
        println!("Saved {} transactions to {}", records.len(), path.display());
    }
    if let Some(path) = args.balances {
        let n = write_balances_csv(&path, output.balances())?;
        println!("Saved {} balance lines to {}", n, path.display());
    }
    if let Some(path) = args.report {
        write_json(&path, &output)?;
        println!("Saved batch report to {}", path.display());
    }

    Ok(())
}

fn detect(doc: &SourceDocument) -> Result<()> {
    let detection = detect_statement_type(&doc.lines);
    let period = RuleBook::new()?.periods().scan(&doc.lines);

    println!("{}: {}", doc.name, detection.statement_type);
    println!(
        "  indicators: credit card {}, current account {}{}",
        detection.credit_card_score,
        detection.current_account_score,
        if detection.is_ambiguous() { " (tie)" } else { "" }
    );
    match period {
        Some(p) => println!("  period: {}", p),
        None => println!("  period: not found"),
    }
    Ok(())
}
