//! placementreport CLI - Retrieve ALEKS placement reports
//!
//! # Commands
//!
//! ```bash
//! placementreport report                          # Everything from ALEKS_* variables
//! placementreport report --from 2019-10-01 --to 2019-10-31 -c ABCDE-FGHIJ
//! placementreport decode page.csv                 # Decode a saved CSV page
//! ```
//!
//! Connection settings always come from `ALEKS_URL`, `ALEKS_USERNAME` and
//! `ALEKS_PASSWORD` (a `.env` file is loaded when present).

use aleks::config::{self, CLASSCODES_VAR, FROM_VAR, TO_VAR};
use aleks::logs::{log_error, log_info, log_success, log_warning, LOG_BROADCASTER};
use aleks::{decode_page_file, Client, ReportRequest};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "placementreport")]
#[command(about = "Retrieve ALEKS placement reports", long_about = None)]
struct Cli {
    /// Also print debug log entries (raw pages and records)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve the placement report and output JSON
    Report {
        /// First completion date, YYYY-MM-DD (default: ALEKS_FROM_COMPLETION_DATE)
        #[arg(long)]
        from: Option<String>,

        /// Last completion date, YYYY-MM-DD (default: ALEKS_TO_COMPLETION_DATE)
        #[arg(long)]
        to: Option<String>,

        /// Class code, repeatable (default: ALEKS_CLASSCODES)
        #[arg(short = 'c', long = "class-code")]
        class_codes: Vec<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a saved CSV page and output JSON
    Decode {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    LOG_BROADCASTER.set_verbose(cli.verbose);

    let result = match cli.command {
        Commands::Report {
            from,
            to,
            class_codes,
            output,
        } => cmd_report(from, to, class_codes, output.as_deref()).await,

        Commands::Decode { input, output } => cmd_decode(&input, output.as_deref()),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Build the request from flags, falling back to the environment.
fn resolve_request(
    from: Option<String>,
    to: Option<String>,
    class_codes: Vec<String>,
) -> Result<ReportRequest, aleks::ConfigError> {
    let lookup = config::env_lookup;
    let from = match from {
        Some(from) => from,
        None => config::required(&lookup, FROM_VAR)?,
    };
    let to = match to {
        Some(to) => to,
        None => config::required(&lookup, TO_VAR)?,
    };
    let class_codes = if class_codes.is_empty() {
        config::parse_class_codes(&config::required(&lookup, CLASSCODES_VAR)?)
    } else {
        class_codes
    };
    Ok(ReportRequest::new(from, to, class_codes))
}

/// Returns `Ok(false)` when the report came back with errors.
async fn cmd_report(
    from: Option<String>,
    to: Option<String>,
    class_codes: Vec<String>,
    output: Option<&Path>,
) -> Result<bool, Box<dyn std::error::Error>> {
    let client = Client::from_env()?;
    let request = resolve_request(from, to, class_codes)?;

    log_info(format!("Service: {}", client.url()));
    let start = Instant::now();
    let (report, errors) = client.get_placement_report(&request).await;
    let elapsed = start.elapsed();

    for err in &errors {
        log_error(err.to_string());
    }
    log_info(format!("Placement record count: {}", report.len()));
    log_info(format!("Error count: {}", errors.len()));
    log_info(format!("Elapsed: {:.2}s", elapsed.as_secs_f64()));

    let json = serde_json::to_string_pretty(&report)?;
    write_output(&json, output)?;

    Ok(errors.is_empty())
}

/// Returns `Ok(false)` when the page had decode errors.
fn cmd_decode(input: &Path, output: Option<&Path>) -> Result<bool, Box<dyn std::error::Error>> {
    eprintln!("📄 Decoding page: {}", input.display());

    let (records, errors) = decode_page_file(input)?;

    if errors.is_empty() {
        log_success(format!("Decoded {} records", records.len()));
    } else {
        log_warning(format!("Decoded {} records, {} errors", records.len(), errors.len()));
        for err in &errors {
            log_error(err.to_string());
        }
    }

    let json = serde_json::to_string_pretty(&records)?;
    write_output(&json, output)?;

    Ok(errors.is_empty())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
