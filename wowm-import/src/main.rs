//! wowm-import - bulk item import for the WoW marketplace backend
//!
//! Reads a plain-text item list (`name[,decor][,profession]` per line) and
//! submits it to the backend's add-item endpoint one item at a time.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use wowm_common::config::{ConfigOverrides, TomlConfig};
use wowm_import::client::BackendClient;
use wowm_import::driver::{DriverSettings, ImportDriver};
use wowm_import::input::read_import_records;
use wowm_import::parser::ParseSummary;
use wowm_import::prompt::{AssumeYes, Confirmer, StdinConfirmer};
use wowm_import::session::SubmitOutcome;
use wowm_import::template::{write_template, DEFAULT_TEMPLATE_FILE};
use wowm_import::{ImportError, ImportRecord, Profession};

const MODULE_NAME: &str = "wowm-import";

/// Command-line arguments for wowm-import
#[derive(Parser, Debug)]
#[command(name = "wowm-import")]
#[command(about = "Bulk item import for the WoW marketplace backend")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "WOWM_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://127.0.0.1:8000
    #[arg(long, global = true, env = "WOWM_BACKEND_URL")]
    backend_url: Option<String>,

    /// CSRF token expected by the backend
    #[arg(long, global = true, env = "WOWM_CSRF_TOKEN")]
    csrf_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a .txt file and submit every item
    Run {
        file: PathBuf,

        /// Skip the confirmation for large batches
        #[arg(short, long)]
        yes: bool,
    },
    /// Parse a .txt file and show what would be submitted
    Preview { file: PathBuf },
    /// Submit a single item
    Add {
        name: String,

        #[arg(long)]
        decor: bool,

        /// Profession, English or Spanish name
        #[arg(long)]
        profession: Option<String>,
    },
    /// Write the import template
    Template {
        #[arg(short, long, default_value = DEFAULT_TEMPLATE_FILE)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_source) = TomlConfig::load_or_default(args.config.as_deref(), MODULE_NAME)
        .context("Failed to load configuration")?;
    let config = config.apply_overrides(ConfigOverrides {
        backend_url: args.backend_url,
        csrf_token: args.csrf_token,
        log_level: args.log_level,
    });
    config.validate().context("Invalid configuration")?;

    wowm_common::logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    info!("wowm-import {}", env!("CARGO_PKG_VERSION"));
    config_source.log();

    match args.command {
        Command::Run { file, yes } => run_import(&config, file, yes).await,
        Command::Preview { file } => preview(file),
        Command::Add {
            name,
            decor,
            profession,
        } => add_single(&config, &name, decor, profession.as_deref()).await,
        Command::Template { output } => {
            write_template(&output).context("Failed to write template")?;
            println!("Template written to {}", output.display());
            Ok(())
        }
    }
}

async fn run_import(config: &TomlConfig, file: PathBuf, yes: bool) -> Result<()> {
    let records = read_import_records(&file)
        .with_context(|| format!("Cannot import {}", file.display()))?;

    let client = Arc::new(BackendClient::new(&config.backend).context("Failed to create backend client")?);
    info!(endpoint = %client.add_item_url(), "Backend configured");

    let driver = ImportDriver::new(client.clone(), DriverSettings::from(&config.import))
        .with_refresher(client);

    let cancel_token = CancellationToken::new();
    tokio::spawn({
        let token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, stopping after the current item");
                token.cancel();
            }
        }
    });

    let confirmer: Box<dyn Confirmer> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirmer)
    };

    match driver.run(records, confirmer.as_ref(), &cancel_token).await {
        Ok(summary) => {
            println!("{}", summary);
            Ok(())
        }
        Err(ImportError::ConfirmationDeclined(count)) => {
            println!("Import of {} items not started", count);
            Ok(())
        }
        Err(e) => Err(e).context("Import failed"),
    }
}

fn preview(file: PathBuf) -> Result<()> {
    let records = read_import_records(&file)
        .with_context(|| format!("Cannot read {}", file.display()))?;

    for record in &records {
        let mut flags = Vec::new();
        if record.is_decor {
            flags.push("decor".to_string());
        }
        if let Some(profession) = record.profession {
            flags.push(profession.to_string());
        }
        if flags.is_empty() {
            println!("{:>5}  {}", record.line_number, record.name);
        } else {
            println!("{:>5}  {}  [{}]", record.line_number, record.name, flags.join(", "));
        }
    }

    let summary = ParseSummary::from_records(&records);
    println!(
        "{} items | {} with profession | {} decorative",
        summary.total, summary.with_profession, summary.decor
    );
    Ok(())
}

async fn add_single(
    config: &TomlConfig,
    name: &str,
    decor: bool,
    profession: Option<&str>,
) -> Result<()> {
    let profession = profession.map(str::parse::<Profession>).transpose()?;
    let record = ImportRecord::single(name, decor, profession)?;

    let client = Arc::new(BackendClient::new(&config.backend).context("Failed to create backend client")?);
    let driver = ImportDriver::new(client, DriverSettings::from(&config.import));

    match driver.submit_one(&record).await {
        SubmitOutcome::Created => println!("Item \"{}\" added", record.name),
        SubmitOutcome::Skipped => println!("Item \"{}\" already existed", record.name),
        SubmitOutcome::Failed(reason) => bail!("Failed to add \"{}\": {}", record.name, reason),
    }
    Ok(())
}
