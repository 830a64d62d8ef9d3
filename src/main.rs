use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

mod aggregate;
mod columns;
mod config;
mod filters;
mod groups;
mod loader;
mod metrics;
mod models;
mod report;
mod session;
mod views;

use config::Config;
use session::Session;

#[derive(Parser)]
#[command(name = "aa-metrics")]
#[command(about = "Affirmative action indicators for graduate program admissions", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// CSV export to analyse, overriding the configured data file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ModalityArgs {
    /// Degree level to include; repeat for several, omit for all
    #[arg(long = "modality")]
    modalities: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration file with the default column names and keywords
    InitConfig {
        #[arg(long, default_value = "aa-metrics.toml")]
        out: PathBuf,
    },
    /// Load the export and show how many active programs it holds
    Load,
    /// Occupancy and success rate indicators
    Metrics {
        #[command(flatten)]
        filter: ModalityArgs,
        #[arg(long)]
        json: bool,
    },
    /// Reserved seats, AA demand and historical adoption
    Affirmative {
        #[command(flatten)]
        filter: ModalityArgs,
        #[arg(long)]
        json: bool,
    },
    /// Chart series as JSON
    Charts {
        #[command(flatten)]
        filter: ModalityArgs,
    },
    /// Export the filtered table as CSV
    Export {
        #[command(flatten)]
        filter: ModalityArgs,
        /// Status value to include; repeat for several, omit for all
        #[arg(long = "status")]
        statuses: Vec<String>,
        #[arg(long, default_value = "dados_filtrados.csv")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filter: ModalityArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    if let Commands::InitConfig { out } = &cli.command {
        config.save_to_file(out)?;
        println!("Configuration written to {}.", out.display());
        return Ok(());
    }

    let data_file = cli.csv.clone().unwrap_or_else(|| config.data_file.clone());
    let loaded = match Session::load(config, &data_file) {
        Ok(session) => Some(session),
        Err(err) => {
            error!(path = %data_file.display(), "failed to load export: {err}");
            None
        }
    };
    let session = session::require(loaded.as_ref())
        .with_context(|| format!("could not use {}", data_file.display()))?;

    match cli.command {
        Commands::InitConfig { .. } => {}
        Commands::Load => {
            print!("{}", report::render_load_summary(session));
        }
        Commands::Metrics { filter, json } => {
            let page = views::metrics_page(session, &filter.modalities);
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", report::render_metrics(&page));
            }
        }
        Commands::Affirmative { filter, json } => {
            let page = views::affirmative_page(session, &filter.modalities);
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print!("{}", report::render_affirmative(&page));
            }
        }
        Commands::Charts { filter } => {
            let page = views::charts_page(session, &filter.modalities);
            println!("{}", report::render_charts(&page)?);
        }
        Commands::Export {
            filter,
            statuses,
            out,
        } => {
            let page = views::table_page(session, &filter.modalities, &statuses);
            loader::export_path(&page.table, &out)
                .with_context(|| format!("failed to write {}", out.display()))?;
            print!("{}", report::render_export_summary(&page, &out));
        }
        Commands::Report { filter, out } => {
            let metrics = views::metrics_page(session, &filter.modalities);
            let affirmative = views::affirmative_page(session, &filter.modalities);
            let charts = views::charts_page(session, &filter.modalities);
            let report = report::build_report(
                session,
                &metrics,
                &affirmative,
                &charts,
                chrono::Local::now().naive_local(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
