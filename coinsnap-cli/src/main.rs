//! coinsnap CLI — trigger, preview, and inspect snapshot runs.
//!
//! Commands:
//! - `run` — execute the full job: fetch, merge, replace-load
//! - `preview` — fetch and merge only, print the leading rows, write nothing
//! - `status` — report whether the destination table exists and its row count
//!
//! Scheduling, single-run serialization, and retry policy belong to whatever
//! invokes this binary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use coinsnap_core::job::{run_snapshot, PREVIEW_ROWS};
use coinsnap_core::merge::{merge_chart, preview};
use coinsnap_core::{CoinGeckoProvider, JobConfig, MarketDataProvider, ParquetWarehouse};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "coinsnap",
    about = "coinsnap CLI — Bitcoin daily market snapshot ETL"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the full job: fetch, merge, and replace the destination table.
    Run {
        /// Path to a TOML job config.
        #[arg(long)]
        config: PathBuf,

        /// Warehouse root directory. Defaults to ./warehouse.
        #[arg(long, default_value = "warehouse")]
        warehouse_dir: PathBuf,
    },
    /// Fetch and merge only; print the leading rows without writing anywhere.
    Preview {
        /// Path to a TOML job config.
        #[arg(long)]
        config: PathBuf,
    },
    /// Report whether the destination table exists and how many rows it holds.
    Status {
        /// Path to a TOML job config.
        #[arg(long)]
        config: PathBuf,

        /// Warehouse root directory. Defaults to ./warehouse.
        #[arg(long, default_value = "warehouse")]
        warehouse_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            warehouse_dir,
        } => cmd_run(&config, warehouse_dir),
        Commands::Preview { config } => cmd_preview(&config),
        Commands::Status {
            config,
            warehouse_dir,
        } => cmd_status(&config, warehouse_dir),
    }
}

fn cmd_run(config_path: &std::path::Path, warehouse_dir: PathBuf) -> Result<()> {
    let config = JobConfig::from_file(config_path)?;
    let provider = CoinGeckoProvider::new();
    let warehouse = ParquetWarehouse::new(warehouse_dir);

    let report = run_snapshot(&config, &provider, &warehouse)?;

    println!("{}", report.preview);
    println!(
        "Loaded {} rows into {} (source: {}).",
        report.rows_loaded, report.destination, report.source
    );
    Ok(())
}

fn cmd_preview(config_path: &std::path::Path) -> Result<()> {
    let config = JobConfig::from_file(config_path)?;
    let provider = CoinGeckoProvider::new();

    let chart = provider.fetch(&config.currency, config.lookback_days)?;
    chart.require_prices()?;
    let merged = merge_chart(&chart)?;

    println!("{}", preview(&merged, PREVIEW_ROWS));
    println!("{} rows merged (nothing written).", merged.height());
    Ok(())
}

fn cmd_status(config_path: &std::path::Path, warehouse_dir: PathBuf) -> Result<()> {
    let config = JobConfig::from_file(config_path)?;
    let warehouse = ParquetWarehouse::new(warehouse_dir);
    let destination = config.destination();

    match warehouse.get_meta(&destination) {
        Some(meta) => {
            println!("Table:     {}", destination.qualified_name());
            println!("Location:  {}", meta.location);
            println!("Rows:      {}", meta.row_count);
            println!("Loaded at: {}", meta.loaded_at);
        }
        None if warehouse.table_exists(&destination) => {
            println!(
                "Table {} exists but has no metadata sidecar.",
                destination.qualified_name()
            );
        }
        None => {
            println!("Table {} has not been loaded yet.", destination.qualified_name());
        }
    }
    Ok(())
}
