//! excel-seeder - spreadsheet to m_item loader
//!
//! Entry point for the CLI application.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use excel_seeder::config::{CliArgs, Config, OutputMode};
use excel_seeder::db::{create_pool, insert_all};
use excel_seeder::excel::parse_workbook;
use excel_seeder::models::ItemRecord;
use excel_seeder::seeder::write_seeder;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    // Load configuration
    let mut config = Config::load(&args.config).context("Failed to load config")?;
    config.apply_args(&args).context("Invalid command-line arguments")?;

    setup_logging(&config, args.verbose);

    info!("Starting Excel to PostgreSQL parser...");
    info!("Config: {}", args.config.display());
    info!("Excel: {}", args.excel.display());
    info!("Output mode: {:?}", args.output);

    let mapping = config
        .mapping(&args.profile)
        .context("Failed to resolve header mapping")?;
    info!("Using mapping profile '{}' ({} headers)", args.profile, mapping.len());

    // Parse Excel file
    let parsed = parse_workbook(&args.excel, &mapping)
        .with_context(|| format!("Failed to parse Excel file {}", args.excel.display()))?;
    info!(
        "Successfully parsed {} items from Excel ({} rows skipped)",
        parsed.items.len(),
        parsed.skipped
    );

    if parsed.items.is_empty() {
        info!("No items found in Excel file");
        return Ok(());
    }

    match args.output {
        OutputMode::Database => run_database(&config, &parsed.items)?,
        OutputMode::Seeder => {
            let summary = write_seeder(&parsed.items, &args.seeder_path, config.loader.param_limit)
                .context("Failed to generate seeder file")?;
            info!(
                "Wrote {} items in {} batches",
                summary.items, summary.batches
            );
            info!(
                "You can run the seeder with: psql -d your_database -f {}",
                summary.path.display()
            );
        }
    }

    info!("Process completed successfully!");
    Ok(())
}

/// Inserts on a current-thread runtime; batches run strictly one after another.
fn run_database(config: &Config, items: &[ItemRecord]) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(async {
        info!("Connecting to database {}...", config.database.display_target());
        let mut pool = create_pool(&config.database)
            .await
            .context("Failed to connect to database")?;
        info!("Database connection established");

        info!("Starting batch insert to database...");
        let result = insert_all(&mut pool, items, config.loader.param_limit).await;
        pool.close().await;

        let summary = result.context("Failed to insert items")?;
        info!(
            "Successfully inserted {} items to database ({} batches)",
            summary.rows, summary.batches
        );
        Ok::<_, anyhow::Error>(())
    })
}

fn setup_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.log.level.as_str() };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("excel_seeder={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
