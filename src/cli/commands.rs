//! Command dispatch and run reporting.

use crate::cli::args::{Args, Commands};
use crate::config::EtlConfig;
use crate::error::Result;
use crate::models::TransformStats;
use crate::store::FsStore;
use crate::transform::complaints::ComplaintTransformer;
use crate::transform::demographics::DemographicsTransformer;
use crate::transform::weather::WeatherTransformer;

use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run the selected subcommand to completion.
pub async fn run(args: Args) -> Result<()> {
    setup_logging(&args);

    let config = args.resolve_config()?;
    let store = FsStore::new(&config.data_root);
    info!("Data store root: {}", config.data_root.display());

    let stats = match args.command {
        Commands::Complaints => {
            ComplaintTransformer::new(store, config).run().await?
        }
        Commands::Weather => WeatherTransformer::new(store, config).run().await?,
        Commands::Demographics => {
            DemographicsTransformer::new(store, config).run().await?
        }
        Commands::All => run_all(store, config).await?,
    };

    if !args.quiet {
        print_summary(&stats);
    }
    Ok(())
}

/// The three transformers share no inputs or outputs, so `all` runs them
/// concurrently and fails if any one fails.
async fn run_all(store: FsStore, config: EtlConfig) -> Result<TransformStats> {
    let complaints = ComplaintTransformer::new(store.clone(), config.clone());
    let weather = WeatherTransformer::new(store.clone(), config.clone());
    let demographics = DemographicsTransformer::new(store, config);

    let (a, b, c) = tokio::try_join!(complaints.run(), weather.run(), demographics.run())?;

    let mut combined = a;
    combined.absorb(b);
    combined.absorb(c);
    Ok(combined)
}

fn setup_logging(args: &Args) {
    let directive = format!("nyc311_processor={}", args.log_level());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_summary(stats: &TransformStats) {
    println!();
    println!("{}", "Transformation complete".bright_green().bold());
    println!(
        "  {} {} read, {} written",
        "Rows:".bold(),
        stats.rows_in,
        stats.rows_out
    );
    for output in &stats.outputs {
        println!("  {} {}", "Output:".bold(), output);
    }
    if stats.empty_input {
        println!(
            "  {}",
            "Warning: input was empty; output is vacuous".yellow()
        );
    }
    println!("  {} {} ms", "Elapsed:".bold(), stats.elapsed_ms);
}
