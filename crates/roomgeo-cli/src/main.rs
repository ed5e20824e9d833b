mod batch;
mod resolve;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use roomgeo_geocoder::{GeocodeClient, GeocoderConfig, LocationResolver, RateLimiter};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "roomgeo-cli")]
#[command(about = "Geocode room-booking locations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve one address and print the resulting location update as JSON
    Resolve {
        /// Free-text street address
        address: String,
    },
    /// Resolve every record in a YAML or JSON records file
    Batch {
        /// Records file to read
        #[arg(long)]
        input: PathBuf,
        /// Where to write the updated records (defaults to the input file)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Re-resolve records whose coordinates were placed manually
        #[arg(long, default_value_t = false)]
        overwrite_manual: bool,
        /// List what would be resolved without calling the provider
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = roomgeo_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Resolve { address } => resolve::run_resolve(&config, &address).await,
        Commands::Batch {
            input,
            output,
            overwrite_manual,
            dry_run,
        } => {
            let output = output.unwrap_or_else(|| input.clone());
            batch::run_batch(&config, &input, &output, overwrite_manual, dry_run).await
        }
    }
}

/// Builds the resolver stack from the loaded configuration. The rate limiter
/// created here is the only one in the process.
fn build_resolver(config: &roomgeo_core::AppConfig) -> anyhow::Result<LocationResolver> {
    let geocoder_config = GeocoderConfig::from_app_config(config);
    let limiter = Arc::new(RateLimiter::new(geocoder_config.rate_limit_interval));
    let client = GeocodeClient::new(geocoder_config, limiter)?;
    Ok(LocationResolver::new(Arc::new(client)))
}
