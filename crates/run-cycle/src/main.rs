use anyhow::{Context, Result};
use clap::Parser;
use shared::{io, load_profiles, save_bundle, Config, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "run-cycle")]
#[command(about = "Run one search, categorize and publish cycle from the command line")]
struct Args {
    /// JSON file with user profiles (an array, or an object with "user_profiles")
    #[arg(short, long)]
    profiles: Option<PathBuf>,

    /// Where to write the bundle (defaults to the local data directory)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Print the bundle to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    let profiles = match &args.profiles {
        Some(path) => load_profiles(path)?,
        None => Vec::new(),
    };

    let pipeline = Pipeline::from_config(&config).context("Failed to initialize pipeline")?;
    let bundle = pipeline.run_cycle(&profiles).await;

    if args.stdout {
        let json =
            serde_json::to_string_pretty(&bundle).context("Failed to serialize output bundle")?;
        println!("{}", json);
        return Ok(());
    }

    let filepath = match args.output {
        Some(path) => path,
        None => io::get_default_bundles_dir()?.join(io::bundle_filename(chrono::Utc::now())),
    };

    save_bundle(&bundle, &filepath)?;
    eprintln!("✅ Bundle saved to: {}", filepath.display());

    Ok(())
}
