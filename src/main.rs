use clap::Parser;
use campus_timetable::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and JWT_SECRET can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = campus_timetable::config::config().clone();
    tracing::info!("Starting campus-timetable in {:?} mode", config.environment);

    if let Err(e) = campus_timetable::cli::run(cli, config).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
