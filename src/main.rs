use anyhow::Result;
use meowfacts_collector::{config::Config, update::Updater};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present; every setting has a default
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("meowfacts_collector=info".parse()?),
        )
        .init();

    info!("Starting MeowFacts dataset update");

    let config = Config::from_env()?;
    let updater = Updater::new(config)?;

    // Failures inside the run are reported, never fatal
    let report = updater.run().await;
    println!("{}", report);

    info!("Update finished ({} errors recorded)", report.errors.len());
    Ok(())
}
