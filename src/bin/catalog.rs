use anyhow::Result;
use meowfacts_collector::{config::Config, discovery, error_log::ErrorLog};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let client = config.http_client()?;
    let mut errors = ErrorLog::new();

    let catalog = discovery::discover(&client, &config, &mut errors).await;
    info!("Discovered {} languages via {}", catalog.len(), config.options_url());

    for (language, count) in catalog.iter() {
        println!("{} {}", language, count);
    }

    for error in errors.unique() {
        eprintln!("{}", error);
    }

    Ok(())
}
