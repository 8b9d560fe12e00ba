use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

use dentalaid_site::{config::Config, SiteApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .init();

    info!("Starting dentalaid-site...");

    // Load configuration
    let mut config = load_config().await?;
    config.apply_env_overrides();

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    if config.givepay.api_key.is_none() {
        info!("GivePay API key not set; donation checkout will return a configuration error");
    }
    if !config.mailchimp.is_configured() {
        info!("Mailchimp credentials not set; signups will be simulated in development");
    }

    // Create the site application
    let app = SiteApp::new(config)?;

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    // Handle shutdown signals
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, initiating graceful shutdown...");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        }
    });

    // Run the application with shutdown handler
    app.run_with_shutdown(shutdown_rx).await?;

    info!("dentalaid-site stopped gracefully");
    Ok(())
}

/// Load configuration from file or use defaults
async fn load_config() -> Result<Config> {
    // Look for config in standard locations
    let config_paths = vec![
        PathBuf::from("./dentalaid-site.toml"),
        PathBuf::from("/etc/dentalaid-site/dentalaid-site.toml"),
        dirs::config_dir()
            .map(|d| d.join("dentalaid-site/dentalaid-site.toml"))
            .unwrap_or_default(),
    ];

    for path in config_paths {
        if path.exists() {
            info!("Loading configuration from: {}", path.display());
            let content = tokio::fs::read_to_string(&path).await?;
            let config: Config = toml::from_str(&content)?;
            return Ok(config);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(Config::default())
}
