use std::process::ExitCode;

use tracing::{error, info, warn};

use filebox::{Config, Database, FileStorage, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let (config, load_error) = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = Config::default();
            config.apply_env_overrides();
            (config, Some(e))
        }
    };

    // Initialize logging
    if let Err(e) = filebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filebox::logging::init_console_only(&config.logging.level);
    }

    if let Some(e) = load_error {
        warn!("Failed to load {}: {}. Using default configuration.", CONFIG_PATH, e);
    }

    info!("Filebox starting");

    if let Err(e) = run(config).await {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn run(config: Config) -> filebox::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    let storage = FileStorage::new(&config.files.storage_path)?;
    info!("File storage initialized at {}", config.files.storage_path);

    WebServer::from_config(&config, db, storage)?.run().await?;

    Ok(())
}
