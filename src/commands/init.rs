//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::ContentStore;
use std::path::PathBuf;
use tracing::info;

/// Initialize harvest configuration and database
///
/// Writes the config to `config_path` when given, otherwise to the default
/// location under the home directory.
pub async fn cmd_init(config_path: Option<PathBuf>, force: bool) -> Result<Config> {
    let config = match config_path {
        Some(path) => Config::at_path(&path),
        None => Config::with_base_dir(None),
    };

    // Check if already initialized
    if config.paths.config_file.exists() && !force {
        return Err(Error::AlreadyInitialized(
            config.paths.config_file.display().to_string(),
        ));
    }

    std::fs::create_dir_all(&config.paths.base_dir)?;

    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    let store = ContentStore::connect(&config).await?;
    store.init_schema().await?;
    info!("Created database at {:?}", config.paths.db_file);

    Ok(config)
}
