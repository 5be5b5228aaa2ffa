mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DeadlinesConfig, LoggingConfig};
pub use database::{ParentLink, ProgressStore};

use std::path::PathBuf;

/// Returns the directory holding the progress database and config.
///
/// `STUDYQUEST_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/studyquest[-dev]/`, with `STUDYQUEST_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("STUDYQUEST_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYQUEST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studyquest-dev")
            } else {
                base_dir.join("studyquest")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
