mod config;

pub use config::{Config, TimerConfig};

use std::path::PathBuf;

/// Returns `~/.config/sessiontrack[-dev]/` based on SESSIONTRACK_ENV.
///
/// Set SESSIONTRACK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SESSIONTRACK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("sessiontrack-dev")
    } else {
        base_dir.join("sessiontrack")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
