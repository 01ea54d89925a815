// src/config.rs
//! Unified configuration: optional `worklance.toml` with environment
//! variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: EnvironmentConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub database_path: PathBuf,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub page_size: i64,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    database_path: Option<PathBuf>,
    port: Option<u16>,
    page_size: Option<i64>,
}

impl AppConfig {
    /// Load all configuration. Precedence: environment variables, then
    /// `worklance.toml`, then defaults.
    pub fn load() -> Result<Self> {
        let file = load_file(&PathBuf::from("worklance.toml"))?;
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        info!("Loading configuration for environment: {}", env);

        let base_dir = if env == "production" {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .ok()
            .or(file.database_path)
            .unwrap_or_else(|| base_dir.join("data").join("worklance.db"));

        let port = match std::env::var("SERVER_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .context("SERVER_PORT must be a valid port number")?,
            Err(_) => file.port.unwrap_or(8000),
        };

        Ok(Self {
            environment: EnvironmentConfig {
                database_path,
                port,
            },
            search: SearchConfig {
                page_size: file.page_size.unwrap_or(6).max(1),
            },
        })
    }

    /// Ensure all required directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = self.environment.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

fn load_file(path: &PathBuf) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_config() {
        let file: FileConfig = toml::from_str("page_size = 12").unwrap();
        assert_eq!(file.page_size, Some(12));
        assert!(file.port.is_none());
        assert!(file.database_path.is_none());
    }

    #[test]
    fn test_full_file_config() {
        let file: FileConfig = toml::from_str(
            r#"
            database_path = "/var/lib/worklance/jobs.db"
            port = 9000
            page_size = 6
            "#,
        )
        .unwrap();
        assert_eq!(file.port, Some(9000));
        assert_eq!(
            file.database_path,
            Some(PathBuf::from("/var/lib/worklance/jobs.db"))
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected_gracefully() {
        // Unknown keys are allowed; only typed fields are read
        let file: FileConfig = toml::from_str("unrelated = true").unwrap();
        assert!(file.page_size.is_none());
    }
}
