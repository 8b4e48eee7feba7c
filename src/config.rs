// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The storage medium is picked here, once, at startup. Nothing below the
//! repositories ever looks at the environment again.

use std::env;
use std::path::PathBuf;

const DEFAULT_SQLITE_PATH: &str = "gym.sqlite3";
const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Which storage medium backs the collections
    pub storage: StorageConfig,
}

/// Storage medium selection.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Local SQLite database file.
    Sqlite { path: PathBuf },
    /// Google Sheets spreadsheet, one worksheet per collection.
    Sheets(SheetsConfig),
    /// Process memory; contents are lost on exit.
    Memory,
}

/// Connection settings for the spreadsheet backend.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub api_base: String,
    pub credentials: SheetsCredentials,
}

#[derive(Debug, Clone)]
pub enum SheetsCredentials {
    /// Path to a service-account key file (JSON).
    ServiceAccountFile(PathBuf),
    /// Pre-issued OAuth access token, used as-is.
    AccessToken(String),
}

impl Config {
    /// Config for tests: in-memory storage, no external services.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            storage: StorageConfig::Memory,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage: StorageConfig::from_env()?,
        })
    }
}

impl StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let kind = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        match kind.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageConfig::Sqlite {
                path: env::var("SQLITE_PATH")
                    .unwrap_or_else(|_| DEFAULT_SQLITE_PATH.to_string())
                    .into(),
            }),
            "sheets" => {
                let spreadsheet_id = env::var("SHEETS_SPREADSHEET_ID")
                    .map(|v| v.trim().to_string())
                    .map_err(|_| ConfigError::Missing("SHEETS_SPREADSHEET_ID"))?;

                // A static token wins over a key file; handy against local fakes.
                let credentials = match env::var("SHEETS_ACCESS_TOKEN") {
                    Ok(token) => SheetsCredentials::AccessToken(token.trim().to_string()),
                    Err(_) => SheetsCredentials::ServiceAccountFile(
                        env::var("GOOGLE_APPLICATION_CREDENTIALS")
                            .map_err(|_| ConfigError::Missing("GOOGLE_APPLICATION_CREDENTIALS"))?
                            .into(),
                    ),
                };

                Ok(StorageConfig::Sheets(SheetsConfig {
                    spreadsheet_id,
                    api_base: env::var("SHEETS_API_BASE")
                        .unwrap_or_else(|_| DEFAULT_SHEETS_API_BASE.to_string()),
                    credentials,
                }))
            }
            "memory" => Ok(StorageConfig::Memory),
            other => Err(ConfigError::Invalid {
                name: "STORAGE_BACKEND",
                value: other.to_string(),
            }),
        }
    }

    /// Human-readable backend name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageConfig::Sqlite { .. } => "sqlite",
            StorageConfig::Sheets(_) => "sheets",
            StorageConfig::Memory => "memory",
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment is process-global, so every case lives in one test.
    #[test]
    fn test_storage_config_from_env() {
        env::set_var("STORAGE_BACKEND", "memory");
        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.storage.kind(), "memory");

        env::set_var("STORAGE_BACKEND", "sqlite");
        env::set_var("SQLITE_PATH", "/tmp/gym-test.sqlite3");
        match Config::from_env().expect("Config should load").storage {
            StorageConfig::Sqlite { path } => {
                assert_eq!(path, PathBuf::from("/tmp/gym-test.sqlite3"))
            }
            other => panic!("expected sqlite, got {:?}", other),
        }

        env::set_var("STORAGE_BACKEND", "sheets");
        env::remove_var("SHEETS_SPREADSHEET_ID");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("SHEETS_SPREADSHEET_ID"))
        ));

        env::set_var("SHEETS_SPREADSHEET_ID", " sheet-123 ");
        env::set_var("SHEETS_ACCESS_TOKEN", "token-abc");
        match Config::from_env().expect("Config should load").storage {
            StorageConfig::Sheets(sheets) => {
                assert_eq!(sheets.spreadsheet_id, "sheet-123");
                assert!(matches!(
                    sheets.credentials,
                    SheetsCredentials::AccessToken(ref t) if t == "token-abc"
                ));
            }
            other => panic!("expected sheets, got {:?}", other),
        }

        env::set_var("STORAGE_BACKEND", "postgres");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid { name: "STORAGE_BACKEND", .. })
        ));

        env::remove_var("STORAGE_BACKEND");
        env::remove_var("SQLITE_PATH");
        env::remove_var("SHEETS_SPREADSHEET_ID");
        env::remove_var("SHEETS_ACCESS_TOKEN");
    }
}
