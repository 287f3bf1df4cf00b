use crate::sheet::client::{DEFAULT_DRIVE_API_URL, DEFAULT_SHEETS_API_URL};
use crate::sheet::GoogleSheetsConfig;
use crate::table::DEFAULT_MAX_TOKENS;
use log::warn;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub sheets: SheetsConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DataConfig {
    /// Base directory for the `filter` endpoint.
    pub data_dir: PathBuf,
    /// Base directory for the `query` endpoint.
    pub agent_directory_dir: PathBuf,
    pub max_response_tokens: usize,
    pub query_result_limit: usize,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub credentials_path: PathBuf,
    pub spreadsheet_title: String,
    pub sheets_api_url: String,
    pub drive_api_url: String,
}

impl SheetsConfig {
    pub fn to_client_config(&self) -> GoogleSheetsConfig {
        GoogleSheetsConfig {
            credentials_path: self.credentials_path.clone(),
            spreadsheet_title: self.spreadsheet_title.clone(),
            sheets_api_url: self.sheets_api_url.trim_end_matches('/').to_string(),
            drive_api_url: self.drive_api_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_str = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let get_num = |key: &str, default: usize| -> usize { parse_or(&lookup, key, default) };

        AppConfig {
            server: ServerConfig {
                host: get_str("SERVER_HOST", "0.0.0.0"),
                port: parse_or(&lookup, "SERVER_PORT", 8000u16),
            },
            data: DataConfig {
                data_dir: PathBuf::from(get_str("DATA_DIR", "data")),
                agent_directory_dir: PathBuf::from(get_str(
                    "AGENT_DIRECTORY_DIR",
                    "public/agent_directory",
                )),
                max_response_tokens: get_num("MAX_RESPONSE_TOKENS", DEFAULT_MAX_TOKENS),
                query_result_limit: get_num("QUERY_RESULT_LIMIT", 5),
            },
            sheets: SheetsConfig {
                credentials_path: PathBuf::from(get_str("GOOGLE_CREDENTIALS_PATH", "creds.json")),
                spreadsheet_title: get_str("CALL_LOG_SPREADSHEET", "Formi_Call_Logs"),
                sheets_api_url: get_str("GOOGLE_SHEETS_API_URL", DEFAULT_SHEETS_API_URL),
                drive_api_url: get_str("GOOGLE_DRIVE_API_URL", DEFAULT_DRIVE_API_URL),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{raw}' for {key}, using {default}");
            default
        }),
        None => default,
    }
}
