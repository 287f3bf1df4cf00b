//! Process initialization: environment, logging and shared state

use log::info;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::shared::state::AppState;

/// Loads `.env` if present and starts the logger (`RUST_LOG`, default `info`).
pub fn init_environment_and_logging() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();
}

pub fn create_app_state(config: AppConfig) -> Arc<AppState> {
    info!(
        "Tables: filter -> {}, query -> {}",
        config.data.data_dir.display(),
        config.data.agent_directory_dir.display()
    );
    info!(
        "Call log spreadsheet '{}' (credentials: {})",
        config.sheets.spreadsheet_title,
        config.sheets.credentials_path.display()
    );
    Arc::new(AppState::new(config))
}
