use crate::config::AppConfig;
use crate::router::QueryRouter;
use crate::sheet::{CallLogSink, GoogleSheetsClient};
use crate::table::TableLoader;
use std::sync::Arc;

/// Per-process state handed to every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub router: QueryRouter,
    /// Tables behind `POST /filter`.
    pub data_tables: TableLoader,
    /// Tables behind `POST /query`.
    pub directory_tables: TableLoader,
    pub call_log: Arc<dyn CallLogSink>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let sheets = GoogleSheetsClient::new(config.sheets.to_client_config());
        Self::with_call_log(config, Arc::new(sheets))
    }

    pub fn with_call_log(config: AppConfig, call_log: Arc<dyn CallLogSink>) -> Self {
        Self {
            data_tables: TableLoader::new(config.data.data_dir.clone()),
            directory_tables: TableLoader::new(config.data.agent_directory_dir.clone()),
            router: QueryRouter::new(),
            call_log,
            config,
        }
    }
}
