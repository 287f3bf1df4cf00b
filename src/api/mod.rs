pub mod error;
pub mod handlers;
pub mod types;

use crate::shared::state::AppState;
use axum::{routing::post, Router};
use std::sync::Arc;

pub use error::ApiError;
pub use handlers::{handle_filter, handle_log_to_sheet, handle_query, handle_route};
pub use types::{
    AdditionalFilter, FilterArgs, FilterRequest, FilterResponse, MessageResponse, QueryRequest,
    QueryResponse, RouteResponse, RoutedArgs,
};

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    configure_filter_routes()
        .route("/route", post(handle_route))
        .route("/log-to-sheet", post(handle_log_to_sheet))
        .route("/query", post(handle_query))
}

/// Routes served by the stand-alone filter deployment.
pub fn configure_filter_routes() -> Router<Arc<AppState>> {
    Router::new().route("/filter", post(handle_filter))
}
