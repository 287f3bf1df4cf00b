use super::error::ApiError;
use super::types::{
    AdditionalFilter, FilterArgs, FilterRequest, FilterResponse, MessageResponse, QueryRequest,
    QueryResponse, RouteResponse, RoutedArgs,
};
use crate::router::{QueryRouter, DEFAULT_PRIMARY_NAME};
use crate::sheet::CallLogEntry;
use crate::shared::state::AppState;
use crate::table::{
    filter_eq_ignore_case, render_table, truncate_tokens, EqualityFilter, FilterCondition,
    TableError,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use log::{debug, warn};
use std::sync::Arc;

pub const PRIMARY_NAME_COLUMN: &str = "primary_name";
pub const CALL_LOG_ADDED: &str = "✅ Call log added successfully";
pub const NO_RESULTS: &str = "No results found.";

pub async fn handle_filter(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FilterRequest>, JsonRejection>,
) -> Result<Json<FilterResponse>, ApiError> {
    debug!("POST /filter");
    let result = match payload {
        Ok(Json(req)) => filter_data(&state, req.args).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond("/filter", result)
}

pub async fn handle_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    debug!("POST /route");
    let result = match payload {
        Ok(Json(req)) => route_query(&state.router, &req),
        Err(rejection) => Err(rejection.into()),
    };
    respond("/route", result)
}

pub async fn handle_log_to_sheet(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CallLogEntry>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!("POST /log-to-sheet");
    let result = match payload {
        Ok(Json(entry)) => state
            .call_log
            .append_log_row(&entry)
            .await
            .map(|()| MessageResponse::new(CALL_LOG_ADDED))
            .map_err(ApiError::from),
        Err(rejection) => Err(rejection.into()),
    };
    respond("/log-to-sheet", result)
}

pub async fn handle_query(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    debug!("POST /query");
    let result = match payload {
        Ok(Json(req)) => query_directory(&state, &req).await,
        Err(rejection) => Err(rejection.into()),
    };
    respond("/query", result)
}

fn respond<T>(endpoint: &str, result: Result<T, ApiError>) -> Result<Json<T>, ApiError> {
    match result {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            warn!("{endpoint} returned error payload: {e}");
            Err(e)
        }
    }
}

/// Loads `<data_dir>/<source>.csv`, keeps rows matching `primary_name` and the
/// additional filters, and returns the rendered table cut to the token limit.
pub async fn filter_data(state: &AppState, args: FilterArgs) -> Result<FilterResponse, ApiError> {
    let primary_name = args
        .primary_name
        .ok_or(ApiError::MissingField("primary_name"))?;
    let source = args.source.ok_or(ApiError::MissingField("source"))?;

    let table = state
        .data_tables
        .load(&source)
        .await
        .map_err(|e| match e {
            TableError::NotFound { .. } => ApiError::SourceNotFound(source.clone()),
            TableError::Parse(msg) => ApiError::SourceUnreadable(msg),
        })?;

    let filter = EqualityFilter::new(
        FilterCondition::new(PRIMARY_NAME_COLUMN, primary_name),
        args.additional_filters
            .iter()
            .filter_map(AdditionalFilter::to_condition)
            .collect(),
    );
    let filtered = filter.apply(&table);
    debug!(
        "Filtered {source}.csv from {} to {} rows",
        table.len(),
        filtered.len()
    );

    Ok(FilterResponse {
        filtered_data: truncate_tokens(
            &render_table(&filtered),
            state.config.data.max_response_tokens,
        ),
    })
}

/// Picks the data source for a query and returns arguments for `/filter`.
///
/// The detected location is logged but the answer always carries
/// [`DEFAULT_PRIMARY_NAME`].
pub fn route_query(router: &QueryRouter, req: &QueryRequest) -> Result<RouteResponse, ApiError> {
    let query = req.text();
    if query.is_empty() {
        return Err(ApiError::QueryRequired);
    }

    let decision = router.route(query).ok_or(ApiError::UnroutableQuery)?;
    let matched_location = decision.location.unwrap_or(DEFAULT_PRIMARY_NAME);
    debug!(
        "Routed to {} (matched location '{matched_location}')",
        decision.category
    );

    Ok(RouteResponse {
        args: RoutedArgs {
            primary_name: DEFAULT_PRIMARY_NAME.to_string(),
            source: decision.category,
            additional_filters: Vec::new(),
        },
    })
}

/// Routes the query, loads `<agent_directory_dir>/<category>.csv`, narrows it
/// to the mentioned location (case-insensitive) and returns the first rows.
pub async fn query_directory(
    state: &AppState,
    req: &QueryRequest,
) -> Result<QueryResponse, ApiError> {
    let query = req.text();
    if query.is_empty() {
        return Err(ApiError::QueryRequired);
    }

    let decision = state
        .router
        .route(query)
        .ok_or(ApiError::UnroutableDirectoryQuery)?;
    let source = decision.category.as_str();

    let table = state
        .directory_tables
        .load(source)
        .await
        .map_err(|e| match e {
            TableError::NotFound { .. } => ApiError::DirectoryNotFound(source.to_string()),
            TableError::Parse(msg) => ApiError::DirectoryUnreadable(msg),
        })?;

    let matches = match decision.location {
        Some(location) => filter_eq_ignore_case(&table, PRIMARY_NAME_COLUMN, location),
        None => table,
    };

    if matches.is_empty() {
        return Ok(QueryResponse::Message(MessageResponse::new(NO_RESULTS)));
    }
    Ok(QueryResponse::Rows(
        matches.to_records(state.config.data.query_result_limit),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Category;

    fn query(text: &str) -> QueryRequest {
        QueryRequest {
            query: Some(text.to_string()),
        }
    }

    #[test]
    fn test_route_query_examples() {
        let router = QueryRouter::new();
        let response = route_query(&router, &query("checkin policy")).unwrap();
        assert_eq!(response.args.source, Category::Rules);
        assert_eq!(response.args.primary_name, "Sterling_Holidays");
        assert!(response.args.additional_filters.is_empty());
    }

    #[test]
    fn test_route_query_ignores_detected_location() {
        let router = QueryRouter::new();
        let response = route_query(&router, &query("Sterling Kodai Lake room")).unwrap();
        assert_eq!(response.args.primary_name, DEFAULT_PRIMARY_NAME);
        assert_eq!(response.args.source, Category::RoomInformation);
    }

    #[test]
    fn test_route_query_errors() {
        let router = QueryRouter::new();
        assert!(matches!(
            route_query(&router, &QueryRequest::default()),
            Err(ApiError::QueryRequired)
        ));
        assert!(matches!(
            route_query(&router, &query("xyz")),
            Err(ApiError::UnroutableQuery)
        ));
    }
}
