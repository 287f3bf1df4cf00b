use crate::router::Category;
use crate::table::FilterCondition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct FilterRequest {
    pub args: FilterArgs,
}

/// Arguments of `POST /filter`. `primary_name` and `source` are required,
/// checked in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub additional_filters: Vec<AdditionalFilter>,
}

/// A `column_name = value` pair. A missing column name never matches a
/// column, so the condition is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalFilter {
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl AdditionalFilter {
    pub fn to_condition(&self) -> Option<FilterCondition> {
        self.column_name
            .as_ref()
            .map(|column| FilterCondition::new(column.clone(), self.value.clone()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    pub filtered_data: String,
}

/// Body of `POST /route` and `POST /query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

impl QueryRequest {
    pub fn text(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }
}

/// Arguments ready to be posted to `/filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedArgs {
    pub primary_name: String,
    pub source: Category,
    pub additional_filters: Vec<AdditionalFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub args: RoutedArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `POST /query` answers either with matching rows or with a message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Rows(Vec<Map<String, Value>>),
    Message(MessageResponse),
}
