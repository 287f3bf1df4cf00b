#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Could not open sheet: {0}")]
    NotFound(String),
    #[error("Error appending row: {0}")]
    Write(String),
}
