use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("{} not found", path.display())]
    NotFound { source_name: String, path: PathBuf },
    #[error("{0}")]
    Parse(String),
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
