use super::error::TableError;
use super::types::{CellValue, Table};
use log::{debug, trace};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Cell strings read as missing values.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads `<base_dir>/<source>.csv` into a [`Table`]. Every call goes back to
/// storage; nothing is cached.
#[derive(Debug, Clone)]
pub struct TableLoader {
    base_dir: PathBuf,
}

impl TableLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path for a source name, or `None` when the name would escape `base_dir`.
    pub fn resolve(&self, source: &str) -> Option<PathBuf> {
        if source.is_empty()
            || source.contains('/')
            || source.contains('\\')
            || source.contains("..")
            || source.contains('\0')
        {
            return None;
        }
        Some(self.base_dir.join(format!("{source}.csv")))
    }

    pub async fn load(&self, source: &str) -> Result<Table, TableError> {
        let not_found = |path: PathBuf| TableError::NotFound {
            source_name: source.to_string(),
            path,
        };

        let path = match self.resolve(source) {
            Some(p) => p,
            None => return Err(not_found(PathBuf::from(format!("{source}.csv")))),
        };

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(not_found(path));
        }

        debug!("Loading table from {}", path.display());
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| TableError::Parse(e.to_string()))?;

        parse_csv(&bytes)
    }
}

/// Parses comma-delimited text with a header row.
pub fn parse_csv(bytes: &[u8]) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(TableError::Parse(
            "No columns to parse from file".to_string(),
        ));
    }
    let columns = dedupe_columns(headers.iter());
    let width = columns.len();

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > width {
            // header is line 1
            return Err(TableError::Parse(format!(
                "Error tokenizing data. Expected {} fields in line {}, saw {}",
                width,
                i + 2,
                record.len()
            )));
        }
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|field| {
                if NA_VALUES.contains(&field) {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        row.resize(width, None);
        raw_rows.push(row);
    }

    let kinds: Vec<ColumnKind> = (0..width)
        .map(|col| infer_kind(raw_rows.iter().map(|r| r[col].as_deref())))
        .collect();
    trace!("Inferred column kinds {:?}", kinds);

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(kinds.iter())
                .map(|(raw, kind)| kind.convert(raw))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn convert(self, raw: Option<String>) -> CellValue {
        let Some(raw) = raw else {
            return CellValue::Missing;
        };
        match self {
            Self::Int => raw
                .parse::<i64>()
                .map(CellValue::Int)
                .unwrap_or(CellValue::Text(raw)),
            Self::Float => parse_float(&raw)
                .map(CellValue::Float)
                .unwrap_or(CellValue::Text(raw)),
            Self::Bool => parse_bool(&raw)
                .map(CellValue::Bool)
                .unwrap_or(CellValue::Text(raw)),
            Self::Text => CellValue::Text(raw),
        }
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> ColumnKind {
    let mut any_missing = false;
    let mut any_present = false;
    let mut all_int = true;
    let mut all_float = true;
    let mut all_bool = true;

    for cell in cells {
        match cell {
            None => any_missing = true,
            Some(v) => {
                any_present = true;
                all_int &= v.parse::<i64>().is_ok();
                all_float &= parse_float(v).is_some();
                all_bool &= parse_bool(v).is_some();
            }
        }
    }

    if !any_present {
        ColumnKind::Float
    } else if all_bool {
        // gaps stay Missing, present cells keep their boolean value
        ColumnKind::Bool
    } else if all_int && !any_missing {
        ColumnKind::Int
    } else if all_float {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" => return Some(f64::INFINITY),
        "-inf" | "-infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Repeated header names get `.1`, `.2`, ... suffixes.
fn dedupe_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut columns = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        if let Some(count) = seen.get(header).copied() {
            let mut n = count;
            loop {
                let candidate = format!("{header}.{n}");
                if !seen.contains_key(&candidate) {
                    name = candidate;
                    break;
                }
                n += 1;
            }
            seen.insert(header.to_string(), n + 1);
        }
        seen.entry(name.clone()).or_insert(1);
        columns.push(name);
    }
    columns
}
