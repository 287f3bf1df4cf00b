use serde_json::{Map, Number, Value};
use std::fmt;

/// A single cell after per-column type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Strict equality against a JSON request value.
    ///
    /// Numbers compare numerically across integer/float cells, booleans count
    /// as 1 and 0 against numeric cells, text compares byte-for-byte, and a
    /// missing cell never matches anything.
    pub fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (Self::Missing, _) => false,
            (Self::Int(cell), Value::Number(n)) => match n.as_i64() {
                Some(v) => v == *cell,
                None => n.as_f64() == Some(*cell as f64),
            },
            (Self::Float(cell), Value::Number(n)) => n.as_f64() == Some(*cell),
            (Self::Int(cell), Value::Bool(b)) => *cell == i64::from(*b),
            (Self::Float(cell), Value::Bool(b)) => *cell == f64::from(u8::from(*b)),
            (Self::Bool(cell), Value::Bool(b)) => cell == b,
            (Self::Bool(cell), Value::Number(n)) => n.as_f64() == Some(f64::from(u8::from(*cell))),
            (Self::Text(cell), Value::String(s)) => cell == s,
            _ => false,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Missing => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "NaN"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One `column = value` equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub column: String,
    pub value: Value,
}

impl FilterCondition {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Ordered rows with named columns. Rows are stored positionally, aligned
/// with `columns`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Keeps rows for which `keep` returns true, preserving order.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// First `limit` rows as JSON objects keyed by column name, in header order.
    pub fn to_records(&self, limit: usize) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter())
                    .map(|(col, cell)| (col.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_matches_numbers_across_kinds() {
        assert!(CellValue::Int(3).matches(&json!(3)));
        assert!(CellValue::Int(3).matches(&json!(3.0)));
        assert!(CellValue::Float(2.5).matches(&json!(2.5)));
        assert!(!CellValue::Int(3).matches(&json!("3")));
    }

    #[test]
    fn test_bool_matches_one_and_zero() {
        assert!(CellValue::Int(1).matches(&json!(true)));
        assert!(CellValue::Int(0).matches(&json!(false)));
        assert!(!CellValue::Int(2).matches(&json!(true)));
        assert!(CellValue::Float(1.0).matches(&json!(true)));
        assert!(CellValue::Bool(false).matches(&json!(0)));
        assert!(!CellValue::Bool(true).matches(&json!("True")));
    }

    #[test]
    fn test_missing_never_matches() {
        assert!(!CellValue::Missing.matches(&json!(null)));
        assert!(!CellValue::Missing.matches(&json!("")));
    }

    #[test]
    fn test_text_match_is_case_sensitive() {
        let cell = CellValue::Text("Sterling_Holidays".to_string());
        assert!(cell.matches(&json!("Sterling_Holidays")));
        assert!(!cell.matches(&json!("sterling_holidays")));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Float(2.0).to_string(), "2.0");
        assert_eq!(CellValue::Float(2.25).to_string(), "2.25");
        assert_eq!(CellValue::Missing.to_string(), "NaN");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
    }

    #[test]
    fn test_to_records_keeps_header_order() {
        let table = Table::new(
            vec!["b".to_string(), "a".to_string()],
            vec![vec![CellValue::Int(1), CellValue::Missing]],
        );
        let records = table.to_records(5);
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(records[0]["a"], Value::Null);
    }
}
