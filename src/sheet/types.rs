use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const PLACEHOLDER: &str = "NA";
pub const CALL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A scalar written into one spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetValue {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl SheetValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl From<&str> for SheetValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One call record. Absent fields (or explicit nulls) are written as `NA`,
/// except `call_time`, which defaults to the time the row is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallLogEntry {
    #[serde(default)]
    pub call_time: Option<SheetValue>,
    #[serde(default)]
    pub phone_number: Option<SheetValue>,
    #[serde(default)]
    pub call_outcome: Option<SheetValue>,
    #[serde(default)]
    pub customer_name: Option<SheetValue>,
    #[serde(default)]
    pub room_name: Option<SheetValue>,
    #[serde(default)]
    pub check_in: Option<SheetValue>,
    #[serde(default)]
    pub check_out: Option<SheetValue>,
    #[serde(default)]
    pub guests: Option<SheetValue>,
    #[serde(default)]
    pub call_summary: Option<SheetValue>,
}

impl CallLogEntry {
    pub const COLUMNS: [&'static str; 9] = [
        "call_time",
        "phone_number",
        "call_outcome",
        "customer_name",
        "room_name",
        "check_in",
        "check_out",
        "guests",
        "call_summary",
    ];

    /// Cells in column order, with `now` standing in for a missing call time.
    pub fn to_row(&self, now: &str) -> Vec<Value> {
        let cell = |field: &Option<SheetValue>| {
            field
                .as_ref()
                .map_or_else(|| Value::String(PLACEHOLDER.to_string()), SheetValue::to_json)
        };

        vec![
            self.call_time
                .as_ref()
                .map_or_else(|| Value::String(now.to_string()), SheetValue::to_json),
            cell(&self.phone_number),
            cell(&self.call_outcome),
            cell(&self.customer_name),
            cell(&self.room_name),
            cell(&self.check_in),
            cell(&self.check_out),
            cell(&self.guests),
            cell(&self.call_summary),
        ]
    }

    /// Same as [`to_row`](Self::to_row), stamped with the current local time.
    pub fn to_row_now(&self) -> Vec<Value> {
        let now = chrono::Local::now().format(CALL_TIME_FORMAT).to_string();
        self.to_row(&now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_become_placeholders() {
        let row = CallLogEntry::default().to_row("2024-05-01 10:00:00");
        assert_eq!(row.len(), CallLogEntry::COLUMNS.len());
        assert_eq!(row[0], json!("2024-05-01 10:00:00"));
        assert!(row[1..].iter().all(|v| v == &json!("NA")));
    }

    #[test]
    fn test_row_keeps_column_order_and_value_types() {
        let entry: CallLogEntry = serde_json::from_value(json!({
            "call_time": "2024-05-01 09:30:00",
            "customer_name": "Asha",
            "guests": 3,
            "call_summary": null
        }))
        .unwrap();
        let row = entry.to_row("ignored");
        assert_eq!(
            row,
            vec![
                json!("2024-05-01 09:30:00"),
                json!("NA"),
                json!("NA"),
                json!("Asha"),
                json!("NA"),
                json!("NA"),
                json!("NA"),
                json!(3),
                json!("NA"),
            ]
        );
    }

    #[test]
    fn test_default_call_time_format() {
        let row = CallLogEntry::default().to_row_now();
        let stamp = row[0].as_str().unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, CALL_TIME_FORMAT).is_ok());
    }
}
