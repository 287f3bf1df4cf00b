use super::types::{FilterCondition, Table};
use log::trace;

/// A mandatory primary condition followed by ordered additional conditions.
///
/// Conditions naming a column the table does not have are skipped, so the
/// result is the AND of every condition whose column exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityFilter {
    pub primary: FilterCondition,
    pub additional: Vec<FilterCondition>,
}

impl EqualityFilter {
    pub fn new(primary: FilterCondition, additional: Vec<FilterCondition>) -> Self {
        Self {
            primary,
            additional,
        }
    }

    pub fn apply(&self, table: &Table) -> Table {
        std::iter::once(&self.primary)
            .chain(self.additional.iter())
            .fold(table.clone(), |current, condition| {
                apply_condition(&current, condition)
            })
    }
}

fn apply_condition(table: &Table, condition: &FilterCondition) -> Table {
    match table.column_index(&condition.column) {
        Some(idx) => table.retain_rows(|row| row[idx].matches(&condition.value)),
        None => {
            trace!("Skipping filter on absent column '{}'", condition.column);
            table.clone()
        }
    }
}

/// Rows whose `column`, rendered and lower-cased, equals `needle`.
/// A table without `column` is returned unchanged.
pub fn filter_eq_ignore_case(table: &Table, column: &str, needle: &str) -> Table {
    let Some(idx) = table.column_index(column) else {
        trace!("Skipping case-insensitive filter on absent column '{column}'");
        return table.clone();
    };
    table.retain_rows(|row| {
        !row[idx].is_missing() && row[idx].to_string().to_lowercase() == needle
    })
}
