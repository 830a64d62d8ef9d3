use tracing::warn;

use crate::models::{Table, Warning};

pub const ACTIVE_STATUS: &str = "ATIVO";

/// Table after a filter, plus the warning raised when the filter column is
/// missing and the filter fell back to a no-op.
#[derive(Debug, Clone)]
pub struct Filtered {
    pub table: Table,
    pub warning: Option<Warning>,
}

fn normalize(value: &str) -> String {
    value.trim().to_uppercase()
}

pub fn is_active(status: &str) -> bool {
    normalize(status) == ACTIVE_STATUS
}

/// Keeps only programs whose status is ATIVO after trimming and upper-casing.
pub fn filter_active(table: &Table, status_column: &str) -> Filtered {
    match table.column_index(status_column) {
        Some(idx) => Filtered {
            table: table.retain_rows(|row| is_active(&row[idx])),
            warning: None,
        },
        None => {
            warn!(column = status_column, "status column missing, keeping all records");
            Filtered {
                table: table.clone(),
                warning: Some(Warning::MissingStatusColumn(status_column.to_string())),
            }
        }
    }
}

/// Distinct modality values in first-appearance order, limited to `targets`.
pub fn available_modalities(table: &Table, modality_column: &str, targets: &[String]) -> Vec<String> {
    distinct_values(table, modality_column)
        .into_iter()
        .filter(|value| targets.iter().any(|target| target == value))
        .collect()
}

/// Distinct raw values of a column in first-appearance order.
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for value in table.text_column(column) {
        if !values.iter().any(|seen| seen == value) {
            values.push(value.to_string());
        }
    }
    values
}

/// Exact-match filter on one column. An empty selection leaves the table as is.
pub fn filter_by_values(table: &Table, column: &str, selected: &[String]) -> Filtered {
    if selected.is_empty() {
        return Filtered {
            table: table.clone(),
            warning: None,
        };
    }

    match table.column_index(column) {
        Some(idx) => Filtered {
            table: table.retain_rows(|row| selected.iter().any(|value| *value == row[idx])),
            warning: None,
        },
        None => {
            warn!(column, "filter column missing, filter disabled");
            Filtered {
                table: table.clone(),
                warning: Some(Warning::MissingFilterColumn(column.to_string())),
            }
        }
    }
}
