use crate::models::Table;

/// Sum of a numeric column. Missing columns and unparseable cells count as 0.
pub fn sum_column(table: &Table, column: Option<&str>) -> f64 {
    column
        .and_then(|name| table.numeric_column(name))
        .map(|values| values.into_iter().flatten().sum())
        .unwrap_or(0.0)
}

/// Ratio as a percentage, 0 when the denominator is not positive.
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}
