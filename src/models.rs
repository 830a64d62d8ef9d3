use std::fmt;

use serde::Serialize;

/// In-memory copy of the admissions export: trimmed header names plus raw
/// string cells. Every row has exactly one cell per header; numeric columns
/// are coerced on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Copy of the table keeping only rows accepted by `keep`.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[String]) -> bool,
    {
        Table {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    /// Raw text of one column, in row order. Empty when the column is absent.
    pub fn text_column(&self, name: &str) -> Vec<&str> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|row| row[idx].as_str()).collect(),
            None => Vec::new(),
        }
    }

    /// Coerced values of one column; `None` marks cells that are not numbers.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| parse_number(&row[idx])).collect())
    }
}

/// Numeric coercion used for every numeric column: blank, text and
/// non-finite values become `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Affirmative-action group categories recognised in the free-text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GroupTag {
    Black,
    Indigenous,
    Disabled,
    Quilombola,
    Trans,
}

impl GroupTag {
    pub const ALL: [GroupTag; 5] = [
        GroupTag::Black,
        GroupTag::Indigenous,
        GroupTag::Disabled,
        GroupTag::Quilombola,
        GroupTag::Trans,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GroupTag::Black => "Negros",
            GroupTag::Indigenous => "Indígenas",
            GroupTag::Disabled => "PcD",
            GroupTag::Quilombola => "Quilombolas",
            GroupTag::Trans => "Trans",
        }
    }
}

/// Recoverable data problems. They degrade one section to its default and
/// are shown to the user; they never stop other sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Warning {
    MissingStatusColumn(String),
    MissingFilterColumn(String),
    UnknownSelection(Vec<String>),
    InsufficientAaData(String),
    MissingAdoptionColumns(Vec<String>),
    MissingGroupColumns,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingStatusColumn(column) => {
                write!(f, "column '{column}' not found; showing all records")
            }
            Warning::MissingFilterColumn(column) => {
                write!(f, "column '{column}' not found; filter disabled")
            }
            Warning::UnknownSelection(values) => write!(
                f,
                "ignored unknown filter values: {}",
                values.join(", ")
            ),
            Warning::InsufficientAaData(column) => {
                write!(f, "not enough '{column}' data for the AA comparison")
            }
            Warning::MissingAdoptionColumns(phases) => write!(
                f,
                "historical adoption unavailable; no column found for: {}",
                phases.join(", ")
            ),
            Warning::MissingGroupColumns => {
                write!(f, "group adoption unavailable; no group description columns found")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub program_count: usize,
    pub with_applicants: usize,
    pub seats_offered: f64,
    pub seats_filled: f64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessComparison {
    pub cohort_size: usize,
    pub applicants: f64,
    pub filled: f64,
    pub general_rate: f64,
    pub aa_applicants: f64,
    pub aa_quota_filled: f64,
    pub aa_open_filled: f64,
    pub aa_filled: f64,
    pub aa_rate: f64,
    pub delta_pp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AaOffer {
    pub seats_offered: f64,
    pub aa_seats_offered: f64,
    pub aa_share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AaDemand {
    pub disclosed: usize,
    pub disclosure_rate: f64,
    pub applicants: f64,
    pub filled: f64,
    pub aa_applicants: f64,
    pub aa_quota_filled: f64,
    pub aa_open_filled: f64,
    pub aa_filled: f64,
    pub aa_applicant_share: f64,
    pub aa_approval_share: f64,
    pub quota_share: f64,
    pub open_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    PreRule,
    PostInterim,
    PostResolution,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::PreRule, Phase::PostInterim, Phase::PostResolution];

    pub fn label(self) -> &'static str {
        match self {
            Phase::PreRule => "Antes da IN",
            Phase::PostInterim => "Pós-IN",
            Phase::PostResolution => "Pós-Resolução",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseCount {
    pub phase: Phase,
    pub programs: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptionTimeline {
    pub total: usize,
    pub phases: Vec<PhaseCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAdoption {
    pub group: GroupTag,
    pub pre_rule: usize,
    pub post_interim: usize,
    pub post_resolution: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalityCount {
    pub modality: String,
    pub programs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyDemand {
    pub modality: String,
    pub seats_offered: f64,
    pub applicants: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec!["1".to_string()]],
        );
        assert_eq!(table.rows()[0], vec!["1".to_string(), String::new()]);
    }

    #[test]
    fn coercion_rejects_text_and_blanks() {
        assert_eq!(parse_number(" 12 "), Some(12.0));
        assert_eq!(parse_number("-3.5"), Some(-3.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn numeric_column_is_none_for_unknown_names() {
        let table = Table::new(vec!["a".to_string()], vec![vec!["x".to_string()]]);
        assert!(table.numeric_column("b").is_none());
        assert_eq!(table.numeric_column("a"), Some(vec![None]));
    }
}
