use serde::Serialize;
use tracing::warn;

use crate::filters::{available_modalities, distinct_values, filter_by_values};
use crate::metrics;
use crate::models::{
    AaDemand, AaOffer, AdoptionTimeline, GroupAdoption, ModalityCount, Overview,
    SuccessComparison, SupplyDemand, Table, Warning,
};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsPage {
    pub modalities: Selection,
    pub overview: Overview,
    pub success: Option<SuccessComparison>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AffirmativePage {
    pub modalities: Selection,
    pub offer: AaOffer,
    pub demand: Option<AaDemand>,
    pub timeline: Option<AdoptionTimeline>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartsPage {
    pub modalities: Selection,
    pub distribution: Option<Vec<ModalityCount>>,
    pub supply_demand: Option<Vec<SupplyDemand>>,
    pub timeline: Option<AdoptionTimeline>,
    pub success: Option<SuccessComparison>,
    pub groups: Option<Vec<GroupAdoption>>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct TablePage {
    pub modalities: Selection,
    pub statuses: Selection,
    pub table: Table,
    pub warnings: Vec<Warning>,
}

fn section<T>(result: Result<T, Warning>, warnings: &mut Vec<Warning>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(warning) => {
            warnings.push(warning);
            None
        }
    }
}

/// Requested values that are not among `options` are dropped and reported.
/// If none of the request survives, the default (every option) is kept so a
/// typo never widens the slice past the default.
fn select(options: Vec<String>, requested: &[String]) -> (Selection, Option<Warning>) {
    let (known, unknown): (Vec<String>, Vec<String>) = requested
        .iter()
        .cloned()
        .partition(|value| options.contains(value));

    let warning = if unknown.is_empty() {
        None
    } else {
        warn!(?unknown, "ignoring unknown filter values");
        Some(Warning::UnknownSelection(unknown))
    };

    let selected = if known.is_empty() { options.clone() } else { known };
    (Selection { options, selected }, warning)
}

/// Copy of the active table restricted to the requested modalities. With no
/// request every available target modality is selected.
fn modality_slice(session: &Session, requested: &[String]) -> (Table, Selection, Vec<Warning>) {
    let config = session.config();
    let column = &config.columns.modality;
    let active = session.active();
    let mut warnings = session.warnings().to_vec();

    if !active.has_column(column) {
        warnings.push(Warning::MissingFilterColumn(column.clone()));
        let selection = Selection {
            options: Vec::new(),
            selected: Vec::new(),
        };
        return (active.clone(), selection, warnings);
    }

    let options = available_modalities(active, column, &config.target_modalities);
    let (selection, unknown) = select(options, requested);
    warnings.extend(unknown);
    let filtered = filter_by_values(active, column, &selection.selected);
    warnings.extend(filtered.warning);

    (filtered.table, selection, warnings)
}

pub fn metrics_page(session: &Session, modalities: &[String]) -> MetricsPage {
    let config = session.config();
    let (table, selection, mut warnings) = modality_slice(session, modalities);

    MetricsPage {
        modalities: selection,
        overview: metrics::overview(&table, config),
        success: section(metrics::success_comparison(&table, config), &mut warnings),
        warnings,
    }
}

pub fn affirmative_page(session: &Session, modalities: &[String]) -> AffirmativePage {
    let config = session.config();
    let (table, selection, mut warnings) = modality_slice(session, modalities);

    AffirmativePage {
        modalities: selection,
        offer: metrics::aa_offer(&table, config),
        demand: section(metrics::aa_demand(&table, config), &mut warnings),
        timeline: section(metrics::adoption_timeline(&table, config), &mut warnings),
        warnings,
    }
}

pub fn charts_page(session: &Session, modalities: &[String]) -> ChartsPage {
    let config = session.config();
    let (table, selection, mut warnings) = modality_slice(session, modalities);

    let distribution = section(metrics::modality_distribution(&table, config), &mut warnings);
    // the supply chart needs the same column; report it once
    let supply_demand = metrics::supply_demand(&table, config).ok();
    let timeline = section(metrics::adoption_timeline(&table, config), &mut warnings);
    let success = section(metrics::success_comparison(&table, config), &mut warnings);
    let groups = section(metrics::group_adoption(&table, config), &mut warnings);
    warnings.dedup();

    ChartsPage {
        modalities: selection,
        distribution,
        supply_demand,
        timeline,
        success,
        groups,
        warnings,
    }
}

/// Table view: any modality or status present in the data can be selected.
pub fn table_page(session: &Session, modalities: &[String], statuses: &[String]) -> TablePage {
    let columns = &session.config().columns;
    let active = session.active();
    let mut warnings = session.warnings().to_vec();
    if !active.has_column(&columns.modality) {
        warnings.push(Warning::MissingFilterColumn(columns.modality.clone()));
    }

    let (modality_selection, unknown) = select(distinct_values(active, &columns.modality), modalities);
    warnings.extend(unknown);
    let by_modality = filter_by_values(active, &columns.modality, &modality_selection.selected);
    warnings.extend(by_modality.warning);

    let (status_selection, unknown) = select(distinct_values(active, &columns.status), statuses);
    warnings.extend(unknown);
    let by_status = filter_by_values(&by_modality.table, &columns.status, &status_selection.selected);
    warnings.extend(by_status.warning);
    warnings.dedup();

    TablePage {
        modalities: modality_selection,
        statuses: status_selection,
        table: by_status.table,
        warnings,
    }
}
