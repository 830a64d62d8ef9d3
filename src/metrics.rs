use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::aggregate::{percent, sum_column};
use crate::columns::resolve_column;
use crate::config::Config;
use crate::groups::detect_groups;
use crate::models::{
    AaDemand, AaOffer, AdoptionTimeline, GroupAdoption, GroupTag, ModalityCount, Overview, Phase,
    PhaseCount, SuccessComparison, SupplyDemand, Table, Warning,
};

/// Occupancy over programs that reported a positive applicant count.
pub fn overview(table: &Table, config: &Config) -> Overview {
    let cols = &config.columns;
    let applicants = table.numeric_column(&cols.applicants);

    let with_applicants = applicants
        .as_ref()
        .map(|values| values.iter().filter(|value| value.is_some()).count())
        .unwrap_or(0);

    let reporting = match &applicants {
        Some(values) => {
            let mut flags = values.iter().map(|value| matches!(value, Some(v) if *v > 0.0));
            table.retain_rows(|_| flags.next().unwrap_or(false))
        }
        None => table.retain_rows(|_| false),
    };

    let seats_offered = sum_column(&reporting, Some(cols.seats_offered.as_str()));
    let seats_filled = sum_column(&reporting, Some(cols.seats_filled.as_str()));

    Overview {
        program_count: table.len(),
        with_applicants,
        seats_offered,
        seats_filled,
        occupancy_rate: percent(seats_filled, seats_offered),
    }
}

pub fn aa_offer(table: &Table, config: &Config) -> AaOffer {
    let seats_offered = sum_column(table, Some(config.columns.seats_offered.as_str()));
    let aa_seats_offered = sum_column(table, Some(config.columns.aa_seats_offered.as_str()));

    AaOffer {
        seats_offered,
        aa_seats_offered,
        aa_share: percent(aa_seats_offered, seats_offered),
    }
}

/// Programs that published an AA applicant count. General and AA rates are
/// both computed over this subset so they stay comparable.
pub fn aa_cohort(table: &Table, config: &Config) -> Table {
    match table.numeric_column(&config.columns.aa_applicants) {
        Some(values) => {
            let mut flags = values.into_iter().map(|value| value.is_some());
            table.retain_rows(|_| flags.next().unwrap_or(false))
        }
        None => table.retain_rows(|_| false),
    }
}

struct CohortSums {
    size: usize,
    applicants: f64,
    filled: f64,
    aa_applicants: f64,
    aa_quota_filled: f64,
    aa_open_filled: f64,
}

impl CohortSums {
    fn aa_filled(&self) -> f64 {
        self.aa_quota_filled + self.aa_open_filled
    }
}

fn cohort_sums(table: &Table, config: &Config) -> Result<CohortSums, Warning> {
    let cols = &config.columns;
    let cohort = aa_cohort(table, config);
    if cohort.is_empty() {
        warn!(column = %cols.aa_applicants, "no programs report AA applicants");
        return Err(Warning::InsufficientAaData(cols.aa_applicants.clone()));
    }

    let quota_column = resolve_column(cohort.headers(), &config.keywords.aa_quota_filled);
    let open_column = resolve_column(cohort.headers(), &config.keywords.aa_open_filled);
    debug!(?quota_column, ?open_column, "resolved AA approval columns");

    Ok(CohortSums {
        size: cohort.len(),
        applicants: sum_column(&cohort, Some(cols.applicants.as_str())),
        filled: sum_column(&cohort, Some(cols.seats_filled.as_str())),
        aa_applicants: sum_column(&cohort, Some(cols.aa_applicants.as_str())),
        aa_quota_filled: sum_column(&cohort, quota_column),
        aa_open_filled: sum_column(&cohort, open_column),
    })
}

pub fn success_comparison(table: &Table, config: &Config) -> Result<SuccessComparison, Warning> {
    let sums = cohort_sums(table, config)?;
    let general_rate = percent(sums.filled, sums.applicants);
    let aa_rate = percent(sums.aa_filled(), sums.aa_applicants);

    Ok(SuccessComparison {
        cohort_size: sums.size,
        applicants: sums.applicants,
        filled: sums.filled,
        general_rate,
        aa_applicants: sums.aa_applicants,
        aa_quota_filled: sums.aa_quota_filled,
        aa_open_filled: sums.aa_open_filled,
        aa_filled: sums.aa_filled(),
        aa_rate,
        delta_pp: aa_rate - general_rate,
    })
}

pub fn aa_demand(table: &Table, config: &Config) -> Result<AaDemand, Warning> {
    let sums = cohort_sums(table, config)?;
    let aa_filled = sums.aa_filled();

    Ok(AaDemand {
        disclosed: sums.size,
        disclosure_rate: percent(sums.size as f64, table.len() as f64),
        applicants: sums.applicants,
        filled: sums.filled,
        aa_applicants: sums.aa_applicants,
        aa_quota_filled: sums.aa_quota_filled,
        aa_open_filled: sums.aa_open_filled,
        aa_filled,
        aa_applicant_share: percent(sums.aa_applicants, sums.applicants),
        aa_approval_share: percent(aa_filled, sums.filled),
        quota_share: percent(sums.aa_quota_filled, sums.filled),
        open_share: percent(sums.aa_open_filled, sums.filled),
    })
}

pub fn is_yes(value: &str) -> bool {
    matches!(value.trim().to_uppercase().as_str(), "S" | "SIM")
}

fn yes_flags(table: &Table, column: &str) -> Vec<bool> {
    table.text_column(column).into_iter().map(is_yes).collect()
}

/// Per-program adoption flags for the three policy phases, each phase
/// including everything adopted earlier.
pub fn adoption_flags(table: &Table, config: &Config) -> Result<Vec<[bool; 3]>, Warning> {
    let kw = &config.keywords;
    let headers = table.headers();
    let pre = resolve_column(headers, &kw.adoption_pre);
    let interim = resolve_column(headers, &kw.adoption_interim);
    let resolution = resolve_column(headers, &kw.adoption_resolution);

    let (pre, interim, resolution) = match (pre, interim, resolution) {
        (Some(pre), Some(interim), Some(resolution)) => (pre, interim, resolution),
        _ => {
            let missing: Vec<String> = [
                (pre, Phase::PreRule),
                (interim, Phase::PostInterim),
                (resolution, Phase::PostResolution),
            ]
            .into_iter()
            .filter(|(column, _)| column.is_none())
            .map(|(_, phase)| phase.label().to_string())
            .collect();
            warn!(?missing, "adoption columns not found");
            return Err(Warning::MissingAdoptionColumns(missing));
        }
    };

    let pre = yes_flags(table, pre);
    let interim = yes_flags(table, interim);
    let resolution = yes_flags(table, resolution);

    Ok(pre
        .into_iter()
        .zip(interim)
        .zip(resolution)
        .map(|((pre, interim), resolution)| {
            let after_interim = pre || interim;
            [pre, after_interim, after_interim || resolution]
        })
        .collect())
}

pub fn adoption_timeline(table: &Table, config: &Config) -> Result<AdoptionTimeline, Warning> {
    let flags = adoption_flags(table, config)?;
    let total = table.len();

    let phases = Phase::ALL
        .into_iter()
        .enumerate()
        .map(|(idx, phase)| {
            let programs = flags.iter().filter(|flag| flag[idx]).count();
            PhaseCount {
                phase,
                programs,
                percent: percent(programs as f64, total as f64),
            }
        })
        .collect();

    Ok(AdoptionTimeline { total, phases })
}

fn cells<'a>(table: &'a Table, column: Option<&str>) -> Vec<Option<&'a str>> {
    match column {
        Some(name) => table.text_column(name).into_iter().map(Some).collect(),
        None => vec![None; table.len()],
    }
}

/// Per-program group coverage for the three phases, accumulated so each phase
/// is a superset of the one before.
pub fn group_coverage(table: &Table, config: &Config) -> Result<Vec<[BTreeSet<GroupTag>; 3]>, Warning> {
    let kw = &config.keywords;
    let headers = table.headers();
    let pre = resolve_column(headers, &kw.groups_pre);
    let interim = resolve_column(headers, &kw.groups_interim);
    let all = resolve_column(headers, &kw.groups_all);
    let resolution = resolve_column(headers, &kw.groups_resolution);

    if pre.is_none() && interim.is_none() && all.is_none() && resolution.is_none() {
        warn!("group description columns not found");
        return Err(Warning::MissingGroupColumns);
    }

    let pre = cells(table, pre);
    let interim = cells(table, interim);
    let all = cells(table, all);
    let resolution = cells(table, resolution);

    let coverage = (0..table.len())
        .map(|row| {
            let before = detect_groups(pre[row]);

            let mut after_interim = before.clone();
            after_interim.extend(detect_groups(interim[row]));

            let mut after_resolution = after_interim.clone();
            if all[row].map(is_yes).unwrap_or(false) {
                after_resolution.extend(GroupTag::ALL);
            } else {
                after_resolution.extend(detect_groups(resolution[row]));
            }

            [before, after_interim, after_resolution]
        })
        .collect();

    Ok(coverage)
}

pub fn group_adoption(table: &Table, config: &Config) -> Result<Vec<GroupAdoption>, Warning> {
    let coverage = group_coverage(table, config)?;
    let count = |group: GroupTag, phase: usize| {
        coverage
            .iter()
            .filter(|sets| sets[phase].contains(&group))
            .count()
    };

    Ok(GroupTag::ALL
        .into_iter()
        .map(|group| GroupAdoption {
            group,
            pre_rule: count(group, 0),
            post_interim: count(group, 1),
            post_resolution: count(group, 2),
        })
        .collect())
}

pub fn modality_distribution(table: &Table, config: &Config) -> Result<Vec<ModalityCount>, Warning> {
    let column = &config.columns.modality;
    if !table.has_column(column) {
        return Err(Warning::MissingFilterColumn(column.clone()));
    }

    let mut counts: Vec<ModalityCount> = Vec::new();
    for value in table.text_column(column) {
        match counts.iter_mut().find(|entry| entry.modality == value) {
            Some(entry) => entry.programs += 1,
            None => counts.push(ModalityCount {
                modality: value.to_string(),
                programs: 1,
            }),
        }
    }

    // stable sort keeps first-appearance order for ties
    counts.sort_by(|a, b| b.programs.cmp(&a.programs));
    Ok(counts)
}

pub fn supply_demand(table: &Table, config: &Config) -> Result<Vec<SupplyDemand>, Warning> {
    let cols = &config.columns;
    let modality = cols.modality.as_str();
    let Some(modality_idx) = table.column_index(modality) else {
        return Err(Warning::MissingFilterColumn(cols.modality.clone()));
    };

    let offered = table.numeric_column(&cols.seats_offered);
    let applicants = table.numeric_column(&cols.applicants);
    let value_at = |column: &Option<Vec<Option<f64>>>, row: usize| {
        column
            .as_ref()
            .and_then(|values| values[row])
            .unwrap_or(0.0)
    };

    let mut groups: Vec<SupplyDemand> = Vec::new();
    for (row, cells) in table.rows().iter().enumerate() {
        let key = &cells[modality_idx];
        let idx = match groups.iter().position(|entry| &entry.modality == key) {
            Some(idx) => idx,
            None => {
                groups.push(SupplyDemand {
                    modality: key.clone(),
                    seats_offered: 0.0,
                    applicants: 0.0,
                });
                groups.len() - 1
            }
        };
        groups[idx].seats_offered += value_at(&offered, row);
        groups[idx].applicants += value_at(&applicants, row);
    }

    groups.sort_by(|a, b| a.modality.cmp(&b.modality));
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [&str; 9] = [
        "Situação",
        "Modalidade",
        "Total de Vagas Oferecidas",
        "Total de Vagas AA Oferecidas",
        "Vagas totais preenchidas",
        "Inscritos totais",
        "Inscritos AA",
        "Vagas preenchidas AA",
        "Aprovados na AC (AA)",
    ];

    fn table(rows: &[[&str; 9]]) -> Table {
        Table::new(
            HEADERS.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    fn approx(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    fn with_columns(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn occupancy_uses_programs_with_applicants() {
        let t = table(&[
            ["ATIVO", "Mestrado", "10", "2", "5", "30", "", "", ""],
            ["ATIVO", "Doutorado", "20", "4", "20", "12", "", "", ""],
            ["ATIVO", "Mestrado", "50", "0", "0", "", "", "", ""],
            ["ATIVO", "Mestrado", "40", "0", "0", "0", "", "", ""],
        ]);

        let overview = overview(&t, &Config::default());
        assert_eq!(overview.program_count, 4);
        assert_eq!(overview.with_applicants, 3);
        assert_eq!(overview.seats_offered, 30.0);
        assert!((overview.occupancy_rate - 83.333).abs() < 0.001);
    }

    #[test]
    fn occupancy_is_zero_without_applicant_column() {
        let t = with_columns(&["Total de Vagas Oferecidas"], &[&["10"]]);
        let overview = overview(&t, &Config::default());
        assert_eq!(overview.with_applicants, 0);
        assert_eq!(overview.occupancy_rate, 0.0);
    }

    #[test]
    fn success_rates_share_the_aa_cohort() {
        let t = table(&[
            ["ATIVO", "Mestrado", "10", "3", "6", "10", "4", "1", "1"],
            ["ATIVO", "Mestrado", "10", "3", "5", "8", "", "3", "3"],
        ]);

        let comparison = success_comparison(&t, &Config::default()).unwrap();
        assert_eq!(comparison.cohort_size, 1);
        approx(comparison.general_rate, 60.0);
        assert_eq!(comparison.aa_filled, 2.0);
        approx(comparison.aa_rate, 50.0);
        approx(comparison.delta_pp, -10.0);
    }

    #[test]
    fn comparison_unavailable_without_aa_applicants() {
        let t = table(&[["ATIVO", "Mestrado", "10", "3", "6", "10", "-", "1", "1"]]);
        assert_eq!(
            success_comparison(&t, &Config::default()),
            Err(Warning::InsufficientAaData("Inscritos AA".to_string()))
        );

        let no_column = with_columns(&["Inscritos totais"], &[&["10"]]);
        assert!(aa_demand(&no_column, &Config::default()).is_err());
    }

    #[test]
    fn missing_approval_columns_count_as_zero() {
        let t = with_columns(
            &["Inscritos totais", "Vagas totais preenchidas", "Inscritos AA"],
            &[&["10", "5", "4"]],
        );
        let comparison = success_comparison(&t, &Config::default()).unwrap();
        assert_eq!(comparison.aa_filled, 0.0);
        assert_eq!(comparison.aa_rate, 0.0);
    }

    #[test]
    fn aa_demand_reports_disclosure_and_shares() {
        let t = table(&[
            ["ATIVO", "Mestrado", "10", "3", "8", "20", "5", "2", "2"],
            ["ATIVO", "Mestrado", "10", "3", "5", "8", "", "3", "3"],
            ["ATIVO", "Mestrado", "10", "3", "5", "8", "x", "3", "3"],
            ["ATIVO", "Doutorado", "10", "3", "2", "5", "0", "0", "0"],
        ]);
        let config = Config::default();

        let demand = aa_demand(&t, &config).unwrap();
        assert_eq!(demand.disclosed, 2);
        approx(demand.disclosure_rate, 50.0);
        assert_eq!(demand.applicants, 25.0);
        assert_eq!(demand.filled, 10.0);
        approx(demand.aa_applicant_share, 20.0);
        approx(demand.aa_approval_share, 40.0);
        approx(demand.quota_share, 20.0);
        approx(demand.open_share, 20.0);
    }

    #[test]
    fn aa_share_covers_all_records() {
        let t = table(&[
            ["ATIVO", "Mestrado", "10", "2", "", "", "", "", ""],
            ["ATIVO", "Mestrado", "30", "x", "", "", "", "", ""],
        ]);
        let offer = aa_offer(&t, &Config::default());
        assert_eq!(offer.aa_seats_offered, 2.0);
        approx(offer.aa_share, 5.0);
    }

    #[test]
    fn adoption_accumulates_across_phases() {
        let t = with_columns(
            &[
                "Programa",
                "Contemplava antes da IN?",
                "Contemplava após a IN?",
                "Contempla após a Resolução?",
            ],
            &[
                &["A", "Sim", "", ""],
                &["B", "N", " s ", "N"],
                &["C", "", "", "SIM"],
                &["D", "Não", "Não", "Não"],
            ],
        );
        let config = Config::default();

        let flags = adoption_flags(&t, &config).unwrap();
        assert_eq!(flags[0], [true, true, true]);
        for flag in &flags {
            assert!(!flag[0] || flag[1]);
            assert!(!flag[1] || flag[2]);
        }

        let timeline = adoption_timeline(&t, &config).unwrap();
        let counts: Vec<usize> = timeline.phases.iter().map(|p| p.programs).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        approx(timeline.phases[2].percent, 75.0);
    }

    #[test]
    fn adoption_reports_missing_phase_columns() {
        let t = with_columns(&["Programa", "Contemplava antes da IN?"], &[&["A", "S"]]);
        assert_eq!(
            adoption_flags(&t, &Config::default()),
            Err(Warning::MissingAdoptionColumns(vec![
                "Pós-IN".to_string(),
                "Pós-Resolução".to_string()
            ]))
        );
    }

    #[test]
    fn group_coverage_is_monotonic_and_honours_all_groups() {
        let t = with_columns(
            &[
                "Programa",
                "Quais grupos contemplados antes",
                "Grupos incluídos após a IN",
                "Contempla todos os grupos?",
                "Grupos incluídos após a Resolução",
            ],
            &[
                &["A", "Negros", "Indígenas", "N", "PcD"],
                &["B", "*", "", "Sim", ""],
                &["C", "", "Quilombolas", "", ""],
            ],
        );
        let config = Config::default();

        let coverage = group_coverage(&t, &config).unwrap();
        for sets in &coverage {
            assert!(sets[0].is_subset(&sets[1]));
            assert!(sets[1].is_subset(&sets[2]));
        }
        assert_eq!(coverage[1][2].len(), GroupTag::ALL.len());
        assert!(coverage[0][2].contains(&GroupTag::Disabled));

        let adoption = group_adoption(&t, &config).unwrap();
        let black = adoption.iter().find(|a| a.group == GroupTag::Black).unwrap();
        assert_eq!((black.pre_rule, black.post_interim, black.post_resolution), (1, 1, 2));
        let quilombola = adoption
            .iter()
            .find(|a| a.group == GroupTag::Quilombola)
            .unwrap();
        assert_eq!(
            (quilombola.pre_rule, quilombola.post_interim, quilombola.post_resolution),
            (0, 1, 2)
        );
    }

    #[test]
    fn group_adoption_requires_some_description_column() {
        let t = with_columns(&["Programa"], &[&["A"]]);
        assert_eq!(
            group_adoption(&t, &Config::default()),
            Err(Warning::MissingGroupColumns)
        );
    }

    #[test]
    fn modality_charts_group_by_value() {
        let t = table(&[
            ["ATIVO", "Mestrado", "10", "", "", "30", "", "", ""],
            ["ATIVO", "Doutorado", "5", "", "", "x", "", "", ""],
            ["ATIVO", "Doutorado", "7", "", "", "9", "", "", ""],
        ]);
        let config = Config::default();

        let distribution = modality_distribution(&t, &config).unwrap();
        assert_eq!(distribution[0].modality, "Doutorado");
        assert_eq!(distribution[0].programs, 2);

        let supply = supply_demand(&t, &config).unwrap();
        assert_eq!(supply.len(), 2);
        assert_eq!(supply[0].modality, "Doutorado");
        assert_eq!(supply[0].seats_offered, 12.0);
        assert_eq!(supply[0].applicants, 9.0);
    }
}
