use std::fmt::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::models::{AdoptionTimeline, GroupAdoption, Warning};
use crate::session::Session;
use crate::views::{AffirmativePage, ChartsPage, MetricsPage, Selection, TablePage};

fn selection_label(selection: &Selection, all: &str) -> String {
    if selection.selected.is_empty() {
        all.to_string()
    } else {
        selection.selected.join(", ")
    }
}

fn write_warnings(output: &mut String, warnings: &[Warning]) {
    for warning in warnings {
        let _ = writeln!(output, "warning: {warning}");
    }
}

fn write_timeline(output: &mut String, timeline: &AdoptionTimeline) {
    for phase in &timeline.phases {
        let _ = writeln!(
            output,
            "- {}: {} of {} programs ({:.1}%)",
            phase.phase.label(),
            phase.programs,
            timeline.total,
            phase.percent
        );
    }
}

fn write_groups(output: &mut String, groups: &[GroupAdoption]) {
    for group in groups {
        let _ = writeln!(
            output,
            "- {}: {} -> {} -> {}",
            group.group.label(),
            group.pre_rule,
            group.post_interim,
            group.post_resolution
        );
    }
}

pub fn render_load_summary(session: &Session) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Loaded {}.", session.source().display());
    let _ = writeln!(
        output,
        "{} records in total, {} active programs used in the analysis.",
        session.total_records(),
        session.active().len()
    );
    write_warnings(&mut output, session.warnings());
    output
}

pub fn render_export_summary(page: &TablePage, out: &Path) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Exported {} records to {}.",
        page.table.len(),
        out.display()
    );
    let _ = writeln!(
        output,
        "Modalities: {}",
        selection_label(&page.modalities, "all modalities")
    );
    let _ = writeln!(
        output,
        "Statuses: {}",
        selection_label(&page.statuses, "all statuses")
    );
    write_warnings(&mut output, &page.warnings);
    output
}

pub fn render_metrics(page: &MetricsPage) -> String {
    let mut output = String::new();
    let overview = &page.overview;

    let _ = writeln!(
        output,
        "General indicators ({})",
        selection_label(&page.modalities, "all modalities")
    );
    let _ = writeln!(output, "Active programs: {}", overview.program_count);
    let _ = writeln!(output, "With applicant data: {}", overview.with_applicants);
    let _ = writeln!(output, "Occupancy rate: {:.1}%", overview.occupancy_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "Success rate, general vs AA");
    match &page.success {
        Some(success) => {
            let _ = writeln!(output, "Programs in cohort: {}", success.cohort_size);
            let _ = writeln!(output, "Applicants: {:.0}", success.applicants);
            let _ = writeln!(output, "Approved: {:.0}", success.filled);
            let _ = writeln!(output, "General success rate: {:.2}%", success.general_rate);
            let _ = writeln!(
                output,
                "AA success rate: {:.2}% ({:+.2} p.p. vs general)",
                success.aa_rate, success.delta_pp
            );
        }
        None => {
            let _ = writeln!(output, "Not enough AA applicant data.");
        }
    }

    write_warnings(&mut output, &page.warnings);
    output
}

pub fn render_affirmative(page: &AffirmativePage) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Affirmative action indicators ({})",
        selection_label(&page.modalities, "all modalities")
    );
    let _ = writeln!(output, "AA seats offered: {:.0}", page.offer.aa_seats_offered);
    let _ = writeln!(output, "AA share of seats: {:.1}%", page.offer.aa_share);

    let _ = writeln!(output);
    let _ = writeln!(output, "AA demand and approval");
    match &page.demand {
        Some(demand) => {
            let _ = writeln!(
                output,
                "Programs disclosing AA applicants: {} ({:.1}%)",
                demand.disclosed, demand.disclosure_rate
            );
            let _ = writeln!(
                output,
                "AA applicants: {:.0} ({:.1}% of applicants)",
                demand.aa_applicants, demand.aa_applicant_share
            );
            let _ = writeln!(
                output,
                "Approved through quota: {:.0} ({:.1}%)",
                demand.aa_quota_filled, demand.quota_share
            );
            let _ = writeln!(
                output,
                "Approved through open competition: {:.0} ({:.1}%)",
                demand.aa_open_filled, demand.open_share
            );
            let _ = writeln!(
                output,
                "Total AA approved: {:.0} ({:.1}% of approvals)",
                demand.aa_filled, demand.aa_approval_share
            );
        }
        None => {
            let _ = writeln!(output, "No program reports AA applicants.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Historical adoption");
    if let Some(timeline) = &page.timeline {
        write_timeline(&mut output, timeline);
    }

    write_warnings(&mut output, &page.warnings);
    output
}

pub fn render_charts(page: &ChartsPage) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(page)?)
}

/// Markdown report combining every page for one modality selection.
pub fn build_report(
    session: &Session,
    metrics: &MetricsPage,
    affirmative: &AffirmativePage,
    charts: &ChartsPage,
    generated_at: NaiveDateTime,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Affirmative Action in Graduate Programs");
    let _ = writeln!(
        output,
        "Generated {} from {} ({} active of {} records, {})",
        generated_at.format("%Y-%m-%d %H:%M"),
        session.source().display(),
        session.active().len(),
        session.total_records(),
        selection_label(&metrics.modalities, "all modalities")
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## General Indicators");
    let overview = &metrics.overview;
    let _ = writeln!(output, "- Active programs: {}", overview.program_count);
    let _ = writeln!(output, "- With applicant data: {}", overview.with_applicants);
    let _ = writeln!(output, "- Occupancy rate: {:.1}%", overview.occupancy_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Success Rate");
    match &metrics.success {
        Some(success) => {
            let _ = writeln!(
                output,
                "- General: {:.2}% ({:.0} approved of {:.0} applicants)",
                success.general_rate, success.filled, success.applicants
            );
            let _ = writeln!(
                output,
                "- AA: {:.2}% ({:.0} approved of {:.0} AA applicants)",
                success.aa_rate, success.aa_filled, success.aa_applicants
            );
            let _ = writeln!(output, "- Difference: {:+.2} p.p.", success.delta_pp);
        }
        None => {
            let _ = writeln!(output, "Not enough AA applicant data.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reserved Seats");
    let _ = writeln!(
        output,
        "- {:.0} AA seats, {:.1}% of {:.0} offered",
        affirmative.offer.aa_seats_offered, affirmative.offer.aa_share, affirmative.offer.seats_offered
    );
    if let Some(demand) = &affirmative.demand {
        let _ = writeln!(
            output,
            "- {} programs ({:.1}%) disclosed AA applicants",
            demand.disclosed, demand.disclosure_rate
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Historical Adoption");
    match &affirmative.timeline {
        Some(timeline) => write_timeline(&mut output, timeline),
        None => {
            let _ = writeln!(output, "No adoption columns found.");
        }
    }

    if let Some(groups) = &charts.groups {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Adoption by Group");
        write_groups(&mut output, groups);
    }

    if let Some(distribution) = &charts.distribution {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Programs by Modality");
        for entry in distribution {
            let _ = writeln!(output, "- {}: {}", entry.modality, entry.programs);
        }
    }

    let mut warnings = metrics.warnings.clone();
    for warning in affirmative.warnings.iter().chain(&charts.warnings) {
        if !warnings.contains(warning) {
            warnings.push(warning.clone());
        }
    }
    if !warnings.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Data Warnings");
        for warning in &warnings {
            let _ = writeln!(output, "- {warning}");
        }
    }

    output
}
