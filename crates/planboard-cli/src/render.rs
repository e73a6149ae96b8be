//! Plain-text rendering of listings and dashboards.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use planboard_core::{Plan, ViewTask};
use planboard_planner::{Dashboard, ListingStatus, PlanListing};

const NO_DATE: &str = "-";

fn date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| NO_DATE.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Lay out rows as left-aligned columns separated by two spaces.
fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, header.iter().copied(), &widths);
    for row in rows {
        write_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.zip(widths.iter().copied()).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Plan selection listing.
pub fn plans(listing: &PlanListing) -> String {
    if listing.plans.is_empty() {
        return match listing.status {
            ListingStatus::Unavailable => {
                "Could not reach Planner. Please try again.\n".to_string()
            }
            _ => "No plans found. Create a plan in Planner and try again.\n".to_string(),
        };
    }
    let rows: Vec<Vec<String>> = listing.plans.iter().map(plan_row).collect();
    let mut out = table(&["ID", "TITLE"], &rows);
    if listing.status == ListingStatus::Degraded {
        out.push_str("\nSome plan sources could not be loaded; the list may be incomplete.\n");
    }
    out
}

fn plan_row(plan: &Plan) -> Vec<String> {
    vec![plan.id.to_string(), plan.title.clone()]
}

/// Dashboard summary and task table.
pub fn dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", dashboard.plan_name);
    let _ = writeln!(out, "Completion: {:.1}%", dashboard.completion_rate);
    let _ = writeln!(out, "Tasks: {}", dashboard.tasks.len());
    out.push('\n');

    if dashboard.tasks.is_empty() {
        out.push_str("No tasks in this plan.\n");
    } else {
        let rows: Vec<Vec<String>> = dashboard.tasks.iter().map(task_row).collect();
        out.push_str(&table(
            &[
                "TITLE", "ASSIGNED TO", "START", "DUE", "BUCKET", "PROGRESS", "PRIORITY", "LABELS",
            ],
            &rows,
        ));
    }

    if dashboard.is_degraded() {
        let sources: Vec<&str> = dashboard.degraded.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(
            out,
            "\nSome data could not be loaded ({}); defaults are shown.",
            sources.join(", ")
        );
    }
    out
}

fn task_row(task: &ViewTask) -> Vec<String> {
    vec![
        task.title.clone(),
        task.assignees_display(),
        date(task.start_date_time),
        date(task.due_date_time),
        task.bucket_name.clone(),
        format!("{}%", task.percent_complete),
        task.priority_display().to_string(),
        task.labels_display(),
    ]
}
