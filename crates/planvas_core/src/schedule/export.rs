//! Flat tabular export of a computed schedule.
//!
//! # Invariants
//! - Dates are rendered as ISO `YYYY-MM-DD`.
//! - Fields containing `,`, `"` or a newline are quoted with doubled quotes.

use super::ScheduleRow;
use crate::model::project::Project;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CSV_HEADERS: [&str; 6] = [
    "Task Name",
    "Start Date",
    "End Date",
    "Duration (days)",
    "Status",
    "Dependencies",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const FILE_NAME_SUFFIX: &str = "_gantt_export.csv";

static NON_ALPHANUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[^a-zA-Z0-9]").expect("valid file name regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// Nothing to export: the project has no tasks.
    EmptySchedule,
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySchedule => write!(f, "no task data available to export"),
        }
    }
}

impl Error for ExportError {}

/// Renders schedule rows as CSV text (header line plus one line per row).
///
/// Durations come from the project task; dependency ids are rendered as
/// predecessor names joined by `"; "`, skipping ids that no longer resolve.
pub fn schedule_to_csv(project: &Project, rows: &[ScheduleRow]) -> Result<String, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::EmptySchedule);
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADERS.join(","));
    for row in rows {
        let duration = project
            .task(row.task_id)
            .map_or_else(|| "N/A".to_string(), |task| task.duration_days.to_string());
        let status = if row.percent_complete == 100 {
            "Done"
        } else {
            "Pending/Blocked"
        };
        let dependency_names = row
            .predecessor_id_list()
            .into_iter()
            .filter_map(|id| project.task(id).map(|task| task.name.as_str()))
            .collect::<Vec<_>>()
            .join("; ");

        let fields = [
            row.name.clone(),
            row.start_date().format(DATE_FORMAT).to_string(),
            row.end_date().format(DATE_FORMAT).to_string(),
            duration,
            status.to_string(),
            dependency_names,
        ];
        lines.push(
            fields
                .iter()
                .map(|field| escape_csv_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    Ok(lines.join("\n"))
}

/// Quotes a field when it contains a delimiter, quote or newline.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Download file name for a project export, e.g. `my_plan_gantt_export.csv`.
pub fn export_file_name(project_name: &str) -> String {
    let safe = NON_ALPHANUMERIC_RE.replace_all(project_name, "_");
    format!("{}{FILE_NAME_SUFFIX}", safe.to_lowercase())
}
