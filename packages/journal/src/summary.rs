// ABOUTME: Consolidated journal summary report
// ABOUTME: Filter resolution, grouping, statistics, and CSV export

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use docuapp_core::{month_start, truncate_with_ellipsis};
use docuapp_storage::StorageError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::JournalStorage;
use crate::types::{AuthorRef, Department, JournalSection, StatusSummary, WeeklyJournal};

pub const CSV_FILENAME: &str = "journal_summary_report.csv";

/// Longest section cell written to the CSV before it is cut
pub const CSV_CELL_LIMIT: usize = 500;

const CSV_HEADER: [&str; 9] = [
    "Date From",
    "Date To",
    "Author",
    "Department",
    "Highlights",
    "Pendings",
    "Challenges",
    "Personal Updates",
    "Strategies",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Date,
    Department,
    Author,
}

impl GroupBy {
    /// Unknown or missing values fall back to grouping by date
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("department") => GroupBy::Department,
            Some("author") => GroupBy::Author,
            _ => GroupBy::Date,
        }
    }
}

/// Raw query parameters of the summary report; dates stay strings so bad input can be ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryFilter {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub department: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub group_by: Option<String>,
}

/// Filters after parsing, ready for the storage query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCriteria {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub department: Option<String>,
    pub author: Option<String>,
    pub search: Option<String>,
    pub group_by: GroupBy,
}

impl SummaryCriteria {
    /// Resolve a filter; with no dates at all the report covers the month of `today`
    pub fn from_filter(filter: &SummaryFilter, today: NaiveDate) -> Self {
        let raw_from = non_empty(filter.date_from.as_deref());
        let raw_to = non_empty(filter.date_to.as_deref());

        let mut date_from = raw_from.and_then(parse_date);
        let date_to = raw_to.and_then(parse_date);
        if raw_from.is_none() && raw_to.is_none() {
            date_from = Some(month_start(today));
        }

        Self {
            date_from,
            date_to,
            department: non_empty(filter.department.as_deref()).map(str::to_string),
            author: non_empty(filter.author.as_deref()).map(str::to_string),
            search: non_empty(filter.search.as_deref()).map(str::to_string),
            group_by: GroupBy::from_param(filter.group_by.as_deref()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Human readable description of the requested range
pub fn date_range_display(filter: &SummaryFilter, today: NaiveDate) -> Option<String> {
    let raw_from = non_empty(filter.date_from.as_deref());
    let raw_to = non_empty(filter.date_to.as_deref());

    match (raw_from, raw_to) {
        (Some(from), Some(to)) => {
            let (from, to) = (parse_date(from)?, parse_date(to)?);
            Some(format!(
                "{} - {}",
                from.format("%b %d, %Y"),
                to.format("%b %d, %Y")
            ))
        }
        (Some(from), None) => parse_date(from).map(|d| format!("From {}", d.format("%b %d, %Y"))),
        (None, Some(to)) => parse_date(to).map(|d| format!("Until {}", d.format("%b %d, %Y"))),
        (None, None) => Some(format!("{} (Current Month)", today.format("%B %Y"))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryGroup {
    pub key: String,
    pub entries: Vec<WeeklyJournal>,
}

/// Group already-ordered entries, keeping groups in first-seen order
pub fn group_entries(entries: Vec<WeeklyJournal>, group_by: GroupBy) -> Vec<SummaryGroup> {
    let mut groups: Vec<SummaryGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let key = match group_by {
            GroupBy::Department => entry.department.name.clone(),
            GroupBy::Author => entry.author.display_name(),
            GroupBy::Date => entry.date_range_key(),
        };

        match positions.get(&key) {
            Some(&index) => groups[index].entries.push(entry),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(SummaryGroup {
                    key,
                    entries: vec![entry],
                });
            }
        }
    }

    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_entries: usize,
    pub departments_count: usize,
    pub authors_count: usize,
    pub date_range: Option<String>,
}

impl SummaryStats {
    pub fn from_entries(entries: &[WeeklyJournal], date_range: Option<String>) -> Self {
        let departments: HashSet<&str> = entries.iter().map(|e| e.department.id.as_str()).collect();
        let authors: HashSet<&str> = entries.iter().map(|e| e.author.id.as_str()).collect();

        Self {
            total_entries: entries.len(),
            departments_count: departments.len(),
            authors_count: authors.len(),
            date_range,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub group_by: GroupBy,
    pub stats: SummaryStats,
    pub status_summary: StatusSummary,
    pub groups: Vec<SummaryGroup>,
    /// Options for the department filter
    pub departments: Vec<Department>,
    /// Options for the author filter
    pub authors: Vec<AuthorRef>,
}

pub async fn build_summary_report(
    storage: &JournalStorage,
    filter: &SummaryFilter,
    today: NaiveDate,
) -> Result<SummaryReport, StorageError> {
    let criteria = SummaryCriteria::from_filter(filter, today);
    let entries = storage.list_summary_entries(&criteria).await?;
    debug!("Summary report matched {} entries", entries.len());

    let stats = SummaryStats::from_entries(&entries, date_range_display(filter, today));
    let status_summary = StatusSummary::from_journals(&entries);

    Ok(SummaryReport {
        group_by: criteria.group_by,
        stats,
        status_summary,
        groups: group_entries(entries, criteria.group_by),
        departments: storage.list_departments().await?,
        authors: storage.list_journal_authors().await?,
    })
}

/// The summary's matching entries rendered as CSV
pub async fn export_summary_csv(
    storage: &JournalStorage,
    filter: &SummaryFilter,
    today: NaiveDate,
) -> Result<String, StorageError> {
    let criteria = SummaryCriteria::from_filter(filter, today);
    let entries = storage.list_summary_entries(&criteria).await?;
    debug!("Exporting {} summary entries as CSV", entries.len());
    write_csv(&entries)
}

pub fn write_csv(entries: &[WeeklyJournal]) -> Result<String, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for entry in entries {
        let mut record = vec![
            entry.date_from.format("%Y-%m-%d").to_string(),
            entry.date_to.format("%Y-%m-%d").to_string(),
            entry.author.display_name(),
            entry.department.name.clone(),
        ];
        for section in JournalSection::ALL {
            let joined = entry
                .section(section)
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join(" | ");
            record.push(truncate_with_ellipsis(&joined, CSV_CELL_LIMIT));
        }
        writer.write_record(&record).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Export(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| StorageError::Export(format!("CSV is not UTF-8: {}", e)))
}

fn csv_error(err: csv::Error) -> StorageError {
    StorageError::Export(format!("Failed to write CSV: {}", err))
}
