// ABOUTME: Journal type definitions
// ABOUTME: Item statuses, sections, journal entries, departments, comments, and dashboards

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use docuapp_core::{title_case, WeekRange};
use serde::{Deserialize, Serialize};

/// Progress status attached to every journal item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl ItemStatus {
    /// Display order used by status pickers and summaries
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::Completed,
        ItemStatus::InProgress,
        ItemStatus::OnHold,
        ItemStatus::NotStarted,
        ItemStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "not_started",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Completed => "completed",
            ItemStatus::OnHold => "on_hold",
            ItemStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "Not Started",
            ItemStatus::InProgress => "In Progress",
            ItemStatus::Completed => "Completed",
            ItemStatus::OnHold => "On Hold",
            ItemStatus::Cancelled => "Cancelled",
        }
    }

    /// Bootstrap colour class
    pub fn color(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "secondary",
            ItemStatus::InProgress => "primary",
            ItemStatus::Completed => "success",
            ItemStatus::OnHold => "warning",
            ItemStatus::Cancelled => "danger",
        }
    }

    /// Font Awesome icon name
    pub fn icon(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "circle",
            ItemStatus::InProgress => "clock",
            ItemStatus::Completed => "check-circle",
            ItemStatus::OnHold => "pause-circle",
            ItemStatus::Cancelled => "times-circle",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ItemStatus::NotStarted),
            "in_progress" => Ok(ItemStatus::InProgress),
            "completed" => Ok(ItemStatus::Completed),
            "on_hold" => Ok(ItemStatus::OnHold),
            "cancelled" => Ok(ItemStatus::Cancelled),
            other => Err(format!("Invalid status: {}", other)),
        }
    }
}

/// Label for a stored status string; unknown values are title-cased
pub fn status_label(status: &str) -> String {
    match status.parse::<ItemStatus>() {
        Ok(known) => known.label().to_string(),
        Err(_) => title_case(status),
    }
}

pub fn status_color(status: &str) -> &'static str {
    status
        .parse::<ItemStatus>()
        .map(|s| s.color())
        .unwrap_or("secondary")
}

pub fn status_icon(status: &str) -> &'static str {
    status
        .parse::<ItemStatus>()
        .map(|s| s.icon())
        .unwrap_or("circle")
}

/// The five list-valued sections of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalSection {
    Highlights,
    Pendings,
    Challenges,
    PersonalUpdates,
    Strategies,
}

impl JournalSection {
    pub const ALL: [JournalSection; 5] = [
        JournalSection::Highlights,
        JournalSection::Pendings,
        JournalSection::Challenges,
        JournalSection::PersonalUpdates,
        JournalSection::Strategies,
    ];

    /// Column name and wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalSection::Highlights => "highlights",
            JournalSection::Pendings => "pendings",
            JournalSection::Challenges => "challenges",
            JournalSection::PersonalUpdates => "personal_updates",
            JournalSection::Strategies => "strategies",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JournalSection::Highlights => "Highlights",
            JournalSection::Pendings => "Pendings",
            JournalSection::Challenges => "Challenges",
            JournalSection::PersonalUpdates => "Personal Updates",
            JournalSection::Strategies => "Strategies",
        }
    }

    /// Status given to items that arrive without one
    pub fn default_status(&self) -> ItemStatus {
        match self {
            JournalSection::Highlights => ItemStatus::Completed,
            JournalSection::Pendings => ItemStatus::InProgress,
            JournalSection::Challenges => ItemStatus::OnHold,
            JournalSection::PersonalUpdates => ItemStatus::Completed,
            JournalSection::Strategies => ItemStatus::NotStarted,
        }
    }
}

impl fmt::Display for JournalSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JournalSection::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| format!("Invalid section: {}", s))
    }
}

/// One item of a journal section. `status` is kept as stored so legacy values survive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalItem {
    pub text: String,
    pub status: String,
}

impl JournalItem {
    pub fn new(text: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            text: text.into(),
            status: status.as_str().to_string(),
        }
    }

    pub fn known_status(&self) -> Option<ItemStatus> {
        self.status.parse().ok()
    }
}

/// Item as submitted by a client; a missing status takes the section default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalItemInput {
    pub text: String,
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

impl JournalItemInput {
    pub fn new(text: impl Into<String>, status: Option<ItemStatus>) -> Self {
        Self {
            text: text.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentCreateInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Author fields carried alongside journals and comments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl AuthorRef {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub id: String,
    pub name: String,
}

/// A weekly journal entry with normalised sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyJournal {
    pub id: String,
    pub author: AuthorRef,
    pub department: DepartmentRef,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub highlights: Vec<JournalItem>,
    pub pendings: Vec<JournalItem>,
    pub challenges: Vec<JournalItem>,
    pub personal_updates: Vec<JournalItem>,
    pub strategies: Vec<JournalItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklyJournal {
    pub fn section(&self, section: JournalSection) -> &[JournalItem] {
        match section {
            JournalSection::Highlights => &self.highlights,
            JournalSection::Pendings => &self.pendings,
            JournalSection::Challenges => &self.challenges,
            JournalSection::PersonalUpdates => &self.personal_updates,
            JournalSection::Strategies => &self.strategies,
        }
    }

    /// Every item across the five sections, in section order
    pub fn all_items(&self) -> impl Iterator<Item = &JournalItem> {
        JournalSection::ALL
            .into_iter()
            .flat_map(move |section| self.section(section).iter())
    }

    pub fn status_summary(&self) -> StatusSummary {
        StatusSummary::from_journals(std::iter::once(self))
    }

    /// e.g. `January 06 - January 12, 2025`
    pub fn date_range_key(&self) -> String {
        format!(
            "{} - {}",
            self.date_from.format("%B %d"),
            self.date_to.format("%B %d, %Y")
        )
    }
}

/// Body for creating or replacing a journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalInput {
    pub department_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub highlights: Vec<JournalItemInput>,
    #[serde(default)]
    pub pendings: Vec<JournalItemInput>,
    #[serde(default)]
    pub challenges: Vec<JournalItemInput>,
    #[serde(default)]
    pub personal_updates: Vec<JournalItemInput>,
    #[serde(default)]
    pub strategies: Vec<JournalItemInput>,
}

impl JournalInput {
    pub fn section(&self, section: JournalSection) -> &[JournalItemInput] {
        match section {
            JournalSection::Highlights => &self.highlights,
            JournalSection::Pendings => &self.pendings,
            JournalSection::Challenges => &self.challenges,
            JournalSection::PersonalUpdates => &self.personal_updates,
            JournalSection::Strategies => &self.strategies,
        }
    }
}

/// Filters for the journal listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalFilter {
    pub department: Option<String>,
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalComment {
    pub id: String,
    pub journal_id: String,
    pub author: AuthorRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreateInput {
    pub content: String,
}

/// Item counts per status; unknown statuses only add to `total_items`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub completed: i64,
    pub in_progress: i64,
    pub on_hold: i64,
    pub not_started: i64,
    pub cancelled: i64,
    pub total_items: i64,
}

impl StatusSummary {
    pub fn add(&mut self, status: &str) {
        match status.parse::<ItemStatus>() {
            Ok(ItemStatus::Completed) => self.completed += 1,
            Ok(ItemStatus::InProgress) => self.in_progress += 1,
            Ok(ItemStatus::OnHold) => self.on_hold += 1,
            Ok(ItemStatus::NotStarted) => self.not_started += 1,
            Ok(ItemStatus::Cancelled) => self.cancelled += 1,
            Err(_) => {}
        }
        self.total_items += 1;
    }

    pub fn from_journals<'a>(journals: impl IntoIterator<Item = &'a WeeklyJournal>) -> Self {
        let mut summary = Self::default();
        for journal in journals {
            for item in journal.all_items() {
                summary.add(&item.status);
            }
        }
        summary
    }

    pub fn count(&self, status: ItemStatus) -> i64 {
        match status {
            ItemStatus::Completed => self.completed,
            ItemStatus::InProgress => self.in_progress,
            ItemStatus::OnHold => self.on_hold,
            ItemStatus::NotStarted => self.not_started,
            ItemStatus::Cancelled => self.cancelled,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalDashboard {
    pub user_journals: Vec<WeeklyJournal>,
    pub recent_journals: Vec<WeeklyJournal>,
    pub suggested_week: WeekRange,
    pub total_journals: i64,
    pub user_journal_count: i64,
    pub departments: Vec<Department>,
    pub status_summary: StatusSummary,
    pub user_status_summary: StatusSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_presentation() {
        assert_eq!(ItemStatus::OnHold.label(), "On Hold");
        assert_eq!(ItemStatus::Completed.color(), "success");
        assert_eq!(ItemStatus::Cancelled.icon(), "times-circle");

        assert_eq!(status_label("in_progress"), "In Progress");
        assert_eq!(status_label("blocked_by_vendor"), "Blocked By Vendor");
        assert_eq!(status_color("blocked"), "secondary");
        assert_eq!(status_icon("blocked"), "circle");
    }

    #[test]
    fn test_section_defaults() {
        assert_eq!(JournalSection::Highlights.default_status(), ItemStatus::Completed);
        assert_eq!(JournalSection::Pendings.default_status(), ItemStatus::InProgress);
        assert_eq!(JournalSection::Challenges.default_status(), ItemStatus::OnHold);
        assert_eq!(JournalSection::PersonalUpdates.default_status(), ItemStatus::Completed);
        assert_eq!(JournalSection::Strategies.default_status(), ItemStatus::NotStarted);
    }

    #[test]
    fn test_section_round_trips_through_str() {
        for section in JournalSection::ALL {
            assert_eq!(section.as_str().parse::<JournalSection>(), Ok(section));
        }
        assert!("notes".parse::<JournalSection>().is_err());
    }

    #[test]
    fn test_status_summary_counts_unknown_in_total_only() {
        let mut summary = StatusSummary::default();
        summary.add("completed");
        summary.add("completed");
        summary.add("cancelled");
        summary.add("blocked");

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.total_items, 4);
        let known: i64 = ItemStatus::ALL.iter().map(|s| summary.count(*s)).sum();
        assert_eq!(known, 3);
    }

    #[test]
    fn test_author_display_name() {
        let author = AuthorRef {
            id: "usr-1".to_string(),
            username: "mjones".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        };
        assert_eq!(author.display_name(), "mjones");

        let named = AuthorRef {
            first_name: "Mary".to_string(),
            last_name: "Jones".to_string(),
            ..author
        };
        assert_eq!(named.display_name(), "Mary Jones");
    }
}
