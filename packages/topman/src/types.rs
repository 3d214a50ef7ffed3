// ABOUTME: Top-management report and tag types
// ABOUTME: Priorities, weekly reports, tagged journal items, and summary views

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use docuapp_core::WeekRange;
use docuapp_journal::{JournalItem, JournalItemInput, JournalSection, StatusSummary, WeeklyJournal};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPORT_TITLE: &str = "Top Management Weekly Report";

/// How urgently top management should look at a tagged item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High Priority",
            Priority::Medium => "Medium Priority",
            Priority::Low => "Low Priority",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Priority::High => "danger",
            Priority::Medium => "warning",
            Priority::Low => "info",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Priority::High => "exclamation-triangle",
            Priority::Medium => "info-circle",
            Priority::Low => "check-circle",
        }
    }

    /// Sort key; lower sorts first
    pub fn rank(&self) -> i64 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Invalid priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopManagementReport {
    pub id: String,
    pub title: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub created_by: String,
    pub admin_highlights: Vec<JournalItem>,
    pub admin_challenges: Vec<JournalItem>,
    pub admin_strategies: Vec<JournalItem>,
    pub executive_summary: String,
    pub tagged_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or editing a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub title: Option<String>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    #[serde(default)]
    pub admin_highlights: Vec<JournalItemInput>,
    #[serde(default)]
    pub admin_challenges: Vec<JournalItemInput>,
    #[serde(default)]
    pub admin_strategies: Vec<JournalItemInput>,
    #[serde(default)]
    pub executive_summary: String,
}

impl ReportInput {
    pub fn for_week(week: WeekRange) -> Self {
        Self {
            title: None,
            week_start: week.start,
            week_end: week.end,
            admin_highlights: Vec::new(),
            admin_challenges: Vec::new(),
            admin_strategies: Vec::new(),
            executive_summary: String::new(),
        }
    }
}

/// A journal item pinned to a weekly report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopManagementTag {
    pub id: String,
    pub journal_id: String,
    pub report_id: String,
    pub section: JournalSection,
    pub item_index: i64,
    pub item_text: String,
    pub item_status: String,
    pub tagged_by: String,
    pub admin_note: String,
    pub priority: Priority,
    pub tagged_at: DateTime<Utc>,
    pub author_name: String,
    pub department_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagAction {
    Tag,
    Untag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRequest {
    pub journal_id: String,
    pub report_id: String,
    pub section: JournalSection,
    pub item_index: i64,
    pub action: TagAction,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub admin_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOutcome {
    pub action: &'static str,
    /// Only set when tagging; false means an existing tag was updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
}

impl TagOutcome {
    pub fn tagged(created: bool) -> Self {
        Self {
            action: "tagged",
            created: Some(created),
        }
    }

    pub fn untagged() -> Self {
        Self {
            action: "untagged",
            created: None,
        }
    }
}

/// Identifies one item of one journal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedItemKey {
    pub journal_id: String,
    pub section: JournalSection,
    pub item_index: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaggingInterface {
    pub week: WeekRange,
    pub report: TopManagementReport,
    pub created_report: bool,
    pub journal_entries: Vec<WeeklyJournal>,
    pub tagged_items: HashSet<TaggedItemKey>,
}

impl TaggingInterface {
    pub fn is_tagged(&self, journal_id: &str, section: JournalSection, item_index: i64) -> bool {
        self.tagged_items.contains(&TaggedItemKey {
            journal_id: journal_id.to_string(),
            section,
            item_index,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityStats {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl PriorityStats {
    pub fn from_tags(tags: &[TopManagementTag]) -> Self {
        let mut stats = Self::default();
        for tag in tags {
            match tag.priority {
                Priority::High => stats.high += 1,
                Priority::Medium => stats.medium += 1,
                Priority::Low => stats.low += 1,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentTags {
    pub department: String,
    pub items: Vec<TopManagementTag>,
}

/// Group priority-ordered tags by department, keeping first-seen order
pub fn group_tags_by_department(tags: &[TopManagementTag]) -> Vec<DepartmentTags> {
    let mut groups: Vec<DepartmentTags> = Vec::new();
    for tag in tags {
        match groups.iter_mut().find(|g| g.department == tag.department_name) {
            Some(group) => group.items.push(tag.clone()),
            None => groups.push(DepartmentTags {
                department: tag.department_name.clone(),
                items: vec![tag.clone()],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    pub report: TopManagementReport,
    pub tagged_items: Vec<TopManagementTag>,
    pub tagged_items_by_department: Vec<DepartmentTags>,
    pub priority_stats: PriorityStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyStats {
    pub total_entries: usize,
    pub total_departments: usize,
    pub total_team_members: usize,
    pub tagged_items_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub week: WeekRange,
    pub journal_entries: Vec<WeeklyJournal>,
    pub report: Option<TopManagementReport>,
    pub tagged_items: Vec<TopManagementTag>,
    pub stats: WeeklyStats,
    pub status_summary: StatusSummary,
}
