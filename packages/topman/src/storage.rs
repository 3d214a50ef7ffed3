// ABOUTME: Top-management storage layer using SQLite
// ABOUTME: Weekly reports, item tagging, and the views built on them

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use docuapp_core::{generate_id, WeekRange};
use docuapp_journal::{
    clean_items, JournalItem, JournalSection, JournalStorage, StatusSummary,
};
use docuapp_storage::StorageError;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::types::{
    group_tags_by_department, PriorityStats, ReportDetail, ReportInput, TagAction, TagOutcome,
    TagRequest, TaggedItemKey, TaggingInterface, TopManagementReport, TopManagementTag,
    WeeklyStats, WeeklySummary, DEFAULT_REPORT_TITLE,
};

const REPORT_SELECT: &str = r#"
    SELECT r.*,
           (SELECT COUNT(*) FROM top_management_tags t WHERE t.report_id = r.id) AS tagged_count
    FROM top_management_reports r"#;

const TAG_SELECT: &str = r#"
    SELECT t.*,
           u.username AS author_username, u.first_name AS author_first_name,
           u.last_name AS author_last_name, d.name AS department_name
    FROM top_management_tags t
    JOIN weekly_journals w ON w.id = t.journal_id
    JOIN users u ON u.id = w.author_id
    JOIN departments d ON d.id = w.department_id"#;

const TAG_ORDER: &str = r#"
    ORDER BY CASE t.priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END,
             d.name, t.tagged_at DESC"#;

const DUPLICATE_REPORT: &str = "A report for this week already exists.";

pub struct TopManStorage {
    pool: SqlitePool,
    journals: JournalStorage,
}

impl TopManStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            journals: JournalStorage::new(pool.clone()),
            pool,
        }
    }

    // Reports

    pub async fn get_report(&self, report_id: &str) -> Result<TopManagementReport, StorageError> {
        debug!("Fetching top management report: {}", report_id);

        let row = sqlx::query(&format!("{} WHERE r.id = ?", REPORT_SELECT))
            .bind(report_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Report"))?;

        row_to_report(&row)
    }

    pub async fn get_report_for_week(
        &self,
        week: &WeekRange,
    ) -> Result<Option<TopManagementReport>, StorageError> {
        let row = sqlx::query(&format!(
            "{} WHERE r.week_start = ? AND r.week_end = ?",
            REPORT_SELECT
        ))
        .bind(week.start)
        .bind(week.end)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_report).transpose()
    }

    /// Reports with their tag counts, newest week first
    pub async fn list_reports_paginated(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<TopManagementReport>, i64), StorageError> {
        debug!("Fetching reports (limit: {:?}, offset: {:?})", limit, offset);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM top_management_reports")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let rows = sqlx::query(&format!(
            "{} ORDER BY r.week_start DESC LIMIT ? OFFSET ?",
            REPORT_SELECT
        ))
        .bind(limit.unwrap_or(-1))
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let reports = rows.iter().map(row_to_report).collect::<Result<Vec<_>, _>>()?;
        Ok((reports, total))
    }

    pub async fn create_report(
        &self,
        created_by: &str,
        input: ReportInput,
    ) -> Result<TopManagementReport, StorageError> {
        let report = CleanReport::from_input(input)?;
        let report_id = generate_id("rpt");
        let now = Utc::now();

        debug!(
            "Creating report: {} ({} to {})",
            report_id, report.week_start, report.week_end
        );

        sqlx::query(
            r#"
            INSERT INTO top_management_reports (id, title, week_start, week_end, created_by,
                                                admin_highlights, admin_challenges, admin_strategies,
                                                executive_summary, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report_id)
        .bind(&report.title)
        .bind(report.week_start)
        .bind(report.week_end)
        .bind(created_by)
        .bind(&report.admin_highlights)
        .bind(&report.admin_challenges)
        .bind(&report.admin_strategies)
        .bind(&report.executive_summary)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::on_write(e, DUPLICATE_REPORT))?;

        self.get_report(&report_id).await
    }

    pub async fn update_report(
        &self,
        report_id: &str,
        input: ReportInput,
    ) -> Result<TopManagementReport, StorageError> {
        self.get_report(report_id).await?;
        let report = CleanReport::from_input(input)?;

        debug!("Updating report: {}", report_id);

        sqlx::query(
            r#"
            UPDATE top_management_reports
            SET title = ?, week_start = ?, week_end = ?, admin_highlights = ?,
                admin_challenges = ?, admin_strategies = ?, executive_summary = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&report.title)
        .bind(report.week_start)
        .bind(report.week_end)
        .bind(&report.admin_highlights)
        .bind(&report.admin_challenges)
        .bind(&report.admin_strategies)
        .bind(&report.executive_summary)
        .bind(Utc::now())
        .bind(report_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::on_write(e, DUPLICATE_REPORT))?;

        self.get_report(report_id).await
    }

    /// Delete a report and its tags; reserved for superusers
    pub async fn delete_report(
        &self,
        report_id: &str,
        is_superuser: bool,
    ) -> Result<TopManagementReport, StorageError> {
        if !is_superuser {
            return Err(StorageError::forbidden(
                "Only superusers can delete top management reports.",
            ));
        }

        let report = self.get_report(report_id).await?;
        debug!("Deleting report: {}", report_id);

        sqlx::query("DELETE FROM top_management_reports WHERE id = ?")
            .bind(report_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(report)
    }

    /// Fetch the report for `week`, creating it with a dated title when missing
    pub async fn get_or_create_report(
        &self,
        week: &WeekRange,
        created_by: &str,
    ) -> Result<(TopManagementReport, bool), StorageError> {
        if let Some(report) = self.get_report_for_week(week).await? {
            return Ok((report, false));
        }

        let mut input = ReportInput::for_week(*week);
        input.title = Some(format!("Top Management Report - {}", week.label()));

        match self.create_report(created_by, input).await {
            Ok(report) => Ok((report, true)),
            // Lost a race with a concurrent request for the same week
            Err(StorageError::Duplicate(_)) => self
                .get_report_for_week(week)
                .await?
                .map(|report| (report, false))
                .ok_or_else(|| StorageError::not_found("Report")),
            Err(e) => Err(e),
        }
    }

    pub async fn report_detail(&self, report_id: &str) -> Result<ReportDetail, StorageError> {
        let report = self.get_report(report_id).await?;
        let tagged_items = self.list_report_tags(report_id).await?;

        Ok(ReportDetail {
            report,
            tagged_items_by_department: group_tags_by_department(&tagged_items),
            priority_stats: PriorityStats::from_tags(&tagged_items),
            tagged_items,
        })
    }

    // Tags

    /// Tags of a report, highest priority first then by department name
    pub async fn list_report_tags(
        &self,
        report_id: &str,
    ) -> Result<Vec<TopManagementTag>, StorageError> {
        debug!("Fetching tags for report: {}", report_id);

        let rows = sqlx::query(&format!("{} WHERE t.report_id = ? {}", TAG_SELECT, TAG_ORDER))
            .bind(report_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_tag).collect()
    }

    pub async fn tagged_keys(&self, report_id: &str) -> Result<HashSet<TaggedItemKey>, StorageError> {
        let rows = sqlx::query(
            "SELECT journal_id, section, item_index FROM top_management_tags WHERE report_id = ?",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| -> Result<TaggedItemKey, StorageError> {
                let section: String = row.try_get("section")?;
                Ok(TaggedItemKey {
                    journal_id: row.try_get("journal_id")?,
                    section: section.parse().map_err(StorageError::Database)?,
                    item_index: row.try_get("item_index")?,
                })
            })
            .collect()
    }

    /// Apply a tag or untag request from the tagging interface
    pub async fn apply_tag_request(
        &self,
        request: TagRequest,
        tagged_by: &str,
    ) -> Result<TagOutcome, StorageError> {
        match request.action {
            TagAction::Tag => {
                let created = self.tag_item(&request, tagged_by).await?;
                Ok(TagOutcome::tagged(created))
            }
            TagAction::Untag => {
                self.untag_item(
                    &request.journal_id,
                    request.section,
                    request.item_index,
                    &request.report_id,
                )
                .await?;
                Ok(TagOutcome::untagged())
            }
        }
    }

    /// Tag one item, or update priority and note when it is already tagged.
    /// Returns whether a new tag was created.
    pub async fn tag_item(&self, request: &TagRequest, tagged_by: &str) -> Result<bool, StorageError> {
        let journal = self.journals.get_journal(&request.journal_id).await?;
        self.get_report(&request.report_id).await?;

        let items = journal.section(request.section);
        let item = usize::try_from(request.item_index)
            .ok()
            .and_then(|index| items.get(index))
            .ok_or_else(|| {
                StorageError::validation(format!(
                    "Item {} does not exist in {}.",
                    request.item_index,
                    request.section.label()
                ))
            })?;

        let tag_id = generate_id("tmt");
        debug!(
            "Tagging {} item {} of journal {} into report {}",
            request.section, request.item_index, request.journal_id, request.report_id
        );

        // A conflicting row keeps its id, so a new id back means a new tag
        let stored_id: String = sqlx::query_scalar(
            r#"
            INSERT INTO top_management_tags (id, journal_id, report_id, section, item_index,
                                             item_text, item_status, tagged_by, admin_note,
                                             priority, tagged_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (journal_id, section, item_index, report_id) DO UPDATE SET
                priority = excluded.priority,
                admin_note = excluded.admin_note
            RETURNING id
            "#,
        )
        .bind(&tag_id)
        .bind(&request.journal_id)
        .bind(&request.report_id)
        .bind(request.section.as_str())
        .bind(request.item_index)
        .bind(&item.text)
        .bind(&item.status)
        .bind(tagged_by)
        .bind(&request.admin_note)
        .bind(request.priority.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let created = stored_id == tag_id;
        if !created {
            debug!("Updated existing tag: {}", stored_id);
        }
        Ok(created)
    }

    /// Remove a tag if present
    pub async fn untag_item(
        &self,
        journal_id: &str,
        section: JournalSection,
        item_index: i64,
        report_id: &str,
    ) -> Result<(), StorageError> {
        debug!(
            "Untagging {} item {} of journal {} from report {}",
            section, item_index, journal_id, report_id
        );

        sqlx::query(
            r#"
            DELETE FROM top_management_tags
            WHERE journal_id = ? AND section = ? AND item_index = ? AND report_id = ?
            "#,
        )
        .bind(journal_id)
        .bind(section.as_str())
        .bind(item_index)
        .bind(report_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    // Views

    /// Everything the tagging screen needs for the selected (or current) week
    pub async fn tagging_interface(
        &self,
        week_start: Option<NaiveDate>,
        week_end: Option<NaiveDate>,
        user_id: &str,
    ) -> Result<TaggingInterface, StorageError> {
        let week = WeekRange::from_selection(week_start, week_end);
        let (report, created_report) = self.get_or_create_report(&week, user_id).await?;
        let journal_entries = self.journals.list_overlapping(&week).await?;
        let tagged_items = self.tagged_keys(&report.id).await?;

        Ok(TaggingInterface {
            week,
            report,
            created_report,
            journal_entries,
            tagged_items,
        })
    }

    /// Read-only weekly overview; never creates a report
    pub async fn weekly_summary(
        &self,
        week_start: Option<NaiveDate>,
        week_end: Option<NaiveDate>,
    ) -> Result<WeeklySummary, StorageError> {
        let week = WeekRange::from_selection(week_start, week_end);
        debug!("Building weekly summary for {}", week.label());

        let journal_entries = self.journals.list_overlapping(&week).await?;
        let report = self.get_report_for_week(&week).await?;
        let tagged_items = match &report {
            Some(report) => self.list_report_tags(&report.id).await?,
            None => Vec::new(),
        };

        let departments: HashSet<&str> = journal_entries
            .iter()
            .map(|e| e.department.id.as_str())
            .collect();
        let members: HashSet<&str> = journal_entries.iter().map(|e| e.author.id.as_str()).collect();

        let stats = WeeklyStats {
            total_entries: journal_entries.len(),
            total_departments: departments.len(),
            total_team_members: members.len(),
            tagged_items_count: tagged_items.len(),
        };
        let status_summary = StatusSummary::from_journals(&journal_entries);

        Ok(WeeklySummary {
            week,
            journal_entries,
            report,
            tagged_items,
            stats,
            status_summary,
        })
    }
}

/// Report fields validated and serialised for storage
struct CleanReport {
    title: String,
    week_start: NaiveDate,
    week_end: NaiveDate,
    admin_highlights: String,
    admin_challenges: String,
    admin_strategies: String,
    executive_summary: String,
}

impl CleanReport {
    fn from_input(input: ReportInput) -> Result<Self, StorageError> {
        if input.week_start > input.week_end {
            return Err(StorageError::validation(
                "Start date must be before or equal to end date.",
            ));
        }

        let title = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_REPORT_TITLE.to_string());

        Ok(Self {
            title,
            week_start: input.week_start,
            week_end: input.week_end,
            admin_highlights: serde_json::to_string(&clean_items(
                &input.admin_highlights,
                JournalSection::Highlights,
            ))?,
            admin_challenges: serde_json::to_string(&clean_items(
                &input.admin_challenges,
                JournalSection::Challenges,
            ))?,
            admin_strategies: serde_json::to_string(&clean_items(
                &input.admin_strategies,
                JournalSection::Strategies,
            ))?,
            executive_summary: input.executive_summary.trim().to_string(),
        })
    }
}

/// Admin lists only keep object items with non-empty text
fn admin_items(raw: &str) -> Vec<JournalItem> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let map = item.as_object()?;
                let text = map.get("text")?.as_str()?;
                if text.trim().is_empty() {
                    return None;
                }
                let status = map
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or("not_started");
                Some(JournalItem {
                    text: text.to_string(),
                    status: status.to_string(),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn row_to_report(row: &SqliteRow) -> Result<TopManagementReport, StorageError> {
    let highlights: String = row.try_get("admin_highlights")?;
    let challenges: String = row.try_get("admin_challenges")?;
    let strategies: String = row.try_get("admin_strategies")?;

    Ok(TopManagementReport {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        week_start: row.try_get("week_start")?,
        week_end: row.try_get("week_end")?,
        created_by: row.try_get("created_by")?,
        admin_highlights: admin_items(&highlights),
        admin_challenges: admin_items(&challenges),
        admin_strategies: admin_items(&strategies),
        executive_summary: row.try_get("executive_summary")?,
        tagged_count: row.try_get("tagged_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_tag(row: &SqliteRow) -> Result<TopManagementTag, StorageError> {
    let section: String = row.try_get("section")?;
    let priority: String = row.try_get("priority")?;

    let first_name: String = row.try_get("author_first_name")?;
    let last_name: String = row.try_get("author_last_name")?;
    let full_name = format!("{} {}", first_name, last_name).trim().to_string();
    let author_name = if full_name.is_empty() {
        row.try_get("author_username")?
    } else {
        full_name
    };

    Ok(TopManagementTag {
        id: row.try_get("id")?,
        journal_id: row.try_get("journal_id")?,
        report_id: row.try_get("report_id")?,
        section: section.parse().map_err(StorageError::Database)?,
        item_index: row.try_get("item_index")?,
        item_text: row.try_get("item_text")?,
        item_status: row.try_get("item_status")?,
        tagged_by: row.try_get("tagged_by")?,
        admin_note: row.try_get("admin_note")?,
        priority: priority.parse().unwrap_or_default(),
        tagged_at: row.try_get("tagged_at")?,
        author_name,
        department_name: row.try_get("department_name")?,
    })
}
