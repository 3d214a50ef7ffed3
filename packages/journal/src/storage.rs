// ABOUTME: Journal storage layer using SQLite
// ABOUTME: Departments, weekly journal entries, comments, and dashboard queries

use chrono::Utc;
use docuapp_core::{generate_id, WeekRange};
use docuapp_storage::{like_pattern, StorageError};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::normalize::{clean_items, normalize_stored};
use crate::summary::{GroupBy, SummaryCriteria};
use crate::types::{
    AuthorRef, CommentCreateInput, Department, DepartmentCreateInput, DepartmentRef,
    JournalComment, JournalDashboard, JournalFilter, JournalInput, JournalItem, JournalSection,
    StatusSummary, WeeklyJournal,
};

const JOURNAL_SELECT: &str = r#"
    SELECT w.id, w.author_id, w.department_id, w.date_from, w.date_to,
           w.highlights, w.pendings, w.challenges, w.personal_updates, w.strategies,
           w.created_at, w.updated_at,
           u.username AS author_username, u.first_name AS author_first_name,
           u.last_name AS author_last_name, d.name AS department_name
    FROM weekly_journals w
    JOIN users u ON u.id = w.author_id
    JOIN departments d ON d.id = w.department_id
    WHERE 1 = 1"#;

const DUPLICATE_JOURNAL: &str = "You already have a journal entry for this date range.";

/// Validated, cleaned journal sections ready to be written
struct CleanSections {
    highlights: String,
    pendings: String,
    challenges: String,
    personal_updates: String,
    strategies: String,
}

pub struct JournalStorage {
    pool: SqlitePool,
}

impl JournalStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Departments

    pub async fn list_departments(&self) -> Result<Vec<Department>, StorageError> {
        debug!("Fetching departments");

        let rows = sqlx::query("SELECT * FROM departments ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_department).collect()
    }

    pub async fn get_department(&self, department_id: &str) -> Result<Department, StorageError> {
        debug!("Fetching department: {}", department_id);

        let row = sqlx::query("SELECT * FROM departments WHERE id = ?")
            .bind(department_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Department"))?;

        row_to_department(&row)
    }

    pub async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>, StorageError> {
        let row = sqlx::query("SELECT * FROM departments WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_department).transpose()
    }

    pub async fn create_department(
        &self,
        input: DepartmentCreateInput,
    ) -> Result<Department, StorageError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(StorageError::validation("Department name is required."));
        }

        let department_id = generate_id("dept");
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        debug!("Creating department: {} (name: {})", department_id, name);

        sqlx::query(
            "INSERT INTO departments (id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&department_id)
        .bind(&name)
        .bind(&description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::on_write(e, "A department with that name already exists."))?;

        self.get_department(&department_id).await
    }

    // Journal entries

    pub async fn get_journal(&self, journal_id: &str) -> Result<WeeklyJournal, StorageError> {
        debug!("Fetching journal: {}", journal_id);

        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        query.push(" AND w.id = ").push_bind(journal_id.to_string());

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Journal entry"))?;

        row_to_journal(&row)
    }

    /// File a new entry authored by `author_id`
    pub async fn create_journal(
        &self,
        author_id: &str,
        input: JournalInput,
    ) -> Result<WeeklyJournal, StorageError> {
        let sections = self.validate_input(&input).await?;
        let journal_id = generate_id("jrn");
        let now = Utc::now();

        debug!(
            "Creating journal: {} (author: {}, {} to {})",
            journal_id, author_id, input.date_from, input.date_to
        );

        sqlx::query(
            r#"
            INSERT INTO weekly_journals (id, author_id, department_id, date_from, date_to,
                                         highlights, pendings, challenges, personal_updates,
                                         strategies, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&journal_id)
        .bind(author_id)
        .bind(&input.department_id)
        .bind(input.date_from)
        .bind(input.date_to)
        .bind(&sections.highlights)
        .bind(&sections.pendings)
        .bind(&sections.challenges)
        .bind(&sections.personal_updates)
        .bind(&sections.strategies)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::on_write(e, DUPLICATE_JOURNAL))?;

        self.get_journal(&journal_id).await
    }

    /// Replace an entry's content; only its author may do so
    pub async fn update_journal(
        &self,
        journal_id: &str,
        user_id: &str,
        input: JournalInput,
    ) -> Result<WeeklyJournal, StorageError> {
        let existing = self.get_journal(journal_id).await?;
        if existing.author.id != user_id {
            return Err(StorageError::forbidden(
                "You can only edit your own journal entries.",
            ));
        }

        let sections = self.validate_input(&input).await?;
        debug!("Updating journal: {}", journal_id);

        sqlx::query(
            r#"
            UPDATE weekly_journals
            SET department_id = ?, date_from = ?, date_to = ?,
                highlights = ?, pendings = ?, challenges = ?, personal_updates = ?, strategies = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.department_id)
        .bind(input.date_from)
        .bind(input.date_to)
        .bind(&sections.highlights)
        .bind(&sections.pendings)
        .bind(&sections.challenges)
        .bind(&sections.personal_updates)
        .bind(&sections.strategies)
        .bind(Utc::now())
        .bind(journal_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::on_write(e, DUPLICATE_JOURNAL))?;

        self.get_journal(journal_id).await
    }

    /// List entries matching `filter`, newest week first
    pub async fn list_journals_paginated(
        &self,
        filter: &JournalFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<WeeklyJournal>, i64), StorageError> {
        debug!(
            "Fetching journals (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        let mut count_query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT COUNT(*) FROM weekly_journals w
            JOIN users u ON u.id = w.author_id
            JOIN departments d ON d.id = w.department_id
            WHERE 1 = 1"#,
        );
        push_journal_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        push_journal_filters(&mut query, filter);
        query.push(" ORDER BY w.date_from DESC, w.created_at DESC");
        push_page(&mut query, limit, offset);

        let journals = self.fetch_journals(query).await?;
        Ok((journals, total))
    }

    /// A user's own entries, newest week first
    pub async fn list_user_journals(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<WeeklyJournal>, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        query.push(" AND w.author_id = ").push_bind(user_id.to_string());
        query.push(" ORDER BY w.date_from DESC, w.created_at DESC");
        push_page(&mut query, limit, None);
        self.fetch_journals(query).await
    }

    /// Most recently filed entries regardless of week
    pub async fn list_recent_journals(&self, limit: i64) -> Result<Vec<WeeklyJournal>, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        query.push(" ORDER BY w.created_at DESC");
        push_page(&mut query, Some(limit), None);
        self.fetch_journals(query).await
    }

    pub async fn list_all_journals(&self) -> Result<Vec<WeeklyJournal>, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        query.push(" ORDER BY w.date_from DESC, w.created_at DESC");
        self.fetch_journals(query).await
    }

    /// Entries overlapping `week`, ordered by department then author surname
    pub async fn list_overlapping(&self, week: &WeekRange) -> Result<Vec<WeeklyJournal>, StorageError> {
        debug!("Fetching journals overlapping {} to {}", week.start, week.end);

        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        query.push(" AND w.date_from <= ").push_bind(week.end);
        query.push(" AND w.date_to >= ").push_bind(week.start);
        query.push(" ORDER BY d.name, u.last_name, w.created_at");
        self.fetch_journals(query).await
    }

    /// Entries for the consolidated summary report, ordered for the chosen grouping
    pub async fn list_summary_entries(
        &self,
        criteria: &SummaryCriteria,
    ) -> Result<Vec<WeeklyJournal>, StorageError> {
        debug!("Fetching summary entries: {:?}", criteria);

        let mut query = QueryBuilder::<Sqlite>::new(JOURNAL_SELECT);
        if let Some(date_from) = criteria.date_from {
            query.push(" AND w.date_from >= ").push_bind(date_from);
        }
        if let Some(date_to) = criteria.date_to {
            query.push(" AND w.date_to <= ").push_bind(date_to);
        }
        if let Some(department) = &criteria.department {
            query.push(" AND w.department_id = ").push_bind(department.clone());
        }
        if let Some(author) = &criteria.author {
            query.push(" AND w.author_id = ").push_bind(author.clone());
        }
        if let Some(search) = &criteria.search {
            push_like_any(
                &mut query,
                &[
                    "w.highlights",
                    "w.pendings",
                    "w.challenges",
                    "w.personal_updates",
                    "w.strategies",
                ],
                search,
            );
        }

        query.push(match criteria.group_by {
            GroupBy::Date => " ORDER BY w.date_from DESC, d.name, u.last_name",
            GroupBy::Department => " ORDER BY d.name, w.date_from DESC, u.last_name",
            GroupBy::Author => " ORDER BY u.last_name, u.first_name, w.date_from DESC",
        });

        self.fetch_journals(query).await
    }

    /// Everyone who has filed at least one entry, by surname
    pub async fn list_journal_authors(&self) -> Result<Vec<AuthorRef>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT u.id, u.username, u.first_name, u.last_name
            FROM users u
            JOIN weekly_journals w ON w.author_id = u.id
            ORDER BY u.last_name, u.first_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| -> Result<AuthorRef, StorageError> {
                Ok(AuthorRef {
                    id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    first_name: row.try_get("first_name")?,
                    last_name: row.try_get("last_name")?,
                })
            })
            .collect()
    }

    pub async fn count_journals(&self, author_id: Option<&str>) -> Result<i64, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM weekly_journals");
        if let Some(author_id) = author_id {
            query.push(" WHERE author_id = ").push_bind(author_id.to_string());
        }

        query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    // Comments

    pub async fn add_comment(
        &self,
        journal_id: &str,
        author_id: &str,
        input: CommentCreateInput,
    ) -> Result<JournalComment, StorageError> {
        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(StorageError::validation("Comment cannot be empty."));
        }

        // Existence check so an unknown journal is a 404 rather than an FK failure
        self.get_journal(journal_id).await?;

        let comment_id = generate_id("cmt");
        debug!("Adding comment {} to journal {}", comment_id, journal_id);

        sqlx::query(
            "INSERT INTO journal_comments (id, journal_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&comment_id)
        .bind(journal_id)
        .bind(author_id)
        .bind(&content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let row = sqlx::query(
            r#"
            SELECT c.*, u.username AS author_username, u.first_name AS author_first_name,
                   u.last_name AS author_last_name
            FROM journal_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = ?
            "#,
        )
        .bind(&comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        row_to_comment(&row)
    }

    /// Comments on a journal, newest first
    pub async fn list_comments(&self, journal_id: &str) -> Result<Vec<JournalComment>, StorageError> {
        debug!("Fetching comments for journal: {}", journal_id);

        let rows = sqlx::query(
            r#"
            SELECT c.*, u.username AS author_username, u.first_name AS author_first_name,
                   u.last_name AS author_last_name
            FROM journal_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.journal_id = ?
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(journal_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_comment).collect()
    }

    // Dashboard

    pub async fn dashboard(&self, user_id: &str) -> Result<JournalDashboard, StorageError> {
        debug!("Building journal dashboard for user: {}", user_id);

        let user_journals = self.list_user_journals(user_id, Some(5)).await?;
        let recent_journals = self.list_recent_journals(10).await?;

        let all_journals = self.list_all_journals().await?;
        let status_summary = StatusSummary::from_journals(&all_journals);
        let user_status_summary = StatusSummary::from_journals(
            all_journals.iter().filter(|journal| journal.author.id == user_id),
        );

        Ok(JournalDashboard {
            user_journals,
            recent_journals,
            suggested_week: WeekRange::current(),
            total_journals: self.count_journals(None).await?,
            user_journal_count: self.count_journals(Some(user_id)).await?,
            departments: self.list_departments().await?,
            status_summary,
            user_status_summary,
        })
    }

    async fn validate_input(&self, input: &JournalInput) -> Result<CleanSections, StorageError> {
        if input.date_from > input.date_to {
            return Err(StorageError::validation(
                "Start date must be before or equal to end date.",
            ));
        }

        let highlights = clean_items(&input.highlights, JournalSection::Highlights);
        if highlights.is_empty() {
            return Err(StorageError::validation("At least one highlight is required."));
        }

        match self.get_department(&input.department_id).await {
            Ok(_) => {}
            Err(StorageError::NotFound(_)) => {
                return Err(StorageError::validation("Select a valid department."));
            }
            Err(e) => return Err(e),
        }

        Ok(CleanSections {
            highlights: to_json(&highlights)?,
            pendings: to_json(&clean_items(&input.pendings, JournalSection::Pendings))?,
            challenges: to_json(&clean_items(&input.challenges, JournalSection::Challenges))?,
            personal_updates: to_json(&clean_items(
                &input.personal_updates,
                JournalSection::PersonalUpdates,
            ))?,
            strategies: to_json(&clean_items(&input.strategies, JournalSection::Strategies))?,
        })
    }

    async fn fetch_journals(
        &self,
        mut query: QueryBuilder<'_, Sqlite>,
    ) -> Result<Vec<WeeklyJournal>, StorageError> {
        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_journal).collect()
    }
}

fn to_json(items: &[JournalItem]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(items)?)
}

fn push_journal_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &JournalFilter) {
    if let Some(department) = filter.department.as_deref().filter(|d| !d.is_empty()) {
        query.push(" AND w.department_id = ").push_bind(department.to_string());
    }
    if let Some(date_from) = filter.date_from {
        query.push(" AND w.date_from >= ").push_bind(date_from);
    }
    if let Some(date_to) = filter.date_to {
        query.push(" AND w.date_to <= ").push_bind(date_to);
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_like_any(
            query,
            &[
                "w.highlights",
                "w.challenges",
                "w.strategies",
                "u.first_name",
                "u.last_name",
                "d.name",
            ],
            search,
        );
    }
}

/// ` AND (a LIKE ? OR b LIKE ? ...)` with escaped wildcards
fn push_like_any(query: &mut QueryBuilder<'_, Sqlite>, columns: &[&str], needle: &str) {
    let pattern = like_pattern(needle);
    query.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            query.push(" OR ");
        }
        query
            .push(*column)
            .push(" LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\'");
    }
    query.push(")");
}

fn push_page(query: &mut QueryBuilder<'_, Sqlite>, limit: Option<i64>, offset: Option<i64>) {
    if let Some(lim) = limit {
        query.push(" LIMIT ").push_bind(lim);
    }
    if let Some(off) = offset {
        query.push(" OFFSET ").push_bind(off);
    }
}

fn row_to_department(row: &SqliteRow) -> Result<Department, StorageError> {
    Ok(Department {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_journal(row: &SqliteRow) -> Result<WeeklyJournal, StorageError> {
    let section = |name: &str, section: JournalSection| -> Result<Vec<JournalItem>, StorageError> {
        let raw: String = row.try_get(name)?;
        Ok(normalize_stored(&raw, section))
    };

    Ok(WeeklyJournal {
        id: row.try_get("id")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
        },
        department: DepartmentRef {
            id: row.try_get("department_id")?,
            name: row.try_get("department_name")?,
        },
        date_from: row.try_get("date_from")?,
        date_to: row.try_get("date_to")?,
        highlights: section("highlights", JournalSection::Highlights)?,
        pendings: section("pendings", JournalSection::Pendings)?,
        challenges: section("challenges", JournalSection::Challenges)?,
        personal_updates: section("personal_updates", JournalSection::PersonalUpdates)?,
        strategies: section("strategies", JournalSection::Strategies)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_comment(row: &SqliteRow) -> Result<JournalComment, StorageError> {
    Ok(JournalComment {
        id: row.try_get("id")?,
        journal_id: row.try_get("journal_id")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
        },
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}
