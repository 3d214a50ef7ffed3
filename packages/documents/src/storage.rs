// ABOUTME: Document storage layer using SQLite
// ABOUTME: Owner-scoped documents with composed HTML and an audit history of every action

use chrono::Utc;
use docuapp_core::generate_id;
use docuapp_storage::{like_pattern, StorageError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::catalog::CatalogStorage;
use crate::compose::{compose_document, export_filename, LetterContent, LetterParts, HTML_CONTENT_TYPE};
use crate::types::{
    Document, DocumentExport, DocumentFilter, DocumentHistory, DocumentInput, DocumentStatus,
    EmailRequest, HistoryAction, HistoryFilter, DEFAULT_SALUTATION,
};

const DOCUMENT_SELECT: &str = r#"
    SELECT doc.*, t.name AS document_type_name
    FROM documents doc
    JOIN document_types t ON t.id = doc.document_type_id
    WHERE 1 = 1"#;

const HISTORY_SELECT: &str = r#"
    SELECT h.id, h.document_id, h.action, h.description, h.user_id, h.timestamp,
           doc.title AS document_title
    FROM document_history h
    JOIN documents doc ON doc.id = h.document_id
    WHERE 1 = 1"#;

/// Trimmed document fields and their rendered HTML
struct PreparedDocument {
    title: String,
    addressee_name: String,
    addressee_address: String,
    body: String,
    salutation: String,
    generated_html: String,
}

pub struct DocumentStorage {
    pool: SqlitePool,
    catalog: CatalogStorage,
}

impl DocumentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            catalog: CatalogStorage::new(pool.clone()),
            pool,
        }
    }

    /// The owner's documents, newest first
    pub async fn list_documents_paginated(
        &self,
        owner_id: &str,
        filter: &DocumentFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Document>, i64), StorageError> {
        debug!(
            "Fetching documents for {} (limit: {:?}, offset: {:?})",
            owner_id, limit, offset
        );

        let mut count_query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT COUNT(*) FROM documents doc
            JOIN document_types t ON t.id = doc.document_type_id
            WHERE 1 = 1"#,
        );
        push_document_filters(&mut count_query, owner_id, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new(DOCUMENT_SELECT);
        push_document_filters(&mut query, owner_id, filter);
        query.push(" ORDER BY doc.created_at DESC, doc.rowid DESC");
        push_page(&mut query, limit, offset);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let documents = rows.iter().map(row_to_document).collect::<Result<Vec<_>, _>>()?;
        Ok((documents, total))
    }

    pub async fn create_document(
        &self,
        owner_id: &str,
        input: DocumentInput,
    ) -> Result<Document, StorageError> {
        let prepared = self.prepare(&input).await?;
        let status = input.action.status();
        let document_id = generate_id("doc");
        let now = Utc::now();

        debug!(
            "Creating document: {} (owner: {}, status: {})",
            document_id, owner_id, status
        );

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, title, document_type_id, letterhead_id, template_id, date,
                                   addressee_name, addressee_address, body, salutation,
                                   signatory_id, qr_code_id, status, created_by, generated_html,
                                   created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document_id)
        .bind(&prepared.title)
        .bind(&input.document_type_id)
        .bind(&input.letterhead_id)
        .bind(non_blank(&input.template_id))
        .bind(input.date)
        .bind(&prepared.addressee_name)
        .bind(&prepared.addressee_address)
        .bind(&prepared.body)
        .bind(&prepared.salutation)
        .bind(non_blank(&input.signatory_id))
        .bind(non_blank(&input.qr_code_id))
        .bind(status.as_str())
        .bind(owner_id)
        .bind(&prepared.generated_html)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        log_action(
            &mut *tx,
            &document_id,
            HistoryAction::Created,
            &format!("Document created as {}", status),
            owner_id,
        )
        .await?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.fetch_owned(&document_id, owner_id).await
    }

    /// Fetch an owned document and record that it was viewed
    pub async fn get_document(&self, document_id: &str, owner_id: &str) -> Result<Document, StorageError> {
        let document = self.fetch_owned(document_id, owner_id).await?;
        log_action(&self.pool, document_id, HistoryAction::Viewed, "Document viewed", owner_id)
            .await?;
        Ok(document)
    }

    /// Replace a document's content and re-render it; status is unchanged
    pub async fn update_document(
        &self,
        document_id: &str,
        owner_id: &str,
        input: DocumentInput,
    ) -> Result<Document, StorageError> {
        self.fetch_owned(document_id, owner_id).await?;
        let prepared = self.prepare(&input).await?;

        debug!("Updating document: {}", document_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        sqlx::query(
            r#"
            UPDATE documents
            SET title = ?, document_type_id = ?, letterhead_id = ?, template_id = ?, date = ?,
                addressee_name = ?, addressee_address = ?, body = ?, salutation = ?,
                signatory_id = ?, qr_code_id = ?, generated_html = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&prepared.title)
        .bind(&input.document_type_id)
        .bind(&input.letterhead_id)
        .bind(non_blank(&input.template_id))
        .bind(input.date)
        .bind(&prepared.addressee_name)
        .bind(&prepared.addressee_address)
        .bind(&prepared.body)
        .bind(&prepared.salutation)
        .bind(non_blank(&input.signatory_id))
        .bind(non_blank(&input.qr_code_id))
        .bind(&prepared.generated_html)
        .bind(Utc::now())
        .bind(document_id)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        log_action(&mut *tx, document_id, HistoryAction::Updated, "Document updated", owner_id)
            .await?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.fetch_owned(document_id, owner_id).await
    }

    /// Delete an owned document; its history goes with it
    pub async fn delete_document(&self, document_id: &str, owner_id: &str) -> Result<(), StorageError> {
        self.fetch_owned(document_id, owner_id).await?;

        debug!("Deleting document: {}", document_id);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        log_action(&mut *tx, document_id, HistoryAction::Deleted, "Document deleted", owner_id)
            .await?;

        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// The composed HTML as a download
    pub async fn export_document(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<DocumentExport, StorageError> {
        let document = self.fetch_owned(document_id, owner_id).await?;
        log_action(
            &self.pool,
            document_id,
            HistoryAction::Exported,
            "Document exported as HTML",
            owner_id,
        )
        .await?;

        Ok(DocumentExport {
            filename: export_filename(&document.title),
            content_type: HTML_CONTENT_TYPE,
            html: document.generated_html,
        })
    }

    /// Record an email send and mark the document sent; no mail leaves the process
    pub async fn email_document(
        &self,
        document_id: &str,
        owner_id: &str,
        request: EmailRequest,
    ) -> Result<Document, StorageError> {
        self.fetch_owned(document_id, owner_id).await?;

        let to = request.to.trim();
        if to.is_empty() || !to.contains('@') {
            return Err(StorageError::validation("Enter a valid recipient email address."));
        }

        debug!("Marking document {} as sent to {}", document_id, to);

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        sqlx::query("UPDATE documents SET status = ?, updated_at = ? WHERE id = ?")
            .bind(DocumentStatus::Sent.as_str())
            .bind(Utc::now())
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        log_action(
            &mut *tx,
            document_id,
            HistoryAction::Sent,
            &format!("Document sent via email to {}", to),
            owner_id,
        )
        .await?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        self.fetch_owned(document_id, owner_id).await
    }

    /// History across the owner's documents, newest first
    pub async fn list_history_paginated(
        &self,
        owner_id: &str,
        filter: &HistoryFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<DocumentHistory>, i64), StorageError> {
        let mut count_query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT COUNT(*) FROM document_history h
            JOIN documents doc ON doc.id = h.document_id
            WHERE 1 = 1"#,
        );
        push_history_filters(&mut count_query, owner_id, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new(HISTORY_SELECT);
        push_history_filters(&mut query, owner_id, filter);
        query.push(" ORDER BY h.timestamp DESC, h.rowid DESC");
        push_page(&mut query, limit, offset);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let entries = rows.iter().map(row_to_history).collect::<Result<Vec<_>, _>>()?;
        Ok((entries, total))
    }

    /// History of a single owned document, newest first
    pub async fn list_document_history(
        &self,
        document_id: &str,
        owner_id: &str,
    ) -> Result<Vec<DocumentHistory>, StorageError> {
        self.fetch_owned(document_id, owner_id).await?;

        let mut query = QueryBuilder::<Sqlite>::new(HISTORY_SELECT);
        query.push(" AND h.document_id = ").push_bind(document_id.to_string());
        query.push(" ORDER BY h.timestamp DESC, h.rowid DESC");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_history).collect()
    }

    /// Documents owned by someone else are reported as missing
    async fn fetch_owned(&self, document_id: &str, owner_id: &str) -> Result<Document, StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new(DOCUMENT_SELECT);
        query.push(" AND doc.id = ").push_bind(document_id.to_string());
        query.push(" AND doc.created_by = ").push_bind(owner_id.to_string());

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Document"))?;

        row_to_document(&row)
    }

    /// Validate the input, resolve its catalog records, and render the HTML
    async fn prepare(&self, input: &DocumentInput) -> Result<PreparedDocument, StorageError> {
        let title = required(&input.title, "Title is required.")?;
        let addressee_name = required(&input.addressee_name, "Addressee name is required.")?;
        let addressee_address =
            required(&input.addressee_address, "Addressee address is required.")?;
        let body = required(&input.body, "Body is required.")?;
        let salutation = input
            .salutation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SALUTATION)
            .to_string();

        let document_type = lookup(
            self.catalog.get_document_type(&input.document_type_id).await,
            "Select a valid document type.",
        )?;
        let letterhead = lookup(
            self.catalog.get_letterhead(&input.letterhead_id).await,
            "Select a valid letterhead.",
        )?;

        let template = match non_blank(&input.template_id).or(document_type.default_template_id) {
            Some(id) => Some(lookup(
                self.catalog.get_template(&id).await,
                "Select a valid template.",
            )?),
            None => None,
        };
        let signatory = match non_blank(&input.signatory_id) {
            Some(id) => Some(lookup(
                self.catalog.get_signatory(&id).await,
                "Select a valid signatory.",
            )?),
            None => None,
        };
        let qr_code = match non_blank(&input.qr_code_id) {
            Some(id) => Some(lookup(
                self.catalog.get_qr_code(&id).await,
                "Select a valid QR code.",
            )?),
            None => None,
        };

        let parts = LetterParts {
            template,
            letterhead,
            signatory,
            qr_code,
        };
        let generated_html = compose_document(
            &LetterContent {
                title: &title,
                date: input.date,
                addressee_name: &addressee_name,
                addressee_address: &addressee_address,
                body: &body,
                salutation: &salutation,
            },
            &parts,
        );

        Ok(PreparedDocument {
            title,
            addressee_name,
            addressee_address,
            body,
            salutation,
            generated_html,
        })
    }
}

/// Append one history row; pass the transaction when the row belongs to a write
async fn log_action<'e, E>(
    executor: E,
    document_id: &str,
    action: HistoryAction,
    description: &str,
    user_id: &str,
) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    debug!("Document {} history: {}", document_id, action);

    sqlx::query(
        r#"
        INSERT INTO document_history (id, document_id, action, description, user_id, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(generate_id("hist"))
    .bind(document_id)
    .bind(action.as_str())
    .bind(description)
    .bind(user_id)
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(StorageError::Sqlx)?;

    Ok(())
}

fn required(value: &str, message: &str) -> Result<String, StorageError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StorageError::validation(message))
    } else {
        Ok(trimmed.to_string())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Turn a missing catalog record into a form error
fn lookup<T>(result: Result<T, StorageError>, message: &str) -> Result<T, StorageError> {
    match result {
        Err(StorageError::NotFound(_)) => Err(StorageError::validation(message)),
        other => other,
    }
}

fn push_document_filters(query: &mut QueryBuilder<'_, Sqlite>, owner_id: &str, filter: &DocumentFilter) {
    query.push(" AND doc.created_by = ").push_bind(owner_id.to_string());

    if let Some(status) = filter.status {
        query.push(" AND doc.status = ").push_bind(status.as_str());
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_like_any(query, &["doc.title", "doc.addressee_name", "t.name"], search);
    }
}

fn push_history_filters(query: &mut QueryBuilder<'_, Sqlite>, owner_id: &str, filter: &HistoryFilter) {
    query.push(" AND doc.created_by = ").push_bind(owner_id.to_string());

    if let Some(action) = filter.action {
        query.push(" AND h.action = ").push_bind(action.as_str());
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_like_any(query, &["doc.title", "h.description"], search);
    }
}

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
    query.push(" LIMIT ").push_bind(limit.unwrap_or(-1));
    if let Some(off) = offset {
        query.push(" OFFSET ").push_bind(off);
    }
}

fn row_to_document(row: &SqliteRow) -> Result<Document, StorageError> {
    let status: String = row.try_get("status")?;
    Ok(Document {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        document_type_id: row.try_get("document_type_id")?,
        document_type_name: row.try_get("document_type_name")?,
        letterhead_id: row.try_get("letterhead_id")?,
        template_id: row.try_get("template_id")?,
        date: row.try_get("date")?,
        addressee_name: row.try_get("addressee_name")?,
        addressee_address: row.try_get("addressee_address")?,
        body: row.try_get("body")?,
        salutation: row.try_get("salutation")?,
        signatory_id: row.try_get("signatory_id")?,
        qr_code_id: row.try_get("qr_code_id")?,
        status: status.parse().map_err(StorageError::Database)?,
        created_by: row.try_get("created_by")?,
        generated_html: row.try_get("generated_html")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_history(row: &SqliteRow) -> Result<DocumentHistory, StorageError> {
    let action: String = row.try_get("action")?;
    Ok(DocumentHistory {
        id: row.try_get("id")?,
        document_id: row.try_get("document_id")?,
        document_title: row.try_get("document_title")?,
        action: action.parse().map_err(StorageError::Database)?,
        description: row.try_get("description")?,
        user_id: row.try_get("user_id")?,
        timestamp: row.try_get("timestamp")?,
    })
}
