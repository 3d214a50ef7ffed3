// ABOUTME: Catalog storage for document building blocks
// ABOUTME: Templates, letterheads, document types, signatories, QR codes, and settings counts

use chrono::Utc;
use docuapp_core::generate_id;
use docuapp_storage::StorageError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::types::{
    DocumentTemplate, DocumentType, DocumentTypeCreateInput, Letterhead, LetterheadCreateInput,
    QrCode, QrCodeCreateInput, SettingsCounts, Signatory, SignatoryCreateInput,
    TemplateCreateInput,
};

fn required(value: &str, message: &str) -> Result<String, StorageError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StorageError::validation(message))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional_path(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn active_clause(active_only: bool) -> &'static str {
    if active_only {
        " WHERE is_active = 1"
    } else {
        ""
    }
}

pub struct CatalogStorage {
    pool: SqlitePool,
}

impl CatalogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Templates

    pub async fn list_templates(&self, active_only: bool) -> Result<Vec<DocumentTemplate>, StorageError> {
        let sql = format!(
            "SELECT * FROM document_templates{} ORDER BY name",
            active_clause(active_only)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_template).collect()
    }

    pub async fn get_template(&self, template_id: &str) -> Result<DocumentTemplate, StorageError> {
        let row = sqlx::query("SELECT * FROM document_templates WHERE id = ?")
            .bind(template_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Template"))?;

        row_to_template(&row)
    }

    pub async fn create_template(
        &self,
        created_by: &str,
        input: TemplateCreateInput,
    ) -> Result<DocumentTemplate, StorageError> {
        let name = required(&input.name, "Template name is required.")?;
        if input.template_content.trim().is_empty() {
            return Err(StorageError::validation("Template content is required."));
        }

        let template_id = generate_id("tpl");
        let now = Utc::now();
        debug!("Creating template: {} (name: {})", template_id, name);

        sqlx::query(
            r#"
            INSERT INTO document_templates (id, name, description, template_content, is_active,
                                            created_by, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&template_id)
        .bind(&name)
        .bind(input.description.trim())
        .bind(&input.template_content)
        .bind(input.is_active)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_template(&template_id).await
    }

    // Letterheads

    pub async fn list_letterheads(&self, active_only: bool) -> Result<Vec<Letterhead>, StorageError> {
        let sql = format!(
            "SELECT * FROM letterheads{} ORDER BY name",
            active_clause(active_only)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_letterhead).collect()
    }

    pub async fn get_letterhead(&self, letterhead_id: &str) -> Result<Letterhead, StorageError> {
        let row = sqlx::query("SELECT * FROM letterheads WHERE id = ?")
            .bind(letterhead_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Letterhead"))?;

        row_to_letterhead(&row)
    }

    pub async fn create_letterhead(
        &self,
        input: LetterheadCreateInput,
    ) -> Result<Letterhead, StorageError> {
        let name = required(&input.name, "Letterhead name is required.")?;
        let company_name = required(&input.company_name, "Company name is required.")?;
        let address = required(&input.address, "Company address is required.")?;
        if input.header_html.trim().is_empty() {
            return Err(StorageError::validation("Header HTML is required."));
        }

        let letterhead_id = generate_id("lh");
        debug!("Creating letterhead: {} (name: {})", letterhead_id, name);

        sqlx::query(
            r#"
            INSERT INTO letterheads (id, name, logo_path, company_name, address, phone, email,
                                     website, header_html, footer_html, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&letterhead_id)
        .bind(&name)
        .bind(optional_path(input.logo_path))
        .bind(&company_name)
        .bind(&address)
        .bind(input.phone.trim())
        .bind(input.email.trim())
        .bind(input.website.trim())
        .bind(&input.header_html)
        .bind(&input.footer_html)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_letterhead(&letterhead_id).await
    }

    // Document types

    pub async fn list_document_types(&self, active_only: bool) -> Result<Vec<DocumentType>, StorageError> {
        let sql = format!(
            "SELECT * FROM document_types{} ORDER BY name",
            active_clause(active_only)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_document_type).collect()
    }

    pub async fn get_document_type(&self, type_id: &str) -> Result<DocumentType, StorageError> {
        let row = sqlx::query("SELECT * FROM document_types WHERE id = ?")
            .bind(type_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Document type"))?;

        row_to_document_type(&row)
    }

    pub async fn create_document_type(
        &self,
        input: DocumentTypeCreateInput,
    ) -> Result<DocumentType, StorageError> {
        let name = required(&input.name, "Document type name is required.")?;
        let default_template_id = optional_path(input.default_template_id);
        if let Some(template_id) = &default_template_id {
            match self.get_template(template_id).await {
                Ok(_) => {}
                Err(StorageError::NotFound(_)) => {
                    return Err(StorageError::validation("Select a valid default template."))
                }
                Err(e) => return Err(e),
            }
        }

        let type_id = generate_id("dtype");
        debug!("Creating document type: {} (name: {})", type_id, name);

        sqlx::query(
            r#"
            INSERT INTO document_types (id, name, description, default_template_id, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&type_id)
        .bind(&name)
        .bind(input.description.trim())
        .bind(&default_template_id)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_document_type(&type_id).await
    }

    // Signatories

    pub async fn list_signatories(&self, active_only: bool) -> Result<Vec<Signatory>, StorageError> {
        let sql = format!(
            "SELECT * FROM signatories{} ORDER BY name",
            active_clause(active_only)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_signatory).collect()
    }

    pub async fn get_signatory(&self, signatory_id: &str) -> Result<Signatory, StorageError> {
        let row = sqlx::query("SELECT * FROM signatories WHERE id = ?")
            .bind(signatory_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("Signatory"))?;

        row_to_signatory(&row)
    }

    pub async fn create_signatory(
        &self,
        input: SignatoryCreateInput,
    ) -> Result<Signatory, StorageError> {
        let name = required(&input.name, "Signatory name is required.")?;
        let title = required(&input.title, "Signatory title is required.")?;

        let signatory_id = generate_id("sig");
        debug!("Creating signatory: {} (name: {})", signatory_id, name);

        sqlx::query(
            r#"
            INSERT INTO signatories (id, name, title, department, email, phone, signature_path,
                                     is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&signatory_id)
        .bind(&name)
        .bind(&title)
        .bind(input.department.trim())
        .bind(input.email.trim())
        .bind(input.phone.trim())
        .bind(optional_path(input.signature_path))
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_signatory(&signatory_id).await
    }

    // QR codes

    pub async fn list_qr_codes(&self, active_only: bool) -> Result<Vec<QrCode>, StorageError> {
        let sql = format!(
            "SELECT * FROM qr_codes{} ORDER BY name",
            active_clause(active_only)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_qr_code).collect()
    }

    pub async fn get_qr_code(&self, qr_code_id: &str) -> Result<QrCode, StorageError> {
        let row = sqlx::query("SELECT * FROM qr_codes WHERE id = ?")
            .bind(qr_code_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("QR code"))?;

        row_to_qr_code(&row)
    }

    pub async fn create_qr_code(&self, input: QrCodeCreateInput) -> Result<QrCode, StorageError> {
        let name = required(&input.name, "QR code name is required.")?;
        let content = required(&input.content, "QR code content is required.")?;
        if input.size <= 0 {
            return Err(StorageError::validation("QR code size must be positive."));
        }

        let qr_code_id = generate_id("qr");
        debug!("Creating QR code: {} (name: {})", qr_code_id, name);

        sqlx::query(
            r#"
            INSERT INTO qr_codes (id, name, qr_type, content, size, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&qr_code_id)
        .bind(&name)
        .bind(input.qr_type.as_str())
        .bind(&content)
        .bind(input.size)
        .bind(input.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        self.get_qr_code(&qr_code_id).await
    }

    /// Active records of each catalog kind
    pub async fn settings_counts(&self) -> Result<SettingsCounts, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM document_templates WHERE is_active = 1) AS templates_count,
                (SELECT COUNT(*) FROM letterheads WHERE is_active = 1) AS letterheads_count,
                (SELECT COUNT(*) FROM document_types WHERE is_active = 1) AS document_types_count,
                (SELECT COUNT(*) FROM signatories WHERE is_active = 1) AS signatories_count,
                (SELECT COUNT(*) FROM qr_codes WHERE is_active = 1) AS qrcodes_count
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(SettingsCounts {
            templates_count: row.try_get("templates_count")?,
            letterheads_count: row.try_get("letterheads_count")?,
            document_types_count: row.try_get("document_types_count")?,
            signatories_count: row.try_get("signatories_count")?,
            qrcodes_count: row.try_get("qrcodes_count")?,
        })
    }
}

fn row_to_template(row: &SqliteRow) -> Result<DocumentTemplate, StorageError> {
    Ok(DocumentTemplate {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        template_content: row.try_get("template_content")?,
        is_active: row.try_get("is_active")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_letterhead(row: &SqliteRow) -> Result<Letterhead, StorageError> {
    Ok(Letterhead {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        logo_path: row.try_get("logo_path")?,
        company_name: row.try_get("company_name")?,
        address: row.try_get("address")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        website: row.try_get("website")?,
        header_html: row.try_get("header_html")?,
        footer_html: row.try_get("footer_html")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_document_type(row: &SqliteRow) -> Result<DocumentType, StorageError> {
    Ok(DocumentType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        default_template_id: row.try_get("default_template_id")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_signatory(row: &SqliteRow) -> Result<Signatory, StorageError> {
    Ok(Signatory {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        title: row.try_get("title")?,
        department: row.try_get("department")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        signature_path: row.try_get("signature_path")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_qr_code(row: &SqliteRow) -> Result<QrCode, StorageError> {
    let qr_type: String = row.try_get("qr_type")?;
    Ok(QrCode {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        qr_type: qr_type.parse().map_err(StorageError::Database)?,
        content: row.try_get("content")?,
        size: row.try_get("size")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}
