// ABOUTME: Document generation types
// ABOUTME: Catalog records, generated documents, history entries, and their inputs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SALUTATION: &str = "Sincerely";
pub const DEFAULT_QR_SIZE: i64 = 100;

fn default_true() -> bool {
    true
}

fn default_qr_size() -> i64 {
    DEFAULT_QR_SIZE
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Sent => "sent",
            DocumentStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::Sent => "Sent",
            DocumentStatus::Archived => "Archived",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(DocumentStatus::Draft),
            "sent" => Ok(DocumentStatus::Sent),
            "archived" => Ok(DocumentStatus::Archived),
            other => Err(format!("Invalid document status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Updated,
    Sent,
    Exported,
    Deleted,
    Viewed,
}

impl HistoryAction {
    pub const ALL: [HistoryAction; 6] = [
        HistoryAction::Created,
        HistoryAction::Updated,
        HistoryAction::Sent,
        HistoryAction::Exported,
        HistoryAction::Deleted,
        HistoryAction::Viewed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Sent => "sent",
            HistoryAction::Exported => "exported",
            HistoryAction::Deleted => "deleted",
            HistoryAction::Viewed => "viewed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::Created => "Created",
            HistoryAction::Updated => "Updated",
            HistoryAction::Sent => "Sent via Email",
            HistoryAction::Exported => "Exported",
            HistoryAction::Deleted => "Deleted",
            HistoryAction::Viewed => "Viewed",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HistoryAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("Invalid history action: {}", s))
    }
}

/// What the author asked for when submitting a new document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitAction {
    #[default]
    SaveDraft,
    SendEmail,
    Export,
}

impl SubmitAction {
    pub fn status(&self) -> DocumentStatus {
        match self {
            SubmitAction::SaveDraft => DocumentStatus::Draft,
            SubmitAction::SendEmail | SubmitAction::Export => DocumentStatus::Sent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrType {
    Url,
    Email,
    Text,
    Verification,
}

impl QrType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrType::Url => "url",
            QrType::Email => "email",
            QrType::Text => "text",
            QrType::Verification => "verification",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QrType::Url => "URL",
            QrType::Email => "Email",
            QrType::Text => "Text",
            QrType::Verification => "Document Verification",
        }
    }
}

impl FromStr for QrType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(QrType::Url),
            "email" => Ok(QrType::Email),
            "text" => Ok(QrType::Text),
            "verification" => Ok(QrType::Verification),
            other => Err(format!("Invalid QR code type: {}", other)),
        }
    }
}

// Catalog records

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template_content: String,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCreateInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub template_content: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Letterhead {
    pub id: String,
    pub name: String,
    pub logo_path: Option<String>,
    pub company_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub header_html: String,
    pub footer_html: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LetterheadCreateInput {
    pub name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
    pub company_name: String,
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    pub header_html: String,
    #[serde(default)]
    pub footer_html: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_template_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTypeCreateInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_template_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signatory {
    pub id: String,
    pub name: String,
    pub title: String,
    pub department: String,
    pub email: String,
    pub phone: String,
    pub signature_path: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatoryCreateInput {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub signature_path: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCode {
    pub id: String,
    pub name: String,
    pub qr_type: QrType,
    pub content: String,
    pub size: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrCodeCreateInput {
    pub name: String,
    pub qr_type: QrType,
    pub content: String,
    #[serde(default = "default_qr_size")]
    pub size: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Active catalog record counts for the settings dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettingsCounts {
    pub templates_count: i64,
    pub letterheads_count: i64,
    pub document_types_count: i64,
    pub signatories_count: i64,
    pub qrcodes_count: i64,
}

// Documents

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub document_type_id: String,
    pub document_type_name: String,
    pub letterhead_id: String,
    pub template_id: Option<String>,
    pub date: NaiveDate,
    pub addressee_name: String,
    pub addressee_address: String,
    pub body: String,
    pub salutation: String,
    pub signatory_id: Option<String>,
    pub qr_code_id: Option<String>,
    pub status: DocumentStatus,
    pub created_by: String,
    pub generated_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or editing a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub title: String,
    pub document_type_id: String,
    pub letterhead_id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    pub date: NaiveDate,
    pub addressee_name: String,
    pub addressee_address: String,
    pub body: String,
    #[serde(default)]
    pub salutation: Option<String>,
    #[serde(default)]
    pub signatory_id: Option<String>,
    #[serde(default)]
    pub qr_code_id: Option<String>,
    /// Ignored on update
    #[serde(default)]
    pub action: SubmitAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHistory {
    pub id: String,
    pub document_id: String,
    pub document_title: String,
    pub action: HistoryAction,
    pub description: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryFilter {
    #[serde(default, deserialize_with = "docuapp_core::lenient_option")]
    pub action: Option<HistoryAction>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A composed document ready to be served as a download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentExport {
    pub filename: String,
    pub content_type: &'static str,
    pub html: String,
}
