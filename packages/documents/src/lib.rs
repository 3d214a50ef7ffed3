// ABOUTME: Letter-style document generation for DocuApp
// ABOUTME: Catalog records, HTML composition, owner-scoped documents, and their audit history

pub mod catalog;
pub mod compose;
pub mod storage;
pub mod types;

pub use catalog::CatalogStorage;
pub use compose::{
    compose_document, escape_html, export_filename, fill_placeholders, format_letter_date,
    LetterContent, LetterParts, HTML_CONTENT_TYPE,
};
pub use storage::DocumentStorage;
pub use types::{
    Document, DocumentExport, DocumentFilter, DocumentHistory, DocumentInput, DocumentStatus,
    DocumentTemplate, DocumentType, DocumentTypeCreateInput, EmailRequest, HistoryAction,
    HistoryFilter, Letterhead, LetterheadCreateInput, QrCode, QrCodeCreateInput, QrType,
    SettingsCounts, Signatory, SignatoryCreateInput, SubmitAction, TemplateCreateInput,
    DEFAULT_QR_SIZE, DEFAULT_SALUTATION,
};
