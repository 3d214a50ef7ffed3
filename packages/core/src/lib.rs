// ABOUTME: Core types and utilities for DocuApp
// ABOUTME: Foundational package providing shared functionality across all DocuApp packages

pub mod constants;
pub mod query;
pub mod utils;
pub mod week;

// Re-export constants
pub use constants::{database_file, docuapp_dir, DATABASE_FILE_NAME};

// Re-export query-string helpers
pub use query::{lenient_option, lenient_or_default};

// Re-export utilities
pub use utils::{generate_id, truncate_with_ellipsis, title_case};

// Re-export week helpers
pub use week::{month_start, WeekError, WeekRange, MAX_WEEK_SPAN_DAYS};
