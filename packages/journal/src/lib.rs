// ABOUTME: Weekly team journals for DocuApp
// ABOUTME: Entries with status-tagged items, comments, dashboards, and summary reports

pub mod normalize;
pub mod storage;
pub mod summary;
pub mod types;

pub use normalize::{clean_items, normalize_section, normalize_stored};
pub use storage::JournalStorage;
pub use summary::{
    build_summary_report, date_range_display, export_summary_csv, group_entries, write_csv,
    GroupBy, SummaryCriteria, SummaryFilter, SummaryGroup, SummaryReport, SummaryStats,
    CSV_FILENAME,
};
pub use types::{
    status_color, status_icon, status_label, AuthorRef, CommentCreateInput, Department,
    DepartmentCreateInput, DepartmentRef, ItemStatus, JournalComment, JournalDashboard,
    JournalFilter, JournalInput, JournalItem, JournalItemInput, JournalSection, StatusSummary,
    WeeklyJournal,
};
