// ABOUTME: Top-management executive reporting for DocuApp
// ABOUTME: Admins tag journal items into weekly reports with priorities and notes

pub mod storage;
pub mod types;

pub use storage::TopManStorage;
pub use types::{
    group_tags_by_department, DepartmentTags, Priority, PriorityStats, ReportDetail, ReportInput,
    TagAction, TagOutcome, TagRequest, TaggedItemKey, TaggingInterface, TopManagementReport,
    TopManagementTag, WeeklyStats, WeeklySummary, DEFAULT_REPORT_TITLE,
};
