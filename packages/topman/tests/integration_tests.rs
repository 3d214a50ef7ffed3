// ABOUTME: Integration tests for top-management reports and tagging
// ABOUTME: Uses an in-memory SQLite database with the real migrations

use chrono::{Duration, NaiveDate};
use docuapp_core::WeekRange;
use docuapp_journal::{
    DepartmentCreateInput, ItemStatus, JournalInput, JournalItemInput, JournalSection,
    JournalStorage, WeeklyJournal,
};
use docuapp_storage::{connect_in_memory, StorageError};
use docuapp_topman::{
    Priority, ReportInput, TagAction, TagRequest, TopManStorage, DEFAULT_REPORT_TITLE,
};
use docuapp_users::{User, UserCreateInput, UserStorage};

struct Fixture {
    topman: TopManStorage,
    journals: JournalStorage,
    users: UserStorage,
}

async fn setup() -> Fixture {
    let pool = connect_in_memory().await.unwrap();
    Fixture {
        topman: TopManStorage::new(pool.clone()),
        journals: JournalStorage::new(pool.clone()),
        users: UserStorage::new(pool),
    }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn week() -> WeekRange {
    WeekRange::new(d(2025, 1, 6), d(2025, 1, 12))
}

async fn user(fx: &Fixture, username: &str, last: &str) -> User {
    fx.users
        .create_user(UserCreateInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: username.to_string(),
            last_name: last.to_string(),
            password: "password".to_string(),
            confirm_password: "password".to_string(),
            is_staff: true,
            is_superuser: false,
            is_active: true,
        })
        .await
        .unwrap()
}

async fn journal(fx: &Fixture, author: &User, department: &str, from: NaiveDate) -> WeeklyJournal {
    let department_id = match fx.journals.get_department_by_name(department).await.unwrap() {
        Some(existing) => existing.id,
        None => {
            fx.journals
                .create_department(DepartmentCreateInput {
                    name: department.to_string(),
                    description: None,
                })
                .await
                .unwrap()
                .id
        }
    };

    fx.journals
        .create_journal(
            &author.id,
            JournalInput {
                department_id,
                date_from: from,
                date_to: from + Duration::days(6),
                highlights: vec![
                    JournalItemInput::new("Launched product", None),
                    JournalItemInput::new("Hired two engineers", Some(ItemStatus::InProgress)),
                ],
                pendings: vec![],
                challenges: vec![JournalItemInput::new("Supplier delays", None)],
                personal_updates: vec![],
                strategies: vec![],
            },
        )
        .await
        .unwrap()
}

fn tag_request(journal_id: &str, report_id: &str, index: i64, priority: Priority) -> TagRequest {
    TagRequest {
        journal_id: journal_id.to_string(),
        report_id: report_id.to_string(),
        section: JournalSection::Highlights,
        item_index: index,
        action: TagAction::Tag,
        priority,
        admin_note: String::new(),
    }
}

#[tokio::test]
async fn test_report_crud() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;

    let mut input = ReportInput::for_week(week());
    input.admin_highlights = vec![
        JournalItemInput::new("Revenue up", None),
        JournalItemInput::new("  ", None),
    ];
    input.executive_summary = "  Strong week.  ".to_string();

    let report = fx.topman.create_report(&admin.id, input).await.unwrap();
    assert!(report.id.starts_with("rpt-"));
    assert_eq!(report.title, DEFAULT_REPORT_TITLE);
    assert_eq!(report.admin_highlights.len(), 1);
    assert_eq!(report.admin_highlights[0].status, "completed");
    assert_eq!(report.executive_summary, "Strong week.");
    assert_eq!(report.tagged_count, 0);

    let duplicate = fx
        .topman
        .create_report(&admin.id, ReportInput::for_week(week()))
        .await;
    assert!(matches!(duplicate, Err(StorageError::Duplicate(_))));

    let mut edit = ReportInput::for_week(week());
    edit.title = Some("Week 2 briefing".to_string());
    let updated = fx.topman.update_report(&report.id, edit).await.unwrap();
    assert_eq!(updated.title, "Week 2 briefing");
    assert!(updated.admin_highlights.is_empty());

    fx.topman
        .create_report(&admin.id, ReportInput::for_week(week().previous()))
        .await
        .unwrap();
    let (reports, total) = fx.topman.list_reports_paginated(Some(10), Some(0)).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(reports[0].week_start, d(2025, 1, 6));

    let forbidden = fx.topman.delete_report(&report.id, false).await;
    assert!(matches!(forbidden, Err(StorageError::Forbidden(_))));

    fx.topman.delete_report(&report.id, true).await.unwrap();
    assert!(matches!(
        fx.topman.get_report(&report.id).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_get_or_create_report() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;

    let (report, created) = fx.topman.get_or_create_report(&week(), &admin.id).await.unwrap();
    assert!(created);
    assert_eq!(
        report.title,
        "Top Management Report - January 06 to January 12, 2025"
    );

    let (again, created) = fx.topman.get_or_create_report(&week(), &admin.id).await.unwrap();
    assert!(!created);
    assert_eq!(again.id, report.id);
}

#[tokio::test]
async fn test_tagging_interface_lists_overlapping_journals() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;
    let zed = user(&fx, "zed", "Zulu").await;
    let amy = user(&fx, "amy", "Alpha").await;

    journal(&fx, &zed, "Sales", d(2025, 1, 6)).await;
    journal(&fx, &amy, "Sales", d(2025, 1, 6)).await;
    journal(&fx, &amy, "Engineering", d(2025, 1, 9)).await;
    journal(&fx, &zed, "Sales", d(2024, 12, 23)).await;

    let interface = fx
        .topman
        .tagging_interface(Some(d(2025, 1, 6)), Some(d(2025, 1, 12)), &admin.id)
        .await
        .unwrap();

    assert!(interface.created_report);
    assert_eq!(interface.week, week());
    assert_eq!(interface.journal_entries.len(), 3);
    let order: Vec<(String, String)> = interface
        .journal_entries
        .iter()
        .map(|j| (j.department.name.clone(), j.author.last_name.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Engineering".to_string(), "Alpha".to_string()),
            ("Sales".to_string(), "Alpha".to_string()),
            ("Sales".to_string(), "Zulu".to_string()),
        ]
    );
    assert!(interface.tagged_items.is_empty());

    // An over-long selection falls back to the current week
    let fallback = fx
        .topman
        .tagging_interface(Some(d(2025, 1, 1)), Some(d(2025, 2, 1)), &admin.id)
        .await
        .unwrap();
    assert_eq!(fallback.week, WeekRange::current());
}

#[tokio::test]
async fn test_retagging_keeps_the_original_row() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;
    let other_admin = user(&fx, "deputy", "Boss").await;
    let author = user(&fx, "ann", "Lee").await;
    let entry = journal(&fx, &author, "Sales", d(2025, 1, 6)).await;
    let (report, _) = fx.topman.get_or_create_report(&week(), &admin.id).await.unwrap();

    assert!(fx
        .topman
        .tag_item(&tag_request(&entry.id, &report.id, 0, Priority::Low), &admin.id)
        .await
        .unwrap());
    let first = fx.topman.list_report_tags(&report.id).await.unwrap();

    let mut again = tag_request(&entry.id, &report.id, 0, Priority::High);
    again.admin_note = "Escalate".to_string();
    assert!(!fx.topman.tag_item(&again, &other_admin.id).await.unwrap());
    assert!(!fx.topman.tag_item(&again, &other_admin.id).await.unwrap());

    let tags = fx.topman.list_report_tags(&report.id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, first[0].id);
    assert_eq!(tags[0].tagged_by, admin.id);
    assert_eq!(tags[0].tagged_at, first[0].tagged_at);
    assert_eq!(tags[0].priority, Priority::High);
    assert_eq!(tags[0].admin_note, "Escalate");
}

#[tokio::test]
async fn test_tag_update_and_untag() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;
    let author = user(&fx, "ann", "Lee").await;
    let entry = journal(&fx, &author, "Sales", d(2025, 1, 6)).await;
    let (report, _) = fx.topman.get_or_create_report(&week(), &admin.id).await.unwrap();

    let created = fx
        .topman
        .tag_item(&tag_request(&entry.id, &report.id, 1, Priority::Low), &admin.id)
        .await
        .unwrap();
    assert!(created);

    let mut again = tag_request(&entry.id, &report.id, 1, Priority::High);
    again.admin_note = "Board should see this".to_string();
    let created = fx.topman.tag_item(&again, &admin.id).await.unwrap();
    assert!(!created);

    let tags = fx.topman.list_report_tags(&report.id).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].item_text, "Hired two engineers");
    assert_eq!(tags[0].item_status, "in_progress");
    assert_eq!(tags[0].priority, Priority::High);
    assert_eq!(tags[0].admin_note, "Board should see this");
    assert_eq!(tags[0].author_name, "ann Lee");
    assert_eq!(tags[0].department_name, "Sales");

    let keys = fx.topman.tagged_keys(&report.id).await.unwrap();
    assert_eq!(keys.len(), 1);

    let out_of_range = fx
        .topman
        .tag_item(&tag_request(&entry.id, &report.id, 5, Priority::Medium), &admin.id)
        .await;
    assert!(matches!(out_of_range, Err(StorageError::Validation(_))));

    let negative = fx
        .topman
        .tag_item(&tag_request(&entry.id, &report.id, -1, Priority::Medium), &admin.id)
        .await;
    assert!(matches!(negative, Err(StorageError::Validation(_))));

    let mut untag = tag_request(&entry.id, &report.id, 1, Priority::Medium);
    untag.action = TagAction::Untag;
    let outcome = fx.topman.apply_tag_request(untag.clone(), &admin.id).await.unwrap();
    assert_eq!(outcome.action, "untagged");
    // Untagging twice is harmless
    fx.topman.apply_tag_request(untag, &admin.id).await.unwrap();

    assert!(fx.topman.list_report_tags(&report.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_report_detail_orders_by_priority_then_department() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;
    let ann = user(&fx, "ann", "Lee").await;
    let bob = user(&fx, "bob", "Ray").await;
    let sales = journal(&fx, &ann, "Sales", d(2025, 1, 6)).await;
    let eng = journal(&fx, &bob, "Engineering", d(2025, 1, 6)).await;
    let (report, _) = fx.topman.get_or_create_report(&week(), &admin.id).await.unwrap();

    for (journal_id, index, priority) in [
        (&sales.id, 0, Priority::Low),
        (&sales.id, 1, Priority::High),
        (&eng.id, 0, Priority::Medium),
        (&eng.id, 1, Priority::High),
    ] {
        fx.topman
            .tag_item(&tag_request(journal_id, &report.id, index, priority), &admin.id)
            .await
            .unwrap();
    }

    let detail = fx.topman.report_detail(&report.id).await.unwrap();
    let order: Vec<(Priority, &str)> = detail
        .tagged_items
        .iter()
        .map(|t| (t.priority, t.department_name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (Priority::High, "Engineering"),
            (Priority::High, "Sales"),
            (Priority::Medium, "Engineering"),
            (Priority::Low, "Sales"),
        ]
    );
    assert_eq!(detail.priority_stats.high, 2);
    assert_eq!(detail.priority_stats.medium, 1);
    assert_eq!(detail.priority_stats.low, 1);
    assert_eq!(detail.tagged_items_by_department[0].department, "Engineering");
    assert_eq!(detail.tagged_items_by_department[0].items.len(), 2);
    assert_eq!(detail.report.tagged_count, 4);
}

#[tokio::test]
async fn test_weekly_summary() {
    let fx = setup().await;
    let admin = user(&fx, "admin", "Boss").await;
    let ann = user(&fx, "ann", "Lee").await;
    let bob = user(&fx, "bob", "Ray").await;
    let entry = journal(&fx, &ann, "Sales", d(2025, 1, 6)).await;
    journal(&fx, &bob, "Sales", d(2025, 1, 6)).await;
    journal(&fx, &bob, "Ops", d(2025, 1, 13)).await;

    // No report yet: summary must not create one
    let summary = fx
        .topman
        .weekly_summary(Some(d(2025, 1, 6)), Some(d(2025, 1, 12)))
        .await
        .unwrap();
    assert!(summary.report.is_none());
    assert_eq!(summary.stats.total_entries, 2);
    assert_eq!(summary.stats.total_departments, 1);
    assert_eq!(summary.stats.total_team_members, 2);
    assert_eq!(summary.stats.tagged_items_count, 0);
    assert_eq!(summary.status_summary.completed, 2);
    assert_eq!(summary.status_summary.in_progress, 2);
    assert_eq!(summary.status_summary.on_hold, 2);
    assert!(fx.topman.get_report_for_week(&week()).await.unwrap().is_none());

    let (report, _) = fx.topman.get_or_create_report(&week(), &admin.id).await.unwrap();
    fx.topman
        .tag_item(&tag_request(&entry.id, &report.id, 0, Priority::High), &admin.id)
        .await
        .unwrap();

    let summary = fx
        .topman
        .weekly_summary(Some(d(2025, 1, 6)), Some(d(2025, 1, 12)))
        .await
        .unwrap();
    assert_eq!(summary.report.map(|r| r.id), Some(report.id));
    assert_eq!(summary.stats.tagged_items_count, 1);
}
