// ABOUTME: Demo data for a fresh DocuApp database
// ABOUTME: Departments, sample users and journals, the document catalog, and this week's report

use chrono::{Duration, NaiveDate};
use docuapp_api::DbState;
use docuapp_core::WeekRange;
use docuapp_documents::{
    DocumentTypeCreateInput, LetterheadCreateInput, QrCodeCreateInput, QrType,
    SignatoryCreateInput, TemplateCreateInput,
};
use docuapp_journal::{DepartmentCreateInput, JournalInput, JournalItemInput};
use docuapp_storage::StorageError;
use docuapp_users::{User, UserCreateInput};
use tracing::{debug, info};

pub const SAMPLE_PASSWORD: &str = "password123";
pub const SAMPLE_ADMIN_PASSWORD: &str = "admin123";

const DEPARTMENTS: [(&str, &str); 6] = [
    ("Engineering", "Software Development and Technical Team"),
    ("Marketing", "Marketing and Communications Team"),
    ("Sales", "Sales and Business Development Team"),
    ("HR", "Human Resources Team"),
    ("Finance", "Finance and Accounting Team"),
    ("Operations", "Operations and Support Team"),
];

const USERS: [(&str, &str, &str, &str); 4] = [
    ("john_doe", "john@example.com", "John", "Doe"),
    ("jane_smith", "jane@example.com", "Jane", "Smith"),
    ("mike_wilson", "mike@example.com", "Mike", "Wilson"),
    ("sarah_davis", "sarah@example.com", "Sarah", "Davis"),
];

struct SampleJournal {
    username: &'static str,
    department: &'static str,
    /// Days before today for date_from and date_to
    days_back: (i64, i64),
    highlights: &'static [&'static str],
    pendings: &'static [&'static str],
    challenges: &'static [&'static str],
    personal_updates: &'static [&'static str],
    strategies: &'static [&'static str],
}

const JOURNALS: [SampleJournal; 4] = [
    SampleJournal {
        username: "john_doe",
        department: "Engineering",
        days_back: (14, 8),
        highlights: &[
            "Successfully implemented user authentication system",
            "Completed code review for the payment module",
            "Fixed critical bug in the checkout process",
            "Deployed new API version to production",
        ],
        pendings: &[
            "Waiting for design approval on the new dashboard layout",
            "Need to complete unit tests for the API endpoints",
        ],
        challenges: &["Database performance issues during peak hours"],
        personal_updates: &["Started learning React for frontend development"],
        strategies: &["Plan to implement caching for better performance"],
    },
    SampleJournal {
        username: "jane_smith",
        department: "Marketing",
        days_back: (14, 8),
        highlights: &[
            "Launched social media campaign that increased engagement by 40%",
            "Completed Q3 marketing report",
        ],
        pendings: &["Waiting for budget approval for paid advertising campaigns"],
        challenges: &["Low conversion rates on latest email campaign"],
        personal_updates: &["Obtained Google Analytics certification"],
        strategies: &["Test A/B variations for email templates"],
    },
    SampleJournal {
        username: "mike_wilson",
        department: "Sales",
        days_back: (7, 1),
        highlights: &[
            "Closed three major deals worth $150K total",
            "Exceeded monthly quota by 120%",
        ],
        pendings: &["Following up on pending proposals worth $200K"],
        challenges: &["Longer sales cycles affecting quarterly targets"],
        personal_updates: &["Completed advanced sales training program"],
        strategies: &["Create case studies from recent successful deals"],
    },
    SampleJournal {
        username: "sarah_davis",
        department: "HR",
        days_back: (0, 0),
        highlights: &["Onboarded five new hires across engineering and sales"],
        pendings: &["Finalize the revised leave policy"],
        challenges: &[],
        personal_updates: &[],
        strategies: &["Run a quarterly engagement survey"],
    },
];

/// What a seeding run added; records that already existed are not counted
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub departments_created: usize,
    pub users_created: usize,
    pub journals_created: usize,
    pub catalog_created: bool,
    pub report_created: bool,
}

/// Populate sample records relative to `today`. Safe to run more than once.
pub async fn seed_sample_data(db: &DbState, today: NaiveDate) -> Result<SeedReport, StorageError> {
    let mut report = SeedReport::default();

    let admin = seed_admin(db, &mut report).await?;

    for (name, description) in DEPARTMENTS {
        if db.journal_storage.get_department_by_name(name).await?.is_some() {
            continue;
        }
        db.journal_storage
            .create_department(DepartmentCreateInput {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
        report.departments_created += 1;
    }

    for (username, email, first_name, last_name) in USERS {
        if db.user_storage.get_user_by_username(username).await?.is_some() {
            continue;
        }
        db.user_storage
            .create_user(sample_user(username, email, first_name, last_name, false))
            .await?;
        report.users_created += 1;
    }

    for sample in &JOURNALS {
        if seed_journal(db, sample, today).await? {
            report.journals_created += 1;
        }
    }

    report.catalog_created = seed_catalog(db, &admin).await?;

    let week = WeekRange::containing(today);
    let (_, created) = db.topman_storage.get_or_create_report(&week, &admin.id).await?;
    report.report_created = created;

    info!("Seeding finished: {:?}", report);
    Ok(report)
}

async fn seed_admin(db: &DbState, report: &mut SeedReport) -> Result<User, StorageError> {
    if let Some(admin) = db.user_storage.get_user_by_username("admin").await? {
        return Ok(admin);
    }

    let admin = db
        .user_storage
        .create_user(UserCreateInput {
            password: SAMPLE_ADMIN_PASSWORD.to_string(),
            confirm_password: SAMPLE_ADMIN_PASSWORD.to_string(),
            ..sample_user("admin", "admin@docuapp.com", "", "", true)
        })
        .await?;
    report.users_created += 1;
    Ok(admin)
}

fn sample_user(
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    admin: bool,
) -> UserCreateInput {
    UserCreateInput {
        username: username.to_string(),
        email: email.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        password: SAMPLE_PASSWORD.to_string(),
        confirm_password: SAMPLE_PASSWORD.to_string(),
        is_staff: admin,
        is_superuser: admin,
        is_active: true,
    }
}

async fn seed_journal(
    db: &DbState,
    sample: &SampleJournal,
    today: NaiveDate,
) -> Result<bool, StorageError> {
    let author = db
        .user_storage
        .get_user_by_username(sample.username)
        .await?
        .ok_or_else(|| StorageError::not_found("User"))?;
    let department = db
        .journal_storage
        .get_department_by_name(sample.department)
        .await?
        .ok_or_else(|| StorageError::not_found("Department"))?;

    let items = |texts: &[&str]| -> Vec<JournalItemInput> {
        texts
            .iter()
            .map(|text| JournalItemInput::new(*text, None))
            .collect()
    };

    let input = JournalInput {
        department_id: department.id,
        date_from: today - Duration::days(sample.days_back.0),
        date_to: today - Duration::days(sample.days_back.1),
        highlights: items(sample.highlights),
        pendings: items(sample.pendings),
        challenges: items(sample.challenges),
        personal_updates: items(sample.personal_updates),
        strategies: items(sample.strategies),
    };

    match db.journal_storage.create_journal(&author.id, input).await {
        Ok(_) => Ok(true),
        Err(StorageError::Duplicate(_)) => {
            debug!("Journal for {} already seeded", sample.username);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// The catalog has no unique names, so it is only seeded into an empty one
async fn seed_catalog(db: &DbState, admin: &User) -> Result<bool, StorageError> {
    let catalog = &db.catalog_storage;
    if catalog.settings_counts().await?.templates_count > 0 {
        return Ok(false);
    }

    let template = catalog
        .create_template(
            &admin.id,
            TemplateCreateInput {
                name: "Basic Business Letter".to_string(),
                description: "Standard business letter template".to_string(),
                template_content: concat!(
                    "<div class=\"content\">",
                    "<p class=\"date\">{{date}}</p>",
                    "<div class=\"addressee\"><p><strong>{{addressee_name}}</strong></p>",
                    "<p>{{addressee_address}}</p></div>",
                    "<div class=\"body\">{{body}}</div>",
                    "<div class=\"signature\"><p>{{salutation}},</p>",
                    "<p><strong>{{signatory_name}}</strong></p><p>{{signatory_title}}</p></div>",
                    "</div>"
                )
                .to_string(),
                is_active: true,
            },
        )
        .await?;

    for (name, description) in [
        ("Business Letter", "Standard business correspondence"),
        ("Official Memo", "Internal office memorandum"),
        ("Invoice", "Billing document"),
        ("Certificate", "Official certification document"),
        ("Report", "Formal report document"),
    ] {
        catalog
            .create_document_type(DocumentTypeCreateInput {
                name: name.to_string(),
                description: description.to_string(),
                default_template_id: (name == "Business Letter").then(|| template.id.clone()),
                is_active: true,
            })
            .await?;
    }

    catalog
        .create_letterhead(LetterheadCreateInput {
            name: "Company Letterhead".to_string(),
            logo_path: None,
            company_name: "DocuApp Inc.".to_string(),
            address: "123 Business Street\nSuite 100\nCity, State 12345".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            email: "info@docuapp.com".to_string(),
            website: "https://docuapp.com".to_string(),
            header_html: "<div class=\"letterhead\"><h1>DocuApp Inc.</h1><p>Professional Document Solutions</p></div>".to_string(),
            footer_html: "<div class=\"letterhead-footer\">DocuApp Inc. | 123 Business Street | info@docuapp.com</div>".to_string(),
            is_active: true,
        })
        .await?;

    for (name, title, department) in [
        ("John Smith", "CEO", "Executive"),
        ("Jane Doe", "HR Manager", "Human Resources"),
        ("Mike Johnson", "CFO", "Finance"),
    ] {
        catalog
            .create_signatory(SignatoryCreateInput {
                name: name.to_string(),
                title: title.to_string(),
                department: department.to_string(),
                email: String::new(),
                phone: String::new(),
                signature_path: None,
                is_active: true,
            })
            .await?;
    }

    for (name, qr_type, content) in [
        ("Company Website", QrType::Url, "https://docuapp.com"),
        ("Contact Email", QrType::Email, "info@docuapp.com"),
        (
            "Document Verification",
            QrType::Verification,
            "Verify at https://docuapp.com/verify",
        ),
    ] {
        catalog
            .create_qr_code(QrCodeCreateInput {
                name: name.to_string(),
                qr_type,
                content: content.to_string(),
                size: docuapp_documents::DEFAULT_QR_SIZE,
                is_active: true,
            })
            .await?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuapp_journal::ItemStatus;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    #[tokio::test]
    async fn test_seed_populates_empty_database() {
        let db = DbState::in_memory().await.unwrap();

        let report = seed_sample_data(&db, today()).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                departments_created: 6,
                users_created: 5,
                journals_created: 4,
                catalog_created: true,
                report_created: true,
            }
        );

        let counts = db.catalog_storage.settings_counts().await.unwrap();
        assert_eq!(counts.templates_count, 1);
        assert_eq!(counts.document_types_count, 5);
        assert_eq!(counts.signatories_count, 3);
        assert_eq!(counts.qrcodes_count, 3);

        let admin = db
            .user_storage
            .get_user_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_superuser);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = DbState::in_memory().await.unwrap();
        seed_sample_data(&db, today()).await.unwrap();

        let second = seed_sample_data(&db, today()).await.unwrap();

        assert_eq!(second, SeedReport::default());
        assert_eq!(db.journal_storage.count_journals(None).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_seeded_journals_use_section_default_statuses() {
        let db = DbState::in_memory().await.unwrap();
        seed_sample_data(&db, today()).await.unwrap();

        let summary = db
            .topman_storage
            .weekly_summary(Some(today()), Some(today()))
            .await
            .unwrap();

        assert_eq!(summary.journal_entries.len(), 1);
        let journal = &summary.journal_entries[0];
        assert_eq!(journal.author.username, "sarah_davis");
        assert_eq!(journal.highlights[0].known_status(), Some(ItemStatus::Completed));
        assert_eq!(journal.pendings[0].known_status(), Some(ItemStatus::InProgress));
        assert!(summary.report.is_none());
    }
}
