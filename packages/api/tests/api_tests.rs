// ABOUTME: HTTP-level tests for the DocuApp API router
// ABOUTME: Drives the real router with tower oneshot against an in-memory database

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use docuapp_api::{create_router, DbState, USER_ID_HEADER};
use docuapp_core::WeekRange;
use docuapp_documents::{
    DocumentTypeCreateInput, LetterheadCreateInput, TemplateCreateInput,
};
use docuapp_journal::DepartmentCreateInput;
use docuapp_users::{User, UserCreateInput};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    app: Router,
    db: DbState,
    admin: User,
    member: User,
}

async fn create_user(db: &DbState, username: &str, admin: bool) -> User {
    db.user_storage
        .create_user(UserCreateInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            password: "password".to_string(),
            confirm_password: "password".to_string(),
            is_staff: admin,
            is_superuser: admin,
            is_active: true,
        })
        .await
        .unwrap()
}

async fn setup() -> TestApp {
    let db = DbState::in_memory().await.unwrap();
    let admin = create_user(&db, "admin", true).await;
    let member = create_user(&db, "member", false).await;

    TestApp {
        app: create_router(db.clone()),
        db,
        admin,
        member,
    }
}

fn build_request(method: Method, uri: &str, user: Option<&User>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user.id.as_str());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&User>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(build_request(method, uri, user, body))
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn send_raw(app: &Router, uri: &str, user: &User) -> (StatusCode, HeaderMap, String) {
    let response = app
        .clone()
        .oneshot(build_request(Method::GET, uri, Some(user), None))
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn create_department(db: &DbState, name: &str) -> String {
    db.journal_storage
        .create_department(DepartmentCreateInput {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
        .id
}

fn journal_body(department_id: &str, week: WeekRange, highlight: &str) -> Value {
    json!({
        "department_id": department_id,
        "date_from": week.start,
        "date_to": week.end,
        "highlights": [{"text": highlight, "status": "completed"}],
        "pendings": [{"text": "Write docs"}]
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let t = setup().await;

    let (status, body) = send(&t.app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_authentication_and_admin_guard() {
    let t = setup().await;

    let (status, body) = send(&t.app, Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let ghost = User {
        id: "usr-missing".to_string(),
        ..t.member.clone()
    };
    let (status, _) = send(&t.app, Method::GET, "/api/users/me", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&t.app, Method::GET, "/api/users/me", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "member");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(&t.app, Method::GET, "/api/users", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required.");

    let (status, body) = send(&t.app, Method::GET, "/api/users", Some(&t.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalItems"], 2);
    assert_eq!(body["data"]["pagination"]["pageSize"], 10);
}

#[tokio::test]
async fn test_user_administration() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/users",
        Some(&t.admin),
        Some(json!({
            "username": "newbie",
            "email": "newbie@example.com",
            "password": "secret",
            "confirm_password": "different"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match.");

    let (status, _) = send(
        &t.app,
        Method::POST,
        &format!("/api/users/{}/toggle-active", t.admin.id),
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/users/{}/toggle-active", t.member.id),
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);

    // A deactivated account can no longer authenticate
    let (status, _) = send(&t.app, Method::GET, "/api/users/me", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&t.app, Method::GET, "/api/users/stats", Some(&t.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_users"], 2);
    assert_eq!(body["data"]["active_users"], 1);
}

#[tokio::test]
async fn test_journal_entry_flow() {
    let t = setup().await;
    let department_id = create_department(&t.db, "Engineering").await;
    let week = WeekRange::current();

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/journal/entries",
        Some(&t.member),
        Some(journal_body(&department_id, week, "Shipped v2")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let journal_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["pendings"][0]["status"], "in_progress");

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/journal/entries",
        Some(&t.member),
        Some(json!({
            "department_id": department_id,
            "date_from": week.start,
            "date_to": week.end,
            "highlights": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one highlight is required.");

    let (status, _) = send(
        &t.app,
        Method::PUT,
        &format!("/api/journal/entries/{}", journal_id),
        Some(&t.admin),
        Some(journal_body(&department_id, week, "Hijacked")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.app,
        Method::POST,
        &format!("/api/journal/entries/{}/comments", journal_id),
        Some(&t.admin),
        Some(json!({"content": "Great week"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/journal/entries/{}", journal_id),
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["journal"]["highlights"][0]["text"], "Shipped v2");
    assert_eq!(body["data"]["comments"][0]["content"], "Great week");

    let (status, _) = send(
        &t.app,
        Method::GET,
        "/api/journal/entries/jrn-missing",
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&t.app, Method::GET, "/api/journal/entries", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalItems"], 1);

    let (status, body) = send(&t.app, Method::GET, "/api/journal/dashboard", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_journal_count"], 1);
}

#[tokio::test]
async fn test_department_creation_requires_admin() {
    let t = setup().await;
    let body = json!({"name": "Finance"});

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/journal/departments",
        Some(&t.member),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/journal/departments",
        Some(&t.admin),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/journal/departments",
        Some(&t.admin),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_summary_csv_export() {
    let t = setup().await;
    let department_id = create_department(&t.db, "Engineering").await;
    let week = WeekRange::current();
    send(
        &t.app,
        Method::POST,
        "/api/journal/entries",
        Some(&t.member),
        Some(journal_body(&department_id, week, "Shipped v2")),
    )
    .await;

    let uri = format!(
        "/api/journal/summary/export?date_from={}&date_to={}",
        week.start, week.end
    );
    let (status, headers, body) = send_raw(&t.app, &uri, &t.member).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    assert_eq!(
        headers[header::CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"journal_summary_report.csv\""
    );
    assert!(body.starts_with("Date From,Date To,Author"));
    assert!(body.contains("Shipped v2"));

    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/journal/summary?date_from={}&date_to={}&group_by=department", week.start, week.end),
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["group_by"], "department");
    assert_eq!(body["data"]["groups"][0]["entries"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_topman_tagging_flow() {
    let t = setup().await;
    let department_id = create_department(&t.db, "Engineering").await;
    let week = WeekRange::current();
    let (_, body) = send(
        &t.app,
        Method::POST,
        "/api/journal/entries",
        Some(&t.member),
        Some(journal_body(&department_id, week, "Shipped v2")),
    )
    .await;
    let journal_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&t.app, Method::GET, "/api/topman/tagging", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&t.app, Method::GET, "/api/topman/tagging", Some(&t.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created_report"], true);
    assert_eq!(body["data"]["journal_entries"].as_array().map(Vec::len), Some(1));
    let report_id = body["data"]["report"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/topman/tags",
        Some(&t.admin),
        Some(json!({
            "journal_id": journal_id,
            "report_id": report_id,
            "section": "highlights",
            "item_index": 0,
            "action": "tag",
            "priority": "high",
            "admin_note": "Board should see this"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "tagged");
    assert_eq!(body["data"]["created"], true);

    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/topman/reports/{}", report_id),
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["priority_stats"]["high"], 1);
    assert_eq!(body["data"]["tagged_items"][0]["item_text"], "Shipped v2");

    let (status, body) = send(&t.app, Method::GET, "/api/topman/summary", Some(&t.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["tagged_items_count"], 1);

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/topman/tags",
        Some(&t.admin),
        Some(json!({
            "journal_id": journal_id,
            "report_id": report_id,
            "section": "highlights",
            "item_index": 9,
            "action": "tag"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

async fn seed_document_catalog(t: &TestApp) -> (String, String) {
    let template = t
        .db
        .catalog_storage
        .create_template(
            &t.admin.id,
            TemplateCreateInput {
                name: "Letter".to_string(),
                description: String::new(),
                template_content: "<p>Dear {{addressee_name}},</p><p>{{body}}</p>".to_string(),
                is_active: true,
            },
        )
        .await
        .unwrap();
    let document_type = t
        .db
        .catalog_storage
        .create_document_type(DocumentTypeCreateInput {
            name: "Letter".to_string(),
            description: String::new(),
            default_template_id: Some(template.id),
            is_active: true,
        })
        .await
        .unwrap();
    let letterhead = t
        .db
        .catalog_storage
        .create_letterhead(LetterheadCreateInput {
            name: "Main".to_string(),
            logo_path: None,
            company_name: "Acme Corp".to_string(),
            address: "1 Main St".to_string(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            header_html: "<h1>ACME</h1>".to_string(),
            footer_html: String::new(),
            is_active: true,
        })
        .await
        .unwrap();

    (document_type.id, letterhead.id)
}

#[tokio::test]
async fn test_document_flow() {
    let t = setup().await;
    let (type_id, letterhead_id) = seed_document_catalog(&t).await;

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/documents",
        Some(&t.member),
        Some(json!({
            "title": "Welcome letter",
            "document_type_id": type_id,
            "letterhead_id": letterhead_id,
            "date": "2025-03-10",
            "addressee_name": "Jane Roe",
            "addressee_address": "1 Elm St",
            "body": "Welcome aboard.",
            "action": "save_draft"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "draft");
    let document_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &t.app,
        Method::GET,
        &format!("/api/documents/{}", document_id),
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&t.app, Method::GET, "/api/documents", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["pageSize"], 10);
    assert_eq!(body["data"]["data"][0]["title"], "Welcome letter");

    let (status, headers, html) = send_raw(
        &t.app,
        &format!("/api/documents/{}/export", document_id),
        &t.member,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"Welcome letter.html\""
    );
    assert!(html.contains("Dear Jane Roe,"));

    let (status, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/documents/{}/email", document_id),
        Some(&t.member),
        Some(json!({"to": "jane@example.com", "subject": "Welcome"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sent");

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/documents/history?action=sent",
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalItems"], 1);
    assert_eq!(
        body["data"]["data"][0]["description"],
        "Document sent via email to jane@example.com"
    );

    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/documents/{}/history", document_id),
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["sent", "exported", "created"]);

    let (status, _) = send(
        &t.app,
        Method::GET,
        &format!("/api/documents/{}/history", document_id),
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&t.app, Method::GET, "/api/documents/settings", Some(&t.member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["templates_count"], 1);
    assert_eq!(body["data"]["letterheads_count"], 1);

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/documents/{}", document_id),
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, Method::GET, "/api/documents", Some(&t.member), None).await;
    assert_eq!(body["data"]["pagination"]["totalItems"], 0);
}

#[tokio::test]
async fn test_catalog_creation_requires_admin() {
    let t = setup().await;
    let body = json!({
        "name": "Verify",
        "qr_type": "verification",
        "content": "https://verify.example.com"
    });

    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/documents/settings/qrcodes",
        Some(&t.member),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = send(
        &t.app,
        Method::POST,
        "/api/documents/settings/qrcodes",
        Some(&t.admin),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["size"], 100);

    let (status, listed) = send(
        &t.app,
        Method::GET,
        "/api/documents/settings/qrcodes?active=true",
        Some(&t.member),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_blank_or_invalid_filters_are_ignored() {
    let t = setup().await;
    let current = WeekRange::current();

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/topman/summary?week_start=garbage&week_end=2025-01-12",
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["week"]["start"], current.start.to_string());

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/topman/tagging?week_start=&week_end=",
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["week"]["end"], current.end.to_string());

    for uri in [
        "/api/journal/entries?date_from=&date_to=",
        "/api/documents?status=",
        "/api/documents/history?action=bogus",
        "/api/documents/settings/templates?active=",
    ] {
        let (status, body) = send(&t.app, Method::GET, uri, Some(&t.member), None).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body["success"], true, "{}", uri);
    }

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/users?status=&role=",
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["totalItems"], 2);

    let (status, body) = send(
        &t.app,
        Method::GET,
        "/api/users?page=&limit=many",
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["page"], 1);
    assert_eq!(body["data"]["pagination"]["pageSize"], 10);
}

#[tokio::test]
async fn test_huge_page_number_does_not_overflow() {
    let t = setup().await;

    let (status, body) = send(
        &t.app,
        Method::GET,
        &format!("/api/users?page={}", i64::MAX),
        Some(&t.admin),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["data"]["pagination"]["totalItems"], 2);
}
