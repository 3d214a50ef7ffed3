// ABOUTME: Integration tests for the user storage layer
// ABOUTME: Runs against an in-memory SQLite database with the real migrations

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use docuapp_storage::{connect_in_memory, StorageError};
use docuapp_users::{
    UserCreateInput, UserFilter, UserRoleFilter, UserStatusFilter, UserStorage, UserUpdateInput,
};

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

async fn setup_storage() -> UserStorage {
    let pool = connect_in_memory().await.unwrap();
    UserStorage::new(pool)
}

fn input(username: &str, email: &str) -> UserCreateInput {
    UserCreateInput {
        username: username.to_string(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        password: "pa55word".to_string(),
        confirm_password: "pa55word".to_string(),
        is_staff: false,
        is_superuser: false,
        is_active: true,
    }
}

#[tokio::test]
async fn test_create_and_get_user() {
    let storage = setup_storage().await;

    let user = storage.create_user(input("alice", "alice@example.com")).await.unwrap();
    assert!(user.id.starts_with("usr-"));
    assert_eq!(user.username, "alice");
    assert!(user.is_active);
    assert!(!user.is_admin());
    assert!(verify_password("pa55word", &user.password_hash));

    let fetched = storage.get_user(&user.id).await.unwrap();
    assert_eq!(fetched.email, "alice@example.com");

    let by_name = storage.get_user_by_username("alice").await.unwrap();
    assert_eq!(by_name.map(|u| u.id), Some(user.id));
    assert!(storage.get_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_rejects_mismatched_passwords() {
    let storage = setup_storage().await;

    let mut bad = input("bob", "bob@example.com");
    bad.confirm_password = "different".to_string();

    let result = storage.create_user(bad).await;
    assert!(matches!(result, Err(StorageError::Validation(_))));
}

#[tokio::test]
async fn test_create_rejects_duplicates() {
    let storage = setup_storage().await;
    storage.create_user(input("carol", "carol@example.com")).await.unwrap();

    let same_name = storage.create_user(input("carol", "other@example.com")).await;
    assert!(matches!(same_name, Err(StorageError::Duplicate(_))));

    let same_email = storage.create_user(input("carol2", "carol@example.com")).await;
    assert!(matches!(same_email, Err(StorageError::Duplicate(_))));
}

#[tokio::test]
async fn test_get_missing_user_is_not_found() {
    let storage = setup_storage().await;
    let result = storage.get_user("usr-missing").await;
    assert!(matches!(result, Err(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_list_filters_and_pagination() {
    let storage = setup_storage().await;

    let mut admin = input("admin", "admin@example.com");
    admin.is_staff = true;
    storage.create_user(admin).await.unwrap();

    let mut inactive = input("dormant", "dormant@corp.example");
    inactive.is_active = false;
    storage.create_user(inactive).await.unwrap();

    for i in 0..3 {
        storage
            .create_user(input(&format!("user{}", i), &format!("user{}@example.com", i)))
            .await
            .unwrap();
    }

    let (all, total) = storage
        .list_users_paginated(&UserFilter::default(), Some(10), Some(0))
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(all.len(), 5);

    let (page, total) = storage
        .list_users_paginated(&UserFilter::default(), Some(2), Some(4))
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 1);

    let admins = UserFilter {
        role: UserRoleFilter::Admin,
        ..Default::default()
    };
    let (found, _) = storage.list_users_paginated(&admins, None, None).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "admin");

    let inactive_only = UserFilter {
        status: UserStatusFilter::Inactive,
        ..Default::default()
    };
    let (found, _) = storage
        .list_users_paginated(&inactive_only, None, None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "dormant");

    let search = UserFilter {
        search: Some("CORP.example".to_string()),
        ..Default::default()
    };
    let (found, total) = storage.list_users_paginated(&search, None, None).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(found[0].username, "dormant");
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() {
    let storage = setup_storage().await;
    storage.create_user(input("plain", "plain@example.com")).await.unwrap();

    let search = UserFilter {
        search: Some("%".to_string()),
        ..Default::default()
    };
    let (found, _) = storage.list_users_paginated(&search, None, None).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_update_checks_uniqueness_excluding_self() {
    let storage = setup_storage().await;
    let dave = storage.create_user(input("dave", "dave@example.com")).await.unwrap();
    storage.create_user(input("erin", "erin@example.com")).await.unwrap();

    // Re-saving your own username is fine
    let updated = storage
        .update_user(
            &dave.id,
            UserUpdateInput {
                username: Some("dave".to_string()),
                first_name: Some("David".to_string()),
                is_staff: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "David");
    assert!(updated.is_admin());

    let clash = storage
        .update_user(
            &dave.id,
            UserUpdateInput {
                email: Some("erin@example.com".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(clash, Err(StorageError::Duplicate(_))));
}

#[tokio::test]
async fn test_toggle_and_delete_refuse_self() {
    let storage = setup_storage().await;
    let admin = storage.create_user(input("root", "root@example.com")).await.unwrap();
    let other = storage.create_user(input("frank", "frank@example.com")).await.unwrap();

    let result = storage.toggle_active(&admin.id, &admin.id).await;
    assert!(matches!(result, Err(StorageError::Forbidden(_))));

    let toggled = storage.toggle_active(&other.id, &admin.id).await.unwrap();
    assert!(!toggled.is_active);
    let toggled = storage.toggle_active(&other.id, &admin.id).await.unwrap();
    assert!(toggled.is_active);

    let result = storage.delete_user(&admin.id, &admin.id).await;
    assert!(matches!(result, Err(StorageError::Forbidden(_))));

    storage.delete_user(&other.id, &admin.id).await.unwrap();
    assert!(matches!(
        storage.get_user(&other.id).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_reset_password() {
    let storage = setup_storage().await;
    let user = storage.create_user(input("gina", "gina@example.com")).await.unwrap();

    let mismatch = storage.reset_password(&user.id, "newpass", "oops").await;
    assert!(matches!(mismatch, Err(StorageError::Validation(_))));

    let updated = storage.reset_password(&user.id, "newpass", "newpass").await.unwrap();
    assert!(verify_password("newpass", &updated.password_hash));
    assert!(!verify_password("pa55word", &updated.password_hash));
}

#[tokio::test]
async fn test_stats() {
    let storage = setup_storage().await;

    let mut admin = input("boss", "boss@example.com");
    admin.is_superuser = true;
    storage.create_user(admin).await.unwrap();

    let mut inactive = input("gone", "gone@example.com");
    inactive.is_active = false;
    storage.create_user(inactive).await.unwrap();

    storage.create_user(input("hank", "hank@example.com")).await.unwrap();

    let stats = storage.stats().await.unwrap();
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.admin_users, 1);
    assert_eq!(stats.recent_users, 3);
}

#[tokio::test]
async fn test_ensure_admin_creates_then_promotes() {
    let storage = setup_storage().await;

    let created = storage
        .ensure_admin("chief", "chief@example.com", "s3cret", false)
        .await
        .unwrap();
    assert!(created.is_staff);
    assert!(!created.is_superuser);

    let promoted = storage
        .ensure_admin("chief", "chief@example.com", "n3w", true)
        .await
        .unwrap();
    assert_eq!(promoted.id, created.id);
    assert!(promoted.is_superuser);
    assert!(verify_password("n3w", &promoted.password_hash));
}
