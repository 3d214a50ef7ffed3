// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles account CRUD, admin filters, activation, and statistics

use chrono::{Duration, Utc};
use docuapp_core::generate_id;
use docuapp_storage::{like_pattern, StorageError};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::password::hash_password;
use crate::types::{
    User, UserCreateInput, UserFilter, UserRoleFilter, UserStats, UserStatusFilter,
    UserUpdateInput,
};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or_else(|| StorageError::not_found("User"))?;

        row_to_user(&row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        debug!("Fetching user by username: {}", username);

        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Create an account after checking the password confirmation and uniqueness
    pub async fn create_user(&self, input: UserCreateInput) -> Result<User, StorageError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_string();

        if username.is_empty() {
            return Err(StorageError::validation("Username is required."));
        }
        if email.is_empty() {
            return Err(StorageError::validation("Email is required."));
        }
        if input.password.is_empty() {
            return Err(StorageError::validation("Password is required."));
        }
        if input.password != input.confirm_password {
            return Err(StorageError::validation("Passwords do not match."));
        }

        self.ensure_unique("username", &username, None).await?;
        self.ensure_unique("email", &email, None).await?;

        let user_id = generate_id("usr");
        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();

        debug!("Creating user: {} (username: {})", user_id, username);

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash,
                               is_staff, is_superuser, is_active, date_joined)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(&username)
        .bind(&email)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(&password_hash)
        .bind(input.is_staff)
        .bind(input.is_superuser)
        .bind(input.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::on_write(e, "A user with that username or email already exists."))?;

        self.get_user(&user_id).await
    }

    /// List users matching `filter`, newest first
    pub async fn list_users_paginated(
        &self,
        filter: &UserFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<User>, i64), StorageError> {
        debug!(
            "Fetching users (filter: {:?}, limit: {:?}, offset: {:?})",
            filter, limit, offset
        );

        let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users WHERE 1 = 1");
        push_user_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM users WHERE 1 = 1");
        push_user_filters(&mut query, filter);
        query.push(" ORDER BY date_joined DESC");
        if let Some(lim) = limit {
            query.push(" LIMIT ").push_bind(lim);
        }
        if let Some(off) = offset {
            query.push(" OFFSET ").push_bind(off);
        }

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let users = rows.iter().map(row_to_user).collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        input: UserUpdateInput,
    ) -> Result<User, StorageError> {
        debug!("Updating user: {}", user_id);

        // Existence check first so a missing user is a 404, not a no-op
        self.get_user(user_id).await?;

        let mut query_builder = QueryBuilder::<Sqlite>::new("UPDATE users SET id = id");

        if let Some(username) = input.username.map(|u| u.trim().to_string()) {
            if username.is_empty() {
                return Err(StorageError::validation("Username is required."));
            }
            self.ensure_unique("username", &username, Some(user_id)).await?;
            query_builder.push(", username = ").push_bind(username);
        }
        if let Some(email) = input.email.map(|e| e.trim().to_string()) {
            if email.is_empty() {
                return Err(StorageError::validation("Email is required."));
            }
            self.ensure_unique("email", &email, Some(user_id)).await?;
            query_builder.push(", email = ").push_bind(email);
        }
        if let Some(first_name) = input.first_name {
            query_builder.push(", first_name = ").push_bind(first_name.trim().to_string());
        }
        if let Some(last_name) = input.last_name {
            query_builder.push(", last_name = ").push_bind(last_name.trim().to_string());
        }
        if let Some(is_staff) = input.is_staff {
            query_builder.push(", is_staff = ").push_bind(is_staff);
        }
        if let Some(is_superuser) = input.is_superuser {
            query_builder.push(", is_superuser = ").push_bind(is_superuser);
        }
        if let Some(is_active) = input.is_active {
            query_builder.push(", is_active = ").push_bind(is_active);
        }

        query_builder.push(" WHERE id = ").push_bind(user_id.to_string());

        query_builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::on_write(e, "A user with that username or email already exists."))?;

        self.get_user(user_id).await
    }

    /// Flip `is_active`; an admin cannot deactivate their own account
    pub async fn toggle_active(&self, user_id: &str, acting_user_id: &str) -> Result<User, StorageError> {
        if user_id == acting_user_id {
            return Err(StorageError::forbidden("You cannot deactivate your own account."));
        }

        let user = self.get_user(user_id).await?;
        debug!("Toggling active flag for user: {} (was {})", user_id, user.is_active);

        sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(!user.is_active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get_user(user_id).await
    }

    pub async fn reset_password(
        &self,
        user_id: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, StorageError> {
        if password.is_empty() {
            return Err(StorageError::validation("Password is required."));
        }
        if password != confirm_password {
            return Err(StorageError::validation("Passwords do not match."));
        }

        self.get_user(user_id).await?;
        debug!("Resetting password for user: {}", user_id);

        let password_hash = hash_password(password)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        self.get_user(user_id).await
    }

    /// Delete an account; an admin cannot delete their own account
    pub async fn delete_user(&self, user_id: &str, acting_user_id: &str) -> Result<User, StorageError> {
        if user_id == acting_user_id {
            return Err(StorageError::forbidden("You cannot delete your own account."));
        }

        let user = self.get_user(user_id).await?;
        debug!("Deleting user: {}", user_id);

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    pub async fn stats(&self) -> Result<UserStats, StorageError> {
        let since = Utc::now() - Duration::days(30);

        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_users,
                COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0) AS active_users,
                COALESCE(SUM(CASE WHEN is_staff = 1 OR is_superuser = 1 THEN 1 ELSE 0 END), 0) AS admin_users,
                COALESCE(SUM(CASE WHEN date_joined >= ? THEN 1 ELSE 0 END), 0) AS recent_users
            FROM users
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(UserStats {
            total_users: row.try_get("total_users")?,
            active_users: row.try_get("active_users")?,
            admin_users: row.try_get("admin_users")?,
            recent_users: row.try_get("recent_users")?,
        })
    }

    /// Create an admin account, or promote and re-password an existing one
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
        superuser: bool,
    ) -> Result<User, StorageError> {
        match self.get_user_by_username(username).await? {
            Some(existing) => {
                debug!("Promoting existing user to admin: {}", existing.id);
                self.update_user(
                    &existing.id,
                    UserUpdateInput {
                        email: Some(email.to_string()),
                        is_staff: Some(true),
                        is_superuser: Some(superuser || existing.is_superuser),
                        is_active: Some(true),
                        ..Default::default()
                    },
                )
                .await?;
                self.reset_password(&existing.id, password, password).await
            }
            None => {
                self.create_user(UserCreateInput {
                    username: username.to_string(),
                    email: email.to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    password: password.to_string(),
                    confirm_password: password.to_string(),
                    is_staff: true,
                    is_superuser: superuser,
                    is_active: true,
                })
                .await
            }
        }
    }

    async fn ensure_unique(
        &self,
        column: &'static str,
        value: &str,
        exclude_id: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users WHERE ");
        query.push(column).push(" = ").push_bind(value.to_string());
        if let Some(id) = exclude_id {
            query.push(" AND id != ").push_bind(id.to_string());
        }

        let count: i64 = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if count > 0 {
            return Err(StorageError::Duplicate(format!(
                "A user with that {} already exists.",
                column
            )));
        }
        Ok(())
    }
}

fn push_user_filters(query: &mut QueryBuilder<'_, Sqlite>, filter: &UserFilter) {
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        query.push(" AND (username LIKE ");
        query.push_bind(pattern.clone()).push(" ESCAPE '\\'");
        query.push(" OR first_name LIKE ");
        query.push_bind(pattern.clone()).push(" ESCAPE '\\'");
        query.push(" OR last_name LIKE ");
        query.push_bind(pattern.clone()).push(" ESCAPE '\\'");
        query.push(" OR email LIKE ");
        query.push_bind(pattern).push(" ESCAPE '\\')");
    }

    match filter.status {
        UserStatusFilter::All => {}
        UserStatusFilter::Active => {
            query.push(" AND is_active = 1");
        }
        UserStatusFilter::Inactive => {
            query.push(" AND is_active = 0");
        }
    }

    match filter.role {
        UserRoleFilter::All => {}
        UserRoleFilter::Admin => {
            query.push(" AND (is_staff = 1 OR is_superuser = 1)");
        }
        UserRoleFilter::User => {
            query.push(" AND is_staff = 0 AND is_superuser = 0");
        }
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        password_hash: row.try_get("password_hash")?,
        is_staff: row.try_get("is_staff")?,
        is_superuser: row.try_get("is_superuser")?,
        is_active: row.try_get("is_active")?,
        date_joined: row.try_get("date_joined")?,
    })
}
