// ABOUTME: User type definitions
// ABOUTME: Structures for user accounts, admin filters, and statistics

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// First and last name joined, trimmed (may be empty)
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Full name, falling back to the username
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    /// Staff and superusers may use the administrative features
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreateInput {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdateInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRoleFilter {
    #[default]
    All,
    Admin,
    User,
}

impl FromStr for UserStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(UserStatusFilter::All),
            "active" => Ok(UserStatusFilter::Active),
            "inactive" => Ok(UserStatusFilter::Inactive),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}

impl FromStr for UserRoleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(UserRoleFilter::All),
            "admin" => Ok(UserRoleFilter::Admin),
            "user" => Ok(UserRoleFilter::User),
            _ => Err(format!("Invalid role filter: {}", s)),
        }
    }
}

/// Filters for the admin user listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "docuapp_core::lenient_or_default")]
    pub status: UserStatusFilter,
    #[serde(default, deserialize_with = "docuapp_core::lenient_or_default")]
    pub role: UserRoleFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    pub active_users: i64,
    pub admin_users: i64,
    /// Users who joined during the last 30 days
    pub recent_users: i64,
}
