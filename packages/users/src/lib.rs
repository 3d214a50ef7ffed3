// ABOUTME: User accounts and administration
// ABOUTME: Provides types, password hashing, and storage for users

pub mod password;
pub mod storage;
pub mod types;

// Re-export main types
pub use password::hash_password;
pub use storage::UserStorage;
pub use types::{
    User, UserCreateInput, UserFilter, UserRoleFilter, UserStats, UserStatusFilter,
    UserUpdateInput,
};
