use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub email: String,
    /// argon2 PHC string
    pub password: String,
    pub department: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user as handed to the store for insertion, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub department: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserPatch {
    #[schema(example = "engineering")]
    pub department: Option<String>,
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.name.is_none()
    }
}

/// Public projection of a user, never carries the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "email": "jane@example.com",
    "department": "engineering",
    "name": "Jane Doe",
    "role": "employee"
}))]
pub struct UserResponse {
    pub id: u64,
    pub email: String,
    pub department: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            department: user.department.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            department: user.department,
            name: user.name,
            role: user.role,
        }
    }
}
