use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::users::{Role, UserData};

/// What other roles may see about a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

impl UserProfile {
    pub fn from_data(data: UserData) -> anyhow::Result<Self> {
        Ok(Self {
            role: data.role.parse()?,
            id: data.id,
            username: data.username,
            name: data.name,
            email: data.email,
            created_at: data.created_at,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResponse {
    pub success: bool,
    pub error: String,
    pub user: Option<UserProfile>,
}

crate::impl_err_response! {
    UserResponse,
}
