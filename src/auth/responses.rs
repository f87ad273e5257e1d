use serde::{Deserialize, Serialize};

use crate::{auth::session::Session, models::users::Role};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub success: bool,
    pub error: String,
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl LoginResponse {
    pub fn into_session(self) -> Session {
        Session {
            token: self.token,
            user_id: self.user_id,
            username: self.username,
            name: self.name,
            role: self.role,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterResponse {
    pub success: bool,
    pub error: String,
    pub user_id: i32,
}

crate::impl_err_response! {
    LoginResponse,
    RegisterResponse,
}
