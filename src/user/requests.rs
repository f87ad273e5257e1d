use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::{models::users::Role, utils::assert_filled};

/// Admin-created account. Students register themselves instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl CreateStaffRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        assert_filled(&[&self.username, &self.name, &self.password])?;
        if self.role == Role::Student {
            bail!("Students must register themselves");
        }
        Ok(())
    }
}
