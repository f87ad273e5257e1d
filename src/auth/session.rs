use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::models::users::Role;

/// The caller behind a request. Resolved from the bearer token on the
/// server; returned by login on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub name: String,
    pub role: Role,
}

impl Session {
    pub fn require_role(&self, roles: &[Role]) -> anyhow::Result<()> {
        if !roles.contains(&self.role) {
            bail!("Permission denied");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_check() {
        let session = Session {
            token: "t".to_string(),
            user_id: 1,
            username: "frontdesk1".to_string(),
            name: "Desk".to_string(),
            role: Role::FrontDesk,
        };
        assert!(session.require_role(&[Role::Admin, Role::FrontDesk]).is_ok());
        let err = session.require_role(&[Role::Admin]).unwrap_err();
        assert_eq!(err.to_string(), "Permission denied");
    }
}
