use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::utils::assert_filled;

pub const PASSWORD_MISMATCH_MSG: &str = "Passwords do not match";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        assert_filled(&[&self.username, &self.name, &self.password])?;
        if self.password != self.confirm_password {
            bail!(PASSWORD_MISMATCH_MSG);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            username: "ana".to_string(),
            name: "Ana Reyes".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let err = request("secret1", "secret2").validate().unwrap_err();
        assert_eq!(err.to_string(), PASSWORD_MISMATCH_MSG);
    }

    #[test]
    fn missing_fields_come_first() {
        let err = request("", "x").validate().unwrap_err();
        assert_eq!(err.to_string(), crate::utils::REQUIRED_FIELDS_MSG);
        assert!(request("secret", "secret").validate().is_ok());
    }

    #[test]
    fn confirm_password_uses_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"a","name":"b","password":"c","confirmPassword":"c"}"#,
        )
        .unwrap();
        assert_eq!(req.confirm_password, "c");
        assert_eq!(req.email, "");
    }
}
