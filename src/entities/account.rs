//! Admin and entrepreneur accounts
//!
//! Credential handling (hashing, token issuing) lives outside this crate;
//! these rows only hold the profile an account is created with.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Marketplace administrator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Admin {
    pub id: i64,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    pub password: String,
    pub title: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

/// Shop owner; deleting one removes every shop they own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Entrepreneur {
    pub id: i64,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    pub password: String,
    pub phone_number: String,
    pub title: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
}

impl Entrepreneur {
    /// "Title First Middle Last", skipping empty parts
    pub fn display_name(&self) -> String {
        [
            self.title.as_str(),
            self.first_name.as_str(),
            self.middle_name.as_str(),
            self.last_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

crate::impl_records! {
    Admin => "admin",
    Entrepreneur => "entrepreneur",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_skips_blank_parts() {
        let owner = Entrepreneur {
            title: "Ms".to_string(),
            first_name: "Nok".to_string(),
            last_name: "Siri".to_string(),
            ..Default::default()
        };
        assert_eq!(owner.display_name(), "Ms Nok Siri");
    }

    #[test]
    fn test_username_is_required() {
        assert!(Admin::default().validate().is_err());
        let admin = Admin {
            username: "root".to_string(),
            ..Default::default()
        };
        assert!(admin.validate().is_ok());
    }
}
