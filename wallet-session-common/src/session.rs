//! Login and logout payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /user/login`.
///
/// `wallet_address` is kept as a raw JSON value so that a non-string value
/// reaches validation instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub wallet_address: Option<serde_json::Value>,
}

/// How a login was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginAction {
    ExistingUserLogin,
    NewUserRegisteredAndLogin,
}


/// `data` of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub id: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub created_date: DateTime<Utc>,
    pub permission: String,
    pub joined: bool,
    pub action: LoginAction,
    pub token: String,
}

/// `data` of a successful logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutData {
    #[serde(rename = "publicKey")]
    pub public_key: String,
    pub joined: bool,
    #[serde(rename = "loggedOutAt")]
    pub logged_out_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_action_wire_names() {
        assert_eq!(
            serde_json::to_value(LoginAction::ExistingUserLogin).unwrap(),
            "existing_user_login"
        );
        assert_eq!(
            serde_json::to_value(LoginAction::NewUserRegisteredAndLogin).unwrap(),
            "new_user_registered_and_login"
        );
    }

    #[test]
    fn test_login_request_keeps_non_string_address() {
        let request: LoginRequest = serde_json::from_str(r#"{"wallet_address": 123}"#).unwrap();
        assert_eq!(request.wallet_address, Some(serde_json::json!(123)));
    }

    #[test]
    fn test_login_request_missing_address() {
        let request: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(request.wallet_address.is_none());
    }

    #[test]
    fn test_login_data_field_names() {
        let data = LoginData {
            id: "abc".to_string(),
            public_key: "kaspa_qwerty".to_string(),
            created_date: Utc::now(),
            permission: "user".to_string(),
            joined: true,
            action: LoginAction::ExistingUserLogin,
            token: "t".to_string(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["publicKey"], "kaspa_qwerty");
        assert!(json.get("created_date").is_some());
        assert_eq!(json["action"], "existing_user_login");
    }

    #[test]
    fn test_logout_data_field_names() {
        let data = LogoutData {
            public_key: "kaspa_qwerty".to_string(),
            joined: false,
            logged_out_at: Utc::now(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["publicKey"], "kaspa_qwerty");
        assert_eq!(json["joined"], false);
        assert!(json.get("loggedOutAt").is_some());
    }
}
