//! Data Transfer Objects - request/response types for the API.

use serde::{Deserialize, Serialize};

/// Write view of a user, accepted by create and update.
///
/// Every field is optional on the wire; which ones are required depends on
/// the operation and is decided by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWriteRequest {
    pub email: Option<String>,
    #[serde(alias = "username", alias = "pseudo")]
    pub display_name: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "confirmed password")]
    pub confirmed_password: Option<String>,
}

/// Short reference to an article owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: i64,
    pub title: String,
}

/// Read view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub roles: Vec<String>,
    pub articles: Vec<ArticleSummary>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Pagination query parameters for collection endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u64>,
    pub items_per_page: Option<u64>,
}

/// One page of a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u64,
    pub items_per_page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_request_accepts_display_name_aliases() {
        let req: UserWriteRequest =
            serde_json::from_str(r#"{"email":"a@b.c","username":"jane"}"#).unwrap();
        assert_eq!(req.display_name.as_deref(), Some("jane"));

        let req: UserWriteRequest = serde_json::from_str(r#"{"pseudo":"jd"}"#).unwrap();
        assert_eq!(req.display_name.as_deref(), Some("jd"));
    }

    #[test]
    fn test_write_request_accepts_legacy_confirmation_name() {
        let req: UserWriteRequest = serde_json::from_str(
            r#"{"password":"Abcdef1","confirmed password":"Abcdef1"}"#,
        )
        .unwrap();
        assert_eq!(req.confirmed_password.as_deref(), Some("Abcdef1"));
    }

    #[test]
    fn test_user_view_is_camel_case() {
        let view = UserView {
            id: 1,
            email: "a@b.c".to_string(),
            display_name: None,
            roles: vec!["ROLE_USER".to_string()],
            articles: vec![],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("displayName").is_some());
        assert!(json.get("password").is_none());
    }
}
