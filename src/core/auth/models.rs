//! Auth request/response shapes and roles

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::api::settings::UserProfile;

/// Path of the login page unauthenticated users are sent to
pub const LOGIN_PATH: &str = "/login";

/// Account role
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "student", alias = "Student")]
    #[display("STUDENT")]
    #[default]
    Student,
    #[serde(alias = "educator", alias = "Educator")]
    #[display("EDUCATOR")]
    Educator,
    #[serde(alias = "admin", alias = "Admin")]
    #[display("ADMIN")]
    Admin,
}

impl Role {
    /// Case-insensitive parse; unknown names are `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "educator" => Some(Role::Educator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Landing dashboard for this role
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Student => "/student",
            Role::Educator => "/educator",
            Role::Admin => "/admin",
        }
    }
}

/// Role field of a server user record
///
/// Unknown, null or missing roles read as `Student`.
pub(crate) fn deserialize_role<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Role::parse).unwrap_or_default())
}

/// Dashboard to send a user to after login
///
/// Case-insensitive; unknown or missing roles land on `/student`.
pub fn dashboard_path(role: Option<&str>) -> &'static str {
    role.and_then(Role::parse)
        .unwrap_or(Role::Student)
        .dashboard_path()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// `Student` or `Educator`; admins are not self-registered
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Snapshot of the authenticated principal kept with the tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl SessionUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl From<&AuthUser> for SessionUser {
    fn from(user: &AuthUser) -> Self {
        SessionUser {
            id: Some(user.id.clone()),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Login / register / refresh response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: SessionUser,
}

/// Full user returned by `GET /v1/auth/me`
pub type AuthUser = UserProfile;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dashboard_path_case_insensitive() {
        assert_eq!(dashboard_path(Some("EDUCATOR")), "/educator");
        assert_eq!(dashboard_path(Some("admin")), "/admin");
        assert_eq!(dashboard_path(Some("Student")), "/student");
    }

    #[test]
    fn test_dashboard_path_defaults_to_student() {
        assert_eq!(dashboard_path(None), "/student");
        assert_eq!(dashboard_path(Some("")), "/student");
        assert_eq!(dashboard_path(Some("superuser")), "/student");
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_value(Role::Educator).unwrap(), json!("EDUCATOR"));
        assert_eq!(
            serde_json::from_value::<Role>(json!("admin")).unwrap(),
            Role::Admin
        );
        assert!(serde_json::from_value::<Role>(json!("OWNER")).is_err());
    }

    #[test]
    fn test_auth_response_decodes() {
        let response: AuthResponse = serde_json::from_value(json!({
            "accessToken": "a",
            "refreshToken": "r",
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "user": {
                "id": null,
                "email": "ana@lumera.io",
                "firstName": "Ana",
                "lastName": "Silva",
                "role": "STUDENT",
                "avatarUrl": null
            }
        }))
        .unwrap();

        assert_eq!(response.expires_in, 3600);
        assert_eq!(response.user.id, None);
        assert_eq!(response.user.full_name(), "Ana Silva");
    }

    #[test]
    fn test_unknown_or_missing_user_role_reads_as_student() {
        let unknown: SessionUser = serde_json::from_value(json!({
            "email": "ana@lumera.io",
            "firstName": "Ana",
            "lastName": "Silva",
            "role": "MODERATOR"
        }))
        .unwrap();
        let missing: SessionUser = serde_json::from_value(json!({
            "email": "ana@lumera.io",
            "firstName": "Ana",
            "lastName": "Silva"
        }))
        .unwrap();
        let lowercase: SessionUser = serde_json::from_value(json!({
            "email": "ana@lumera.io",
            "firstName": "Ana",
            "lastName": "Silva",
            "role": "educator"
        }))
        .unwrap();

        assert_eq!(unknown.role, Role::Student);
        assert_eq!(missing.role, Role::Student);
        assert_eq!(lowercase.role, Role::Educator);
    }

    #[test]
    fn test_register_request_skips_optional_fields() {
        let request = RegisterRequest {
            first_name: "Maya".to_string(),
            last_name: "Chen".to_string(),
            email: "maya@lumera.io".to_string(),
            password: "s3cret-pass".to_string(),
            role: Role::Educator,
            phone: None,
            specialty: Some("Makeup".to_string()),
            bio: None,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "firstName": "Maya",
                "lastName": "Chen",
                "email": "maya@lumera.io",
                "password": "s3cret-pass",
                "role": "EDUCATOR",
                "specialty": "Makeup"
            })
        );
    }
}
