//! Account settings: profile, notifications, two-factor auth and password

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, RequestOptions};
use super::error::ClientError;
use super::models::MessageResponse;
use super::transport::{HttpTransport, Method};
use crate::core::auth::Role;
use crate::core::auth::models::deserialize_role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
    PendingVerification,
    Deactivated,
}

/// Full profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: Role,
    pub status: AccountStatus,
    pub email_verified: bool,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub educator_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub email_notifications: bool,
    pub class_reminders: bool,
    pub student_enrollments: bool,
    pub marketing_emails: bool,
    pub weekly_digest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetup {
    pub secret: String,
    pub qr_code_uri: String,
    pub manual_entry_key: String,
    pub issuer: String,
    pub account_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorStatus {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorVerifyRequest {
    pub secret: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoFactorVerifyResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Client for `/v1/user/settings/...` and `/v1/user/2fa/...`
#[derive(Clone)]
pub struct SettingsApi<T> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> SettingsApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    // Profile

    pub async fn get_profile(&self) -> Result<UserProfile, ClientError> {
        self.client.get("/v1/user/settings/profile").await
    }

    pub async fn update_profile(
        &self,
        data: &UpdateProfileRequest,
    ) -> Result<UserProfile, ClientError> {
        self.client
            .send_json(Method::Put, "/v1/user/settings/profile", data)
            .await
    }

    // Notifications

    pub async fn get_notification_preferences(
        &self,
    ) -> Result<NotificationPreferences, ClientError> {
        self.client.get("/v1/user/settings/notifications").await
    }

    pub async fn update_notification_preferences(
        &self,
        data: &NotificationPreferences,
    ) -> Result<NotificationPreferences, ClientError> {
        self.client
            .send_json(Method::Put, "/v1/user/settings/notifications", data)
            .await
    }

    // Account

    pub async fn resend_verification_email(&self) -> Result<MessageResponse, ClientError> {
        self.client
            .request(
                Method::Post,
                "/v1/user/settings/resend-verification",
                RequestOptions::new(),
            )
            .await
    }

    pub async fn deactivate_account(&self) -> Result<MessageResponse, ClientError> {
        self.client
            .request(
                Method::Delete,
                "/v1/user/settings/account",
                RequestOptions::new(),
            )
            .await
    }

    // Two-factor authentication

    pub async fn get_two_factor_setup(&self) -> Result<TwoFactorSetup, ClientError> {
        self.client.get("/v1/user/2fa/setup").await
    }

    pub async fn get_two_factor_status(&self) -> Result<TwoFactorStatus, ClientError> {
        self.client.get("/v1/user/2fa/status").await
    }

    pub async fn verify_and_enable_two_factor(
        &self,
        data: &TwoFactorVerifyRequest,
    ) -> Result<TwoFactorVerifyResponse, ClientError> {
        self.client
            .send_json(Method::Post, "/v1/user/2fa/verify", data)
            .await
    }

    pub async fn disable_two_factor(&self) -> Result<MessageResponse, ClientError> {
        self.client
            .request(Method::Delete, "/v1/user/2fa", RequestOptions::new())
            .await
    }

    // Password

    pub async fn change_password(
        &self,
        data: &ChangePasswordRequest,
    ) -> Result<MessageResponse, ClientError> {
        self.client
            .send_json(Method::Post, "/v1/user/settings/change-password", data)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::mock::MockTransport;
    use crate::core::config::ClientConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn api() -> (SettingsApi<Arc<MockTransport>>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::new(&ClientConfig::with_api_url("http://api.test"), transport.clone());
        (SettingsApi::new(client), transport)
    }

    #[tokio::test]
    async fn test_get_profile_decodes() {
        let (api, transport) = api();
        transport.push_json(
            200,
            json!({
                "id": "u1",
                "firstName": "Ana",
                "lastName": "Silva",
                "email": "ana@lumera.io",
                "phone": null,
                "bio": null,
                "avatarUrl": null,
                "role": "EDUCATOR",
                "status": "PENDING_VERIFICATION",
                "emailVerified": false,
                "timezone": "Europe/Lisbon",
                "specialty": "Brows",
                "website": null,
                "instagram": null,
                "educatorVerified": true,
                "createdAt": "2024-11-02T08:00:00Z"
            }),
        );

        let profile = api.get_profile().await.unwrap();

        assert_eq!(profile.role, Role::Educator);
        assert_eq!(profile.status, AccountStatus::PendingVerification);
        assert_eq!(profile.timezone.as_deref(), Some("Europe/Lisbon"));
        assert_eq!(
            transport.last_request().url,
            "http://api.test/v1/user/settings/profile"
        );
    }

    #[tokio::test]
    async fn test_update_profile_sends_only_changed_fields() {
        let (api, transport) = api();
        transport.push_raw(500, b"oops");

        let request = UpdateProfileRequest {
            bio: Some("Lash artist".to_string()),
            ..Default::default()
        };
        let err = api.update_profile(&request).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.body.as_deref(), Some(r#"{"bio":"Lash artist"}"#));
    }

    #[tokio::test]
    async fn test_notification_preferences_round_trip_through_server() {
        let (api, transport) = api();
        let prefs = NotificationPreferences {
            email_notifications: true,
            class_reminders: true,
            ..Default::default()
        };
        transport.push_json(200, serde_json::to_value(prefs).unwrap());

        let saved = api.update_notification_preferences(&prefs).await.unwrap();

        assert_eq!(saved, prefs);
        assert!(
            transport
                .last_request()
                .body
                .unwrap()
                .contains(r#""classReminders":true"#)
        );
    }

    #[tokio::test]
    async fn test_two_factor_endpoints() {
        let (api, transport) = api();
        transport.push_json(200, json!({"enabled": false}));
        transport.push_json(200, json!({"success": true, "message": "enabled"}));
        transport.push_json(200, json!({"message": "disabled"}));

        assert!(!api.get_two_factor_status().await.unwrap().enabled);

        let verify = api
            .verify_and_enable_two_factor(&TwoFactorVerifyRequest {
                secret: "JBSWY3DP".to_string(),
                code: "123456".to_string(),
            })
            .await
            .unwrap();
        assert!(verify.success);

        let disabled = api.disable_two_factor().await.unwrap();
        assert_eq!(disabled.message, "disabled");
        let sent = transport.last_request();
        assert_eq!(sent.method, Method::Delete);
        assert!(sent.url.ends_with("/v1/user/2fa"));
    }

    #[tokio::test]
    async fn test_change_password_validation_error() {
        let (api, transport) = api();
        transport.push_json(
            400,
            json!({
                "status": 400,
                "error": "Bad Request",
                "message": "Validation failed",
                "validationErrors": {"newPassword": "must be at least 8 characters"}
            }),
        );

        let err = api
            .change_password(&ChangePasswordRequest {
                current_password: "old".to_string(),
                new_password: "short".to_string(),
                confirm_password: "short".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.display_message("Failed to change password"),
            "must be at least 8 characters"
        );
    }
}
