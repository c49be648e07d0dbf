use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Form body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(rename = "redirectTo", default)]
    pub redirect_to: Option<String>,
}

/// Form body for login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(rename = "redirectTo", default)]
    pub redirect_to: Option<String>,
}

/// Form body for requesting a password reset.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Form body for completing a password reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
}

/// Response after a reset request. Identical for known and unknown
/// addresses; `previewUrl` only appears with the development mail transport.
#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub ok: bool,
    #[serde(rename = "previewUrl", skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}
