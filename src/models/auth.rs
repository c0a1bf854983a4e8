use serde::Deserialize;

/// Response to `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub sid: String,
    #[serde(rename = "userData", default)]
    pub user: Option<UserData>,
}

/// Response to `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    #[serde(rename = "newAccessToken")]
    pub new_access_token: String,
    #[serde(rename = "newRefreshToken")]
    pub new_refresh_token: String,
    #[serde(rename = "newSid")]
    pub new_sid: String,
}

/// Response to `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub email: String,
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub email: String,
    pub id: String,
}
