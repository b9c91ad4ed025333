//! `/auth` endpoints

use crate::api::client::ApiClient;
use crate::api::models::{LoginResponse, MessageResponse};
use crate::error::{ApiError, Result};
use serde_json::json;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

impl AuthApi<'_> {
    /// Log in and store whatever tokens come back
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = json!({ "email": email, "wachtwoord": password });
        let response: LoginResponse = self.client.post("/auth/login", Some(body)).await?;

        self.client.tokens().set_tokens(
            response.token.as_deref(),
            response.refresh_token.as_deref(),
        )?;
        log::info!("Logged in as {}", email);
        Ok(response)
    }

    /// Log out on the server, then forget the local tokens
    pub async fn logout(&self) -> Result<MessageResponse> {
        let response: MessageResponse = self.client.post("/auth/logout", None).await?;
        self.client.clear_auth()?;
        log::info!("Logged out");
        Ok(response)
    }

    pub async fn profile(&self) -> Result<serde_json::Value> {
        self.client.get("/auth/profile").await
    }

    pub async fn reset_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        let body = json!({
            "huidig_wachtwoord": current_password,
            "nieuw_wachtwoord": new_password,
        });
        self.client.post("/auth/reset-password", Some(body)).await
    }

    /// Trade the stored refresh token for a new access token
    pub async fn refresh(&self) -> Result<LoginResponse> {
        let refresh_token = self.client.tokens().refresh_token().ok_or_else(|| {
            ApiError::invalid_parameter("refresh_token", "No refresh token stored")
        })?;

        let body = json!({ "refresh_token": refresh_token });
        let response: LoginResponse = self.client.post("/auth/refresh", Some(body)).await?;

        self.client.tokens().set_tokens(
            response.token.as_deref(),
            response.refresh_token.as_deref(),
        )?;
        log::debug!("Access token refreshed");
        Ok(response)
    }
}
