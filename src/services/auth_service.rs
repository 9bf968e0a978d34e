use tracing::{info, instrument};
use validator::Validate;

use crate::dto::auth_dto::{LoginPayload, LoginResponse, RegisterPayload};
use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::Role;

#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Signs in and stores the returned token and user under `role`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, role: Role, email: &str, password: &str) -> Result<LoginResponse> {
        let payload = LoginPayload {
            email: email.to_string(),
            password: password.to_string(),
        };
        payload.validate()?;

        let response: LoginResponse = self
            .gateway
            .fetch(ApiRequest::post(format!("/{}/auth/login", role)).json(&payload)?)
            .await?;
        self.gateway
            .sessions()
            .set_session(role, response.token.clone(), response.user.clone())?;

        info!(%role, user_id = response.user.id, "Signed in");
        Ok(response)
    }

    #[instrument(skip(self, payload), fields(email = %payload.email))]
    pub async fn register(
        &self,
        role: Role,
        payload: &RegisterPayload,
    ) -> Result<Option<serde_json::Value>> {
        payload.validate()?;
        self.gateway
            .call(ApiRequest::post(format!("/{}/auth/register", role)).json(payload)?)
            .await
    }

    pub async fn register_and_login(
        &self,
        role: Role,
        payload: &RegisterPayload,
    ) -> Result<LoginResponse> {
        self.register(role, payload).await?;
        self.login(role, &payload.email, &payload.password).await
    }

    pub fn logout(&self, role: Role) -> Result<()> {
        self.gateway.sessions().clear_session(role)?;
        info!(%role, "Signed out");
        Ok(())
    }
}
