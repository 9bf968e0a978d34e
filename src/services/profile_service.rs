use crate::dto::profile_dto::UpdateProfilePayload;
use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{Role, User};

#[derive(Clone)]
pub struct ProfileService {
    gateway: Gateway,
}

impl ProfileService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get_profile(&self, role: Role) -> Result<User> {
        self.gateway
            .fetch(ApiRequest::get(format!("/{}/auth/profile", role)).role(role))
            .await
    }

    pub async fn update_profile(&self, role: Role, payload: &UpdateProfilePayload) -> Result<User> {
        self.gateway
            .fetch(
                ApiRequest::put(format!("/{}/auth/profile", role))
                    .role(role)
                    .json(payload)?,
            )
            .await
    }
}
