use crate::dto::application_dto::ApplyPayload;
use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{Application, ApplicationStatus, Role};

#[derive(Clone)]
pub struct ApplicationService {
    gateway: Gateway,
}

impl ApplicationService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn apply(&self, job_id: i64) -> Result<Option<Application>> {
        self.gateway
            .call(
                ApiRequest::post("/apply")
                    .role(Role::Candidate)
                    .json(&ApplyPayload { job_id })?,
            )
            .await
    }

    pub async fn list_candidate_applications(&self) -> Result<Vec<Application>> {
        self.gateway
            .fetch(ApiRequest::get("/candidate/applications").role(Role::Candidate))
            .await
    }

    pub async fn list_job_applications(&self, job_id: i64) -> Result<Vec<Application>> {
        self.gateway
            .fetch(ApiRequest::get(format!("/hr/applications/{}", job_id)).role(Role::Hr))
            .await
    }

    pub async fn update_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        self.gateway
            .call(
                ApiRequest::post(format!("/hr/applications/{}/status", application_id))
                    .role(Role::Hr)
                    .query([("status", status.as_str())]),
            )
            .await
    }
}
