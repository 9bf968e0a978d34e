use crate::dto::job_dto::{CreateJobPayload, JobFilters};
use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{Job, Role};

#[derive(Clone)]
pub struct JobService {
    gateway: Gateway,
}

impl JobService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list_jobs(&self, role: Role, filters: &JobFilters) -> Result<Vec<Job>> {
        self.gateway
            .fetch(
                ApiRequest::get(format!("/{}/jobs/all", role))
                    .role(role)
                    .query(filters.to_query()),
            )
            .await
    }

    pub async fn list_my_jobs(&self) -> Result<Vec<Job>> {
        self.gateway
            .fetch(ApiRequest::get("/hr/jobs/my").role(Role::Hr))
            .await
    }

    pub async fn add_job(&self, payload: &CreateJobPayload) -> Result<Option<Job>> {
        self.gateway
            .call(ApiRequest::post("/hr/jobs/add").role(Role::Hr).json(payload)?)
            .await
    }
}
