pub mod config;
pub mod dto;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod session;
pub mod views;

use crate::config::Config;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::services::{
    application_service::ApplicationService, auth_service::AuthService, job_service::JobService,
    profile_service::ProfileService,
};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: Gateway,
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
}

impl AppState {
    pub fn new(config: Config, sessions: SessionStore) -> Result<Self> {
        let gateway = Gateway::new(&config, sessions)?;

        let auth_service = AuthService::new(gateway.clone());
        let profile_service = ProfileService::new(gateway.clone());
        let job_service = JobService::new(gateway.clone());
        let application_service = ApplicationService::new(gateway.clone());

        Ok(Self {
            config,
            gateway,
            auth_service,
            profile_service,
            job_service,
            application_service,
        })
    }

    /// Builds the state with the session store named by the configuration,
    /// or an in-memory one when no file is configured.
    pub fn from_config(config: Config) -> Result<Self> {
        let sessions = match &config.session_file {
            Some(path) => SessionStore::open(path)?,
            None => SessionStore::in_memory(),
        };
        Self::new(config, sessions)
    }

    pub fn sessions(&self) -> &SessionStore {
        self.gateway.sessions()
    }
}
