use std::sync::{Mutex, RwLock};

use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::config::StatusUpdateErrors;
use crate::dto::job_dto::{CreateJobPayload, JobForm, JobFormField};
use crate::error::Error;
use crate::models::{Application, ApplicationStatus, Job, Role, User};
use crate::services::{
    application_service::ApplicationService, auth_service::AuthService, job_service::JobService,
    profile_service::ProfileService,
};
use crate::views::in_flight::{Generation, InFlight};
use crate::views::navigation::{Navigation, Route};
use crate::views::notification::Notifier;
use crate::views::{ActionOutcome, LoadState};
use crate::AppState;

#[derive(Debug, Clone, Default)]
pub struct HrView {
    pub load_state: LoadState,
    pub jobs: Vec<Job>,
    pub profile: Option<User>,
}

/// Detail view listing the applications of one selected job. Its loading
/// flag is independent of the job list's.
#[derive(Debug, Clone, Default)]
pub struct ApplicationsPanel {
    pub job: Option<Job>,
    pub loading: bool,
    pub applications: Vec<Application>,
}

pub struct HrDashboard {
    jobs: JobService,
    profiles: ProfileService,
    applications: ApplicationService,
    auth: AuthService,
    navigation: Navigation,
    notifier: Notifier,
    status_update_errors: StatusUpdateErrors,
    view: RwLock<HrView>,
    form: Mutex<JobForm>,
    panel: RwLock<ApplicationsPanel>,
    load_generation: Generation,
    panel_generation: Generation,
    adding: InFlight<()>,
    status_updates: InFlight<(i64, ApplicationStatus)>,
}

impl HrDashboard {
    pub fn new(state: &AppState, navigation: Navigation) -> Self {
        Self {
            jobs: state.job_service.clone(),
            profiles: state.profile_service.clone(),
            applications: state.application_service.clone(),
            auth: state.auth_service.clone(),
            navigation,
            notifier: Notifier::new(state.config.notification_ttl),
            status_update_errors: state.config.status_update_errors,
            view: RwLock::new(HrView::default()),
            form: Mutex::new(JobForm::default()),
            panel: RwLock::new(ApplicationsPanel::default()),
            load_generation: Generation::default(),
            panel_generation: Generation::default(),
            adding: InFlight::new(),
            status_updates: InFlight::new(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn view(&self) -> HrView {
        self.view.read().expect("hr view lock poisoned").clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.view.read().expect("hr view lock poisoned").load_state
    }

    pub fn panel(&self) -> ApplicationsPanel {
        self.panel.read().expect("applications panel lock poisoned").clone()
    }

    #[instrument(skip(self))]
    pub async fn load(&self) -> ActionOutcome {
        let ticket = self.load_generation.begin();
        self.set_load_state(LoadState::Loading);

        let result = tokio::try_join!(
            self.jobs.list_my_jobs(),
            self.profiles.get_profile(Role::Hr)
        );

        if !self.load_generation.is_current(ticket) {
            debug!(ticket, "Discarding superseded HR load");
            return ActionOutcome::Superseded;
        }

        match result {
            Ok((jobs, profile)) => {
                info!(jobs = jobs.len(), "HR dashboard loaded");
                let mut view = self.view.write().expect("hr view lock poisoned");
                view.jobs = jobs;
                view.profile = Some(profile);
                view.load_state = LoadState::Ready;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.set_load_state(LoadState::Error);
                self.notifier.error(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    pub fn form(&self) -> JobForm {
        self.form.lock().expect("job form mutex poisoned").clone()
    }

    pub fn set_form_field(&self, field: JobFormField, value: impl Into<String>) {
        self.form
            .lock()
            .expect("job form mutex poisoned")
            .set(field, value);
    }

    pub fn is_adding(&self) -> bool {
        self.adding.any()
    }

    /// Posts the form as a new job owned by the signed-in HR user. The form
    /// is cleared only when the backend accepts it.
    #[instrument(skip(self))]
    pub async fn add_job(&self) -> ActionOutcome {
        let Some(_guard) = self.adding.try_begin(()) else {
            return ActionOutcome::Ignored;
        };
        let form = self.form();
        if let Err(e) = form.validate() {
            self.notifier.error(Error::from(e).to_string());
            return ActionOutcome::Failed;
        }
        let poster = self
            .view
            .read()
            .expect("hr view lock poisoned")
            .profile
            .as_ref()
            .map(|p| p.id);
        let Some(posted_by) = poster else {
            self.notifier.error(Error::ProfileNotLoaded.to_string());
            return ActionOutcome::Failed;
        };

        let payload = CreateJobPayload { form, posted_by };
        match self.jobs.add_job(&payload).await {
            Ok(_) => {
                self.notifier.success("Job added!");
                *self.form.lock().expect("job form mutex poisoned") = JobForm::default();
                self.load().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    /// Opens the detail view for `job` and fetches its applications. A newer
    /// selection supersedes a fetch still in flight.
    #[instrument(skip(self, job), fields(job_id = job.id))]
    pub async fn view_applications(&self, job: Job) -> ActionOutcome {
        let ticket = self.panel_generation.begin();
        let job_id = job.id;
        {
            let mut panel = self.panel.write().expect("applications panel lock poisoned");
            if panel.job.as_ref().map(|j| j.id) != Some(job_id) {
                panel.applications.clear();
            }
            panel.job = Some(job);
            panel.loading = true;
        }

        let result = self.applications.list_job_applications(job_id).await;

        if !self.panel_generation.is_current(ticket) {
            debug!(ticket, "Discarding superseded applications fetch");
            return ActionOutcome::Superseded;
        }

        let mut panel = self.panel.write().expect("applications panel lock poisoned");
        panel.loading = false;
        match result {
            Ok(applications) => {
                panel.applications = applications;
                ActionOutcome::Completed
            }
            Err(e) => {
                panel.applications.clear();
                drop(panel);
                self.notifier.error(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    pub fn close_applications(&self) {
        self.panel_generation.bump();
        *self.panel.write().expect("applications panel lock poisoned") =
            ApplicationsPanel::default();
    }

    pub fn is_status_updating(&self, application_id: i64, status: ApplicationStatus) -> bool {
        self.status_updates.is_active(&(application_id, status))
    }

    /// Sends the chosen status, then re-fetches the open job's applications
    /// whether or not the update went through.
    #[instrument(skip(self))]
    pub async fn update_application_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> ActionOutcome {
        let Some(_guard) = self.status_updates.try_begin((application_id, status)) else {
            return ActionOutcome::Ignored;
        };

        let outcome = match self.applications.update_status(application_id, status).await {
            Ok(_) => {
                self.notifier.success("Status updated!");
                ActionOutcome::Completed
            }
            Err(e) => {
                match self.status_update_errors {
                    StatusUpdateErrors::Swallow => {
                        warn!(application_id, error = %e, "Ignoring failed status update")
                    }
                    StatusUpdateErrors::Report => self.notifier.error(e.to_string()),
                }
                ActionOutcome::Failed
            }
        };

        let open_job = self
            .panel
            .read()
            .expect("applications panel lock poisoned")
            .job
            .clone();
        if let Some(job) = open_job {
            self.view_applications(job).await;
        }
        outcome
    }

    pub fn logout(&self) -> Route {
        if let Err(e) = self.auth.logout(Role::Hr) {
            self.notifier.error(e.to_string());
        }
        let route = Route::Login(Role::Hr);
        self.navigation.navigate(route);
        route
    }

    fn set_load_state(&self, state: LoadState) {
        self.view.write().expect("hr view lock poisoned").load_state = state;
    }
}
