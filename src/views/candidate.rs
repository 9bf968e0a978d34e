use std::sync::{Mutex, RwLock};

use tracing::{debug, info, instrument};

use crate::dto::job_dto::{FilterField, JobFilters};
use crate::dto::profile_dto::{ProfileField, UpdateProfilePayload};
use crate::models::application::status_for_job;
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

/// Everything the candidate home page shows, replaced as a unit by `load`.
#[derive(Debug, Clone, Default)]
pub struct CandidateView {
    pub load_state: LoadState,
    pub jobs: Vec<Job>,
    pub profile: Option<User>,
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyAction {
    Apply { enabled: bool },
    Applied(ApplicationStatus),
}

impl ApplyAction {
    pub fn label(&self) -> String {
        match self {
            ApplyAction::Apply { .. } => "Apply".to_string(),
            ApplyAction::Applied(status) => format!("Applied ({})", status),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ApplyAction::Apply { enabled: true })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCard {
    pub job: Job,
    pub status: Option<ApplicationStatus>,
    pub action: ApplyAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardSummary {
    pub jobs_available: usize,
    pub applications_submitted: usize,
    pub profile_completeness: u8,
}

#[derive(Debug, Default)]
struct ProfileEditor {
    open: bool,
    draft: UpdateProfilePayload,
}

/// Percentage of name, email, phone and resume that are filled in.
pub fn profile_completeness(profile: Option<&User>) -> u8 {
    let Some(profile) = profile else {
        return 0;
    };
    let filled = |value: Option<&str>| value.is_some_and(|v| !v.is_empty());
    let fields = [
        filled(Some(profile.name.as_str())),
        filled(Some(profile.email.as_str())),
        filled(profile.phone.as_deref()),
        filled(profile.resume.as_deref()),
    ];
    let count = fields.iter().filter(|f| **f).count();
    ((count as f64 / fields.len() as f64) * 100.0).round() as u8
}

/// Derives a card per job from the candidate's own applications.
pub fn job_cards(jobs: &[Job], applications: &[Application], applying: bool) -> Vec<JobCard> {
    jobs.iter()
        .map(|job| {
            let status = status_for_job(applications, job.id);
            let action = match status {
                Some(status) => ApplyAction::Applied(status),
                None => ApplyAction::Apply { enabled: !applying },
            };
            JobCard {
                job: job.clone(),
                status,
                action,
            }
        })
        .collect()
}

pub struct CandidateDashboard {
    jobs: JobService,
    profiles: ProfileService,
    applications: ApplicationService,
    auth: AuthService,
    navigation: Navigation,
    notifier: Notifier,
    view: RwLock<CandidateView>,
    filters: Mutex<JobFilters>,
    editor: Mutex<ProfileEditor>,
    load_generation: Generation,
    applying: InFlight<()>,
    saving: InFlight<()>,
}

impl CandidateDashboard {
    pub fn new(state: &AppState, navigation: Navigation) -> Self {
        Self {
            jobs: state.job_service.clone(),
            profiles: state.profile_service.clone(),
            applications: state.application_service.clone(),
            auth: state.auth_service.clone(),
            navigation,
            notifier: Notifier::new(state.config.notification_ttl),
            view: RwLock::new(CandidateView::default()),
            filters: Mutex::new(JobFilters::default()),
            editor: Mutex::new(ProfileEditor::default()),
            load_generation: Generation::default(),
            applying: InFlight::new(),
            saving: InFlight::new(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn view(&self) -> CandidateView {
        self.view.read().expect("candidate view lock poisoned").clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.view.read().expect("candidate view lock poisoned").load_state
    }

    pub fn job_cards(&self) -> Vec<JobCard> {
        let view = self.view.read().expect("candidate view lock poisoned");
        job_cards(&view.jobs, &view.applications, self.applying.any())
    }

    pub fn summary(&self) -> DashboardSummary {
        let view = self.view.read().expect("candidate view lock poisoned");
        DashboardSummary {
            jobs_available: view.jobs.len(),
            applications_submitted: view.applications.len(),
            profile_completeness: profile_completeness(view.profile.as_ref()),
        }
    }

    /// Fetches jobs (with the current filters), profile and applications
    /// together and commits them only if all three succeed.
    #[instrument(skip(self))]
    pub async fn load(&self) -> ActionOutcome {
        let ticket = self.load_generation.begin();
        self.set_load_state(LoadState::Loading);
        let filters = self.filters();

        let result = tokio::try_join!(
            self.jobs.list_jobs(Role::Candidate, &filters),
            self.profiles.get_profile(Role::Candidate),
            self.applications.list_candidate_applications()
        );

        if !self.load_generation.is_current(ticket) {
            debug!(ticket, "Discarding superseded candidate load");
            return ActionOutcome::Superseded;
        }

        match result {
            Ok((jobs, profile, applications)) => {
                info!(
                    jobs = jobs.len(),
                    applications = applications.len(),
                    "Candidate dashboard loaded"
                );
                let draft = UpdateProfilePayload::from(&profile);
                {
                    let mut view = self.view.write().expect("candidate view lock poisoned");
                    view.jobs = jobs;
                    view.profile = Some(profile);
                    view.applications = applications;
                    view.load_state = LoadState::Ready;
                }
                self.editor.lock().expect("profile editor mutex poisoned").draft = draft;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.set_load_state(LoadState::Error);
                self.notifier.error(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    pub fn filters(&self) -> JobFilters {
        self.filters.lock().expect("filters mutex poisoned").clone()
    }

    pub fn set_filter(&self, field: FilterField, value: impl Into<String>) {
        self.filters
            .lock()
            .expect("filters mutex poisoned")
            .set(field, value);
    }

    /// Re-runs the load with whatever filter values are currently entered.
    pub async fn apply_filters(&self) -> ActionOutcome {
        self.load().await
    }

    #[instrument(skip(self))]
    pub async fn apply(&self, job_id: i64) -> ActionOutcome {
        let Some(_guard) = self.applying.try_begin(()) else {
            debug!(job_id, "Apply already in flight, ignoring");
            return ActionOutcome::Ignored;
        };

        match self.applications.apply(job_id).await {
            Ok(_) => {
                self.notifier.success("Applied successfully!");
                self.load().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    pub fn is_applying(&self) -> bool {
        self.applying.any()
    }

    pub fn open_profile_editor(&self) {
        self.editor.lock().expect("profile editor mutex poisoned").open = true;
    }

    pub fn cancel_profile_edit(&self) {
        self.editor.lock().expect("profile editor mutex poisoned").open = false;
    }

    pub fn is_profile_editor_open(&self) -> bool {
        self.editor.lock().expect("profile editor mutex poisoned").open
    }

    pub fn edit_profile(&self, field: ProfileField, value: impl Into<String>) {
        self.editor
            .lock()
            .expect("profile editor mutex poisoned")
            .draft
            .set(field, value);
    }

    pub fn profile_draft(&self) -> UpdateProfilePayload {
        self.editor
            .lock()
            .expect("profile editor mutex poisoned")
            .draft
            .clone()
    }

    /// Sends the edit buffer. The server's answer, not the buffer, becomes
    /// both the displayed profile and the new buffer.
    #[instrument(skip(self))]
    pub async fn save_profile(&self) -> ActionOutcome {
        let Some(_guard) = self.saving.try_begin(()) else {
            return ActionOutcome::Ignored;
        };
        let draft = self.profile_draft();

        match self.profiles.update_profile(Role::Candidate, &draft).await {
            Ok(updated) => {
                let buffer = UpdateProfilePayload::from(&updated);
                self.view.write().expect("candidate view lock poisoned").profile = Some(updated);
                {
                    let mut editor = self.editor.lock().expect("profile editor mutex poisoned");
                    editor.draft = buffer;
                    editor.open = false;
                }
                self.notifier.success("Profile updated!");
                ActionOutcome::Completed
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                ActionOutcome::Failed
            }
        }
    }

    pub fn logout(&self) -> Route {
        if let Err(e) = self.auth.logout(Role::Candidate) {
            self.notifier.error(e.to_string());
        }
        let route = Route::Login(Role::Candidate);
        self.navigation.navigate(route);
        route
    }

    fn set_load_state(&self, state: LoadState) {
        self.view.write().expect("candidate view lock poisoned").load_state = state;
    }
}
