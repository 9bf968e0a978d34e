use std::sync::Mutex;

use tracing::instrument;

use crate::dto::auth_dto::RegisterPayload;
use crate::models::Role;
use crate::services::auth_service::AuthService;
use crate::views::in_flight::InFlight;
use crate::views::navigation::{Navigation, Route};
use crate::views::notification::Notifier;
use crate::views::ActionOutcome;
use crate::AppState;

/// Sign-in page for one role. On success the session is stored and the user
/// is sent to that role's home page.
pub struct LoginView {
    role: Role,
    auth: AuthService,
    navigation: Navigation,
    notifier: Notifier,
    submitting: InFlight<()>,
    error: Mutex<Option<String>>,
}

impl LoginView {
    pub fn new(state: &AppState, role: Role, navigation: Navigation) -> Self {
        Self {
            role,
            auth: state.auth_service.clone(),
            navigation,
            notifier: Notifier::new(state.config.notification_ttl),
            submitting: InFlight::new(),
            error: Mutex::new(None),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().expect("login view mutex poisoned").clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.any()
    }

    #[instrument(skip(self, password), fields(role = %self.role))]
    pub async fn submit(&self, email: &str, password: &str) -> ActionOutcome {
        let Some(_guard) = self.submitting.try_begin(()) else {
            return ActionOutcome::Ignored;
        };
        self.set_error(None);

        match self.auth.login(self.role, email, password).await {
            Ok(_) => {
                self.notifier.success("Login successful!");
                self.navigation.navigate(Route::Home(self.role));
                ActionOutcome::Completed
            }
            Err(e) => {
                let message = e.to_string();
                self.set_error(Some(message.clone()));
                self.notifier.error(message);
                ActionOutcome::Failed
            }
        }
    }

    fn set_error(&self, error: Option<String>) {
        *self.error.lock().expect("login view mutex poisoned") = error;
    }
}

/// Registration page for one role. A successful registration leads to the
/// login page; it does not sign the user in.
pub struct RegisterView {
    role: Role,
    auth: AuthService,
    navigation: Navigation,
    notifier: Notifier,
    submitting: InFlight<()>,
    error: Mutex<Option<String>>,
}

impl RegisterView {
    pub fn new(state: &AppState, role: Role, navigation: Navigation) -> Self {
        Self {
            role,
            auth: state.auth_service.clone(),
            navigation,
            notifier: Notifier::new(state.config.notification_ttl),
            submitting: InFlight::new(),
            error: Mutex::new(None),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().expect("register view mutex poisoned").clone()
    }

    #[instrument(skip(self, payload), fields(role = %self.role))]
    pub async fn submit(&self, payload: &RegisterPayload) -> ActionOutcome {
        let Some(_guard) = self.submitting.try_begin(()) else {
            return ActionOutcome::Ignored;
        };
        *self.error.lock().expect("register view mutex poisoned") = None;

        match self.auth.register(self.role, payload).await {
            Ok(_) => {
                self.notifier.success("Registration successful!");
                self.navigation.navigate(Route::Login(self.role));
                ActionOutcome::Completed
            }
            Err(e) => {
                let message = e.to_string();
                *self.error.lock().expect("register view mutex poisoned") = Some(message.clone());
                self.notifier.error(message);
                ActionOutcome::Failed
            }
        }
    }
}
