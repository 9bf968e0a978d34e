pub mod auth;
pub mod candidate;
pub mod hr;
pub mod in_flight;
pub mod navigation;
pub mod notification;

pub use auth::{LoginView, RegisterView};
pub use candidate::CandidateDashboard;
pub use hr::HrDashboard;
pub use navigation::{Navigation, Route};
pub use notification::{Notification, Notifier, Severity};

/// Lifecycle of a dashboard's combined fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What became of a user-triggered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The action failed and the failure was reported (or deliberately swallowed).
    Failed,
    /// The same action was already in flight, so this trigger did nothing.
    Ignored,
    /// A newer run of the same action started before this one finished; its
    /// results were dropped.
    Superseded,
}
