use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    RoleSelection,
    Login(Role),
    Register(Role),
    Home(Role),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::RoleSelection => "/".to_string(),
            Route::Login(role) => format!("/{}/login", role),
            Route::Register(role) => format!("/{}/register", role),
            Route::Home(role) => format!("/{}/home", role),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Some(Route::RoleSelection);
        }
        let mut parts = trimmed.trim_start_matches('/').split('/');
        let role: Role = parts.next()?.parse().ok()?;
        let route = match parts.next()? {
            "login" => Route::Login(role),
            "register" => Route::Register(role),
            "home" => Route::Home(role),
            _ => return None,
        };
        parts.next().is_none().then_some(route)
    }

    pub fn title(&self) -> String {
        let role = |r: &Role| match r {
            Role::Candidate => "Candidate",
            Role::Hr => "HR",
        };
        match self {
            Route::RoleSelection => "Role Selection".to_string(),
            Route::Login(r) => format!("{} Login", role(r)),
            Route::Register(r) => format!("{} Register", role(r)),
            Route::Home(r) => format!("{} Home", role(r)),
        }
    }

    /// Menu entries in display order.
    pub fn menu() -> Vec<Route> {
        let mut routes = vec![Route::RoleSelection];
        for role in Role::ALL {
            routes.extend([Route::Login(role), Route::Register(role), Route::Home(role)]);
        }
        routes
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// The active page. Shared by every view so that an action can move the
/// user elsewhere (for example back to the login page after logout).
#[derive(Debug, Clone)]
pub struct Navigation {
    current: Arc<Mutex<Route>>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self::new(Route::RoleSelection)
    }
}

impl Navigation {
    pub fn new(start: Route) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    pub fn navigate(&self, route: Route) {
        debug!(to = %route, "Navigating");
        *self.current.lock().expect("navigation mutex poisoned") = route;
    }

    pub fn current(&self) -> Route {
        *self.current.lock().expect("navigation mutex poisoned")
    }
}
