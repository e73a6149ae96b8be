//! Which screen a session may see.
//!
//! Every screen except sign-in requires an active account. Screens scoped
//! to a plan also require a plan selection and fall back to plan selection
//! without one.

use std::fmt;

use planboard_auth::Account;
use planboard_core::PlanId;

/// A navigable location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    /// `/`
    Home,
    /// `/login`
    Login,
    /// `/plans`
    Plans,
    /// `/dashboard`
    Dashboard,
    /// `/create-task`
    CreateTask,
}

impl Screen {
    /// Every screen, in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Login,
        Self::Plans,
        Self::Dashboard,
        Self::CreateTask,
    ];

    /// Path of the screen.
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Plans => "/plans",
            Self::Dashboard => "/dashboard",
            Self::CreateTask => "/create-task",
        }
    }

    /// Parse a path. Trailing slashes are ignored; unknown paths yield `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.starts_with('/') => "/",
            p => p,
        };
        Self::ALL.into_iter().find(|s| s.path() == normalized)
    }
}

/// Where a session ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// No account: sign in first.
    SignIn,
    /// Signed in, no plan chosen yet.
    PlanSelection,
    /// Dashboard of the given plan.
    Dashboard(PlanId),
    /// Task form for the given plan.
    CreateTask(PlanId),
}

impl Route {
    /// Screen this route renders.
    pub fn screen(&self) -> Screen {
        match self {
            Self::SignIn => Screen::Login,
            Self::PlanSelection => Screen::Plans,
            Self::Dashboard(_) => Screen::Dashboard,
            Self::CreateTask(_) => Screen::CreateTask,
        }
    }

    /// Path of the screen this route renders.
    pub fn path(&self) -> &'static str {
        self.screen().path()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard(plan) | Self::CreateTask(plan) => {
                write!(f, "{} ({plan})", self.path())
            }
            _ => f.write_str(self.path()),
        }
    }
}

fn selected(plan: Option<&PlanId>) -> Option<PlanId> {
    plan.filter(|p| !p.is_blank()).cloned()
}

/// Landing route after start-up or sign-in.
pub fn resolve_route(account: Option<&Account>, selected_plan: Option<&PlanId>) -> Route {
    if account.is_none() {
        return Route::SignIn;
    }
    selected(selected_plan).map_or(Route::PlanSelection, Route::Dashboard)
}

/// Route for a requested path.
///
/// Unknown paths and any path without an account go to sign-in. With an
/// account, `/` and `/login` go to plan selection.
pub fn resolve_path(path: &str, account: Option<&Account>, selected_plan: Option<&PlanId>) -> Route {
    let Some(screen) = Screen::from_path(path) else {
        return Route::SignIn;
    };
    if account.is_none() {
        return Route::SignIn;
    }
    match screen {
        Screen::Home | Screen::Login | Screen::Plans => Route::PlanSelection,
        Screen::Dashboard => selected(selected_plan).map_or(Route::PlanSelection, Route::Dashboard),
        Screen::CreateTask => {
            selected(selected_plan).map_or(Route::PlanSelection, Route::CreateTask)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
