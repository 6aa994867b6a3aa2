//! Role-based navigation guard.
//!
//! The signed-in role is owned elsewhere and arrives as an
//! `Option<String>`. Once a role is known the user is sent to the
//! dashboard or, for roles outside the allowed set, to the unauthorized
//! page.

use std::fmt;

use tokio::sync::watch;

use crate::config::AccessConfig;

/// Navigation targets chosen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Unauthorized,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            View::Dashboard => "/dashboard",
            View::Unauthorized => "/unauthorized",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Where a user with `role` should be sent. `None` while the role is
/// still unknown.
pub fn redirect_for(role: Option<&str>, allowed: &[String]) -> Option<View> {
    let role = role?;
    if allowed.iter().any(|r| r == role) {
        Some(View::Dashboard)
    } else {
        Some(View::Unauthorized)
    }
}

/// Receives navigation requests.
pub trait Navigator: Send + Sync {
    fn navigate(&self, view: View);
}

/// Evaluates [`redirect_for`] once per distinct role value.
#[derive(Debug, Clone)]
pub struct RoleRedirectGuard {
    allowed: Vec<String>,
    /// `None` until the first observation.
    last: Option<Option<String>>,
}

impl RoleRedirectGuard {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed,
            last: None,
        }
    }

    pub fn from_config(access: &AccessConfig) -> Self {
        Self::new(access.allowed_roles.clone())
    }

    /// Records `role` and returns a view if the role changed to a known
    /// value. Repeating the same role yields `None`.
    pub fn observe(&mut self, role: Option<&str>) -> Option<View> {
        if self.last.as_ref().map(Option::as_deref) == Some(role) {
            return None;
        }
        self.last = Some(role.map(str::to_string));

        let view = redirect_for(role, &self.allowed);
        if let (Some(role), Some(view)) = (role, view) {
            log::debug!("Role '{}' redirected to {}", role, view);
        }
        view
    }

    /// Navigates on every role change published on `roles`, starting with
    /// the current value. Returns when the sender is dropped.
    pub async fn follow<N>(mut self, mut roles: watch::Receiver<Option<String>>, navigator: &N)
    where
        N: Navigator + ?Sized,
    {
        loop {
            let role = roles.borrow_and_update().clone();
            if let Some(view) = self.observe(role.as_deref()) {
                navigator.navigate(view);
            }
            if roles.changed().await.is_err() {
                log::debug!("Role channel closed; redirect guard stopped");
                break;
            }
        }
    }
}
