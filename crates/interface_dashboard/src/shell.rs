//! Application shell
//!
//! Owns the signed-in identity and the current location. Every screen
//! reports its failures here so that a 401 from any endpoint lands the
//! operator on the login page.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, instrument, warn};

use domain_access::{check_access, visible_routes, Access, AccessPort, Route, SessionIdentity, LOGIN_PATH};
use infra_http::SessionEvent;

use crate::error::DashboardError;

pub const ACCESS_DENIED_PATH: &str = "/access-denied";
pub const HOME_PATH: &str = "/dashboard/hoa-don";

pub struct AppShell {
    access: Arc<dyn AccessPort>,
    identity: Option<SessionIdentity>,
    location: String,
}

impl AppShell {
    pub fn new(access: Arc<dyn AccessPort>) -> Self {
        Self {
            access,
            identity: None,
            location: LOGIN_PATH.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    /// Sidebar entries for the signed-in operator
    pub fn sidebar(&self) -> Vec<&'static Route> {
        self.identity.as_ref().map(visible_routes).unwrap_or_default()
    }

    /// Reloads who is signed in; a missing session sends the operator to login
    #[instrument(skip(self))]
    pub async fn refresh_identity(&mut self) -> Result<Option<&SessionIdentity>, DashboardError> {
        match self.access.me().await {
            Ok(identity) => {
                info!(username = %identity.username, "Session identity loaded");
                self.identity = Some(identity);
                Ok(self.identity.as_ref())
            }
            Err(e) if e.is_unauthorized() => {
                self.require_login();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Moves to `path` if the session may open it.
    ///
    /// Returns the guard's verdict; the location follows it.
    pub fn navigate(&mut self, path: &str) -> Access {
        let verdict = check_access(path, self.identity.as_ref());
        self.location = match &verdict {
            Access::Granted => path.to_string(),
            Access::RedirectToLogin => LOGIN_PATH.to_string(),
            Access::Denied { requirement } => {
                warn!(path, ?requirement, "Access denied");
                ACCESS_DENIED_PATH.to_string()
            }
        };
        debug!(location = %self.location, "Navigated");
        verdict
    }

    /// Forgets the session and shows the login page
    pub fn require_login(&mut self) {
        if self.location != LOGIN_PATH {
            info!(from = %self.location, "Session expired, redirecting to login");
        }
        self.identity = None;
        self.location = LOGIN_PATH.to_string();
    }

    /// Routes a screen's failure; returns it unchanged for the caller to show
    pub fn report(&mut self, error: DashboardError) -> DashboardError {
        if error.is_session_expired() {
            self.require_login();
        }
        error
    }

    pub fn handle_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::LoginRequired { path } => {
                debug!(%path, "Backend asked for a new login");
                self.require_login();
            }
            SessionEvent::SignedOut => self.require_login(),
            SessionEvent::SignedIn { .. } => {}
        }
    }

    /// Applies every pending session event; returns how many were handled
    pub fn drain_events(&mut self, events: &mut broadcast::Receiver<SessionEvent>) -> usize {
        let mut handled = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.handle_event(&event);
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed session events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return handled,
            }
        }
    }
}
