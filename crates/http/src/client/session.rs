//! Session expiry notification

use super::config::SessionConfig;
use super::error::Backend;
use std::sync::Arc;
use tracing::debug;

/// Emitted after a 401 purged the stored credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExpired {
    /// Endpoint name (or secondary path) that returned 401
    pub endpoint: String,
    pub backend: Backend,
}

/// Receives session expiry events from the client
pub trait SessionExpiredHandler: Send + Sync {
    fn on_session_expired(&self, event: &SessionExpired);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn(&SessionExpired) + Send + Sync,
{
    fn on_session_expired(&self, event: &SessionExpired) {
        self(event)
    }
}

/// Page navigation capability
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown, if known
    fn current_path(&self) -> Option<String>;

    /// Navigate to `target`
    fn navigate(&self, target: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn current_path(&self) -> Option<String> {
        (**self).current_path()
    }

    fn navigate(&self, target: &str) {
        (**self).navigate(target);
    }
}

/// Sends the user back to the landing page unless they are already on it
pub struct RedirectToLanding<N> {
    navigator: N,
    session: SessionConfig,
}

impl<N: Navigator> RedirectToLanding<N> {
    pub fn new(navigator: N, session: SessionConfig) -> Self {
        Self { navigator, session }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    fn on_landing_page(&self) -> bool {
        self.navigator
            .current_path()
            .is_some_and(|path| self.session.landing_paths.iter().any(|p| *p == path))
    }
}

impl<N: Navigator> SessionExpiredHandler for RedirectToLanding<N> {
    fn on_session_expired(&self, event: &SessionExpired) {
        if self.on_landing_page() {
            debug!(endpoint = %event.endpoint, "Session expired on landing page, staying");
            return;
        }
        debug!(
            endpoint = %event.endpoint,
            landing = %self.session.landing_target,
            "Session expired, redirecting to landing page"
        );
        self.navigator.navigate(&self.session.landing_target);
    }
}
