//! Page navigation through `window.location`

use cashrev_http::client::Navigator;
use web_sys::window;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn current_path(&self) -> Option<String> {
        window().and_then(|w| w.location().pathname().ok())
    }

    fn navigate(&self, target: &str) {
        let Some(window) = window() else {
            return;
        };
        if let Err(err) = window.location().set_href(target) {
            tracing::warn!(href = target, error = ?err, "Navigation failed");
        }
    }
}
