//! Dashboard: greeting and one tile per module.

use super::{ensure_access, fetch};
use crate::net::api;
use crate::net::types::{ModuleSummary, PortalStats};
use crate::state::resource::Resource;
use crate::state::route::Route;
use crate::state::session::SessionStore;

#[derive(Debug, Default)]
pub struct PortalPage {
    pub stats: Resource<PortalStats>,
}

impl PortalPage {
    /// Load the dashboard for an authenticated session.
    ///
    /// # Errors
    ///
    /// Returns the redirect route when the session is anonymous; no request
    /// is made in that case.
    pub async fn load(&mut self, session: &SessionStore) -> Result<(), Route> {
        ensure_access(Route::Portal, session)?;
        fetch(&mut self.stats, api::portal_stats(session.api())).await;
        Ok(())
    }

    #[must_use]
    pub fn greeting(&self) -> Option<&str> {
        self.stats.data().map(|s| s.greeting.as_str())
    }

    #[must_use]
    pub fn modules(&self) -> &[ModuleSummary] {
        self.stats.data().map_or(&[], |s| s.modules.as_slice())
    }

    #[must_use]
    pub fn total_notifications(&self) -> u32 {
        self.stats.data().map_or(0, PortalStats::total_notifications)
    }
}
