//! Fetched-data holder for page models.
//!
//! DESIGN
//! ======
//! Requests are never cancelled, so a response can arrive after a newer
//! request was issued or after the page went away. `begin()` hands out a
//! ticket; `settle()` applies a result only if its ticket is the newest and
//! the resource is still mounted. Stale results are dropped (last write wins).
//!
//! The page models' own `load`/`refresh` paths hold `&mut Resource` across
//! the await, so they can never race themselves. The guards matter to a UI
//! that keeps the resource in shared state and calls `begin`/`settle` from
//! separate tasks, or unmounts while a request is in flight.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use crate::net::http::ApiError;

/// Proof of which request a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

#[derive(Clone, Debug)]
pub struct Resource<T> {
    data: Option<T>,
    error: Option<String>,
    loading: bool,
    generation: u64,
    mounted: bool,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            generation: 0,
            mounted: true,
        }
    }
}

impl<T> Resource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request. Any in-flight request becomes stale.
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Apply a result. Returns `false` if it was stale and dropped.
    ///
    /// A failure keeps the previous data and records the message.
    pub fn settle(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> bool {
        if !self.mounted || ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "dropping stale response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(error) => {
                self.error = Some(error.message().to_owned());
            }
        }
        true
    }

    /// The owning page went away; later results are ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.loading = false;
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}
