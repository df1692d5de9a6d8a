//! Page models: the non-visual half of each screen.
//!
//! Every module follows the same loop: fetch a list, render it, submit a
//! create/update/delete, then re-fetch the list. No response is merged
//! optimistically; the re-list is the source of truth. Rendering lives with
//! whatever UI drives these models.

pub mod accounting;
pub mod career;
pub mod portal;
pub mod profile;
pub mod supply;
pub mod survey;

use std::future::Future;

use crate::net::http::ApiError;
use crate::state::resource::Resource;
use crate::state::route::{Route, guard};
use crate::state::session::SessionStore;

/// Client-side validation failure, shown before any request is sent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0}")]
    Invalid(&'static str),
    #[error("Please answer \"{0}\"")]
    Unanswered(String),
}

/// Failure of a page action: rejected locally or by the backend.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Run one request against `resource`.
///
/// The exclusive borrow spans the await, so the ticket here is always
/// current. UIs that share a resource across tasks call `begin`/`settle`
/// themselves.
pub(crate) async fn fetch<T, F>(resource: &mut Resource<T>, call: F) -> bool
where
    F: Future<Output = Result<T, ApiError>>,
{
    let ticket = resource.begin();
    let result = call.await;
    resource.settle(ticket, result)
}

/// `Ok` if `route` may render for this session, else the redirect target.
///
/// # Errors
///
/// Returns the route to navigate to instead.
pub fn ensure_access(route: Route, session: &SessionStore) -> Result<(), Route> {
    let target = guard(route, session.is_authenticated());
    if target == route { Ok(()) } else { Err(target) }
}

/// Trimmed copy, or `None` when blank.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
