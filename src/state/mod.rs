//! Shared client-side state.
//!
//! DESIGN
//! ======
//! `session` owns authentication, `route` the page map and its guard, and
//! `resource` the stale-response handling that every page model reuses.

pub mod resource;
pub mod route;
pub mod session;
