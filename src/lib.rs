//! # cbx-life
//!
//! Client-side core of the cbx.life personal-life-management app: the
//! session store, the bearer-token HTTP client, typed wrappers for every
//! backend module, and the non-visual page models that fetch, mutate and
//! re-list module data.
//!
//! The default build targets native hosts (the `cbx` CLI and tests). The
//! `hydrate` feature swaps durable token storage and the first UUID tier for
//! their browser equivalents.

pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

pub use config::ClientConfig;
pub use net::http::{ApiClient, ApiError, ErrorKind};
pub use pages::{FormError, PageError};
pub use state::session::{SessionError, SessionPhase, SessionState, SessionStore};
pub use util::storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
pub use util::uuid::generate_uuid;
