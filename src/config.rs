//! Backend address configuration.
//!
//! DESIGN
//! ======
//! The API base URL is resolved exactly once at startup and then handed to
//! `ApiClient::new`. Nothing downstream re-derives the address per request,
//! so every request in a process targets the same backend.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "CBX_API_URL";

/// Backend address used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Port the backend listens on when co-located with the page host.
pub const BACKEND_PORT: u16 = 8000;

/// Startup-resolved client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build a config for an explicit base URL.
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: normalize_api_url(Some(api_url)),
        }
    }

    /// Load from `CBX_API_URL`, falling back to [`DEFAULT_API_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        let raw = std::env::var(API_URL_ENV).ok();
        Self {
            api_url: normalize_api_url(raw.as_deref()),
        }
    }

    /// Derive the backend address from a page location: same protocol and
    /// host, fixed backend port. Lets one build reach a backend running on a
    /// developer machine or a LAN device.
    #[must_use]
    pub fn from_location(protocol: &str, hostname: &str) -> Self {
        let protocol = protocol.trim_end_matches(':');
        Self {
            api_url: format!("{protocol}://{hostname}:{BACKEND_PORT}"),
        }
    }

    /// Derive the backend address from the current browser window.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn from_window() -> Self {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Self::default();
        };
        match (location.protocol(), location.hostname()) {
            (Ok(protocol), Ok(hostname)) if !hostname.is_empty() => {
                Self::from_location(&protocol, &hostname)
            }
            _ => Self::default(),
        }
    }
}

/// Trim whitespace and trailing slashes; blank or missing means default.
fn normalize_api_url(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_URL.to_owned()
    } else {
        trimmed.to_owned()
    }
}
