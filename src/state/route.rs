//! Application routes and the authentication guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages consult the session before rendering protected content. Every
//! `/portal` route requires an identity; an anonymous session is redirected
//! to `/login`. The public survey page stays reachable without one.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use std::fmt;

/// Every page the app can navigate to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Portal,
    Profile,
    ProfileEdit,
    Accounting,
    AccountingAdd,
    AccountingEdit(i64),
    Career,
    CareerAdd,
    CareerProfile,
    Supply,
    SupplyAdd,
    Surveys,
    SurveyCreate,
    SurveyTake(i64),
}

impl Route {
    /// URL path for this route.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Login => "/login".to_owned(),
            Route::Register => "/register".to_owned(),
            Route::Portal => "/portal".to_owned(),
            Route::Profile => "/portal/profile".to_owned(),
            Route::ProfileEdit => "/portal/profile/edit".to_owned(),
            Route::Accounting => "/portal/accounting".to_owned(),
            Route::AccountingAdd => "/portal/accounting/add".to_owned(),
            Route::AccountingEdit(id) => format!("/portal/accounting/edit/{id}"),
            Route::Career => "/portal/career".to_owned(),
            Route::CareerAdd => "/portal/career/add".to_owned(),
            Route::CareerProfile => "/portal/career/profile".to_owned(),
            Route::Supply => "/portal/supply".to_owned(),
            Route::SupplyAdd => "/portal/supply/add".to_owned(),
            Route::Surveys => "/portal/survey".to_owned(),
            Route::SurveyCreate => "/portal/survey/create".to_owned(),
            Route::SurveyTake(id) => format!("/survey/{id}"),
        }
    }

    /// Parse a URL path. Query strings, fragments and a trailing `/` are
    /// ignored. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["portal"] => Route::Portal,
            ["portal", "profile"] => Route::Profile,
            ["portal", "profile", "edit"] => Route::ProfileEdit,
            ["portal", "accounting"] => Route::Accounting,
            ["portal", "accounting", "add"] => Route::AccountingAdd,
            ["portal", "accounting", "edit", id] => Route::AccountingEdit(id.parse().ok()?),
            ["portal", "career"] => Route::Career,
            ["portal", "career", "add"] => Route::CareerAdd,
            ["portal", "career", "profile"] => Route::CareerProfile,
            ["portal", "supply"] => Route::Supply,
            ["portal", "supply", "add"] => Route::SupplyAdd,
            ["portal", "survey"] => Route::Surveys,
            ["portal", "survey", "create"] => Route::SurveyCreate,
            ["survey", id] => Route::SurveyTake(id.parse().ok()?),
            _ => return None,
        };
        Some(route)
    }

    /// True for every page under `/portal`.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        !matches!(
            self,
            Route::Home | Route::Login | Route::Register | Route::SurveyTake(_)
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Route to actually render: `requested`, or `Login` if it needs an identity
/// and there is none.
#[must_use]
pub fn guard(requested: Route, authenticated: bool) -> Route {
    if requested.requires_auth() && !authenticated {
        Route::Login
    } else {
        requested
    }
}
