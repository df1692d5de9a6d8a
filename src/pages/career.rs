//! Career: job applications and the career profile.

#[cfg(test)]
#[path = "career_test.rs"]
mod career_test;

use super::{FormError, PageError, ensure_access, fetch, non_blank};
use crate::net::api;
use crate::net::http::{ApiClient, ApiError};
use crate::net::types::{
    APPLICATION_STATUS_APPLIED, CareerProfile, CareerProfileUpdate, JobApplication, NewJobApplication,
};
use crate::state::resource::Resource;
use crate::state::route::Route;
use crate::state::session::SessionStore;

/// Statuses the status picker offers.
pub const APPLICATION_STATUSES: [&str; 4] = ["Applied", "Interviewing", "Offer", "Rejected"];

#[derive(Debug, Default)]
pub struct CareerPage {
    pub applications: Resource<Vec<JobApplication>>,
    pub profile: Resource<CareerProfile>,
}

impl CareerPage {
    /// # Errors
    ///
    /// Returns the redirect route when the session is anonymous.
    pub async fn load(&mut self, session: &SessionStore) -> Result<(), Route> {
        ensure_access(Route::Career, session)?;
        let api = session.api();
        fetch(&mut self.applications, api::list_applications(api)).await;
        fetch(&mut self.profile, api::career_profile(api)).await;
        Ok(())
    }

    /// # Errors
    ///
    /// [`PageError::Form`] when company or position is blank, else any
    /// backend failure.
    pub async fn add(&mut self, api: &ApiClient, form: &ApplicationForm) -> Result<JobApplication, PageError> {
        let body = form.validate()?;
        let created = api::create_application(api, &body).await?;
        fetch(&mut self.applications, api::list_applications(api)).await;
        Ok(created)
    }

    /// # Errors
    ///
    /// Any backend failure; an unknown id is a 404.
    pub async fn set_status(&mut self, api: &ApiClient, application_id: i64, status: &str) -> Result<(), ApiError> {
        api::update_application_status(api, application_id, status).await?;
        fetch(&mut self.applications, api::list_applications(api)).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Any backend failure.
    pub async fn save_profile(&mut self, api: &ApiClient, update: &CareerProfileUpdate) -> Result<(), ApiError> {
        api::save_career_profile(api, update).await?;
        fetch(&mut self.profile, api::career_profile(api)).await;
        Ok(())
    }

    /// Applications grouped by status, in picker order; unknown statuses last.
    #[must_use]
    pub fn by_status(&self) -> Vec<(&str, Vec<&JobApplication>)> {
        let Some(applications) = self.applications.data() else {
            return Vec::new();
        };
        let mut groups: Vec<(&str, Vec<&JobApplication>)> = APPLICATION_STATUSES
            .iter()
            .map(|status| (*status, Vec::new()))
            .collect();
        for application in applications {
            match groups.iter_mut().find(|(status, _)| *status == application.status) {
                Some((_, members)) => members.push(application),
                None => groups.push((application.status.as_str(), vec![application])),
            }
        }
        groups.retain(|(_, members)| !members.is_empty());
        groups
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationForm {
    pub company: String,
    pub position: String,
    pub status: String,
    pub salary_range: String,
    pub notes: String,
}

impl Default for ApplicationForm {
    fn default() -> Self {
        Self {
            company: String::new(),
            position: String::new(),
            status: APPLICATION_STATUS_APPLIED.to_owned(),
            salary_range: String::new(),
            notes: String::new(),
        }
    }
}

impl ApplicationForm {
    /// A blank status falls back to `Applied`.
    ///
    /// # Errors
    ///
    /// [`FormError::Required`] for a blank company or position.
    pub fn validate(&self) -> Result<NewJobApplication, FormError> {
        Ok(NewJobApplication {
            company: non_blank(&self.company).ok_or(FormError::Required("Company"))?,
            position: non_blank(&self.position).ok_or(FormError::Required("Position"))?,
            status: non_blank(&self.status).unwrap_or_else(|| APPLICATION_STATUS_APPLIED.to_owned()),
            salary_range: non_blank(&self.salary_range),
            notes: non_blank(&self.notes),
        })
    }
}

/// Comma-separated skills input to a clean list.
#[must_use]
pub fn parse_skills(input: &str) -> Vec<String> {
    input.split(',').filter_map(non_blank).collect()
}
