//! Profile edit form.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use super::{FormError, PageError, non_blank};
use crate::net::api;
use crate::net::types::{ProfileUpdate, UserIdentity};
use crate::state::session::SessionStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone: String,
}

impl ProfileForm {
    #[must_use]
    pub fn from_identity(identity: &UserIdentity) -> Self {
        Self {
            full_name: identity.full_name.clone().unwrap_or_default(),
            phone: identity.phone.clone().unwrap_or_default(),
        }
    }

    /// An empty phone becomes `None` and is sent as `null`.
    ///
    /// # Errors
    ///
    /// [`FormError`] for a blank name or a phone with other characters.
    pub fn validate(&self) -> Result<ProfileUpdate, FormError> {
        let full_name = non_blank(&self.full_name).ok_or(FormError::Required("Full name"))?;
        let phone = non_blank(&self.phone);
        if phone.as_deref().is_some_and(|p| !p.chars().all(is_phone_char)) {
            return Err(FormError::Invalid(
                "Phone may only contain digits, spaces, +, - and parentheses",
            ));
        }
        Ok(ProfileUpdate { full_name, phone })
    }

    /// Save and re-fetch the session identity so every view sees the change.
    ///
    /// # Errors
    ///
    /// [`PageError::Form`] if invalid (nothing is sent), else the backend
    /// failure. A 401 also ends the session.
    pub async fn save(&self, session: &SessionStore) -> Result<UserIdentity, PageError> {
        let update = self.validate()?;
        if let Err(error) = api::update_me(session.api(), &update).await {
            session.handle_error(&error);
            return Err(error.into());
        }
        Ok(session.reload().await?)
    }
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')')
}
