//! Typed wrappers for every backend endpoint the app consumes.
//!
//! Each function is a single call through `ApiClient`; none of them retry or
//! cache. Path builders are split out so the exact URLs are unit tested
//! without a network. Query strings are left to `reqwest`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde_json::Value;

use super::http::{ApiClient, ApiError};
use super::types::{
    AccessToken, AccountingSummary, CareerProfile, CareerProfileUpdate, Category, Credentials, Expense,
    Health, JobApplication, NewExpense, NewJobApplication, NewSupplyItem, NewSurvey, NewSurveyResponse,
    PortalStats, ProfileUpdate, Registration, SupplyItem, Survey, SurveyResponse, UserIdentity, UserRecord,
};

pub const HEALTH: &str = "/health";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_ME: &str = "/auth/me";
pub const ACCOUNTING_CATEGORIES: &str = "/accounting/categories";
pub const ACCOUNTING_EXPENSES: &str = "/accounting/expenses";
pub const ACCOUNTING_SUMMARY: &str = "/accounting/summary";
pub const CAREER_APPLICATIONS: &str = "/career/applications";
pub const CAREER_PROFILE: &str = "/career/profile";
pub const SUPPLY_ITEMS: &str = "/supply/items";
pub const SURVEYS: &str = "/surveys/";
pub const PORTAL_STATS: &str = "/portal/stats";

fn expense_endpoint(expense_id: i64) -> String {
    format!("{ACCOUNTING_EXPENSES}/{expense_id}")
}

fn application_endpoint(application_id: i64) -> String {
    format!("{CAREER_APPLICATIONS}/{application_id}")
}

fn supply_item_endpoint(item_id: i64) -> String {
    format!("{SUPPLY_ITEMS}/{item_id}")
}

fn survey_endpoint(survey_id: i64) -> String {
    format!("/surveys/{survey_id}")
}

fn survey_responses_endpoint(survey_id: i64) -> String {
    format!("/surveys/{survey_id}/responses")
}

// =============================================================================
// HEALTH / PORTAL
// =============================================================================

/// Liveness probe.
///
/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn health(api: &ApiClient) -> Result<Health, ApiError> {
    api.get(HEALTH).await
}

/// Dashboard greeting and per-module notification counts.
///
/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn portal_stats(api: &ApiClient) -> Result<PortalStats, ApiError> {
    api.get(PORTAL_STATS).await
}

// =============================================================================
// AUTH
// =============================================================================

/// Create an account. Fails with "Email already registered" on duplicates.
///
/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn register(api: &ApiClient, registration: &Registration) -> Result<UserRecord, ApiError> {
    api.post(AUTH_REGISTER, registration).await
}

/// Exchange credentials for a bearer token. Does not store the token.
///
/// # Errors
///
/// Any [`ApiError`] from the call; wrong credentials are a 401.
pub async fn login(api: &ApiClient, credentials: &Credentials) -> Result<AccessToken, ApiError> {
    api.post_form(AUTH_LOGIN, credentials).await
}

/// Identity for the stored token.
///
/// # Errors
///
/// Any [`ApiError`] from the call, or a malformed error when the body names
/// nobody.
pub async fn me(api: &ApiClient) -> Result<UserIdentity, ApiError> {
    checked_identity(api.get(AUTH_ME).await?)
}

/// Identity for an explicit token, ignoring whatever is stored.
///
/// # Errors
///
/// See [`me`].
pub async fn me_with_token(api: &ApiClient, token: &str) -> Result<UserIdentity, ApiError> {
    checked_identity(api.get_with_token(AUTH_ME, token).await?)
}

/// Every field is optional on the wire, so `{}` or `[]` would otherwise
/// decode as an identity.
fn checked_identity(identity: UserIdentity) -> Result<UserIdentity, ApiError> {
    if identity.is_blank() {
        return Err(ApiError::malformed("Invalid response: identity has no email, phone or name"));
    }
    Ok(identity)
}

/// Update the caller's name and phone.
///
/// # Errors
///
/// Any [`ApiError`] from the call; a phone owned by another account is a 400.
pub async fn update_me(api: &ApiClient, update: &ProfileUpdate) -> Result<UserRecord, ApiError> {
    api.patch(AUTH_ME, update).await
}

// =============================================================================
// ACCOUNTING
// =============================================================================

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn list_categories(api: &ApiClient) -> Result<Vec<Category>, ApiError> {
    api.get(ACCOUNTING_CATEGORIES).await
}

/// Expenses newest first.
///
/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn list_expenses(api: &ApiClient) -> Result<Vec<Expense>, ApiError> {
    api.get(ACCOUNTING_EXPENSES).await
}

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn create_expense(api: &ApiClient, expense: &NewExpense) -> Result<Expense, ApiError> {
    api.post(ACCOUNTING_EXPENSES, expense).await
}

/// Replace every field of an expense.
///
/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn update_expense(api: &ApiClient, expense_id: i64, expense: &NewExpense) -> Result<Expense, ApiError> {
    api.patch(&expense_endpoint(expense_id), expense).await
}

/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn delete_expense(api: &ApiClient, expense_id: i64) -> Result<Value, ApiError> {
    api.delete(&expense_endpoint(expense_id)).await
}

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn accounting_summary(api: &ApiClient) -> Result<AccountingSummary, ApiError> {
    api.get(ACCOUNTING_SUMMARY).await
}

// =============================================================================
// CAREER
// =============================================================================

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn list_applications(api: &ApiClient) -> Result<Vec<JobApplication>, ApiError> {
    api.get(CAREER_APPLICATIONS).await
}

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn create_application(
    api: &ApiClient,
    application: &NewJobApplication,
) -> Result<JobApplication, ApiError> {
    api.post(CAREER_APPLICATIONS, application).await
}

/// The backend reads the new status from the query string.
///
/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn update_application_status(
    api: &ApiClient,
    application_id: i64,
    status: &str,
) -> Result<JobApplication, ApiError> {
    let empty = serde_json::Map::new();
    api.patch_query(&application_endpoint(application_id), &[("status", status)], &empty)
        .await
}

/// Career profile; the backend creates an empty one on first read.
///
/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn career_profile(api: &ApiClient) -> Result<CareerProfile, ApiError> {
    api.get(CAREER_PROFILE).await
}

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn save_career_profile(
    api: &ApiClient,
    profile: &CareerProfileUpdate,
) -> Result<CareerProfile, ApiError> {
    api.put(CAREER_PROFILE, profile).await
}

// =============================================================================
// SUPPLY
// =============================================================================

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn list_supply_items(api: &ApiClient) -> Result<Vec<SupplyItem>, ApiError> {
    api.get(SUPPLY_ITEMS).await
}

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn create_supply_item(api: &ApiClient, item: &NewSupplyItem) -> Result<SupplyItem, ApiError> {
    api.post(SUPPLY_ITEMS, item).await
}

/// The backend reads the new status from the query string.
///
/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn update_supply_status(api: &ApiClient, item_id: i64, status: &str) -> Result<SupplyItem, ApiError> {
    let empty = serde_json::Map::new();
    api.patch_query(&supply_item_endpoint(item_id), &[("status", status)], &empty)
        .await
}

/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn delete_supply_item(api: &ApiClient, item_id: i64) -> Result<Value, ApiError> {
    api.delete(&supply_item_endpoint(item_id)).await
}

// =============================================================================
// SURVEY
// =============================================================================

/// Surveys owned by the caller.
///
/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn list_surveys(api: &ApiClient) -> Result<Vec<Survey>, ApiError> {
    api.get(SURVEYS).await
}

/// # Errors
///
/// Any [`ApiError`] from the call.
pub async fn create_survey(api: &ApiClient, survey: &NewSurvey) -> Result<Survey, ApiError> {
    api.post(SURVEYS, survey).await
}

/// Public survey fetch; no token required.
///
/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn get_survey(api: &ApiClient, survey_id: i64) -> Result<Survey, ApiError> {
    api.get(&survey_endpoint(survey_id)).await
}

/// Public response submission; no token required.
///
/// # Errors
///
/// Any [`ApiError`] from the call; an unknown id is a 404.
pub async fn submit_survey_response(
    api: &ApiClient,
    survey_id: i64,
    response: &NewSurveyResponse,
) -> Result<SurveyResponse, ApiError> {
    api.post(&survey_responses_endpoint(survey_id), response).await
}
