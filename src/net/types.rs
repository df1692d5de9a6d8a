//! Wire types for the cbx.life REST API.
//!
//! The backend owns these records. Fields the client never reads are still
//! decoded where the pages display them; unknown fields are ignored so the
//! backend can grow without breaking older clients.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// AUTH
// =============================================================================

/// Who is logged in, as returned by `GET /auth/me`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserIdentity {
    /// True when no field names anyone. `/auth/me` never answers this way
    /// for a real account.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [&self.email, &self.phone, &self.full_name]
            .into_iter()
            .all(|field| field.as_deref().is_none_or(str::is_empty))
    }

    /// Best human label: full name, then email, then phone.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref())
            .or(self.phone.as_deref())
            .unwrap_or("")
    }
}

/// Full user record returned by register and profile updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(flatten)]
    pub identity: UserIdentity,
}

/// Body of `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Form body of `POST /auth/login`. `username` may be an email or a phone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// Body of `PATCH /auth/me`. `phone: None` is sent as `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: Option<String>,
}

// =============================================================================
// ACCOUNTING
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A stored expense or income entry. `amount` is in cents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub amount: f64,
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub is_income: bool,
    pub category_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
}

impl Expense {
    #[must_use]
    pub fn amount_dollars(&self) -> f64 {
        self.amount / 100.0
    }

    /// Signed dollar amount: income positive, expense negative.
    #[must_use]
    pub fn signed_dollars(&self) -> f64 {
        if self.is_income {
            self.amount_dollars()
        } else {
            -self.amount_dollars()
        }
    }
}

/// Body for creating or replacing an expense. `amount` is in dollars; the
/// backend converts to cents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewExpense {
    pub amount: f64,
    pub description: String,
    pub date: String,
    pub is_income: bool,
    pub category_id: i64,
}

/// Response of `GET /accounting/summary`, in dollars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountingSummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

// =============================================================================
// CAREER
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub company: String,
    pub position: String,
    pub status: String,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub application_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewJobApplication {
    pub company: String,
    pub position: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Default status for a freshly added application.
pub const APPLICATION_STATUS_APPLIED: &str = "Applied";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<Value>,
    #[serde(default)]
    pub education: Vec<Value>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `PUT /career/profile`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CareerProfileUpdate {
    pub headline: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<Value>,
    pub education: Vec<Value>,
}

impl From<&CareerProfile> for CareerProfileUpdate {
    fn from(profile: &CareerProfile) -> Self {
        Self {
            headline: profile.headline.clone(),
            skills: profile.skills.clone(),
            experience: profile.experience.clone(),
            education: profile.education.clone(),
        }
    }
}

// =============================================================================
// SUPPLY
// =============================================================================

pub const SUPPLY_STATUS_TO_BUY: &str = "TO_BUY";
pub const SUPPLY_STATUS_IN_STOCK: &str = "IN_STOCK";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub status: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SupplyItem {
    #[must_use]
    pub fn is_to_buy(&self) -> bool {
        self.status == SUPPLY_STATUS_TO_BUY
    }

    /// Status after a toggle: to-buy items become in-stock and vice versa.
    #[must_use]
    pub fn toggled_status(&self) -> &'static str {
        if self.is_to_buy() {
            SUPPLY_STATUS_IN_STOCK
        } else {
            SUPPLY_STATUS_TO_BUY
        }
    }
}

fn default_quantity() -> i64 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewSupplyItem {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub status: String,
}

// =============================================================================
// SURVEY
// =============================================================================

/// Kinds of survey question the editor offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Text,
    LongText,
    MultipleChoice,
    Checkbox,
    Rating,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Body of `POST /surveys/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewSurvey {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

/// Answers keyed by question id.
pub type Answers = BTreeMap<String, Value>;

/// Body of `POST /surveys/{id}/responses`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewSurveyResponse {
    pub answers: Answers,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: i64,
    pub survey_id: i64,
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// PORTAL
// =============================================================================

/// One module tile on the dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub notifications: u32,
}

/// Response of `GET /portal/stats`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalStats {
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub modules: Vec<ModuleSummary>,
}

impl PortalStats {
    #[must_use]
    pub fn total_notifications(&self) -> u32 {
        self.modules.iter().map(|m| m.notifications).sum()
    }
}

/// Response of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
