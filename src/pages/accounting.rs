//! Accounting: categories, expense list, running summary.
//!
//! DESIGN
//! ======
//! Listed amounts are cents; the form works in dollars and sends dollars.
//! The backend multiplies by 100 on write, so an edit pre-fills the form with
//! `amount_dollars()` and never converts a second time.

#[cfg(test)]
#[path = "accounting_test.rs"]
mod accounting_test;

use super::{FormError, PageError, ensure_access, fetch, non_blank};
use crate::net::api;
use crate::net::http::{ApiClient, ApiError};
use crate::net::types::{AccountingSummary, Category, Expense, NewExpense};
use crate::state::resource::Resource;
use crate::state::route::Route;
use crate::state::session::SessionStore;

#[derive(Debug, Default)]
pub struct AccountingPage {
    pub categories: Resource<Vec<Category>>,
    pub expenses: Resource<Vec<Expense>>,
    pub summary: Resource<AccountingSummary>,
}

impl AccountingPage {
    /// # Errors
    ///
    /// Returns the redirect route when the session is anonymous.
    pub async fn load(&mut self, session: &SessionStore) -> Result<(), Route> {
        ensure_access(Route::Accounting, session)?;
        let api = session.api();
        fetch(&mut self.categories, api::list_categories(api)).await;
        self.refresh(api).await;
        Ok(())
    }

    /// Re-list expenses and the summary after a mutation.
    pub async fn refresh(&mut self, api: &ApiClient) {
        fetch(&mut self.expenses, api::list_expenses(api)).await;
        fetch(&mut self.summary, api::accounting_summary(api)).await;
    }

    /// # Errors
    ///
    /// [`PageError::Form`] if the form is invalid (nothing is sent), else any
    /// backend failure.
    pub async fn add(&mut self, api: &ApiClient, form: &ExpenseForm) -> Result<Expense, PageError> {
        let body = form.validate()?;
        let created = api::create_expense(api, &body).await?;
        self.refresh(api).await;
        Ok(created)
    }

    /// # Errors
    ///
    /// Same as [`AccountingPage::add`]; an unknown id is a 404.
    pub async fn update(&mut self, api: &ApiClient, expense_id: i64, form: &ExpenseForm) -> Result<Expense, PageError> {
        let body = form.validate()?;
        let updated = api::update_expense(api, expense_id, &body).await?;
        self.refresh(api).await;
        Ok(updated)
    }

    /// # Errors
    ///
    /// Any backend failure; the list is left untouched.
    pub async fn delete(&mut self, api: &ApiClient, expense_id: i64) -> Result<(), ApiError> {
        api::delete_expense(api, expense_id).await?;
        self.refresh(api).await;
        Ok(())
    }

    #[must_use]
    pub fn find(&self, expense_id: i64) -> Option<&Expense> {
        self.expenses.data()?.iter().find(|e| e.id == expense_id)
    }

    #[must_use]
    pub fn category_name(&self, category_id: i64) -> Option<&str> {
        self.categories
            .data()?
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.name.as_str())
    }
}

/// Add/edit form fields as typed by the user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub date: String,
    pub is_income: bool,
    pub category_id: Option<i64>,
}

impl ExpenseForm {
    /// Pre-fill for editing; the stored cents become dollars.
    #[must_use]
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            amount: format!("{:.2}", expense.amount_dollars()),
            description: expense.description.clone(),
            date: expense.date.clone(),
            is_income: expense.is_income,
            category_id: Some(expense.category_id),
        }
    }

    /// # Errors
    ///
    /// The first invalid field, in form order.
    pub fn validate(&self) -> Result<NewExpense, FormError> {
        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| FormError::Invalid("Amount must be a number"))?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FormError::Invalid("Amount must be greater than 0"));
        }
        let description = non_blank(&self.description).ok_or(FormError::Required("Description"))?;
        let date = non_blank(&self.date).ok_or(FormError::Required("Date"))?;
        let category_id = self.category_id.ok_or(FormError::Required("Category"))?;
        Ok(NewExpense {
            amount,
            description,
            date,
            is_income: self.is_income,
            category_id,
        })
    }
}
