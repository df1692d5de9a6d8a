//! Household supply list.

#[cfg(test)]
#[path = "supply_test.rs"]
mod supply_test;

use super::{FormError, PageError, ensure_access, fetch, non_blank};
use crate::net::api;
use crate::net::http::{ApiClient, ApiError};
use crate::net::types::{NewSupplyItem, SUPPLY_STATUS_TO_BUY, SupplyItem};
use crate::state::resource::Resource;
use crate::state::route::Route;
use crate::state::session::SessionStore;

const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Default)]
pub struct SupplyPage {
    pub items: Resource<Vec<SupplyItem>>,
}

impl SupplyPage {
    /// # Errors
    ///
    /// Returns the redirect route when the session is anonymous.
    pub async fn load(&mut self, session: &SessionStore) -> Result<(), Route> {
        ensure_access(Route::Supply, session)?;
        self.refresh(session.api()).await;
        Ok(())
    }

    pub async fn refresh(&mut self, api: &ApiClient) {
        fetch(&mut self.items, api::list_supply_items(api)).await;
    }

    /// # Errors
    ///
    /// [`PageError::Form`] for a blank name or a quantity below one, else any
    /// backend failure.
    pub async fn add(&mut self, api: &ApiClient, form: &SupplyForm) -> Result<SupplyItem, PageError> {
        let body = form.validate()?;
        let created = api::create_supply_item(api, &body).await?;
        self.refresh(api).await;
        Ok(created)
    }

    /// Flip an item between to-buy and in-stock.
    ///
    /// The new status comes from the listed item, so toggling an item that
    /// is not in the current list is a 404 without a request.
    ///
    /// # Errors
    ///
    /// Any backend failure.
    pub async fn toggle(&mut self, api: &ApiClient, item_id: i64) -> Result<(), ApiError> {
        let status = self
            .find(item_id)
            .map(SupplyItem::toggled_status)
            .ok_or_else(|| ApiError::status(404, "Item not found"))?;
        self.set_status(api, item_id, status).await
    }

    /// # Errors
    ///
    /// Any backend failure; an unknown id is a 404.
    pub async fn set_status(&mut self, api: &ApiClient, item_id: i64, status: &str) -> Result<(), ApiError> {
        api::update_supply_status(api, item_id, status).await?;
        self.refresh(api).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Any backend failure; an unknown id is a 404.
    pub async fn delete(&mut self, api: &ApiClient, item_id: i64) -> Result<(), ApiError> {
        api::delete_supply_item(api, item_id).await?;
        self.refresh(api).await;
        Ok(())
    }

    #[must_use]
    pub fn find(&self, item_id: i64) -> Option<&SupplyItem> {
        self.items.data()?.iter().find(|i| i.id == item_id)
    }

    #[must_use]
    pub fn to_buy(&self) -> Vec<&SupplyItem> {
        self.partition(true)
    }

    #[must_use]
    pub fn in_stock(&self) -> Vec<&SupplyItem> {
        self.partition(false)
    }

    fn partition(&self, to_buy: bool) -> Vec<&SupplyItem> {
        self.items
            .data()
            .map(|items| items.iter().filter(|i| i.is_to_buy() == to_buy).collect())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyForm {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub status: String,
}

impl Default for SupplyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: DEFAULT_CATEGORY.to_owned(),
            quantity: 1,
            status: SUPPLY_STATUS_TO_BUY.to_owned(),
        }
    }
}

impl SupplyForm {
    /// # Errors
    ///
    /// [`FormError`] for a blank name or a quantity below one.
    pub fn validate(&self) -> Result<NewSupplyItem, FormError> {
        let name = non_blank(&self.name).ok_or(FormError::Required("Name"))?;
        if self.quantity < 1 {
            return Err(FormError::Invalid("Quantity must be at least 1"));
        }
        Ok(NewSupplyItem {
            name,
            category: non_blank(&self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            quantity: self.quantity,
            status: self.status.clone(),
        })
    }
}
