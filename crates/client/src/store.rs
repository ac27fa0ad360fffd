//! Cart state container: remote checks, domain decisions, persistence.
//!
//! Every mutation follows the same path:
//! 1. fetch whatever remote data the decision needs (product, stock)
//! 2. let the `Cart` aggregate decide on a copy of the current state
//! 3. persist the copy under [`CART_STORAGE_KEY`]
//! 4. commit the copy in memory
//!
//! A failure at any step leaves both the in-memory cart and the stored slot as
//! they were, and raises one generic notification for the operation.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use rocketshoes_cart::{
    AddProduct, Cart, CartCommand, CartEvent, CartSummary, ClearCart, RemoveProduct,
    UpdateProductAmount,
};
use rocketshoes_core::{Aggregate, DomainError, Event, ProductId};

use crate::api::CatalogApi;
use crate::error::CartError;
use crate::notify::{Notification, Notifier};
use crate::storage::CartStorage;

/// Storage slot holding the JSON array of cart products.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

pub(crate) const MSG_ADDED: &str = "Item added";
pub(crate) const MSG_REMOVED: &str = "Item removed";
pub(crate) const MSG_UPDATED: &str = "Quantity updated";
pub(crate) const MSG_CLEARED: &str = "Cart cleared";
pub(crate) const MSG_OUT_OF_STOCK: &str = "Requested quantity is out of stock";
pub(crate) const MSG_ADD_FAILED: &str = "Failed to add product";
pub(crate) const MSG_REMOVE_FAILED: &str = "Failed to remove product";
pub(crate) const MSG_UPDATE_FAILED: &str = "Failed to update product quantity";
pub(crate) const MSG_CLEAR_FAILED: &str = "Failed to clear cart";

/// Request to set the exact quantity of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAmount {
    pub product_id: ProductId,
    pub amount: u32,
}

pub struct CartStore {
    api: Arc<dyn CatalogApi>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
    cart: Cart,
}

impl core::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStore").field("cart", &self.cart).finish_non_exhaustive()
    }
}

impl CartStore {
    /// Restore the cart from storage; an empty slot yields an empty cart.
    pub async fn open(
        api: Arc<dyn CatalogApi>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CartError> {
        let cart = match storage.load(CART_STORAGE_KEY).await? {
            Some(raw) => serde_json::from_str::<Cart>(&raw).map_err(CartError::Corrupt)?,
            None => Cart::new(),
        };

        tracing::info!(products = cart.len(), "cart restored");

        Ok(Self {
            api,
            storage,
            notifier,
            cart,
        })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn summary(&self) -> CartSummary {
        self.cart.summary()
    }

    /// Add one unit of `product_id`, inserting it when absent.
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<&Cart, CartError> {
        let result = self.try_add_product(product_id).await;
        self.finish(result, MSG_ADDED, MSG_ADD_FAILED)
    }

    pub async fn remove_product(&mut self, product_id: ProductId) -> Result<&Cart, CartError> {
        let result = self
            .commit(CartCommand::RemoveProduct(RemoveProduct {
                product_id,
                occurred_at: Utc::now(),
            }))
            .await;
        self.finish(result, MSG_REMOVED, MSG_REMOVE_FAILED)
    }

    /// Set the exact quantity of a cart line. An amount of zero does nothing.
    pub async fn update_product_amount(
        &mut self,
        request: UpdateAmount,
    ) -> Result<&Cart, CartError> {
        if request.amount == 0 {
            return Ok(&self.cart);
        }
        let result = self.try_update_amount(request).await;
        self.finish(result, MSG_UPDATED, MSG_UPDATE_FAILED)
    }

    pub async fn clear(&mut self) -> Result<&Cart, CartError> {
        let result = self
            .commit(CartCommand::ClearCart(ClearCart {
                occurred_at: Utc::now(),
            }))
            .await;
        self.finish(result, MSG_CLEARED, MSG_CLEAR_FAILED)
    }

    async fn try_add_product(&mut self, product_id: ProductId) -> Result<Vec<CartEvent>, CartError> {
        let (product, stock) =
            tokio::try_join!(self.api.product(product_id), self.api.stock(product_id))?;

        self.commit(CartCommand::AddProduct(AddProduct {
            product,
            stock,
            occurred_at: Utc::now(),
        }))
        .await
    }

    async fn try_update_amount(
        &mut self,
        request: UpdateAmount,
    ) -> Result<Vec<CartEvent>, CartError> {
        if !self.cart.contains(request.product_id) {
            return Err(DomainError::not_in_cart(request.product_id).into());
        }
        let stock = self.api.stock(request.product_id).await?;

        self.commit(CartCommand::UpdateProductAmount(UpdateProductAmount {
            product_id: request.product_id,
            amount: request.amount,
            stock,
            occurred_at: Utc::now(),
        }))
        .await
    }

    async fn commit(&mut self, command: CartCommand) -> Result<Vec<CartEvent>, CartError> {
        let mut next = self.cart.clone();
        let events = next.execute(&command)?;
        if events.is_empty() {
            return Ok(events);
        }

        let payload = serde_json::to_string(&next).map_err(CartError::Encode)?;
        self.storage.save(CART_STORAGE_KEY, &payload).await?;

        for event in &events {
            tracing::info!(
                event_type = event.event_type(),
                occurred_at = %event.occurred_at(),
                "cart event applied"
            );
        }
        self.cart = next;
        Ok(events)
    }

    fn finish(
        &self,
        result: Result<Vec<CartEvent>, CartError>,
        success: &'static str,
        failure: &'static str,
    ) -> Result<&Cart, CartError> {
        match result {
            Ok(events) => {
                if !events.is_empty() {
                    self.notifier.notify(Notification::success(success));
                }
                Ok(&self.cart)
            }
            Err(err) => {
                tracing::warn!(error = %err, "cart operation failed");
                let message = if err.is_out_of_stock() {
                    MSG_OUT_OF_STOCK
                } else {
                    failure
                };
                self.notifier.notify(Notification::error(message));
                Err(err)
            }
        }
    }
}
