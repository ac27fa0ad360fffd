use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rocketshoes_core::{Entity, ProductId};

/// A catalog product, optionally carrying the quantity held in the cart.
///
/// Catalog responses omit `amount`; it deserializes to `0` there. Entries
/// inside a [`crate::Cart`] always have `amount >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(alias = "title")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    #[serde(default)]
    pub amount: u32,
}

impl Product {
    /// Copy of this product holding `amount` units.
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }

    /// `price * amount`.
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.amount)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Maximum purchasable quantity of a product, as reported by the stock service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}

impl Stock {
    pub fn new(id: ProductId, amount: u32) -> Self {
        Self { id, amount }
    }

    /// Whether `requested` units can be held given this stock level.
    pub fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}
