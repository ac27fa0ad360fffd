//! Derived totals for display (header badge, cart page footer).

use rust_decimal::Decimal;
use serde::Serialize;

use rocketshoes_core::ProductId;

use crate::cart::Cart;

/// One cart line with its computed subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub product_id: ProductId,
    pub name: String,
    pub amount: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<LineSummary>,
    /// Number of distinct products.
    pub distinct_products: usize,
    pub total_units: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CartSummary {
    pub fn of(cart: &Cart) -> Self {
        let lines: Vec<LineSummary> = cart
            .iter()
            .map(|p| LineSummary {
                product_id: p.id,
                name: p.name.clone(),
                amount: p.amount,
                unit_price: p.price,
                subtotal: p.subtotal(),
            })
            .collect();

        let total_units = lines.iter().map(|l| u64::from(l.amount)).sum();
        let total = lines.iter().map(|l| l.subtotal).sum();

        Self {
            distinct_products: lines.len(),
            total_units,
            total,
            lines,
        }
    }
}

impl Cart {
    pub fn summary(&self) -> CartSummary {
        CartSummary::of(self)
    }
}
