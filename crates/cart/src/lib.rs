//! Cart domain module.
//!
//! This crate contains the business rules of the shopping cart, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). Remote
//! catalog and stock data enter through commands.

pub mod cart;
pub mod product;
pub mod summary;

pub use cart::{
    AddProduct, Cart, CartCleared, CartCommand, CartEvent, ClearCart, ProductAdded,
    ProductAmountChanged, ProductRemoved, RemoveProduct, UpdateProductAmount,
};
pub use product::{Product, Stock};
pub use summary::{CartSummary, LineSummary};
