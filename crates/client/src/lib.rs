//! `rocketshoes-client`
//!
//! **Responsibility:** the IO shell around the cart domain.
//!
//! This crate provides:
//! - A catalog/stock HTTP client
//! - A string key-value storage slot for the serialized cart
//! - User-facing notifications
//! - `CartStore`, which ties the three together around the `Cart` aggregate
//!
//! The remote catalog stays the authority on stock; the store only checks
//! limits at the time of each mutation.

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use api::{ApiError, CatalogApi, HttpCatalog};
pub use config::ClientConfig;
pub use error::CartError;
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use storage::{CartStorage, MemoryStorage, SqliteStorage, StorageError};
pub use store::{CART_STORAGE_KEY, CartStore, UpdateAmount};
