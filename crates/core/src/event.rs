use chrono::{DateTime, Utc};

/// A domain event emitted by an aggregate.
///
/// Events are facts: once produced by `Aggregate::handle` they are only ever
/// applied, never edited.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "cart.product.added").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
