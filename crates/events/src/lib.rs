//! Order and fulfillment notification events.
//!
//! These are plain, immutable payloads emitted by an external order module.
//! Nothing in this workspace dispatches or consumes them; they only fix the
//! shape other modules can rely on.

pub mod event;
pub mod order;

pub use event::Event;
pub use order::{FulfillmentStatus, OrderItemEvent, OrderItemNotification};
