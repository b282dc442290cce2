use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{OrderId, OrderItemId};

use crate::event::Event;

/// Fulfillment state of a single order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    Unfulfilled,
    Pending,
    OnHold,
    AwaitingShipment,
    PartiallyFulfilled,
    ReadyForPickup,
    ReadyForDelivery,
    Fulfilled,
    Cancelled,
}

impl FulfillmentStatus {
    /// Terminal states accept no further fulfillment transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }
}

/// Payload shared by every order item notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemNotification {
    pub order_id: OrderId,
    pub order_item_id: OrderItemId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum OrderItemEvent {
    /// The item went into `Fulfilled` by being shipped.
    OrderItemShipped(OrderItemNotification),
    /// The item went from `ReadyForPickup` into `Fulfilled`.
    OrderItemPickedUp(OrderItemNotification),
    OrderItemReadyForPickup(OrderItemNotification),
    OrderItemPutOnHold(OrderItemNotification),
    OrderItemCancelled(OrderItemNotification),
}

impl OrderItemEvent {
    /// The notification an order module emits when an item's fulfillment
    /// status moves from `from` to `to`, if any.
    pub fn for_transition(
        from: FulfillmentStatus,
        to: FulfillmentStatus,
        payload: OrderItemNotification,
    ) -> Option<Self> {
        if from == to {
            return None;
        }

        match to {
            FulfillmentStatus::Fulfilled if from == FulfillmentStatus::ReadyForPickup => {
                Some(Self::OrderItemPickedUp(payload))
            }
            FulfillmentStatus::Fulfilled => Some(Self::OrderItemShipped(payload)),
            FulfillmentStatus::ReadyForPickup => Some(Self::OrderItemReadyForPickup(payload)),
            FulfillmentStatus::OnHold => Some(Self::OrderItemPutOnHold(payload)),
            FulfillmentStatus::Cancelled => Some(Self::OrderItemCancelled(payload)),
            _ => None,
        }
    }

    pub fn payload(&self) -> &OrderItemNotification {
        match self {
            Self::OrderItemShipped(p)
            | Self::OrderItemPickedUp(p)
            | Self::OrderItemReadyForPickup(p)
            | Self::OrderItemPutOnHold(p)
            | Self::OrderItemCancelled(p) => p,
        }
    }
}

impl Event for OrderItemEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::OrderItemShipped(_) => "order.item.shipped",
            Self::OrderItemPickedUp(_) => "order.item.picked_up",
            Self::OrderItemReadyForPickup(_) => "order.item.ready_for_pickup",
            Self::OrderItemPutOnHold(_) => "order.item.put_on_hold",
            Self::OrderItemCancelled(_) => "order.item.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.payload().occurred_at
    }
}
