use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfloor_core::{DomainError, ManufacturingOrderId, ProductId};

/// Manufacturing order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Planned,
    Confirmed,
    InProgress,
    Done,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Planned,
        OrderStatus::Confirmed,
        OrderStatus::InProgress,
        OrderStatus::Done,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Planned => "planned",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Transition table.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Planned, Confirmed)
                | (Planned, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Done)
                | (InProgress, Cancelled)
        )
    }

    /// Whether the order has been released to the floor and not cancelled.
    /// Only released orders may have their components consumed.
    pub fn is_released(self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::InProgress | OrderStatus::Done)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown order status '{s}'")))
    }
}

/// Scheduling metadata. Opaque strings, not interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSchedule {
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub assignee: Option<String>,
}

/// Partial update of an order's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub quantity: Option<u32>,
    pub start_date: Option<String>,
    pub deadline: Option<String>,
    pub assignee: Option<String>,
}

/// Input for creating a manufacturing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManufacturingOrder {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Either `Planned` or `Confirmed`.
    pub status: OrderStatus,
    pub schedule: OrderSchedule,
}

/// Side effect the caller must carry out after a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderEffect {
    None,
    /// The order was confirmed: generate work orders from the BOM routing and
    /// consume components for the whole order quantity.
    Release,
}

/// A request to build `quantity` units of `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturingOrder {
    id: ManufacturingOrderId,
    product_id: ProductId,
    quantity: u32,
    status: OrderStatus,
    schedule: OrderSchedule,
    created_at: DateTime<Utc>,
}

impl ManufacturingOrder {
    /// Build a `planned` order.
    ///
    /// When `input.status` is `Confirmed` the caller follows up with
    /// [`ManufacturingOrder::transition`] so confirmation side effects run
    /// through the same path as a later confirmation.
    pub fn create(
        id: ManufacturingOrderId,
        input: &NewManufacturingOrder,
        at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if input.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if !matches!(input.status, OrderStatus::Planned | OrderStatus::Confirmed) {
            return Err(DomainError::validation(format!(
                "orders are created as planned or confirmed, not {}",
                input.status
            )));
        }

        Ok(Self {
            id,
            product_id: input.product_id,
            quantity: input.quantity,
            status: OrderStatus::Planned,
            schedule: input.schedule.clone(),
            created_at: at,
        })
    }

    pub fn id(&self) -> ManufacturingOrderId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn schedule(&self) -> &OrderSchedule {
        &self.schedule
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn transition(&mut self, next: OrderStatus) -> Result<OrderEffect, DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invalid_transition(self.status, next));
        }
        self.status = next;
        Ok(match next {
            OrderStatus::Confirmed => OrderEffect::Release,
            _ => OrderEffect::None,
        })
    }

    /// Apply a patch. Quantity is only editable while the order is planned,
    /// since confirmation consumes stock for it.
    pub fn update(&mut self, patch: OrderPatch) -> Result<(), DomainError> {
        if let Some(quantity) = patch.quantity {
            if quantity == 0 {
                return Err(DomainError::validation("quantity must be at least 1"));
            }
            if quantity != self.quantity && self.status != OrderStatus::Planned {
                return Err(DomainError::conflict(format!(
                    "quantity cannot change once the order is {}",
                    self.status
                )));
            }
            self.quantity = quantity;
        }
        if patch.start_date.is_some() {
            self.schedule.start_date = patch.start_date;
        }
        if patch.deadline.is_some() {
            self.schedule.deadline = patch.deadline;
        }
        if patch.assignee.is_some() {
            self.schedule.assignee = patch.assignee;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order(quantity: u32, status: OrderStatus) -> NewManufacturingOrder {
        NewManufacturingOrder {
            product_id: ProductId::new(),
            quantity,
            status,
            schedule: OrderSchedule::default(),
        }
    }

    fn planned_order() -> ManufacturingOrder {
        ManufacturingOrder::create(
            ManufacturingOrderId::new(),
            &new_order(3, OrderStatus::Planned),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_starts_planned_even_when_confirmation_requested() {
        let mo = ManufacturingOrder::create(
            ManufacturingOrderId::new(),
            &new_order(3, OrderStatus::Confirmed),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(mo.status(), OrderStatus::Planned);
    }

    #[test]
    fn create_rejects_zero_quantity_and_late_statuses() {
        let id = ManufacturingOrderId::new();
        assert!(ManufacturingOrder::create(id, &new_order(0, OrderStatus::Planned), Utc::now()).is_err());
        assert!(ManufacturingOrder::create(id, &new_order(1, OrderStatus::Done), Utc::now()).is_err());
    }

    #[test]
    fn confirming_releases_the_order() {
        let mut mo = planned_order();
        assert_eq!(mo.transition(OrderStatus::Confirmed).unwrap(), OrderEffect::Release);
        assert_eq!(mo.transition(OrderStatus::InProgress).unwrap(), OrderEffect::None);
        assert_eq!(mo.transition(OrderStatus::Done).unwrap(), OrderEffect::None);
    }

    #[test]
    fn undefined_transitions_are_rejected_without_change() {
        let mut mo = planned_order();
        mo.transition(OrderStatus::Confirmed).unwrap();

        let err = mo.transition(OrderStatus::Confirmed).unwrap_err();
        assert_eq!(err, DomainError::invalid_transition("confirmed", "confirmed"));
        assert!(mo.transition(OrderStatus::Planned).is_err());
        assert_eq!(mo.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn only_confirmed_and_later_count_as_released() {
        let released: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.is_released()).collect();
        assert_eq!(released, vec![OrderStatus::Confirmed, OrderStatus::InProgress, OrderStatus::Done]);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [OrderStatus::Done, OrderStatus::Cancelled] {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} -> {to} allowed");
            }
        }
    }

    #[test]
    fn quantity_is_frozen_after_confirmation() {
        let mut mo = planned_order();
        mo.update(OrderPatch {
            quantity: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mo.quantity(), 5);

        mo.transition(OrderStatus::Confirmed).unwrap();
        let err = mo
            .update(OrderPatch {
                quantity: Some(7),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        mo.update(OrderPatch {
            assignee: Some("ada".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mo.schedule().assignee.as_deref(), Some("ada"));
    }

    #[test]
    fn status_parses_from_wire_names() {
        assert_eq!("in_progress".parse::<OrderStatus>().unwrap(), OrderStatus::InProgress);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
