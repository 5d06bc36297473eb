//! Order status report.

use serde::Serialize;

use shopfloor_manufacturing::OrderStatus;

use crate::error::ServiceResult;
use crate::store::Store;

/// Count of manufacturing orders per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub total: usize,
    pub planned: usize,
    pub confirmed: usize,
    pub in_progress: usize,
    /// Orders in `done`.
    pub completed: usize,
    pub cancelled: usize,
}

pub fn order_summary<S: Store>(store: &S) -> ServiceResult<OrderSummary> {
    Ok(store.read(|s| {
        s.orders()
            .into_iter()
            .fold(OrderSummary::default(), |mut acc, order| {
                acc.total += 1;
                match order.status() {
                    OrderStatus::Planned => acc.planned += 1,
                    OrderStatus::Confirmed => acc.confirmed += 1,
                    OrderStatus::InProgress => acc.in_progress += 1,
                    OrderStatus::Done => acc.completed += 1,
                    OrderStatus::Cancelled => acc.cancelled += 1,
                }
                acc
            })
    })?)
}
