//! Manufacturing and work order lifecycles.
//!
//! Status changes that draw stock (order confirmation, work order completion)
//! run in the same transaction as the consumption they trigger: if consumption
//! fails, the status change, any generated work orders and all ledger entries
//! are discarded together.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use shopfloor_core::{ManufacturingOrderId, WorkOrderId};
use shopfloor_manufacturing::{
    ConsumptionTrigger, ManufacturingOrder, NewManufacturingOrder, NewWorkOrder, OrderEffect,
    OrderPatch, OrderStatus, WorkOrder, WorkOrderStatus, WorkOrderTransition,
};

use crate::consumption::{self, log_committed, ConsumptionEngine, ConsumptionReport};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{Store, UnitOfWork};

/// Result of creating or transitioning a manufacturing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderOutcome {
    pub order: ManufacturingOrder,
    /// Work orders generated by this call (confirmation only).
    pub work_orders: Vec<WorkOrder>,
    /// Present when this call consumed stock.
    pub consumption: Option<ConsumptionReport>,
}

/// Result of transitioning a work order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkOrderOutcome {
    pub work_order: WorkOrder,
    pub consumption: Option<ConsumptionReport>,
}

#[derive(Debug, Clone)]
pub struct Production<S> {
    store: S,
    engine: ConsumptionEngine<S>,
}

impl<S: Store + Clone> Production<S> {
    pub fn new(store: S) -> Self {
        Self {
            engine: ConsumptionEngine::new(store.clone()),
            store,
        }
    }

    /// Create an order as `planned` or `confirmed`.
    ///
    /// A confirmed order is released in the same transaction: work orders are
    /// generated and stock consumed, or the order is not created at all.
    #[instrument(skip_all, fields(product_id = %input.product_id, quantity = input.quantity, status = %input.status), err)]
    pub fn create_order(&self, input: NewManufacturingOrder, at: DateTime<Utc>) -> ServiceResult<OrderOutcome> {
        let mut order = ManufacturingOrder::create(ManufacturingOrderId::new(), &input, at)?;

        let outcome = self.store.transaction(|tx| -> ServiceResult<OrderOutcome> {
            if tx.product(order.product_id()).is_none() {
                return Err(ServiceError::not_found(format!("product {}", order.product_id())));
            }
            if input.status == OrderStatus::Confirmed {
                let effect = order.transition(OrderStatus::Confirmed)?;
                apply_order_effect(tx, order, effect, at)
            } else {
                tx.put_order(order.clone());
                Ok(OrderOutcome {
                    order,
                    work_orders: Vec::new(),
                    consumption: None,
                })
            }
        })?;

        if let Some(report) = &outcome.consumption {
            log_committed(report);
        }
        info!(mo_id = %outcome.order.id(), status = %outcome.order.status(), work_orders = outcome.work_orders.len(), "order created");
        Ok(outcome)
    }

    pub fn list_orders(&self, status: Option<OrderStatus>) -> ServiceResult<Vec<ManufacturingOrder>> {
        Ok(self.store.read(|s| {
            s.orders()
                .into_iter()
                .filter(|o| status.is_none_or(|st| o.status() == st))
                .cloned()
                .collect()
        })?)
    }

    pub fn get_order(&self, id: ManufacturingOrderId) -> ServiceResult<ManufacturingOrder> {
        self.store
            .read(|s| s.order(id).cloned())?
            .ok_or_else(|| ServiceError::not_found(format!("manufacturing order {id}")))
    }

    /// Edit schedule metadata (and quantity while planned).
    #[instrument(skip(self, patch), err)]
    pub fn update_order(&self, id: ManufacturingOrderId, patch: OrderPatch) -> ServiceResult<ManufacturingOrder> {
        self.store.transaction(|tx| -> ServiceResult<ManufacturingOrder> {
            let mut order = load_order(tx, id)?;
            order.update(patch)?;
            tx.put_order(order.clone());
            Ok(order)
        })
    }

    /// Move an order through its lifecycle. Entering `confirmed` releases it.
    #[instrument(skip(self, at), err)]
    pub fn transition_order(
        &self,
        id: ManufacturingOrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> ServiceResult<OrderOutcome> {
        let outcome = self.store.transaction(|tx| -> ServiceResult<OrderOutcome> {
            let mut order = load_order(tx, id)?;
            let effect = order.transition(status)?;
            apply_order_effect(tx, order, effect, at)
        })?;

        if let Some(report) = &outcome.consumption {
            log_committed(report);
        }
        info!(mo_id = %id, status = %status, "order transitioned");
        Ok(outcome)
    }

    /// Delete an order and its work orders. Ledger history is kept.
    #[instrument(skip(self), err)]
    pub fn delete_order(&self, id: ManufacturingOrderId) -> ServiceResult<ManufacturingOrder> {
        let (order, removed) = self.store.transaction(|tx| -> ServiceResult<_> {
            let order = tx
                .remove_order(id)
                .ok_or_else(|| ServiceError::not_found(format!("manufacturing order {id}")))?;
            let removed = tx.remove_work_orders_for(id);
            Ok((order, removed))
        })?;

        info!(mo_id = %id, work_orders = removed, "order deleted");
        Ok(order)
    }

    /// Run order consumption on its own, outside any status change.
    ///
    /// The order must already be released (`NotReleased` otherwise), and a
    /// second call for the same order is rejected with `AlreadyConsumed`.
    pub fn consume_order(&self, id: ManufacturingOrderId, at: DateTime<Utc>) -> ServiceResult<ConsumptionReport> {
        Ok(self.engine.consume_for_order(id, at)?)
    }

    /// Add a work order to an existing order by hand.
    #[instrument(skip_all, fields(mo_id = %input.mo_id), err)]
    pub fn create_work_order(&self, input: NewWorkOrder) -> ServiceResult<WorkOrder> {
        let wo = self.store.transaction(|tx| -> ServiceResult<WorkOrder> {
            let order = load_order(tx, input.mo_id)?;
            let wo = WorkOrder::create(WorkOrderId::new(), &order, input)?;
            tx.put_work_order(wo.clone());
            Ok(wo)
        })?;

        info!(wo_id = %wo.id(), "work order created");
        Ok(wo)
    }

    pub fn list_work_orders(&self, status: Option<WorkOrderStatus>) -> ServiceResult<Vec<WorkOrder>> {
        Ok(self.store.read(|s| {
            s.work_orders()
                .into_iter()
                .filter(|wo| status.is_none_or(|st| wo.status() == st))
                .cloned()
                .collect()
        })?)
    }

    pub fn work_orders_for(&self, mo_id: ManufacturingOrderId) -> ServiceResult<Vec<WorkOrder>> {
        Ok(self
            .store
            .read(|s| s.work_orders_for(mo_id).into_iter().cloned().collect())?)
    }

    pub fn get_work_order(&self, id: WorkOrderId) -> ServiceResult<WorkOrder> {
        self.store
            .read(|s| s.work_order(id).cloned())?
            .ok_or_else(|| ServiceError::not_found(format!("work order {id}")))
    }

    /// Move a work order through its lifecycle. Entering `completed` consumes
    /// stock for the owning order's full quantity, atomically with the status write.
    #[instrument(skip(self, change, at), fields(status = %change.status), err)]
    pub fn transition_work_order(
        &self,
        id: WorkOrderId,
        change: WorkOrderTransition,
        at: DateTime<Utc>,
    ) -> ServiceResult<WorkOrderOutcome> {
        let outcome = self.store.transaction(|tx| -> ServiceResult<WorkOrderOutcome> {
            let mut wo = tx
                .work_order(id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(format!("work order {id}")))?;
            let trigger = wo.transition(change, at)?;
            tx.put_work_order(wo.clone());

            let consumption = match trigger {
                Some(trigger) => Some(consumption::consume(tx, trigger, at)?),
                None => None,
            };
            Ok(WorkOrderOutcome {
                work_order: wo,
                consumption,
            })
        })?;

        if let Some(report) = &outcome.consumption {
            log_committed(report);
        }
        info!(wo_id = %id, status = %outcome.work_order.status(), "work order transitioned");
        Ok(outcome)
    }
}

fn load_order(tx: &dyn UnitOfWork, id: ManufacturingOrderId) -> ServiceResult<ManufacturingOrder> {
    tx.order(id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found(format!("manufacturing order {id}")))
}

/// Persist a transitioned order and carry out its side effects.
fn apply_order_effect(
    tx: &mut dyn UnitOfWork,
    order: ManufacturingOrder,
    effect: OrderEffect,
    at: DateTime<Utc>,
) -> ServiceResult<OrderOutcome> {
    tx.put_order(order.clone());

    match effect {
        OrderEffect::None => Ok(OrderOutcome {
            order,
            work_orders: Vec::new(),
            consumption: None,
        }),
        OrderEffect::Release => {
            let operations = tx
                .bom_for_product(order.product_id())
                .map(|bom| bom.operations().to_vec())
                .unwrap_or_default();

            let mut work_orders = Vec::with_capacity(operations.len());
            for op in &operations {
                let wo = WorkOrder::from_operation(WorkOrderId::new(), &order, op);
                tx.put_work_order(wo.clone());
                work_orders.push(wo);
            }

            let report = consumption::consume(tx, ConsumptionTrigger::Order(order.id()), at)?;
            Ok(OrderOutcome {
                order,
                work_orders,
                consumption: Some(report),
            })
        }
    }
}
