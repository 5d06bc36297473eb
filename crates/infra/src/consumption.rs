//! Consumption engine: BOM × order quantity → ledger entries → stock decrement.
//!
//! ```text
//! trigger (MO confirmed | WO completed)
//!   ↓
//! 1. Look up the order (via the work order for WO triggers)     → NotFound
//!    MO triggers need a released order                          → NotReleased
//!   ↓
//! 2. Resolve the BOM for the order's product                    → none: no-op
//!   ↓
//! 3. Reject if this trigger's reference was already consumed    → AlreadyConsumed
//!   ↓
//! 4. Per component: ledger entry (out) + stock decrement        → ProductNotFound
//!                                                                 | Rejected
//!   ↓
//! 5. Commit everything, or nothing
//! ```
//!
//! [`consume`] runs inside a caller's transaction so a status change and its
//! consumption commit together. [`ConsumptionEngine`] wraps it in a
//! transaction of its own for callers that only want the consumption.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use shopfloor_core::{DomainError, ManufacturingOrderId, ProductId, WorkOrderId};
use shopfloor_inventory::{LedgerEntry, LedgerSource, MovementDirection};
use shopfloor_manufacturing::{ConsumptionPlan, ConsumptionTrigger, OrderStatus};

use crate::store::{PostError, Store, StoreError, UnitOfWork};

/// Why a consumption was rejected. Nothing was written when this is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsumptionError {
    #[error("manufacturing order {0} not found")]
    OrderNotFound(ManufacturingOrderId),

    #[error("work order {0} not found")]
    WorkOrderNotFound(WorkOrderId),

    /// A BOM component points at a product that no longer exists.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Order-level consumption needs a confirmed (or later) order.
    #[error("manufacturing order {mo_id} is {status}; only released orders can be consumed")]
    NotReleased {
        mo_id: ManufacturingOrderId,
        status: OrderStatus,
    },

    #[error("stock already consumed for {0}")]
    AlreadyConsumed(String),

    /// A product refused a movement (quantity or resulting stock out of range).
    #[error(transparent)]
    Rejected(DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConsumptionError {
    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            ConsumptionError::OrderNotFound(_) | ConsumptionError::WorkOrderNotFound(_) => "not_found",
            ConsumptionError::ProductNotFound(_) => "product_not_found",
            ConsumptionError::NotReleased { .. } => "conflict",
            ConsumptionError::AlreadyConsumed(_) => "already_consumed",
            ConsumptionError::Rejected(_) => "validation_error",
            ConsumptionError::Store(_) => "store_error",
        }
    }
}

impl From<PostError> for ConsumptionError {
    fn from(value: PostError) -> Self {
        match value {
            PostError::UnknownProduct(p) => ConsumptionError::ProductNotFound(p.0),
            PostError::Rejected(e) => ConsumptionError::Rejected(e),
            PostError::Store(e) => ConsumptionError::Store(e),
        }
    }
}

/// What a successful consumption wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumptionReport {
    pub trigger: ConsumptionTrigger,
    pub reference: String,
    /// One entry per BOM component, in BOM order. Empty when the product has no BOM.
    pub entries: Vec<LedgerEntry>,
}

impl ConsumptionReport {
    pub fn is_noop(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Consume components for `trigger` inside an open unit of work.
///
/// On `Err` the caller must abandon the transaction; entries staged before the
/// failure are still in `tx`.
pub fn consume(
    tx: &mut dyn UnitOfWork,
    trigger: ConsumptionTrigger,
    at: DateTime<Utc>,
) -> Result<ConsumptionReport, ConsumptionError> {
    let order = match trigger {
        ConsumptionTrigger::Order(mo_id) => {
            let order = tx
                .order(mo_id)
                .cloned()
                .ok_or(ConsumptionError::OrderNotFound(mo_id))?;
            if !order.status().is_released() {
                return Err(ConsumptionError::NotReleased {
                    mo_id,
                    status: order.status(),
                });
            }
            order
        }
        ConsumptionTrigger::WorkOrder(wo_id) => {
            let mo_id = tx
                .work_order(wo_id)
                .map(|wo| wo.mo_id())
                .ok_or(ConsumptionError::WorkOrderNotFound(wo_id))?;
            tx.order(mo_id)
                .cloned()
                .ok_or(ConsumptionError::OrderNotFound(mo_id))?
        }
    };

    let Some(bom) = tx.bom_for_product(order.product_id()).cloned() else {
        return Ok(ConsumptionReport {
            trigger,
            reference: trigger.reference(),
            entries: Vec::new(),
        });
    };

    let plan = ConsumptionPlan::for_order(trigger, &order, &bom);
    if tx.has_consumption(&plan.reference) {
        return Err(ConsumptionError::AlreadyConsumed(plan.reference));
    }

    let mut entries = Vec::with_capacity(plan.lines.len());
    for line in &plan.lines {
        let entry = LedgerEntry::record(
            line.product_id,
            MovementDirection::Out,
            line.quantity,
            plan.reference.clone(),
            LedgerSource::Consumption,
            at,
        );
        tx.apply_movement(entry.clone())?;
        entries.push(entry);
    }

    Ok(ConsumptionReport {
        trigger,
        reference: plan.reference,
        entries,
    })
}

/// Standalone entry points, each one transaction.
#[derive(Debug, Clone)]
pub struct ConsumptionEngine<S> {
    store: S,
}

impl<S: Store> ConsumptionEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume for a manufacturing order's whole quantity (`MO:<id>`).
    #[instrument(skip_all, fields(mo_id = %mo_id), err)]
    pub fn consume_for_order(
        &self,
        mo_id: ManufacturingOrderId,
        at: DateTime<Utc>,
    ) -> Result<ConsumptionReport, ConsumptionError> {
        self.run(ConsumptionTrigger::Order(mo_id), at)
    }

    /// Consume for a work order: the owning order's whole quantity again (`WO:<id>`).
    #[instrument(skip_all, fields(wo_id = %wo_id), err)]
    pub fn consume_for_work_order(
        &self,
        wo_id: WorkOrderId,
        at: DateTime<Utc>,
    ) -> Result<ConsumptionReport, ConsumptionError> {
        self.run(ConsumptionTrigger::WorkOrder(wo_id), at)
    }

    fn run(&self, trigger: ConsumptionTrigger, at: DateTime<Utc>) -> Result<ConsumptionReport, ConsumptionError> {
        match self.store.transaction(|tx| consume(tx, trigger, at)) {
            Ok(report) => {
                log_committed(&report);
                Ok(report)
            }
            Err(e) => {
                warn!(reference = %trigger, kind = e.kind(), error = %e, "stock consumption rolled back");
                Err(e)
            }
        }
    }
}

pub(crate) fn log_committed(report: &ConsumptionReport) {
    if report.is_noop() {
        info!(reference = %report.reference, "no bom; nothing consumed");
    } else {
        info!(
            reference = %report.reference,
            lines = report.entries.len(),
            units = report.entries.iter().map(LedgerEntry::quantity).fold(0u64, u64::saturating_add),
            "stock consumed"
        );
    }
}
