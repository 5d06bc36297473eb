//! Demo data: a two-product BOM, a confirmed order and one completed work order.
//!
//! Goes through the ordinary services, so it exercises both consumption
//! triggers exactly as real requests would.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use shopfloor_core::{BomId, ManufacturingOrderId, ProductId, UserId, WorkOrderId};
use shopfloor_inventory::{NewProduct, ProductKind};
use shopfloor_manufacturing::{
    BomComponent, BomDraft, BomOperation, NewManufacturingOrder, OrderSchedule, OrderStatus,
    WorkOrderStatus, WorkOrderTransition,
};

use crate::catalog::Catalog;
use crate::error::ServiceResult;
use crate::production::Production;
use crate::store::Store;

/// Ids of everything the sample created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleScenario {
    pub component_id: ProductId,
    pub product_id: ProductId,
    pub bom_id: BomId,
    pub mo_id: ManufacturingOrderId,
    /// The work order that was completed, if the BOM had any operations.
    pub completed_work_order_id: Option<WorkOrderId>,
}

/// Seed: `component-A` (raw, 100 on hand), `finished-widget` needing 2 × A,
/// a confirmed order for 3 widgets, then complete the first work order.
///
/// Leaves component-A at 88: 6 for the order, 6 more for the work order.
/// The order is confirmed through the normal release, so its own consumption
/// runs; a seed that inserted the order already confirmed would skip it and
/// stop at 94.
#[instrument(skip_all, err)]
pub fn seed_sample<S: Store + Clone>(
    catalog: &Catalog<S>,
    production: &Production<S>,
    owner: Option<UserId>,
    at: DateTime<Utc>,
) -> ServiceResult<SampleScenario> {
    let component = catalog.create_product(
        NewProduct {
            name: "component-A".to_string(),
            kind: ProductKind::Raw,
            opening_stock: 100,
            created_by: owner,
        },
        at,
    )?;
    let product = catalog.create_product(
        NewProduct {
            name: "finished-widget".to_string(),
            kind: ProductKind::Finished,
            opening_stock: 0,
            created_by: owner,
        },
        at,
    )?;

    let bom = catalog.create_bom(
        BomDraft {
            product_id: product.id(),
            components: vec![BomComponent {
                product_id: component.id(),
                qty_per_unit: 2.0,
            }],
            operations: vec![BomOperation {
                name: "op1".to_string(),
                work_center: Some("WC1".to_string()),
                planned_minutes: Some(10),
            }],
        },
        at,
    )?;

    let released = production.create_order(
        NewManufacturingOrder {
            product_id: product.id(),
            quantity: 3,
            status: OrderStatus::Confirmed,
            schedule: OrderSchedule::default(),
        },
        at,
    )?;

    let completed_work_order_id = match released.work_orders.first() {
        Some(wo) => {
            production.transition_work_order(
                wo.id(),
                WorkOrderTransition {
                    status: WorkOrderStatus::Completed,
                    operator: None,
                    comments: Some("sample run".to_string()),
                },
                at,
            )?;
            Some(wo.id())
        }
        None => None,
    };

    info!(mo_id = %released.order.id(), "sample scenario created");
    Ok(SampleScenario {
        component_id: component.id(),
        product_id: product.id(),
        bom_id: bom.id(),
        mo_id: released.order.id(),
        completed_work_order_id,
    })
}
