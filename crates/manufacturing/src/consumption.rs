//! Consumption planning: which ledger movements a production trigger implies.
//!
//! Pure: the infra layer executes a [`ConsumptionPlan`] inside a store
//! transaction.

use serde::{Deserialize, Serialize};

use shopfloor_core::{ManufacturingOrderId, WorkOrderId};

use crate::bom::{Bom, ComponentRequirement};
use crate::order::ManufacturingOrder;

/// The event that draws components from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ConsumptionTrigger {
    /// Order confirmation; consumes for the whole order quantity.
    Order(ManufacturingOrderId),
    /// Work order completion; consumes for the owning order's whole quantity
    /// again, independently of other work orders on the same order.
    WorkOrder(WorkOrderId),
}

impl ConsumptionTrigger {
    /// Ledger reference tag, unique per trigger: `MO:<id>` or `WO:<id>`.
    pub fn reference(&self) -> String {
        match self {
            ConsumptionTrigger::Order(id) => format!("MO:{id}"),
            ConsumptionTrigger::WorkOrder(id) => format!("WO:{id}"),
        }
    }
}

impl core::fmt::Display for ConsumptionTrigger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.reference())
    }
}

/// Component draws for one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumptionPlan {
    pub trigger: ConsumptionTrigger,
    pub reference: String,
    pub lines: Vec<ComponentRequirement>,
}

impl ConsumptionPlan {
    /// Scale `bom` by the order quantity. `bom` must be the order's product BOM.
    pub fn for_order(trigger: ConsumptionTrigger, order: &ManufacturingOrder, bom: &Bom) -> Self {
        debug_assert_eq!(order.product_id(), bom.product_id());
        Self {
            trigger,
            reference: trigger.reference(),
            lines: bom.requirements(order.quantity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shopfloor_core::{BomId, ProductId};

    use crate::bom::{BomComponent, BomDraft};
    use crate::order::{NewManufacturingOrder, OrderSchedule, OrderStatus};

    #[test]
    fn references_are_tagged_by_trigger_kind() {
        let mo = ManufacturingOrderId::new();
        let wo = WorkOrderId::new();
        assert_eq!(ConsumptionTrigger::Order(mo).reference(), format!("MO:{mo}"));
        assert_eq!(ConsumptionTrigger::WorkOrder(wo).reference(), format!("WO:{wo}"));
    }

    #[test]
    fn plan_scales_by_full_order_quantity_for_either_trigger() {
        let output = ProductId::new();
        let component = ProductId::new();
        let bom = Bom::create(
            BomId::new(),
            BomDraft {
                product_id: output,
                components: vec![BomComponent {
                    product_id: component,
                    qty_per_unit: 2.0,
                }],
                operations: vec![],
            },
            Utc::now(),
        )
        .unwrap();
        let mo = ManufacturingOrder::create(
            ManufacturingOrderId::new(),
            &NewManufacturingOrder {
                product_id: output,
                quantity: 3,
                status: OrderStatus::Planned,
                schedule: OrderSchedule::default(),
            },
            Utc::now(),
        )
        .unwrap();

        let by_order = ConsumptionPlan::for_order(ConsumptionTrigger::Order(mo.id()), &mo, &bom);
        let by_wo = ConsumptionPlan::for_order(ConsumptionTrigger::WorkOrder(WorkOrderId::new()), &mo, &bom);

        assert_eq!(by_order.lines, by_wo.lines);
        assert_eq!(by_order.lines[0].quantity, 6);
        assert!(by_order.reference.starts_with("MO:"));
        assert!(by_wo.reference.starts_with("WO:"));
    }
}
