//! Manufacturing domain module.
//!
//! Bills of materials, manufacturing/work order lifecycles and consumption
//! planning. Deterministic domain logic only (no IO, no HTTP, no storage).

pub mod bom;
pub mod consumption;
pub mod order;
pub mod work_order;

pub use bom::{Bom, BomComponent, BomDraft, BomOperation, ComponentRequirement};
pub use consumption::{ConsumptionPlan, ConsumptionTrigger};
pub use order::{
    ManufacturingOrder, NewManufacturingOrder, OrderEffect, OrderPatch, OrderSchedule, OrderStatus,
};
pub use work_order::{NewWorkOrder, WorkOrder, WorkOrderStatus, WorkOrderTransition};
