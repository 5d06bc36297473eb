use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfloor_core::{DomainError, ManufacturingOrderId, ProductId, WorkOrderId};

use crate::bom::BomOperation;
use crate::consumption::ConsumptionTrigger;
use crate::order::ManufacturingOrder;

/// Work order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Planned,
    Started,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 4] = [
        WorkOrderStatus::Planned,
        WorkOrderStatus::Started,
        WorkOrderStatus::Completed,
        WorkOrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkOrderStatus::Planned => "planned",
            WorkOrderStatus::Started => "started",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }

    /// Transition table. `Completed` is terminal, so a completion (and its
    /// consumption) cannot be replayed.
    pub fn can_transition_to(self, next: WorkOrderStatus) -> bool {
        use WorkOrderStatus::*;
        matches!(
            (self, next),
            (Planned, Started)
                | (Planned, Completed)
                | (Planned, Cancelled)
                | (Started, Completed)
                | (Started, Cancelled)
        )
    }
}

impl core::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for WorkOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkOrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown work order status '{s}'")))
    }
}

/// Input for creating a work order explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkOrder {
    pub mo_id: ManufacturingOrderId,
    pub operation: String,
    pub work_center: Option<String>,
    pub planned_minutes: u32,
}

/// Status change request, with the optional shop-floor details that travel
/// with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderTransition {
    pub status: WorkOrderStatus,
    pub operator: Option<String>,
    pub comments: Option<String>,
}

/// One operation instance within a manufacturing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    id: WorkOrderId,
    mo_id: ManufacturingOrderId,
    product_id: ProductId,
    operation: String,
    work_center: Option<String>,
    planned_minutes: u32,
    status: WorkOrderStatus,
    operator: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    comments: Option<String>,
}

impl WorkOrder {
    /// Create a `planned` work order for `order`.
    pub fn create(id: WorkOrderId, order: &ManufacturingOrder, input: NewWorkOrder) -> Result<Self, DomainError> {
        if input.mo_id != order.id() {
            return Err(DomainError::validation("work order belongs to a different order"));
        }
        let operation = input.operation.trim();
        if operation.is_empty() {
            return Err(DomainError::validation("operation is required"));
        }

        Ok(Self {
            id,
            mo_id: order.id(),
            product_id: order.product_id(),
            operation: operation.to_string(),
            work_center: input.work_center,
            planned_minutes: input.planned_minutes,
            status: WorkOrderStatus::Planned,
            operator: None,
            started_at: None,
            ended_at: None,
            comments: None,
        })
    }

    /// Work order generated from a BOM routing step on confirmation.
    pub fn from_operation(id: WorkOrderId, order: &ManufacturingOrder, op: &BomOperation) -> Self {
        Self {
            id,
            mo_id: order.id(),
            product_id: order.product_id(),
            operation: op.name.clone(),
            work_center: op.work_center.clone(),
            planned_minutes: op.planned_minutes.unwrap_or(0),
            status: WorkOrderStatus::Planned,
            operator: None,
            started_at: None,
            ended_at: None,
            comments: None,
        }
    }

    pub fn id(&self) -> WorkOrderId {
        self.id
    }

    pub fn mo_id(&self) -> ManufacturingOrderId {
        self.mo_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn work_center(&self) -> Option<&str> {
        self.work_center.as_deref()
    }

    pub fn planned_minutes(&self) -> u32 {
        self.planned_minutes
    }

    pub fn status(&self) -> WorkOrderStatus {
        self.status
    }

    pub fn operator(&self) -> Option<&str> {
        self.operator.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// Change status, stamping timestamps.
    ///
    /// Returns the consumption the caller must run (on completion), in the
    /// same unit of work as the status write.
    pub fn transition(
        &mut self,
        change: WorkOrderTransition,
        at: DateTime<Utc>,
    ) -> Result<Option<ConsumptionTrigger>, DomainError> {
        if !self.status.can_transition_to(change.status) {
            return Err(DomainError::invalid_transition(self.status, change.status));
        }

        self.status = change.status;
        if change.operator.is_some() {
            self.operator = change.operator;
        }
        if change.comments.is_some() {
            self.comments = change.comments;
        }

        match change.status {
            WorkOrderStatus::Started => {
                self.started_at = Some(at);
                Ok(None)
            }
            WorkOrderStatus::Completed => {
                self.ended_at = Some(at);
                Ok(Some(ConsumptionTrigger::WorkOrder(self.id)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{NewManufacturingOrder, OrderSchedule, OrderStatus};

    fn order() -> ManufacturingOrder {
        ManufacturingOrder::create(
            ManufacturingOrderId::new(),
            &NewManufacturingOrder {
                product_id: ProductId::new(),
                quantity: 3,
                status: OrderStatus::Planned,
                schedule: OrderSchedule::default(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn to(status: WorkOrderStatus) -> WorkOrderTransition {
        WorkOrderTransition {
            status,
            operator: None,
            comments: None,
        }
    }

    #[test]
    fn from_operation_copies_routing_step() {
        let mo = order();
        let op = BomOperation {
            name: "op1".to_string(),
            work_center: Some("WC1".to_string()),
            planned_minutes: Some(10),
        };
        let wo = WorkOrder::from_operation(WorkOrderId::new(), &mo, &op);
        assert_eq!(wo.mo_id(), mo.id());
        assert_eq!(wo.product_id(), mo.product_id());
        assert_eq!(wo.operation(), "op1");
        assert_eq!(wo.work_center(), Some("WC1"));
        assert_eq!(wo.planned_minutes(), 10);
        assert_eq!(wo.status(), WorkOrderStatus::Planned);
    }

    #[test]
    fn start_then_complete_stamps_times_and_requests_consumption() {
        let mo = order();
        let mut wo = WorkOrder::create(
            WorkOrderId::new(),
            &mo,
            NewWorkOrder {
                mo_id: mo.id(),
                operation: "assemble".to_string(),
                work_center: None,
                planned_minutes: 15,
            },
        )
        .unwrap();

        let t0 = Utc::now();
        assert_eq!(wo.transition(to(WorkOrderStatus::Started), t0).unwrap(), None);
        assert_eq!(wo.started_at(), Some(t0));

        let t1 = t0 + chrono::Duration::minutes(20);
        let trigger = wo
            .transition(
                WorkOrderTransition {
                    status: WorkOrderStatus::Completed,
                    operator: Some("op-7".to_string()),
                    comments: Some("ok".to_string()),
                },
                t1,
            )
            .unwrap();
        assert_eq!(trigger, Some(ConsumptionTrigger::WorkOrder(wo.id())));
        assert_eq!(wo.ended_at(), Some(t1));
        assert_eq!(wo.operator(), Some("op-7"));
        assert_eq!(wo.comments(), Some("ok"));
    }

    #[test]
    fn repeated_completion_is_rejected() {
        let mo = order();
        let mut wo = WorkOrder::from_operation(
            WorkOrderId::new(),
            &mo,
            &BomOperation {
                name: "op".to_string(),
                work_center: None,
                planned_minutes: None,
            },
        );
        wo.transition(to(WorkOrderStatus::Completed), Utc::now()).unwrap();
        let err = wo.transition(to(WorkOrderStatus::Completed), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[test]
    fn create_rejects_mismatched_order_and_blank_operation() {
        let mo = order();
        let other = ManufacturingOrderId::new();
        assert!(
            WorkOrder::create(
                WorkOrderId::new(),
                &mo,
                NewWorkOrder {
                    mo_id: other,
                    operation: "x".to_string(),
                    work_center: None,
                    planned_minutes: 0,
                },
            )
            .is_err()
        );
        assert!(
            WorkOrder::create(
                WorkOrderId::new(),
                &mo,
                NewWorkOrder {
                    mo_id: mo.id(),
                    operation: " ".to_string(),
                    work_center: None,
                    planned_minutes: 0,
                },
            )
            .is_err()
        );
    }
}
