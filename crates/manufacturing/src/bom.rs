//! Bill of materials: what one unit of a finished product needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfloor_core::{BomId, DomainError, ProductId};

/// One component line: `qty_per_unit` of `product_id` per unit of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomComponent {
    pub product_id: ProductId,
    /// May be fractional.
    pub qty_per_unit: f64,
}

/// One routing step performed to build the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomOperation {
    pub name: String,
    pub work_center: Option<String>,
    pub planned_minutes: Option<u32>,
}

/// Unvalidated BOM input.
#[derive(Debug, Clone, PartialEq)]
pub struct BomDraft {
    pub product_id: ProductId,
    pub components: Vec<BomComponent>,
    pub operations: Vec<BomOperation>,
}

/// Quantity of one component needed for a given order quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentRequirement {
    pub product_id: ProductId,
    pub quantity: u64,
}

/// A validated bill of materials.
///
/// Shape is checked once in [`Bom::create`]; holders of a `Bom` never
/// re-validate components or operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    id: BomId,
    product_id: ProductId,
    components: Vec<BomComponent>,
    operations: Vec<BomOperation>,
    created_at: DateTime<Utc>,
}

impl Bom {
    pub fn create(id: BomId, draft: BomDraft, at: DateTime<Utc>) -> Result<Self, DomainError> {
        for (idx, c) in draft.components.iter().enumerate() {
            if !c.qty_per_unit.is_finite() || c.qty_per_unit <= 0.0 {
                return Err(DomainError::validation(format!(
                    "component {idx}: qty must be a positive number"
                )));
            }
            if c.product_id == draft.product_id {
                return Err(DomainError::validation(format!(
                    "component {idx}: a product cannot consume itself"
                )));
            }
        }

        let mut operations = Vec::with_capacity(draft.operations.len());
        for (idx, op) in draft.operations.into_iter().enumerate() {
            let name = op.name.trim();
            if name.is_empty() {
                return Err(DomainError::validation(format!("operation {idx}: name is required")));
            }
            let work_center = op
                .work_center
                .map(|wc| wc.trim().to_string())
                .filter(|wc| !wc.is_empty());
            operations.push(BomOperation {
                name: name.to_string(),
                work_center,
                planned_minutes: op.planned_minutes,
            });
        }

        Ok(Self {
            id,
            product_id: draft.product_id,
            components: draft.components,
            operations,
            created_at: at,
        })
    }

    pub fn id(&self) -> BomId {
        self.id
    }

    /// The product this BOM builds.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn components(&self) -> &[BomComponent] {
        &self.components
    }

    pub fn operations(&self) -> &[BomOperation] {
        &self.operations
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Scale every component by `order_qty`, truncating toward zero.
    ///
    /// Lines keep BOM order.
    pub fn requirements(&self, order_qty: u32) -> Vec<ComponentRequirement> {
        self.components
            .iter()
            .map(|c| ComponentRequirement {
                product_id: c.product_id,
                quantity: scale(c.qty_per_unit, order_qty),
            })
            .collect()
    }
}

fn scale(qty_per_unit: f64, order_qty: u32) -> u64 {
    // Float-to-int `as` casts saturate, and qty_per_unit is validated positive.
    // Results above what a ledger movement can carry are refused when posted.
    (qty_per_unit * f64::from(order_qty)).trunc() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(product_id: ProductId, qty: f64) -> BomComponent {
        BomComponent {
            product_id,
            qty_per_unit: qty,
        }
    }

    fn op(name: &str) -> BomOperation {
        BomOperation {
            name: name.to_string(),
            work_center: Some(" WC1 ".to_string()),
            planned_minutes: Some(10),
        }
    }

    #[test]
    fn requirements_truncate_fractional_quantities() {
        let a = ProductId::new();
        let b = ProductId::new();
        let bom = Bom::create(
            BomId::new(),
            BomDraft {
                product_id: ProductId::new(),
                components: vec![component(a, 2.0), component(b, 0.5)],
                operations: vec![],
            },
            Utc::now(),
        )
        .unwrap();

        let reqs = bom.requirements(3);
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0], ComponentRequirement { product_id: a, quantity: 6 });
        // 0.5 * 3 = 1.5 -> 1
        assert_eq!(reqs[1], ComponentRequirement { product_id: b, quantity: 1 });
    }

    #[test]
    fn create_rejects_non_positive_quantities() {
        for qty in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Bom::create(
                BomId::new(),
                BomDraft {
                    product_id: ProductId::new(),
                    components: vec![component(ProductId::new(), qty)],
                    operations: vec![],
                },
                Utc::now(),
            )
            .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "qty {qty} accepted");
        }
    }

    #[test]
    fn create_rejects_self_consumption() {
        let output = ProductId::new();
        let err = Bom::create(
            BomId::new(),
            BomDraft {
                product_id: output,
                components: vec![component(output, 1.0)],
                operations: vec![],
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_requires_operation_names_and_normalizes_work_centers() {
        let err = Bom::create(
            BomId::new(),
            BomDraft {
                product_id: ProductId::new(),
                components: vec![],
                operations: vec![op("  ")],
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let bom = Bom::create(
            BomId::new(),
            BomDraft {
                product_id: ProductId::new(),
                components: vec![],
                operations: vec![op("cut"), BomOperation {
                    name: "weld".to_string(),
                    work_center: Some("   ".to_string()),
                    planned_minutes: None,
                }],
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(bom.operations()[0].work_center.as_deref(), Some("WC1"));
        assert_eq!(bom.operations()[1].work_center, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: scaled quantity never exceeds the exact product and is
            /// within one unit of it.
            #[test]
            fn scaling_truncates_toward_zero(
                qty in 0.001f64..1000.0,
                order_qty in 1u32..10_000
            ) {
                let exact = qty * f64::from(order_qty);
                let scaled = scale(qty, order_qty) as f64;
                prop_assert!(scaled <= exact);
                prop_assert!(exact - scaled < 1.0);
            }

            /// Property: whole-number ratios scale exactly.
            #[test]
            fn integral_ratios_scale_exactly(qty in 1u32..100, order_qty in 1u32..10_000) {
                prop_assert_eq!(scale(f64::from(qty), order_qty), u64::from(qty) * u64::from(order_qty));
            }
        }
    }
}
