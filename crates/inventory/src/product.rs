use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfloor_core::{DomainError, ProductId, UserId};

use crate::ledger::{LedgerEntry, MAX_MOVEMENT_QTY};

/// Whether a product is bought in (raw material) or built (finished good).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Raw,
    Finished,
}

impl ProductKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Raw => "raw",
            ProductKind::Finished => "finished",
        }
    }
}

impl core::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ProductKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(ProductKind::Raw),
            "finished" => Ok(ProductKind::Finished),
            other => Err(DomainError::validation(format!(
                "unknown product kind '{other}' (expected raw or finished)"
            ))),
        }
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub kind: ProductKind,
    /// Stock on hand at creation; recorded as an opening ledger movement.
    pub opening_stock: i64,
    pub created_by: Option<UserId>,
}

/// A stocked product.
///
/// `stock_qty` has no floor: consumption may drive it negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    kind: ProductKind,
    stock_qty: i64,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl Product {
    /// Validate input and build a product with zero stock.
    ///
    /// Opening stock is not applied here; the caller records it as a ledger
    /// movement so that stock always equals the ledger balance.
    pub fn create(id: ProductId, input: &NewProduct, at: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if input.opening_stock < 0 {
            return Err(DomainError::validation("opening stock cannot be negative"));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            kind: input.kind,
            stock_qty: 0,
            created_by: input.created_by,
            created_at: at,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProductKind {
        self.kind
    }

    pub fn stock_qty(&self) -> i64 {
        self.stock_qty
    }

    pub fn created_by(&self) -> Option<UserId> {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by == Some(user)
    }

    /// Apply a ledger movement to the on-hand quantity.
    ///
    /// This is the only way stock changes.
    pub fn apply_movement(&mut self, entry: &LedgerEntry) -> Result<(), DomainError> {
        if entry.product_id() != self.id {
            return Err(DomainError::validation(format!(
                "ledger entry for product {} applied to product {}",
                entry.product_id(),
                self.id
            )));
        }
        let delta = entry.signed_quantity().ok_or_else(|| {
            DomainError::validation(format!(
                "movement quantity {} exceeds the maximum of {MAX_MOVEMENT_QTY}",
                entry.quantity()
            ))
        })?;
        self.stock_qty = self.stock_qty.checked_add(delta).ok_or_else(|| {
            DomainError::validation(format!("stock for product {} would leave the supported range", self.id))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerSource, MovementDirection};

    fn new_product(name: &str, opening_stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            kind: ProductKind::Raw,
            opening_stock,
            created_by: None,
        }
    }

    #[test]
    fn create_trims_name_and_starts_at_zero_stock() {
        let p = Product::create(ProductId::new(), &new_product("  bolt  ", 50), Utc::now()).unwrap();
        assert_eq!(p.name(), "bolt");
        assert_eq!(p.stock_qty(), 0);
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Product::create(ProductId::new(), &new_product("   ", 0), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_negative_opening_stock() {
        let err = Product::create(ProductId::new(), &new_product("nut", -1), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn movements_may_drive_stock_negative() {
        let mut p = Product::create(ProductId::new(), &new_product("sheet", 0), Utc::now()).unwrap();
        let out = LedgerEntry::record(
            p.id(),
            MovementDirection::Out,
            7,
            "MO:x",
            LedgerSource::Consumption,
            Utc::now(),
        );
        p.apply_movement(&out).unwrap();
        assert_eq!(p.stock_qty(), -7);
    }

    #[test]
    fn movement_for_another_product_is_rejected() {
        let mut p = Product::create(ProductId::new(), &new_product("sheet", 0), Utc::now()).unwrap();
        let foreign = LedgerEntry::record(
            ProductId::new(),
            MovementDirection::In,
            1,
            "manual",
            LedgerSource::Manual,
            Utc::now(),
        );
        assert!(p.apply_movement(&foreign).is_err());
        assert_eq!(p.stock_qty(), 0);
    }

    fn manual(product_id: ProductId, direction: MovementDirection, quantity: u64) -> LedgerEntry {
        LedgerEntry::record(product_id, direction, quantity, "manual", LedgerSource::Manual, Utc::now())
    }

    #[test]
    fn oversized_movement_is_rejected_without_touching_stock() {
        let mut p = Product::create(ProductId::new(), &new_product("sheet", 0), Utc::now()).unwrap();
        let huge = manual(p.id(), MovementDirection::In, u64::MAX);
        assert!(matches!(p.apply_movement(&huge), Err(DomainError::Validation(_))));
        assert_eq!(p.stock_qty(), 0);
    }

    #[test]
    fn movement_that_would_overflow_stock_is_rejected() {
        let mut full = Product::create(ProductId::new(), &new_product("sheet", 0), Utc::now()).unwrap();
        full.apply_movement(&manual(full.id(), MovementDirection::In, MAX_MOVEMENT_QTY))
            .unwrap();
        let one_more = manual(full.id(), MovementDirection::In, 1);
        assert!(matches!(full.apply_movement(&one_more), Err(DomainError::Validation(_))));
        assert_eq!(full.stock_qty(), i64::MAX);

        let mut drained = Product::create(ProductId::new(), &new_product("sheet", 0), Utc::now()).unwrap();
        drained
            .apply_movement(&manual(drained.id(), MovementDirection::Out, MAX_MOVEMENT_QTY))
            .unwrap();
        assert!(drained.apply_movement(&manual(drained.id(), MovementDirection::Out, 2)).is_err());
        assert_eq!(drained.stock_qty(), -i64::MAX);
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("RAW".parse::<ProductKind>().unwrap(), ProductKind::Raw);
        assert_eq!("finished".parse::<ProductKind>().unwrap(), ProductKind::Finished);
        assert!("semi".parse::<ProductKind>().is_err());
    }
}
