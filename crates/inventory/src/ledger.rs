//! Stock ledger: append-only record of stock movements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfloor_core::{DomainError, LedgerEntryId, ProductId};

/// Largest quantity a single movement may carry, so its signed effect fits in `i64`.
pub const MAX_MOVEMENT_QTY: u64 = i64::MAX as u64;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }

    /// Signed effect of moving `quantity` units in this direction.
    ///
    /// `None` above [`MAX_MOVEMENT_QTY`].
    pub fn signed(self, quantity: u64) -> Option<i64> {
        let q = i64::try_from(quantity).ok()?;
        Some(match self {
            MovementDirection::In => q,
            MovementDirection::Out => -q,
        })
    }
}

impl core::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for MovementDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" => Ok(MovementDirection::In),
            "out" => Ok(MovementDirection::Out),
            other => Err(DomainError::validation(format!(
                "unknown movement type '{other}' (expected in or out)"
            ))),
        }
    }
}

/// What wrote a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerSource {
    /// Written by BOM-driven consumption. References are unique per trigger.
    Consumption,
    /// Opening balance recorded when a product is created with stock.
    Opening,
    /// Manual adjustment through the stock endpoint.
    Manual,
}

/// Reference tag for an opening-balance movement.
pub fn opening_reference(product_id: ProductId) -> String {
    format!("OPEN:{product_id}")
}

/// Immutable stock ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    id: LedgerEntryId,
    product_id: ProductId,
    direction: MovementDirection,
    quantity: u64,
    reference: String,
    source: LedgerSource,
    recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn record(
        product_id: ProductId,
        direction: MovementDirection,
        quantity: u64,
        reference: impl Into<String>,
        source: LedgerSource,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            product_id,
            direction,
            quantity,
            reference: reference.into(),
            source,
            recorded_at,
        }
    }

    pub fn id(&self) -> LedgerEntryId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn direction(&self) -> MovementDirection {
        self.direction
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn source(&self) -> LedgerSource {
        self.source
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn signed_quantity(&self) -> Option<i64> {
        self.direction.signed(self.quantity)
    }
}

/// Signed sum of all movements for `product_id`.
///
/// Entries that could never have been applied to stock (quantity above
/// [`MAX_MOVEMENT_QTY`]) contribute nothing; the sum saturates.
pub fn balance<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>, product_id: ProductId) -> i64 {
    entries
        .into_iter()
        .filter(|e| e.product_id == product_id)
        .filter_map(LedgerEntry::signed_quantity)
        .fold(0, i64::saturating_add)
}
