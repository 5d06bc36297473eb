//! Manual stock movements and ledger queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use shopfloor_core::{DomainError, ProductId};
use shopfloor_inventory::{balance, LedgerEntry, LedgerSource, MovementDirection, MAX_MOVEMENT_QTY};

use crate::catalog::post_error;
use crate::error::{ServiceError, ServiceResult};
use crate::store::Store;

/// Default page size for ledger listings.
pub const RECENT_LEDGER_LIMIT: usize = 100;

/// A manual stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualMovement {
    pub product_id: ProductId,
    pub direction: MovementDirection,
    pub quantity: u64,
    pub reference: Option<String>,
}

/// Stock quantity versus the ledger balance for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockCheck {
    pub product_id: ProductId,
    pub stock_qty: i64,
    pub ledger_balance: i64,
    pub consistent: bool,
}

#[derive(Debug, Clone)]
pub struct StockLedger<S> {
    store: S,
}

impl<S: Store> StockLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a manual movement and apply it to stock atomically.
    #[instrument(skip_all, fields(product_id = %movement.product_id, direction = %movement.direction, quantity = movement.quantity), err)]
    pub fn record_movement(&self, movement: ManualMovement, at: DateTime<Utc>) -> ServiceResult<LedgerEntry> {
        if movement.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive").into());
        }
        if movement.quantity > MAX_MOVEMENT_QTY {
            return Err(DomainError::validation(format!("quantity cannot exceed {MAX_MOVEMENT_QTY}")).into());
        }
        let reference = movement
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "manual".to_string());

        let entry = LedgerEntry::record(
            movement.product_id,
            movement.direction,
            movement.quantity,
            reference,
            LedgerSource::Manual,
            at,
        );

        self.store.transaction(|tx| -> ServiceResult<()> {
            tx.apply_movement(entry.clone()).map_err(post_error)
        })?;

        info!(entry_id = %entry.id(), "stock movement recorded");
        Ok(entry)
    }

    /// Most recent entries first, optionally for one product.
    pub fn recent(&self, product_id: Option<ProductId>, limit: usize) -> ServiceResult<Vec<LedgerEntry>> {
        Ok(self.store.read(|s| {
            s.ledger()
                .iter()
                .rev()
                .filter(|e| product_id.is_none_or(|p| e.product_id() == p))
                .take(limit)
                .cloned()
                .collect()
        })?)
    }

    /// Compare a product's stock with the signed sum of its ledger movements.
    pub fn check(&self, product_id: ProductId) -> ServiceResult<StockCheck> {
        self.store
            .read(|s| {
                s.product(product_id).map(|p| {
                    let ledger_balance = balance(s.ledger(), product_id);
                    StockCheck {
                        product_id,
                        stock_qty: p.stock_qty(),
                        ledger_balance,
                        consistent: ledger_balance == p.stock_qty(),
                    }
                })
            })?
            .ok_or_else(|| ServiceError::not_found(format!("product {product_id}")))
    }
}
