//! Transactional storage for products, BOMs, orders and the stock ledger.
//!
//! The store is the single shared resource. Every mutation runs inside
//! [`Store::transaction`]: the closure sees a staged view, and its writes become
//! visible all together if it returns `Ok`, or not at all if it returns `Err`.

use std::sync::Arc;

use thiserror::Error;

use shopfloor_core::{DomainError, ManufacturingOrderId, ProductId, WorkOrderId};
use shopfloor_inventory::{LedgerEntry, Product};
use shopfloor_manufacturing::{Bom, ManufacturingOrder, WorkOrder};

pub mod in_memory;

pub use in_memory::InMemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// Backend failure (connection, IO, ...).
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Read access to a consistent view of the store.
pub trait Snapshot {
    fn product(&self, id: ProductId) -> Option<&Product>;
    fn products(&self) -> Vec<&Product>;

    /// The BOM whose output is `product_id`. At most one exists.
    fn bom_for_product(&self, product_id: ProductId) -> Option<&Bom>;
    fn boms(&self) -> Vec<&Bom>;

    fn order(&self, id: ManufacturingOrderId) -> Option<&ManufacturingOrder>;
    fn orders(&self) -> Vec<&ManufacturingOrder>;

    fn work_order(&self, id: WorkOrderId) -> Option<&WorkOrder>;
    fn work_orders(&self) -> Vec<&WorkOrder>;
    fn work_orders_for(&self, mo_id: ManufacturingOrderId) -> Vec<&WorkOrder>;

    /// Ledger entries in append order.
    fn ledger(&self) -> &[LedgerEntry];

    /// Whether a consumption entry with this reference was already written.
    fn has_consumption(&self, reference: &str) -> bool;
}

/// Staged writes inside a transaction.
///
/// Stock quantities change only through [`UnitOfWork::apply_movement`].
pub trait UnitOfWork: Snapshot {
    fn insert_product(&mut self, product: Product) -> Result<(), StoreError>;
    fn remove_product(&mut self, id: ProductId) -> Option<Product>;

    /// Insert a BOM; fails with `Duplicate` if its product already has one.
    fn insert_bom(&mut self, bom: Bom) -> Result<(), StoreError>;

    fn put_order(&mut self, order: ManufacturingOrder);
    fn remove_order(&mut self, id: ManufacturingOrderId) -> Option<ManufacturingOrder>;

    fn put_work_order(&mut self, work_order: WorkOrder);
    fn remove_work_orders_for(&mut self, mo_id: ManufacturingOrderId) -> usize;

    /// Append a ledger entry and apply it to its product's stock, as one step.
    ///
    /// Writes nothing if the product is missing or the product refuses the
    /// movement (stock would leave the `i64` range).
    fn apply_movement(&mut self, entry: LedgerEntry) -> Result<(), PostError>;
}

/// A ledger movement referenced a product that does not exist.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("product {0} not found")]
pub struct UnknownProduct(pub ProductId);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostError {
    #[error(transparent)]
    UnknownProduct(UnknownProduct),

    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Storage backend.
pub trait Store: Send + Sync {
    /// Run `f` against a consistent snapshot.
    fn read<R>(&self, f: impl FnOnce(&dyn Snapshot) -> R) -> Result<R, StoreError>;

    /// Run `f` as one atomic unit. Writes are committed only if `f` returns `Ok`.
    fn transaction<R, E>(&self, f: impl FnOnce(&mut dyn UnitOfWork) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>;
}

impl<S> Store for Arc<S>
where
    S: Store,
{
    fn read<R>(&self, f: impl FnOnce(&dyn Snapshot) -> R) -> Result<R, StoreError> {
        (**self).read(f)
    }

    fn transaction<R, E>(&self, f: impl FnOnce(&mut dyn UnitOfWork) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        (**self).transaction(f)
    }
}
