//! Inventory domain module.
//!
//! Products and the stock ledger, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod ledger;
pub mod product;

pub use ledger::{
    LedgerEntry, LedgerSource, MAX_MOVEMENT_QTY, MovementDirection, balance, opening_reference,
};
pub use product::{NewProduct, Product, ProductKind};
