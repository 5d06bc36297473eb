//! Infrastructure layer: storage, transactions and the application services
//! that drive products, BOMs, orders, work orders and stock consumption.

pub mod catalog;
pub mod consumption;
pub mod error;
pub mod production;
pub mod reports;
pub mod sample;
pub mod stock;
pub mod store;


pub use catalog::Catalog;
pub use consumption::{ConsumptionEngine, ConsumptionError, ConsumptionReport};
pub use error::{ServiceError, ServiceResult};
pub use production::{OrderOutcome, Production, WorkOrderOutcome};
pub use reports::{order_summary, OrderSummary};
pub use sample::{seed_sample, SampleScenario};
pub use stock::{ManualMovement, StockCheck, StockLedger, RECENT_LEDGER_LIMIT};
pub use store::{InMemoryStore, Store, StoreError};
