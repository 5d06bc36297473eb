use std::sync::Arc;

use shopfloor_infra::{
    order_summary, Catalog, InMemoryStore, OrderSummary, Production, ServiceResult, StockLedger,
};

type SharedStore = Arc<InMemoryStore>;

/// Application services over one shared store.
#[derive(Debug, Clone)]
pub struct AppServices {
    store: SharedStore,
    pub catalog: Catalog<SharedStore>,
    pub stock: StockLedger<SharedStore>,
    pub production: Production<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            catalog: Catalog::new(store.clone()),
            stock: StockLedger::new(store.clone()),
            production: Production::new(store.clone()),
            store,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    pub fn order_summary(&self) -> ServiceResult<OrderSummary> {
        order_summary(&self.store)
    }
}
