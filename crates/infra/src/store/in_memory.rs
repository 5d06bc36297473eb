use std::collections::{BTreeMap, HashSet};
use std::sync::{PoisonError, RwLock};

use shopfloor_core::{ManufacturingOrderId, ProductId, WorkOrderId};
use shopfloor_inventory::{LedgerEntry, LedgerSource, Product};
use shopfloor_manufacturing::{Bom, ManufacturingOrder, WorkOrder};

use super::{PostError, Snapshot, Store, StoreError, UnitOfWork, UnknownProduct};

/// Whole-store state. Ids are UUIDv7, so `BTreeMap` iteration is creation order.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    products: BTreeMap<ProductId, Product>,
    boms: BTreeMap<ProductId, Bom>,
    orders: BTreeMap<ManufacturingOrderId, ManufacturingOrder>,
    work_orders: BTreeMap<WorkOrderId, WorkOrder>,
    ledger: Vec<LedgerEntry>,
    consumption_refs: HashSet<String>,
}

/// In-memory transactional store.
///
/// Intended for tests/dev. Transactions hold the write lock for their whole
/// duration and mutate a staged clone, which replaces the live state only on
/// success. That makes them serializable and all-or-nothing.
///
/// The clone copies everything, ledger included, so every transaction costs
/// O(stored history). Fine at dev scale; a durable backend would stage only
/// the rows it touches.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    fn read<R>(&self, f: impl FnOnce(&dyn Snapshot) -> R) -> Result<R, StoreError> {
        // Staged writes are swapped in whole, so a poisoned lock still guards
        // a committed state.
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&*state))
    }

    fn transaction<R, E>(&self, f: impl FnOnce(&mut dyn UnitOfWork) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut live = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let mut staged = live.clone();
        let out = f(&mut staged)?;
        *live = staged;
        Ok(out)
    }
}

impl Snapshot for StoreState {
    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    fn products(&self) -> Vec<&Product> {
        self.products.values().collect()
    }

    fn bom_for_product(&self, product_id: ProductId) -> Option<&Bom> {
        self.boms.get(&product_id)
    }

    fn boms(&self) -> Vec<&Bom> {
        let mut boms: Vec<&Bom> = self.boms.values().collect();
        boms.sort_by_key(|b| b.id());
        boms
    }

    fn order(&self, id: ManufacturingOrderId) -> Option<&ManufacturingOrder> {
        self.orders.get(&id)
    }

    fn orders(&self) -> Vec<&ManufacturingOrder> {
        self.orders.values().collect()
    }

    fn work_order(&self, id: WorkOrderId) -> Option<&WorkOrder> {
        self.work_orders.get(&id)
    }

    fn work_orders(&self) -> Vec<&WorkOrder> {
        self.work_orders.values().collect()
    }

    fn work_orders_for(&self, mo_id: ManufacturingOrderId) -> Vec<&WorkOrder> {
        self.work_orders.values().filter(|wo| wo.mo_id() == mo_id).collect()
    }

    fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    fn has_consumption(&self, reference: &str) -> bool {
        self.consumption_refs.contains(reference)
    }
}

impl UnitOfWork for StoreState {
    fn insert_product(&mut self, product: Product) -> Result<(), StoreError> {
        if self.products.contains_key(&product.id()) {
            return Err(StoreError::Duplicate(format!("product {}", product.id())));
        }
        self.products.insert(product.id(), product);
        Ok(())
    }

    fn remove_product(&mut self, id: ProductId) -> Option<Product> {
        self.products.remove(&id)
    }

    fn insert_bom(&mut self, bom: Bom) -> Result<(), StoreError> {
        if self.boms.contains_key(&bom.product_id()) {
            return Err(StoreError::Duplicate(format!("bom for product {}", bom.product_id())));
        }
        self.boms.insert(bom.product_id(), bom);
        Ok(())
    }

    fn put_order(&mut self, order: ManufacturingOrder) {
        self.orders.insert(order.id(), order);
    }

    fn remove_order(&mut self, id: ManufacturingOrderId) -> Option<ManufacturingOrder> {
        self.orders.remove(&id)
    }

    fn put_work_order(&mut self, work_order: WorkOrder) {
        self.work_orders.insert(work_order.id(), work_order);
    }

    fn remove_work_orders_for(&mut self, mo_id: ManufacturingOrderId) -> usize {
        let before = self.work_orders.len();
        self.work_orders.retain(|_, wo| wo.mo_id() != mo_id);
        before - self.work_orders.len()
    }

    fn apply_movement(&mut self, entry: LedgerEntry) -> Result<(), PostError> {
        let Some(product) = self.products.get_mut(&entry.product_id()) else {
            return Err(PostError::UnknownProduct(UnknownProduct(entry.product_id())));
        };
        product.apply_movement(&entry)?;

        if entry.source() == LedgerSource::Consumption {
            self.consumption_refs.insert(entry.reference().to_string());
        }
        self.ledger.push(entry);
        Ok(())
    }
}
