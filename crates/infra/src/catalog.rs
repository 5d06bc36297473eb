//! Products and bills of materials.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use shopfloor_core::{BomId, ProductId, UserId};
use shopfloor_inventory::{
    opening_reference, LedgerEntry, LedgerSource, MovementDirection, NewProduct, Product,
};
use shopfloor_manufacturing::{Bom, BomDraft};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{PostError, Store};

#[derive(Debug, Clone)]
pub struct Catalog<S> {
    store: S,
}

impl<S: Store> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a product. Opening stock is posted as an `in` ledger movement.
    #[instrument(skip_all, fields(name = %input.name), err)]
    pub fn create_product(&self, input: NewProduct, at: DateTime<Utc>) -> ServiceResult<Product> {
        let product = Product::create(ProductId::new(), &input, at)?;
        let id = product.id();

        let created = self.store.transaction(|tx| -> ServiceResult<Product> {
            tx.insert_product(product)?;
            if input.opening_stock > 0 {
                let entry = LedgerEntry::record(
                    id,
                    MovementDirection::In,
                    input.opening_stock.unsigned_abs(),
                    opening_reference(id),
                    LedgerSource::Opening,
                    at,
                );
                tx.apply_movement(entry).map_err(post_error)?;
            }
            tx.product(id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(format!("product {id}")))
        })?;

        info!(product_id = %id, stock = created.stock_qty(), "product created");
        Ok(created)
    }

    pub fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self
            .store
            .read(|s| s.products().into_iter().cloned().collect())?)
    }

    pub fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.store
            .read(|s| s.product(id).cloned())?
            .ok_or_else(|| ServiceError::not_found(format!("product {id}")))
    }

    /// Delete a product. Only its owner may do so.
    ///
    /// BOMs that reference it are left as they are; consuming them later
    /// fails with `ProductNotFound`.
    #[instrument(skip(self), err)]
    pub fn delete_product(&self, id: ProductId, requested_by: UserId) -> ServiceResult<Product> {
        let removed = self.store.transaction(|tx| -> ServiceResult<Product> {
            let product = tx
                .product(id)
                .ok_or_else(|| ServiceError::not_found(format!("product {id}")))?;
            if !product.is_owned_by(requested_by) {
                return Err(ServiceError::Forbidden(format!(
                    "product {id} belongs to another user"
                )));
            }
            tx.remove_product(id)
                .ok_or_else(|| ServiceError::not_found(format!("product {id}")))
        })?;

        info!(product_id = %id, "product deleted");
        Ok(removed)
    }

    /// Validate and store a BOM. Output and component products must exist
    /// and the output must not already have a BOM.
    #[instrument(skip_all, fields(product_id = %draft.product_id), err)]
    pub fn create_bom(&self, draft: BomDraft, at: DateTime<Utc>) -> ServiceResult<Bom> {
        let bom = Bom::create(BomId::new(), draft, at)?;

        self.store.transaction(|tx| -> ServiceResult<()> {
            if tx.product(bom.product_id()).is_none() {
                return Err(ServiceError::not_found(format!("product {}", bom.product_id())));
            }
            if let Some(missing) = bom
                .components()
                .iter()
                .find(|c| tx.product(c.product_id).is_none())
            {
                return Err(ServiceError::not_found(format!(
                    "component product {}",
                    missing.product_id
                )));
            }
            tx.insert_bom(bom.clone())?;
            Ok(())
        })?;

        info!(bom_id = %bom.id(), components = bom.components().len(), operations = bom.operations().len(), "bom created");
        Ok(bom)
    }

    pub fn list_boms(&self) -> ServiceResult<Vec<Bom>> {
        Ok(self.store.read(|s| s.boms().into_iter().cloned().collect())?)
    }

    /// BOM resolver: the BOM that builds `product_id`, if any.
    ///
    /// "No BOM" is a normal answer, not an error.
    pub fn resolve_bom(&self, product_id: ProductId) -> ServiceResult<Option<Bom>> {
        Ok(self.store.read(|s| s.bom_for_product(product_id).cloned())?)
    }
}

pub(crate) fn post_error(e: PostError) -> ServiceError {
    match e {
        PostError::UnknownProduct(p) => ServiceError::not_found(format!("product {}", p.0)),
        PostError::Rejected(e) => e.into(),
        PostError::Store(e) => e.into(),
    }
}
