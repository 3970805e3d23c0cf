//! Product catalog operations.

use common::{ProductId, SellerId};
use domain::{Money, Product};
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ServiceError;

/// Input for listing a new product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub seller_id: SellerId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: u32,
}

/// Field-wise patch for an existing product; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub image: Option<String>,
}

/// Service for managing the product catalog.
pub struct ProductService<S> {
    store: S,
}

impl<S: Store> ProductService<S> {
    /// Creates a new product service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists a new product for an existing seller.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, new: NewProduct) -> Result<ProductId, ServiceError> {
        if self.store.find_seller(new.seller_id).await?.is_none() {
            return Err(ServiceError::SellerNotFound(new.seller_id));
        }

        let mut product = Product::new(
            new.name,
            new.description,
            new.price,
            new.quantity,
            new.seller_id,
        )?;
        let id = self.store.save_product(&mut product).await?;
        Ok(id)
    }

    /// Fetches a product by id.
    #[tracing::instrument(skip(self))]
    pub async fn find_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.store
            .find_product(id)
            .await?
            .ok_or(ServiceError::ProductNotFound(id))
    }

    /// Finds products whose name or description contains `term`.
    #[tracing::instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>, ServiceError> {
        Ok(self.store.search_products(term).await?)
    }

    /// Applies a patch to an existing product and persists it.
    #[tracing::instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<(), ServiceError> {
        let mut product = self
            .store
            .find_product(id)
            .await?
            .ok_or(ServiceError::ProductNotFound(id))?;

        product.apply_update(patch.name, patch.description, patch.price, patch.image);
        self.store.save_product(&mut product).await?;
        Ok(())
    }

    /// Soft-deletes a product. Orders that already reference it keep
    /// loading it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        if self.store.find_product(id).await?.is_none() {
            return Err(ServiceError::ProductNotFound(id));
        }
        self.store.soft_remove_product(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use domain::{DomainError, Seller};
    use store::{InMemoryStore, SellerStore};

    async fn service_with_seller() -> (ProductService<InMemoryStore>, SellerId) {
        let service = ProductService::new(InMemoryStore::new());
        let mut seller = Seller::new("Acme Corp", "2 Warehouse Way");
        let seller_id = service.store().save_seller(&mut seller).await.unwrap();
        (service, seller_id)
    }

    fn new_product(seller_id: SellerId, quantity: u32) -> NewProduct {
        NewProduct {
            seller_id,
            name: "Widget".to_string(),
            description: "A widget".to_string(),
            price: Money::from_cents(1000),
            quantity,
        }
    }

    #[tokio::test]
    async fn create_and_find_product() {
        let (service, seller_id) = service_with_seller().await;

        let id = service
            .create_product(new_product(seller_id, 5))
            .await
            .unwrap();

        let product = service.find_product(id).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.quantity, 5);
        assert_eq!(product.seller_id, seller_id);
    }

    #[tokio::test]
    async fn create_product_rejects_unknown_seller() {
        let service = ProductService::new(InMemoryStore::new());

        let result = service
            .create_product(new_product(SellerId::new(404), 5))
            .await;

        assert!(matches!(result, Err(ServiceError::SellerNotFound(_))));
    }

    #[tokio::test]
    async fn create_product_rejects_zero_quantity() {
        let (service, seller_id) = service_with_seller().await;

        let result = service.create_product(new_product(seller_id, 0)).await;

        assert!(matches!(
            &result,
            Err(ServiceError::Domain(DomainError::InvalidQuantity {
                quantity: 0,
            }))
        ));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn update_product_patches_only_provided_fields() {
        let (service, seller_id) = service_with_seller().await;
        let id = service
            .create_product(new_product(seller_id, 5))
            .await
            .unwrap();

        service
            .update_product(
                id,
                ProductPatch {
                    price: Some(Money::from_cents(1500)),
                    image: Some("widget.png".to_string()),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        let product = service.find_product(id).await.unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, Money::from_cents(1500));
        assert_eq!(product.image.as_deref(), Some("widget.png"));
    }

    #[tokio::test]
    async fn delete_product_is_soft_and_makes_it_unfindable() {
        let (service, seller_id) = service_with_seller().await;
        let id = service
            .create_product(new_product(seller_id, 5))
            .await
            .unwrap();

        service.delete_product(id).await.unwrap();

        let result = service.find_product(id).await;
        assert!(matches!(result, Err(ServiceError::ProductNotFound(_))));

        let result = service.delete_product(id).await;
        assert!(matches!(result, Err(ServiceError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn search_finds_products_by_name_or_description() {
        let (service, seller_id) = service_with_seller().await;
        service
            .create_product(new_product(seller_id, 5))
            .await
            .unwrap();

        assert_eq!(service.search_products("widg").await.unwrap().len(), 1);
        assert!(service.search_products("gadget").await.unwrap().is_empty());
    }
}
