//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{filter_by_name, Product, ProductQuery};
use crate::patch::PatchDocument;
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Validates input and applies filtering, sorting and patch semantics on top
/// of the repository. Missing records surface as `ProductError::NotFound`.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List all products in store order
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.get_all().await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i32) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Create a new product; the store assigns its ID
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: Product) -> ProductResult<Product> {
        input.validate()?;
        self.repository.add(input).await
    }

    /// Replace the product at `id` with `input`
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i32, input: Product) -> ProductResult<Product> {
        input.validate()?;
        self.repository.update(input.with_id(id)).await
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i32) -> ProductResult<()> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(ProductError::NotFound(id))
        }
    }

    /// Products whose name contains `name`; all products when it is absent or empty
    #[instrument(skip(self))]
    pub async fn search_products(&self, name: Option<&str>) -> ProductResult<Vec<Product>> {
        let products = self.repository.get_all().await?;
        Ok(filter_by_name(products, name))
    }

    /// Filter by name, then stable-sort by the requested key
    #[instrument(skip(self))]
    pub async fn query_products(&self, query: ProductQuery) -> ProductResult<Vec<Product>> {
        let products = self.repository.get_all().await?;
        Ok(query.apply(products))
    }

    /// Apply a JSON Patch document to the product at `id`.
    ///
    /// The patch runs against a copy inside a single repository edit; the
    /// result must pass the same validation as a full update before it
    /// replaces the stored record.
    #[instrument(skip(self, document), fields(operations = document.operations().len()))]
    pub async fn patch_product(&self, id: i32, document: PatchDocument) -> ProductResult<Product> {
        self.repository
            .modify(
                id,
                Box::new(move |product: &mut Product| -> ProductResult<()> {
                    document.apply_to(product)?;
                    product.id = id;
                    product.validate().map_err(ProductError::PatchValidation)
                }),
            )
            .await
    }

    /// Check the repository is reachable, for readiness
    pub async fn ping(&self) -> ProductResult<()> {
        self.repository.get_by_id(0).await.map(|_| ())
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
