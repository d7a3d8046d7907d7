use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::Product;

/// Edit applied to a stored product under the store's write lock.
pub type ProductEdit = Box<dyn FnOnce(&mut Product) -> ProductResult<()> + Send>;

/// Repository trait for Product persistence
///
/// Handlers only rely on this capability set, so any storage backend that
/// implements it can replace the in-memory store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products in insertion order
    async fn get_all(&self) -> ProductResult<Vec<Product>>;

    /// Get a product by ID
    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>>;

    /// Store a new product under a freshly assigned ID and return it.
    /// Any ID already set on `product` is discarded.
    async fn add(&self, product: Product) -> ProductResult<Product>;

    /// Replace the product with the same ID.
    /// Fails with `ProductError::NotFound` instead of inserting when the ID is unknown.
    async fn update(&self, product: Product) -> ProductResult<Product>;

    /// Delete a product by ID, returning whether it existed
    async fn delete(&self, id: i32) -> ProductResult<bool>;

    /// Apply `edit` to a copy of the product at `id` and store the copy if the
    /// edit succeeds, without releasing exclusive access in between.
    /// The stored product is untouched when `edit` fails.
    async fn modify(&self, id: i32, edit: ProductEdit) -> ProductResult<Product>;
}

#[derive(Debug, Default)]
struct Catalog {
    // ids are assigned monotonically, so key order is insertion order
    products: BTreeMap<i32, Product>,
    last_id: i32,
}

/// In-memory implementation of ProductRepository.
///
/// Clones share the same underlying catalog.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> ProductResult<Vec<Product>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> ProductResult<Option<Product>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.get(&id).cloned())
    }

    async fn add(&self, product: Product) -> ProductResult<Product> {
        let mut catalog = self.catalog.write().await;

        let id = catalog
            .last_id
            .checked_add(1)
            .ok_or_else(|| ProductError::Internal("product id space exhausted".to_string()))?;
        catalog.last_id = id;

        let product = product.with_id(id);
        catalog.products.insert(id, product.clone());

        tracing::info!(product_id = id, "Created product");
        Ok(product)
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let mut catalog = self.catalog.write().await;

        let stored = catalog
            .products
            .get_mut(&product.id)
            .ok_or(ProductError::NotFound(product.id))?;
        *stored = product.clone();

        tracing::info!(product_id = product.id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: i32) -> ProductResult<bool> {
        let mut catalog = self.catalog.write().await;

        if catalog.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn modify(&self, id: i32, edit: ProductEdit) -> ProductResult<Product> {
        let mut catalog = self.catalog.write().await;

        let stored = catalog
            .products
            .get_mut(&id)
            .ok_or(ProductError::NotFound(id))?;

        let mut draft = stored.clone();
        edit(&mut draft)?;
        *stored = draft.clone();

        tracing::info!(product_id = id, "Modified product");
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let repo = InMemoryProductRepository::new();

        let widget = repo.add(Product::new("Widget", 9.99)).await.unwrap();
        let gadget = repo.add(Product::new("Gadget", 19.99)).await.unwrap();

        assert_eq!(widget.id, 1);
        assert_eq!(gadget.id, 2);
        assert_eq!(repo.get_by_id(1).await.unwrap(), Some(widget));
    }

    #[tokio::test]
    async fn test_add_discards_client_id() {
        let repo = InMemoryProductRepository::new();
        let stored = repo
            .add(Product::new("Widget", 1.0).with_id(77))
            .await
            .unwrap();

        assert_eq!(stored.id, 1);
        assert!(repo.get_by_id(77).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let repo = InMemoryProductRepository::new();
        repo.add(Product::new("Widget", 1.0)).await.unwrap();
        let second = repo.add(Product::new("Gadget", 2.0)).await.unwrap();

        assert!(repo.delete(second.id).await.unwrap());
        let third = repo.add(Product::new("Gizmo", 3.0)).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn test_get_all_preserves_insertion_order() {
        let repo = InMemoryProductRepository::new();
        for name in ["Zeta", "Alpha", "Mid"] {
            repo.add(Product::new(name, 1.0)).await.unwrap();
        }

        let names: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[tokio::test]
    async fn test_update_replaces_existing() {
        let repo = InMemoryProductRepository::new();
        let stored = repo.add(Product::new("Widget", 1.0)).await.unwrap();

        repo.update(Product::new("Widget v2", 2.0).with_id(stored.id))
            .await
            .unwrap();

        let fetched = repo.get_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Widget v2");
        assert_eq!(fetched.price, 2.0);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found_and_does_not_insert() {
        let repo = InMemoryProductRepository::new();

        let result = repo.update(Product::new("Ghost", 1.0).with_id(5)).await;

        assert!(matches!(result, Err(ProductError::NotFound(5))));
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let repo = InMemoryProductRepository::new();
        assert!(!repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all_returns_copies() {
        let repo = InMemoryProductRepository::new();
        repo.add(Product::new("Widget", 1.0)).await.unwrap();

        let mut snapshot = repo.get_all().await.unwrap();
        snapshot[0].name = "Mutated".to_string();

        assert_eq!(repo.get_by_id(1).await.unwrap().unwrap().name, "Widget");
    }

    #[tokio::test]
    async fn test_modify_commits_successful_edit() {
        let repo = InMemoryProductRepository::new();
        repo.add(Product::new("Widget", 1.0)).await.unwrap();

        let modified = repo
            .modify(1, Box::new(|product: &mut Product| -> ProductResult<()> {
                product.price = 2.5;
                Ok(())
            }))
            .await
            .unwrap();

        assert_eq!(modified, Product::new("Widget", 2.5).with_id(1));
        assert_eq!(repo.get_by_id(1).await.unwrap(), Some(modified));
    }

    #[tokio::test]
    async fn test_modify_failed_edit_leaves_record() {
        let repo = InMemoryProductRepository::new();
        repo.add(Product::new("Widget", 1.0)).await.unwrap();

        let result = repo
            .modify(1, Box::new(|product: &mut Product| -> ProductResult<()> {
                product.name = "Half-done".to_string();
                Err(ProductError::MalformedPatch("rejected".to_string()))
            }))
            .await;

        assert!(matches!(result, Err(ProductError::MalformedPatch(_))));
        assert_eq!(repo.get_by_id(1).await.unwrap().unwrap().name, "Widget");
    }

    #[tokio::test]
    async fn test_modify_missing_is_not_found() {
        let repo = InMemoryProductRepository::new();
        let result = repo
            .modify(3, Box::new(|_: &mut Product| -> ProductResult<()> { Ok(()) }))
            .await;
        assert!(matches!(result, Err(ProductError::NotFound(3))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_modifies_keep_every_change() {
        let repo = InMemoryProductRepository::new();
        repo.add(Product::new("Widget", 0.0)).await.unwrap();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.modify(1, Box::new(|product: &mut Product| -> ProductResult<()> {
                        product.price += 1.0;
                        Ok(())
                    }))
                    .await
                    .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.get_by_id(1).await.unwrap().unwrap().price, 32.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_get_unique_ids() {
        let repo = InMemoryProductRepository::new();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.add(Product::new(format!("Product {}", i), f64::from(i)))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }

        assert_eq!(ids.len(), 64);
        assert_eq!(repo.get_all().await.unwrap().len(), 64);
    }
}
