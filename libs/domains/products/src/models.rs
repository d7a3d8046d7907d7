use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Product entity.
///
/// The same shape is accepted as a request body for create and full update;
/// a client-supplied `id` is ignored there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Product {
    /// Store-assigned identifier
    #[serde(default)]
    pub id: i32,
    /// Product name (required, non-empty)
    #[validate(length(min = 1))]
    #[serde(default)]
    pub name: String,
    /// Unit price
    pub price: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            price,
        }
    }

    /// Copy of this product carrying `id`.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }
}

/// Sort key accepted by the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortBy {
    Name,
    Price,
}

impl SortBy {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::Price => a.price.total_cmp(&b.price),
        }
    }
}

/// Query parameters for the search endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-sensitive substring the product name must contain
    pub name: Option<String>,
}

/// Query parameters for the filtered and sorted list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    /// Case-sensitive substring the product name must contain
    pub name: Option<String>,
    /// `name` or `price`; any other value keeps store order
    pub sort_by: Option<String>,
}

impl ProductQuery {
    /// Recognized sort key, if any.
    pub fn sort_key(&self) -> Option<SortBy> {
        self.sort_by
            .as_deref()
            .and_then(|raw| SortBy::from_str(raw).ok())
    }

    /// Filter first, then stable-sort ascending by the requested key.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut products = filter_by_name(products, self.name.as_deref());

        if let Some(key) = self.sort_key() {
            products.sort_by(|a, b| key.compare(a, b));
        }

        products
    }
}

/// Keep products whose name contains `needle`; `None` or `""` keeps everything.
pub fn filter_by_name(products: Vec<Product>, needle: Option<&str>) -> Vec<Product> {
    match needle {
        Some(needle) if !needle.is_empty() => products
            .into_iter()
            .filter(|p| p.name.contains(needle))
            .collect(),
        _ => products,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("Pro Widget", 20.0).with_id(1),
            Product::new("Gadget", 5.0).with_id(2),
            Product::new("Gizmo Pro", 20.0).with_id(3),
            Product::new("Apple", 5.0).with_id(4),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_product_validation_requires_name() {
        assert!(Product::new("", 1.0).validate().is_err());
        assert!(Product::new("Widget", -3.0).validate().is_ok());
    }

    #[test]
    fn test_deserialize_ignores_missing_id() {
        let product: Product = serde_json::from_str(r#"{"name":"Widget","price":9.99}"#).unwrap();
        assert_eq!(product.id, 0);
        assert_eq!(product.name, "Widget");
    }

    #[test]
    fn test_deserialize_requires_price() {
        assert!(serde_json::from_str::<Product>(r#"{"name":"Widget"}"#).is_err());
    }

    #[test]
    fn test_filter_is_case_sensitive_substring() {
        assert_eq!(ids(&filter_by_name(catalog(), Some("Pro"))), vec![1, 3]);
        assert!(filter_by_name(catalog(), Some("pro")).is_empty());
    }

    #[test]
    fn test_empty_or_missing_filter_keeps_all() {
        assert_eq!(filter_by_name(catalog(), None).len(), 4);
        assert_eq!(filter_by_name(catalog(), Some("")).len(), 4);
    }

    #[test]
    fn test_sort_by_price_is_stable() {
        let query = ProductQuery {
            name: None,
            sort_by: Some("price".to_string()),
        };
        assert_eq!(ids(&query.apply(catalog())), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_sort_by_name_is_ordinal() {
        let query = ProductQuery {
            name: None,
            sort_by: Some("name".to_string()),
        };
        assert_eq!(ids(&query.apply(catalog())), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_unknown_sort_key_keeps_order() {
        for raw in ["Price", "stock", ""] {
            let query = ProductQuery {
                name: None,
                sort_by: Some(raw.to_string()),
            };
            assert_eq!(query.sort_key(), None);
            assert_eq!(ids(&query.apply(catalog())), vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_filter_then_sort() {
        let query = ProductQuery {
            name: Some("Pro".to_string()),
            sort_by: Some("name".to_string()),
        };
        assert_eq!(ids(&query.apply(catalog())), vec![3, 1]);
    }

    #[test]
    fn test_query_uses_camel_case_sort_by() {
        let query: ProductQuery =
            serde_json::from_value(serde_json::json!({ "sortBy": "price" })).unwrap();
        assert_eq!(query.sort_key(), Some(SortBy::Price));
    }
}
