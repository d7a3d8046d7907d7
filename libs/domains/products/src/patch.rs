//! JSON Patch (RFC 6902) support for partial product updates.
//!
//! Products have a fixed shape, so every operation targets one top-level
//! field (`/id`, `/name`, `/price`, matched case-insensitively). Paths
//! without the leading `/` are not pointers and are rejected.
//!
//! - `add` / `replace` set the field
//! - `remove` resets it to its default (`""` or `0`)
//! - `copy` / `move` read the `from` field (`move` then resets it)
//! - `test` fails unless the field equals `value`
//!
//! Operations apply in order. The caller is expected to apply a document to a
//! copy and validate the result before storing it.

use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use strum::{Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::Product;

/// Error raised while applying a well-formed patch document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("The target location '{0}' does not exist on a product")]
    UnknownPath(String),

    #[error("The value at '{path}' must be {expected}")]
    InvalidValue { path: String, expected: &'static str },

    #[error("The current value at '{path}' does not match the test value")]
    TestFailed { path: String },
}

impl PatchError {
    /// Path of the operation that failed.
    pub fn path(&self) -> &str {
        match self {
            PatchError::UnknownPath(path)
            | PatchError::InvalidValue { path, .. }
            | PatchError::TestFailed { path } => path,
        }
    }
}

/// Patchable product fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductField {
    Id,
    Name,
    Price,
}

impl ProductField {
    /// Resolve a JSON pointer such as `/name` to a field.
    pub fn from_path(path: &str) -> Result<Self, PatchError> {
        let unknown = || PatchError::UnknownPath(path.to_string());

        let segment = path.strip_prefix('/').ok_or_else(unknown)?;
        if segment.contains('/') {
            return Err(unknown());
        }
        Self::from_str(segment).map_err(|_| unknown())
    }

    fn read(self, product: &Product) -> Value {
        match self {
            ProductField::Id => json!(product.id),
            ProductField::Name => json!(product.name),
            ProductField::Price => json!(product.price),
        }
    }

    fn write(self, product: &mut Product, path: &str, value: Value) -> Result<(), PatchError> {
        let invalid = |expected| PatchError::InvalidValue {
            path: path.to_string(),
            expected,
        };

        match self {
            ProductField::Id => {
                product.id = value
                    .as_i64()
                    .and_then(|v| i32::try_from(v).ok())
                    .ok_or_else(|| invalid("a 32-bit integer"))?;
            }
            ProductField::Name => {
                product.name = match value {
                    Value::String(name) => name,
                    // null clears the name; validation rejects the result
                    Value::Null => String::new(),
                    _ => return Err(invalid("a string")),
                };
            }
            ProductField::Price => {
                product.price = value.as_f64().ok_or_else(|| invalid("a number"))?;
            }
        }

        Ok(())
    }

    fn reset(self, product: &mut Product) {
        match self {
            ProductField::Id => product.id = 0,
            ProductField::Name => product.name.clear(),
            ProductField::Price => product.price = 0.0,
        }
    }

    fn matches(self, product: &Product, value: &Value) -> bool {
        match self {
            ProductField::Id => value.as_i64() == Some(i64::from(product.id)),
            ProductField::Name => value.as_str() == Some(product.name.as_str()),
            ProductField::Price => value.as_f64() == Some(product.price),
        }
    }
}

/// A single JSON Patch operation.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    pub fn apply_to(&self, product: &mut Product) -> Result<(), PatchError> {
        match self {
            PatchOperation::Add { path, value } | PatchOperation::Replace { path, value } => {
                ProductField::from_path(path)?.write(product, path, value.clone())
            }
            PatchOperation::Remove { path } => {
                ProductField::from_path(path)?.reset(product);
                Ok(())
            }
            PatchOperation::Copy { from, path } => {
                let value = ProductField::from_path(from)?.read(product);
                ProductField::from_path(path)?.write(product, path, value)
            }
            PatchOperation::Move { from, path } => {
                let source = ProductField::from_path(from)?;
                let target = ProductField::from_path(path)?;
                if source != target {
                    target.write(product, path, source.read(product))?;
                    source.reset(product);
                }
                Ok(())
            }
            PatchOperation::Test { path, value } => {
                if ProductField::from_path(path)?.matches(product, value) {
                    Ok(())
                } else {
                    Err(PatchError::TestFailed { path: path.clone() })
                }
            }
        }
    }
}

/// An ordered list of patch operations, sent as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PatchDocument(pub Vec<PatchOperation>);

impl PatchDocument {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self(operations)
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.0
    }

    /// Apply every operation in order, stopping at the first failure.
    ///
    /// `product` may be partially modified when an error is returned.
    pub fn apply_to(&self, product: &mut Product) -> Result<(), PatchError> {
        self.0.iter().try_for_each(|op| op.apply_to(product))
    }
}
