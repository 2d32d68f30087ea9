//! Batch request descriptors.

use crate::category::Category;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Flat string-keyed query parameters. Order is not significant.
pub type QueryParams = HashMap<String, String>;

/// One entry of a batch.
///
/// The category is kept as the raw tag so that descriptors coming from
/// configuration or user input can be validated as a whole before any
/// request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: QueryParams,
}

impl RequestSpec {
    /// Descriptor for a known category with no parameters.
    pub fn new(category: Category) -> Self {
        Self {
            kind: category.as_str().to_string(),
            params: QueryParams::new(),
        }
    }

    /// Descriptor from an unchecked tag.
    pub fn raw(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: QueryParams::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Validate the descriptor and return its category.
    ///
    /// Fails on an unknown tag or on a parameter that cannot be placed in a
    /// query string (empty key).
    pub fn resolve(&self) -> Result<Category> {
        let category: Category = self.kind.parse()?;
        if self.params.keys().any(|k| k.is_empty()) {
            return Err(CoreError::InvalidParam {
                category: self.kind.clone(),
                reason: "empty parameter name".to_string(),
            });
        }
        Ok(category)
    }

    /// Descriptors for a full refresh, in [`Category::ALL`] order.
    pub fn full_refresh() -> Vec<RequestSpec> {
        Category::ALL.iter().copied().map(RequestSpec::new).collect()
    }
}

impl From<Category> for RequestSpec {
    fn from(category: Category) -> Self {
        RequestSpec::new(category)
    }
}
