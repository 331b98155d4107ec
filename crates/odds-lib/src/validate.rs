//! Search parameters and their validation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest accepted `id` value.
pub const MAX_ID_LEN: usize = 100;

/// Longest accepted `key` value.
pub const MAX_KEY_LEN: usize = 50;

/// Validation trait for untrusted request input.
pub trait Validate {
    /// Check syntactic constraints without touching the store.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Optional search filters taken from the query string.
///
/// Empty strings are treated the same as absent parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SearchParams {
    pub fn new(id: Option<String>, key: Option<String>) -> Self {
        Self { id, key }.normalized()
    }

    /// Drop empty values so that `?id=` behaves like a missing `id`.
    pub fn normalized(self) -> Self {
        Self {
            id: self.id.filter(|v| !v.is_empty()),
            key: self.key.filter(|v| !v.is_empty()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|v| !v.is_empty())
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|v| !v.is_empty())
    }
}

impl Validate for SearchParams {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(id) = self.id() {
            if id.len() > MAX_ID_LEN || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ValidationError::InvalidId { max: MAX_ID_LEN });
            }
        }

        if let Some(key) = self.key() {
            if key.len() > MAX_KEY_LEN || !key.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ValidationError::InvalidKey { max: MAX_KEY_LEN });
            }
        }

        Ok(())
    }
}
