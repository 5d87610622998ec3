//! Pagination envelope shared by list operations.

use crate::model::validation::ValidationError;
use serde::Serialize;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items ascending by identifier.
    pub items: Vec<T>,
    /// Count of all matching rows, ignoring `limit`/`offset`.
    pub total: u64,
    /// Effective page size.
    pub limit: u32,
    /// Effective number of skipped rows.
    pub offset: u32,
}

/// Applies the default page size and rejects sizes outside `1..=100`.
pub fn effective_limit(limit: Option<u32>) -> Result<u32, ValidationError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(value) if value == 0 || value > MAX_LIMIT => {
            Err(ValidationError::LimitOutOfRange(value))
        }
        Some(value) => Ok(value),
    }
}
