//! Offset pagination for listing queries.

use crate::error::{DomainError, ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pagination errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("skip must be >= 0, got {0}")]
    NegativeSkip(i64),

    #[error("limit must be between 1 and {max}, got {got}")]
    LimitOutOfRange { got: i64, max: i64 },
}

impl DomainError for PageError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::ValidationFailed
    }
}

/// A validated `skip`/`limit` window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    /// Build a page from optional query parameters, applying defaults.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self, PageError> {
        let skip = skip.unwrap_or(0);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);

        if skip < 0 {
            return Err(PageError::NegativeSkip(skip));
        }
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(PageError::LimitOutOfRange {
                got: limit,
                max: Self::MAX_LIMIT,
            });
        }

        Ok(Self { skip, limit })
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
