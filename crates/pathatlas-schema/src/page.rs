//! Page window validation and per-projection size ceilings.

use thiserror::Error;

use crate::projection::ProjectionLevel;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page must be >= 1 (got {0})")]
    Page(i64),

    #[error("offset must be >= 1 (got {0})")]
    Size(i64),
}

/// A validated 1-based page window.
///
/// The size ("offset" in the visible API) is a limit, clamped to the
/// projection's ceiling. Clamping is deliberate: a caller asking for more
/// than the cap gets the capped page back, not a rejection — while a
/// non-positive page or size is a malformed request and fails. The asymmetry
/// mirrors the service's observed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u64,
    size: u64,
}

impl PageWindow {
    pub fn build(level: ProjectionLevel, page: i64, size: i64) -> Result<Self, PageError> {
        if page < 1 {
            return Err(PageError::Page(page));
        }
        if size < 1 {
            return Err(PageError::Size(size));
        }
        let size = (size as u64).min(level.page_ceiling());
        Ok(Self { page: page as u64, size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Effective page size after clamping.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Records to skip before this page starts. Saturates rather than wraps;
    /// a window beyond the dataset simply reads as empty.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn take(&self) -> u64 {
        self.size
    }
}
