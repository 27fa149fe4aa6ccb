//! This module defines the common functionality for paging data.

use crate::Error;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of records per page when the request does not specify one.
    pub default_page_size: u64,
    /// The largest page size a client may request. Larger values are clamped.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// A validated page request.
///
/// Page numbers are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u64,
    size: u64,
}

impl Page {
    /// Parse the raw `page` and `pageSize` query parameters.
    ///
    /// Missing parameters fall back to the first page and the configured
    /// default page size. The page size is clamped to the configured maximum.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilter] if either parameter is present but is
    /// not a positive integer.
    pub fn from_params(
        page: Option<&str>,
        page_size: Option<&str>,
        config: &PaginationConfig,
    ) -> Result<Self, Error> {
        let number = parse_positive(page, "page")?.unwrap_or(1);
        let size = parse_positive(page_size, "pageSize")?
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size);

        Ok(Self { number, size })
    }

    /// The number of records in a full page, for the SQL LIMIT clause.
    pub fn limit(&self) -> u64 {
        self.size
    }

    /// The number of records to skip, for the SQL OFFSET clause.
    ///
    /// The page number is client-controlled, so the multiplication saturates
    /// rather than overflowing. SQLite's OFFSET is a signed 64-bit value, so
    /// the result is also capped there; any offset that large is past the
    /// end of every listing anyway.
    pub fn offset(&self) -> u64 {
        (self.number - 1)
            .saturating_mul(self.size)
            .min(i64::MAX as u64)
    }
}

fn parse_positive(value: Option<&str>, field: &'static str) -> Result<Option<u64>, Error> {
    match value {
        None => Ok(None),
        Some(raw) => match raw.parse::<u64>() {
            Ok(number) if number > 0 => Ok(Some(number)),
            _ => Err(Error::InvalidFilter(field)),
        },
    }
}
