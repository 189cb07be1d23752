use serde::{Deserialize, Serialize};

use super::QueryError;

/// Offset pagination, `page` is 1-based. Both zero means "no limit".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub per_page: i64,
    #[serde(default)]
    pub page: i64,
}

impl Pagination {
    pub fn new(per_page: i64, page: i64) -> Self {
        Self { per_page, page }
    }

    pub fn is_empty(&self) -> bool {
        self.per_page == 0 && self.page == 0
    }

    /// Renders `LIMIT per_page OFFSET (page - 1) * per_page`.
    pub fn build(&self) -> Result<String, QueryError> {
        if self.is_empty() {
            return Ok(String::new());
        }

        let invalid = || QueryError::InvalidPagination {
            per_page: self.per_page,
            page: self.page,
        };

        if self.per_page < 1 || self.page < 1 {
            return Err(invalid());
        }
        let offset = (self.page - 1)
            .checked_mul(self.per_page)
            .ok_or_else(invalid)?;

        Ok(format!("LIMIT {} OFFSET {offset}", self.per_page))
    }
}
