use serde::{Deserialize, Serialize};

use super::{FilterValue, Filters, Pagination, QueryError, Sorting};

/// Filters, sorting and pagination for one list query.
///
/// [`QueryOptions::build`] caches the rendered fragments; mutating a
/// descriptor afterwards leaves them stale until the next build.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub sorting: Sorting,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(skip)]
    rendered: Rendered,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Rendered {
    filters: String,
    sorting: String,
    pagination: String,
}

impl QueryOptions {
    pub fn new(filters: Filters, sorting: Sorting, pagination: Pagination) -> Self {
        Self {
            filters,
            sorting,
            pagination,
            rendered: Rendered::default(),
        }
    }

    /// Renders `[WHERE ...] [ORDER BY ...] [LIMIT n OFFSET m]`.
    ///
    /// Builders run in that order and the first error is returned; nothing is
    /// cached on failure.
    pub fn build(&mut self) -> Result<String, QueryError> {
        let rendered = Rendered {
            filters: self.filters.build()?,
            sorting: self.sorting.build()?,
            pagination: self.pagination.build()?,
        };
        self.rendered = rendered;

        Ok(self.suffix())
    }

    /// Checks every filter name and the sorting field against the table's
    /// allow-list.
    pub fn validate(&self, allow_list: &[&str]) -> Result<(), QueryError> {
        self.filters.validate_fields(allow_list)?;
        self.sorting.validate_field(allow_list)
    }

    /// Bound values in placeholder order. Sorting and pagination bind nothing.
    pub fn values(&self) -> Vec<FilterValue> {
        self.filters.values()
    }

    pub fn filters_fragment(&self) -> &str {
        &self.rendered.filters
    }

    pub fn sorting_fragment(&self) -> &str {
        &self.rendered.sorting
    }

    pub fn pagination_fragment(&self) -> &str {
        &self.rendered.pagination
    }

    fn suffix(&self) -> String {
        [
            self.rendered.filters.as_str(),
            self.rendered.sorting.as_str(),
            self.rendered.pagination.as_str(),
        ]
        .into_iter()
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}
