//! Errors returned while building or validating query options.
//!
//! Messages enumerate the accepted vocabulary so handlers can surface them to
//! API clients verbatim.
use thiserror::Error;

use super::validators::{CONNECTORS, OPERATORS, SORT_ORDERS};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid operator \"{0}\", valid operators are {valid}", valid = OPERATORS.join(", "))]
    InvalidOperator(String),
    #[error("invalid connector \"{0}\", valid connectors are {valid}", valid = CONNECTORS.join(", "))]
    InvalidConnector(String),
    #[error("invalid filter, field name must not be empty")]
    EmptyField,
    #[error(
        "invalid sort order \"{order}\" for field \"{field}\", field and order must be set together and valid orders are {valid}",
        valid = SORT_ORDERS.join(", ")
    )]
    InvalidSortOrder { field: String, order: String },
    #[error(
        "invalid pagination values (per_page {per_page}, page {page}), both must be >= 1 or both 0"
    )]
    InvalidPagination { per_page: i64, page: i64 },
    #[error("invalid field \"{field}\", valid fields for filters and sorting are: {allowed}")]
    InvalidField { field: String, allowed: String },
}

impl QueryError {
    pub(crate) fn invalid_field(field: &str, allow_list: &[&str]) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            allowed: allow_list.join(", "),
        }
    }
}
