//! Dynamic query options.
//!
//! Translates caller supplied filter, sort and pagination descriptors into a
//! SQL suffix that repositories append to their base `SELECT`/`COUNT`
//! statement.
//!
//! The rendered SQL only ever contains:
//!
//! - literal keywords (`WHERE`, `AND`, `ORDER BY`, `LIMIT`, ...),
//! - double-quoted identifiers checked against the table allow-list,
//! - operators from a closed set,
//! - `?` placeholders.
//!
//! Every user value travels out-of-band through [`QueryOptions::values`].
//!
//! ```rust
//! use engine::query::{FilterField, Filters, Pagination, QueryOptions, Sorting};
//!
//! let mut opts = QueryOptions::new(
//!     Filters::new(vec![FilterField::new("amount", ">", 100)], ""),
//!     Sorting::new("date", "desc"),
//!     Pagination::new(10, 2),
//! );
//! let suffix = opts.build().unwrap();
//! opts.validate(&["amount", "date"]).unwrap();
//!
//! assert_eq!(
//!     suffix,
//!     r#"WHERE "amount" > ? ORDER BY "date" DESC LIMIT 10 OFFSET 10"#
//! );
//! assert_eq!(opts.values().len(), 1);
//! ```

mod error;
mod filters;
mod options;
mod pagination;
mod sorting;
mod validators;
mod value;

pub use error::QueryError;
pub use filters::{FilterField, Filters};
pub use options::QueryOptions;
pub use pagination::Pagination;
pub use sorting::Sorting;
pub use validators::{CONNECTORS, OPERATORS, SORT_ORDERS};
pub use value::FilterValue;

/// Placeholder token substituted by the driver with a bound value.
pub const PLACEHOLDER: &str = "?";

/// Quote an identifier that already passed (or will pass) the allow-list.
fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}
