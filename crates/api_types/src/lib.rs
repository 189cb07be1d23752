use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Body of every JSON response.
///
/// `error` is `null` on success; `meta` is only present on list responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            meta: None,
        }
    }

    pub fn list(data: T, meta: Meta) -> Self {
        Self {
            data: Some(data),
            error: None,
            meta: Some(meta),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
            meta: None,
        }
    }
}

/// Pagination summary of a list response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub per_page: i64,
    pub page: i64,
    /// Rows matching the filters, ignoring pagination.
    pub rows: u64,
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Meta {
    /// `per_page == 0` means the list was not paginated: `total_pages` is 0
    /// and there is no previous or next page.
    pub fn new(per_page: i64, page: i64, rows: u64) -> Self {
        let total_pages = match u64::try_from(per_page) {
            Ok(per_page) if per_page > 0 => rows.div_ceil(per_page),
            _ => 0,
        };
        let page_u = u64::try_from(page).unwrap_or_default();
        Self {
            per_page,
            page,
            rows,
            total_pages,
            has_prev: page > 1,
            has_next: page_u < total_pages,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
}

pub mod query {
    use super::*;

    /// Query string accepted by list endpoints.
    ///
    /// `query_options` carries the whole JSON descriptor; the other keys are
    /// the discrete form and are only read when `query_options` is absent.
    /// Numbers are kept as text so a malformed value falls back to its
    /// default instead of rejecting the request.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct ListParams {
        pub query_options: Option<String>,
        pub sort_field: Option<String>,
        pub sort_order: Option<String>,
        pub per_page: Option<String>,
        pub page: Option<String>,
        pub category_id: Option<String>,
        pub date_range: Option<String>,
    }

    /// Values accepted by [`ListParams::date_range`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DateRange {
        ThisMonth,
        LastMonth,
        ThisWeek,
        SixMonths,
        ThisYear,
    }

    impl DateRange {
        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "this_month" => Some(Self::ThisMonth),
                "last_month" => Some(Self::LastMonth),
                "this_week" => Some(Self::ThisWeek),
                "six_months" => Some(Self::SixMonths),
                "this_year" => Some(Self::ThisYear),
                _ => None,
            }
        }
    }
}

pub mod expense {
    use super::*;

    /// Body of `POST /expenses` and `PUT /expenses/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category_id: i64,
        pub description: String,
        /// Minor units, strictly positive.
        pub amount: i64,
        pub date: DateTime<FixedOffset>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub category_id: i64,
        pub description: String,
        pub amount: i64,
        pub date: DateTime<Utc>,
        /// Tag names, sorted.
        pub tags: Vec<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Body of `PUT /expenses/{id}/tags`: names separated by `;`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTagsSet {
        pub tags: String,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub name: String,
    }
}

pub mod recurrent_expense {
    use super::*;

    /// Body of `POST /recurrent_expenses` and `PUT /recurrent_expenses/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecurrentExpenseNew {
        pub category_id: i64,
        pub description: String,
        pub amount: i64,
        /// Months between two copies, 1 to 24.
        pub period: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_pages() {
        let meta = Meta::new(10, 1, 25);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let meta = Meta::new(10, 3, 25);
        assert!(meta.has_prev);
        assert!(!meta.has_next);

        let meta = Meta::new(10, 1, 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
    }

    #[test]
    fn unpaginated_meta() {
        let meta = Meta::new(0, 0, 7);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_prev);
        assert!(!meta.has_next);
    }

    #[test]
    fn date_range_keys() {
        use query::DateRange;

        assert_eq!(DateRange::parse("this_week"), Some(DateRange::ThisWeek));
        assert_eq!(DateRange::parse("six_months"), Some(DateRange::SixMonths));
        assert_eq!(DateRange::parse("forever"), None);
    }
}
