//! Builds user-scoped [`QueryOptions`] from a list endpoint query string.

use api_types::query::{DateRange, ListParams};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use engine::query::{FilterField, Filters, Pagination, QueryOptions, Sorting};

use crate::ServerError;

pub(crate) const MAX_PER_PAGE: i64 = 200;
pub(crate) const MAX_PAGE: i64 = 1_000_000;
const DEFAULT_PER_PAGE: i64 = 10;

/// Decode the list parameters and restrict them to `user_id`'s rows.
///
/// `query_options` (JSON) wins over the discrete keys. `default_sort` applies
/// when the request names no sorting at all.
pub(crate) fn scoped_query_options(
    params: &ListParams,
    user_id: i64,
    default_sort: Sorting,
    now: DateTime<Utc>,
) -> Result<QueryOptions, ServerError> {
    let mut opts = match params.query_options.as_deref() {
        Some(raw) => serde_json::from_str::<QueryOptions>(raw)
            .map_err(|err| ServerError::Generic(format!("invalid query_options: {err}")))?,
        None => discrete_query_options(params, now),
    };

    if opts.sorting.is_empty() {
        opts.sorting = default_sort;
    }

    let Pagination { per_page, page } = opts.pagination;
    if per_page > MAX_PER_PAGE {
        return Err(ServerError::Generic(format!(
            "per_page must be at most {MAX_PER_PAGE}"
        )));
    }
    if page > MAX_PAGE {
        return Err(ServerError::Generic(format!("page must be at most {MAX_PAGE}")));
    }

    // The scope is AND-ed with the caller's predicates; an OR connector would
    // let it be bypassed.
    if opts.filters.connector.eq_ignore_ascii_case("OR") {
        if !opts.filters.is_empty() {
            return Err(ServerError::Generic(
                "the OR connector cannot be combined with the user scope".to_string(),
            ));
        }
        opts.filters.connector.clear();
    }
    opts.filters.push(FilterField::new("user_id", "=", user_id));

    Ok(opts)
}

fn discrete_query_options(params: &ListParams, now: DateTime<Utc>) -> QueryOptions {
    let sorting = Sorting::new(
        params.sort_field.as_deref().unwrap_or_default(),
        params.sort_order.as_deref().unwrap_or_default(),
    );
    let pagination = Pagination::new(
        positive(params.per_page.as_deref()).unwrap_or(DEFAULT_PER_PAGE),
        positive(params.page.as_deref()).unwrap_or(1),
    );

    let mut filters = Filters::default();
    if let Some(category_id) = positive(params.category_id.as_deref()) {
        filters.push(FilterField::new("category_id", "=", category_id));
    }
    if let Some((start, end)) = params
        .date_range
        .as_deref()
        .and_then(DateRange::parse)
        .and_then(|range| date_range_bounds(range, now))
    {
        filters.push(FilterField::new("date", ">=", start));
        filters.push(FilterField::new("date", "<", end));
    }

    QueryOptions::new(filters, sorting, pagination)
}

fn positive(value: Option<&str>) -> Option<i64> {
    value?.trim().parse::<i64>().ok().filter(|n| *n >= 1)
}

/// Half-open `[start, end)` interval of `range`, in UTC days.
pub(crate) fn date_range_bounds(
    range: DateRange,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.date_naive();
    let month_start = today.with_day(1)?;

    let (start, end) = match range {
        DateRange::ThisMonth => (month_start, month_start.checked_add_months(Months::new(1))?),
        DateRange::LastMonth => (month_start.checked_sub_months(Months::new(1))?, month_start),
        DateRange::ThisWeek => {
            let monday = today.checked_sub_days(Days::new(u64::from(
                today.weekday().num_days_from_monday(),
            )))?;
            (monday, monday.checked_add_days(Days::new(7))?)
        }
        DateRange::SixMonths => (
            month_start.checked_sub_months(Months::new(6))?,
            month_start.checked_add_months(Months::new(1))?,
        ),
        DateRange::ThisYear => (
            NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
        ),
    };

    Some((midnight(start)?, midnight(end)?))
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
