//! List and count plumbing shared by every listable table.
//!
//! A table publishes its column allow-list and base statements through
//! [`Listable`]; [`list`] and [`count`] append the rendered query options and
//! bind their values.

use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, Statement, Value};

use crate::{
    EngineError, ResultEngine,
    query::{FilterValue, Filters, QueryOptions},
};

pub(crate) trait Listable: EntityTrait {
    /// Columns callers may filter and sort on.
    const FIELDS: &'static [&'static str];
    /// `SELECT * FROM "table"`.
    const SELECT: &'static str;
    /// `SELECT COUNT(*) AS "count" FROM "table"`.
    const COUNT: &'static str;
}

pub(crate) async fn list<E, C>(conn: &C, mut opts: QueryOptions) -> ResultEngine<Vec<E::Model>>
where
    E: Listable,
    C: ConnectionTrait,
{
    let suffix = opts.build()?;
    opts.validate(E::FIELDS)?;

    let stmt = statement(conn.get_database_backend(), E::SELECT, &suffix, opts.values());
    Ok(E::find().from_raw_sql(stmt).all(conn).await?)
}

/// Counts rows matching `filters`. Sorting and pagination do not apply.
pub(crate) async fn count<E, C>(conn: &C, filters: &Filters) -> ResultEngine<u64>
where
    E: Listable,
    C: ConnectionTrait,
{
    let fragment = filters.build()?;
    filters.validate_fields(E::FIELDS)?;

    let stmt = statement(conn.get_database_backend(), E::COUNT, &fragment, filters.values());
    let row = conn
        .query_one(stmt)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("count".to_string()))?;
    let count: i64 = row.try_get("", "count")?;
    Ok(u64::try_from(count).unwrap_or_default())
}

/// Joins a base statement and a rendered suffix into a bound statement.
pub(crate) fn statement(
    backend: DbBackend,
    base: &str,
    suffix: &str,
    values: Vec<FilterValue>,
) -> Statement {
    let sql = if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{base} {suffix}")
    };
    Statement::from_sql_and_values(backend, sql, values.into_iter().map(Value::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterField;

    #[test]
    fn statement_appends_suffix_and_binds_in_order() {
        let filters = Filters::new(
            vec![
                FilterField::new("user_id", "=", 1),
                FilterField::new("name", "=", "food"),
            ],
            "and",
        );
        let suffix = filters.build().unwrap();
        let stmt = statement(
            DbBackend::Sqlite,
            r#"SELECT * FROM "tags""#,
            &suffix,
            filters.values(),
        );

        assert_eq!(
            stmt.sql,
            r#"SELECT * FROM "tags" WHERE "user_id" = ? AND "name" = ?"#
        );
        assert_eq!(
            stmt.values.map(|v| v.0),
            Some(vec![Value::from(1i64), Value::from("food".to_string())])
        );
    }

    #[test]
    fn statement_without_suffix_is_the_base() {
        let stmt = statement(DbBackend::Sqlite, r#"SELECT * FROM "tags""#, "", Vec::new());
        assert_eq!(stmt.sql, r#"SELECT * FROM "tags""#);
    }
}
