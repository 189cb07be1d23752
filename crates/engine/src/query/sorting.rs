use serde::{Deserialize, Serialize};

use super::{
    QueryError, quote_ident,
    validators::{allowed_field, normalize_sort_order},
};

/// Single-column ordering. Both fields empty means "no ordering".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub order: String,
}

impl Sorting {
    pub fn new(field: &str, order: &str) -> Self {
        Self {
            field: field.to_string(),
            order: order.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty() && self.order.is_empty()
    }

    /// Renders the `ORDER BY` fragment.
    ///
    /// A half-specified sorting is a shape error and fails here, before any
    /// allow-list check.
    pub fn build(&self) -> Result<String, QueryError> {
        if self.is_empty() {
            return Ok(String::new());
        }

        let order = normalize_sort_order(&self.order)
            .filter(|_| !self.field.is_empty())
            .ok_or_else(|| QueryError::InvalidSortOrder {
                field: self.field.clone(),
                order: self.order.clone(),
            })?;

        Ok(format!("ORDER BY {} {order}", quote_ident(&self.field)))
    }

    pub fn validate_field(&self, allow_list: &[&str]) -> Result<(), QueryError> {
        if self.is_empty() || allowed_field(&self.field, allow_list) {
            return Ok(());
        }
        Err(QueryError::invalid_field(&self.field, allow_list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sorting_renders_nothing() {
        assert_eq!(Sorting::default().build().unwrap(), "");
    }

    #[test]
    fn order_is_normalized() {
        for order in ["desc", "Desc", "DESC"] {
            assert_eq!(
                Sorting::new("sign_in_count", order).build().unwrap(),
                r#"ORDER BY "sign_in_count" DESC"#
            );
        }
        for order in ["asc", "Asc", "ASC"] {
            assert_eq!(
                Sorting::new("name", order).build().unwrap(),
                r#"ORDER BY "name" ASC"#
            );
        }
    }

    #[test]
    fn partial_sorting_is_a_sort_order_error() {
        let err = Sorting::new("name", "").build().unwrap_err();
        assert!(matches!(err, QueryError::InvalidSortOrder { .. }));
        assert!(err.to_string().contains("ASC, DESC"));

        let err = Sorting::new("", "asc").build().unwrap_err();
        assert!(matches!(err, QueryError::InvalidSortOrder { .. }));
    }

    #[test]
    fn rejects_unknown_order() {
        let err = Sorting::new("name", "sideways").build().unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidSortOrder {
                field: "name".to_string(),
                order: "sideways".to_string(),
            }
        );
    }

    #[test]
    fn validate_field_skips_empty_sorting() {
        assert!(Sorting::default().validate_field(&["id"]).is_ok());
        assert!(Sorting::new("id", "asc").validate_field(&["id"]).is_ok());
        assert!(matches!(
            Sorting::new("password", "asc").validate_field(&["id"]),
            Err(QueryError::InvalidField { .. })
        ));
    }
}
