use serde::{Deserialize, Serialize};

use super::{
    FilterValue, PLACEHOLDER, QueryError, quote_ident,
    validators::{allowed_field, normalize_connector, valid_operator},
};

/// One `"name" operator ?` predicate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    pub name: String,
    pub value: FilterValue,
    pub operator: String,
}

impl FilterField {
    pub fn new(name: &str, operator: &str, value: impl Into<FilterValue>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            operator: operator.to_string(),
        }
    }
}

/// Ordered predicates joined by a single connector.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub fields: Vec<FilterField>,
    #[serde(default)]
    pub connector: String,
}

impl Filters {
    pub fn new(fields: Vec<FilterField>, connector: &str) -> Self {
        Self {
            fields,
            connector: connector.to_string(),
        }
    }

    /// Appends a predicate, defaulting the connector to `AND` when none was
    /// given.
    pub fn push(&mut self, field: FilterField) {
        self.fields.push(field);
        if self.connector.is_empty() {
            self.connector = "AND".to_string();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the `WHERE` fragment.
    ///
    /// Field names are not checked against an allow-list here, see
    /// [`Filters::validate_fields`].
    pub fn build(&self) -> Result<String, QueryError> {
        if self.fields.is_empty() {
            return Ok(String::new());
        }

        let connector = if self.fields.len() > 1 {
            normalize_connector(&self.connector)
                .ok_or_else(|| QueryError::InvalidConnector(self.connector.clone()))?
        } else {
            ""
        };

        let mut predicates = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(QueryError::EmptyField);
            }
            if !valid_operator(&field.operator) {
                return Err(QueryError::InvalidOperator(field.operator.clone()));
            }
            predicates.push(format!(
                "{} {} {PLACEHOLDER}",
                quote_ident(&field.name),
                field.operator
            ));
        }

        Ok(format!("WHERE {}", predicates.join(&format!(" {connector} "))))
    }

    /// Bound values, in placeholder order.
    pub fn values(&self) -> Vec<FilterValue> {
        self.fields.iter().map(|f| f.value.clone()).collect()
    }

    pub fn validate_fields(&self, allow_list: &[&str]) -> Result<(), QueryError> {
        match self
            .fields
            .iter()
            .find(|f| !allowed_field(&f.name, allow_list))
        {
            Some(field) => Err(QueryError::invalid_field(&field.name, allow_list)),
            None => Ok(()),
        }
    }
}
