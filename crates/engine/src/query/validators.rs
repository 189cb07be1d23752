//! Closed vocabularies accepted by the builders.
//!
//! Extending any of these sets is a schema change of the engine.

/// Comparison operators a filter may use.
pub const OPERATORS: [&str; 5] = ["=", ">", "<", ">=", "<="];

/// Connectors joining two or more filters.
pub const CONNECTORS: [&str; 2] = ["AND", "OR"];

/// Sort orders.
pub const SORT_ORDERS: [&str; 2] = ["ASC", "DESC"];

pub(crate) fn valid_operator(operator: &str) -> bool {
    OPERATORS.contains(&operator)
}

/// Returns the canonical connector for a case-insensitive input.
pub(crate) fn normalize_connector(connector: &str) -> Option<&'static str> {
    normalize(connector, &CONNECTORS)
}

/// Returns the canonical sort order for a case-insensitive input.
pub(crate) fn normalize_sort_order(order: &str) -> Option<&'static str> {
    normalize(order, &SORT_ORDERS)
}

pub(crate) fn allowed_field(name: &str, allow_list: &[&str]) -> bool {
    allow_list.contains(&name)
}

fn normalize(input: &str, vocabulary: &[&'static str]) -> Option<&'static str> {
    vocabulary
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_set_is_closed() {
        for op in ["=", ">", "<", ">=", "<="] {
            assert!(valid_operator(op), "{op} should be accepted");
        }
        for op in ["", "??", "!=", "<>", "==", "=>", "LIKE", "IN", "IS", "= ", " ="] {
            assert!(!valid_operator(op), "{op:?} should be rejected");
        }
        assert_eq!(OPERATORS.len(), 5);
    }

    #[test]
    fn connectors_are_case_insensitive() {
        for input in ["and", "And", "AND", "aNd"] {
            assert_eq!(normalize_connector(input), Some("AND"));
        }
        for input in ["or", "Or", "OR"] {
            assert_eq!(normalize_connector(input), Some("OR"));
        }
        for input in ["", "XOR", "&&", "||", "NOT", " AND", "AND OR"] {
            assert_eq!(normalize_connector(input), None, "{input:?}");
        }
        assert_eq!(CONNECTORS, ["AND", "OR"]);
    }

    #[test]
    fn sort_orders_are_case_insensitive() {
        for input in ["asc", "Asc", "ASC"] {
            assert_eq!(normalize_sort_order(input), Some("ASC"));
        }
        for input in ["desc", "Desc", "DESC"] {
            assert_eq!(normalize_sort_order(input), Some("DESC"));
        }
        for input in ["", "up", "ascending", "DESC;"] {
            assert_eq!(normalize_sort_order(input), None, "{input:?}");
        }
        assert_eq!(SORT_ORDERS, ["ASC", "DESC"]);
    }

    #[test]
    fn allow_list_lookup_is_exact() {
        let fields = ["id", "name"];
        assert!(allowed_field("id", &fields));
        assert!(!allowed_field("ID", &fields));
        assert!(!allowed_field("user_id", &fields));
        assert!(!allowed_field("", &fields));
    }
}
