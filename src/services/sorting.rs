//! Ordering of list queries
//!
//! Clients send `orderBy` as a comma separated list of `field [asc|desc]`.
//! Fields are looked up case-insensitively in a per-entity whitelist, so the
//! generated clause only ever contains known column names.

/// Sort direction of one ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One resolved ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Field name to column mapping of one entity
#[derive(Debug, Clone, Copy)]
pub struct SortableColumns {
    columns: &'static [(&'static str, &'static str)],
    default_column: &'static str,
}

/// Employee columns clients may order by
pub const EMPLOYEE_SORT_COLUMNS: SortableColumns = SortableColumns::new(
    &[
        ("id", "id"),
        ("name", "name"),
        ("age", "age"),
        ("position", "position"),
    ],
    "name",
);

impl SortableColumns {
    pub const fn new(
        columns: &'static [(&'static str, &'static str)],
        default_column: &'static str,
    ) -> Self {
        Self {
            columns,
            default_column,
        }
    }

    fn column(&self, field: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, column)| *column)
    }

    /// Resolve an `orderBy` string. Unknown fields are skipped and repeated
    /// fields keep their first direction.
    pub fn parse(&self, order_by: &str) -> Vec<OrderTerm> {
        let mut terms: Vec<OrderTerm> = Vec::new();

        for part in order_by.split(',') {
            let mut tokens = part.split_whitespace();
            let Some(field) = tokens.next() else {
                continue;
            };
            let Some(column) = self.column(field) else {
                tracing::debug!("Ignoring unknown order field: {}", field);
                continue;
            };
            if terms.iter().any(|t| t.column == column) {
                continue;
            }

            let direction = match tokens.next() {
                Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                _ => SortDirection::Asc,
            };
            terms.push(OrderTerm { column, direction });
        }

        terms
    }

    /// Build an `ORDER BY` clause, falling back to the default column
    pub fn order_clause(&self, order_by: &str) -> String {
        let terms = self.parse(order_by);
        if terms.is_empty() {
            return format!("ORDER BY {} ASC", self.default_column);
        }

        let parts: Vec<String> = terms
            .iter()
            .map(|t| format!("{} {}", t.column, t.direction.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_field() {
        let terms = EMPLOYEE_SORT_COLUMNS.parse("age");

        assert_eq!(
            terms,
            vec![OrderTerm {
                column: "age",
                direction: SortDirection::Asc
            }]
        );
    }

    #[test]
    fn test_parse_multiple_fields_with_direction() {
        let terms = EMPLOYEE_SORT_COLUMNS.parse("Name desc, AGE");

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].column, "name");
        assert_eq!(terms[0].direction, SortDirection::Desc);
        assert_eq!(terms[1].column, "age");
        assert_eq!(terms[1].direction, SortDirection::Asc);
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        assert!(EMPLOYEE_SORT_COLUMNS.parse("salary desc, ; drop table").is_empty());
        assert_eq!(EMPLOYEE_SORT_COLUMNS.parse("salary, age").len(), 1);
    }

    #[test]
    fn test_repeated_field_keeps_first() {
        let terms = EMPLOYEE_SORT_COLUMNS.parse("age desc, age asc");

        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].direction, SortDirection::Desc);
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(
            EMPLOYEE_SORT_COLUMNS.order_clause("name desc, age"),
            "ORDER BY name DESC, age ASC"
        );
        assert_eq!(EMPLOYEE_SORT_COLUMNS.order_clause(""), "ORDER BY name ASC");
        assert_eq!(EMPLOYEE_SORT_COLUMNS.order_clause("bogus"), "ORDER BY name ASC");
    }
}
