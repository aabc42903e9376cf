//! Structured filter conditions
//!
//! A [`Condition`] renders to a SQL predicate in which column names are quoted
//! [`Ident`]s and every value is a bound `?` placeholder. Conditions can be
//! built in Rust or deserialized from JSON, e.g.
//!
//! ```json
//! {"op": "and", "conditions": [
//!     {"op": "eq", "column": "tier", "value": "free"},
//!     {"op": "gt", "column": "age", "value": 18}
//! ]}
//! ```

use crate::ident::Ident;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Matches every row; renders no WHERE clause at the top level
    All,
    Eq { column: Ident, value: Value },
    Ne { column: Ident, value: Value },
    Lt { column: Ident, value: Value },
    Le { column: Ident, value: Value },
    Gt { column: Ident, value: Value },
    Ge { column: Ident, value: Value },
    Like { column: Ident, pattern: String },
    IsNull { column: Ident },
    IsNotNull { column: Ident },
    In { column: Ident, values: Vec<Value> },
    NotIn { column: Ident, values: Vec<Value> },
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Not { condition: Box<Condition> },
    /// Caller-written SQL, see [`Condition::trusted_sql`]
    #[serde(skip)]
    TrustedSql { sql: String, params: Vec<Value> },
}

impl Condition {
    pub fn all() -> Self {
        Condition::All
    }

    pub fn eq(column: Ident, value: impl Into<Value>) -> Self {
        Condition::Eq {
            column,
            value: value.into(),
        }
    }

    pub fn ne(column: Ident, value: impl Into<Value>) -> Self {
        Condition::Ne {
            column,
            value: value.into(),
        }
    }

    pub fn lt(column: Ident, value: impl Into<Value>) -> Self {
        Condition::Lt {
            column,
            value: value.into(),
        }
    }

    pub fn le(column: Ident, value: impl Into<Value>) -> Self {
        Condition::Le {
            column,
            value: value.into(),
        }
    }

    pub fn gt(column: Ident, value: impl Into<Value>) -> Self {
        Condition::Gt {
            column,
            value: value.into(),
        }
    }

    pub fn ge(column: Ident, value: impl Into<Value>) -> Self {
        Condition::Ge {
            column,
            value: value.into(),
        }
    }

    /// SQL `LIKE` with a bound pattern (`%` and `_` wildcards)
    pub fn like(column: Ident, pattern: impl Into<String>) -> Self {
        Condition::Like {
            column,
            pattern: pattern.into(),
        }
    }

    pub fn is_null(column: Ident) -> Self {
        Condition::IsNull { column }
    }

    pub fn is_not_null(column: Ident) -> Self {
        Condition::IsNotNull { column }
    }

    pub fn in_list<V: Into<Value>>(column: Ident, values: impl IntoIterator<Item = V>) -> Self {
        Condition::In {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_in<V: Into<Value>>(column: Ident, values: impl IntoIterator<Item = V>) -> Self {
        Condition::NotIn {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all_of(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::And {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn any_of(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Or {
            conditions: conditions.into_iter().collect(),
        }
    }

    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And { mut conditions } => {
                conditions.push(other);
                Condition::And { conditions }
            }
            first => Condition::all_of([first, other]),
        }
    }

    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or { mut conditions } => {
                conditions.push(other);
                Condition::Or { conditions }
            }
            first => Condition::any_of([first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Condition::Not {
            condition: Box::new(self),
        }
    }

    /// Raw predicate text spliced into the query as-is.
    ///
    /// This is a trust boundary: `sql` is executed verbatim, so it must never
    /// contain text that came from an end user. Values belong in `params`,
    /// referenced from `sql` with anonymous `?` placeholders only (numbered
    /// `?NNN` or named parameters would be mis-bound next to generated ones).
    /// This variant cannot be produced by deserialization.
    pub fn trusted_sql(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Condition::TrustedSql {
            sql: sql.into(),
            params,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Condition::All)
    }

    /// Append this predicate to `sql`, pushing bound values onto `params` in
    /// placeholder order
    pub(crate) fn render(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Condition::All => sql.push_str("1 = 1"),
            Condition::Eq { column, value } => compare(sql, params, column, "=", value),
            Condition::Ne { column, value } => compare(sql, params, column, "<>", value),
            Condition::Lt { column, value } => compare(sql, params, column, "<", value),
            Condition::Le { column, value } => compare(sql, params, column, "<=", value),
            Condition::Gt { column, value } => compare(sql, params, column, ">", value),
            Condition::Ge { column, value } => compare(sql, params, column, ">=", value),
            Condition::Like { column, pattern } => {
                sql.push_str(&column.quoted());
                sql.push_str(" LIKE ?");
                params.push(Value::String(pattern.clone()));
            }
            Condition::IsNull { column } => {
                sql.push_str(&column.quoted());
                sql.push_str(" IS NULL");
            }
            Condition::IsNotNull { column } => {
                sql.push_str(&column.quoted());
                sql.push_str(" IS NOT NULL");
            }
            Condition::In { column, values } => membership(sql, params, column, "IN", values),
            Condition::NotIn { column, values } => {
                membership(sql, params, column, "NOT IN", values)
            }
            Condition::And { conditions } => join(sql, params, conditions, " AND ", "1 = 1"),
            Condition::Or { conditions } => join(sql, params, conditions, " OR ", "1 = 0"),
            Condition::Not { condition } => {
                sql.push_str("NOT (");
                condition.render(sql, params);
                sql.push(')');
            }
            Condition::TrustedSql { sql: raw, params: raw_params } => {
                sql.push('(');
                sql.push_str(raw);
                sql.push(')');
                params.extend(raw_params.iter().cloned());
            }
        }
    }
}

impl std::ops::Not for Condition {
    type Output = Condition;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

fn compare(sql: &mut String, params: &mut Vec<Value>, column: &Ident, op: &str, value: &Value) {
    // `col = NULL` is never true in SQL, so null comparisons use IS / IS NOT
    let op = match (op, value.is_null()) {
        ("=", true) => "IS",
        ("<>", true) => "IS NOT",
        (op, _) => op,
    };
    sql.push_str(&column.quoted());
    sql.push(' ');
    sql.push_str(op);
    sql.push_str(" ?");
    params.push(value.clone());
}

fn membership(
    sql: &mut String,
    params: &mut Vec<Value>,
    column: &Ident,
    op: &str,
    values: &[Value],
) {
    if values.is_empty() {
        // Nothing is IN an empty set; everything is NOT IN it
        sql.push_str(if op == "IN" { "1 = 0" } else { "1 = 1" });
        return;
    }
    sql.push_str(&column.quoted());
    sql.push(' ');
    sql.push_str(op);
    sql.push_str(" (");
    sql.push_str(&vec!["?"; values.len()].join(", "));
    sql.push(')');
    params.extend(values.iter().cloned());
}

fn join(
    sql: &mut String,
    params: &mut Vec<Value>,
    conditions: &[Condition],
    separator: &str,
    empty: &str,
) {
    if conditions.is_empty() {
        sql.push_str(empty);
        return;
    }
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            sql.push_str(separator);
        }
        sql.push('(');
        condition.render(sql, params);
        sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col(name: &str) -> Ident {
        Ident::new(name).unwrap()
    }

    fn rendered(condition: &Condition) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        condition.render(&mut sql, &mut params);
        (sql, params)
    }

    #[test]
    fn test_comparison_binds_value() {
        let (sql, params) = rendered(&Condition::eq(col("user_id"), 1));
        assert_eq!(sql, "\"user_id\" = ?");
        assert_eq!(params, vec![json!(1)]);

        let (sql, _) = rendered(&Condition::ge(col("age"), 18));
        assert_eq!(sql, "\"age\" >= ?");
    }

    #[test]
    fn test_null_equality_uses_is() {
        let (sql, params) = rendered(&Condition::eq(col("deleted_at"), Value::Null));
        assert_eq!(sql, "\"deleted_at\" IS ?");
        assert_eq!(params, vec![Value::Null]);

        let (sql, _) = rendered(&Condition::ne(col("deleted_at"), Value::Null));
        assert_eq!(sql, "\"deleted_at\" IS NOT ?");
    }

    #[test]
    fn test_combinators_nest_in_parentheses() {
        let condition = Condition::eq(col("tier"), "free")
            .and(Condition::gt(col("age"), 18))
            .and(Condition::like(col("email"), "%@example.com"));
        let (sql, params) = rendered(&condition);
        assert_eq!(
            sql,
            "(\"tier\" = ?) AND (\"age\" > ?) AND (\"email\" LIKE ?)"
        );
        assert_eq!(params, vec![json!("free"), json!(18), json!("%@example.com")]);

        let (sql, _) = rendered(&(!Condition::is_null(col("email"))).or(Condition::all()));
        assert_eq!(sql, "(NOT (\"email\" IS NULL)) OR (1 = 1)");
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(rendered(&Condition::all_of([])).0, "1 = 1");
        assert_eq!(rendered(&Condition::any_of([])).0, "1 = 0");
        assert_eq!(rendered(&Condition::in_list(col("id"), Vec::<i64>::new())).0, "1 = 0");
        assert_eq!(rendered(&Condition::not_in(col("id"), Vec::<i64>::new())).0, "1 = 1");
    }

    #[test]
    fn test_in_list_placeholders() {
        let (sql, params) = rendered(&Condition::in_list(col("id"), [1, 2, 3]));
        assert_eq!(sql, "\"id\" IN (?, ?, ?)");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_trusted_sql_is_wrapped() {
        let (sql, params) = rendered(&Condition::trusted_sql(
            "length(name) > ?",
            vec![json!(3)],
        ));
        assert_eq!(sql, "(length(name) > ?)");
        assert_eq!(params, vec![json!(3)]);
    }

    #[test]
    fn test_deserialize_from_json() {
        let condition: Condition = serde_json::from_value(json!({
            "op": "or",
            "conditions": [
                {"op": "eq", "column": "tier", "value": "free"},
                {"op": "in", "column": "id", "values": [1, 2]},
                {"op": "not", "condition": {"op": "is_null", "column": "email"}}
            ]
        }))
        .unwrap();
        assert_eq!(
            condition,
            Condition::any_of([
                Condition::eq(col("tier"), "free"),
                Condition::in_list(col("id"), [1, 2]),
                Condition::is_null(col("email")).negate(),
            ])
        );
    }

    #[test]
    fn test_deserialize_rejects_bad_column_and_raw_sql() {
        assert!(serde_json::from_value::<Condition>(
            json!({"op": "eq", "column": "id = 1 OR 1", "value": 1})
        )
        .is_err());
        assert!(serde_json::from_value::<Condition>(
            json!({"op": "trusted_sql", "sql": "1 = 1", "params": []})
        )
        .is_err());
    }
}
