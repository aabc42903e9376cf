//! SQL text generation for the record store operations
//!
//! Table and column names are rendered from [`Ident`]s; every value is a `?`
//! placeholder whose bound value is pushed onto [`SqlStatement::params`].

use crate::condition::Condition;
use crate::error::{RecordError, Result};
use crate::ident::Ident;
use crate::models::{Page, Record};
use serde_json::Value;

/// SQL text plus the values for its placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlStatement {
    fn new(sql: String) -> Self {
        SqlStatement {
            sql,
            params: Vec::new(),
        }
    }

    fn push_where(&mut self, condition: Option<&Condition>) {
        match condition {
            Some(condition) if !condition.is_all() => {
                self.sql.push_str(" WHERE ");
                condition.render(&mut self.sql, &mut self.params);
            }
            _ => {}
        }
    }
}

/// `SELECT * FROM t [WHERE ...]`
pub fn select(table: &Ident, condition: Option<&Condition>) -> SqlStatement {
    let mut stmt = SqlStatement::new(format!("SELECT * FROM {}", table.quoted()));
    stmt.push_where(condition);
    stmt
}

/// `SELECT * FROM t WHERE ... LIMIT 1`
pub fn fetch_one(table: &Ident, condition: &Condition) -> SqlStatement {
    let mut stmt = select(table, Some(condition));
    stmt.sql.push_str(" LIMIT 1");
    stmt
}

/// `SELECT COUNT(*) FROM t [WHERE ...]`
pub fn count(table: &Ident, condition: Option<&Condition>) -> SqlStatement {
    let mut stmt = SqlStatement::new(format!("SELECT COUNT(*) FROM {}", table.quoted()));
    stmt.push_where(condition);
    stmt
}

/// `SELECT * FROM t [WHERE ...] [ORDER BY c ASC|DESC] LIMIT ? OFFSET ?`
pub fn search(table: &Ident, condition: Option<&Condition>, page: &Page) -> SqlStatement {
    let mut stmt = select(table, condition);
    if let Some(order_by) = &page.order_by {
        stmt.sql.push_str(" ORDER BY ");
        stmt.sql.push_str(&order_by.column.quoted());
        stmt.sql.push(' ');
        stmt.sql.push_str(order_by.order.as_sql());
    }
    stmt.sql.push_str(" LIMIT ? OFFSET ?");
    stmt.params.push(Value::from(page.limit));
    stmt.params.push(Value::from(page.offset));
    stmt
}

/// `INSERT INTO t (a, b) VALUES (?, ?)`
pub fn insert(table: &Ident, record: &Record) -> Result<SqlStatement> {
    let columns = record_columns(record)?;
    let mut stmt = SqlStatement::new(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.quoted(),
        column_list(&columns),
        placeholders(columns.len())
    ));
    stmt.params.extend(record.values().cloned());
    Ok(stmt)
}

/// `UPDATE t SET a = ?, b = ? [WHERE ...]`
pub fn update(table: &Ident, record: &Record, condition: &Condition) -> Result<SqlStatement> {
    let columns = record_columns(record)?;
    let assignments = columns
        .iter()
        .map(|c| format!("{} = ?", c.quoted()))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = SqlStatement::new(format!("UPDATE {} SET {}", table.quoted(), assignments));
    stmt.params.extend(record.values().cloned());
    stmt.push_where(Some(condition));
    Ok(stmt)
}

/// `DELETE FROM t [WHERE ...]`
pub fn delete(table: &Ident, condition: &Condition) -> SqlStatement {
    let mut stmt = SqlStatement::new(format!("DELETE FROM {}", table.quoted()));
    stmt.push_where(Some(condition));
    stmt
}

/// Single multi-row `INSERT INTO t (a, b) VALUES (?, ?), (?, ?), ...`
///
/// Every row must carry exactly the columns of the first row. Column order
/// may differ between rows; values are bound in the first row's order.
pub fn bulk_insert(table: &Ident, rows: &[Record]) -> Result<SqlStatement> {
    let first = rows
        .first()
        .ok_or_else(|| RecordError::validation("bulk insert requires at least one row"))?;
    let columns = record_columns(first)?;

    for (index, row) in rows.iter().enumerate().skip(1) {
        let same_columns =
            row.len() == columns.len() && columns.iter().all(|c| row.contains_key(c.as_str()));
        if !same_columns {
            return Err(RecordError::validation(format!(
                "row {} has columns [{}], expected [{}]",
                index,
                row.keys().cloned().collect::<Vec<_>>().join(", "),
                first.keys().cloned().collect::<Vec<_>>().join(", ")
            )));
        }
    }

    let row_placeholders = format!("({})", placeholders(columns.len()));
    let mut stmt = SqlStatement::new(format!(
        "INSERT INTO {} ({}) VALUES {}",
        table.quoted(),
        column_list(&columns),
        vec![row_placeholders.as_str(); rows.len()].join(", ")
    ));
    stmt.params.reserve(rows.len() * columns.len());
    for row in rows {
        for column in &columns {
            stmt.params
                .push(row.get(column.as_str()).cloned().unwrap_or(Value::Null));
        }
    }
    Ok(stmt)
}

fn record_columns(record: &Record) -> Result<Vec<Ident>> {
    if record.is_empty() {
        return Err(RecordError::validation(
            "record must contain at least one column",
        ));
    }
    record.keys().map(|k| Ident::new(k.as_str())).collect()
}

fn column_list(columns: &[Ident]) -> String {
    columns
        .iter()
        .map(Ident::quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
