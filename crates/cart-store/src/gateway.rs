use rusqlite::params_from_iter;
use rusqlite::types::Value;

use crate::database::Database;
use crate::error::StoreError;
use crate::row::Row;

/// Column/value pairs used both as written values and as match criteria.
pub type Columns<'a> = [(&'a str, Value)];

/// Generic row-level access to a relational store.
///
/// Queries are passed through as-is with positional parameters. Writes name a
/// table and columns, which must be plain identifiers; values are always bound.
pub trait StorageGateway {
    fn fetch_one(&self, query: &str, params: &[Value]) -> Result<Option<Row>, StoreError>;

    fn fetch_all(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, StoreError>;

    /// Returns the number of inserted rows.
    fn insert(&self, table: &str, values: &Columns<'_>) -> Result<usize, StoreError>;

    /// Returns the number of rows matched by `matching`.
    fn update(
        &self,
        table: &str,
        values: &Columns<'_>,
        matching: &Columns<'_>,
    ) -> Result<usize, StoreError>;

    /// Returns the number of deleted rows; zero is not an error.
    fn delete(&self, table: &str, matching: &Columns<'_>) -> Result<usize, StoreError>;
}

impl<G: StorageGateway + ?Sized> StorageGateway for &G {
    fn fetch_one(&self, query: &str, params: &[Value]) -> Result<Option<Row>, StoreError> {
        (**self).fetch_one(query, params)
    }

    fn fetch_all(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        (**self).fetch_all(query, params)
    }

    fn insert(&self, table: &str, values: &Columns<'_>) -> Result<usize, StoreError> {
        (**self).insert(table, values)
    }

    fn update(
        &self,
        table: &str,
        values: &Columns<'_>,
        matching: &Columns<'_>,
    ) -> Result<usize, StoreError> {
        (**self).update(table, values, matching)
    }

    fn delete(&self, table: &str, matching: &Columns<'_>) -> Result<usize, StoreError> {
        (**self).delete(table, matching)
    }
}

impl StorageGateway for Database {
    fn fetch_one(&self, query: &str, params: &[Value]) -> Result<Option<Row>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(query)?;
            let names = column_names(&stmt);
            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let first = match rows.next()? {
                Some(row) => Some(Row::read(&names, row)?),
                None => None,
            };
            Ok(first)
        })
    }

    fn fetch_all(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(query)?;
            let names = column_names(&stmt);
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| Row::read(&names, row))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn insert(&self, table: &str, values: &Columns<'_>) -> Result<usize, StoreError> {
        let sql = insert_sql(table, values)?;
        self.with_conn(|conn| {
            Ok(conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))?)
        })
    }

    fn update(
        &self,
        table: &str,
        values: &Columns<'_>,
        matching: &Columns<'_>,
    ) -> Result<usize, StoreError> {
        let sql = update_sql(table, values, matching)?;
        let bound = values.iter().chain(matching.iter()).map(|(_, v)| v);
        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(bound))?))
    }

    fn delete(&self, table: &str, matching: &Columns<'_>) -> Result<usize, StoreError> {
        let sql = delete_sql(table, matching)?;
        self.with_conn(|conn| {
            Ok(conn.execute(&sql, params_from_iter(matching.iter().map(|(_, v)| v)))?)
        })
    }
}

fn column_names(stmt: &rusqlite::Statement<'_>) -> Vec<String> {
    stmt.column_names().into_iter().map(String::from).collect()
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
fn check_identifier(name: &str) -> Result<&str, StoreError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidStatement(format!("bad identifier {name:?}")))
    }
}

fn non_empty<'c, 'a>(
    columns: &'c Columns<'a>,
    what: &str,
) -> Result<&'c Columns<'a>, StoreError> {
    if columns.is_empty() {
        Err(StoreError::InvalidStatement(format!("no {what} columns")))
    } else {
        Ok(columns)
    }
}

/// `col = ?N` fragments numbered from `first`.
fn assignments(columns: &Columns<'_>, first: usize) -> Result<Vec<String>, StoreError> {
    columns
        .iter()
        .enumerate()
        .map(|(i, (name, _))| Ok(format!("{} = ?{}", check_identifier(name)?, first + i)))
        .collect()
}

fn insert_sql(table: &str, values: &Columns<'_>) -> Result<String, StoreError> {
    let table = check_identifier(table)?;
    let values = non_empty(values, "insert")?;
    let names = values
        .iter()
        .map(|(name, _)| check_identifier(name))
        .collect::<Result<Vec<_>, _>>()?;
    let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
    Ok(format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    ))
}

fn update_sql(
    table: &str,
    values: &Columns<'_>,
    matching: &Columns<'_>,
) -> Result<String, StoreError> {
    let table = check_identifier(table)?;
    let set = assignments(non_empty(values, "update")?, 1)?;
    let filter = assignments(non_empty(matching, "match")?, values.len() + 1)?;
    Ok(format!(
        "UPDATE {table} SET {} WHERE {}",
        set.join(", "),
        filter.join(" AND ")
    ))
}

// An empty match list would delete the whole table.
fn delete_sql(table: &str, matching: &Columns<'_>) -> Result<String, StoreError> {
    let table = check_identifier(table)?;
    let filter = assignments(non_empty(matching, "match")?, 1)?;
    Ok(format!("DELETE FROM {table} WHERE {}", filter.join(" AND ")))
}
