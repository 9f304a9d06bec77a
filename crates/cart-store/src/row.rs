use rusqlite::types::Value;

use crate::error::StoreError;

/// One fetched row: column names paired with their SQL values, in select order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Copy a driver row into an owned `Row`, using the statement's column names.
    pub(crate) fn read(names: &[String], row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let columns = names
            .iter()
            .enumerate()
            .map(|(idx, name)| Ok((name.clone(), row.get::<_, Value>(idx)?)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

/// Get a required integer column, returning CorruptRow on failure.
pub fn get_i64(row: &Row, table: &'static str, column: &'static str) -> Result<i64, StoreError> {
    match row.value(column) {
        Some(Value::Integer(n)) => Ok(*n),
        Some(other) => Err(StoreError::CorruptRow {
            table,
            column,
            detail: format!("expected integer, found {}", other.data_type()),
        }),
        None => Err(StoreError::CorruptRow {
            table,
            column,
            detail: "missing column".into(),
        }),
    }
}
