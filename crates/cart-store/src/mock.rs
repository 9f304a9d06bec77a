use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rusqlite::types::Value;

use crate::error::StoreError;
use crate::gateway::{Columns, StorageGateway};
use crate::row::Row;

/// A storage call as seen by [`RecordingGateway`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    FetchOne {
        query: String,
        params: Vec<Value>,
    },
    FetchAll {
        query: String,
        params: Vec<Value>,
    },
    Insert {
        table: String,
        values: Vec<(String, Value)>,
    },
    Update {
        table: String,
        values: Vec<(String, Value)>,
        matching: Vec<(String, Value)>,
    },
    Delete {
        table: String,
        matching: Vec<(String, Value)>,
    },
}

/// Gateway that records every call and answers fetches from queued result sets,
/// for deterministic tests without SQLite.
///
/// Each fetch consumes one queued result set; with nothing queued a fetch
/// returns no rows. Writes report one affected row, or an I/O failure once
/// [`fail_writes`](Self::fail_writes) is set. Failed writes are still recorded.
#[derive(Default)]
pub struct RecordingGateway {
    calls: Mutex<Vec<Call>>,
    results: Mutex<VecDeque<Vec<Row>>>,
    fail_writes: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next fetch call.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.results.lock().push_back(rows);
    }

    /// Make every following insert, update and delete fail.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::Relaxed);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn next_rows(&self) -> Vec<Row> {
        self.results.lock().pop_front().unwrap_or_default()
    }

    fn write_result(&self) -> Result<usize, StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            Err(StoreError::Sqlite(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                Some("write failed".into()),
            )))
        } else {
            Ok(1)
        }
    }
}

fn owned(columns: &Columns<'_>) -> Vec<(String, Value)> {
    columns
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

impl StorageGateway for RecordingGateway {
    fn fetch_one(&self, query: &str, params: &[Value]) -> Result<Option<Row>, StoreError> {
        self.record(Call::FetchOne {
            query: query.to_string(),
            params: params.to_vec(),
        });
        Ok(self.next_rows().into_iter().next())
    }

    fn fetch_all(&self, query: &str, params: &[Value]) -> Result<Vec<Row>, StoreError> {
        self.record(Call::FetchAll {
            query: query.to_string(),
            params: params.to_vec(),
        });
        Ok(self.next_rows())
    }

    fn insert(&self, table: &str, values: &Columns<'_>) -> Result<usize, StoreError> {
        self.record(Call::Insert {
            table: table.to_string(),
            values: owned(values),
        });
        self.write_result()
    }

    fn update(
        &self,
        table: &str,
        values: &Columns<'_>,
        matching: &Columns<'_>,
    ) -> Result<usize, StoreError> {
        self.record(Call::Update {
            table: table.to_string(),
            values: owned(values),
            matching: owned(matching),
        });
        self.write_result()
    }

    fn delete(&self, table: &str, matching: &Columns<'_>) -> Result<usize, StoreError> {
        self.record(Call::Delete {
            table: table.to_string(),
            matching: owned(matching),
        });
        self.write_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_drain_queue_in_order() {
        let gw = RecordingGateway::new();
        gw.push_rows(vec![Row::new(vec![("a".into(), Value::Integer(1))])]);

        let first = gw.fetch_one("SELECT a", &[]).unwrap();
        assert!(first.is_some());
        let second = gw.fetch_all("SELECT a", &[]).unwrap();
        assert!(second.is_empty());
        assert_eq!(gw.call_count(), 2);
    }

    #[test]
    fn records_writes() {
        let gw = RecordingGateway::new();
        gw.delete("t", &[("k", Value::Integer(3))]).unwrap();
        assert_eq!(
            gw.calls(),
            vec![Call::Delete {
                table: "t".into(),
                matching: vec![("k".into(), Value::Integer(3))],
            }]
        );
        gw.clear();
        assert_eq!(gw.call_count(), 0);
    }

    #[test]
    fn failing_writes_are_recorded() {
        let gw = RecordingGateway::new();
        gw.fail_writes();
        let result = gw.update("t", &[("q", Value::Integer(1))], &[("k", Value::Integer(1))]);
        assert!(matches!(result, Err(StoreError::Sqlite(_))));
        assert_eq!(gw.call_count(), 1);
    }
}
