//! Query session for daxtab.
//!
//! Owns a single driver connection, sends DAX text to the engine, and
//! materializes decoded, optionally tidied, result tables.

use crate::config::ConnectionDescriptor;
use crate::decode::decode_field;
use crate::driver::{DriverConnection, TabularDriver};
use crate::error::Result;
use crate::table::{ResultTable, Row};
use crate::tidy::{tidy_column_name, TidyFn};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Options controlling session behavior.
pub struct SessionOptions {
    /// Whether to sanitize column names on query results.
    pub tidy_column_names: bool,

    /// An alternative column-name mapping function. When unset, the default
    /// rule from [`crate::tidy`] applies.
    pub tidy_map: Option<TidyFn>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            tidy_column_names: true,
            tidy_map: None,
        }
    }
}

/// A session against a tabular engine.
///
/// Owns at most one driver connection. Connects lazily on the first query, or
/// eagerly via [`Session::open`]. Single-threaded and blocking: callers
/// sharing a session across logical tasks must serialize access themselves.
/// The connection is released on [`Session::close`] or on drop, whichever
/// comes first.
pub struct Session {
    connection_string: String,
    driver: Box<dyn TabularDriver>,
    connection: Option<Box<dyn DriverConnection>>,
    options: SessionOptions,
}

impl Session {
    /// Creates a session with default options.
    ///
    /// The descriptor is resolved immediately, so missing required settings
    /// surface here rather than at first use.
    pub fn new(
        descriptor: impl Into<ConnectionDescriptor>,
        driver: Box<dyn TabularDriver>,
    ) -> Result<Self> {
        Self::with_options(descriptor, driver, SessionOptions::default())
    }

    /// Creates a session with the given options.
    pub fn with_options(
        descriptor: impl Into<ConnectionDescriptor>,
        driver: Box<dyn TabularDriver>,
        options: SessionOptions,
    ) -> Result<Self> {
        let connection_string = descriptor.into().connection_string()?;
        Ok(Self {
            connection_string,
            driver,
            connection: None,
            options,
        })
    }

    /// Returns true if the underlying connection is open.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens the connection eagerly. No-op when already open.
    pub fn open(&mut self) -> Result<()> {
        self.ensure_open()
    }

    /// Opens the connection if it is not already open.
    ///
    /// Single entry point for both the eager and the lazy connect path.
    fn ensure_open(&mut self) -> Result<()> {
        if self.connection.is_none() {
            debug!("Opening connection to tabular engine");
            self.connection = Some(self.driver.open(&self.connection_string)?);
        }
        Ok(())
    }

    /// Executes a DAX query and returns the decoded result table.
    ///
    /// Connects lazily if needed, sends the query text verbatim, decodes
    /// every field, then sanitizes column names if enabled. A decode failure
    /// partway through fails the whole query; no partial table is returned.
    pub fn query(&mut self, dax: &str) -> Result<ResultTable> {
        self.ensure_open()?;
        let connection = self
            .connection
            .as_mut()
            .expect("connection present after ensure_open");

        debug!(query_len = dax.len(), "Executing DAX query");
        let raw = connection.execute(dax)?;

        let mut rows: Vec<Row> = Vec::with_capacity(raw.rows.len());
        for raw_row in raw.rows {
            let row: Row = raw_row
                .into_iter()
                .map(decode_field)
                .collect::<Result<_>>()?;
            rows.push(row);
        }

        let columns = if self.options.tidy_column_names {
            self.tidy_columns(raw.columns)
        } else {
            raw.columns
        };

        debug!(
            rows = rows.len(),
            columns = columns.len(),
            "Query decoded"
        );
        Ok(ResultTable::with_data(columns, rows))
    }

    /// Applies the sanitization rule to every column label, keeping order.
    ///
    /// Collisions are kept as-is for source compatibility; a warning names
    /// each duplicate so key-based consumers are not silently surprised.
    fn tidy_columns(&self, columns: Vec<String>) -> Vec<String> {
        let tidied: Vec<String> = match &self.options.tidy_map {
            Some(map_fn) => columns.iter().map(|c| map_fn(c)).collect(),
            None => columns.iter().map(|c| tidy_column_name(c)).collect(),
        };

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for name in &tidied {
            *seen.entry(name.as_str()).or_insert(0) += 1;
        }
        for (name, count) in seen {
            if count > 1 {
                warn!(
                    column = name,
                    occurrences = count,
                    "Sanitized column names collide"
                );
            }
        }

        tidied
    }

    /// Releases the underlying connection. Safe to call when not open, and
    /// safe to call more than once; only the first call releases the handle.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut connection) = self.connection.take() {
            debug!("Closing connection to tabular engine");
            connection.close()?;
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close connection on drop: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionSettings;
    use crate::driver::{FailAt, FailingDriver, MockDriver, RawField, RawResultSet};
    use crate::error::DaxError;
    use crate::table::Value;
    use std::sync::atomic::Ordering;

    fn settings() -> ConnectionSettings {
        ConnectionSettings::new("Model", "localhost")
    }

    #[test]
    fn test_constructor_rejects_incomplete_settings() {
        let result = Session::new(
            ConnectionSettings::default(),
            Box::new(MockDriver::new()),
        );
        assert!(matches!(result, Err(DaxError::Config(_))));
    }

    #[test]
    fn test_lazy_connect_on_query() {
        let driver = MockDriver::new();
        let opens = driver.open_count();

        let mut session = Session::new(settings(), Box::new(driver)).unwrap();
        assert!(!session.is_open());
        assert_eq!(opens.load(Ordering::SeqCst), 0);

        session.query("EVALUATE T").unwrap();
        assert!(session.is_open());
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_open_is_idempotent() {
        let driver = MockDriver::new();
        let opens = driver.open_count();

        let mut session = Session::new(settings(), Box::new(driver)).unwrap();
        session.open().unwrap();
        session.open().unwrap();
        session.query("EVALUATE T").unwrap();

        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_query_text_sent_verbatim() {
        let driver = MockDriver::new();
        let executed = driver.executed_queries();

        let mut session = Session::new(settings(), Box::new(driver)).unwrap();
        session.query("EVALUATE 'Sales'  -- trailing  ").unwrap();

        assert_eq!(
            executed.lock().unwrap().as_slice(),
            ["EVALUATE 'Sales'  -- trailing  "]
        );
    }

    #[test]
    fn test_close_releases_exactly_once() {
        let driver = MockDriver::new();
        let closes = driver.close_count();

        let mut session = Session::new(settings(), Box::new(driver)).unwrap();
        session.open().unwrap();
        session.close().unwrap();
        session.close().unwrap();
        assert!(!session.is_open());
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        drop(session);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_when_never_opened_is_noop() {
        let driver = MockDriver::new();
        let closes = driver.close_count();

        let mut session = Session::new(settings(), Box::new(driver)).unwrap();
        session.close().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_closes_open_connection() {
        let driver = MockDriver::new();
        let closes = driver.close_count();

        {
            let mut session = Session::new(settings(), Box::new(driver)).unwrap();
            session.open().unwrap();
        }

        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_driver_open_failure_propagates() {
        let driver = FailingDriver::new(FailAt::Open, "server unreachable");
        let mut session = Session::new(settings(), Box::new(driver)).unwrap();

        let result = session.query("EVALUATE T");
        assert!(matches!(result, Err(DaxError::Driver(_))));
        assert!(!session.is_open());
    }

    #[test]
    fn test_driver_execute_failure_propagates() {
        let driver = FailingDriver::new(FailAt::Execute, "query aborted");
        let mut session = Session::new(settings(), Box::new(driver)).unwrap();

        let result = session.query("EVALUATE T");
        assert!(matches!(result, Err(DaxError::Driver(_))));
    }

    #[test]
    fn test_zero_row_result_keeps_columns() {
        let driver = MockDriver::with_result(RawResultSet::new(
            vec!["[Sales Amount]".to_string(), "[Key]".to_string()],
            vec![],
        ));
        let mut session = Session::new(settings(), Box::new(driver)).unwrap();

        let table = session.query("EVALUATE T").unwrap();
        assert_eq!(table.columns, ["Sales_Amount", "Key"]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_tidy_disabled_keeps_raw_names() {
        let driver = MockDriver::with_result(RawResultSet::new(
            vec!["[Sales Amount]".to_string()],
            vec![],
        ));
        let options = SessionOptions {
            tidy_column_names: false,
            tidy_map: None,
        };
        let mut session = Session::with_options(settings(), Box::new(driver), options).unwrap();

        let table = session.query("EVALUATE T").unwrap();
        assert_eq!(table.columns, ["[Sales Amount]"]);
    }

    #[test]
    fn test_custom_tidy_map() {
        let driver = MockDriver::with_result(RawResultSet::new(
            vec!["[Sales Amount]".to_string()],
            vec![],
        ));
        let options = SessionOptions {
            tidy_column_names: true,
            tidy_map: Some(Box::new(|c: &str| c.to_lowercase())),
        };
        let mut session = Session::with_options(settings(), Box::new(driver), options).unwrap();

        let table = session.query("EVALUATE T").unwrap();
        assert_eq!(table.columns, ["[sales amount]"]);
    }

    #[test]
    fn test_colliding_sanitized_names_are_kept() {
        let driver = MockDriver::with_result(RawResultSet::new(
            vec!["[Key]".to_string(), "Key".to_string()],
            vec![],
        ));
        let mut session = Session::new(settings(), Box::new(driver)).unwrap();

        let table = session.query("EVALUATE T").unwrap();
        assert_eq!(table.columns, ["Key", "Key"]);
    }

    #[test]
    fn test_unsupported_type_fails_whole_query() {
        let driver = MockDriver::with_result(RawResultSet::new(
            vec!["a".to_string()],
            vec![
                vec![RawField::Int(1)],
                vec![RawField::Other {
                    type_name: "System.Guid".to_string(),
                }],
            ],
        ));
        let mut session = Session::new(settings(), Box::new(driver)).unwrap();

        let result = session.query("EVALUATE T");
        assert!(matches!(result, Err(DaxError::UnsupportedType(_))));
    }

    #[test]
    fn test_decoded_rows_per_type() {
        let driver = MockDriver::with_result(RawResultSet::new(
            vec!["Sales[Amount]".to_string(), "Sales[Region]".to_string()],
            vec![
                vec![
                    RawField::Decimal("10.5".to_string()),
                    RawField::Text("West".to_string()),
                ],
                vec![RawField::Null, RawField::Text("East".to_string())],
                vec![RawField::Float(3.0), RawField::Null],
            ],
        ));
        let mut session = Session::new(settings(), Box::new(driver)).unwrap();

        let table = session.query("EVALUATE Sales").unwrap();
        assert_eq!(table.columns, ["Sales_Amount", "Sales_Region"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[0][0], Value::Float(10.5));
        assert_eq!(table.rows[1][0], Value::Null);
        assert_eq!(table.rows[2][1], Value::Null);
    }
}
