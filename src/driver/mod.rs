//! Driver abstraction layer for daxtab.
//!
//! Provides a trait-based seam between the query session and the external
//! tabular engine, allowing different driver backends (OLE DB bridges, XMLA
//! clients, test doubles) to be used interchangeably.

mod mock;

pub use mock::{FailAt, FailingDriver, MockDriver};

use crate::error::Result;

/// A raw field value as reported by the driver, before decoding.
///
/// The driver adapter is responsible for mapping its native type codes onto
/// these tags; the core never inspects driver-native types. `Decimal` and
/// `DateTime` carry the engine's string rendering of the value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawField {
    /// The engine's null marker (DBNull).
    Null,

    /// Integer value.
    Int(i64),

    /// Fixed-point decimal, as rendered by the driver.
    Decimal(String),

    /// Floating-point value.
    Float(f64),

    /// String value.
    Text(String),

    /// Date/time value, as rendered by the driver.
    DateTime(String),

    /// Boolean value.
    Bool(bool),

    /// A runtime type outside the known set; carries the driver's type name.
    Other { type_name: String },
}

/// The raw result of executing a query: the schema's column names plus every
/// row's fields, positionally aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResultSet {
    /// Column names, in schema order.
    pub columns: Vec<String>,

    /// Rows of raw fields, aligned to `columns`.
    pub rows: Vec<Vec<RawField>>,
}

impl RawResultSet {
    /// Creates a raw result set with the given columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawField>>) -> Self {
        Self { columns, rows }
    }
}

/// Trait defining the interface for driver backends.
///
/// Implementations own any per-process driver initialization; the session
/// never performs global registration side effects. All calls are blocking.
pub trait TabularDriver {
    /// Opens a connection to the engine using the given connection string.
    fn open(&self, conn_str: &str) -> Result<Box<dyn DriverConnection>>;
}

/// An open connection to the tabular engine.
pub trait DriverConnection {
    /// Sends the DAX text verbatim to the engine and reads back the schema
    /// and every row.
    fn execute(&mut self, dax: &str) -> Result<RawResultSet>;

    /// Releases the underlying handle.
    fn close(&mut self) -> Result<()>;
}
