//! daxtab - a lightweight DAX query client for OLAP tabular engines.
//!
//! A [`Session`] resolves a connection descriptor into an MSOLAP connection
//! string, opens a driver connection lazily or eagerly, sends DAX text to the
//! engine, and materializes the decoded result as a [`ResultTable`]. Driver
//! backends plug in through the [`driver::TabularDriver`] trait.
//!
//! ```
//! use daxtab::driver::{MockDriver, RawField, RawResultSet};
//! use daxtab::{ConnectionSettings, Session};
//!
//! let driver = MockDriver::with_result(RawResultSet::new(
//!     vec!["Sales[Sales Amount]".to_string()],
//!     vec![vec![RawField::Decimal("199.99".to_string())]],
//! ));
//!
//! let settings = ConnectionSettings::new("AdventureWorks", "localhost\\tabular");
//! let mut session = Session::new(settings, Box::new(driver)).unwrap();
//!
//! let table = session.query("EVALUATE Sales").unwrap();
//! assert_eq!(table.columns, ["Sales_Sales_Amount"]);
//! session.close().unwrap();
//! ```

pub mod config;
pub mod decode;
pub mod driver;
pub mod error;
pub mod logging;
pub mod session;
pub mod table;
pub mod tidy;

pub use config::{Config, ConnectionDescriptor, ConnectionSettings};
pub use error::{DaxError, Result};
pub use session::{Session, SessionOptions};
pub use table::{ResultTable, Row, Value};
