//! Mock driver backends for testing.
//!
//! Provides in-memory driver implementations so sessions can be exercised
//! without a real tabular engine.

use super::{DriverConnection, RawResultSet, TabularDriver};
use crate::error::{DaxError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mock driver that returns a predefined result set for every query.
///
/// Open/close counts and executed query texts are observable through shared
/// handles, so tests can assert on session behavior after handing the driver
/// over.
pub struct MockDriver {
    result: RawResultSet,
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MockDriver {
    /// Creates a mock driver returning an empty result set.
    pub fn new() -> Self {
        Self::with_result(RawResultSet::default())
    }

    /// Creates a mock driver returning the given result set for every query.
    pub fn with_result(result: RawResultSet) -> Self {
        Self {
            result,
            opens: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle counting how many connections were opened.
    pub fn open_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.opens)
    }

    /// Returns a handle counting how many connections were closed.
    pub fn close_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    /// Returns a handle to the query texts executed so far.
    pub fn executed_queries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.executed)
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularDriver for MockDriver {
    fn open(&self, _conn_str: &str) -> Result<Box<dyn DriverConnection>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            result: self.result.clone(),
            closes: Arc::clone(&self.closes),
            executed: Arc::clone(&self.executed),
        }))
    }
}

struct MockConnection {
    result: RawResultSet,
    closes: Arc<AtomicUsize>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl DriverConnection for MockConnection {
    fn execute(&mut self, dax: &str) -> Result<RawResultSet> {
        self.executed
            .lock()
            .expect("executed-queries lock poisoned")
            .push(dax.to_string());
        Ok(self.result.clone())
    }

    fn close(&mut self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Where a [`FailingDriver`] injects its failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// Fail when opening the connection.
    Open,
    /// Open successfully, fail when executing a query.
    Execute,
}

/// A driver whose operations fail with a driver error, for error-path tests.
pub struct FailingDriver {
    fail_at: FailAt,
    message: String,
}

impl FailingDriver {
    /// Creates a failing driver with the given failure point and message.
    pub fn new(fail_at: FailAt, message: impl Into<String>) -> Self {
        Self {
            fail_at,
            message: message.into(),
        }
    }
}

impl TabularDriver for FailingDriver {
    fn open(&self, _conn_str: &str) -> Result<Box<dyn DriverConnection>> {
        match self.fail_at {
            FailAt::Open => Err(DaxError::driver(self.message.clone())),
            FailAt::Execute => Ok(Box::new(FailingConnection {
                message: self.message.clone(),
            })),
        }
    }
}

struct FailingConnection {
    message: String,
}

impl DriverConnection for FailingConnection {
    fn execute(&mut self, _dax: &str) -> Result<RawResultSet> {
        Err(DaxError::driver(self.message.clone()))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
