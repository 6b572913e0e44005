//! Append-only line writer.
//!
//! The file is opened, written, flushed and closed inside one call; nothing is
//! buffered between calls.

use std::sync::Arc;

use eventlog_core::{LogError, LogFileHandle};

use crate::store::FileStore;

/// Appends formatted lines to the file named by a [`LogFileHandle`].
#[derive(Clone)]
pub struct LogWriter {
    store: Arc<dyn FileStore>,
}

impl LogWriter {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Append `line` to `handle`'s file and refresh `handle.size_bytes`.
    ///
    /// On error `handle` is left untouched.
    pub fn append(&self, handle: &mut LogFileHandle, line: &str) -> Result<(), LogError> {
        self.store.ensure_dir(&handle.directory)?;
        let len = self.store.append(&handle.path(), line.as_bytes())?;
        handle.size_bytes = len;
        Ok(())
    }
}

impl std::fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogWriter").finish_non_exhaustive()
    }
}
