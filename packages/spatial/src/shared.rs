//! Two-phase lifecycle holder for a loaded [`TractIndex`].
//!
//! Loading a boundary dataset is a one-time startup cost; queries must not
//! run until it completes. [`IndexCell`] makes that lifecycle explicit: a
//! process installs the index once, and every query path goes through
//! [`IndexCell::get`], which fails with [`SpatialError::IndexNotReady`]
//! until installation has happened. After installation the index is
//! immutable and the cell hands out shared references to any number of
//! concurrent readers.

use std::sync::OnceLock;

use crate::{SpatialError, TractIndex};

/// Write-once holder for the process-wide tract index.
pub struct IndexCell {
    cell: OnceLock<TractIndex>,
}

impl IndexCell {
    /// Creates an empty cell. Queries fail until [`install`](Self::install)
    /// is called.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Installs the loaded index. The first installation wins; a repeat
    /// installation is ignored with a warning.
    pub fn install(&self, index: TractIndex) {
        if self.cell.set(index).is_err() {
            log::warn!("Tract index already installed; keeping the existing one");
        }
    }

    /// Returns the installed index.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::IndexNotReady`] if no index has been
    /// installed yet.
    pub fn get(&self) -> Result<&TractIndex, SpatialError> {
        self.cell.get().ok_or(SpatialError::IndexNotReady)
    }
}

impl Default for IndexCell {
    fn default() -> Self {
        Self::new()
    }
}
