//! Storage layer for SpendLens
//!
//! JSON file storage with atomic writes and automatic directory creation.

pub mod expenses;
pub mod file_io;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};

use crate::config::paths::SpendPaths;
use crate::error::SpendError;

/// Storage coordinator that owns the repositories
pub struct Storage {
    paths: SpendPaths,
    pub expenses: ExpenseRepository,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: SpendPaths) -> Result<Self, SpendError> {
        paths.ensure_directories()?;

        Ok(Self {
            expenses: ExpenseRepository::new(paths.expenses_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &SpendPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), SpendError> {
        self.expenses.load()
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), SpendError> {
        self.expenses.save()
    }

    /// Create the data file if it does not exist yet
    pub fn initialize(&self) -> Result<bool, SpendError> {
        if self.paths.expenses_file().exists() {
            return Ok(false);
        }
        self.expenses.save()?;
        Ok(true)
    }
}
