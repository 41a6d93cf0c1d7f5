//! Ledger configuration
//!
//! The database location is the only process-wide setting the ledger needs.
//! It is carried as a value and handed to [`crate::Ledger::new`].

use std::path::{Path, PathBuf};

/// Environment variable naming the SQLite database file
pub const DB_PATH_ENV: &str = "DB_PATH";

/// File name used when no path is configured
pub const DEFAULT_DB_FILE: &str = "inventory.db";

/// Remaining-stock level below which a product shows up as low stock
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Connection and reporting settings for a [`crate::Ledger`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub db_path: PathBuf,
    pub low_stock_threshold: i64,
}

impl LedgerConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Reads `DB_PATH`, falling back to `inventory.db` in the working directory
    pub fn from_env() -> Self {
        let path = std::env::var_os(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE));
        Self::new(path)
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Returns the default database path: ~/.local/share/inventory_ledger/inventory.db
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inventory_ledger")
        .join(DEFAULT_DB_FILE)
}
