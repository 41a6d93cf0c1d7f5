//! Error types for inventory_ledger

use thiserror::Error;

/// The entity a ledger lookup failed to resolve
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Missing {
    #[error("City '{0}' not found.")]
    City(String),
    /// Store absent, or present but registered under another city
    #[error("Store {store_id} not found in city '{city}'.")]
    StoreInCity { store_id: i64, city: String },
    #[error("Store {0} not found.")]
    Store(i64),
    #[error("Vendor '{0}' not found.")]
    Vendor(String),
    #[error("Product '{name}' ({size}) not found.")]
    Product { name: String, size: String },
    #[error("ProductId {0} not found.")]
    ProductId(i64),
    #[error("Invoice not found for the given store, vendor, and date.")]
    Invoice,
    #[error("No matching invoice line found for that product on the invoice.")]
    InvoiceLine,
}

/// Which price history a missing-price failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Purchase,
    Sale,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::Purchase => write!(f, "purchase"),
            PriceSource::Sale => write!(f, "sale"),
        }
    }
}

/// Unified error type for ledger operations
///
/// Every variant renders a message meant to be shown to the caller as-is.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ProductId {0} already exists. Please use a new ProductId.")]
    DuplicateProduct(i64),

    #[error(transparent)]
    NotFound(#[from] Missing),

    #[error("No previous {kind} price for '{product_name}'.")]
    NoPriorPrice {
        kind: PriceSource,
        product_name: String,
    },

    #[error("Not enough stock. Available: {available}, Requested: {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("Cannot delete ProductId {product_id}: referenced by invoices={invoice_lines}, sales={sales}.")]
    ReferentialConflict {
        product_id: i64,
        invoice_lines: i64,
        sales: i64,
    },

    #[error("Store {store_id} already belongs to another city than '{city}'.")]
    StoreCityConflict { store_id: i64, city: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Stable machine-readable tag for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::DuplicateProduct(_) => "duplicate_product",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::NoPriorPrice { .. } => "no_prior_price",
            LedgerError::InsufficientStock { .. } => "insufficient_stock",
            LedgerError::ReferentialConflict { .. } => "referential_conflict",
            LedgerError::StoreCityConflict { .. } => "store_city_conflict",
            LedgerError::Database(_) => "database",
            LedgerError::Io(_) => "io",
        }
    }

    /// True for rejections caused by caller input rather than infrastructure
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LedgerError::Database(_) | LedgerError::Io(_))
    }
}

/// Result alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
