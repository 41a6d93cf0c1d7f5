//! Inventory Ledger - store purchases, sales and stock in SQLite
//!
//! Records purchases and sales for a chain of stores, deducts sold units from
//! the oldest stock first and keeps invoices, products and vendors consistent
//! when rows are deleted.

pub mod config;
pub mod database;
pub mod error;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod web;

pub use config::LedgerConfig;
pub use error::{LedgerError, Missing, PriceSource, Result};
pub use ledger::{Ledger, NewPurchase, PurchaseLineKey, Restock, SaleRequest};
pub use reports::Dashboard;
