//! Result records returned by ledger operations
//!
//! Field names serialize in the same PascalCase spelling as the table columns
//! they come from, so JSON output lines up with the schema.

use serde::Serialize;

/// Round a monetary amount to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One invoice line joined with its invoice, vendor, product, store and city
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseRecord {
    pub city_name: String,
    pub store_id: i64,
    pub vendor_name: String,
    pub product_name: String,
    pub size: String,
    pub invoice_date: String,
    pub purchase_price: f64,
    pub quantity: i64,
    pub line_total: f64,
}

/// One sale row joined with its store, city and product
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SaleRecord {
    pub city_name: String,
    pub store_id: i64,
    pub product_name: String,
    pub size: String,
    pub sale_date: String,
    pub quantity: i64,
    pub sale_price: f64,
    pub total_amount: f64,
}

/// Remaining stock of a product at one store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StockLevel {
    pub product_name: String,
    pub size: String,
    pub remaining_stock: i64,
}

/// Result of [`crate::Ledger::record_sale`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleOutcome {
    pub sale_record: SaleRecord,
    /// `None` when the store holds no invoice lines for the product at all
    pub inventory_after_sale: Option<StockLevel>,
}

/// Stock of a product at one location
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationStock {
    pub store: i64,
    pub city: String,
    pub product: String,
    pub size: String,
    pub quantity: i64,
}

/// Snapshot of an invoice line taken just before it was deleted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedLine {
    pub city: String,
    pub store_id: i64,
    pub vendor_name: String,
    pub product_name: String,
    pub size: String,
    pub invoice_date: String,
    pub quantity_removed: i64,
    pub purchase_price: Option<f64>,
    pub line_total: Option<f64>,
}

/// Result of [`crate::Ledger::delete_purchase_line`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineDeletion {
    pub deleted_line: DeletedLine,
    /// The parent invoice had no lines left and was removed too
    pub invoice_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedProduct {
    pub product_id: i64,
    pub product_name: String,
    pub size: String,
}

/// Result of [`crate::Ledger::delete_product_safe`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDeletion {
    pub deleted_product: DeletedProduct,
}

/// A store together with the city it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoreRecord {
    pub city_id: i64,
    pub city_name: String,
    pub store_id: i64,
}
