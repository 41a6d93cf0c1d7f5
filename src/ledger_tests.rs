//! Tests for the inventory ledger
//!
//! Every operation opens its own connection, so these run against an on-disk
//! database in a temporary directory.

use super::*;
use rusqlite::params;
use tempfile::TempDir;

fn test_ledger() -> (Ledger, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let ledger = Ledger::new(LedgerConfig::new(temp_dir.path().join("test.db")));
    ledger.init().unwrap();
    ledger.register_store("Hardersfield", 1).unwrap();
    ledger.register_store("Hardersfield", 2).unwrap();
    ledger.register_store("Eanverness", 7).unwrap();
    (ledger, temp_dir)
}

fn purchase(product_id: i64, name: &str, date: &str, price: f64, quantity: i64) -> NewPurchase {
    NewPurchase {
        store_id: 1,
        product_id,
        product_name: name.to_string(),
        size: "750mL".to_string(),
        vendor_number: 100,
        vendor_name: "Diageo".to_string(),
        invoice_date: date.to_string(),
        purchase_price: price,
        quantity,
    }
}

fn restock(name: &str, vendor: &str, date: &str, quantity: i64) -> Restock {
    Restock {
        city: "Hardersfield".to_string(),
        store_id: 1,
        vendor_name: vendor.to_string(),
        product_name: name.to_string(),
        size: "750mL".to_string(),
        invoice_date: date.to_string(),
        quantity,
    }
}

fn sale(name: &str, date: &str, quantity: i64, price: Option<f64>) -> SaleRequest {
    SaleRequest {
        city: "Hardersfield".to_string(),
        store_id: 1,
        product_name: name.to_string(),
        size: "750mL".to_string(),
        sale_date: date.to_string(),
        quantity,
        sale_price: price,
    }
}

fn line_key(name: &str, date: &str) -> PurchaseLineKey {
    PurchaseLineKey {
        city: "Hardersfield".to_string(),
        store_id: 1,
        vendor_name: "Diageo".to_string(),
        product_name: name.to_string(),
        size: "750mL".to_string(),
        invoice_date: date.to_string(),
    }
}

fn count_rows(ledger: &Ledger, table: &str) -> i64 {
    let conn = ledger.connect().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn line_quantities(ledger: &Ledger, product_id: i64) -> Vec<i64> {
    let conn = ledger.connect().unwrap();
    let mut stmt = conn
        .prepare("SELECT Quantity FROM InvoiceLines WHERE ProductId = ?1 ORDER BY InvoiceLineId")
        .unwrap();
    let quantities = stmt
        .query_map(params![product_id], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<i64>>>()
        .unwrap();
    quantities
}

// ── plan_fifo_deduction ────────────────────────────────────────────────────

#[test]
fn fifo_plan_drains_oldest_first() {
    let plan = plan_fifo_deduction(&[(1, 5), (2, 3), (3, 10)], 7);
    assert_eq!(plan, vec![(1, 0), (2, 1)]);
}

#[test]
fn fifo_plan_exact_match_zeroes_lines() {
    let plan = plan_fifo_deduction(&[(1, 5), (2, 3)], 8);
    assert_eq!(plan, vec![(1, 0), (2, 0)]);
}

#[test]
fn fifo_plan_skips_depleted_lines() {
    let plan = plan_fifo_deduction(&[(1, 0), (2, 4)], 2);
    assert_eq!(plan, vec![(2, 2)]);
}

#[test]
fn fifo_plan_zero_quantity_touches_nothing() {
    assert!(plan_fifo_deduction(&[(1, 5)], 0).is_empty());
}

// ── register_store ─────────────────────────────────────────────────────────

#[test]
fn register_store_is_idempotent_in_same_city() {
    let (ledger, _dir) = test_ledger();
    let record = ledger.register_store("Hardersfield", 1).unwrap();
    assert_eq!(record.store_id, 1);
    assert_eq!(count_rows(&ledger, "Stores"), 3);
    assert_eq!(count_rows(&ledger, "Cities"), 2);
}

#[test]
fn register_store_refuses_to_move_store() {
    let (ledger, _dir) = test_ledger();
    let err = ledger.register_store("Eanverness", 1).unwrap_err();
    assert!(matches!(err, LedgerError::StoreCityConflict { store_id: 1, .. }));
}

// ── record_purchase ────────────────────────────────────────────────────────

#[test]
fn purchase_creates_product_vendor_invoice_and_line() {
    let (ledger, _dir) = test_ledger();

    let record = ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 3.333, 3))
        .unwrap();

    assert_eq!(record.city_name, "Hardersfield");
    assert_eq!(record.store_id, 1);
    assert_eq!(record.vendor_name, "Diageo");
    assert_eq!(record.product_name, "Gin");
    assert_eq!(record.invoice_date, "2024-01-01");
    assert_eq!(record.purchase_price, 3.33);
    assert_eq!(record.quantity, 3);
    assert_eq!(record.line_total, 10.0);

    assert_eq!(count_rows(&ledger, "Products"), 1);
    assert_eq!(count_rows(&ledger, "Vendors"), 1);
    assert_eq!(count_rows(&ledger, "Invoices"), 1);
    assert_eq!(count_rows(&ledger, "InvoiceLines"), 1);
}

#[test]
fn purchase_stores_vendor_number_as_brand() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 1.0, 1))
        .unwrap();

    let conn = ledger.connect().unwrap();
    let brand: i64 = conn
        .query_row("SELECT Brand FROM Products WHERE ProductId = 10", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(brand, 100);
}

#[test]
fn purchase_always_opens_a_new_invoice() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 1.0, 1))
        .unwrap();
    ledger
        .record_purchase(&purchase(11, "Rum", "2024-01-01", 1.0, 1))
        .unwrap();

    assert_eq!(count_rows(&ledger, "Invoices"), 2);
    assert_eq!(count_rows(&ledger, "Vendors"), 1);
}

#[test]
fn duplicate_product_is_rejected_without_changes() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 1.0, 1))
        .unwrap();

    let mut again = purchase(10, "Vodka", "2024-02-01", 2.0, 5);
    again.vendor_number = 200;
    again.vendor_name = "Bacardi".to_string();
    let err = ledger.record_purchase(&again).unwrap_err();

    assert!(matches!(err, LedgerError::DuplicateProduct(10)));
    assert_eq!(
        err.to_string(),
        "ProductId 10 already exists. Please use a new ProductId."
    );
    assert_eq!(count_rows(&ledger, "Products"), 1);
    assert_eq!(count_rows(&ledger, "Vendors"), 1);
    assert_eq!(count_rows(&ledger, "Invoices"), 1);
    assert_eq!(count_rows(&ledger, "InvoiceLines"), 1);
}

#[test]
fn purchase_for_unknown_store_is_rejected() {
    let (ledger, _dir) = test_ledger();
    let mut p = purchase(10, "Gin", "2024-01-01", 1.0, 1);
    p.store_id = 99;

    let err = ledger.record_purchase(&p).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(Missing::Store(99))));
    assert_eq!(count_rows(&ledger, "Products"), 0);
    assert_eq!(count_rows(&ledger, "Vendors"), 0);
}

// ── record_restock ─────────────────────────────────────────────────────────

#[test]
fn restock_same_day_increments_existing_line() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();

    let record = ledger
        .record_restock(&restock("Gin", "Diageo", "2024-01-01", 4))
        .unwrap();

    assert_eq!(record.quantity, 9);
    assert_eq!(record.purchase_price, 2.0);
    assert_eq!(record.line_total, 18.0);
    assert_eq!(count_rows(&ledger, "Invoices"), 1);
    assert_eq!(count_rows(&ledger, "InvoiceLines"), 1);
}

#[test]
fn restock_is_visible_in_inventory_read() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();
    ledger
        .record_restock(&restock("Gin", "Diageo", "2024-01-08", 4))
        .unwrap();

    let rows = ledger.read_inventory_across_locations("Gin").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].store, 1);
    assert_eq!(rows[0].city, "Hardersfield");
    assert_eq!(rows[0].quantity, 9);
}

#[test]
fn restock_new_date_creates_invoice_and_vendor() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();

    let record = ledger
        .record_restock(&restock("Gin", "Bacardi", "2024-01-09", 3))
        .unwrap();

    assert_eq!(record.vendor_name, "Bacardi");
    assert_eq!(record.quantity, 3);
    assert_eq!(record.purchase_price, 2.0);
    assert_eq!(count_rows(&ledger, "Vendors"), 2);
    assert_eq!(count_rows(&ledger, "Invoices"), 2);

    // Same vendor and date again reuses that invoice
    ledger
        .record_restock(&restock("Gin", "Bacardi", "2024-01-09", 1))
        .unwrap();
    assert_eq!(count_rows(&ledger, "Invoices"), 2);
    assert_eq!(line_quantities(&ledger, 10), vec![5, 4]);
}

#[test]
fn restock_overwrites_price_with_latest_line() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();
    ledger
        .record_restock(&restock("Gin", "Bacardi", "2024-01-09", 1))
        .unwrap();
    {
        let conn = ledger.connect().unwrap();
        conn.execute(
            "UPDATE InvoiceLines SET PurchasePrice = 3.0 WHERE InvoiceLineId =
             (SELECT MAX(InvoiceLineId) FROM InvoiceLines)",
            [],
        )
        .unwrap();
    }

    let record = ledger
        .record_restock(&restock("Gin", "Diageo", "2024-01-01", 1))
        .unwrap();

    // No averaging: all six units are now priced at the latest price
    assert_eq!(record.quantity, 6);
    assert_eq!(record.purchase_price, 3.0);
    assert_eq!(record.line_total, 18.0);
}

#[test]
fn restock_resolution_failures() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();

    let mut r = restock("Gin", "Diageo", "2024-01-02", 1);
    r.city = "Atlantis".to_string();
    let err = ledger.record_restock(&r).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(Missing::City(_))));

    let mut r = restock("Gin", "Diageo", "2024-01-02", 1);
    r.store_id = 7;
    let err = ledger.record_restock(&r).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound(Missing::StoreInCity { store_id: 7, .. })
    ));

    let mut r = restock("Gin", "Diageo", "2024-01-02", 1);
    r.size = "50mL".to_string();
    let err = ledger.record_restock(&r).unwrap_err();
    assert_eq!(err.to_string(), "Product 'Gin' (50mL) not found.");
}

#[test]
fn restock_without_prior_price_rolls_back() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();
    ledger
        .delete_purchase_line(&line_key("Gin", "2024-01-01"))
        .unwrap();

    let err = ledger
        .record_restock(&restock("Gin", "Bacardi", "2024-01-05", 1))
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::NoPriorPrice {
            kind: PriceSource::Purchase,
            ..
        }
    ));
    // The vendor and invoice created on the way were not committed
    assert_eq!(count_rows(&ledger, "Vendors"), 1);
    assert_eq!(count_rows(&ledger, "Invoices"), 0);
}

// ── record_sale ────────────────────────────────────────────────────────────

/// Product 10 with lines of 5, 3 and 10 units, oldest first
fn ledger_with_three_lines() -> (Ledger, TempDir) {
    let (ledger, dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();
    ledger
        .record_restock(&restock("Gin", "Diageo", "2024-01-02", 3))
        .unwrap();
    ledger
        .record_restock(&restock("Gin", "Diageo", "2024-01-03", 10))
        .unwrap();
    assert_eq!(line_quantities(&ledger, 10), vec![5, 3, 10]);
    (ledger, dir)
}

#[test]
fn sale_deducts_fifo_and_keeps_depleted_lines() {
    let (ledger, _dir) = ledger_with_three_lines();

    let outcome = ledger
        .record_sale(&sale("Gin", "2024-01-05", 7, Some(4.5)))
        .unwrap();

    assert_eq!(line_quantities(&ledger, 10), vec![0, 1, 10]);
    assert_eq!(count_rows(&ledger, "InvoiceLines"), 3);

    assert_eq!(outcome.sale_record.quantity, 7);
    assert_eq!(outcome.sale_record.sale_price, 4.5);
    assert_eq!(outcome.sale_record.total_amount, 31.5);
    let stock = outcome.inventory_after_sale.unwrap();
    assert_eq!(stock.remaining_stock, 11);
    assert_eq!(stock.size, "750mL");
}

#[test]
fn oversell_is_rejected_without_changes() {
    let (ledger, _dir) = ledger_with_three_lines();

    let err = ledger
        .record_sale(&sale("Gin", "2024-01-05", 19, Some(4.5)))
        .unwrap_err();

    assert_eq!(err.to_string(), "Not enough stock. Available: 18, Requested: 19");
    assert_eq!(line_quantities(&ledger, 10), vec![5, 3, 10]);
    assert_eq!(count_rows(&ledger, "Sales"), 0);
}

#[test]
fn oversell_leaves_existing_sale_row_untouched() {
    let (ledger, _dir) = ledger_with_three_lines();
    ledger
        .record_sale(&sale("Gin", "2024-01-05", 2, Some(4.0)))
        .unwrap();

    ledger
        .record_sale(&sale("Gin", "2024-01-05", 50, Some(9.0)))
        .unwrap_err();

    let conn = ledger.connect().unwrap();
    let (qty, price): (i64, f64) = conn
        .query_row("SELECT Quantity, SalePrice FROM Sales", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!((qty, price), (2, 4.0));
}

#[test]
fn sale_only_draws_on_own_store() {
    let (ledger, _dir) = test_ledger();
    let mut other = purchase(10, "Gin", "2024-01-01", 2.0, 50);
    other.store_id = 2;
    ledger.record_purchase(&other).unwrap();

    let err = ledger
        .record_sale(&sale("Gin", "2024-01-05", 1, Some(3.0)))
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientStock {
            available: 0,
            requested: 1
        }
    ));
    assert_eq!(line_quantities(&ledger, 10), vec![50]);
}

#[test]
fn repeat_sale_same_day_accumulates() {
    let (ledger, _dir) = ledger_with_three_lines();

    ledger
        .record_sale(&sale("Gin", "2024-01-05", 2, Some(4.0)))
        .unwrap();
    let outcome = ledger
        .record_sale(&sale("Gin", "2024-01-05", 3, Some(5.0)))
        .unwrap();

    assert_eq!(count_rows(&ledger, "Sales"), 1);
    assert_eq!(outcome.sale_record.quantity, 5);
    assert_eq!(outcome.sale_record.sale_price, 5.0);
    assert_eq!(outcome.sale_record.total_amount, 25.0);
    assert_eq!(line_quantities(&ledger, 10), vec![0, 3, 10]);
}

#[test]
fn sale_on_another_day_gets_its_own_row() {
    let (ledger, _dir) = ledger_with_three_lines();
    ledger
        .record_sale(&sale("Gin", "2024-01-05", 1, Some(4.0)))
        .unwrap();
    ledger
        .record_sale(&sale("Gin", "2024-01-06", 1, Some(4.0)))
        .unwrap();
    assert_eq!(count_rows(&ledger, "Sales"), 2);
}

#[test]
fn sale_without_price_reuses_last_sale_price() {
    let (ledger, _dir) = ledger_with_three_lines();

    let err = ledger
        .record_sale(&sale("Gin", "2024-01-05", 1, None))
        .unwrap_err();
    assert_eq!(err.to_string(), "No previous sale price for 'Gin'.");

    ledger
        .record_sale(&sale("Gin", "2024-01-05", 1, Some(6.25)))
        .unwrap();
    let outcome = ledger
        .record_sale(&sale("Gin", "2024-01-06", 2, None))
        .unwrap();
    assert_eq!(outcome.sale_record.sale_price, 6.25);
    assert_eq!(outcome.sale_record.total_amount, 12.5);
}

#[test]
fn sale_resolution_failures() {
    let (ledger, _dir) = ledger_with_three_lines();

    let mut s = sale("Gin", "2024-01-05", 1, Some(1.0));
    s.city = "Eanverness".to_string();
    let err = ledger.record_sale(&s).unwrap_err();
    assert_eq!(err.to_string(), "Store 1 not found in city 'Eanverness'.");

    let err = ledger
        .record_sale(&sale("Whisky", "2024-01-05", 1, Some(1.0)))
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(Missing::Product { .. })));
    assert_eq!(count_rows(&ledger, "Sales"), 0);
}

// ── read_inventory_across_locations ────────────────────────────────────────

#[test]
fn inventory_read_spans_stores_and_cities() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 5))
        .unwrap();
    let mut r = restock("Gin", "Diageo", "2024-01-01", 8);
    r.city = "Eanverness".to_string();
    r.store_id = 7;
    ledger.record_restock(&r).unwrap();

    let rows = ledger.read_inventory_across_locations("Gin").unwrap();
    let summary: Vec<(String, i64, i64)> = rows
        .iter()
        .map(|row| (row.city.clone(), row.store, row.quantity))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Eanverness".to_string(), 7, 8),
            ("Hardersfield".to_string(), 1, 5)
        ]
    );
}

#[test]
fn inventory_read_for_unknown_product_is_empty() {
    let (ledger, _dir) = test_ledger();
    assert!(ledger
        .read_inventory_across_locations("Absinthe")
        .unwrap()
        .is_empty());
}

// ── delete_purchase_line ───────────────────────────────────────────────────

#[test]
fn deleting_last_line_removes_invoice() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.5, 4))
        .unwrap();

    let deletion = ledger
        .delete_purchase_line(&line_key("Gin", "2024-01-01"))
        .unwrap();

    assert!(deletion.invoice_deleted);
    assert_eq!(deletion.deleted_line.quantity_removed, 4);
    assert_eq!(deletion.deleted_line.purchase_price, Some(2.5));
    assert_eq!(deletion.deleted_line.line_total, Some(10.0));
    assert_eq!(count_rows(&ledger, "Invoices"), 0);
    assert_eq!(count_rows(&ledger, "InvoiceLines"), 0);
    // The product itself stays
    assert_eq!(count_rows(&ledger, "Products"), 1);
}

#[test]
fn deleting_one_of_several_lines_keeps_invoice() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 4))
        .unwrap();
    ledger
        .record_purchase(&purchase(11, "Rum", "2023-12-01", 3.0, 2))
        .unwrap();
    // Rum joins the Gin invoice (same store, vendor and date)
    ledger
        .record_restock(&restock("Rum", "Diageo", "2024-01-01", 6))
        .unwrap();
    assert_eq!(count_rows(&ledger, "Invoices"), 2);

    let deletion = ledger
        .delete_purchase_line(&line_key("Gin", "2024-01-01"))
        .unwrap();
    assert!(!deletion.invoice_deleted);
    assert_eq!(count_rows(&ledger, "Invoices"), 2);

    let deletion = ledger
        .delete_purchase_line(&line_key("Rum", "2024-01-01"))
        .unwrap();
    assert!(deletion.invoice_deleted);
    assert_eq!(count_rows(&ledger, "Invoices"), 1);
}

#[test]
fn deleting_line_ignores_sales_against_it() {
    let (ledger, _dir) = ledger_with_three_lines();
    ledger
        .record_sale(&sale("Gin", "2024-01-05", 6, Some(4.0)))
        .unwrap();

    let deletion = ledger
        .delete_purchase_line(&line_key("Gin", "2024-01-01"))
        .unwrap();
    assert_eq!(deletion.deleted_line.quantity_removed, 0);
    assert_eq!(count_rows(&ledger, "Sales"), 1);
}

#[test]
fn delete_line_reports_first_unresolved_step() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 4))
        .unwrap();
    ledger
        .record_purchase(&purchase(11, "Rum", "2024-01-02", 2.0, 4))
        .unwrap();

    let mut key = line_key("Gin", "2024-01-01");
    key.city = "Atlantis".to_string();
    assert!(matches!(
        ledger.delete_purchase_line(&key).unwrap_err(),
        LedgerError::NotFound(Missing::City(_))
    ));

    let mut key = line_key("Gin", "2024-01-01");
    key.store_id = 7;
    assert!(matches!(
        ledger.delete_purchase_line(&key).unwrap_err(),
        LedgerError::NotFound(Missing::StoreInCity { .. })
    ));

    let mut key = line_key("Gin", "2024-01-01");
    key.vendor_name = "Nobody".to_string();
    assert!(matches!(
        ledger.delete_purchase_line(&key).unwrap_err(),
        LedgerError::NotFound(Missing::Vendor(_))
    ));

    let key = line_key("Whisky", "2024-01-01");
    assert!(matches!(
        ledger.delete_purchase_line(&key).unwrap_err(),
        LedgerError::NotFound(Missing::Product { .. })
    ));

    let key = line_key("Gin", "2030-01-01");
    assert!(matches!(
        ledger.delete_purchase_line(&key).unwrap_err(),
        LedgerError::NotFound(Missing::Invoice)
    ));

    // Rum's invoice exists but carries no Gin line
    let key = line_key("Gin", "2024-01-02");
    assert!(matches!(
        ledger.delete_purchase_line(&key).unwrap_err(),
        LedgerError::NotFound(Missing::InvoiceLine)
    ));

    assert_eq!(count_rows(&ledger, "InvoiceLines"), 2);
}

// ── delete_product_safe ────────────────────────────────────────────────────

#[test]
fn referenced_product_is_not_deleted() {
    let (ledger, _dir) = ledger_with_three_lines();
    ledger
        .record_sale(&sale("Gin", "2024-01-05", 1, Some(4.0)))
        .unwrap();

    let err = ledger.delete_product_safe(10).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::ReferentialConflict {
            product_id: 10,
            invoice_lines: 3,
            sales: 1
        }
    ));
    assert_eq!(count_rows(&ledger, "Products"), 1);
}

#[test]
fn unreferenced_product_is_deleted() {
    let (ledger, _dir) = test_ledger();
    ledger
        .record_purchase(&purchase(10, "Gin", "2024-01-01", 2.0, 4))
        .unwrap();
    ledger
        .delete_purchase_line(&line_key("Gin", "2024-01-01"))
        .unwrap();

    let deletion = ledger.delete_product_safe(10).unwrap();
    assert_eq!(deletion.deleted_product.product_id, 10);
    assert_eq!(deletion.deleted_product.product_name, "Gin");
    assert_eq!(deletion.deleted_product.size, "750mL");
    assert_eq!(count_rows(&ledger, "Products"), 0);
}

#[test]
fn deleting_unknown_product_is_not_found() {
    let (ledger, _dir) = test_ledger();
    let err = ledger.delete_product_safe(404).unwrap_err();
    assert_eq!(err.to_string(), "ProductId 404 not found.");
}
