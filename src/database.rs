//! Schema and row-level accessors for the inventory database
//!
//! Uses parameterized queries exclusively (no SQL string concatenation).
//! Every accessor takes a `&Connection`; a `Transaction` derefs to one, so the
//! ledger runs all of them inside its per-operation transaction.

use crate::models::{round2, LocationStock, PurchaseRecord, SaleRecord, StockLevel};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Result type for database operations
pub type DbResult<T> = rusqlite::Result<T>;

/// Open a connection with foreign key enforcement switched on
pub fn open(path: &Path) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    Ok(conn)
}

/// Initialize the database schema
///
/// Creates the seven ledger tables and the indices backing every natural-key
/// lookup. Safe to run against an existing database.
pub fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS Cities (
            CityId INTEGER PRIMARY KEY,
            CityName TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS Stores (
            StoreId INTEGER PRIMARY KEY,
            CityId INTEGER NOT NULL,
            FOREIGN KEY (CityId) REFERENCES Cities(CityId)
        );

        -- VendorNumber is assigned by SQLite when a vendor is created by name only
        CREATE TABLE IF NOT EXISTS Vendors (
            VendorNumber INTEGER PRIMARY KEY,
            VendorName TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_vendors_name ON Vendors(VendorName);

        CREATE TABLE IF NOT EXISTS Products (
            ProductId INTEGER PRIMARY KEY,
            Brand INTEGER,
            ProductName TEXT NOT NULL,
            Size TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_products_name_size ON Products(ProductName, Size);

        CREATE TABLE IF NOT EXISTS Invoices (
            InvoiceId INTEGER PRIMARY KEY AUTOINCREMENT,
            StoreId INTEGER NOT NULL,
            VendorNumber INTEGER NOT NULL,
            InvoiceDate TEXT NOT NULL,
            FOREIGN KEY (StoreId) REFERENCES Stores(StoreId),
            FOREIGN KEY (VendorNumber) REFERENCES Vendors(VendorNumber)
        );

        CREATE INDEX IF NOT EXISTS idx_invoices_natural
            ON Invoices(StoreId, VendorNumber, InvoiceDate);

        -- Quantity is the remaining stock of the line, decremented by sales
        CREATE TABLE IF NOT EXISTS InvoiceLines (
            InvoiceLineId INTEGER PRIMARY KEY AUTOINCREMENT,
            InvoiceId INTEGER NOT NULL,
            ProductId INTEGER NOT NULL,
            PurchasePrice REAL,
            Quantity INTEGER NOT NULL,
            LineTotal REAL,
            FOREIGN KEY (InvoiceId) REFERENCES Invoices(InvoiceId),
            FOREIGN KEY (ProductId) REFERENCES Products(ProductId)
        );

        CREATE INDEX IF NOT EXISTS idx_invoice_lines_invoice_product
            ON InvoiceLines(InvoiceId, ProductId);
        CREATE INDEX IF NOT EXISTS idx_invoice_lines_product ON InvoiceLines(ProductId);

        -- One row per (StoreId, ProductId, SaleDate); repeat sales accumulate
        CREATE TABLE IF NOT EXISTS Sales (
            SaleId INTEGER PRIMARY KEY AUTOINCREMENT,
            StoreId INTEGER NOT NULL,
            ProductId INTEGER NOT NULL,
            SaleDate TEXT NOT NULL,
            Quantity INTEGER NOT NULL,
            SalePrice REAL NOT NULL,
            TotalAmount REAL NOT NULL,
            FOREIGN KEY (StoreId) REFERENCES Stores(StoreId),
            FOREIGN KEY (ProductId) REFERENCES Products(ProductId)
        );

        CREATE INDEX IF NOT EXISTS idx_sales_natural ON Sales(StoreId, ProductId, SaleDate);
        CREATE INDEX IF NOT EXISTS idx_sales_product ON Sales(ProductId);
        ",
    )?;

    log::info!("Database schema initialized");
    Ok(())
}

// ── Cities & Stores ────────────────────────────────────────────────────────

pub fn find_city_id(conn: &Connection, city_name: &str) -> DbResult<Option<i64>> {
    conn.query_row(
        "SELECT CityId FROM Cities WHERE CityName = ?1",
        params![city_name],
        |row| row.get(0),
    )
    .optional()
}

pub fn insert_city(conn: &Connection, city_name: &str) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO Cities (CityName) VALUES (?1)",
        params![city_name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// City the store belongs to, `None` when the store does not exist
pub fn find_store_city(conn: &Connection, store_id: i64) -> DbResult<Option<i64>> {
    conn.query_row(
        "SELECT CityId FROM Stores WHERE StoreId = ?1",
        params![store_id],
        |row| row.get(0),
    )
    .optional()
}

pub fn insert_store(conn: &Connection, store_id: i64, city_id: i64) -> DbResult<()> {
    conn.execute(
        "INSERT INTO Stores (StoreId, CityId) VALUES (?1, ?2)",
        params![store_id, city_id],
    )?;
    Ok(())
}

// ── Vendors ────────────────────────────────────────────────────────────────

/// Vendor number for a name; the lowest number wins if a name was reused
pub fn find_vendor_by_name(conn: &Connection, vendor_name: &str) -> DbResult<Option<i64>> {
    conn.query_row(
        "SELECT VendorNumber FROM Vendors WHERE VendorName = ?1
         ORDER BY VendorNumber LIMIT 1",
        params![vendor_name],
        |row| row.get(0),
    )
    .optional()
}

/// Create a vendor by name only, letting SQLite assign the number
pub fn insert_vendor(conn: &Connection, vendor_name: &str) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO Vendors (VendorName) VALUES (?1)",
        params![vendor_name],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert the vendor unless its number is taken; an existing vendor keeps its name
pub fn ensure_vendor(conn: &Connection, vendor_number: i64, vendor_name: &str) -> DbResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO Vendors (VendorNumber, VendorName) VALUES (?1, ?2)",
        params![vendor_number, vendor_name],
    )?;
    Ok(inserted > 0)
}

// ── Products ───────────────────────────────────────────────────────────────

/// Row of the `Products` table
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: i64,
    pub brand: Option<i64>,
    pub product_name: String,
    pub size: String,
}

fn product_from_row(row: &rusqlite::Row<'_>) -> DbResult<Product> {
    Ok(Product {
        product_id: row.get(0)?,
        brand: row.get(1)?,
        product_name: row.get(2)?,
        size: row.get(3)?,
    })
}

pub fn find_product(conn: &Connection, product_id: i64) -> DbResult<Option<Product>> {
    conn.query_row(
        "SELECT ProductId, Brand, ProductName, Size FROM Products WHERE ProductId = ?1",
        params![product_id],
        product_from_row,
    )
    .optional()
}

/// Product by its (name, size) lookup key; the lowest id wins on duplicates
pub fn find_product_by_name_size(
    conn: &Connection,
    product_name: &str,
    size: &str,
) -> DbResult<Option<Product>> {
    conn.query_row(
        "SELECT ProductId, Brand, ProductName, Size FROM Products
         WHERE ProductName = ?1 AND Size = ?2
         ORDER BY ProductId LIMIT 1",
        params![product_name, size],
        product_from_row,
    )
    .optional()
}

pub fn insert_product(conn: &Connection, product: &Product) -> DbResult<()> {
    conn.execute(
        "INSERT INTO Products (ProductId, Brand, ProductName, Size) VALUES (?1, ?2, ?3, ?4)",
        params![
            product.product_id,
            product.brand,
            &product.product_name,
            &product.size
        ],
    )?;
    Ok(())
}

pub fn delete_product(conn: &Connection, product_id: i64) -> DbResult<()> {
    conn.execute(
        "DELETE FROM Products WHERE ProductId = ?1",
        params![product_id],
    )?;
    Ok(())
}

/// Number of invoice lines and sales referencing a product
pub fn count_product_references(conn: &Connection, product_id: i64) -> DbResult<(i64, i64)> {
    let lines: i64 = conn.query_row(
        "SELECT COUNT(*) FROM InvoiceLines WHERE ProductId = ?1",
        params![product_id],
        |row| row.get(0),
    )?;
    let sales: i64 = conn.query_row(
        "SELECT COUNT(*) FROM Sales WHERE ProductId = ?1",
        params![product_id],
        |row| row.get(0),
    )?;
    Ok((lines, sales))
}

// ── Invoices ───────────────────────────────────────────────────────────────

/// Invoice by its (store, vendor, date) natural key
pub fn find_invoice(
    conn: &Connection,
    store_id: i64,
    vendor_number: i64,
    invoice_date: &str,
) -> DbResult<Option<i64>> {
    conn.query_row(
        "SELECT InvoiceId FROM Invoices
         WHERE StoreId = ?1 AND VendorNumber = ?2 AND InvoiceDate = ?3
         ORDER BY InvoiceId LIMIT 1",
        params![store_id, vendor_number, invoice_date],
        |row| row.get(0),
    )
    .optional()
}

pub fn insert_invoice(
    conn: &Connection,
    store_id: i64,
    vendor_number: i64,
    invoice_date: &str,
) -> DbResult<i64> {
    conn.execute(
        "INSERT INTO Invoices (StoreId, VendorNumber, InvoiceDate) VALUES (?1, ?2, ?3)",
        params![store_id, vendor_number, invoice_date],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_invoice(conn: &Connection, invoice_id: i64) -> DbResult<()> {
    conn.execute(
        "DELETE FROM Invoices WHERE InvoiceId = ?1",
        params![invoice_id],
    )?;
    Ok(())
}

pub fn count_invoice_lines(conn: &Connection, invoice_id: i64) -> DbResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM InvoiceLines WHERE InvoiceId = ?1",
        params![invoice_id],
        |row| row.get(0),
    )
}

// ── Invoice lines ──────────────────────────────────────────────────────────

/// Row of the `InvoiceLines` table
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub invoice_line_id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    pub purchase_price: Option<f64>,
    pub quantity: i64,
    pub line_total: Option<f64>,
}

pub fn find_invoice_line(
    conn: &Connection,
    invoice_id: i64,
    product_id: i64,
) -> DbResult<Option<InvoiceLine>> {
    conn.query_row(
        "SELECT InvoiceLineId, InvoiceId, ProductId, PurchasePrice, Quantity, LineTotal
         FROM InvoiceLines
         WHERE InvoiceId = ?1 AND ProductId = ?2
         ORDER BY InvoiceLineId LIMIT 1",
        params![invoice_id, product_id],
        |row| {
            Ok(InvoiceLine {
                invoice_line_id: row.get(0)?,
                invoice_id: row.get(1)?,
                product_id: row.get(2)?,
                purchase_price: row.get(3)?,
                quantity: row.get(4)?,
                line_total: row.get(5)?,
            })
        },
    )
    .optional()
}

/// Insert a line with `LineTotal = price × quantity`
pub fn insert_invoice_line(
    conn: &Connection,
    invoice_id: i64,
    product_id: i64,
    purchase_price: f64,
    quantity: i64,
) -> DbResult<i64> {
    let line_total = purchase_price * quantity as f64;
    conn.execute(
        "INSERT INTO InvoiceLines (InvoiceId, ProductId, PurchasePrice, Quantity, LineTotal)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![invoice_id, product_id, purchase_price, quantity, line_total],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite quantity and price of a line, recomputing its total
pub fn reprice_invoice_line(
    conn: &Connection,
    invoice_line_id: i64,
    quantity: i64,
    purchase_price: f64,
) -> DbResult<()> {
    let line_total = purchase_price * quantity as f64;
    conn.execute(
        "UPDATE InvoiceLines SET Quantity = ?1, PurchasePrice = ?2, LineTotal = ?3
         WHERE InvoiceLineId = ?4",
        params![quantity, purchase_price, line_total, invoice_line_id],
    )?;
    Ok(())
}

/// Set the remaining stock of a line; price and total are left as purchased
pub fn set_line_quantity(conn: &Connection, invoice_line_id: i64, quantity: i64) -> DbResult<()> {
    conn.prepare_cached("UPDATE InvoiceLines SET Quantity = ?1 WHERE InvoiceLineId = ?2")?
        .execute(params![quantity, invoice_line_id])?;
    Ok(())
}

pub fn delete_invoice_line(conn: &Connection, invoice_line_id: i64) -> DbResult<()> {
    conn.execute(
        "DELETE FROM InvoiceLines WHERE InvoiceLineId = ?1",
        params![invoice_line_id],
    )?;
    Ok(())
}

/// Purchase price of the most recently inserted line of a product
pub fn latest_purchase_price(conn: &Connection, product_id: i64) -> DbResult<Option<f64>> {
    let price: Option<Option<f64>> = conn
        .query_row(
            "SELECT CAST(PurchasePrice AS REAL) FROM InvoiceLines
             WHERE ProductId = ?1
             ORDER BY InvoiceLineId DESC LIMIT 1",
            params![product_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(price.flatten())
}

/// Total remaining stock of a product across every invoice of a store
pub fn store_stock(conn: &Connection, store_id: i64, product_id: i64) -> DbResult<i64> {
    conn.query_row(
        "SELECT COALESCE(SUM(il.Quantity), 0)
         FROM InvoiceLines il
         JOIN Invoices i ON il.InvoiceId = i.InvoiceId
         WHERE i.StoreId = ?1 AND il.ProductId = ?2",
        params![store_id, product_id],
        |row| row.get(0),
    )
}

/// `(InvoiceLineId, Quantity)` of a product's lines at a store, oldest first
pub fn store_lines_oldest_first(
    conn: &Connection,
    store_id: i64,
    product_id: i64,
) -> DbResult<Vec<(i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT il.InvoiceLineId, il.Quantity
         FROM InvoiceLines il
         JOIN Invoices i ON il.InvoiceId = i.InvoiceId
         WHERE i.StoreId = ?1 AND il.ProductId = ?2
         ORDER BY il.InvoiceLineId ASC",
    )?;

    let lines: DbResult<Vec<(i64, i64)>> = stmt
        .query_map(params![store_id, product_id], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect();
    lines
}

// ── Sales ──────────────────────────────────────────────────────────────────

/// `(SaleId, Quantity)` of the sale row for the (store, product, date) key
pub fn find_sale(
    conn: &Connection,
    store_id: i64,
    product_id: i64,
    sale_date: &str,
) -> DbResult<Option<(i64, i64)>> {
    conn.query_row(
        "SELECT SaleId, Quantity FROM Sales
         WHERE StoreId = ?1 AND ProductId = ?2 AND SaleDate = ?3
         ORDER BY SaleId LIMIT 1",
        params![store_id, product_id, sale_date],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

pub fn insert_sale(
    conn: &Connection,
    store_id: i64,
    product_id: i64,
    sale_date: &str,
    quantity: i64,
    sale_price: f64,
) -> DbResult<i64> {
    let total_amount = quantity as f64 * sale_price;
    conn.execute(
        "INSERT INTO Sales (StoreId, ProductId, SaleDate, Quantity, SalePrice, TotalAmount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![store_id, product_id, sale_date, quantity, sale_price, total_amount],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Overwrite quantity and price of a sale row, recomputing its total
pub fn reprice_sale(conn: &Connection, sale_id: i64, quantity: i64, sale_price: f64) -> DbResult<()> {
    let total_amount = quantity as f64 * sale_price;
    conn.execute(
        "UPDATE Sales SET Quantity = ?1, SalePrice = ?2, TotalAmount = ?3 WHERE SaleId = ?4",
        params![quantity, sale_price, total_amount, sale_id],
    )?;
    Ok(())
}

/// Sale price of the most recently inserted sale of a product
pub fn latest_sale_price(conn: &Connection, product_id: i64) -> DbResult<Option<f64>> {
    conn.query_row(
        "SELECT SalePrice FROM Sales WHERE ProductId = ?1 ORDER BY SaleId DESC LIMIT 1",
        params![product_id],
        |row| row.get(0),
    )
    .optional()
}

// ── Joined views ───────────────────────────────────────────────────────────

/// An invoice line joined out to city, vendor and product
pub fn purchase_record(conn: &Connection, invoice_line_id: i64) -> DbResult<Option<PurchaseRecord>> {
    conn.query_row(
        "SELECT c.CityName, s.StoreId, v.VendorName, p.ProductName, p.Size,
                i.InvoiceDate, COALESCE(il.PurchasePrice, 0), il.Quantity,
                COALESCE(il.LineTotal, 0)
         FROM InvoiceLines il
         JOIN Invoices i ON il.InvoiceId = i.InvoiceId
         JOIN Vendors v ON i.VendorNumber = v.VendorNumber
         JOIN Products p ON il.ProductId = p.ProductId
         JOIN Stores s ON i.StoreId = s.StoreId
         JOIN Cities c ON s.CityId = c.CityId
         WHERE il.InvoiceLineId = ?1",
        params![invoice_line_id],
        |row| {
            Ok(PurchaseRecord {
                city_name: row.get(0)?,
                store_id: row.get(1)?,
                vendor_name: row.get(2)?,
                product_name: row.get(3)?,
                size: row.get(4)?,
                invoice_date: row.get(5)?,
                purchase_price: round2(row.get(6)?),
                quantity: row.get(7)?,
                line_total: round2(row.get(8)?),
            })
        },
    )
    .optional()
}

/// A sale row joined out to city and product
pub fn sale_record(conn: &Connection, sale_id: i64) -> DbResult<Option<SaleRecord>> {
    conn.query_row(
        "SELECT c.CityName, s.StoreId, p.ProductName, p.Size,
                sa.SaleDate, sa.Quantity, sa.SalePrice, sa.TotalAmount
         FROM Sales sa
         JOIN Stores s ON sa.StoreId = s.StoreId
         JOIN Cities c ON s.CityId = c.CityId
         JOIN Products p ON sa.ProductId = p.ProductId
         WHERE sa.SaleId = ?1",
        params![sale_id],
        |row| {
            Ok(SaleRecord {
                city_name: row.get(0)?,
                store_id: row.get(1)?,
                product_name: row.get(2)?,
                size: row.get(3)?,
                sale_date: row.get(4)?,
                quantity: row.get(5)?,
                sale_price: round2(row.get(6)?),
                total_amount: round2(row.get(7)?),
            })
        },
    )
    .optional()
}

/// Remaining stock of a product at a store, `None` if it never had a line there
pub fn stock_level(conn: &Connection, store_id: i64, product_id: i64) -> DbResult<Option<StockLevel>> {
    conn.query_row(
        "SELECT p.ProductName, p.Size, SUM(il.Quantity)
         FROM InvoiceLines il
         JOIN Products p ON il.ProductId = p.ProductId
         JOIN Invoices i ON il.InvoiceId = i.InvoiceId
         WHERE i.StoreId = ?1 AND il.ProductId = ?2
         GROUP BY p.ProductName, p.Size",
        params![store_id, product_id],
        |row| {
            Ok(StockLevel {
                product_name: row.get(0)?,
                size: row.get(1)?,
                remaining_stock: row.get(2)?,
            })
        },
    )
    .optional()
}

/// Stock of every product with this name, per store, ordered by city then store
pub fn stock_by_location(conn: &Connection, product_name: &str) -> DbResult<Vec<LocationStock>> {
    let mut stmt = conn.prepare(
        "SELECT s.StoreId, c.CityName, p.ProductName, p.Size, SUM(il.Quantity)
         FROM InvoiceLines il
         JOIN Invoices i ON il.InvoiceId = i.InvoiceId
         JOIN Stores s ON i.StoreId = s.StoreId
         JOIN Cities c ON s.CityId = c.CityId
         JOIN Products p ON il.ProductId = p.ProductId
         WHERE p.ProductName = ?1
         GROUP BY s.StoreId, c.CityName, p.ProductName, p.Size
         ORDER BY c.CityName, s.StoreId",
    )?;

    let results: DbResult<Vec<LocationStock>> = stmt
        .query_map(params![product_name], |row| {
            Ok(LocationStock {
                store: row.get(0)?,
                city: row.get(1)?,
                product: row.get(2)?,
                size: row.get(3)?,
                quantity: row.get(4)?,
            })
        })?
        .collect();
    results
}
