//! The inventory ledger
//!
//! Each public operation opens its own connection, runs inside one
//! transaction and commits before returning. Any error returned before the
//! commit drops the transaction, which rolls every statement back.

use crate::config::LedgerConfig;
use crate::database::{self, Product};
use crate::error::{LedgerError, Missing, PriceSource, Result};
use crate::models::{
    round2, DeletedLine, DeletedProduct, LineDeletion, LocationStock, ProductDeletion,
    PurchaseRecord, SaleOutcome, StoreRecord,
};
use rusqlite::Connection;
use serde::Deserialize;

/// A purchase of a product the database has never seen
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPurchase {
    pub store_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub size: String,
    pub vendor_number: i64,
    pub vendor_name: String,
    pub invoice_date: String,
    pub purchase_price: f64,
    pub quantity: i64,
}

/// More stock of an existing product, priced from its last purchase
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Restock {
    pub city: String,
    pub store_id: i64,
    pub vendor_name: String,
    pub product_name: String,
    pub size: String,
    pub invoice_date: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaleRequest {
    pub city: String,
    pub store_id: i64,
    pub product_name: String,
    pub size: String,
    pub sale_date: String,
    pub quantity: i64,
    /// Falls back to the product's last sale price when absent
    #[serde(default)]
    pub sale_price: Option<f64>,
}

/// Natural key of one invoice line
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PurchaseLineKey {
    pub city: String,
    pub store_id: i64,
    pub vendor_name: String,
    pub product_name: String,
    pub size: String,
    pub invoice_date: String,
}

/// New quantity for every line touched when consuming `quantity` units
/// from `lines` (given oldest first as `(line_id, quantity)`).
///
/// Lines are drained completely before the next one is touched; a drained
/// line is reported with quantity 0 rather than dropped.
pub fn plan_fifo_deduction(lines: &[(i64, i64)], quantity: i64) -> Vec<(i64, i64)> {
    let mut remaining = quantity;
    let mut updates = Vec::new();

    for &(line_id, line_qty) in lines {
        if remaining <= 0 {
            break;
        }
        if line_qty <= 0 {
            continue;
        }
        if line_qty <= remaining {
            updates.push((line_id, 0));
            remaining -= line_qty;
        } else {
            updates.push((line_id, line_qty - remaining));
            remaining = 0;
        }
    }

    updates
}

/// Handle to the inventory database
///
/// Holds configuration only; no connection is kept between operations.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Open a fresh connection to the configured database
    pub(crate) fn connect(&self) -> Result<Connection> {
        Ok(database::open(self.config.db_path())?)
    }

    /// Create the database file, its directory and the schema if missing
    pub fn init(&self) -> Result<()> {
        let path = self.config.db_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                log::info!("Created directory: {}", parent.display());
            }
        }

        let conn = self.connect()?;
        database::init_schema(&conn)?;
        log::info!("Opened database: {}", path.display());
        Ok(())
    }

    /// Register a store, creating its city on first reference
    ///
    /// Registering an existing store again in the same city is a no-op.
    pub fn register_store(&self, city_name: &str, store_id: i64) -> Result<StoreRecord> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let city_id = match database::find_city_id(&tx, city_name)? {
            Some(id) => id,
            None => {
                let id = database::insert_city(&tx, city_name)?;
                log::debug!("Created city '{}' ({})", city_name, id);
                id
            }
        };

        match database::find_store_city(&tx, store_id)? {
            Some(existing) if existing != city_id => {
                log::warn!("Store {} is registered in another city", store_id);
                return Err(LedgerError::StoreCityConflict {
                    store_id,
                    city: city_name.to_string(),
                });
            }
            Some(_) => {}
            None => database::insert_store(&tx, store_id, city_id)?,
        }

        tx.commit()?;
        log::info!("Registered store {} in '{}'", store_id, city_name);

        Ok(StoreRecord {
            city_id,
            city_name: city_name.to_string(),
            store_id,
        })
    }

    /// Record the first purchase of a brand-new product
    ///
    /// Always opens a fresh invoice. Fails with `DuplicateProduct` when the
    /// product id is already taken; restocking goes through [`Self::record_restock`].
    pub fn record_purchase(&self, purchase: &NewPurchase) -> Result<PurchaseRecord> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        if database::find_product(&tx, purchase.product_id)?.is_some() {
            log::warn!("Rejected purchase: ProductId {} exists", purchase.product_id);
            return Err(LedgerError::DuplicateProduct(purchase.product_id));
        }
        if database::find_store_city(&tx, purchase.store_id)?.is_none() {
            return Err(Missing::Store(purchase.store_id).into());
        }

        database::ensure_vendor(&tx, purchase.vendor_number, &purchase.vendor_name)?;
        database::insert_product(
            &tx,
            &Product {
                product_id: purchase.product_id,
                brand: Some(purchase.vendor_number),
                product_name: purchase.product_name.clone(),
                size: purchase.size.clone(),
            },
        )?;
        let invoice_id = database::insert_invoice(
            &tx,
            purchase.store_id,
            purchase.vendor_number,
            &purchase.invoice_date,
        )?;
        let line_id = database::insert_invoice_line(
            &tx,
            invoice_id,
            purchase.product_id,
            purchase.purchase_price,
            purchase.quantity,
        )?;

        let record = joined(database::purchase_record(&tx, line_id)?)?;
        tx.commit()?;

        log::info!(
            "Recorded purchase of {} x '{}' ({}) for store {} on invoice {}",
            purchase.quantity,
            purchase.product_name,
            purchase.size,
            purchase.store_id,
            invoice_id
        );
        Ok(record)
    }

    /// Add stock of an existing product to a store
    ///
    /// The invoice is shared by every restock with the same store, vendor and
    /// date. The unit price comes from the product's latest invoice line and
    /// replaces the price of an existing line outright.
    pub fn record_restock(&self, restock: &Restock) -> Result<PurchaseRecord> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        resolve_store_in_city(&tx, &restock.city, restock.store_id)?;
        let product = resolve_product(&tx, &restock.product_name, &restock.size)?;

        let vendor_number = match database::find_vendor_by_name(&tx, &restock.vendor_name)? {
            Some(number) => number,
            None => {
                let number = database::insert_vendor(&tx, &restock.vendor_name)?;
                log::debug!("Created vendor '{}' ({})", restock.vendor_name, number);
                number
            }
        };

        let invoice_id = match database::find_invoice(
            &tx,
            restock.store_id,
            vendor_number,
            &restock.invoice_date,
        )? {
            Some(id) => id,
            None => database::insert_invoice(
                &tx,
                restock.store_id,
                vendor_number,
                &restock.invoice_date,
            )?,
        };

        let price = database::latest_purchase_price(&tx, product.product_id)?.ok_or_else(|| {
            LedgerError::NoPriorPrice {
                kind: PriceSource::Purchase,
                product_name: restock.product_name.clone(),
            }
        })?;

        let line_id = match database::find_invoice_line(&tx, invoice_id, product.product_id)? {
            Some(line) => {
                let quantity = line.quantity + restock.quantity;
                database::reprice_invoice_line(&tx, line.invoice_line_id, quantity, price)?;
                line.invoice_line_id
            }
            None => database::insert_invoice_line(
                &tx,
                invoice_id,
                product.product_id,
                price,
                restock.quantity,
            )?,
        };

        let record = joined(database::purchase_record(&tx, line_id)?)?;
        tx.commit()?;

        log::info!(
            "Restocked {} x '{}' ({}) at store {} (line now {})",
            restock.quantity,
            restock.product_name,
            restock.size,
            restock.store_id,
            record.quantity
        );
        Ok(record)
    }

    /// Record a sale and deduct the sold units from the store's stock, oldest
    /// invoice lines first
    pub fn record_sale(&self, sale: &SaleRequest) -> Result<SaleOutcome> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        resolve_store_in_city(&tx, &sale.city, sale.store_id)?;
        let product = resolve_product(&tx, &sale.product_name, &sale.size)?;

        let sale_price = match sale.sale_price {
            Some(price) => price,
            None => database::latest_sale_price(&tx, product.product_id)?.ok_or_else(|| {
                LedgerError::NoPriorPrice {
                    kind: PriceSource::Sale,
                    product_name: sale.product_name.clone(),
                }
            })?,
        };

        let available = database::store_stock(&tx, sale.store_id, product.product_id)?;
        if available < sale.quantity {
            log::warn!(
                "Rejected sale of {} x '{}' at store {}: {} available",
                sale.quantity,
                sale.product_name,
                sale.store_id,
                available
            );
            return Err(LedgerError::InsufficientStock {
                available,
                requested: sale.quantity,
            });
        }

        let sale_id =
            match database::find_sale(&tx, sale.store_id, product.product_id, &sale.sale_date)? {
                Some((sale_id, old_qty)) => {
                    database::reprice_sale(&tx, sale_id, old_qty + sale.quantity, sale_price)?;
                    sale_id
                }
                None => database::insert_sale(
                    &tx,
                    sale.store_id,
                    product.product_id,
                    &sale.sale_date,
                    sale.quantity,
                    sale_price,
                )?,
            };

        let lines = database::store_lines_oldest_first(&tx, sale.store_id, product.product_id)?;
        for (line_id, quantity) in plan_fifo_deduction(&lines, sale.quantity) {
            database::set_line_quantity(&tx, line_id, quantity)?;
        }

        let sale_record = joined(database::sale_record(&tx, sale_id)?)?;
        let inventory_after_sale =
            database::stock_level(&tx, sale.store_id, product.product_id)?;
        tx.commit()?;

        log::info!(
            "Recorded sale of {} x '{}' ({}) at store {} for {:.2}",
            sale.quantity,
            sale.product_name,
            sale.size,
            sale.store_id,
            sale_price
        );
        Ok(SaleOutcome {
            sale_record,
            inventory_after_sale,
        })
    }

    /// Stock of every product with this name, per store and city
    pub fn read_inventory_across_locations(&self, product_name: &str) -> Result<Vec<LocationStock>> {
        let conn = self.connect()?;
        let rows = database::stock_by_location(&conn, product_name)?;
        log::debug!("'{}' stocked at {} location(s)", product_name, rows.len());
        Ok(rows)
    }

    /// Delete one invoice line, and its invoice once no lines remain
    ///
    /// The line goes regardless of sales already made against it.
    pub fn delete_purchase_line(&self, key: &PurchaseLineKey) -> Result<LineDeletion> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        resolve_store_in_city(&tx, &key.city, key.store_id)?;
        let vendor_number = database::find_vendor_by_name(&tx, &key.vendor_name)?
            .ok_or_else(|| Missing::Vendor(key.vendor_name.clone()))?;
        let product = resolve_product(&tx, &key.product_name, &key.size)?;
        let invoice_id =
            database::find_invoice(&tx, key.store_id, vendor_number, &key.invoice_date)?
                .ok_or(Missing::Invoice)?;
        let line = database::find_invoice_line(&tx, invoice_id, product.product_id)?
            .ok_or(Missing::InvoiceLine)?;

        database::delete_invoice_line(&tx, line.invoice_line_id)?;

        let invoice_deleted = database::count_invoice_lines(&tx, invoice_id)? == 0;
        if invoice_deleted {
            database::delete_invoice(&tx, invoice_id)?;
        }
        tx.commit()?;

        log::info!(
            "Deleted invoice line {} ({} x '{}'){}",
            line.invoice_line_id,
            line.quantity,
            key.product_name,
            if invoice_deleted {
                ", invoice emptied and removed"
            } else {
                ""
            }
        );

        Ok(LineDeletion {
            deleted_line: DeletedLine {
                city: key.city.clone(),
                store_id: key.store_id,
                vendor_name: key.vendor_name.clone(),
                product_name: key.product_name.clone(),
                size: key.size.clone(),
                invoice_date: key.invoice_date.clone(),
                quantity_removed: line.quantity,
                purchase_price: line.purchase_price.map(round2),
                line_total: line.line_total.map(round2),
            },
            invoice_deleted,
        })
    }

    /// Delete a product nothing refers to any more
    pub fn delete_product_safe(&self, product_id: i64) -> Result<ProductDeletion> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        let product =
            database::find_product(&tx, product_id)?.ok_or(Missing::ProductId(product_id))?;

        let (invoice_lines, sales) = database::count_product_references(&tx, product_id)?;
        if invoice_lines > 0 || sales > 0 {
            log::warn!(
                "Refused to delete ProductId {}: {} invoice line(s), {} sale(s)",
                product_id,
                invoice_lines,
                sales
            );
            return Err(LedgerError::ReferentialConflict {
                product_id,
                invoice_lines,
                sales,
            });
        }

        database::delete_product(&tx, product_id)?;
        tx.commit()?;

        log::info!("Deleted ProductId {} ('{}')", product_id, product.product_name);
        Ok(ProductDeletion {
            deleted_product: DeletedProduct {
                product_id,
                product_name: product.product_name,
                size: product.size,
            },
        })
    }
}

/// Check the city exists and the store belongs to it; returns the city id
fn resolve_store_in_city(conn: &Connection, city: &str, store_id: i64) -> Result<i64> {
    let city_id =
        database::find_city_id(conn, city)?.ok_or_else(|| Missing::City(city.to_string()))?;

    match database::find_store_city(conn, store_id)? {
        Some(store_city) if store_city == city_id => Ok(city_id),
        _ => Err(Missing::StoreInCity {
            store_id,
            city: city.to_string(),
        }
        .into()),
    }
}

fn resolve_product(conn: &Connection, product_name: &str, size: &str) -> Result<Product> {
    database::find_product_by_name_size(conn, product_name, size)?.ok_or_else(|| {
        Missing::Product {
            name: product_name.to_string(),
            size: size.to_string(),
        }
        .into()
    })
}

/// A joined view of a row written in the same transaction must exist
fn joined<T>(row: Option<T>) -> Result<T> {
    row.ok_or(LedgerError::Database(rusqlite::Error::QueryReturnedNoRows))
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
