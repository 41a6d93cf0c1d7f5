//! Read-only aggregates for the dashboard

use crate::database::DbResult;
use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::round2;
use rusqlite::{params, Connection};
use serde::Serialize;

/// Number of products shown in the revenue ranking
pub const TOP_REVENUE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductStock {
    pub product_name: String,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductRevenue {
    pub product_name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CityStock {
    pub city_name: String,
    pub stock: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LowStock {
    pub product_name: String,
    pub size: String,
    pub remaining: i64,
}

/// Everything the dashboard page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub stock_data: Vec<ProductStock>,
    pub sales_data: Vec<ProductRevenue>,
    pub city_data: Vec<CityStock>,
    pub low_stock: Vec<LowStock>,
    pub total_products: usize,
    /// Sum over the revenue ranking only
    pub total_revenue: f64,
    pub total_stock: i64,
}

/// Remaining stock per product name, largest first
pub fn stock_by_product(conn: &Connection) -> DbResult<Vec<ProductStock>> {
    let mut stmt = conn.prepare(
        "SELECT p.ProductName, SUM(il.Quantity) AS Stock
         FROM InvoiceLines il
         JOIN Products p ON il.ProductId = p.ProductId
         GROUP BY p.ProductName
         ORDER BY Stock DESC, p.ProductName",
    )?;

    let results: DbResult<Vec<ProductStock>> = stmt
        .query_map([], |row| {
            Ok(ProductStock {
                product_name: row.get(0)?,
                stock: row.get(1)?,
            })
        })?
        .collect();
    results
}

/// Products with the highest total sales
pub fn top_revenue(conn: &Connection, limit: usize) -> DbResult<Vec<ProductRevenue>> {
    let mut stmt = conn.prepare(
        "SELECT p.ProductName, SUM(s.TotalAmount) AS Revenue
         FROM Sales s
         JOIN Products p ON s.ProductId = p.ProductId
         GROUP BY p.ProductName
         ORDER BY Revenue DESC, p.ProductName
         LIMIT ?1",
    )?;

    let results: DbResult<Vec<ProductRevenue>> = stmt
        .query_map(params![limit as i64], |row| {
            Ok(ProductRevenue {
                product_name: row.get(0)?,
                revenue: round2(row.get(1)?),
            })
        })?
        .collect();
    results
}

/// Remaining stock per city
pub fn stock_by_city(conn: &Connection) -> DbResult<Vec<CityStock>> {
    let mut stmt = conn.prepare(
        "SELECT c.CityName, SUM(il.Quantity)
         FROM InvoiceLines il
         JOIN Invoices i ON il.InvoiceId = i.InvoiceId
         JOIN Stores s ON i.StoreId = s.StoreId
         JOIN Cities c ON s.CityId = c.CityId
         GROUP BY c.CityName
         ORDER BY c.CityName",
    )?;

    let results: DbResult<Vec<CityStock>> = stmt
        .query_map([], |row| {
            Ok(CityStock {
                city_name: row.get(0)?,
                stock: row.get(1)?,
            })
        })?
        .collect();
    results
}

/// Product (name, size) groups whose remaining stock is below `threshold`
pub fn low_stock(conn: &Connection, threshold: i64) -> DbResult<Vec<LowStock>> {
    let mut stmt = conn.prepare(
        "SELECT p.ProductName, p.Size, SUM(il.Quantity) AS Remaining
         FROM InvoiceLines il
         JOIN Products p ON il.ProductId = p.ProductId
         GROUP BY p.ProductName, p.Size
         HAVING Remaining < ?1
         ORDER BY Remaining, p.ProductName",
    )?;

    let results: DbResult<Vec<LowStock>> = stmt
        .query_map(params![threshold], |row| {
            Ok(LowStock {
                product_name: row.get(0)?,
                size: row.get(1)?,
                remaining: row.get(2)?,
            })
        })?
        .collect();
    results
}

/// Build the full dashboard from one connection
pub fn dashboard(conn: &Connection, low_stock_threshold: i64) -> DbResult<Dashboard> {
    let stock_data = stock_by_product(conn)?;
    let sales_data = top_revenue(conn, TOP_REVENUE_LIMIT)?;
    let city_data = stock_by_city(conn)?;
    let low_stock = low_stock(conn, low_stock_threshold)?;

    let total_products = stock_data.len();
    let total_revenue = round2(sales_data.iter().map(|r| r.revenue).sum());
    let total_stock = stock_data.iter().map(|r| r.stock).sum();

    Ok(Dashboard {
        stock_data,
        sales_data,
        city_data,
        low_stock,
        total_products,
        total_revenue,
        total_stock,
    })
}

impl Ledger {
    /// Dashboard aggregates using the configured low-stock threshold
    pub fn dashboard(&self) -> Result<Dashboard> {
        let conn = self.connect()?;
        Ok(dashboard(&conn, self.config().low_stock_threshold)?)
    }
}
