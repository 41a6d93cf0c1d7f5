//! Inventory Ledger - command line front end
//!
//! Runs one ledger operation per invocation and prints the result as JSON,
//! or serves the HTTP API with `serve`.

use clap::{Parser, Subcommand};
use inventory_ledger::config::{default_db_path, DEFAULT_LOW_STOCK_THRESHOLD};
use inventory_ledger::{
    Ledger, LedgerConfig, NewPurchase, PurchaseLineKey, Restock, SaleRequest,
};
use serde::Serialize;

/// Store inventory ledger backed by SQLite
#[derive(Parser, Debug)]
#[command(name = "inventory_ledger")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DB_PATH", default_value_t = default_db_path_string())]
    database: String,

    /// Products with less remaining stock than this are reported as low
    #[arg(long, default_value_t = DEFAULT_LOW_STOCK_THRESHOLD)]
    low_stock_threshold: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and schema
    Init,

    /// Register a store, creating its city if needed
    AddStore {
        #[arg(long)]
        city: String,
        #[arg(long)]
        store_id: i64,
    },

    /// Record the first purchase of a new product
    Purchase {
        #[arg(long)]
        store_id: i64,
        #[arg(long)]
        product_id: i64,
        #[arg(long)]
        product_name: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        vendor_number: i64,
        #[arg(long)]
        vendor_name: String,
        #[arg(long)]
        invoice_date: String,
        #[arg(long)]
        purchase_price: f64,
        #[arg(long)]
        quantity: i64,
    },

    /// Add stock of an existing product at its last purchase price
    Restock {
        #[arg(long)]
        city: String,
        #[arg(long)]
        store_id: i64,
        #[arg(long)]
        vendor_name: String,
        #[arg(long)]
        product_name: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        invoice_date: String,
        #[arg(long)]
        quantity: i64,
    },

    /// Record a sale and deduct stock
    Sale {
        #[arg(long)]
        city: String,
        #[arg(long)]
        store_id: i64,
        #[arg(long)]
        product_name: String,
        #[arg(long)]
        size: String,
        /// Defaults to today
        #[arg(long)]
        sale_date: Option<String>,
        #[arg(long)]
        quantity: i64,
        /// Defaults to the product's last sale price
        #[arg(long)]
        sale_price: Option<f64>,
    },

    /// Show stock of a product at every store
    Inventory { product_name: String },

    /// Delete one purchase line
    DeleteLine {
        #[arg(long)]
        city: String,
        #[arg(long)]
        store_id: i64,
        #[arg(long)]
        vendor_name: String,
        #[arg(long)]
        product_name: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        invoice_date: String,
    },

    /// Delete a product that nothing references
    DeleteProduct { product_id: i64 },

    /// Print stock, revenue and low-stock aggregates
    Dashboard,

    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value_t = 5000)]
        port: u16,
    },
}

fn default_db_path_string() -> String {
    default_db_path().to_string_lossy().to_string()
}

/// Today's date as `YYYY-MM-DD` using local system time
fn today_date() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Print a result as JSON; returns the process exit code
fn emit<T: Serialize>(result: inventory_ledger::Result<T>) -> i32 {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(e) => {
                log::error!("Failed to serialize result: {}", e);
                1
            }
        },
        Err(e) => {
            if e.is_rejection() {
                log::warn!("{}", e);
            } else {
                log::error!("{}", e);
            }
            println!(
                "{}",
                serde_json::json!({ "error": e.to_string(), "code": e.code() })
            );
            1
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = LedgerConfig::new(&args.database).with_low_stock_threshold(args.low_stock_threshold);
    let ledger = Ledger::new(config);

    log::debug!("Database path: {}", ledger.config().db_path().display());

    if let Err(e) = ledger.init() {
        log::error!("Failed to initialize database: {}", e);
        std::process::exit(1);
    }

    let code = match args.command {
        Command::Init => 0,
        Command::AddStore { city, store_id } => emit(ledger.register_store(&city, store_id)),
        Command::Purchase {
            store_id,
            product_id,
            product_name,
            size,
            vendor_number,
            vendor_name,
            invoice_date,
            purchase_price,
            quantity,
        } => emit(ledger.record_purchase(&NewPurchase {
            store_id,
            product_id,
            product_name,
            size,
            vendor_number,
            vendor_name,
            invoice_date,
            purchase_price,
            quantity,
        })),
        Command::Restock {
            city,
            store_id,
            vendor_name,
            product_name,
            size,
            invoice_date,
            quantity,
        } => emit(ledger.record_restock(&Restock {
            city,
            store_id,
            vendor_name,
            product_name,
            size,
            invoice_date,
            quantity,
        })),
        Command::Sale {
            city,
            store_id,
            product_name,
            size,
            sale_date,
            quantity,
            sale_price,
        } => emit(ledger.record_sale(&SaleRequest {
            city,
            store_id,
            product_name,
            size,
            sale_date: sale_date.unwrap_or_else(today_date),
            quantity,
            sale_price,
        })),
        Command::Inventory { product_name } => {
            emit(ledger.read_inventory_across_locations(&product_name))
        }
        Command::DeleteLine {
            city,
            store_id,
            vendor_name,
            product_name,
            size,
            invoice_date,
        } => emit(ledger.delete_purchase_line(&PurchaseLineKey {
            city,
            store_id,
            vendor_name,
            product_name,
            size,
            invoice_date,
        })),
        Command::DeleteProduct { product_id } => emit(ledger.delete_product_safe(product_id)),
        Command::Dashboard => emit(ledger.dashboard()),
        Command::Serve { port } => match inventory_ledger::web::serve(ledger, port).await {
            Ok(()) => 0,
            Err(e) => {
                log::error!("Web server error: {}", e);
                1
            }
        },
    };

    std::process::exit(code);
}
