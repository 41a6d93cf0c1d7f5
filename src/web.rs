//! HTTP front end for the ledger
//!
//! Accepts the same form-encoded fields as the store's order forms and answers
//! with JSON. Numeric fields are parsed here; a malformed number is answered
//! with 400 before the ledger is touched.

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{Ledger, NewPurchase, PurchaseLineKey, Restock, SaleRequest};

/// Shared application state
#[derive(Clone)]
struct AppState {
    ledger: Ledger,
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    fn err(message: String, code: &'static str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            code: Some(code),
        }
    }
}

/// Sale form; the price box may be left empty
#[derive(Deserialize)]
struct SaleForm {
    city: String,
    store_id: i64,
    product_name: String,
    size: String,
    sale_date: String,
    quantity: i64,
    #[serde(default)]
    sale_price: Option<String>,
}

impl SaleForm {
    fn into_request(self) -> Result<SaleRequest, String> {
        let sale_price = match self.sale_price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<f64>()
                    .map_err(|_| format!("sale_price must be a number, got '{}'", raw))?,
            ),
        };

        Ok(SaleRequest {
            city: self.city,
            store_id: self.store_id,
            product_name: self.product_name,
            size: self.size,
            sale_date: self.sale_date,
            quantity: self.quantity,
            sale_price,
        })
    }
}

#[derive(Deserialize)]
struct InventoryForm {
    product_name: String,
}

#[derive(Deserialize)]
struct ProductForm {
    product_id: i64,
}

fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::DuplicateProduct(_)
        | LedgerError::ReferentialConflict { .. }
        | LedgerError::StoreCityConflict { .. } => StatusCode::CONFLICT,
        LedgerError::NoPriorPrice { .. } | LedgerError::InsufficientStock { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::Database(_) | LedgerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn bad_request(message: String) -> Response {
    log::warn!("Rejected request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::err(message, "bad_request")),
    )
        .into_response()
}

/// Run a ledger operation off the async runtime and wrap its outcome
async fn run<T, F>(ledger: Ledger, op: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&Ledger) -> crate::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || op(&ledger)).await {
        Ok(Ok(data)) => (StatusCode::OK, Json(ApiResponse::ok(data))).into_response(),
        Ok(Err(e)) => {
            if e.is_rejection() {
                log::info!("Ledger rejected request: {}", e);
            } else {
                log::error!("Ledger error: {}", e);
            }
            (
                status_for(&e),
                Json(ApiResponse::<()>::err(e.to_string(), e.code())),
            )
                .into_response()
        }
        Err(e) => {
            log::error!("Ledger task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::err(
                    "Internal error".to_string(),
                    "internal",
                )),
            )
                .into_response()
        }
    }
}

/// POST /purchase
async fn purchase_handler(
    State(state): State<AppState>,
    form: Result<Form<NewPurchase>, FormRejection>,
) -> Response {
    let Form(purchase) = match form {
        Ok(form) => form,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    run(state.ledger, move |ledger| ledger.record_purchase(&purchase)).await
}

/// POST /purchase/update
async fn restock_handler(
    State(state): State<AppState>,
    form: Result<Form<Restock>, FormRejection>,
) -> Response {
    let Form(restock) = match form {
        Ok(form) => form,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    run(state.ledger, move |ledger| ledger.record_restock(&restock)).await
}

/// POST /sale
async fn sale_handler(
    State(state): State<AppState>,
    form: Result<Form<SaleForm>, FormRejection>,
) -> Response {
    let sale = match form {
        Ok(Form(form)) => match form.into_request() {
            Ok(sale) => sale,
            Err(message) => return bad_request(message),
        },
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    run(state.ledger, move |ledger| ledger.record_sale(&sale)).await
}

/// POST /inventory
async fn inventory_handler(
    State(state): State<AppState>,
    form: Result<Form<InventoryForm>, FormRejection>,
) -> Response {
    let Form(InventoryForm { product_name }) = match form {
        Ok(form) => form,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    run(state.ledger, move |ledger| {
        ledger.read_inventory_across_locations(&product_name)
    })
    .await
}

/// POST /purchase/delete
async fn delete_line_handler(
    State(state): State<AppState>,
    form: Result<Form<PurchaseLineKey>, FormRejection>,
) -> Response {
    let Form(key) = match form {
        Ok(form) => form,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    run(state.ledger, move |ledger| ledger.delete_purchase_line(&key)).await
}

/// POST /product/delete
async fn delete_product_handler(
    State(state): State<AppState>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let Form(ProductForm { product_id }) = match form {
        Ok(form) => form,
        Err(_) => return bad_request("product_id must be an integer.".to_string()),
    };
    run(state.ledger, move |ledger| ledger.delete_product_safe(product_id)).await
}

/// GET /dashboard
async fn dashboard_handler(State(state): State<AppState>) -> Response {
    run(state.ledger, |ledger| ledger.dashboard()).await
}

/// Build the web server router
pub fn create_router(ledger: Ledger) -> Router {
    let state = AppState { ledger };

    Router::new()
        .route("/purchase", post(purchase_handler))
        .route("/purchase/update", post(restock_handler))
        .route("/sale", post(sale_handler))
        .route("/inventory", post(inventory_handler))
        .route("/purchase/delete", post(delete_line_handler))
        .route("/product/delete", post(delete_product_handler))
        .route("/dashboard", get(dashboard_handler))
        .with_state(state)
}

/// Start the web server
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
pub async fn serve(ledger: Ledger, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(ledger);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Ledger API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    log::info!("Shutdown signal received, stopping web server");
}
