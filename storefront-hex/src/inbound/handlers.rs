//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use storefront_types::{
    AdminRequest, AppError, CheckoutRequest, CheckoutResponse, DocumentStore, NewProduct,
    NewReview, NewUser, OrderIdRequest, OrdersQuery, PaymentGateway, PlaceOrderRequest,
    ProductIdQuery, ProductUpdate, RecordId, UpdateStatusRequest,
};

use crate::StoreService;

/// Application state shared across handlers.
pub struct AppState<S: DocumentStore, P: PaymentGateway> {
    pub service: StoreService<S, P>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

type Shared<S, P> = State<Arc<AppState<S, P>>>;

/// Health check endpoint.
pub async fn health<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
) -> &'static str {
    state.service.health()
}

/// Answers unknown routes with the usual error body.
pub async fn not_found() -> ApiError {
    AppError::NotFound("No such route".into()).into()
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout
// ─────────────────────────────────────────────────────────────────────────────

/// Charge the buyer. Always HTTP 200; the outcome is in the body.
#[tracing::instrument(skip_all)]
pub async fn checkout<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Json<CheckoutResponse> {
    match payload {
        Ok(Json(req)) => Json(state.service.checkout(req).await),
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Unreadable checkout request");
            Json(CheckoutResponse::failure(rejection.body_text()))
        }
    }
}

/// Mark an order as paid.
#[tracing::instrument(skip(state), fields(order_id = %req.id))]
pub async fn mark_order_paid<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<OrderIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let modified = state.service.mark_order_paid(req).await?;
    Ok(Json(modified))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(email = %req.email))]
pub async fn register_user<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.register_user(req).await?;
    Ok(Json(result))
}

/// Get a user by email, `null` when unknown.
#[tracing::instrument(skip(state))]
pub async fn get_user<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.get_user_by_email(&email).await?;
    Ok(Json(user))
}

#[tracing::instrument(skip(state), fields(email = %req.email))]
pub async fn promote_admin<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<AdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.promote_admin(req).await?;
    Ok(Json(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_products<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by id, `null` when unknown.
///
/// Mounted at both `/placeorder/{id}` and `/updateOne/{id}`.
#[tracing::instrument(skip(state), fields(product_id = %id))]
pub async fn get_product<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.service.get_product(RecordId::new(id)).await?;
    Ok(Json(product))
}

#[tracing::instrument(skip_all, fields(name = %req.name))]
pub async fn add_product<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.add_product(req).await?;
    Ok(Json(result))
}

#[tracing::instrument(skip_all, fields(product_id = %query.id))]
pub async fn update_product<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Query(query): Query<ProductIdQuery>,
    Json(update): Json<ProductUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .service
        .update_product(RecordId::new(query.id), update)
        .await?;
    Ok(Json(result))
}

#[tracing::instrument(skip(state), fields(product_id = %id))]
pub async fn delete_product<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.delete_product(RecordId::new(id)).await?;
    Ok(Json(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// Orders
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all, fields(email = %req.email))]
pub async fn place_order<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.place_order(req).await?;
    Ok(Json(result))
}

/// List orders, optionally only those of `?email=`.
#[tracing::instrument(skip(state))]
pub async fn list_orders<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state.service.list_orders(query.email.as_deref()).await?;
    Ok(Json(orders))
}

#[tracing::instrument(skip(state), fields(order_id = %req.id, status = %req.status))]
pub async fn update_order_status<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let modified = state.service.update_order_status(req).await?;
    Ok(Json(modified))
}

#[tracing::instrument(skip(state), fields(order_id = %id))]
pub async fn delete_order<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.delete_order(RecordId::new(id)).await?;
    Ok(Json(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// Reviews
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn add_review<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
    Json(req): Json<NewReview>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.add_review(req).await?;
    Ok(Json(result))
}

#[tracing::instrument(skip(state))]
pub async fn list_reviews<S: DocumentStore, P: PaymentGateway>(
    State(state): Shared<S, P>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state.service.list_reviews().await?;
    Ok(Json(reviews))
}
