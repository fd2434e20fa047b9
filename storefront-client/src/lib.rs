//! # Storefront Client SDK
//!
//! A typed Rust client for the Storefront API.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storefront_types::{
    AdminRequest, CheckoutRequest, CheckoutResponse, DeleteResult, InsertResult, NewProduct,
    NewReview, NewUser, Order, OrderIdRequest, PlaceOrderRequest, Product, ProductUpdate, Review,
    UpdateResult, UpdateStatusRequest, User,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Storefront API client.
pub struct StorefrontClient {
    base_url: String,
    http: Client,
}

impl StorefrontClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Builds `base_url/segment/...`, percent-encoding every segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    /// Returns the health message of the API.
    pub async fn health(&self) -> Result<String, ClientError> {
        let resp = self.request(Method::GET, &[])?.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            })
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Charges a card token for one product.
    pub async fn checkout(&self, req: &CheckoutRequest) -> Result<CheckoutResponse, ClientError> {
        self.send_json(Method::POST, &["checkout"], req).await
    }

    /// Marks an order as paid, returning the number of modified orders.
    pub async fn mark_order_paid(&self, id: &str) -> Result<u64, ClientError> {
        let req = OrderIdRequest { id: id.to_string() };
        self.send_json(Method::PUT, &["checkout", "update"], &req)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn register_user(&self, user: &NewUser) -> Result<InsertResult, ClientError> {
        self.send_json(Method::POST, &["users"], user).await
    }

    /// Gets the first user with this email, `None` when there is none.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, ClientError> {
        self.get(&["admin", email]).await
    }

    pub async fn promote_admin(&self, email: &str) -> Result<UpdateResult, ClientError> {
        let req = AdminRequest {
            email: email.to_string(),
        };
        self.send_json(Method::PUT, &["addAdmin"], &req).await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        self.get(&["products"]).await
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, ClientError> {
        self.get(&["placeorder", id]).await
    }

    /// Same as [`get_product`](Self::get_product) through the `/updateOne/{id}` route.
    pub async fn get_product_for_update(&self, id: &str) -> Result<Option<Product>, ClientError> {
        self.get(&["updateOne", id]).await
    }

    pub async fn add_product(&self, product: &NewProduct) -> Result<InsertResult, ClientError> {
        self.send_json(Method::POST, &["addProduct"], product).await
    }

    pub async fn update_product(
        &self,
        id: &str,
        update: &ProductUpdate,
    ) -> Result<UpdateResult, ClientError> {
        let req = self
            .request(Method::PUT, &["updateProduct"])?
            .query(&[("id", id)])
            .json(update);
        self.execute(req).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<DeleteResult, ClientError> {
        self.execute(self.request(Method::DELETE, &["deleteProduct", id])?)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn place_order(&self, order: &PlaceOrderRequest) -> Result<InsertResult, ClientError> {
        self.send_json(Method::POST, &["placeorder"], order).await
    }

    /// Lists orders, only those placed with `email` when given.
    pub async fn list_orders(&self, email: Option<&str>) -> Result<Vec<Order>, ClientError> {
        let mut req = self.request(Method::GET, &["orders"])?;
        if let Some(email) = email {
            req = req.query(&[("email", email)]);
        }
        self.execute(req).await
    }

    /// Sets an order's status, returning the number of modified orders.
    pub async fn update_order_status(&self, id: &str, status: &str) -> Result<u64, ClientError> {
        let req = UpdateStatusRequest {
            id: id.to_string(),
            status: status.to_string(),
        };
        self.send_json(Method::PUT, &["updateOrderStatus"], &req)
            .await
    }

    pub async fn delete_order(&self, id: &str) -> Result<DeleteResult, ClientError> {
        self.execute(self.request(Method::DELETE, &["placeorder", id])?)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn add_review(&self, review: &NewReview) -> Result<InsertResult, ClientError> {
        self.send_json(Method::POST, &["addReview"], review).await
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>, ClientError> {
        self.get(&["reviews"]).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        self.execute(self.request(Method::GET, segments)?).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        self.execute(self.request(method, segments)?.json(body))
            .await
    }

    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Path, Query},
        http::StatusCode,
        routing::{get, post},
    };
    use std::collections::HashMap;

    #[test]
    fn test_client_with_trailing_slash() {
        let client = StorefrontClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let client = StorefrontClient::new("http://localhost:5000/api");
        let url = client.url(&["admin", "a b@c.com"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/admin/a%20b@c.com");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = StorefrontClient::new("not a url");
        assert!(matches!(client.url(&["products"]), Err(ClientError::InvalidUrl(_))));
    }

    async fn spawn_mock() -> StorefrontClient {
        let app = Router::new()
            .route("/", get(|| async { "server is running!" }))
            .route(
                "/admin/{email}",
                get(|Path(email): Path<String>| async move {
                    if email == "a@b.com" {
                        Json(serde_json::json!({ "_id": "u1", "email": email, "role": "admin" }))
                    } else {
                        Json(serde_json::Value::Null)
                    }
                }),
            )
            .route(
                "/orders",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let email = q.get("email").cloned().unwrap_or_default();
                    Json(serde_json::json!([
                        { "_id": "o1", "email": email, "product": "X", "status": "Pending", "isPaid": false }
                    ]))
                }),
            )
            .route(
                "/addProduct",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({ "error": "product name cannot be empty", "code": 400 })),
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StorefrontClient::new(format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_health_and_lookups() {
        let client = spawn_mock().await;

        assert_eq!(client.health().await.unwrap(), "server is running!");

        let admin = client.get_user("a@b.com").await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert!(client.get_user("ghost@b.com").await.unwrap().is_none());

        let orders = client.list_orders(Some("a@b.com")).await.unwrap();
        assert_eq!(orders[0].email, "a@b.com");
    }

    #[tokio::test]
    async fn test_api_error_carries_message() {
        let client = spawn_mock().await;
        let product: NewProduct =
            serde_json::from_value(serde_json::json!({ "name": "", "price": 1.0 })).unwrap();

        let err = client.add_product(&product).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api { status: 400, ref message } if message == "product name cannot be empty"
        ));
    }
}
