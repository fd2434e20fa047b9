//! Storefront Application Service
//!
//! Orchestrates every storefront operation through the document store and
//! payment ports. Contains NO infrastructure logic - pure orchestration.

use storefront_types::{
    ADMIN_ROLE, Address, AdminRequest, AppError, ChargeRequest, CheckoutRequest, CheckoutResponse,
    Collection, DeleteResult, Document, DocumentStore, Filter, InsertResult, NewCustomer,
    NewProduct, NewReview, NewUser, Order, OrderIdRequest, PaymentGateway, PlaceOrderRequest,
    Product, ProductUpdate, Record, RecordId, Review, Shipping, UpdateResult, UpdateStatusRequest,
    User,
};
use uuid::Uuid;

/// Text answered by the health check.
pub const HEALTH_MESSAGE: &str = "server is running!";

/// Currency every checkout is charged in.
pub const CHECKOUT_CURRENCY: &str = "usd";

/// Application service for storefront operations.
///
/// Generic over `S: DocumentStore` and `P: PaymentGateway` - both adapters are
/// injected once at startup. Tests swap in in-memory mocks.
pub struct StoreService<S: DocumentStore, P: PaymentGateway> {
    store: S,
    payments: P,
}

fn set_field(field: &str, value: impl Into<serde_json::Value>) -> Document {
    let mut set = Document::new();
    set.insert(field.to_string(), value.into());
    set
}

impl<S: DocumentStore, P: PaymentGateway> StoreService<S, P> {
    /// Creates a new service over the given store and payment gateway.
    pub fn new(store: S, payments: P) -> Self {
        Self { store, payments }
    }

    /// Returns a reference to the underlying document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the underlying payment gateway.
    pub fn payments(&self) -> &P {
        &self.payments
    }

    pub fn health(&self) -> &'static str {
        HEALTH_MESSAGE
    }

    async fn find_record<T: Record>(&self, filter: Filter) -> Result<Option<T>, AppError> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(T::from_document)
            .transpose()
            .map_err(Into::into)
    }

    /// Documents that cannot be decoded at all are logged and left out.
    async fn list_records<T: Record>(&self, filter: Option<Filter>) -> Result<Vec<T>, AppError> {
        let docs = self.store.find(T::COLLECTION, filter).await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| match T::from_document(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(collection = %T::COLLECTION, error = %e, "Skipping undecodable document");
                    None
                }
            })
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    /// Charges the buyer for one product.
    ///
    /// Never fails: any validation or processor error is reported in the
    /// response body with a `failure` status.
    #[tracing::instrument(skip(self, req), fields(product = %req.product.name, email = %req.token.email))]
    pub async fn checkout(&self, req: CheckoutRequest) -> CheckoutResponse {
        match self.try_checkout(req).await {
            Ok(charge_id) => {
                tracing::info!(%charge_id, "Checkout succeeded");
                CheckoutResponse::success()
            }
            Err(message) => {
                tracing::warn!(error = %message, "Checkout failed");
                CheckoutResponse::failure(message)
            }
        }
    }

    async fn try_checkout(&self, req: CheckoutRequest) -> Result<String, String> {
        req.validate().map_err(|e| e.to_string())?;
        let amount = req.amount_minor();
        let CheckoutRequest { product, token } = req;

        let customer = self
            .payments
            .create_customer(NewCustomer {
                email: token.email.clone(),
                source: token.id,
            })
            .await
            .map_err(|e| e.to_string())?;

        let idempotency_key = Uuid::new_v4().to_string();
        tracing::debug!(%idempotency_key, %customer, "Creating charge");

        let card = token.card;
        let charge = self
            .payments
            .create_charge(
                ChargeRequest {
                    amount,
                    currency: CHECKOUT_CURRENCY.to_string(),
                    customer,
                    receipt_email: token.email,
                    description: format!("Purchased the {}", product.name),
                    shipping: Shipping {
                        name: card.name,
                        address: Address {
                            line1: card.address_line1,
                            line2: card.address_line2,
                            city: card.address_city,
                            country: card.address_country,
                            postal_code: card.address_zip,
                        },
                    },
                },
                &idempotency_key,
            )
            .await
            .map_err(|e| e.to_string())?;

        Ok(charge.id)
    }

    /// Marks an order as paid and returns how many orders changed.
    #[tracing::instrument(skip(self), fields(order_id = %req.id))]
    pub async fn mark_order_paid(&self, req: OrderIdRequest) -> Result<u64, AppError> {
        let result = self
            .store
            .update_one(
                Collection::Orders,
                Filter::id(req.id),
                set_field("isPaid", true),
            )
            .await?;
        Ok(result.modified_count)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn register_user(&self, req: NewUser) -> Result<InsertResult, AppError> {
        req.validate()?;
        let result = self
            .store
            .insert_one(Collection::Users, req.into_document())
            .await?;
        tracing::info!(user_id = %result.inserted_id, "User registered");
        Ok(result)
    }

    /// First user registered with this email, if any.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_record(Filter::eq("email", email)).await
    }

    /// Sets the admin role on the first user with the given email.
    ///
    /// Emails are matched exactly as they were registered.
    pub async fn promote_admin(&self, req: AdminRequest) -> Result<UpdateResult, AppError> {
        req.validate()?;
        let result = self
            .store
            .update_one(
                Collection::Users,
                Filter::eq("email", req.email.as_str()),
                set_field("role", ADMIN_ROLE),
            )
            .await?;
        if result.matched_count == 0 {
            tracing::warn!(email = %req.email, "No user to promote");
        }
        Ok(result)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.list_records(None).await
    }

    pub async fn get_product(&self, id: RecordId) -> Result<Option<Product>, AppError> {
        self.find_record(Filter::Id(id)).await
    }

    pub async fn add_product(&self, req: NewProduct) -> Result<InsertResult, AppError> {
        req.validate()?;
        self.store
            .insert_one(Collection::Products, req.into_document())
            .await
            .map_err(Into::into)
    }

    /// Replaces the given fields of a product; the identifier never changes.
    pub async fn update_product(
        &self,
        id: RecordId,
        update: ProductUpdate,
    ) -> Result<UpdateResult, AppError> {
        update.validate()?;
        self.store
            .update_one(Collection::Products, Filter::Id(id), update.into_set())
            .await
            .map_err(Into::into)
    }

    pub async fn delete_product(&self, id: RecordId) -> Result<DeleteResult, AppError> {
        self.store
            .delete_one(Collection::Products, id)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────────

    /// Places an order. It always starts pending and unpaid.
    pub async fn place_order(&self, req: PlaceOrderRequest) -> Result<InsertResult, AppError> {
        req.validate()?;
        let result = self
            .store
            .insert_one(Collection::Orders, req.into_document())
            .await?;
        tracing::info!(order_id = %result.inserted_id, "Order placed");
        Ok(result)
    }

    /// Lists orders, only those placed with `email` when one is given.
    /// A blank email counts as no filter.
    pub async fn list_orders(&self, email: Option<&str>) -> Result<Vec<Order>, AppError> {
        let filter = email
            .filter(|e| !e.trim().is_empty())
            .map(|e| Filter::eq("email", e));
        self.list_records(filter).await
    }

    /// Sets an order's status to any value and returns how many orders changed.
    pub async fn update_order_status(&self, req: UpdateStatusRequest) -> Result<u64, AppError> {
        let result = self
            .store
            .update_one(
                Collection::Orders,
                Filter::id(req.id),
                set_field("status", req.status),
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn delete_order(&self, id: RecordId) -> Result<DeleteResult, AppError> {
        self.store
            .delete_one(Collection::Orders, id)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn add_review(&self, req: NewReview) -> Result<InsertResult, AppError> {
        self.store
            .insert_one(Collection::Reviews, req.into_document())
            .await
            .map_err(Into::into)
    }

    pub async fn list_reviews(&self) -> Result<Vec<Review>, AppError> {
        self.list_records(None).await
    }
}
