//! StoreService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use storefront_types::{
        AdminRequest, AppError, Charge, ChargeRequest, CheckoutRequest, CheckoutStatus,
        Collection, CustomerId, DeleteResult, Document, DocumentStore, Filter, ID_FIELD,
        InsertResult, NewCustomer, NewProduct, NewReview, NewUser, OrderIdRequest, PaymentError,
        PaymentGateway, PlaceOrderRequest, ProductUpdate, RecordId, RepoError, UpdateResult,
        UpdateStatusRequest,
    };

    use crate::StoreService;

    /// Simple in-memory document store for testing the service layer.
    #[derive(Default)]
    pub struct MockStore {
        docs: Mutex<Vec<(Collection, RecordId, Document)>>,
        next_id: Mutex<u64>,
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn insert_one(
            &self,
            collection: Collection,
            mut doc: Document,
        ) -> Result<InsertResult, RepoError> {
            doc.remove(ID_FIELD);
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let id = RecordId::new(format!("doc{}", next));
            self.docs
                .lock()
                .unwrap()
                .push((collection, id.clone(), doc));
            Ok(InsertResult { inserted_id: id })
        }

        async fn find_one(
            &self,
            collection: Collection,
            filter: Filter,
        ) -> Result<Option<Document>, RepoError> {
            Ok(self.find(collection, Some(filter)).await?.into_iter().next())
        }

        async fn find(
            &self,
            collection: Collection,
            filter: Option<Filter>,
        ) -> Result<Vec<Document>, RepoError> {
            if let Some(Filter::Id(id)) = &filter {
                if id.as_str() == "malformed" {
                    return Err(RepoError::InvalidId(id.to_string()));
                }
            }
            Ok(self
                .docs
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, id, doc)| {
                    *c == collection && filter.as_ref().is_none_or(|f| f.matches(id, doc))
                })
                .map(|(_, id, doc)| {
                    let mut doc = doc.clone();
                    doc.insert(ID_FIELD.into(), json!(id.as_str()));
                    doc
                })
                .collect())
        }

        async fn update_one(
            &self,
            collection: Collection,
            filter: Filter,
            mut set: Document,
        ) -> Result<UpdateResult, RepoError> {
            set.remove(ID_FIELD);
            let mut docs = self.docs.lock().unwrap();
            let Some((_, _, doc)) = docs
                .iter_mut()
                .find(|(c, id, doc)| *c == collection && filter.matches(id, doc))
            else {
                return Ok(UpdateResult::default());
            };

            let mut modified = 0;
            for (key, value) in set {
                if doc.get(&key) != Some(&value) {
                    doc.insert(key, value);
                    modified = 1;
                }
            }
            Ok(UpdateResult {
                matched_count: 1,
                modified_count: modified,
            })
        }

        async fn delete_one(
            &self,
            collection: Collection,
            id: RecordId,
        ) -> Result<DeleteResult, RepoError> {
            let mut docs = self.docs.lock().unwrap();
            let before = docs.len();
            docs.retain(|(c, doc_id, _)| !(*c == collection && *doc_id == id));
            Ok(DeleteResult {
                deleted_count: (before - docs.len()) as u64,
            })
        }
    }

    /// Payment gateway that records every call and fails on demand.
    #[derive(Default)]
    pub struct RecordingGateway {
        pub customers: Mutex<Vec<NewCustomer>>,
        pub charges: Mutex<Vec<(ChargeRequest, String)>>,
        pub decline_customer: bool,
        pub decline_charge: bool,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_customer(&self, req: NewCustomer) -> Result<CustomerId, PaymentError> {
            self.customers.lock().unwrap().push(req);
            if self.decline_customer {
                return Err(PaymentError::Declined {
                    message: "Your card was declined.".into(),
                    code: Some("card_declined".into()),
                });
            }
            Ok(CustomerId::new("cus_test"))
        }

        async fn create_charge(
            &self,
            req: ChargeRequest,
            idempotency_key: &str,
        ) -> Result<Charge, PaymentError> {
            let amount = req.amount;
            self.charges
                .lock()
                .unwrap()
                .push((req, idempotency_key.to_string()));
            if self.decline_charge {
                return Err(PaymentError::Api {
                    status: 500,
                    message: "processor unavailable".into(),
                });
            }
            Ok(Charge {
                id: "ch_test".into(),
                amount,
                currency: "usd".into(),
                status: "succeeded".into(),
                paid: true,
            })
        }
    }

    fn service() -> StoreService<MockStore, RecordingGateway> {
        StoreService::new(MockStore::default(), RecordingGateway::default())
    }

    fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn checkout_request(price: f64) -> CheckoutRequest {
        from_json(json!({
            "product": { "name": "Keyboard", "price": price },
            "token": {
                "id": "tok_visa",
                "email": "a@b.com",
                "card": {
                    "name": "Ada",
                    "address_line1": "221B Baker Street",
                    "address_city": "London",
                    "address_country": "GB",
                    "address_zip": "NW1"
                }
            }
        }))
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(service().health(), "server is running!");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_checkout_creates_customer_then_charge() {
        let service = service();

        let response = service.checkout(checkout_request(49.99)).await;

        assert_eq!(response.status, CheckoutStatus::Success);
        assert_eq!(response.error, None);

        let customers = service.payments().customers.lock().unwrap();
        assert_eq!(customers[0].email, "a@b.com");
        assert_eq!(customers[0].source, "tok_visa");

        let charges = service.payments().charges.lock().unwrap();
        let (charge, key) = &charges[0];
        assert_eq!(charge.amount, 4999);
        assert_eq!(charge.currency, "usd");
        assert_eq!(charge.customer.as_str(), "cus_test");
        assert_eq!(charge.receipt_email, "a@b.com");
        assert_eq!(charge.description, "Purchased the Keyboard");
        assert_eq!(charge.shipping.name.as_deref(), Some("Ada"));
        assert_eq!(charge.shipping.address.line1.as_deref(), Some("221B Baker Street"));
        assert_eq!(charge.shipping.address.postal_code.as_deref(), Some("NW1"));
        assert_eq!(charge.shipping.address.line2, None);
        assert!(uuid::Uuid::parse_str(key).is_ok());
    }

    #[tokio::test]
    async fn test_identical_checkouts_use_distinct_idempotency_keys() {
        let service = service();

        service.checkout(checkout_request(10.0)).await;
        service.checkout(checkout_request(10.0)).await;

        let charges = service.payments().charges.lock().unwrap();
        assert_eq!(charges.len(), 2);
        assert_ne!(charges[0].1, charges[1].1);
    }

    #[tokio::test]
    async fn test_declined_customer_reports_failure_without_charging() {
        let service = StoreService::new(
            MockStore::default(),
            RecordingGateway {
                decline_customer: true,
                ..Default::default()
            },
        );

        let response = service.checkout(checkout_request(10.0)).await;

        assert_eq!(response.status, CheckoutStatus::Failure);
        assert!(response.error.unwrap().contains("declined"));
        assert!(service.payments().charges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_charge_reports_failure() {
        let service = StoreService::new(
            MockStore::default(),
            RecordingGateway {
                decline_charge: true,
                ..Default::default()
            },
        );

        let response = service.checkout(checkout_request(10.0)).await;

        assert_eq!(response.status, CheckoutStatus::Failure);
        assert!(response.error.unwrap().contains("processor unavailable"));
    }

    #[tokio::test]
    async fn test_invalid_checkout_never_reaches_the_processor() {
        let service = service();

        let negative = service.checkout(checkout_request(-1.0)).await;
        let mut no_token = checkout_request(10.0);
        no_token.token.id = String::new();
        let no_token = service.checkout(no_token).await;

        assert_eq!(negative.status, CheckoutStatus::Failure);
        assert_eq!(no_token.status, CheckoutStatus::Failure);
        assert!(service.payments().customers.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_order_paid_twice() {
        let service = service();
        let order = service
            .place_order(from_json(json!({ "email": "a@b.com", "product": "X" })))
            .await
            .unwrap();
        let req = OrderIdRequest {
            id: order.inserted_id.to_string(),
        };

        let first = service.mark_order_paid(req.clone()).await.unwrap();
        let second = service.mark_order_paid(req).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 0);
        let orders = service.list_orders(None).await.unwrap();
        assert!(orders[0].is_paid);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_register_and_promote_user() {
        let service = service();
        service
            .register_user(from_json::<NewUser>(json!({
                "email": "a@b.com",
                "displayName": "Ada"
            })))
            .await
            .unwrap();

        let promoted = service
            .promote_admin(AdminRequest {
                email: "a@b.com".into(),
            })
            .await
            .unwrap();
        let user = service.get_user_by_email("a@b.com").await.unwrap().unwrap();

        assert_eq!((promoted.matched_count, promoted.modified_count), (1, 1));
        assert!(user.is_admin());
        assert_eq!(user.extra["displayName"], json!("Ada"));
    }

    #[tokio::test]
    async fn test_emails_match_exactly_as_registered() {
        let service = service();
        service
            .register_user(from_json::<NewUser>(json!({ "email": "a@b.com " })))
            .await
            .unwrap();

        let trimmed = service
            .promote_admin(AdminRequest {
                email: "a@b.com".into(),
            })
            .await
            .unwrap();
        let padded = service
            .promote_admin(AdminRequest {
                email: "a@b.com ".into(),
            })
            .await
            .unwrap();

        assert_eq!((trimmed.matched_count, trimmed.modified_count), (0, 0));
        assert_eq!((padded.matched_count, padded.modified_count), (1, 1));
        assert!(service.get_user_by_email("a@b.com ").await.unwrap().unwrap().is_admin());

        service
            .place_order(from_json(json!({ "email": "a@b.com ", "product": "X" })))
            .await
            .unwrap();
        assert_eq!(service.list_orders(Some("a@b.com ")).await.unwrap().len(), 1);
        assert_eq!(service.list_orders(Some("   ")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let service = service();

        assert!(service.get_user_by_email("ghost@b.com").await.unwrap().is_none());

        let promoted = service
            .promote_admin(AdminRequest {
                email: "ghost@b.com".into(),
            })
            .await
            .unwrap();
        assert_eq!(promoted, UpdateResult::default());
    }

    #[tokio::test]
    async fn test_register_user_rejects_bad_email() {
        let service = service();

        let err = service
            .register_user(from_json::<NewUser>(json!({ "email": "not-an-email" })))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_off_convention_documents_are_listed() {
        let service = service();
        let seed = |value: serde_json::Value| match value {
            serde_json::Value::Object(doc) => doc,
            _ => unreachable!(),
        };
        service
            .store()
            .insert_one(
                Collection::Products,
                seed(json!({ "name": "Old", "price": "49.99" })),
            )
            .await
            .unwrap();
        service
            .store()
            .insert_one(
                Collection::Orders,
                seed(json!({ "email": "a@b.com", "product": "X", "status": null })),
            )
            .await
            .unwrap();

        let products = service.list_products().await.unwrap();
        let orders = service.list_orders(Some("a@b.com")).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 49.99);
        assert_eq!(orders.len(), 1);
        assert!(orders[0].is_pending());
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let service = service();

        let added = service
            .add_product(from_json::<NewProduct>(json!({
                "name": "Mouse",
                "price": 19.5,
                "brand": "Acme"
            })))
            .await
            .unwrap();
        let id = added.inserted_id.clone();

        let updated = service
            .update_product(
                id.clone(),
                from_json::<ProductUpdate>(json!({ "_id": "forged", "price": 17 })),
            )
            .await
            .unwrap();
        let product = service.get_product(id.clone()).await.unwrap().unwrap();

        assert_eq!((updated.matched_count, updated.modified_count), (1, 1));
        assert_eq!(product.id, id);
        assert_eq!(product.price, 17.0);
        assert_eq!(product.details["brand"], json!("Acme"));

        let deleted = service.delete_product(id.clone()).await.unwrap();
        assert_eq!(deleted.deleted_count, 1);
        assert!(service.get_product(id).await.unwrap().is_none());
        assert!(service.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_product_validation() {
        let service = service();

        let err = service
            .add_product(from_json::<NewProduct>(json!({ "name": " ", "price": 1.0 })))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(service.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let service = service();

        let err = service
            .get_product(RecordId::new("malformed"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_place_order_discards_client_id_and_status() {
        let service = service();

        let result = service
            .place_order(from_json::<PlaceOrderRequest>(json!({
                "_id": "client123",
                "email": "a@b.com",
                "product": "X",
                "status": "Delivered",
                "isPaid": true
            })))
            .await
            .unwrap();

        let orders = service.list_orders(Some("a@b.com")).await.unwrap();
        assert_ne!(result.inserted_id.as_str(), "client123");
        assert_eq!(orders[0].id, result.inserted_id);
        assert!(orders[0].is_pending());
        assert!(!orders[0].is_paid);
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_email() {
        let service = service();
        for email in ["a@b.com", "c@d.com", "a@b.com"] {
            service
                .place_order(from_json(json!({ "email": email, "product": "X" })))
                .await
                .unwrap();
        }

        assert_eq!(service.list_orders(Some("a@b.com")).await.unwrap().len(), 2);
        assert_eq!(service.list_orders(Some("")).await.unwrap().len(), 3);
        assert_eq!(service.list_orders(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_order_status_accepts_any_value() {
        let service = service();
        let order = service
            .place_order(from_json(json!({ "email": "a@b.com", "product": "X" })))
            .await
            .unwrap();

        for status in ["Shipped", "lost in space", ""] {
            let modified = service
                .update_order_status(UpdateStatusRequest {
                    id: order.inserted_id.to_string(),
                    status: status.into(),
                })
                .await
                .unwrap();
            let orders = service.list_orders(None).await.unwrap();

            assert_eq!(modified, 1);
            assert_eq!(orders[0].status, status);
        }
    }

    #[tokio::test]
    async fn test_delete_order() {
        let service = service();
        let order = service
            .place_order(from_json(json!({ "email": "a@b.com", "product": "X" })))
            .await
            .unwrap();

        let first = service.delete_order(order.inserted_id.clone()).await.unwrap();
        let second = service.delete_order(order.inserted_id).await.unwrap();

        assert_eq!(first.deleted_count, 1);
        assert_eq!(second.deleted_count, 0);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reviews
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_reviews() {
        let service = service();

        service
            .add_review(from_json::<NewReview>(json!({
                "name": "Ada",
                "review": "Great keyboard",
                "rating": "5"
            })))
            .await
            .unwrap();

        let reviews = service.list_reviews().await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating(), Some(5.0));
        assert_eq!(reviews[0].fields["review"], json!("Great keyboard"));
    }
}
