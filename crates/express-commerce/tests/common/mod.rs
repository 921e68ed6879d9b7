//! Shared fixtures for the storefront scenario tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use express_cache::Cache;
use express_commerce::catalog::PRODUCTS;
use express_commerce::coupon::COUPONS;
use express_commerce::prelude::*;
use express_db::{
    Db, DbError, DbResult, Document, DocumentBackend, DocumentRef, MemoryBackend, Precondition,
};

pub fn inr(units: i64) -> Money {
    Money::new(units, Currency::INR)
}

pub fn rupees(amount: i64) -> Money {
    inr(amount * 100)
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

pub fn customer() -> Customer {
    Customer {
        name: "Asha Rao".into(),
        email: "asha@example.com".into(),
        phone: "9876543210".into(),
        address: "12 MG Road, Bengaluru".into(),
    }
}

pub fn product(id: &str, price_rupees: i64, stock: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: id.to_string(),
        description: String::new(),
        price: rupees(price_rupees + 20),
        selling_price: rupees(price_rupees),
        stock,
        image_ref: format!("https://img.example/{}.png", id),
        visible: true,
    }
}

pub fn coupon(code: &str, discount: DiscountValue, min_rupees: i64) -> Coupon {
    Coupon {
        code: code.to_string(),
        discount,
        min_cart_value: rupees(min_rupees),
        expiry: start_time() + Duration::days(30),
        active: true,
    }
}

/// A storefront over in-memory stores with a scripted gateway.
pub struct Storefront {
    pub db: Db,
    pub cache: Cache,
    pub gateway: Arc<ScriptedGateway>,
    pub clock: Arc<FixedClock>,
    pub config: CommerceConfig,
}

impl Storefront {
    pub async fn new() -> Self {
        Self::with_backend(MemoryBackend::new()).await
    }

    pub async fn with_backend(backend: impl DocumentBackend + 'static) -> Self {
        let mut config = CommerceConfig::default();
        config.gateway.key = "rzp_test_key".into();
        Self {
            db: Db::new(backend),
            cache: Cache::new(express_cache::MemoryBackend::new()),
            gateway: Arc::new(ScriptedGateway::new(GatewayScript::Hold)),
            clock: Arc::new(FixedClock::new(start_time())),
            config,
        }
    }

    pub async fn seed_product(&self, product: &Product) {
        Catalog::new(self.db.clone()).upsert(product).await.unwrap();
    }

    pub async fn seed_coupon(&self, coupon: &Coupon) {
        self.db.set_as(COUPONS, &coupon.code, coupon).await.unwrap();
    }

    pub async fn product(&self, id: &str) -> Product {
        Catalog::new(self.db.clone())
            .product(&ProductId::new(id))
            .await
            .unwrap()
    }

    pub async fn stock(&self, id: &str) -> i64 {
        self.product(id).await.stock
    }

    pub async fn set_stock(&self, id: &str, stock: i64) {
        self.db
            .update(PRODUCTS, id, express_db::fields! { "stock" => stock })
            .await
            .unwrap();
    }

    pub fn cart(&self) -> CartStore {
        CartStore::open(
            self.cache.clone(),
            &self.config.storage.namespace,
            self.config.pricing_policy(),
        )
        .unwrap()
    }

    pub fn coupons(&self) -> CouponValidator {
        CouponValidator::new(self.db.clone(), self.clock.clone())
    }

    pub fn checkout(&self) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            self.db.clone(),
            self.gateway.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    pub fn orders(&self) -> OrderRecords {
        OrderRecords::new(self.db.clone())
    }
}

/// Backend that refuses writes to one collection.
#[derive(Debug, Default)]
pub struct ReadOnlyCollection {
    pub inner: MemoryBackend,
    pub collection: &'static str,
}

impl ReadOnlyCollection {
    pub fn new(collection: &'static str) -> Self {
        Self {
            inner: MemoryBackend::new(),
            collection,
        }
    }

    fn check(&self, collection: &str) -> DbResult<()> {
        if collection == self.collection {
            Err(DbError::Unavailable(format!("{} is read-only", collection)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentBackend for ReadOnlyCollection {
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>> {
        self.inner.list(collection).await
    }

    async fn add(&self, collection: &str, document: Document) -> DbResult<DocumentRef> {
        self.check(collection)?;
        self.inner.add(collection, document).await
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> DbResult<()> {
        // Seeding goes through `set`, so it stays open.
        self.inner.set(collection, id, document).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> DbResult<()> {
        self.check(collection)?;
        self.inner.update(collection, id, fields).await
    }

    async fn update_if(
        &self,
        collection: &str,
        id: &str,
        precondition: &Precondition,
        fields: Document,
    ) -> DbResult<bool> {
        self.check(collection)?;
        self.inner.update_if(collection, id, precondition, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        self.check(collection)?;
        self.inner.delete(collection, id).await
    }
}

/// Backend whose every call fails, as if the store were unreachable.
#[derive(Debug, Default)]
pub struct Offline;

#[async_trait]
impl DocumentBackend for Offline {
    async fn get(&self, _: &str, _: &str) -> DbResult<Option<Document>> {
        Err(DbError::Unavailable("offline".into()))
    }

    async fn list(&self, _: &str) -> DbResult<Vec<(String, Document)>> {
        Err(DbError::Unavailable("offline".into()))
    }

    async fn add(&self, _: &str, _: Document) -> DbResult<DocumentRef> {
        Err(DbError::Unavailable("offline".into()))
    }

    async fn set(&self, _: &str, _: &str, _: Document) -> DbResult<()> {
        Err(DbError::Unavailable("offline".into()))
    }

    async fn update(&self, _: &str, _: &str, _: Document) -> DbResult<()> {
        Err(DbError::Unavailable("offline".into()))
    }

    async fn update_if(&self, _: &str, _: &str, _: &Precondition, _: Document) -> DbResult<bool> {
        Err(DbError::Unavailable("offline".into()))
    }

    async fn delete(&self, _: &str, _: &str) -> DbResult<()> {
        Err(DbError::Unavailable("offline".into()))
    }
}
