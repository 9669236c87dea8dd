//! Shared harness for API integration tests.
//!
//! Spawns the real router on `127.0.0.1:0` backed by in-memory repositories
//! that register the same database steps as the PostgreSQL ones.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use observer_api::{router, AppState};
use observer_core::logging::steps;
use observer_core::{
    BaseLog, Error, LogSink, MemoryLogSink, Product, ProductRepository, RequestContext, Result,
    User, UserRepository,
};

/// Behaviour switches shared by both in-memory repositories.
#[derive(Default)]
pub struct Faults {
    /// Every call fails with an internal error.
    pub fail: AtomicBool,
    /// Inserts report identity 0.
    pub zero_identity: AtomicBool,
}

pub struct InMemoryUsers {
    rows: Mutex<HashMap<i32, User>>,
    next_id: AtomicI32,
    pub calls: AtomicUsize,
    pub faults: Faults,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
            calls: AtomicUsize::new(0),
            faults: Faults::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: i32) -> Option<User> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn enter(&self, ctx: &RequestContext, step: &'static str) -> Result<observer_core::StepTimer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let timer = ctx.base_log()?.start_step(step)?;
        if self.faults.fail.load(Ordering::SeqCst) {
            let err = Error::Internal("connection refused".to_string());
            timer.capture_error(&err);
            return Err(err);
        }
        Ok(timer)
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, ctx: &RequestContext, user: &User) -> Result<i32> {
        let _step = self.enter(ctx, steps::USER_DATABASE_CREATE_DATA)?;
        if self.faults.zero_identity.load(Ordering::SeqCst) {
            return Ok(0);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut row = user.clone();
        row.id = id;
        self.rows.lock().unwrap().insert(id, row);
        Ok(id)
    }

    async fn select(&self, ctx: &RequestContext, id: i32) -> Result<Option<User>> {
        let _step = self.enter(ctx, steps::USER_DATABASE_RETRIEVE_DATA)?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, ctx: &RequestContext, user: &User) -> Result<bool> {
        let _step = self.enter(ctx, steps::USER_DATABASE_UPDATE_DATA)?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<bool> {
        let _step = self.enter(ctx, steps::USER_DATABASE_DELETE_DATA)?;
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

pub struct InMemoryProducts {
    rows: Mutex<HashMap<i32, Product>>,
    next_id: AtomicI32,
    pub calls: AtomicUsize,
    pub faults: Faults,
}

impl InMemoryProducts {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(1),
            calls: AtomicUsize::new(0),
            faults: Faults::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: i32) -> Option<Product> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn enter(&self, ctx: &RequestContext, step: &'static str) -> Result<observer_core::StepTimer> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let timer = ctx.base_log()?.start_step(step)?;
        if self.faults.fail.load(Ordering::SeqCst) {
            let err = Error::Internal("connection refused".to_string());
            timer.capture_error(&err);
            return Err(err);
        }
        Ok(timer)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn insert(&self, ctx: &RequestContext, product: &Product) -> Result<i32> {
        let _step = self.enter(ctx, steps::PRODUCT_DATABASE_CREATE_DATA)?;
        if self.faults.zero_identity.load(Ordering::SeqCst) {
            return Ok(0);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut row = product.clone();
        row.id = id;
        self.rows.lock().unwrap().insert(id, row);
        Ok(id)
    }

    async fn select(&self, ctx: &RequestContext, id: i32) -> Result<Option<Product>> {
        let _step = self.enter(ctx, steps::PRODUCT_DATABASE_RETRIEVE_DATA)?;
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn update(&self, ctx: &RequestContext, product: &Product) -> Result<bool> {
        let _step = self.enter(ctx, steps::PRODUCT_DATABASE_UPDATE_DATA)?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&product.id) {
            Some(row) => {
                *row = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, ctx: &RequestContext, id: i32) -> Result<bool> {
        let _step = self.enter(ctx, steps::PRODUCT_DATABASE_DELETE_DATA)?;
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

/// Sink whose every write fails.
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl LogSink for FailingSink {
    async fn write_log(&self, _log: &BaseLog) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub users: Arc<InMemoryUsers>,
    pub products: Arc<InMemoryProducts>,
    pub sink: MemoryLogSink,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return `(status, body)`.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> (u16, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("request failed");
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub fn records(&self) -> Vec<BaseLog> {
        self.sink.records()
    }

    /// The single request log written for the most recent request.
    pub fn last_record(&self) -> BaseLog {
        self.sink
            .records()
            .pop()
            .expect("no request log was written")
    }
}

/// Spawn the API with in-memory repositories and a memory sink.
pub async fn spawn_app() -> TestApp {
    let sink = MemoryLogSink::new();
    let users = Arc::new(InMemoryUsers::new());
    let products = Arc::new(InMemoryProducts::new());
    let base_url = serve(AppState::new(
        users.clone(),
        products.clone(),
        Arc::new(sink.clone()),
    ))
    .await;

    TestApp {
        base_url,
        client: reqwest::Client::new(),
        users,
        products,
        sink,
    }
}

/// Spawn the router for `state` and return its base URL.
pub async fn serve(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn valid_user_body() -> Value {
    json!({
        "name": "Fulano",
        "lastName": "Blevers",
        "birthdate": "2000-05-15",
        "document": "01234567890",
        "login": "tester",
        "password": "D3f4u1t0"
    })
}

pub fn valid_product_body() -> Value {
    json!({
        "name": "Caneca",
        "category": "Cozinha",
        "description": "Caneca de porcelana 300ml",
        "stock": 12,
        "productionBatchDate": "2024-01-10"
    })
}
