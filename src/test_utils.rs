//! Shared test utilities for Foodfleet.
//!
//! This module provides helpers for setting up test databases, creating test
//! rows with sensible defaults and driving the HTTP router in-process.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    api::{self, AppState},
    config::settings::{AppConfig, LookupConfig},
    core::{lookup, new_uuid, now},
    entities::{
        company, document_template, event, event_store, menu_item, payment_type, store, tag, team,
        user,
    },
    errors::{Error, Result},
    square::{ListLocations, Location, LocationsApi, SquareError},
    storage::Storage,
};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use serde_json::Value;
use std::{
    ops::Deref,
    sync::{Arc, Mutex},
};
use tempfile::TempDir;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

/// A 1x1 PNG, base64 encoded.
pub const TEST_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn lookup_rows(names: &[&str]) -> Vec<LookupConfig> {
    names
        .iter()
        .zip(1..)
        .map(|(name, id)| LookupConfig {
            id,
            name: (*name).to_string(),
        })
        .collect()
}

/// Lookup rows matching the shipped `config.toml`.
#[must_use]
pub fn test_config() -> AppConfig {
    AppConfig {
        store_statuses: lookup_rows(&["Draft", "Pending", "Approved", "Rejected"]),
        store_types: lookup_rows(&["Food Truck", "Cart", "Stand"]),
        company_types: lookup_rows(&["Supplier", "Customer"]),
        company_statuses: lookup_rows(&["Active", "Inactive"]),
        ..AppConfig::default()
    }
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// Lookup tables are left empty.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Like [`setup_test_db`], with the lookup tables seeded from [`test_config`].
pub async fn setup_seeded_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    lookup::seed_lookups(&db, &test_config()).await?;
    Ok(db)
}

/// Storage rooted in a temporary directory that is removed on drop
pub struct TestStorage {
    storage: Storage,
    _dir: TempDir,
}

impl TestStorage {
    #[must_use]
    pub fn storage(&self) -> Storage {
        self.storage.clone()
    }
}

impl Deref for TestStorage {
    type Target = Storage;

    fn deref(&self) -> &Storage {
        &self.storage
    }
}

/// Storage rooted in a fresh temporary directory.
pub fn test_storage() -> Result<TestStorage> {
    let dir = tempfile::tempdir()?;
    Ok(TestStorage {
        storage: Storage::new(dir.path()),
        _dir: dir,
    })
}

/// A user that is not in the database and belongs to no company.
#[must_use]
pub fn test_user_model() -> user::Model {
    let now = now();
    user::Model {
        id: 0,
        uuid: new_uuid(),
        name: "Visitor".to_string(),
        email: "visitor@example.com".to_string(),
        company_uuid: None,
        api_token: new_uuid(),
        created_at: now,
        updated_at: now,
    }
}

async fn insert_user(
    db: &DatabaseConnection,
    name: &str,
    company_uuid: Option<String>,
) -> Result<user::Model> {
    let now = now();
    user::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        email: Set(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        company_uuid: Set(company_uuid),
        api_token: Set(format!("token-{}", new_uuid())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a user with a random API token and no company.
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<user::Model> {
    insert_user(db, name, None).await
}

/// Creates a user that is a member of `company`.
pub async fn create_test_user_in_company(
    db: &DatabaseConnection,
    name: &str,
    company: &company::Model,
) -> Result<user::Model> {
    insert_user(db, name, Some(company.uuid.clone())).await
}

/// Creates a company with the default status and no type.
pub async fn create_test_company(db: &DatabaseConnection, name: &str) -> Result<company::Model> {
    let now = now();
    company::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        status: Set(crate::core::company::STATUS_ACTIVE),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Makes `admin` the administrator of `company`.
pub async fn set_company_admin(
    db: &DatabaseConnection,
    company: &company::Model,
    admin: &user::Model,
) -> Result<company::Model> {
    let mut active: company::ActiveModel = company.clone().into();
    active.admin_uuid = Set(Some(admin.uuid.clone()));
    active.update(db).await.map_err(Into::into)
}

pub async fn create_test_team(
    db: &DatabaseConnection,
    company: &company::Model,
    name: &str,
) -> Result<team::Model> {
    team::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        company_uuid: Set(company.uuid.clone()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn create_test_tag(db: &DatabaseConnection, name: &str) -> Result<tag::Model> {
    tag::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a Draft store with no owner, supplier or tags.
pub async fn create_test_store(db: &DatabaseConnection, name: &str) -> Result<store::Model> {
    let now = now();
    store::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        status_id: Set(lookup::STORE_STATUS_DRAFT),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn set_store_owner(
    db: &DatabaseConnection,
    store: store::Model,
    owner: &user::Model,
) -> Result<store::Model> {
    let mut active: store::ActiveModel = store.into();
    active.owner_uuid = Set(Some(owner.uuid.clone()));
    active.update(db).await.map_err(Into::into)
}

pub async fn set_store_supplier(
    db: &DatabaseConnection,
    store: store::Model,
    supplier: &company::Model,
) -> Result<store::Model> {
    let mut active: store::ActiveModel = store.into();
    active.supplier_uuid = Set(Some(supplier.uuid.clone()));
    active.update(db).await.map_err(Into::into)
}

pub async fn set_square_token(
    db: &DatabaseConnection,
    store: store::Model,
    token: &str,
) -> Result<store::Model> {
    let mut active: store::ActiveModel = store.into();
    active.square_access_token = Set(Some(token.to_string()));
    active.update(db).await.map_err(Into::into)
}

/// Creates an event with no schedule.
pub async fn create_test_event(db: &DatabaseConnection, name: &str) -> Result<event::Model> {
    let now = now();
    event::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        status_id: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Attaches `store` to `event` with no commission terms.
pub async fn attach_store_to_event(
    db: &DatabaseConnection,
    event: &event::Model,
    store: &store::Model,
) -> Result<event_store::Model> {
    event_store::ActiveModel {
        event_uuid: Set(event.uuid.clone()),
        store_uuid: Set(store.uuid.clone()),
        uuid: Set(new_uuid()),
        commission_rate: Set(None),
        commission_type: Set(None),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn get_event_store(
    db: &DatabaseConnection,
    event: &event::Model,
    store: &store::Model,
) -> Result<event_store::Model> {
    crate::entities::EventStore::find()
        .filter(event_store::Column::EventUuid.eq(event.uuid.as_str()))
        .filter(event_store::Column::StoreUuid.eq(store.uuid.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("event store", store.uuid.clone()))
}

pub async fn create_test_template(
    db: &DatabaseConnection,
    title: &str,
) -> Result<document_template::Model> {
    document_template::ActiveModel {
        uuid: Set(new_uuid()),
        title: Set(title.to_string()),
        description: Set(None),
        content: Set(Some(format!("<h1>{title}</h1>"))),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    store: &store::Model,
    title: &str,
) -> Result<menu_item::Model> {
    let now = now();
    menu_item::ActiveModel {
        uuid: Set(new_uuid()),
        title: Set(title.to_string()),
        servings: Set(Some(1)),
        cost: Set(Some(500)),
        store_uuid: Set(store.uuid.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

pub async fn create_test_payment_type(
    db: &DatabaseConnection,
    name: &str,
    square_id: Option<&str>,
) -> Result<payment_type::Model> {
    let now = now();
    payment_type::ActiveModel {
        uuid: Set(new_uuid()),
        name: Set(name.to_string()),
        square_id: Set(square_id.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

#[derive(Debug, Clone)]
enum FakeOutcome {
    Success(Vec<String>),
    Failure,
    Unreachable,
}

/// In-process stand-in for Square that records the tokens it is called with
#[derive(Debug)]
pub struct FakeSquare {
    outcome: FakeOutcome,
    tokens: Mutex<Vec<String>>,
}

impl FakeSquare {
    const fn with(outcome: FakeOutcome) -> Self {
        Self {
            outcome,
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Answers with one location per name.
    #[must_use]
    pub fn success(names: Vec<&str>) -> Self {
        Self::with(FakeOutcome::Success(
            names.into_iter().map(str::to_string).collect(),
        ))
    }

    /// Answers with a Square error response.
    #[must_use]
    pub const fn failure() -> Self {
        Self::with(FakeOutcome::Failure)
    }

    /// Fails as if Square could not be reached.
    #[must_use]
    pub const fn unreachable() -> Self {
        Self::with(FakeOutcome::Unreachable)
    }

    /// Tokens received so far, in call order.
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocationsApi for FakeSquare {
    async fn list_locations(&self, access_token: &str) -> Result<ListLocations> {
        self.tokens.lock().unwrap().push(access_token.to_string());
        match &self.outcome {
            FakeOutcome::Success(names) => Ok(ListLocations::Success(
                names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Location {
                        id: format!("L{}", i + 1),
                        name: Some(name.clone()),
                        extra: serde_json::Map::new(),
                    })
                    .collect(),
            )),
            FakeOutcome::Failure => Ok(ListLocations::Failure(vec![SquareError {
                category: "AUTHENTICATION_ERROR".to_string(),
                code: "UNAUTHORIZED".to_string(),
                detail: Some("This request could not be authorized.".to_string()),
            }])),
            FakeOutcome::Unreachable => Err(Error::Square {
                message: "connection refused".to_string(),
            }),
        }
    }
}

/// A request built against the router without running a server
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    #[must_use]
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), &format!("Bearer {token}"))
    }

    #[must_use]
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Executes the request against `app`.
    pub async fn send(self, app: Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }
        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = app
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        // 204 responses have no body
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }
}

/// Status and decoded JSON body of a response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Application wired to an in-memory database and an authenticated user
pub struct TestApp {
    pub db: DatabaseConnection,
    pub state: AppState,
    pub user: user::Model,
    _storage: TestStorage,
}

impl TestApp {
    /// Seeded database and a Square stub with no locations.
    pub async fn new() -> Result<Self> {
        Self::with_square(FakeSquare::success(Vec::new())).await
    }

    pub async fn with_square(square: FakeSquare) -> Result<Self> {
        let db = setup_seeded_db().await?;
        let user = create_test_user(&db, "Tester").await?;
        let storage = test_storage()?;
        let state = AppState {
            db: db.clone(),
            config: Arc::new(test_config()),
            storage: storage.storage(),
            square: Arc::new(square),
        };
        Ok(Self {
            db,
            state,
            user,
            _storage: storage,
        })
    }

    #[must_use]
    pub fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    async fn send(&self, request: TestRequest) -> TestResponse {
        request.bearer(&self.user.api_token).send(self.router()).await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(TestRequest::get(uri)).await
    }

    pub async fn post<T: Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send(TestRequest::post(uri).json(body)).await
    }

    pub async fn put<T: Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send(TestRequest::put(uri).json(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(TestRequest::delete(uri)).await
    }
}
