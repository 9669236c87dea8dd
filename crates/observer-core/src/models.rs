//! Persisted entities, request payloads and response views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Category stored when a product request omits one.
pub const DEFAULT_PRODUCT_CATEGORY: &str = "None";

// =============================================================================
// USERS
// =============================================================================

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub document: String,
    pub login: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a not-yet-persisted user (id 0) from a request.
    pub fn from_request(request: &UserRequest) -> Self {
        Self::with_id(0, request)
    }

    /// Build the replacement row for an update of `id`.
    pub fn with_id(id: i32, request: &UserRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: request.name.clone(),
            last_name: request.last_name.clone(),
            birthdate: request.birthdate,
            document: request.document.clone(),
            login: request.login.clone(),
            password: request.password.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /users` and `PUT /users/:id`.
///
/// Missing text fields deserialize as empty strings so that validation, not
/// the JSON extractor, reports them. The password never reaches serialized
/// output (request logs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    pub birthdate: NaiveDate,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub login: String,
    #[serde(default, serialize_with = "redact")]
    pub password: String,
}

/// User as returned to clients: everything but the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub document: String,
    pub login: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            last_name: user.last_name,
            birthdate: user.birthdate,
            document: user.document,
            login: user.login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// A row of the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub stock: i32,
    pub production_batch_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_request(request: &ProductRequest) -> Self {
        Self::with_id(0, request)
    }

    pub fn with_id(id: i32, request: &ProductRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: request.name.clone(),
            category: request.category().to_string(),
            description: request.description.clone(),
            stock: request.stock,
            production_batch_date: request.production_batch_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: i32,
    pub production_batch_date: NaiveDate,
}

impl ProductRequest {
    /// Requested category, or [`DEFAULT_PRODUCT_CATEGORY`].
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_PRODUCT_CATEGORY)
    }
}

/// Product as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub stock: i32,
    pub production_batch_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            description: product.description,
            stock: product.stock,
            production_batch_date: product.production_batch_date,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

fn redact<S>(value: &str, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("***")
    }
}
