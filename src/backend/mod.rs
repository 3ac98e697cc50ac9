//! Backend Access
//!
//! Every screen and handler talks to the hosted database/auth service through
//! two capabilities:
//!
//! - [`DataSource`]: table reads and writes plus blob uploads
//! - [`AuthProvider`]: sign up, sign in and session lookup
//!
//! Two implementations exist: [`RemoteBackend`] speaks the hosted service's
//! REST dialect, [`FixtureBackend`] keeps seeded rows in memory. Which one is
//! used is decided once, in [`Backend::from_config`].

mod error;
mod fixture;
pub mod records;
mod remote;
mod seed;

pub use error::{AuthError, DataError, DataResult};
pub use fixture::FixtureBackend;
pub use remote::RemoteBackend;
pub use seed::{demo_logins, DEMO_PASSWORD};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::{BackendConfig, BackendMode};

/// A row as exchanged with the backend
pub type Row = serde_json::Map<String, Value>;

/// Tables known to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Profiles,
    Referrals,
    Investments,
    Icds,
    KycRequests,
    BondRequests,
    ReitRequests,
    Invites,
    Users,
    Bonds,
    Notifications,
}

impl Table {
    /// Table name as used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Referrals => "referrals",
            Table::Investments => "investments",
            Table::Icds => "icds",
            Table::KycRequests => "kyc_requests",
            Table::BondRequests => "bond_requests",
            Table::ReitRequests => "reit_requests",
            Table::Invites => "invites",
            Table::Users => "users",
            Table::Bonds => "bonds",
            Table::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// column = value
    Eq(String, Value),
    /// column >= value
    Gte(String, Value),
    /// column <= value
    Lte(String, Value),
    /// Any of the nested filters matches
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(column.into(), value.into())
    }

    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(column.into(), value.into())
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }
}

/// Result ordering
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Builder method: add a filter (filters are AND-ed)
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Builder method: shorthand for an equality filter
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Builder method: order ascending by column
    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: true,
        });
        self
    }

    /// Builder method: order descending by column
    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: false,
        });
        self
    }

    /// Builder method: cap the number of rows
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Table and blob access
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &str;

    /// Check that the backend answers
    async fn health_check(&self) -> DataResult<()>;

    /// Select rows
    async fn list(&self, query: &Query) -> DataResult<Vec<Row>>;

    /// Fetch one row by its `id` column
    async fn get(&self, table: Table, id: &str) -> DataResult<Option<Row>>;

    /// Insert one row and return it as stored
    async fn insert(&self, table: Table, row: Row) -> DataResult<Row>;

    /// Apply `changes` to the row with the given id and return it as stored
    async fn update(&self, table: Table, id: &str, changes: Row) -> DataResult<Row>;

    /// Upload an object into a bucket and return its storage key
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> DataResult<String>;
}

/// Authenticated user as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// Sign up, sign in and session lookup
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and return the new user
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Exchange credentials for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Resolve a session token to its user. `Ok(None)` for unknown or
    /// expired tokens.
    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError>;
}

/// The backend selected for this process
#[derive(Clone)]
pub struct Backend {
    pub data: Arc<dyn DataSource>,
    pub auth: Arc<dyn AuthProvider>,
    pub mode: BackendMode,
}

impl Backend {
    /// Build the backend named by the configuration
    pub fn from_config(config: &BackendConfig) -> Result<Self, DataError> {
        match config.mode {
            BackendMode::Remote => {
                let remote = Arc::new(RemoteBackend::new(config)?);
                tracing::info!(url = %config.url, "Using remote backend");
                Ok(Self {
                    data: remote.clone(),
                    auth: remote,
                    mode: BackendMode::Remote,
                })
            }
            BackendMode::Fixture => {
                tracing::info!("Using in-memory fixture backend");
                Ok(Self::fixture(Arc::new(FixtureBackend::seeded())))
            }
        }
    }

    /// Wrap a fixture backend
    pub fn fixture(fixture: Arc<FixtureBackend>) -> Self {
        Self {
            data: fixture.clone(),
            auth: fixture,
            mode: BackendMode::Fixture,
        }
    }
}
