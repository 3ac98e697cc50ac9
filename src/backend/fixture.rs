//! In-memory Fixture Backend
//!
//! Holds tables, accounts, sessions and uploaded blobs in memory. Used when
//! the remote backend is switched off and by the test suite.
//!
//! Thread-safe via Tokio's async RwLock.

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::{hash_map::Entry, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use super::{
    AuthError, AuthProvider, AuthSession, AuthUser, DataError, DataResult, DataSource, Filter,
    Query, Row, Table,
};

/// Account known to the fixture auth provider
#[derive(Debug, Clone)]
pub(crate) struct FixtureAccount {
    pub id: String,
    pub email: String,
    pub password_digest: String,
}

/// In-memory backend
pub struct FixtureBackend {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
    /// Columns that must be unique besides `id`
    unique: Vec<(Table, &'static str)>,
    accounts: RwLock<HashMap<String, FixtureAccount>>,
    sessions: RwLock<HashMap<String, String>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    /// When set every table call fails as if the backend were down
    offline: AtomicBool,
    /// Number of upcoming `get` calls that miss
    read_lag: AtomicUsize,
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::empty()
    }
}

impl FixtureBackend {
    /// Backend with no rows and no accounts
    pub fn empty() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            unique: vec![(Table::Referrals, "investor_email")],
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            blobs: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
            read_lag: AtomicUsize::new(0),
        }
    }

    /// Backend pre-filled with the demo dataset
    pub fn seeded() -> Self {
        let (tables, accounts) = super::seed::demo_dataset();
        let backend = Self::empty();
        Self {
            tables: RwLock::new(tables),
            accounts: RwLock::new(
                accounts
                    .into_iter()
                    .map(|a| (a.email.clone(), a))
                    .collect(),
            ),
            ..backend
        }
    }

    /// Simulate an unreachable backend
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Make the next `reads` single-row fetches miss, as a lagging replica would
    pub fn with_read_lag(self, reads: usize) -> Self {
        self.read_lag.store(reads, AtomicOrdering::SeqCst);
        self
    }

    /// Register an account and return its id
    pub async fn add_account(&self, email: &str, password: &str) -> String {
        let account = new_account(email, password);
        let id = account.id.clone();
        self.accounts
            .write()
            .await
            .insert(account.email.clone(), account);
        id
    }

    /// Issue a session for an existing account id without credentials
    pub async fn issue_session(&self, user_id: &str) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(token.clone(), user_id.to_string());
        token
    }

    /// Number of rows currently in a table
    pub async fn row_count(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    /// Stored blob by storage key
    pub async fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(key).cloned()
    }

    fn check_online(&self) -> DataResult<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            Err(DataError::Unavailable)
        } else {
            Ok(())
        }
    }

    fn unique_columns(&self, table: Table) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once("id").chain(
            self.unique
                .iter()
                .filter(move |(t, _)| *t == table)
                .map(|(_, column)| *column),
        )
    }
}

fn new_account(email: &str, password: &str) -> FixtureAccount {
    FixtureAccount {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_lowercase(),
        password_digest: password_digest(email, password),
    }
}

pub(crate) fn password_digest(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.to_lowercase().as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Does a row satisfy one filter
fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, Value::Null) => row.get(column).map_or(true, Value::is_null),
        Filter::Eq(column, value) => row
            .get(column)
            .map_or(false, |v| compare(v, value) == Some(Ordering::Equal)),
        Filter::Gte(column, value) => row.get(column).map_or(false, |v| {
            matches!(compare(v, value), Some(Ordering::Greater | Ordering::Equal))
        }),
        Filter::Lte(column, value) => row.get(column).map_or(false, |v| {
            matches!(compare(v, value), Some(Ordering::Less | Ordering::Equal))
        }),
        Filter::Or(inner) => inner.iter().any(|f| matches(row, f)),
    }
}

/// Compare two scalar values of the same kind
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Ordering for `ORDER BY`; nulls and missing values sort last
fn order_rows(a: &Row, b: &Row, column: &str) -> Ordering {
    match (a.get(column), b.get(column)) {
        (Some(x), Some(y)) if !x.is_null() && !y.is_null() => {
            compare(x, y).unwrap_or(Ordering::Equal)
        }
        (Some(x), _) if !x.is_null() => Ordering::Less,
        (_, Some(y)) if !y.is_null() => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DataSource for FixtureBackend {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn health_check(&self) -> DataResult<()> {
        self.check_online()
    }

    async fn list(&self, query: &Query) -> DataResult<Vec<Row>> {
        self.check_online()?;

        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = order_rows(a, b, &order.column);
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn get(&self, table: Table, id: &str) -> DataResult<Option<Row>> {
        self.check_online()?;

        let lagging = self
            .read_lag
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if lagging {
            return Ok(None);
        }

        let tables = self.tables.read().await;
        Ok(tables.get(&table).and_then(|rows| {
            rows.iter()
                .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
                .cloned()
        }))
    }

    async fn insert(&self, table: Table, mut row: Row) -> DataResult<Row> {
        self.check_online()?;

        if !row.contains_key("id") {
            row.insert(
                "id".to_string(),
                Value::from(uuid::Uuid::new_v4().to_string()),
            );
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();

        for column in self.unique_columns(table) {
            let Some(candidate) = row.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            if rows.iter().any(|existing| existing.get(column) == Some(candidate)) {
                return Err(DataError::Conflict {
                    table: table.to_string(),
                    message: format!("duplicate key value violates unique constraint on {}", column),
                });
            }
        }

        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, changes: Row) -> DataResult<Row> {
        self.check_online()?;

        let mut tables = self.tables.write().await;
        let row = tables
            .get_mut(&table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(|| DataError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;

        for (column, value) in changes {
            row.insert(column, value);
        }

        Ok(row.clone())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> DataResult<String> {
        self.check_online()?;

        let key = format!("{}/{}", bucket, path);
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(&key) {
            return Err(DataError::Api {
                status: 409,
                message: format!("object {} already exists", key),
            });
        }
        blobs.insert(key.clone(), bytes);
        Ok(key)
    }
}

#[async_trait]
impl AuthProvider for FixtureBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.check_online()?;

        let email = email.to_lowercase();
        let id = match self.accounts.write().await.entry(email.clone()) {
            Entry::Occupied(_) => return Err(AuthError::EmailTaken(email)),
            Entry::Vacant(slot) => slot.insert(new_account(&email, password)).id.clone(),
        };
        Ok(AuthUser {
            id,
            email: Some(email),
        })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.check_online()?;

        let account = self
            .accounts
            .read()
            .await
            .get(&email.to_lowercase())
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        if account.password_digest != password_digest(email, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issue_session(&account.id).await;
        Ok(AuthSession {
            access_token,
            user: AuthUser {
                id: account.id,
                email: Some(account.email),
            },
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, AuthError> {
        self.check_online()?;

        let Some(user_id) = self.sessions.read().await.get(access_token).cloned() else {
            return Ok(None);
        };

        let email = self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.id == user_id)
            .map(|a| a.email.clone());

        Ok(Some(AuthUser { id: user_id, email }))
    }
}
