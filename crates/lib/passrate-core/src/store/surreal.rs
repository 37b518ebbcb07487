use std::{error::Error, fmt, sync::Arc};

use passrate_store::models::TeacherResult;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

const IN_MEMORY_ADDRESS: &str = "mem://";

#[derive(Debug)]
pub enum StoreError {
    Surreal(Box<surrealdb::Error>),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surreal(err) => write!(f, "SurrealDB error: {err}"),
        }
    }
}

impl Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Surreal(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where the record store lives and how to sign in to it.
#[derive(Clone)]
pub struct StoreEndpoint {
    address: String,
    credentials: Option<(String, String)>,
    namespace: String,
    database: String,
}

impl StoreEndpoint {
    #[must_use]
    pub fn in_memory(namespace: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            address: IN_MEMORY_ADDRESS.to_string(),
            credentials: None,
            namespace: namespace.into(),
            database: database.into(),
        }
    }

    #[must_use]
    pub fn remote(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        namespace: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            address: uri.into(),
            credentials: Some((username.into(), password.into())),
            namespace: namespace.into(),
            database: database.into(),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.address == IN_MEMORY_ADDRESS
    }
}

/// Client for the `teachers` collection.
pub struct SurrealResultStore<C: Connection> {
    db: Arc<Surreal<C>>,
}

impl<C: Connection> Clone for SurrealResultStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl SurrealResultStore<Any> {
    /// Opens the single connection used for the lifetime of the process.
    ///
    /// # Errors
    /// Returns `StoreError` if the connection, sign-in, or namespace selection fails.
    pub async fn open(endpoint: &StoreEndpoint) -> StoreResult<Self> {
        let db = any::connect(endpoint.address.as_str()).await?;
        if let Some((username, password)) = endpoint.credentials.as_ref() {
            db.signin(Root {
                username: username.as_str(),
                password: password.as_str(),
            })
            .await?;
        }
        db.use_ns(endpoint.namespace.as_str())
            .use_db(endpoint.database.as_str())
            .await?;

        info!(
            address = endpoint.address(),
            namespace = endpoint.namespace.as_str(),
            database = endpoint.database.as_str(),
            "record store opened"
        );
        Ok(Self::new(db))
    }
}

impl<C: Connection> SurrealResultStore<C> {
    #[must_use]
    pub fn new(db: Surreal<C>) -> Self {
        Self { db: Arc::new(db) }
    }

    #[must_use]
    pub const fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self { db }
    }

    #[must_use]
    pub fn db(&self) -> &Surreal<C> {
        &self.db
    }

    /// Releases this handle to the connection; the connection itself closes
    /// once the last clone is gone.
    pub fn close(self) {
        let remaining = Arc::strong_count(&self.db).saturating_sub(1);
        drop(self);
        info!(remaining, "record store closed");
    }

    /// Lists every stored record with its identifier, in store read order.
    ///
    /// # Errors
    /// Returns `StoreError` if the database query fails.
    pub async fn list_teachers(&self) -> StoreResult<Vec<TeacherResult>> {
        let query = "SELECT *, record::id(id) AS id FROM teachers;";
        let mut response = self.db.query(query).await?;
        let records: Vec<TeacherResult> = response.take(0)?;
        Ok(records)
    }

    /// Writes every record as a new document inside one transaction, so
    /// either all of them land or none do. Identifiers are always fresh.
    ///
    /// # Errors
    /// Returns `StoreError` if the transaction fails; nothing is written then.
    pub async fn insert_teachers(&self, records: Vec<TeacherResult>) -> StoreResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let records: Vec<TeacherResult> = records
            .into_iter()
            .map(|record| TeacherResult { id: None, ..record })
            .collect();
        let count = records.len();
        let query = "BEGIN TRANSACTION; INSERT INTO teachers $records; COMMIT TRANSACTION;";
        self.db
            .query(query)
            .bind(("records", records))
            .await?
            .check()?;
        Ok(count)
    }
}
