use serde::Deserialize;
use snafu::{Location, ResultExt as _, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;
use url::Url;

/// Helper trait for executing arbitrary SurrealQL queries.
mod query;

/// Typed record ids.
mod record;

pub use query::{Bindings, Sql};
pub use record::{InvalidReference, Record};
pub use surrealdb::sql::Thing;

pub type Result<T, E = DatabaseError> = std::result::Result<T, E>;

/// Table and index definitions, applied on every connect.
const SCHEMA: &str = include_str!("../../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseError {
    #[snafu(display("cannot connect to the database `{url}`: {source}"))]
    Connection {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to query the database at {location}: {source}"))]
    Query {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to deserialize the database response at {location}: {source}"))]
    Deserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

impl DatabaseError {
    /// Whether the underlying failure is a UNIQUE index violation. The toggle
    /// engine treats this as a benign concurrent-toggle signal rather than an
    /// error.
    pub fn is_unique_index_violation(&self) -> bool {
        let source = match self {
            DatabaseError::Connection { source, .. }
            | DatabaseError::Query { source, .. }
            | DatabaseError::Deserialize { source, .. } => source,
        };

        matches!(
            source,
            surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. })
        ) || source.to_string().contains("already contains")
    }
}

/// A record that lives in a fixed table.
pub trait Table {
    /// The id of this record.
    fn id(&self) -> &Thing;

    /// The name of the table this record belongs to.
    fn table() -> &'static str;
}

/// A handle to the backing SurrealDB instance. Cheap to clone; every service
/// holds its own copy.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Surreal<Any>,
}

impl Database {
    /// Connects to an in-memory database, mainly for tests and local runs.
    pub async fn memory() -> Result<Self> {
        let config = DatabaseConfig {
            url: Url::parse("mem://").expect("mem:// is a valid url"),
            namespace: default_namespace(),
            database: default_database(),
            credentials: None,
        };

        connect(&config).await
    }

    async fn apply_schema(&self) -> Result<()> {
        let response = self.inner.query(SCHEMA).await.context(QuerySnafu)?;
        response.check().context(QuerySnafu)?;
        Ok(())
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Types the [Sql] extension trait is implemented for.
pub trait IntoDatabase {
    fn into_database(&self) -> &Surreal<Any>;
}

impl IntoDatabase for Database {
    fn into_database(&self) -> &Surreal<Any> {
        &self.inner
    }
}

impl IntoDatabase for Surreal<Any> {
    fn into_database(&self) -> &Surreal<Any> {
        self
    }
}

pub async fn connect(config: &DatabaseConfig) -> Result<Database> {
    let inner = surrealdb::engine::any::connect(config.url.as_str())
        .await
        .context(ConnectionSnafu {
            url: config.url.clone(),
        })?;

    if let Some(credentials) = &config.credentials {
        inner
            .signin(credentials.auth())
            .await
            .context(ConnectionSnafu {
                url: config.url.clone(),
            })?;
    }

    inner
        .use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .context(ConnectionSnafu {
            url: config.url.clone(),
        })?;

    let database = Database { inner };
    database.apply_schema().await?;

    Ok(database)
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url")]
    url: Url,
    #[serde(rename = "surreal_ns", default = "default_namespace")]
    namespace: String,
    #[serde(rename = "surreal_db", default = "default_database")]
    database: String,
    #[serde(flatten)]
    credentials: Option<DatabaseCredentials>,
}

fn default_namespace() -> String {
    "kawauso".to_string()
}

fn default_database() -> String {
    "kawauso".to_string()
}

#[derive(Debug, Deserialize, Clone)]
struct DatabaseCredentials {
    #[serde(rename = "surreal_user")]
    username: String,
    #[serde(rename = "surreal_pass")]
    password: String,
}

impl DatabaseCredentials {
    fn auth(&self) -> impl auth::Credentials<auth::Signin, auth::Jwt> + '_ {
        auth::Root {
            username: &self.username,
            password: &self.password,
        }
    }
}
