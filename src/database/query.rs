use derive_new::new;
use serde::de::DeserializeOwned;
use snafu::ResultExt as _;
use surrealdb::opt::QueryResult;

use super::{DeserializeSnafu, IntoDatabase, QuerySnafu, Result};

/// An extension trait for executing raw SurrealQL queries. Parameters can be
/// bound with the [Bindings::bind] method, which takes any serializable value.
///
/// # Example
/// ```ignore
/// let videos: Vec<Video> = database
///     .sql("SELECT * FROM videos WHERE owner = $owner")
///     .bind(("owner", &owner))
///     .fetch()
///     .await?;
/// ```
pub trait Sql<'a> {
    fn sql(&'a self, query: &str) -> Bindings<'a>;
}

impl<'a, D> Sql<'a> for D
where
    D: IntoDatabase,
{
    fn sql(&'a self, query: &str) -> Bindings<'a> {
        let query = self.into_database().query(query);
        Bindings::new(query)
    }
}

#[derive(Debug, new)]
pub struct Bindings<'a> {
    query: surrealdb::method::Query<'a, surrealdb::engine::any::Any>,
}

impl Bindings<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    /// Execute the query and return the raw [surrealdb::Response]. Every
    /// statement in the query is checked for errors, so a failure anywhere in
    /// a multi-statement transaction surfaces here.
    pub async fn execute(self) -> Result<surrealdb::Response> {
        let response = self.query.await.context(QuerySnafu)?;
        let response = response.check().context(QuerySnafu)?;
        tracing::trace!(?response, "executed query");
        Ok(response)
    }

    /// Execute the query and deserialize the first statement's result.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T>
    where
        usize: QueryResult<T>,
    {
        let mut response = self.execute().await?;
        response.take(0).context(DeserializeSnafu)
    }
}
