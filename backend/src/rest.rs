//! Row-store requests against the `/rest/v1` endpoints.
//!
//! DESIGN
//! ======
//! A [`Query`] collects the table, column projection, equality filters,
//! ordering, and limit as URL parameters in the service's filter syntax
//! (`column=eq.value`). [`RestClient`] turns a query into one HTTP call and
//! decodes either a single object or a list. Writes request the written row
//! back (`Prefer: return=representation`) so callers get the stored values.

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::{SessionSlot, access_token, read_json};
use crate::config::BackendConfig;
use crate::error::BackendError;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Table or view name plus URL parameters for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl Query {
    #[must_use]
    pub fn table(table: &'static str) -> Self {
        Self { table, params: Vec::new() }
    }

    /// Column projection, including embedded relations (`*,user:users(*)`).
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_owned(), columns.to_owned()));
        self
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params.push(("order".to_owned(), format!("{column}.{direction}")));
        self
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.params.push(("limit".to_owned(), n.to_string()));
        self
    }

    #[must_use]
    pub fn table_name(&self) -> &'static str {
        self.table
    }

    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// A write payload with `updated_at` stamped from the local clock.
#[derive(Serialize)]
pub(crate) struct Stamped<'a, B: Serialize> {
    #[serde(flatten)]
    fields: &'a B,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

pub(crate) fn stamp<B: Serialize>(fields: &B) -> Stamped<'_, B> {
    Stamped { fields, updated_at: OffsetDateTime::now_utc() }
}

/// Client for the row-store endpoints.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: SessionSlot,
}

impl RestClient {
    pub(crate) fn new(http: reqwest::Client, config: &BackendConfig, session: SessionSlot) -> Self {
        Self { http, base_url: config.rest_url(), anon_key: config.anon_key.clone(), session }
    }

    fn request(&self, method: reqwest::Method, query: &Query) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, query.table);
        // Row-level security sees the signed-in user; fall back to the public key.
        let bearer = access_token(&self.session).unwrap_or_else(|| self.anon_key.clone());
        self.http
            .request(method, url)
            .query(&query.params)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Read exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an API error when zero or several rows match.
    pub async fn fetch_one<T: DeserializeOwned>(&self, query: Query) -> Result<T, BackendError> {
        debug!(table = query.table, "fetch one");
        let response = self
            .request(reqwest::Method::GET, &query)
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await?;
        read_json(response).await
    }

    /// Read every matching row.
    ///
    /// # Errors
    ///
    /// Returns the service's message on failure.
    pub async fn fetch_many<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>, BackendError> {
        debug!(table = query.table, "fetch many");
        let response = self.request(reqwest::Method::GET, &query).send().await?;
        read_json(response).await
    }

    /// Patch exactly one row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an API error when the filter does not match exactly one row.
    pub async fn update_one<T, B>(&self, query: Query, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(table = query.table, "update one");
        let response = self
            .request(reqwest::Method::PATCH, &query.select("*"))
            .header("Accept", SINGLE_OBJECT)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    /// Insert one row and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the insert is refused.
    pub async fn insert_one<T, B>(&self, table: &'static str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(table, "insert one");
        let response = self
            .request(reqwest::Method::POST, &Query::table(table).select("*"))
            .header("Accept", SINGLE_OBJECT)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}
