use arangolite_core::{
    Config, HeaderMap, HttpClient, Method, QueryParams, ReqwestClient, Response, Transport,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{context, Result};

/// REST API client
pub struct Client<C = ReqwestClient> {
    transport: Transport<C>,
}

/// Server identification from `GET /_api/version`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    pub server: String,
    pub version: String,
    #[serde(default)]
    pub license: Option<String>,
}

/// `{"result": ...}` wrapper used by the database and collection APIs
#[derive(Deserialize)]
pub(crate) struct ResultBody<T> {
    pub result: T,
}

impl Client {
    /// Create a client over the default `reqwest` transport
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }
}

impl<C: HttpClient> Client<C> {
    /// Create a client over a caller-supplied HTTP implementation
    pub fn with_http_client(config: Config, http: C) -> Result<Self> {
        Ok(Self {
            transport: Transport::with_client(config, http)?,
        })
    }

    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    /// Database used for paths when an operation is given an empty name
    pub fn default_database(&self) -> &str {
        self.transport.database()
    }

    /// Server version
    pub async fn version(&self) -> Result<VersionInfo> {
        let path = self.path("", "/_api/version", &[], &QueryParams::new());
        self.call::<(), VersionInfo>("get server version", Method::GET, &path, &HeaderMap::new(), None)
            .await?
            .decoded()
            .map_err(context("get server version"))
    }

    /// Path for `db`; an empty `db` falls back to the configured database.
    pub(crate) fn path(&self, db: &str, template: &str, params: &[&str], query: &QueryParams) -> String {
        let db = if db.is_empty() { None } else { Some(db) };
        self.transport.path(db, template, params, query)
    }

    pub(crate) async fn call<P, T>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        payload: Option<&P>,
    ) -> Result<Response<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.transport
            .send(method, path, headers, payload)
            .await
            .map_err(context(operation))
    }

    pub(crate) async fn call_discarding<P>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        payload: Option<&P>,
    ) -> Result<Response<()>>
    where
        P: Serialize + ?Sized,
    {
        self.transport
            .send_discarding(method, path, headers, payload)
            .await
            .map_err(context(operation))
    }
}

impl<C> std::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
