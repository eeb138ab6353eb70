use arangolite_core::{
    conditional_headers, query_of, ConditionalHeaders, HeaderMap, HttpClient, Method, QueryParams, ToQuery,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::document::DocumentMeta;
use crate::graph::removed;
use crate::{context, Result};

#[derive(Debug, Clone, Default)]
pub struct CreateVertexOptions {
    pub wait_for_sync: Option<bool>,
}

impl ToQuery for CreateVertexOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.set_bool("waitForSync", self.wait_for_sync);
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetVertexOptions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

impl ConditionalHeaders for GetVertexOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }

    fn if_none_match(&self) -> Option<&str> {
        self.if_none_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplaceVertexOptions {
    pub wait_for_sync: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for ReplaceVertexOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.set_bool("waitForSync", self.wait_for_sync);
        query
    }
}

impl ConditionalHeaders for ReplaceVertexOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoveVertexOptions {
    pub wait_for_sync: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for RemoveVertexOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.set_bool("waitForSync", self.wait_for_sync);
        query
    }
}

impl ConditionalHeaders for RemoveVertexOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Deserialize)]
struct VertexBody<T> {
    vertex: T,
    #[serde(default)]
    code: u16,
}

const COLLECTION_PATH: &str = "/_api/gharial/{}/vertex/{}";
const VERTEX_PATH: &str = "/_api/gharial/{}/vertex/{}/{}";

impl<C: HttpClient> Client<C> {
    pub async fn create_vertex<P: Serialize + ?Sized>(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        data: &P,
        options: Option<&CreateVertexOptions>,
    ) -> Result<(DocumentMeta, u16)> {
        const OP: &str = "create vertex";
        let path = self.path(db, COLLECTION_PATH, &[graph, collection], &query_of(options));
        let body = self
            .call::<_, VertexBody<DocumentMeta>>(OP, Method::POST, &path, &HeaderMap::new(), Some(data))
            .await?
            .decoded()
            .map_err(context(OP))?;
        Ok((body.vertex, body.code))
    }

    /// Fetch a vertex into `T`. A matching `if_none_match` yields `(None, 304)`.
    pub async fn get_vertex<T: DeserializeOwned>(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        key: &str,
        options: Option<&GetVertexOptions>,
    ) -> Result<(Option<T>, u16)> {
        const OP: &str = "get vertex";
        let path = self.path(db, VERTEX_PATH, &[graph, collection, key], &QueryParams::new());
        let headers = conditional_headers(options).map_err(context(OP))?;
        let response = self
            .call::<(), VertexBody<T>>(OP, Method::GET, &path, &headers, None)
            .await?;
        let status = response.status;
        match response.into_value() {
            Some(body) => Ok((Some(body.vertex), body.code)),
            None => Ok((None, status)),
        }
    }

    pub async fn replace_vertex<P: Serialize + ?Sized>(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        key: &str,
        data: &P,
        options: Option<&ReplaceVertexOptions>,
    ) -> Result<(DocumentMeta, u16)> {
        const OP: &str = "replace vertex";
        let path = self.path(db, VERTEX_PATH, &[graph, collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context(OP))?;
        let body = self
            .call::<_, VertexBody<DocumentMeta>>(OP, Method::PUT, &path, &headers, Some(data))
            .await?
            .decoded()
            .map_err(context(OP))?;
        Ok((body.vertex, body.code))
    }

    pub async fn remove_vertex(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        key: &str,
        options: Option<&RemoveVertexOptions>,
    ) -> Result<(bool, u16)> {
        let path = self.path(db, VERTEX_PATH, &[graph, collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context("remove vertex"))?;
        removed(self, "remove vertex", &path, &headers).await
    }
}
