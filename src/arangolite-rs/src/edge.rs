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
pub struct CreateEdgeOptions {
    pub wait_for_sync: Option<bool>,
}

impl ToQuery for CreateEdgeOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.set_bool("waitForSync", self.wait_for_sync);
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetEdgeOptions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

impl ConditionalHeaders for GetEdgeOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }

    fn if_none_match(&self) -> Option<&str> {
        self.if_none_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModifyEdgeOptions {
    pub wait_for_sync: Option<bool>,
    pub keep_null: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for ModifyEdgeOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .set_bool("waitForSync", self.wait_for_sync)
            .set_bool("keepNull", self.keep_null);
        query
    }
}

impl ConditionalHeaders for ModifyEdgeOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoveEdgeOptions {
    pub wait_for_sync: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for RemoveEdgeOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.set_bool("waitForSync", self.wait_for_sync);
        query
    }
}

impl ConditionalHeaders for RemoveEdgeOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Deserialize)]
struct EdgeBody<T> {
    edge: T,
    #[serde(default)]
    code: u16,
}

const COLLECTION_PATH: &str = "/_api/gharial/{}/edge/{}";
const EDGE_PATH: &str = "/_api/gharial/{}/edge/{}/{}";

impl<C: HttpClient> Client<C> {
    /// `data` must carry `_from` and `_to`.
    pub async fn create_edge<P: Serialize + ?Sized>(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        data: &P,
        options: Option<&CreateEdgeOptions>,
    ) -> Result<(DocumentMeta, u16)> {
        const OP: &str = "create edge";
        let path = self.path(db, COLLECTION_PATH, &[graph, collection], &query_of(options));
        let body = self
            .call::<_, EdgeBody<DocumentMeta>>(OP, Method::POST, &path, &HeaderMap::new(), Some(data))
            .await?
            .decoded()
            .map_err(context(OP))?;
        Ok((body.edge, body.code))
    }

    /// Fetch an edge into `T`. A matching `if_none_match` yields `(None, 304)`.
    pub async fn get_edge<T: DeserializeOwned>(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        key: &str,
        options: Option<&GetEdgeOptions>,
    ) -> Result<(Option<T>, u16)> {
        const OP: &str = "get edge";
        let path = self.path(db, EDGE_PATH, &[graph, collection, key], &QueryParams::new());
        let headers = conditional_headers(options).map_err(context(OP))?;
        let response = self
            .call::<(), EdgeBody<T>>(OP, Method::GET, &path, &headers, None)
            .await?;
        let status = response.status;
        match response.into_value() {
            Some(body) => Ok((Some(body.edge), body.code)),
            None => Ok((None, status)),
        }
    }

    /// Partially update an edge (`PATCH`).
    pub async fn modify_edge<P: Serialize + ?Sized>(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        key: &str,
        data: &P,
        options: Option<&ModifyEdgeOptions>,
    ) -> Result<(DocumentMeta, u16)> {
        const OP: &str = "modify edge";
        let path = self.path(db, EDGE_PATH, &[graph, collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context(OP))?;
        let body = self
            .call::<_, EdgeBody<DocumentMeta>>(OP, Method::PATCH, &path, &headers, Some(data))
            .await?
            .decoded()
            .map_err(context(OP))?;
        Ok((body.edge, body.code))
    }

    pub async fn remove_edge(
        &self,
        db: &str,
        graph: &str,
        collection: &str,
        key: &str,
        options: Option<&RemoveEdgeOptions>,
    ) -> Result<(bool, u16)> {
        let path = self.path(db, EDGE_PATH, &[graph, collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context("remove edge"))?;
        removed(self, "remove edge", &path, &headers).await
    }
}
