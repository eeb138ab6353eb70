use arangolite_core::{HeaderMap, HttpClient, Method, QueryParams};
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::{context, Result};

/// Relation between vertex collections via one edge collection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub collection: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateGraphOptions {
    pub name: String,
    #[serde(rename = "edgeDefinitions", skip_serializing_if = "Vec::is_empty")]
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(rename = "orphanCollections", skip_serializing_if = "Vec::is_empty")]
    pub orphan_collections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GraphInfo {
    pub name: String,
    #[serde(default, rename = "edgeDefinitions")]
    pub edge_definitions: Vec<EdgeDefinition>,
    #[serde(default, rename = "orphanCollections")]
    pub orphan_collections: Vec<String>,
    #[serde(default, rename = "_rev")]
    pub rev: String,
}

#[derive(Deserialize)]
struct GraphBody {
    graph: GraphInfo,
    #[serde(default)]
    code: u16,
}

#[derive(Deserialize)]
struct RemovedBody {
    #[serde(default)]
    removed: bool,
    #[serde(default)]
    code: u16,
}

impl<C: HttpClient> Client<C> {
    /// Create a named graph; returns the stored definition and the envelope code.
    pub async fn create_graph(&self, db: &str, options: &CreateGraphOptions) -> Result<(GraphInfo, u16)> {
        const OP: &str = "create graph";
        let path = self.path(db, "/_api/gharial", &[], &QueryParams::new());
        let body = self
            .call::<_, GraphBody>(OP, Method::POST, &path, &HeaderMap::new(), Some(options))
            .await?
            .decoded()
            .map_err(context(OP))?;
        Ok((body.graph, body.code))
    }

    pub async fn drop_graph(&self, db: &str, name: &str, drop_collections: Option<bool>) -> Result<(bool, u16)> {
        const OP: &str = "drop graph";
        let mut query = QueryParams::new();
        query.set_bool("dropCollections", drop_collections);
        let path = self.path(db, "/_api/gharial/{}", &[name], &query);
        removed(self, OP, &path, &HeaderMap::new()).await
    }
}

/// `DELETE` answered by `{"removed": bool, "code": ...}`
pub(crate) async fn removed<C: HttpClient>(
    client: &Client<C>,
    operation: &'static str,
    path: &str,
    headers: &HeaderMap,
) -> Result<(bool, u16)> {
    let body = client
        .call::<(), RemovedBody>(operation, Method::DELETE, path, headers, None)
        .await?
        .decoded()
        .map_err(context(operation))?;
    Ok((body.removed, body.code))
}
