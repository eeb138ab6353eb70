use arangolite_core::{HeaderMap, HttpClient, Method, QueryParams};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize, Serializer};

use crate::client::{Client, ResultBody};
use crate::{context, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "isSystem")]
    pub is_system: bool,
    #[serde(default)]
    pub status: u32,
    #[serde(default, rename = "type")]
    pub kind: u32,
}

/// Collection kind, sent as the server's numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionType {
    #[default]
    Document,
    Edge,
}

impl CollectionType {
    pub fn code(self) -> u32 {
        match self {
            CollectionType::Document => 2,
            CollectionType::Edge => 3,
        }
    }
}

impl Serialize for CollectionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateCollectionOptions {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CollectionType,
    #[serde(rename = "waitForSync", skip_serializing_if = "Option::is_none")]
    pub wait_for_sync: Option<bool>,
}

impl<C: HttpClient> Client<C> {
    /// Collections of `db`, optionally without system collections
    pub async fn list_collections(&self, db: &str, exclude_system: bool) -> Result<Vec<Collection>> {
        const OP: &str = "list collections";
        let path = self.path(db, "/_api/collection", &[], &QueryParams::new());
        let body = self
            .call::<(), ResultBody<Vec<Collection>>>(OP, Method::GET, &path, &HeaderMap::new(), None)
            .await?
            .decoded()
            .map_err(context(OP))?;

        let mut collections = body.result;
        if exclude_system {
            collections.retain(|c| !c.is_system);
        }
        Ok(collections)
    }

    pub async fn create_collection(&self, db: &str, options: &CreateCollectionOptions) -> Result<Collection> {
        const OP: &str = "create collection";
        let path = self.path(db, "/_api/collection", &[], &QueryParams::new());
        self.call::<_, Collection>(OP, Method::POST, &path, &HeaderMap::new(), Some(options))
            .await?
            .decoded()
            .map_err(context(OP))
    }

    pub async fn drop_collection(&self, db: &str, name: &str) -> Result<()> {
        const OP: &str = "drop collection";
        let path = self.path(db, "/_api/collection/{}", &[name], &QueryParams::new());
        self.call::<(), IgnoredAny>(OP, Method::DELETE, &path, &HeaderMap::new(), None)
            .await?;
        Ok(())
    }
}
