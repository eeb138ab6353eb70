use arangolite_core::{
    conditional_headers, query_of, ConditionalHeaders, HeaderMap, HttpClient, Method, QueryParams, ToQuery,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::{context, Result};

/// `_id`, `_key` and `_rev` of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_rev")]
    pub rev: String,
    #[serde(default, rename = "_oldRev", skip_serializing_if = "Option::is_none")]
    pub old_rev: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub return_new: Option<bool>,
}

impl ToQuery for CreateDocumentOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .set_bool("waitForSync", self.wait_for_sync)
            .set_bool("returnNew", self.return_new);
        query
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetDocumentOptions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
}

impl ConditionalHeaders for GetDocumentOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }

    fn if_none_match(&self) -> Option<&str> {
        self.if_none_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub keep_null: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for UpdateDocumentOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .set_bool("waitForSync", self.wait_for_sync)
            .set_bool("keepNull", self.keep_null);
        query
    }
}

impl ConditionalHeaders for UpdateDocumentOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplaceDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for ReplaceDocumentOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.set_bool("waitForSync", self.wait_for_sync);
        query
    }
}

impl ConditionalHeaders for ReplaceDocumentOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeleteDocumentOptions {
    pub wait_for_sync: Option<bool>,
    pub return_old: Option<bool>,
    pub if_match: Option<String>,
}

impl ToQuery for DeleteDocumentOptions {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .set_bool("waitForSync", self.wait_for_sync)
            .set_bool("returnOld", self.return_old);
        query
    }
}

impl ConditionalHeaders for DeleteDocumentOptions {
    fn if_match(&self) -> Option<&str> {
        self.if_match.as_deref()
    }
}

const COLLECTION_PATH: &str = "/_api/document/{}";
const DOCUMENT_PATH: &str = "/_api/document/{}/{}";

/// 304 Not Modified, the answer to a matching `if-none-match`
const NOT_MODIFIED: u16 = 304;

impl<C: HttpClient> Client<C> {
    pub async fn create_document<P: Serialize + ?Sized>(
        &self,
        db: &str,
        collection: &str,
        data: &P,
        options: Option<&CreateDocumentOptions>,
    ) -> Result<DocumentMeta> {
        const OP: &str = "create document";
        let path = self.path(db, COLLECTION_PATH, &[collection], &query_of(options));
        self.call::<_, DocumentMeta>(OP, Method::POST, &path, &HeaderMap::new(), Some(data))
            .await?
            .decoded()
            .map_err(context(OP))
    }

    /// Insert several documents in one request; results follow input order.
    pub async fn create_documents<P: Serialize>(
        &self,
        db: &str,
        collection: &str,
        data: &[P],
        options: Option<&CreateDocumentOptions>,
    ) -> Result<Vec<DocumentMeta>> {
        const OP: &str = "create documents";
        let path = self.path(db, COLLECTION_PATH, &[collection], &query_of(options));
        self.call::<_, Vec<DocumentMeta>>(OP, Method::POST, &path, &HeaderMap::new(), Some(data))
            .await?
            .decoded()
            .map_err(context(OP))
    }

    /// Fetch a document into `T`; `None` when `if_none_match` matched.
    pub async fn get_document<T: DeserializeOwned>(
        &self,
        db: &str,
        collection: &str,
        key: &str,
        options: Option<&GetDocumentOptions>,
    ) -> Result<Option<T>> {
        const OP: &str = "get document";
        let path = self.path(db, DOCUMENT_PATH, &[collection, key], &QueryParams::new());
        let headers = conditional_headers(options).map_err(context(OP))?;
        let response = self
            .call::<(), T>(OP, Method::GET, &path, &headers, None)
            .await?;
        if response.status == NOT_MODIFIED {
            return Ok(None);
        }
        response.decoded().map(Some).map_err(context(OP))
    }

    /// Current revision via `HEAD`, read from the `ETag` header.
    pub async fn document_revision(
        &self,
        db: &str,
        collection: &str,
        key: &str,
        options: Option<&GetDocumentOptions>,
    ) -> Result<Option<String>> {
        const OP: &str = "get document revision";
        let path = self.path(db, DOCUMENT_PATH, &[collection, key], &QueryParams::new());
        let headers = conditional_headers(options).map_err(context(OP))?;
        let response = self
            .call_discarding::<()>(OP, Method::HEAD, &path, &headers, None)
            .await?;
        Ok(response.etag().map(str::to_string))
    }

    /// Partially update a document (`PATCH`).
    pub async fn update_document<P: Serialize + ?Sized>(
        &self,
        db: &str,
        collection: &str,
        key: &str,
        data: &P,
        options: Option<&UpdateDocumentOptions>,
    ) -> Result<DocumentMeta> {
        const OP: &str = "update document";
        let path = self.path(db, DOCUMENT_PATH, &[collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context(OP))?;
        self.call::<_, DocumentMeta>(OP, Method::PATCH, &path, &headers, Some(data))
            .await?
            .decoded()
            .map_err(context(OP))
    }

    /// Replace a document wholesale (`PUT`).
    pub async fn replace_document<P: Serialize + ?Sized>(
        &self,
        db: &str,
        collection: &str,
        key: &str,
        data: &P,
        options: Option<&ReplaceDocumentOptions>,
    ) -> Result<DocumentMeta> {
        const OP: &str = "replace document";
        let path = self.path(db, DOCUMENT_PATH, &[collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context(OP))?;
        self.call::<_, DocumentMeta>(OP, Method::PUT, &path, &headers, Some(data))
            .await?
            .decoded()
            .map_err(context(OP))
    }

    pub async fn delete_document(
        &self,
        db: &str,
        collection: &str,
        key: &str,
        options: Option<&DeleteDocumentOptions>,
    ) -> Result<DocumentMeta> {
        const OP: &str = "delete document";
        let path = self.path(db, DOCUMENT_PATH, &[collection, key], &query_of(options));
        let headers = conditional_headers(options).map_err(context(OP))?;
        self.call::<(), DocumentMeta>(OP, Method::DELETE, &path, &headers, None)
            .await?
            .decoded()
            .map_err(context(OP))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arangolite_core::mock::MockHttpClient;
    use arangolite_core::{Config, Error};
    use reqwest::header::{HeaderValue, ETAG};

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        #[serde(rename = "_key")]
        key: String,
        name: String,
    }

    fn client(mock: MockHttpClient) -> Client<MockHttpClient> {
        Client::with_http_client(Config::default(), mock).unwrap()
    }

    #[tokio::test]
    async fn test_create_document_with_options() {
        let client = client(MockHttpClient::new().reply(201, r#"{"_id":"users/1","_key":"1","_rev":"r1"}"#));

        let options = CreateDocumentOptions {
            wait_for_sync: Some(true),
            return_new: Some(false),
        };
        let meta = client
            .create_document("foo", "users", &serde_json::json!({"name": "ann"}), Some(&options))
            .await
            .unwrap();

        assert_eq!(meta.id, "users/1");
        assert_eq!(meta.rev, "r1");
        assert!(meta.old_rev.is_none());

        let request = client.transport().http_client().last_request().unwrap();
        assert_eq!(
            request.url,
            "http://localhost:8529/_db/foo/_api/document/users?returnNew=false&waitForSync=true"
        );
    }

    #[tokio::test]
    async fn test_create_documents_batch() {
        let client = client(MockHttpClient::new().reply(
            202,
            r#"[{"_id":"users/1","_key":"1","_rev":"r1"},{"_id":"users/2","_key":"2","_rev":"r2"}]"#,
        ));

        let docs = vec![serde_json::json!({"name": "a"}), serde_json::json!({"name": "b"})];
        let metas = client.create_documents("", "users", &docs, None).await.unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[1].key, "2");

        let request = client.transport().http_client().last_request().unwrap();
        assert_eq!(request.url, "http://localhost:8529/_api/document/users");
        assert_eq!(request.body.as_deref(), Some(br#"[{"name":"a"},{"name":"b"}]"#.as_slice()));
    }

    #[tokio::test]
    async fn test_get_document_decodes_into_caller_type() {
        let client = client(MockHttpClient::new().reply(
            200,
            r#"{"_id":"users/1","_key":"1","_rev":"r1","name":"ann"}"#,
        ));

        let user: Option<User> = client.get_document("foo", "users", "1", None).await.unwrap();
        assert_eq!(
            user,
            Some(User {
                key: "1".into(),
                name: "ann".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_get_document_not_modified() {
        let client = client(MockHttpClient::new().reply(304, ""));

        let options = GetDocumentOptions {
            if_none_match: Some("r1".into()),
            ..GetDocumentOptions::default()
        };
        let user: Option<User> = client
            .get_document("foo", "users", "1", Some(&options))
            .await
            .unwrap();
        assert!(user.is_none());

        let request = client.transport().http_client().last_request().unwrap();
        assert_eq!(request.headers.get("if-none-match").unwrap(), "r1");
        assert!(request.headers.get("if-match").is_none());
    }

    #[tokio::test]
    async fn test_document_revision_from_etag() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"_WmB7\""));
        let client = client(MockHttpClient::new().reply_with_headers(200, headers, ""));

        let rev = client.document_revision("foo", "users", "1", None).await.unwrap();
        assert_eq!(rev.as_deref(), Some("_WmB7"));

        let request = client.transport().http_client().last_request().unwrap();
        assert_eq!(request.method, Method::HEAD);
    }

    #[tokio::test]
    async fn test_update_document_precondition_failed() {
        let client = client(MockHttpClient::new().reply(
            412,
            r#"{"error":true,"code":412,"errorNum":1200,"errorMessage":"conflict","_rev":"r2"}"#,
        ));

        let options = UpdateDocumentOptions {
            keep_null: Some(false),
            if_match: Some("r1".into()),
            ..UpdateDocumentOptions::default()
        };
        let err = client
            .update_document("foo", "users", "1", &serde_json::json!({"name": null}), Some(&options))
            .await
            .unwrap_err();

        assert!(matches!(err.core(), Error::Protocol(e) if e.error_num == 1200 && e.status == 412));

        let request = client.transport().http_client().last_request().unwrap();
        assert_eq!(request.method, Method::PATCH);
        assert_eq!(request.headers.get("if-match").unwrap(), "r1");
        assert!(request.url.ends_with("/_api/document/users/1?keepNull=false"));
    }

    #[tokio::test]
    async fn test_replace_document_reports_old_rev() {
        let client = client(MockHttpClient::new().reply(
            201,
            r#"{"_id":"users/1","_key":"1","_rev":"r2","_oldRev":"r1"}"#,
        ));

        let meta = client
            .replace_document("foo", "users", "1", &serde_json::json!({"name": "bo"}), None)
            .await
            .unwrap();
        assert_eq!(meta.old_rev.as_deref(), Some("r1"));
        assert_eq!(
            client.transport().http_client().last_request().unwrap().method,
            Method::PUT
        );
    }

    #[tokio::test]
    async fn test_delete_document_with_if_match() {
        let client = client(MockHttpClient::new().reply(202, r#"{"_id":"users/1","_key":"1","_rev":"r1"}"#));

        let options = DeleteDocumentOptions {
            wait_for_sync: Some(true),
            return_old: None,
            if_match: Some("r1".into()),
        };
        client
            .delete_document("foo", "users", "1", Some(&options))
            .await
            .unwrap();

        let request = client.transport().http_client().last_request().unwrap();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.url, "http://localhost:8529/_db/foo/_api/document/users/1?waitForSync=true");
        assert_eq!(request.headers.get("if-match").unwrap(), "r1");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_empty_options_add_nothing() {
        let options = DeleteDocumentOptions::default();
        assert!(options.to_query().is_empty());
        assert!(conditional_headers(Some(&options)).unwrap().is_empty());
    }
}
