//! The single send primitive shared by every operation.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ETAG};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::envelope::embedded_error;
use crate::error::{Error, Result, ServerError};
use crate::headers::{basic_auth, default_headers, merge_headers};
use crate::http::{ExchangeError, HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use crate::path::{build_path, QueryParams};

/// Successful exchange: status, response headers, raw body and the value
/// decoded from it (`None` for an empty body).
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub value: Option<T>,
}

impl<T> Response<T> {
    /// Revision from the `ETag` header, without surrounding quotes.
    pub fn etag(&self) -> Option<&str> {
        let value = self.headers.get(ETAG)?.to_str().ok()?;
        Some(value.trim_matches('"'))
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// The decoded value; an empty body is a decoding failure.
    pub fn decoded(self) -> Result<T> {
        let status = self.status;
        self.value
            .ok_or_else(|| Error::decoding(status, "empty response body"))
    }
}

/// Immutable connection settings plus the HTTP client that carries requests.
///
/// Holds no per-call state, so one instance can serve concurrent callers.
pub struct Transport<C = ReqwestClient> {
    client: C,
    base_url: String,
    database: String,
    protocol_version: u32,
    default_headers: HeaderMap,
    authorization: Option<HeaderValue>,
}

impl Transport<ReqwestClient> {
    pub fn new(config: Config) -> Result<Self> {
        let client = ReqwestClient::new(&config)?;
        Self::with_client(config, client)
    }
}

impl<C: HttpClient> Transport<C> {
    /// Empty `url`/`database_name` and a zero `protocol_version` fall back
    /// to [`defaults`](crate::config::defaults).
    pub fn with_client(config: Config, client: C) -> Result<Self> {
        let config = config.or_defaults();
        reqwest::Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("url {:?}: {e}", config.url)))?;
        let default_headers = default_headers(&config.headers)?;
        let authorization = config
            .credentials()
            .map(|(username, password)| basic_auth(username, password))
            .transpose()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            database: config.database_name,
            protocol_version: config.protocol_version,
            default_headers,
            authorization,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Database used when an operation names none.
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn protocol_version(&self) -> u32 {
        self.protocol_version
    }

    pub fn http_client(&self) -> &C {
        &self.client
    }

    /// [`build_path`] with `None` resolved to the configured database.
    pub fn path(&self, db: Option<&str>, template: &str, params: &[&str], query: &QueryParams) -> String {
        build_path(db.unwrap_or(&self.database), template, params, query)
    }

    /// Send a request and decode a successful body into `T`.
    ///
    /// Embedded server errors win over the status line; status >= 400 is an
    /// [`Error::Http`] otherwise. Use [`serde::de::IgnoredAny`] to accept any
    /// JSON body, or [`Transport::send_discarding`] to skip decoding entirely.
    pub async fn send<P, T>(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        payload: Option<&P>,
    ) -> Result<Response<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.exchange(method, path, headers, payload).await?;
        let value = if response.body.is_empty() {
            None
        } else {
            let decoded = serde_json::from_slice(&response.body).map_err(|source| Error::Decoding {
                status: response.status,
                source,
            })?;
            Some(decoded)
        };

        Ok(Response {
            status: response.status,
            headers: response.headers,
            body: response.body,
            value,
        })
    }

    /// Like [`Transport::send`] but never decodes the body.
    pub async fn send_discarding<P>(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        payload: Option<&P>,
    ) -> Result<Response<()>>
    where
        P: Serialize + ?Sized,
    {
        let response = self.exchange(method, path, headers, payload).await?;
        Ok(Response {
            status: response.status,
            headers: response.headers,
            body: response.body,
            value: None,
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(method = %method, path = %path))]
    async fn exchange<P>(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        payload: Option<&P>,
    ) -> Result<HttpResponse>
    where
        P: Serialize + ?Sized,
    {
        let body = payload
            .map(|payload| {
                serde_json::to_vec(payload).map_err(|e| Error::Encoding {
                    what: "payload",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let url = format!("{}{}", self.base_url, path);
        let mut request_headers = merge_headers(&self.default_headers, headers);
        if body.is_some() && !request_headers.contains_key(CONTENT_TYPE) {
            request_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(authorization) = &self.authorization {
            request_headers.insert(AUTHORIZATION, authorization.clone());
        }

        let request = HttpRequest {
            method: method.clone(),
            url: url.clone(),
            headers: request_headers,
            body,
        };
        let response = self.client.execute(request).await.map_err(|e| match e {
            ExchangeError::Send(source) => Error::Transport {
                method: method.to_string(),
                url: url.clone(),
                source,
            },
            ExchangeError::ReadBody { status, source } => Error::BodyRead { status, source },
        })?;

        debug!(
            url = %url,
            status = response.status,
            body_len = response.body.len(),
            "exchange complete"
        );

        if let Some(embedded) = embedded_error(&response.body) {
            debug!(error_num = embedded.error_num, "server reported an embedded error");
            return Err(Error::Protocol(ServerError {
                status: response.status,
                error_num: embedded.error_num,
                message: embedded.message,
                method: method.to_string(),
                url,
            }));
        }
        if response.status >= 400 {
            debug!(status = response.status, "server answered with an error status");
            return Err(Error::Http {
                status: response.status,
                method: method.to_string(),
                url,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::{conditional_headers, Conditional};
    use crate::mock::MockHttpClient;
    use serde::ser::Error as _;
    use serde::{Deserialize, Serializer};

    #[derive(Debug, Deserialize, PartialEq)]
    struct DocIdKeyRev {
        #[serde(rename = "_id")]
        id: String,
        #[serde(rename = "_key")]
        key: String,
        #[serde(rename = "_rev")]
        rev: String,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic structure"))
        }
    }

    fn transport(mock: MockHttpClient) -> Transport<MockHttpClient> {
        Transport::with_client(Config::default(), mock).unwrap()
    }

    fn no_headers() -> HeaderMap {
        HeaderMap::new()
    }

    #[tokio::test]
    async fn test_created_document_is_decoded() {
        let t = transport(MockHttpClient::new().reply(201, r#"{"_id":"c/1","_key":"1","_rev":"r1"}"#));

        let response: Response<DocIdKeyRev> = t
            .send(Method::POST, "/_api/document/c", &no_headers(), Some(&serde_json::json!({"a": 1})))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(
            response.value,
            Some(DocIdKeyRev {
                id: "c/1".into(),
                key: "1".into(),
                rev: "r1".into(),
            })
        );

        let request = t.http_client().last_request().unwrap();
        assert_eq!(request.url, "http://localhost:8529/_api/document/c");
        assert_eq!(request.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_embedded_error_beats_success_status() {
        let t = transport(
            MockHttpClient::new().reply(200, r#"{"error":true,"errorNum":1207,"errorMessage":"duplicate"}"#),
        );

        let err = t
            .send::<(), serde_json::Value>(Method::POST, "/_api/database", &no_headers(), None)
            .await
            .unwrap_err();

        match &err {
            Error::Protocol(e) => {
                assert_eq!(e.error_num, 1207);
                assert_eq!(e.message, "duplicate");
                assert_eq!(e.status, 200);
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
        assert!(err.is_server_error());
        assert_eq!(err.error_num(), Some(1207));
    }

    #[tokio::test]
    async fn test_not_found_is_http_error_with_raw_body() {
        let t = transport(MockHttpClient::new().reply(404, "<html>not here</html>"));

        let err = t
            .send::<(), serde_json::Value>(Method::GET, "/_api/document/c/1", &no_headers(), None)
            .await
            .unwrap_err();

        match err {
            Error::Http { status, method, url, body } => {
                assert_eq!(status, 404);
                assert_eq!(method, "GET");
                assert_eq!(url, "http://localhost:8529/_api/document/c/1");
                assert_eq!(body, "<html>not here</html>");
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unrelated_json_error_status_is_http_error() {
        let t = transport(MockHttpClient::new().reply(412, r#"{"_rev":"r9"}"#));

        let err = t
            .send_discarding::<()>(Method::DELETE, "/_api/document/c/1", &no_headers(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status(), 412);
        assert!(err.error_num().is_none());
    }

    #[tokio::test]
    async fn test_encoding_error_skips_network() {
        let t = transport(MockHttpClient::new());

        let err = t
            .send::<_, serde_json::Value>(Method::POST, "/_api/document/c", &no_headers(), Some(&Unserializable))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Encoding { what: "payload", .. }));
        assert_eq!(err.status(), 0);
        assert_eq!(t.http_client().calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let t = transport(MockHttpClient::new().fail_send("connection refused"));

        let err = t
            .send::<(), serde_json::Value>(Method::GET, "/_api/version", &no_headers(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Transport { .. }));
        assert_eq!(err.status(), 0);
        assert_eq!(t.http_client().calls(), 1);
    }

    #[tokio::test]
    async fn test_body_read_failure_keeps_status() {
        let t = transport(MockHttpClient::new().fail_read(200, "connection reset"));

        let err = t
            .send::<(), serde_json::Value>(Method::GET, "/_api/version", &no_headers(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BodyRead { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_decoding_error() {
        let t = transport(MockHttpClient::new().reply(200, r#"{"result":["a","b"]}"#));

        let err = t
            .send::<(), DocIdKeyRev>(Method::GET, "/_api/database", &no_headers(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decoding { status: 200, .. }));
        assert_eq!(err.status(), 200);
    }

    #[tokio::test]
    async fn test_empty_body_leaves_value_unset() {
        let t = transport(MockHttpClient::new().reply(202, ""));

        let response: Response<DocIdKeyRev> = t
            .send::<(), _>(Method::DELETE, "/_api/document/c/1", &no_headers(), None)
            .await
            .unwrap();

        assert_eq!(response.status, 202);
        assert!(response.value.is_none());
        assert!(matches!(response.decoded(), Err(Error::Decoding { status: 202, .. })));
    }

    #[tokio::test]
    async fn test_headers_merge_and_basic_auth() {
        let config = Config::default()
            .with_credentials("root", "secret")
            .with_header("x-request-source", "defaults");
        let t = Transport::with_client(config, MockHttpClient::new().reply(200, "{}")).unwrap();

        let mut per_call = conditional_headers(Some(&Conditional::matching("r1"))).unwrap();
        per_call.insert("x-request-source", HeaderValue::from_static("call"));

        t.send::<(), serde::de::IgnoredAny>(Method::GET, "/_api/version", &per_call, None)
            .await
            .unwrap();
        t.send::<(), serde::de::IgnoredAny>(Method::GET, "/_api/version", &no_headers(), None)
            .await
            .unwrap();

        let requests = t.http_client().requests();
        let first = &requests[0].headers;
        let sources: Vec<_> = first.get_all("x-request-source").iter().collect();
        assert_eq!(sources, vec!["defaults", "call"]);
        assert_eq!(first.get("if-match").unwrap(), "r1");
        assert_eq!(first.get(AUTHORIZATION).unwrap(), "Basic cm9vdDpzZWNyZXQ=");
        assert!(first.get(CONTENT_TYPE).is_none());

        let second = &requests[1].headers;
        assert_eq!(second.get_all("x-request-source").iter().count(), 1);
        assert!(second.get("if-match").is_none());
    }

    #[tokio::test]
    async fn test_no_authorization_without_password() {
        let config = Config {
            username: Some("root".into()),
            ..Config::default()
        };
        let t = Transport::with_client(config, MockHttpClient::new()).unwrap();

        t.send_discarding::<()>(Method::GET, "/_api/version", &no_headers(), None)
            .await
            .unwrap();

        assert!(t.http_client().last_request().unwrap().headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_independent() {
        let t = transport(
            MockHttpClient::new()
                .reply(200, r#"{"_id":"c/1","_key":"1","_rev":"r1"}"#)
                .reply(200, r#"{"_id":"c/2","_key":"2","_rev":"r2"}"#),
        );

        let headers = no_headers();
        let (a, b) = tokio::join!(
            t.send::<(), DocIdKeyRev>(Method::GET, "/_api/document/c/1", &headers, None),
            t.send::<(), DocIdKeyRev>(Method::GET, "/_api/document/c/2", &headers, None),
        );
        let mut keys = vec![a.unwrap().decoded().unwrap().key, b.unwrap().decoded().unwrap().key];
        keys.sort();
        assert_eq!(keys, vec!["1", "2"]);
        assert_eq!(t.http_client().calls(), 2);
    }

    #[tokio::test]
    async fn test_etag_is_unquoted() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"_rev123\""));
        let t = transport(MockHttpClient::new().reply_with_headers(200, headers, ""));

        let response = t
            .send_discarding::<()>(Method::HEAD, "/_api/document/c/1", &no_headers(), None)
            .await
            .unwrap();
        assert_eq!(response.etag(), Some("_rev123"));
    }

    #[test]
    fn test_malformed_url_is_config_error() {
        let config = Config::default().with_url("not a url");
        let err = Transport::with_client(config, MockHttpClient::new()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let config = Config {
            url: String::new(),
            database_name: String::new(),
            protocol_version: 0,
            ..Config::default()
        };
        let t = Transport::with_client(config, MockHttpClient::new()).unwrap();
        assert_eq!(t.base_url(), "http://localhost:8529");
        assert_eq!(t.database(), "_system");
        assert_eq!(t.protocol_version(), 30000);
    }

    #[test]
    fn test_path_uses_default_database() {
        let t = Transport::with_client(Config::default().with_database("foo"), MockHttpClient::new()).unwrap();
        let none = QueryParams::new();
        assert_eq!(t.path(None, "/_api/collection", &[], &none), "/_db/foo/_api/collection");
        assert_eq!(t.path(Some("_system"), "/_api/collection", &[], &none), "/_api/collection");
    }
}
