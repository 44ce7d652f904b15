//! Asynchronous Network Edge client and transport helpers.

use crate::Result;
use async_trait::async_trait;
use netedge_core::client::ClientConfig;
use netedge_core::config::NetEdgeConfig;
use netedge_core::pagination::{
    collect_pages, PageEnvelope, PageSource, PagingConfig, DEFAULT_PAGE_SIZE,
};
use netedge_core::resource_id::resource_id;
use netedge_core::{ApiError, Error};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::multipart::Form;
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::info;
use url::Url;

const USER_AGENT: &str = concat!("netedge-client/", env!("CARGO_PKG_VERSION"));

/// Characters escaped in identifiers placed into a request path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Escape a caller supplied identifier for use as a single path segment.
///
/// # Errors
///
/// Returns [`Error::InvalidEndpoint`] for empty, `.` and `..` identifiers,
/// which cannot be expressed as a segment.
pub(crate) fn path_segment(id: &str) -> Result<String> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::InvalidEndpoint(format!(
            "`{id}` is not a valid resource identifier"
        )));
    }
    Ok(utf8_percent_encode(id, PATH_SEGMENT).to_string())
}

/// Builder for [`NetEdgeClient`].
#[derive(Debug, Clone)]
pub struct NetEdgeClientBuilder {
    base_url: Url,
    token: Option<SecretString>,
    page_size: usize,
    http_config: ClientConfig,
}

impl NetEdgeClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let mut base_url = Url::parse(raw)
            .map_err(|err| Error::ConfigError(format!("Invalid base URL `{raw}`: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            http_config: ClientConfig::new(),
        })
    }

    /// Create a builder from a validated [`NetEdgeConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configured URL cannot be parsed.
    pub fn from_config(config: &NetEdgeConfig) -> Result<Self> {
        let mut builder = Self::new(&config.base_url)?
            .with_page_size(config.page_size)
            .with_http_config(ClientConfig::new().with_timeout(config.timeout()));
        builder.token = config.token.clone();
        Ok(builder)
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Override the number of items requested per page by list operations.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, http_config: ClientConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the token is not a valid header value
    /// or the HTTP client cannot be created.
    pub fn build(self) -> Result<NetEdgeClient> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|err| Error::ConfigError(format!("Invalid bearer token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(self.http_config.timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| {
                Error::ConfigError(format!("Failed to build Network Edge HTTP client: {err}"))
            })?;

        Ok(NetEdgeClient {
            http,
            base_url: self.base_url,
            page_size: self.page_size,
        })
    }
}

/// Asynchronous client for the Network Edge provisioning API.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct NetEdgeClient {
    http: Client,
    base_url: Url,
    page_size: usize,
}

impl NetEdgeClient {
    /// Start a builder for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL cannot be parsed.
    pub fn builder(base_url: impl AsRef<str>) -> Result<NetEdgeClientBuilder> {
        NetEdgeClientBuilder::new(base_url)
    }

    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration cannot produce a client.
    pub fn from_config(config: &NetEdgeConfig) -> Result<Self> {
        NetEdgeClientBuilder::from_config(config)?.build()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Number of items requested per page by list operations.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| {
                Error::InvalidEndpoint(format!("Invalid Network Edge path `{path}`: {err}"))
            })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
    ) -> Result<RequestBuilder> {
        let url = self.build_url(path)?;
        Ok(self
            .http
            .request(method, url)
            .query(params)
            .header(ACCEPT, "application/json"))
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Response> {
        info!(path = %path, %method, "Network Edge request");
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await?;
        Err(Error::Api(ApiError::from_response(status.as_u16(), &body)))
    }

    pub(crate) async fn get_json<T>(&self, path: &str, params: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.send_json::<(), T>(Method::GET, path, None, params).await
    }

    pub(crate) async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &[(String, String)],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.request(method.clone(), path, params)?;
        if let Some(payload) = body {
            request = request.json(payload);
        }
        let response = self.execute(&method, path, request).await?;
        let bytes = response.bytes().await?;
        deserialize_body(path, &bytes)
    }

    pub(crate) async fn send_empty<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &[(String, String)],
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.request(method.clone(), path, params)?;
        if let Some(payload) = body {
            request = request.json(payload);
        }
        self.execute(&method, path, request).await?;
        Ok(())
    }

    /// POST a creation request and resolve the new identifier from the body
    /// `uuid` field or the `Location` header.
    pub(crate) async fn post_created<B>(&self, path: &str, body: &B) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path, &[])?.json(body);
        let response = self.execute(&Method::POST, path, request).await?;
        let locations = response
            .headers()
            .get_all(LOCATION)
            .iter()
            .map(|value| {
                value.to_str().map(str::to_string).map_err(|err| {
                    Error::InvalidResponse(format!("Location header is not valid text: {err}"))
                })
            })
            .collect::<Result<Vec<String>>>()?;
        let bytes = response.bytes().await?;
        resource_id(&bytes, &locations)
    }

    pub(crate) async fn send_multipart<R>(&self, path: &str, form: Form) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, &[])?.multipart(form);
        let response = self.execute(&Method::POST, path, request).await?;
        let bytes = response.bytes().await?;
        deserialize_body(path, &bytes)
    }

    /// Fetch every item of a paginated collection using the client page size.
    pub(crate) async fn list_all<E>(
        &self,
        path: &str,
        config: PagingConfig,
    ) -> Result<Vec<E::Item>>
    where
        E: PageEnvelope,
    {
        let config = config.with_page_size(self.page_size);
        collect_pages::<E, Self>(self, path, &config).await
    }
}

#[async_trait]
impl PageSource for NetEdgeClient {
    async fn fetch_page(
        &self,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<serde_json::Value> {
        self.get_json(path, &params).await
    }
}

fn deserialize_body<T>(path: &str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(bytes)
    };
    parsed.map_err(|err| {
        Error::DecodeError(format!("Failed to parse response for `{path}`: {err}"))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use netedge_core::pagination::{NumberedPage, OffsetPage};
    use serde_json::json;
    use wiremock::matchers::{
        header, header_exists, method, path, query_param, query_param_is_missing,
    };
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn test_client(server: &MockServer) -> NetEdgeClient {
        NetEdgeClient::builder(server.uri()).unwrap().build().unwrap()
    }

    #[test]
    fn test_builder_appends_trailing_slash() {
        let builder = NetEdgeClientBuilder::new("https://api.example.com/proxy").unwrap();
        assert_eq!(builder.base_url.as_str(), "https://api.example.com/proxy/");

        let client = builder.build().unwrap();
        let url = client.build_url("/ne/v1/devices").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/proxy/ne/v1/devices");
    }

    #[test]
    fn test_path_segment_escapes_reserved_characters() {
        assert_eq!(path_segment("dev-1").unwrap(), "dev-1");
        assert_eq!(path_segment("a#b").unwrap(), "a%23b");
        assert_eq!(path_segment("x?admin=true").unwrap(), "x%3Fadmin=true");
        assert_eq!(path_segment("../../v2/other").unwrap(), "..%2F..%2Fv2%2Fother");
        assert_eq!(path_segment("50%").unwrap(), "50%25");
    }

    #[test]
    fn test_path_segment_rejects_dot_segments() {
        for id in ["", ".", ".."] {
            assert!(matches!(path_segment(id), Err(Error::InvalidEndpoint(_))));
        }
    }

    #[test]
    fn test_escaped_segment_stays_below_collection() {
        let client = NetEdgeClient::builder("https://api.example.com").unwrap().build().unwrap();
        let id = path_segment("../../v2/other").unwrap();
        let url = client.build_url(&format!("/ne/v1/sshUsers/{id}")).unwrap();
        assert_eq!(url.path(), "/ne/v1/sshUsers/..%2F..%2Fv2%2Fother");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let err = NetEdgeClientBuilder::new("not a url").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_config_carries_settings() {
        let config = NetEdgeConfig::new("https://api.example.com")
            .unwrap()
            .with_token("secret")
            .with_page_size(25)
            .with_timeout(5);
        let builder = NetEdgeClientBuilder::from_config(&config).unwrap();
        assert_eq!(builder.page_size, 25);
        assert_eq!(builder.http_config.timeout, Duration::from_secs(5));
        assert!(builder.token.is_some());
        assert!(!format!("{builder:?}").contains("secret"));

        let client = builder.build().unwrap();
        assert_eq!(client.page_size(), 25);
    }

    #[tokio::test]
    async fn test_sends_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/ping"))
            .and(header("Authorization", "Bearer secret-token"))
            .and(header("Accept", "application/json"))
            .and(header_exists("User-Agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = NetEdgeClient::builder(server.uri())
            .unwrap()
            .with_token("secret-token")
            .build()
            .unwrap();
        let body: serde_json::Value = client.get_json("/ne/v1/ping", &[]).await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_error_envelope_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/ne/v1/devices/dev-1"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "errorCode": "IC-NE-VD-030",
                "errorMessage": "Device already deleted",
                "property": "uuid"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .send_empty::<()>(Method::DELETE, "/ne/v1/devices/dev-1", None, &[])
            .await
            .unwrap_err();
        assert_eq!(err.http_code(), 400);
        let api = err.as_api_error().unwrap();
        assert!(api.has_code("IC-NE-VD-030"));
        assert_eq!(api.message, "Device already deleted");
    }

    #[tokio::test]
    async fn test_transport_failure_reports_code_zero() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = NetEdgeClient::builder(uri).unwrap().build().unwrap();
        let err = client
            .get_json::<serde_json::Value>("/ne/v1/devices", &[])
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.http_code(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/devices/dev-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .get_json::<serde_json::Value>("/ne/v1/devices/dev-1", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn test_post_created_reads_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ne/v1/publicKeys"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", "/ne/v1/publicKeys/key-1"),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let id = client
            .post_created("/ne/v1/publicKeys", &json!({"keyName": "k"}))
            .await
            .unwrap();
        assert_eq!(id, "key-1");
    }

    #[tokio::test]
    async fn test_post_created_without_identifier_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ne/v1/publicKeys"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client
            .post_created("/ne/v1/publicKeys", &json!({"keyName": "k"}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_list_all_uses_client_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/things"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"offset": 2, "limit": 2, "total": 3},
                "data": ["c"]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/things"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "pagination": {"offset": 0, "limit": 2, "total": 3},
                "data": ["a", "b"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = NetEdgeClient::builder(server.uri())
            .unwrap()
            .with_page_size(2)
            .build()
            .unwrap();
        let items = client
            .list_all::<OffsetPage<String>>("/ne/v1/things", PagingConfig::offset())
            .await
            .unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_all_follows_page_numbers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/deviceTypes"))
            .and(query_param("size", "100"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalCount": 3, "pageNumber": 2, "pageSize": 100, "content": ["c"]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ne/v1/deviceTypes"))
            .and(query_param("size", "100"))
            .and(query_param_is_missing("page"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalCount": 3, "pageNumber": 1, "pageSize": 100, "content": ["a", "b"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let items = client
            .list_all::<NumberedPage<String>>("/ne/v1/deviceTypes", PagingConfig::page_number())
            .await
            .unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
    }
}
