// crates/schoolsphere-appwrite/src/client.rs
// ============================================================================
// Module: Appwrite REST Client
// Description: Blocking HTTP client for the Appwrite Databases API.
// Purpose: Implement DatabaseBackend with server-key authentication.
// Dependencies: schoolsphere-core, reqwest, serde_json, tracing
// ============================================================================

//! ## Overview
//! [`AppwriteClient`] maps each [`DatabaseBackend`] operation onto one REST
//! call scoped to the configured database. Requests carry the project and
//! server API key headers; redirects are not followed and response bodies are
//! size-limited.
//!
//! HTTP status codes are classified into [`BackendError`] variants so the
//! runtime can tell "already exists" (409) apart from real failures.
//! Listing uses JSON-encoded `queries[]` parameters for `limit`/`offset`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::time::Duration;

use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use schoolsphere_core::AttributeKey;
use schoolsphere_core::BackendError;
use schoolsphere_core::CollectionId;
use schoolsphere_core::CollectionPage;
use schoolsphere_core::CollectionSchema;
use schoolsphere_core::DatabaseBackend;
use schoolsphere_core::DatabaseId;
use schoolsphere_core::DatabaseInfo;
use schoolsphere_core::DocumentId;
use schoolsphere_core::DocumentPage;
use schoolsphere_core::PageRequest;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the project identifier.
pub const PROJECT_HEADER: &str = "X-Appwrite-Project";
/// Header carrying the server API key.
pub const KEY_HEADER: &str = "X-Appwrite-Key";
/// Query parameter carrying JSON-encoded queries.
const QUERIES_PARAM: &str = "queries[]";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Appwrite client configuration.
#[derive(Clone)]
pub struct AppwriteClientConfig {
    /// API endpoint, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    /// Project identifier.
    pub project_id: String,
    /// Server API key.
    pub api_key: String,
    /// Database all operations are scoped to.
    pub database_id: DatabaseId,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Maximum accepted response body size in bytes.
    pub max_response_bytes: usize,
}

impl AppwriteClientConfig {
    /// Creates a configuration with default transport settings.
    #[must_use]
    pub fn new(endpoint: &str, project_id: &str, api_key: &str, database_id: DatabaseId) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
            database_id,
            timeout: Duration::from_secs(10),
            user_agent: concat!("schoolsphere/", env!("CARGO_PKG_VERSION")).to_string(),
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for AppwriteClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppwriteClientConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("database_id", &self.database_id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Appwrite Databases API client.
pub struct AppwriteClient {
    /// Client configuration.
    config: AppwriteClientConfig,
    /// Parsed endpoint URL.
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl AppwriteClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidResponse`] when the endpoint is not a
    /// valid base URL and [`BackendError::Unavailable`] when the HTTP client
    /// cannot be built.
    pub fn new(config: AppwriteClientConfig) -> Result<Self, BackendError> {
        let base = Url::parse(config.endpoint.trim_end_matches('/'))
            .map_err(|err| BackendError::InvalidResponse(format!("invalid endpoint: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::InvalidResponse("endpoint cannot be a base url".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| BackendError::Unavailable(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Returns the configured database identifier.
    #[must_use]
    pub const fn database_id(&self) -> &DatabaseId {
        &self.config.database_id
    }

    /// Builds `<endpoint>/databases/<db>/<segments...>` with encoded segments.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("databases").push(self.config.database_id.as_str());
            path.extend(segments);
        }
        url
    }

    /// Adds `limit`/`offset` queries to a listing URL.
    fn with_page(mut url: Url, page: PageRequest) -> Url {
        url.query_pairs_mut()
            .append_pair(QUERIES_PARAM, &json!({"method": "limit", "values": [page.limit]}).to_string())
            .append_pair(QUERIES_PARAM, &json!({"method": "offset", "values": [page.offset]}).to_string());
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(PROJECT_HEADER, &self.config.project_id)
            .header(KEY_HEADER, &self.config.api_key)
    }

    /// Sends a request and decodes a JSON response.
    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send(request)?;
        serde_json::from_slice(&body)
            .map_err(|err| BackendError::InvalidResponse(format!("malformed response body: {err}")))
    }

    /// Sends a request with a JSON body and ignores the response payload.
    fn send_body<B: Serialize>(&self, request: RequestBuilder, body: &B) -> Result<(), BackendError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| BackendError::InvalidResponse(format!("request encoding failed: {err}")))?;
        self.send(request.header(CONTENT_TYPE, "application/json").body(payload)).map(|_| ())
    }

    /// Sends a request and returns the body of a successful response.
    fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, BackendError> {
        let mut response =
            request.send().map_err(|err| BackendError::Unavailable(err.to_string()))?;
        let status = response.status().as_u16();
        let body = read_response_limited(&mut response, self.config.max_response_bytes)?;
        debug!(status, bytes = body.len(), url = %response.url(), "appwrite response");
        if (200 .. 300).contains(&status) {
            return Ok(body);
        }
        Err(classify_status(status, &body))
    }
}

impl fmt::Debug for AppwriteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppwriteClient").field("config", &self.config).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

#[derive(Serialize)]
struct StringAttributeBody<'a> {
    key: &'a str,
    size: u32,
    required: bool,
    array: bool,
}

#[derive(Serialize)]
struct IntegerAttributeBody<'a> {
    key: &'a str,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<i64>,
    array: bool,
}

#[derive(Serialize)]
struct UpdateDocumentBody<'a> {
    data: &'a Map<String, Value>,
}

// ============================================================================
// SECTION: Backend
// ============================================================================

impl DatabaseBackend for AppwriteClient {
    fn get_database(&self) -> Result<DatabaseInfo, BackendError> {
        self.send_json(self.request(Method::GET, self.url(&[])))
    }

    fn create_string_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        size: u32,
        required: bool,
        array: bool,
    ) -> Result<(), BackendError> {
        let url = self.url(&["collections", collection.as_str(), "attributes", "string"]);
        self.send_body(self.request(Method::POST, url), &StringAttributeBody {
            key: key.as_str(),
            size,
            required,
            array,
        })
    }

    fn create_integer_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        required: bool,
        min: Option<i64>,
        max: Option<i64>,
        array: bool,
    ) -> Result<(), BackendError> {
        let url = self.url(&["collections", collection.as_str(), "attributes", "integer"]);
        self.send_body(self.request(Method::POST, url), &IntegerAttributeBody {
            key: key.as_str(),
            required,
            min,
            max,
            array,
        })
    }

    fn get_collection(&self, collection: &CollectionId) -> Result<CollectionSchema, BackendError> {
        self.send_json(self.request(Method::GET, self.url(&["collections", collection.as_str()])))
    }

    fn list_documents(
        &self,
        collection: &CollectionId,
        page: PageRequest,
    ) -> Result<DocumentPage, BackendError> {
        let url = Self::with_page(self.url(&["collections", collection.as_str(), "documents"]), page);
        self.send_json(self.request(Method::GET, url))
    }

    fn update_document(
        &self,
        collection: &CollectionId,
        document: &DocumentId,
        patch: &Map<String, Value>,
    ) -> Result<(), BackendError> {
        let url =
            self.url(&["collections", collection.as_str(), "documents", document.as_str()]);
        self.send_body(self.request(Method::PATCH, url), &UpdateDocumentBody {
            data: patch,
        })
    }

    fn list_collections(&self, page: PageRequest) -> Result<CollectionPage, BackendError> {
        let url = Self::with_page(self.url(&["collections"]), page);
        self.send_json(self.request(Method::GET, url))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a non-success status and its body onto a [`BackendError`].
fn classify_status(status: u16, body: &[u8]) -> BackendError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    match status {
        409 => BackendError::Conflict(message),
        404 => BackendError::NotFound(message),
        401 | 403 => BackendError::Unauthorized(message),
        _ => BackendError::Rejected {
            status,
            message,
        },
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, BackendError> {
    let max_bytes_u64 = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if response.content_length().is_some_and(|expected| expected > max_bytes_u64) {
        return Err(BackendError::InvalidResponse("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| BackendError::Unavailable(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(BackendError::InvalidResponse("response exceeds size limit".to_string()));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::use_debug, reason = "Test assertions.")]

    use super::*;

    #[test]
    fn status_classification_uses_message_field() {
        let body = br#"{"message":"Attribute already exists","code":409,"type":"attribute_already_exists"}"#;
        assert_eq!(
            classify_status(409, body),
            BackendError::Conflict("Attribute already exists".to_string())
        );
        assert!(matches!(classify_status(403, b"{}"), BackendError::Unauthorized(_)));
        assert_eq!(classify_status(502, b"bad gateway"), BackendError::Rejected {
            status: 502,
            message: "bad gateway".to_string(),
        });
    }

    #[test]
    fn urls_encode_identifiers_and_queries() {
        let client = AppwriteClient::new(AppwriteClientConfig::new(
            "https://cloud.appwrite.io/v1/",
            "proj",
            "key",
            DatabaseId::new("main"),
        ))
        .unwrap();
        let url = client.url(&["collections", "exam attempts"]);
        assert_eq!(url.as_str(), "https://cloud.appwrite.io/v1/databases/main/collections/exam%20attempts");

        let paged = AppwriteClient::with_page(client.url(&["collections"]), PageRequest {
            limit: 100,
            offset: 200,
        });
        let queries: Vec<String> = paged
            .query_pairs()
            .filter(|(name, _)| name == QUERIES_PARAM)
            .map(|(_, value)| value.into_owned())
            .collect();
        assert_eq!(queries, vec![
            r#"{"method":"limit","values":[100]}"#.to_string(),
            r#"{"method":"offset","values":[200]}"#.to_string(),
        ]);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AppwriteClientConfig::new("https://x/v1", "p", "super-secret", DatabaseId::new("d"));
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
