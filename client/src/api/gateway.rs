//! HTTP gateway to the inventory REST API

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::TokenStore;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};

// Only the path of this URL is ever used
const PATH_ROOT: &str = "http://localhost/";

/// API gateway client.
///
/// Attaches `Authorization: Bearer <token>` whenever the token store holds a
/// token, and turns every non-2xx response into a [`ClientError`].
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiGateway {
    /// Create a gateway from configuration
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Create a gateway against an arbitrary base URL (for testing)
    pub fn with_base_url(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    // ========== Verbs ==========

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::GET, path), path).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        self.send(self.request(Method::GET, path).query(query), path)
            .await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }

    /// POST without a body; parameters travel in the query string
    pub async fn post_empty<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        self.send(self.request(Method::POST, path).query(query), path)
            .await
    }

    pub async fn post_form<T: DeserializeOwned, F: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &F,
    ) -> ClientResult<T> {
        self.send(self.request(Method::POST, path).form(form), path)
            .await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(Method::PUT, path).json(body), path)
            .await
    }

    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::PUT, path), path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.request(Method::DELETE, path), path).await
    }

    /// GET a binary body, e.g. an image
    pub async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        let response = self.dispatch(self.request(Method::GET, path), path).await?;
        let bytes = Self::check_status(response, path).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    // ========== Plumbing ==========

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let authenticated = self.tokens.load();
        tracing::debug!(%method, path, authenticated = authenticated.is_some(), "API request");

        let request = self.client.request(method, url);
        match authenticated {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn dispatch(&self, request: RequestBuilder, path: &str) -> ClientResult<Response> {
        request.send().await.map_err(|e| {
            tracing::warn!(path, "API request could not be sent: {}", e);
            ClientError::Network(e)
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> ClientResult<T> {
        let response = self.dispatch(request, path).await?;
        Self::handle_response(response, path).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: Response, path: &str) -> ClientResult<T> {
        let bytes = Self::check_status(response, path).await?.bytes().await?;
        decode_body(&bytes)
    }

    /// Map a non-2xx response to an error
    async fn check_status(response: Response, path: &str) -> ClientResult<Response> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);
            tracing::warn!(
                status = status.as_u16(),
                path,
                detail = detail.as_deref().unwrap_or(""),
                "API request failed"
            );
            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized);
            }
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }
}

/// `prefix` followed by `segments`, each percent-encoded as a single path
/// segment so ids cannot add path components or a query string
pub fn segment_path(prefix: &str, segments: &[&str]) -> ClientResult<String> {
    let mut url = Url::parse(PATH_ROOT)
        .and_then(|root| root.join(prefix.trim_start_matches('/')))
        .map_err(|e| ClientError::InvalidRequest(format!("{}: {}", prefix, e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidRequest(prefix.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Decode a success body. Empty bodies decode as JSON `null`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
    let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        bytes
    };
    serde_json::from_slice(body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Pull a human readable reason out of an error body.
///
/// Handles `{"detail": "..."}`, validation error lists (either under
/// `detail` or as the whole body, joined by their `msg` fields), and any
/// other `detail` value rendered as JSON.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match &value {
        Value::Object(map) => match map.get("detail")? {
            Value::String(s) => Some(s.clone()),
            Value::Array(errors) => join_messages(errors),
            Value::Null => None,
            other => Some(other.to_string()),
        },
        Value::Array(errors) => join_messages(errors),
        _ => None,
    }
}

fn join_messages(errors: &[Value]) -> Option<String> {
    let parts: Vec<String> = errors
        .iter()
        .map(|e| {
            e.get("msg")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string())
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
