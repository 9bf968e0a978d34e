use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Role;
use crate::session::SessionStore;

/// One call against the backend, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: Option<serde_json::Value>,
    role: Option<Role>,
    query: Option<Vec<(String, String)>>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            role: None,
            query: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    /// Attach the bearer token stored for `role`, if any.
    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .get_or_insert_with(Vec::new)
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Issues requests against the backend. Every call is a single attempt; a
/// missing token is not an error, the request just goes out unauthenticated.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    sessions: SessionStore,
}

impl Gateway {
    pub fn new(config: &Config, sessions: SessionStore) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            sessions,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn build_url(&self, endpoint: &str, query: Option<&[(String, String)]>) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        if let Some(pairs) = query {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }

    /// Sends `request` and parses the JSON answer. `Ok(None)` means the
    /// backend replied 204 No Content.
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Option<T>> {
        let url = self.build_url(&request.endpoint, request.query.as_deref());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(request.headers);
        if let Some(token) = request.role.and_then(|role| self.sessions.get_token(role)) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Request(format!("Invalid token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.client.request(request.method, &url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(%status, "Backend responded");

        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(%status, error = %e, "Failed to read error body");
                    String::new()
                }
            };
            warn!(%status, body = %text, "Backend rejected request");
            return Err(Error::from_response_text(text));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response.json::<T>().await?))
    }

    /// Like [`Gateway::call`], for endpoints that must answer with a body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let endpoint = request.endpoint.clone();
        self.call(request)
            .await?
            .ok_or(Error::EmptyResponse(endpoint))
    }
}
