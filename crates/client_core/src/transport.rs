//! HTTP side of the page: the four server endpoints behind [`CinescoutApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{CatalogListing, FilmRef, ReviewRequest, ReviewResult, TmdbId},
    protocol::{
        AddListItemForm, CatalogResponse, Envelope, RemoveListItemForm, ReviewResponse,
        CSRF_HEADER,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::{Endpoints, Settings},
    csrf::CsrfToken,
    error::{ClientError, ClientResult},
};

const ADD_ENDPOINT: &str = "add-to-list";
const REMOVE_ENDPOINT: &str = "remove-from-list";
const CATALOG_ENDPOINT: &str = "catalog";
const REVIEW_ENDPOINT: &str = "review";

#[async_trait]
pub trait CinescoutApi: Send + Sync {
    async fn add_to_list(&self, film: &FilmRef) -> ClientResult<()>;
    async fn remove_from_list(&self, tmdb_id: &TmdbId) -> ClientResult<()>;
    async fn catalog(&self) -> ClientResult<CatalogListing>;
    async fn review(&self, request: &ReviewRequest) -> ClientResult<ReviewResult>;
}

#[derive(Clone)]
pub struct HttpApi {
    http: Client,
    base_url: Url,
    endpoints: Endpoints,
    csrf_token: Option<CsrfToken>,
    timeout: Duration,
}

impl HttpApi {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: settings.parsed_base_url()?,
            endpoints: settings.endpoints.clone(),
            csrf_token: settings.csrf_token.clone().and_then(CsrfToken::new),
            timeout: settings.request_timeout,
        })
    }

    /// Token from the page wins over a configured one.
    pub fn with_csrf_token(mut self, token: Option<CsrfToken>) -> Self {
        if token.is_some() {
            self.csrf_token = token;
        }
        self
    }

    pub fn has_csrf_token(&self) -> bool {
        self.csrf_token.is_some()
    }

    /// Local test servers must not be routed through a proxy from the environment.
    #[cfg(test)]
    pub(crate) fn without_proxy(mut self) -> Self {
        self.http = Client::builder()
            .no_proxy()
            .build()
            .expect("build http client");
        self
    }

    fn url(&self, endpoint: &str, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Transport {
                endpoint: endpoint.to_string(),
                message: format!("invalid path '{path}': {err}"),
            })
    }

    fn csrf(&self, endpoint: &str) -> ClientResult<&str> {
        self.csrf_token
            .as_ref()
            .map(CsrfToken::as_str)
            .ok_or_else(|| ClientError::MissingCsrfToken {
                endpoint: endpoint.to_string(),
            })
    }

    /// Sends `request` under the configured timeout and returns the status and
    /// the decoded JSON body (`Value::Null` when the body is not JSON).
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> ClientResult<(StatusCode, Value)> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match tokio::time::timeout(self.timeout, exchange).await {
            Err(_) => {
                warn!(endpoint, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                return Err(ClientError::Timeout {
                    endpoint: endpoint.to_string(),
                    after: self.timeout,
                });
            }
            Ok(Err(err)) => {
                warn!(endpoint, error = %err, "request failed");
                return Err(ClientError::Transport {
                    endpoint: endpoint.to_string(),
                    message: err.to_string(),
                });
            }
            Ok(Ok(exchange)) => exchange,
        };

        debug!(endpoint, status = status.as_u16(), "response received");
        let value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok((status, value))
    }

    /// Non-2xx becomes `Http`, `success:false` becomes `Application`.
    fn expect_success(endpoint: &str, status: StatusCode, body: Value) -> ClientResult<Value> {
        let envelope = serde_json::from_value::<Envelope>(body.clone()).ok();
        let server_message = envelope
            .as_ref()
            .and_then(Envelope::failure_message)
            .map(str::to_string);

        if !status.is_success() {
            let message = server_message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(ClientError::http(status.as_u16(), message));
        }

        match envelope {
            Some(envelope) if envelope.success => Ok(body),
            Some(_) => Err(ClientError::Application {
                message: server_message.unwrap_or_else(|| "request failed".to_string()),
            }),
            None => Err(ClientError::Decode {
                endpoint: endpoint.to_string(),
                message: "response body is not a JSON object".to_string(),
            }),
        }
    }

    fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> ClientResult<T> {
        serde_json::from_value(body).map_err(|err| ClientError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        })
    }
}

#[async_trait]
impl CinescoutApi for HttpApi {
    async fn add_to_list(&self, film: &FilmRef) -> ClientResult<()> {
        let token = self.csrf(ADD_ENDPOINT)?;
        let url = self.url(ADD_ENDPOINT, &self.endpoints.list_item)?;
        debug!(tmdb_id = %film.tmdb_id, %url, "adding film to list");
        let request = self
            .http
            .post(url)
            .header(CSRF_HEADER, token)
            .form(&AddListItemForm::from(film));
        let (status, body) = self.send(ADD_ENDPOINT, request).await?;
        Self::expect_success(ADD_ENDPOINT, status, body).map(|_| ())
    }

    async fn remove_from_list(&self, tmdb_id: &TmdbId) -> ClientResult<()> {
        let token = self.csrf(REMOVE_ENDPOINT)?;
        let url = self.url(REMOVE_ENDPOINT, &self.endpoints.list_item)?;
        debug!(%tmdb_id, %url, "removing film from list");
        let request = self
            .http
            .delete(url)
            .header(CSRF_HEADER, token)
            .form(&RemoveListItemForm {
                tmdb_id: tmdb_id.clone(),
            });
        let (status, body) = self.send(REMOVE_ENDPOINT, request).await?;
        Self::expect_success(REMOVE_ENDPOINT, status, body).map(|_| ())
    }

    async fn catalog(&self) -> ClientResult<CatalogListing> {
        let url = self.url(CATALOG_ENDPOINT, &self.endpoints.catalog)?;
        let request = self.http.get(url);
        let (status, body) = self.send(CATALOG_ENDPOINT, request).await?;
        let body = Self::expect_success(CATALOG_ENDPOINT, status, body)?;
        let response: CatalogResponse = Self::decode(CATALOG_ENDPOINT, body)?;
        Ok(response.into())
    }

    async fn review(&self, request: &ReviewRequest) -> ClientResult<ReviewResult> {
        let token = self.csrf(REVIEW_ENDPOINT)?;
        let mut url = self.url(REVIEW_ENDPOINT, &self.endpoints.review)?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Transport {
                endpoint: REVIEW_ENDPOINT.to_string(),
                message: "base url cannot hold paths".to_string(),
            })?
            .pop_if_empty()
            .push(&request.title);

        let builder = self
            .http
            .post(url)
            .header(CSRF_HEADER, token)
            .json(request);
        let (status, body) = self.send(REVIEW_ENDPOINT, builder).await?;

        // A lookup that found nothing is a normal result, not an error.
        match Self::expect_success(REVIEW_ENDPOINT, status, body) {
            Ok(body) => {
                let response: ReviewResponse = Self::decode(REVIEW_ENDPOINT, body)?;
                Ok(response.into())
            }
            Err(ClientError::Application { message }) => Ok(ReviewResult::NotFound { message }),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
