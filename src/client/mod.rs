//! Client layer: orchestrates transport calls and maps transport ↔ domain.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Password, ProviderResponse, SendMethod, SendSms, Username, ValidationError};

#[cfg(test)]
pub(crate) mod fake;

const DEFAULT_PLAIN_ENDPOINT: &str = "https://www.egosms.co/api/v1/plain/";
const DEFAULT_JSON_ENDPOINT: &str = "https://www.egosms.co/api/v1/json/";

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

pub(crate) trait HttpTransport: Send + Sync {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;

    /// `body` is an already serialized JSON document.
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self.client.post(url).form(&params).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone)]
/// EgoSMS account credentials, sent with every request.
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Validate that both parts are non-empty.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    fn push_form_params(&self, params: &mut Vec<(String, String)>) {
        params.push((Username::FIELD.to_owned(), self.username.as_str().to_owned()));
        params.push((Password::FIELD.to_owned(), self.password.as_str().to_owned()));
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`EgoSmsClient`].
pub enum EgoSmsError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The JSON request document could not be built.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A configured endpoint is not an absolute http(s) URL.
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
/// Builder for [`EgoSmsClient`].
///
/// Use this when you need to customize the endpoints, timeout, or user-agent.
pub struct EgoSmsClientBuilder {
    credentials: Credentials,
    plain_endpoint: String,
    json_endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl EgoSmsClientBuilder {
    /// Create a builder with the default endpoints and no timeout/user-agent override.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            plain_endpoint: DEFAULT_PLAIN_ENDPOINT.to_owned(),
            json_endpoint: DEFAULT_JSON_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
        }
    }

    /// Override the endpoint URL for `api/v1/plain/`.
    pub fn plain_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.plain_endpoint = endpoint.into();
        self
    }

    /// Override the endpoint URL for `api/v1/json/`.
    pub fn json_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.json_endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`EgoSmsClient`].
    pub fn build(self) -> Result<EgoSmsClient, EgoSmsError> {
        validate_endpoint(&self.plain_endpoint)?;
        validate_endpoint(&self.json_endpoint)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| EgoSmsError::Transport(Box::new(err)))?;

        Ok(EgoSmsClient {
            credentials: self.credentials,
            plain_endpoint: self.plain_endpoint,
            json_endpoint: self.json_endpoint,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), EgoSmsError> {
    let invalid = |reason: String| EgoSmsError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason,
    };
    let url = url::Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other}"))),
    }
}

#[derive(Clone)]
/// High-level EgoSMS client.
///
/// By default it uses:
/// - `https://www.egosms.co/api/v1/plain/` for [`SendMethod::Plain`]
/// - `https://www.egosms.co/api/v1/json/` for [`SendMethod::Json`]
///
/// Each send is exactly one HTTP request. Nothing is retried.
pub struct EgoSmsClient {
    credentials: Credentials,
    plain_endpoint: String,
    json_endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl EgoSmsClient {
    /// Create a client using the default endpoints.
    ///
    /// For more customization, use [`EgoSmsClient::builder`].
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            plain_endpoint: DEFAULT_PLAIN_ENDPOINT.to_owned(),
            json_endpoint: DEFAULT_JSON_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
        }
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> EgoSmsClientBuilder {
        EgoSmsClientBuilder::new(credentials)
    }

    #[cfg(test)]
    pub(crate) fn with_transport(credentials: Credentials, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            credentials,
            plain_endpoint: "https://example.invalid/api/v1/plain/".to_owned(),
            json_endpoint: "https://example.invalid/api/v1/json/".to_owned(),
            http,
        }
    }

    /// Send an SMS through the endpoint selected by [`SendSms::method`].
    ///
    /// The provider body is returned as-is; delivery outcomes inside it are not inspected.
    ///
    /// Errors:
    /// - [`EgoSmsError::Transport`] when the request could not be completed,
    /// - [`EgoSmsError::HttpStatus`] for non-2xx HTTP responses.
    pub async fn send_sms(&self, request: SendSms) -> Result<ProviderResponse, EgoSmsError> {
        let response = match request.method() {
            SendMethod::Plain => {
                let mut params = Vec::<(String, String)>::new();
                self.credentials.push_form_params(&mut params);
                params.extend(crate::transport::encode_plain_form(&request));
                self.http.post_form(&self.plain_endpoint, params).await
            }
            SendMethod::Json => {
                let body = crate::transport::encode_json_body(
                    self.credentials.username(),
                    self.credentials.password(),
                    &request,
                )?;
                self.http.post_json(&self.json_endpoint, body).await
            }
        }
        .map_err(EgoSmsError::Transport)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(EgoSmsError::HttpStatus {
                status: response.status,
                body,
            });
        }

        Ok(ProviderResponse::new(response.status, response.body))
    }
}
