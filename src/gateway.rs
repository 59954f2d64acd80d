//! The `sendSms` handler: validates a caller payload, sends it through EgoSMS and maps
//! the outcome to [`GatewayResponse`] or [`GatewayError`].

use phonenumber::country;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::{Credentials, EgoSmsClient};
use crate::config::{ConfigError, ProviderCredentials, SmsConfig};
use crate::domain::{
    MessageText, PhoneNumber, ProviderResponse, RawPhoneNumber, SendMethod, SendSms, SenderId,
    ValidationError,
};

const RECIPIENTS_FIELD: &str = "recipients";

/// Caller payload: `{ message, recipients, method? }`.
///
/// Fields are kept as raw JSON so that wrong types surface as
/// [`GatewayError::InvalidArgument`] instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SendPayload {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub recipients: Option<Value>,
    #[serde(default)]
    pub method: Option<Value>,
}

impl SendPayload {
    pub fn new<I, S>(message: impl Into<String>, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message: Some(Value::String(message.into())),
            recipients: Some(Value::Array(
                recipients
                    .into_iter()
                    .map(|r| Value::String(r.into()))
                    .collect(),
            )),
            method: None,
        }
    }

    pub fn method(mut self, method: SendMethod) -> Self {
        self.method = Some(Value::String(method.as_str().to_owned()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayResponse {
    pub success: bool,
    pub data: ProviderResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    FailedPrecondition(String),

    /// The cause is logged, never returned.
    #[error("Failed to send SMS")]
    Internal,
}

impl GatewayError {
    /// Canonical status name used on the callable wire protocol.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::FailedPrecondition(_) => "FAILED_PRECONDITION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// How recipient strings are turned into [`RawPhoneNumber`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberPolicy {
    /// Forward trimmed input unchanged.
    #[default]
    Passthrough,
    /// Parse each number and forward its international form without `+`.
    Strict { default_region: country::Id },
}

impl NumberPolicy {
    fn apply(self, input: &str) -> Result<RawPhoneNumber, ValidationError> {
        match self {
            Self::Passthrough => RawPhoneNumber::new(input),
            Self::Strict { default_region } => {
                PhoneNumber::parse(Some(default_region), input).map(RawPhoneNumber::from)
            }
        }
    }
}

/// Stateless between calls; share it behind an `Arc`.
#[derive(Clone)]
pub struct SmsGateway {
    client: Option<EgoSmsClient>,
    sender: SenderId,
    numbers: NumberPolicy,
    max_recipients: Option<usize>,
}

impl SmsGateway {
    /// `client` is `None` when credentials are not configured; every send is then refused
    /// with [`GatewayError::FailedPrecondition`].
    pub fn new(client: Option<EgoSmsClient>, sender: SenderId) -> Self {
        Self {
            client,
            sender,
            numbers: NumberPolicy::default(),
            max_recipients: None,
        }
    }

    pub fn with_number_policy(mut self, numbers: NumberPolicy) -> Self {
        self.numbers = numbers;
        self
    }

    pub fn with_max_recipients(mut self, max: usize) -> Self {
        self.max_recipients = Some(max);
        self
    }

    /// Build the gateway and its EgoSMS client from resolved settings.
    pub fn from_config(
        config: &SmsConfig,
        credentials: &ProviderCredentials,
    ) -> Result<Self, ConfigError> {
        let client = if credentials.is_complete() {
            let mut builder = EgoSmsClient::builder(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            )?);
            if let Some(endpoint) = &config.plain_endpoint {
                builder = builder.plain_endpoint(endpoint.clone());
            }
            if let Some(endpoint) = &config.json_endpoint {
                builder = builder.json_endpoint(endpoint.clone());
            }
            if let Some(timeout) = config.timeout() {
                builder = builder.timeout(timeout);
            }
            Some(builder.build()?)
        } else {
            warn!("SMS credentials not configured; sends will be refused");
            None
        };

        let mut gateway = Self::new(client, SenderId::new(credentials.sender.clone())?)
            .with_number_policy(config.number_policy()?);
        if let Some(max) = config.max_recipients {
            gateway = gateway.with_max_recipients(max);
        }
        Ok(gateway)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Validate, send once, and relay the provider body untouched.
    pub async fn handle(&self, payload: SendPayload) -> Result<GatewayResponse, GatewayError> {
        let message = parse_message(payload.message)?;
        let recipients = self.parse_recipients(payload.recipients)?;
        let method = SendMethod::from_name(payload.method.as_ref().and_then(Value::as_str));

        let Some(client) = self.client.as_ref() else {
            return Err(GatewayError::FailedPrecondition(
                "SMS credentials not configured".to_owned(),
            ));
        };

        let count = recipients.len();
        let request = SendSms::new(recipients, message, self.sender.clone(), method)?;

        match client.send_sms(request).await {
            Ok(data) => {
                info!(
                    method = method.as_str(),
                    recipients = count,
                    status = data.status(),
                    "sms sent"
                );
                Ok(GatewayResponse {
                    success: true,
                    data,
                })
            }
            Err(err) => {
                error!(
                    method = method.as_str(),
                    recipients = count,
                    error = ?err,
                    "sendSms error"
                );
                Err(GatewayError::Internal)
            }
        }
    }

    fn parse_recipients(&self, value: Option<Value>) -> Result<Vec<RawPhoneNumber>, GatewayError> {
        let items = match value {
            None => {
                return Err(ValidationError::Empty {
                    field: RECIPIENTS_FIELD,
                }
                .into());
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ValidationError::NotAList {
                    field: RECIPIENTS_FIELD,
                }
                .into());
            }
        };
        if items.is_empty() {
            return Err(ValidationError::Empty {
                field: RECIPIENTS_FIELD,
            }
            .into());
        }
        if let Some(max) = self.max_recipients {
            if items.len() > max {
                return Err(ValidationError::TooManyRecipients {
                    max,
                    actual: items.len(),
                }
                .into());
            }
        }

        items
            .iter()
            .map(|item| -> Result<RawPhoneNumber, GatewayError> {
                match item {
                    Value::String(number) => Ok(self.numbers.apply(number)?),
                    _ => Err(ValidationError::NotAString {
                        field: RawPhoneNumber::FIELD,
                    }
                    .into()),
                }
            })
            .collect()
    }
}

fn parse_message(value: Option<Value>) -> Result<MessageText, GatewayError> {
    match value {
        Some(Value::String(text)) => Ok(MessageText::new(text)?),
        Some(Value::Null) | None => Err(ValidationError::Empty {
            field: MessageText::FIELD,
        }
        .into()),
        Some(_) => Err(ValidationError::NotAString {
            field: MessageText::FIELD,
        }
        .into()),
    }
}
