//! Callable HTTP endpoint relaying SMS sends to the EgoSMS bulk API.
//!
//! The crate is layered: a domain layer of strong types, a transport layer for the two
//! EgoSMS wire encodings, a small client orchestrating one HTTP call per send, and the
//! [`SmsGateway`] handler that validates caller payloads and maps outcomes.
//!
//! ```rust,no_run
//! use egosms_gateway::{Credentials, EgoSmsClient, SendMethod, SendPayload, SenderId, SmsGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EgoSmsClient::new(Credentials::new("user", "pass")?);
//!     let gateway = SmsGateway::new(Some(client), SenderId::new("CareVax")?);
//!     let payload = SendPayload::new("hello", ["256700000001"]).method(SendMethod::Plain);
//!     let response = gateway.handle(payload).await?;
//!     println!("{}", response.data.body());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod logging;
pub mod server;
mod transport;

pub use client::{Credentials, EgoSmsClient, EgoSmsClientBuilder, EgoSmsError};
pub use config::{AppConfig, ConfigError, ProviderCredentials};
pub use domain::{
    MessageText, Password, PhoneNumber, ProviderResponse, RawPhoneNumber, SendMethod, SendSms,
    SenderId, Username, ValidationError,
};
pub use gateway::{GatewayError, GatewayResponse, NumberPolicy, SendPayload, SmsGateway};
