use serde::ser::{Serialize, Serializer};
use serde_json::value::RawValue;

/// Response returned by EgoSMS, kept exactly as received.
///
/// EgoSMS reports per-message delivery outcomes inside the body; this crate does not
/// interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    status: u16,
    body: String,
}

impl ProviderResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code of the provider response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Body exactly as received.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Serializes the body verbatim when it is a JSON document, as a JSON string otherwise.
impl Serialize for ProviderResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match serde_json::from_str::<&RawValue>(self.body.trim()) {
            Ok(raw) => raw.serialize(serializer),
            Err(_) => serializer.serialize_str(&self.body),
        }
    }
}
