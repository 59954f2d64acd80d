use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, RawPhoneNumber, SenderId};

/// Which EgoSMS endpoint (and wire encoding) a send goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendMethod {
    /// Bulk JSON endpoint, one record per recipient.
    #[default]
    Json,
    /// Form-encoded endpoint, one comma-joined recipient list.
    Plain,
}

impl SendMethod {
    /// Map a caller-supplied method name; anything other than `plain` selects [`SendMethod::Json`].
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("plain") => Self::Plain,
            _ => Self::Json,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SendSms {
    recipients: Vec<RawPhoneNumber>,
    message: MessageText,
    sender: SenderId,
    method: SendMethod,
}

impl SendSms {
    pub fn new(
        recipients: Vec<RawPhoneNumber>,
        message: MessageText,
        sender: SenderId,
        method: SendMethod,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: RawPhoneNumber::FIELD,
            });
        }
        Ok(Self {
            recipients,
            message,
            sender,
            method,
        })
    }

    pub fn recipients(&self) -> &[RawPhoneNumber] {
        &self.recipients
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    pub fn sender(&self) -> &SenderId {
        &self.sender
    }

    pub fn method(&self) -> SendMethod {
        self.method
    }
}
