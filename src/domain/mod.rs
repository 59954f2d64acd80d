//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{SendMethod, SendSms};
pub use response::ProviderResponse;
pub use validation::ValidationError;
pub use value::{MessageText, Password, PhoneNumber, RawPhoneNumber, SenderId, Username};
