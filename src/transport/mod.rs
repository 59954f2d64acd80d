//! Transport layer: wire encodings for the EgoSMS endpoints.

mod json;
mod plain;

pub use json::encode_json_body;
pub use plain::encode_plain_form;
