use crate::domain::{MessageText, RawPhoneNumber, SendSms, SenderId};

/// Form fields for `api/v1/plain/`, without the credential fields.
///
/// All recipients travel in a single comma-joined `number` field.
pub fn encode_plain_form(request: &SendSms) -> Vec<(String, String)> {
    let number = request
        .recipients()
        .iter()
        .map(RawPhoneNumber::raw)
        .collect::<Vec<_>>()
        .join(",");

    vec![
        (RawPhoneNumber::FIELD.to_owned(), number),
        (
            MessageText::FIELD.to_owned(),
            request.message().as_str().to_owned(),
        ),
        (
            SenderId::FIELD.to_owned(),
            request.sender().as_str().to_owned(),
        ),
    ]
}
