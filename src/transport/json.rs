use serde::Serialize;

use crate::domain::{Password, SendSms, Username};

const SEND_SMS_METHOD: &str = "SendSms";
const DEFAULT_PRIORITY: &str = "0";

#[derive(Debug, Serialize)]
struct JsonSendBody<'a> {
    method: &'static str,
    userdata: UserData<'a>,
    msgdata: Vec<MsgData<'a>>,
}

#[derive(Debug, Serialize)]
struct UserData<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct MsgData<'a> {
    number: &'a str,
    message: &'a str,
    senderid: &'a str,
    priority: &'static str,
}

/// Document for `api/v1/json/`: one `msgdata` record per recipient, in request order.
///
/// Serialized straight to bytes so keys keep their declared order on the wire.
pub fn encode_json_body(
    username: &Username,
    password: &Password,
    request: &SendSms,
) -> Result<Vec<u8>, serde_json::Error> {
    let msgdata = request
        .recipients()
        .iter()
        .map(|number| MsgData {
            number: number.raw(),
            message: request.message().as_str(),
            senderid: request.sender().as_str(),
            priority: DEFAULT_PRIORITY,
        })
        .collect::<Vec<_>>();

    serde_json::to_vec(&JsonSendBody {
        method: SEND_SMS_METHOD,
        userdata: UserData {
            username: username.as_str(),
            password: password.as_str(),
        },
        msgdata,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{MessageText, RawPhoneNumber, SendMethod, SenderId};

    #[test]
    fn encode_json_body_builds_one_record_per_recipient() {
        let request = SendSms::new(
            vec![
                RawPhoneNumber::new("256700000001").unwrap(),
                RawPhoneNumber::new("256700000002").unwrap(),
            ],
            MessageText::new("Hello").unwrap(),
            SenderId::new("CareVax").unwrap(),
            SendMethod::Json,
        )
        .unwrap();

        let bytes = encode_json_body(
            &Username::new("user").unwrap(),
            &Password::new("pass").unwrap(),
            &request,
        )
        .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            body,
            json!({
                "method": "SendSms",
                "userdata": {"username": "user", "password": "pass"},
                "msgdata": [
                    {"number": "256700000001", "message": "Hello", "senderid": "CareVax", "priority": "0"},
                    {"number": "256700000002", "message": "Hello", "senderid": "CareVax", "priority": "0"}
                ]
            })
        );
    }

    #[test]
    fn encode_json_body_keeps_documented_key_order() {
        let request = SendSms::new(
            vec![RawPhoneNumber::new("256700000001").unwrap()],
            MessageText::new("Hi").unwrap(),
            SenderId::new("CareVax").unwrap(),
            SendMethod::Json,
        )
        .unwrap();

        let bytes = encode_json_body(
            &Username::new("user").unwrap(),
            &Password::new("pass").unwrap(),
            &request,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            concat!(
                r#"{"method":"SendSms","userdata":{"username":"user","password":"pass"},"#,
                r#""msgdata":[{"number":"256700000001","message":"Hi","senderid":"CareVax","priority":"0"}]}"#
            )
        );
    }
}
