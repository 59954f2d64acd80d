use std::sync::{Arc, Mutex};

use super::{BoxError, BoxFuture, HttpResponse, HttpTransport};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Sent {
    Form {
        url: String,
        params: Vec<(String, String)>,
    },
    Json {
        url: String,
        body: serde_json::Value,
        raw: String,
    },
}

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: u16, body: String },
    Fail(String),
}

/// Records every outbound request and answers with a canned reply.
#[derive(Debug, Clone)]
pub(crate) struct FakeTransport {
    state: Arc<Mutex<FakeTransportState>>,
}

#[derive(Debug)]
struct FakeTransportState {
    sent: Vec<Sent>,
    reply: Reply,
}

impl FakeTransport {
    pub(crate) fn new(response_status: u16, response_body: impl Into<String>) -> Self {
        Self::with_reply(Reply::Respond {
            status: response_status,
            body: response_body.into(),
        })
    }

    pub(crate) fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(message.into()))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeTransportState {
                sent: Vec::new(),
                reply,
            })),
        }
    }

    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.state.lock().unwrap().sent.clone()
    }

    fn record(&self, sent: Sent) -> Result<HttpResponse, BoxError> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(sent);
        match &state.reply {
            Reply::Respond { status, body } => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            Reply::Fail(message) => Err(message.clone().into()),
        }
    }
}

impl HttpTransport for FakeTransport {
    fn post_form<'a>(
        &'a self,
        url: &'a str,
        params: Vec<(String, String)>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        let result = self.record(Sent::Form {
            url: url.to_owned(),
            params,
        });
        Box::pin(async move { result })
    }

    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
    ) -> BoxFuture<'a, Result<HttpResponse, BoxError>> {
        let raw = String::from_utf8_lossy(&body).into_owned();
        let result = match serde_json::from_slice(&body) {
            Ok(body) => self.record(Sent::Json {
                url: url.to_owned(),
                body,
                raw,
            }),
            Err(err) => Err(err.into()),
        };
        Box::pin(async move { result })
    }
}
