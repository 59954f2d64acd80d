//! Callable-function HTTP surface.
//!
//! `POST /sendSms` takes `{"data": <payload>}` and answers `{"result": ...}` on success or
//! `{"error": {"status", "message"}}` on failure.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::gateway::{GatewayError, GatewayResponse, SendPayload, SmsGateway};

#[derive(Debug, Deserialize)]
struct CallableRequest {
    data: SendPayload,
}

#[derive(Debug, Serialize)]
struct CallableResult {
    result: GatewayResponse,
}

#[derive(Debug, Serialize)]
struct CallableError<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    message: &'a str,
}

/// Routes for the gateway, sharing one [`SmsGateway`] across requests.
///
/// Browser clients may call from any origin; preflight requests are answered by the CORS layer.
pub fn router(gateway: Arc<SmsGateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/sendSms", post(send_sms))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(gateway)
        .layer(cors)
}

async fn send_sms(State(gateway): State<Arc<SmsGateway>>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<CallableRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "rejecting malformed callable request");
            return GatewayError::InvalidArgument("Bad Request".to_owned()).into_response();
        }
    };

    match gateway.handle(request.data).await {
        Ok(result) => Json(CallableResult { result }).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::InvalidArgument(_) | GatewayError::FailedPrecondition(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = self.to_string();
        let body = CallableError {
            error: ErrorBody {
                status: self.code(),
                message: &message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::client::fake::FakeTransport;
    use crate::client::{Credentials, EgoSmsClient};
    use crate::domain::SenderId;

    use super::*;

    fn app(transport: Option<&FakeTransport>) -> Router {
        let client = transport.map(|transport| {
            EgoSmsClient::with_transport(
                Credentials::new("user", "pass").unwrap(),
                Arc::new(transport.clone()),
            )
        });
        router(Arc::new(SmsGateway::new(
            client,
            SenderId::new("CareVax").unwrap(),
        )))
    }

    async fn call(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/sendSms")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn send_body() -> String {
        json!({"data": {"message": "Hello", "recipients": ["256700000001"]}}).to_string()
    }

    #[tokio::test]
    async fn success_wraps_gateway_response_in_result() {
        let transport = FakeTransport::new(200, r#"{"Status":"OK"}"#);
        let (status, body) = call(app(Some(&transport)), send_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"result": {"success": true, "data": {"Status": "OK"}}})
        );
    }

    #[tokio::test]
    async fn invalid_argument_maps_to_bad_request() {
        let transport = FakeTransport::new(200, "OK");
        let body = json!({"data": {"message": "", "recipients": []}}).to_string();
        let (status, body) = call(app(Some(&transport)), body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["status"], json!("INVALID_ARGUMENT"));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn malformed_envelope_is_invalid_argument() {
        for raw in ["not json", r#"{"message": "Hello"}"#, r#"{"data": "Hello"}"#] {
            let (status, body) = call(app(None), raw).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!({"error": {"status": "INVALID_ARGUMENT", "message": "Bad Request"}})
            );
        }
    }

    #[tokio::test]
    async fn missing_credentials_map_to_failed_precondition() {
        let (status, body) = call(app(None), send_body()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": {"status": "FAILED_PRECONDITION", "message": "SMS credentials not configured"}})
        );
    }

    #[tokio::test]
    async fn provider_failure_is_opaque_internal() {
        let transport = FakeTransport::new(401, "Invalid username or password");
        let (status, body) = call(app(Some(&transport)), send_body()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": {"status": "INTERNAL", "message": "Failed to send SMS"}})
        );
        assert!(!body.to_string().contains("Invalid username"));
    }

    #[tokio::test]
    async fn preflight_from_browser_origin_is_allowed() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/sendSms")
            .header("origin", "https://app.example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app(None).oneshot(request).await.unwrap();

        assert!(response.status().is_success(), "{}", response.status());
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("POST"), "{methods}");
    }

    #[tokio::test]
    async fn cross_origin_post_carries_allow_origin() {
        let transport = FakeTransport::new(200, "OK");
        let request = Request::builder()
            .method("POST")
            .uri("/sendSms")
            .header("origin", "https://app.example.com")
            .header("content-type", "application/json")
            .body(Body::from(send_body()))
            .unwrap();
        let response = app(Some(&transport)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn healthz_answers_ok() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = app(None).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
