//! Integration tests for the RLM relay.
//!
//! Each test drives the full router against a local wiremock server standing
//! in for the RLM API. No network access is needed.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, Request as MockRequest, ResponseTemplate};

use rlm_relay::api::{create_router, AppState};
use rlm_relay::config::Config;

const RLM_PATH: &str = "/rlm/api/ScheduleAppointment/AIScheduleConfirmation";

/// Sample body from the README.
fn sample_appointment() -> Value {
    json!({
        "clientCode": "ACME",
        "clientOrderNumber": "ORD-100234",
        "scheduledDate": "2025-07-01",
        "consigneeName": "Jane Doe",
        "phoneNumber": "5551234567",
        "aiConsent": "Y",
        "consentDateTime": "2025-06-28T14:30:00",
        "questions": {"1": "N", "2": "N", "3": "Y", "4": "N", "5": "N"}
    })
}

fn test_config(server: &MockServer, header_value: &str) -> Config {
    Config {
        api_header_value: header_value.to_string(),
        rlm_api_url: format!("{}{}", server.uri(), RLM_PATH),
        ..Config::default()
    }
}

fn app(config: &Config) -> Router {
    create_router(AppState::new(config).expect("app state"))
}

async fn post_json(app: Router, uri: &str, body: &Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Responder that returns the received JSON body plus the auth header.
fn echo(req: &MockRequest) -> ResponseTemplate {
    let mut body: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
    let auth = req
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Value::Object(map) = &mut body {
        map.insert("authorization".to_string(), json!(auth));
    }
    ResponseTemplate::new(200).set_body_json(body)
}

#[tokio::test]
async fn structured_appointment_is_forwarded_with_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RLM_PATH))
        .and(header_eq("authorization", "Bearer secret"))
        .respond_with(echo)
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, "Bearer secret");
    let response = post_json(app(&config), "/schedule-appointment", &sample_appointment()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let echoed = json_body(response).await;

    let sample = sample_appointment();
    for field in [
        "clientCode",
        "clientOrderNumber",
        "scheduledDate",
        "consigneeName",
        "phoneNumber",
        "aiConsent",
        "consentDateTime",
    ] {
        assert_eq!(echoed[field], sample[field], "field {field}");
    }
    assert_eq!(echoed["authorization"], "Bearer secret");

    // Eight fields plus the echoed header, nothing else.
    assert_eq!(echoed.as_object().unwrap().len(), 9);

    let questions = echoed["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[2]["questionId"], 3);
    assert_eq!(questions[2]["questionResponse"], "y");
    assert!(questions[2]["questionDescription"]
        .as_str()
        .unwrap()
        .contains("Certificate of Insurance"));
}

#[tokio::test]
async fn extra_fields_are_not_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(echo)
        .mount(&server)
        .await;

    let mut body = sample_appointment();
    body["internalNote"] = json!("do not send");

    let config = test_config(&server, "k");
    let echoed = json_body(post_json(app(&config), "/schedule-appointment", &body).await).await;

    assert!(echoed.get("internalNote").is_none());
}

#[tokio::test]
async fn missing_field_is_rejected_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server, "k");
    for field in [
        "clientCode",
        "clientOrderNumber",
        "scheduledDate",
        "consigneeName",
        "phoneNumber",
        "aiConsent",
        "consentDateTime",
        "questions",
    ] {
        let mut body = sample_appointment();
        body.as_object_mut().unwrap().remove(field);

        let response = post_json(app(&config), "/schedule-appointment", &body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "field {field}");

        let detail = json_body(response).await["detail"].clone();
        assert_eq!(
            detail,
            json!([{"loc": ["body", field], "msg": "Field required", "type": "missing"}])
        );
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn custom_payload_is_forwarded_unchanged() {
    let server = MockServer::start().await;
    let payload = json!({
        "clientCode": "ACME",
        "questions": [{"questionId": 1, "questionResponse": "n"}],
        "nested": {"a": [1, 2, {"b": null}]},
        "flag": true
    });
    Mock::given(method("POST"))
        .and(path(RLM_PATH))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Scheduled"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, "k");
    let response = post_json(app(&config), "/schedule-appointment-custom", &payload).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "Scheduled"}));
}

#[tokio::test]
async fn custom_payload_keeps_big_numbers_and_key_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RLM_PATH))
        .respond_with(|req: &MockRequest| {
            ResponseTemplate::new(200).set_body_raw(req.body.clone(), "application/json")
        })
        .expect(1)
        .mount(&server)
        .await;

    let sent = r#"{"zeta":1,"orderId":12345678901234567890123,"alpha":2,"price":1.50}"#;
    let config = test_config(&server, "k");
    let response = post_raw(app(&config), "/schedule-appointment-custom", sent).await;

    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(String::from_utf8_lossy(&received[0].body), sent);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(String::from_utf8_lossy(&bytes), sent);
}

#[tokio::test]
async fn upstream_error_status_and_body_are_relayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"errors": ["Invalid order number"]})),
        )
        .mount(&server)
        .await;

    let config = test_config(&server, "k");
    let response = post_json(app(&config), "/schedule-appointment", &sample_appointment()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"errors": ["Invalid order number"]})
    );
}

#[tokio::test]
async fn non_json_upstream_body_is_relayed_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_raw("maintenance window", "text/plain"),
        )
        .mount(&server)
        .await;

    let config = test_config(&server, "k");
    let response = post_json(app(&config), "/schedule-appointment-custom", &json!({})).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"maintenance window");
}

#[tokio::test]
async fn envelope_mode_wraps_upstream_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"confirmation": "C-1"})))
        .mount(&server)
        .await;

    let config = Config {
        response_envelope: true,
        ..test_config(&server, "k")
    };
    let response = post_json(app(&config), "/schedule-appointment", &sample_appointment()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "success": true,
            "status_code": 200,
            "response_data": {"confirmation": "C-1"},
            "error_message": null
        })
    );
}

#[tokio::test]
async fn missing_header_value_sends_no_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(echo)
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server, "");
    let response = post_json(app(&config), "/schedule-appointment", &sample_appointment()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["authorization"], Value::Null);
}

#[tokio::test]
async fn custom_header_name_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_eq("ocp-apim-subscription-key", "sub-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        api_header_name: "Ocp-Apim-Subscription-Key".to_string(),
        ..test_config(&server, "sub-key")
    };
    let response = post_json(app(&config), "/schedule-appointment-custom", &json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unreachable_upstream_returns_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config {
        rlm_api_url: format!("http://{addr}{RLM_PATH}"),
        ..Config::default()
    };
    let response = post_json(app(&config), "/schedule-appointment", &sample_appointment()).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let detail = json_body(response).await["detail"].clone();
    assert!(detail
        .as_str()
        .unwrap()
        .starts_with("Error making request to RLM API"));
}

#[tokio::test]
async fn slow_upstream_returns_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = Config {
        rlm_timeout_secs: 1,
        ..test_config(&server, "k")
    };
    let response = post_json(app(&config), "/schedule-appointment-custom", &json!({})).await;

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn health_is_ok_without_credentials() {
    let response = app(&Config::default())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"message": "RLM API Server is running"})
    );
}
