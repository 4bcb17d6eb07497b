use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;

use rvc_server::application::ports::{CallbackNotifier, DeliveryError};
use rvc_server::domain::{JobResult, RequestId};
use rvc_server::infrastructure::callback::{CallbackPayload, HttpCallbackDispatcher};

use crate::helpers::{CallbackReceiver, TestServer};

fn dispatcher(timeout: Duration) -> HttpCallbackDispatcher {
    HttpCallbackDispatcher::new(timeout).unwrap()
}

#[tokio::test]
async fn given_success_result_when_delivered_then_body_carries_base64_data() {
    let mut receiver = CallbackReceiver::spawn().await;

    dispatcher(Duration::from_secs(5))
        .deliver(
            &receiver.url(),
            &JobResult::success(RequestId::new("r-1"), b"wav".to_vec()),
        )
        .await
        .unwrap();

    let body = receiver.next(Duration::from_secs(5)).await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"result": "success", "request_id": "r-1", "data": "d2F2"})
    );
}

#[tokio::test]
async fn given_failure_result_when_delivered_then_body_carries_detail() {
    let mut receiver = CallbackReceiver::spawn().await;

    dispatcher(Duration::from_secs(5))
        .deliver(
            &receiver.url(),
            &JobResult::failure(RequestId::new("r-2"), "model pth file not found"),
        )
        .await
        .unwrap();

    let body = receiver.next(Duration::from_secs(5)).await.unwrap();
    let payload: CallbackPayload = serde_json::from_value(body).unwrap();
    assert_eq!(payload.result, "failed");
    assert_eq!(payload.request_id, "r-2");
    assert_eq!(payload.detail.as_deref(), Some("model pth file not found"));
    assert_eq!(payload.data, None);
}

#[tokio::test]
async fn given_non_2xx_response_when_delivered_then_rejected() {
    let receiver = CallbackReceiver::with_status(StatusCode::BAD_REQUEST).await;

    let err = dispatcher(Duration::from_secs(5))
        .deliver(
            &receiver.url(),
            &JobResult::failure(RequestId::new("r"), "x"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn given_closed_port_when_delivered_then_unreachable() {
    let err = dispatcher(Duration::from_secs(5))
        .deliver(
            "http://127.0.0.1:9/callback",
            &JobResult::failure(RequestId::new("r"), "x"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::Unreachable { .. }));
}

#[tokio::test]
async fn given_slow_receiver_when_delivered_then_timed_out() {
    let router = Router::new().route(
        "/slow",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    let server = TestServer::spawn(router).await;

    let err = dispatcher(Duration::from_millis(200))
        .deliver(
            &server.url("/slow"),
            &JobResult::failure(RequestId::new("r"), "x"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DeliveryError::TimedOut { .. }));
}
