use alloy::primitives::{address, Address, U256};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use zkarcade_client::arcade::{extract_csrf_token, ArcadeApi, HttpArcadeApi};
use zkarcade_client::submission::SubmissionBuilder;
use zkarcade_client::ClientError;
use zkarcade_kernel::types::{ProvingSystem, VerificationData};

const TOKEN: &str = "tok-123";
const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

#[derive(Clone, Default)]
struct Backend {
    proofs: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let csrf = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()) == Some(TOKEN);
    csrf && has_session(headers)
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.contains("session=s1"))
        .unwrap_or(false)
}

async fn home() -> Response {
    let html = format!(
        r#"<html><head><meta name="csrf-token" content="{TOKEN}" /></head><body></body></html>"#
    );
    ([(header::SET_COOKIE, "session=s1; Path=/")], Html(html)).into_response()
}

async fn sign(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) || body["_csrf_token"] != TOKEN || body["signature"].as_str().is_none() {
        return (StatusCode::FORBIDDEN, "invalid csrf token").into_response();
    }
    Json(json!({ "ok": true })).into_response()
}

async fn agreement_status(headers: HeaderMap, Path(address): Path<String>) -> Response {
    if !has_session(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if address.eq_ignore_ascii_case(&Address::ZERO.to_string()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(500)).into_response();
    }
    Json(json!({ "address": address, "agreed": true })).into_response()
}

async fn submit(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return (StatusCode::FORBIDDEN, "invalid csrf token").into_response();
    }
    backend.proofs.lock().unwrap().push(body);
    Json(json!({ "status": "pending" })).into_response()
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/", get(home))
        .route("/wallet/sign", post(sign))
        .route("/api/wallet/:address/agreement-status", get(agreement_status))
        .route("/proof/", post(submit))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn session_carries_cookie_and_csrf_token() {
    let backend = Backend::default();
    let url = spawn_backend(backend.clone()).await;
    let api = HttpArcadeApi::new(url);

    let session = api.connect().await.unwrap();
    assert_eq!(session.csrf_token(), TOKEN);

    let signed = session.post_agreement(ALICE, "0xabcdef").await.unwrap();
    assert_eq!(signed, json!({ "ok": true }));

    let status = session.get_agreement_status(ALICE).await.unwrap();
    assert_eq!(status["agreed"], json!(true));
    assert!(status["address"].as_str().unwrap().eq_ignore_ascii_case(&ALICE.to_string()));
}

#[tokio::test]
async fn proof_submission_body_has_the_expected_shape() {
    let backend = Backend::default();
    let url = spawn_backend(backend.clone()).await;
    let session = HttpArcadeApi::new(url).open_session(ALICE).await.unwrap();

    let signer: alloy::signers::local::PrivateKeySigner =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse().unwrap();
    let data = VerificationData::new(ProvingSystem::CircomGroth16Bn256, vec![1, 2, 3], ALICE).with_public_input(vec![4]);
    let message = SubmissionBuilder::new(U256::from(31337), Address::ZERO)
        .build(data, U256::from(1), U256::from(2), &signer)
        .await
        .unwrap();

    let response = session.submit_proof(&message, "Parity", 0).await.unwrap();
    assert_eq!(response, json!({ "status": "pending" }));

    let proofs = backend.proofs.lock().unwrap();
    assert_eq!(proofs.len(), 1);
    let body = &proofs[0];
    assert_eq!(body["game"], "Parity");
    assert_eq!(body["game_idx"], 0);
    assert_eq!(body["_csrf_token"], TOKEN);
    assert_eq!(body["submit_proof_message"], message.to_json().unwrap());
}

#[tokio::test]
async fn error_body_is_truncated() {
    let url = spawn_backend(Backend::default()).await;
    let session = HttpArcadeApi::new(url).connect().await.unwrap();

    let err = session.get_agreement_status(Address::ZERO).await.unwrap_err();
    let message = match err {
        ClientError::Http(message) => message,
        other => panic!("expected an HTTP error, got {other}"),
    };
    assert!(message.contains("500"));
    assert_eq!(message.matches('x').count(), 200);
}

#[tokio::test]
async fn cookie_less_submission_is_refused() {
    let url = spawn_backend(Backend::default()).await;

    let bare = reqwest::Client::new()
        .post(format!("{url}/proof/"))
        .header("x-csrf-token", TOKEN)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(bare.status(), reqwest::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_csrf_token_fails_the_session() {
    let url = spawn_backend(Backend::default()).await;
    let err = HttpArcadeApi::new(format!("{url}/missing")).connect().await.err().unwrap();
    assert!(matches!(err, ClientError::Http(_)));
}

#[test]
fn csrf_token_is_scraped_from_meta_tag() {
    let html = r#"<meta charset="utf-8"><meta name="csrf-token" content="abc.DEF-1">"#;
    assert_eq!(extract_csrf_token(html).as_deref(), Some("abc.DEF-1"));

    let shouting = "<META NAME='CSRF-TOKEN' CONTENT='MiXeD'>";
    assert_eq!(extract_csrf_token(shouting).as_deref(), Some("MiXeD"));

    let no_content = r#"<meta name="csrf-token"><p>content="nope"</p>"#;
    assert_eq!(extract_csrf_token(no_content), None);

    assert_eq!(extract_csrf_token("<html></html>"), None);
}
