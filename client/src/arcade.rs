// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! HTTP session against the arcade backend.
//!
//! Every account gets its own session: a fresh cookie store plus the CSRF
//! token scraped from the home page. Mutating requests carry the token twice,
//! as `x-csrf-token` and as `_csrf_token` in the body.

use crate::errors::ClientError;
use alloy::primitives::Address;
use futures::future::BoxFuture;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use zkarcade_kernel::types::SubmitProofMessage;

/// Longest slice of an error body quoted in an error message.
const ERROR_BODY_LIMIT: usize = 200;

pub trait ArcadeApi: Send + Sync {
    /// Opens a new session for `address` with its own cookies and CSRF token.
    fn open_session(&self, address: Address) -> BoxFuture<'_, Result<Box<dyn ArcadeSession>, ClientError>>;
}

pub trait ArcadeSession: Send + Sync {
    fn sign_agreement<'a>(&'a self, address: Address, signature: &'a str) -> BoxFuture<'a, Result<Value, ClientError>>;

    fn agreement_status(&self, address: Address) -> BoxFuture<'_, Result<Value, ClientError>>;

    fn submit_proof<'a>(
        &'a self,
        message: &'a SubmitProofMessage,
        game: &'a str,
        game_idx: u32,
    ) -> BoxFuture<'a, Result<Value, ClientError>>;
}

#[derive(Debug, Clone)]
pub struct HttpArcadeApi {
    base_url: String,
}

impl HttpArcadeApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn connect(&self) -> Result<HttpArcadeSession, ClientError> {
        let client = Client::builder().cookie_store(true).build()?;

        let home = client.get(format!("{}/", self.base_url)).send().await?;
        let home = ensure_success(home, "GET /").await?;
        let html = home.text().await?;
        let csrf_token = extract_csrf_token(&html).ok_or_else(|| {
            ClientError::Http("Could not obtain a valid CSRF token from the home page".into())
        })?;

        Ok(HttpArcadeSession {
            client,
            base_url: self.base_url.clone(),
            csrf_token,
        })
    }
}

impl ArcadeApi for HttpArcadeApi {
    fn open_session(&self, _address: Address) -> BoxFuture<'_, Result<Box<dyn ArcadeSession>, ClientError>> {
        Box::pin(async move {
            let session = self.connect().await?;
            Ok(Box::new(session) as Box<dyn ArcadeSession>)
        })
    }
}

pub struct HttpArcadeSession {
    client: Client,
    base_url: String,
    csrf_token: String,
}

impl HttpArcadeSession {
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("x-csrf-token", &self.csrf_token)
            .json(&body)
            .send()
            .await?;
        let resp = ensure_success(resp, &format!("POST {path}")).await?;
        Ok(json_or_null(resp).await)
    }

    pub async fn post_agreement(&self, address: Address, signature: &str) -> Result<Value, ClientError> {
        let body = json!({
            "address": address.to_checksum(None),
            "signature": signature,
            "_csrf_token": self.csrf_token,
        });
        self.post_json("/wallet/sign", body).await
    }

    pub async fn get_agreement_status(&self, address: Address) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(format!(
                "{}/api/wallet/{}/agreement-status",
                self.base_url,
                address.to_checksum(None)
            ))
            .send()
            .await?;
        let resp = ensure_success(resp, "GET /agreement-status").await?;
        Ok(json_or_null(resp).await)
    }

    pub async fn post_proof(&self, message: &SubmitProofMessage, game: &str, game_idx: u32) -> Result<Value, ClientError> {
        let body = json!({
            "submit_proof_message": message.to_json()?,
            "game": game,
            "game_idx": game_idx,
            "_csrf_token": self.csrf_token,
        });
        self.post_json("/proof/", body).await
    }
}

impl ArcadeSession for HttpArcadeSession {
    fn sign_agreement<'a>(&'a self, address: Address, signature: &'a str) -> BoxFuture<'a, Result<Value, ClientError>> {
        Box::pin(self.post_agreement(address, signature))
    }

    fn agreement_status(&self, address: Address) -> BoxFuture<'_, Result<Value, ClientError>> {
        Box::pin(self.get_agreement_status(address))
    }

    fn submit_proof<'a>(
        &'a self,
        message: &'a SubmitProofMessage,
        game: &'a str,
        game_idx: u32,
    ) -> BoxFuture<'a, Result<Value, ClientError>> {
        Box::pin(self.post_proof(message, game, game_idx))
    }
}

/// Pulls the token out of `<meta name="csrf-token" content="...">`. Matching
/// is case-insensitive; the token itself keeps its case.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let is_quote = |b: &u8| matches!(b, b'"' | b'\'');

    let mut search = 0;
    while let Some(pos) = lower[search..].find("csrf-token") {
        let mut i = search + pos + "csrf-token".len();
        search = i;

        if !bytes.get(i).is_some_and(is_quote) {
            continue;
        }
        i += 1;
        while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
            i += 1;
        }
        if !lower[i..].starts_with("content=") {
            continue;
        }
        i += "content=".len();
        if !bytes.get(i).is_some_and(is_quote) {
            continue;
        }
        let start = i + 1;
        if let Some(len) = lower[start..].find(['"', '\'']) {
            if len > 0 {
                return Some(html[start..start + len].to_string());
            }
        }
    }
    None
}

async fn ensure_success(resp: Response, what: &str) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
    Err(ClientError::Http(format!("{what} {status} {snippet}")))
}

async fn json_or_null(resp: Response) -> Value {
    resp.json().await.unwrap_or(Value::Null)
}
