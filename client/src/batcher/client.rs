// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::frame::{BatcherMessage, BatcherRequest};
use crate::errors::ClientError;
use alloy::primitives::{Address, U256};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Nonce,
    MaxFee,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Nonce => "nonce",
            QueryKind::MaxFee => "max_fee",
        }
    }

    fn request(self, address: Address) -> BatcherRequest {
        let address = address.to_checksum(None);
        match self {
            QueryKind::Nonce => BatcherRequest::GetNonceForAddress(address),
            QueryKind::MaxFee => BatcherRequest::GetMaxFeeForAddress(address),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Connecting,
    AwaitHandshake,
    RequestSent,
    AwaitResponse,
    Done,
    Failed,
}

/// What the session must do after a frame has been processed.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Send(BatcherRequest),
    Wait,
    Resolve(U256),
}

/// Pure transition function of a single query.
///
/// Returns the next state and the action to take. An `Err` is terminal.
pub fn transition(
    state: QueryState,
    kind: QueryKind,
    address: Address,
    message: BatcherMessage,
) -> Result<(QueryState, Step), ClientError> {
    use BatcherMessage as M;
    use QueryState as S;

    match (state, message) {
        (S::AwaitHandshake, M::ProtocolVersion(_)) => Ok((S::RequestSent, Step::Send(kind.request(address)))),
        (S::AwaitResponse, M::Nonce(v)) if kind == QueryKind::Nonce => Ok((S::Done, Step::Resolve(v))),
        (S::AwaitResponse, M::MaxFee(v)) if kind == QueryKind::MaxFee => Ok((S::Done, Step::Resolve(v))),
        (_, M::EthRpcError(e)) => Err(ClientError::Protocol(format!("EthRpcError: {e}"))),
        (_, M::InvalidRequest(e)) => Err(ClientError::Protocol(format!("InvalidRequest: {e}"))),
        (S::AwaitHandshake, M::Nonce(_) | M::MaxFee(_)) => Err(ClientError::Protocol(
            "response received before protocol handshake".into(),
        )),
        (S::AwaitResponse, M::Nonce(_) | M::MaxFee(_)) => Err(ClientError::Protocol(format!(
            "response does not answer a {} query",
            kind.as_str()
        ))),
        (s, M::ProtocolVersion(_) | M::Other(_)) => Ok((s, Step::Wait)),
        (s, m) => Err(ClientError::Protocol(format!("unexpected {m:?} in state {s:?}"))),
    }
}

/// Batcher WebSocket client.
///
/// Each query opens its own connection, sends exactly one request after the
/// server's `ProtocolVersion` frame and closes the socket once the query
/// resolves either way. Nothing is shared between queries. No timeout is
/// applied here; wrap calls in `tokio::time::timeout`.
#[derive(Debug, Clone)]
pub struct BatcherClient {
    url: String,
}

impl BatcherClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn get_nonce(&self, address: Address) -> Result<U256, ClientError> {
        self.query(QueryKind::Nonce, address).await
    }

    pub async fn get_max_fee(&self, address: Address) -> Result<U256, ClientError> {
        self.query(QueryKind::MaxFee, address).await
    }

    async fn query(&self, kind: QueryKind, address: Address) -> Result<U256, ClientError> {
        let mut session = BatcherSession::connect(&self.url).await?;
        let outcome = session.run(kind, address).await;
        session.close().await;

        let label = match &outcome {
            Ok(_) => "ok",
            Err(ClientError::Protocol(_)) => "protocol_error",
            Err(_) => "connection_error",
        };
        metrics::increment_counter!("zkarcade_batcher_queries_total", "kind" => kind.as_str(), "outcome" => label);
        outcome
    }
}

/// One connection, one query.
struct BatcherSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    state: QueryState,
}

impl BatcherSession {
    async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::Connection(format!("connect to {url}: {e}")))?;
        tracing::debug!("Established connection to the batcher at {}", url);
        Ok(Self {
            ws,
            state: QueryState::AwaitHandshake,
        })
    }

    async fn run(&mut self, kind: QueryKind, address: Address) -> Result<U256, ClientError> {
        let result = self.drive(kind, address).await;
        self.state = if result.is_ok() { QueryState::Done } else { QueryState::Failed };
        result
    }

    async fn drive(&mut self, kind: QueryKind, address: Address) -> Result<U256, ClientError> {
        while let Some(frame) = self.ws.next().await {
            let bytes = match frame.map_err(|e| ClientError::Connection(e.to_string()))? {
                Message::Binary(bytes) => bytes,
                Message::Text(text) => text.into_bytes(),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                Message::Close(_) => break,
            };
            let message = BatcherMessage::decode(&bytes)
                .map_err(|e| ClientError::Connection(format!("malformed frame: {e}")))?;
            tracing::debug!("[{}] batcher frame {:?} in state {:?}", address, message, self.state);

            let (next, step) = transition(self.state, kind, address, message)?;
            self.state = next;
            match step {
                Step::Send(request) => {
                    let frame = request
                        .encode()
                        .map_err(|e| ClientError::Connection(e.to_string()))?;
                    self.ws
                        .send(Message::Binary(frame))
                        .await
                        .map_err(|e| ClientError::Connection(e.to_string()))?;
                    self.state = QueryState::AwaitResponse;
                }
                Step::Wait => {}
                Step::Resolve(value) => return Ok(value),
            }
        }
        Err(ClientError::Connection(format!(
            "connection closed in state {:?} before a terminal frame",
            self.state
        )))
    }

    async fn close(mut self) {
        if let Err(e) = self.ws.close(None).await {
            tracing::debug!("Batcher socket close: {}", e);
        }
    }
}
