// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod client;
pub mod frame;

pub use client::{BatcherClient, QueryKind, QueryState};
pub use frame::{BatcherMessage, BatcherRequest, FrameError};

use crate::errors::ClientError;
use alloy::primitives::{Address, U256};
use futures::future::BoxFuture;

/// Where the orchestrator gets per-account nonces from.
pub trait NonceSource: Send + Sync {
    fn nonce_for(&self, address: Address) -> BoxFuture<'_, Result<U256, ClientError>>;
}

impl NonceSource for BatcherClient {
    fn nonce_for(&self, address: Address) -> BoxFuture<'_, Result<U256, ClientError>> {
        Box::pin(self.get_nonce(address))
    }
}
