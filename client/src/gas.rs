// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::errors::ClientError;
use alloy::primitives::U256;
use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use zkarcade_kernel::fee;
use zkarcade_kernel::hex_serde::parse_u256_hex;

pub trait GasPriceSource: Send + Sync {
    fn gas_price(&self) -> BoxFuture<'_, Result<U256, ClientError>>;
}

/// `eth_gasPrice` over JSON-RPC.
#[derive(Debug, Clone)]
pub struct RpcGasPriceSource {
    url: String,
    client: Client,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<serde_json::Value>,
}

impl RpcGasPriceSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: Client::new(),
        }
    }

    pub async fn fetch(&self) -> Result<U256, ClientError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_gasPrice",
            "params": [],
            "id": 1
        });
        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Estimation(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ClientError::Estimation(format!("eth_gasPrice failed: {}", resp.status())));
        }

        let parsed: RpcResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Estimation(format!("Invalid JSON response: {e}")))?;
        if let Some(err) = parsed.error {
            return Err(ClientError::Estimation(format!("eth_gasPrice error: {err}")));
        }
        let hex = parsed
            .result
            .ok_or_else(|| ClientError::Estimation("Missing 'result' field in JSON".into()))?;
        parse_u256_hex(&hex).map_err(|e| ClientError::Estimation(e.to_string()))
    }
}

impl GasPriceSource for RpcGasPriceSource {
    fn gas_price(&self) -> BoxFuture<'_, Result<U256, ClientError>> {
        Box::pin(self.fetch())
    }
}

/// Constant gas price, for dry runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedGasPrice(pub U256);

impl GasPriceSource for FixedGasPrice {
    fn gas_price(&self) -> BoxFuture<'_, Result<U256, ClientError>> {
        let price = self.0;
        Box::pin(async move { Ok(price) })
    }
}

/// Live per-proof max fee: current gas price through the batch fee model.
#[derive(Clone)]
pub struct FeeEstimator {
    source: Arc<dyn GasPriceSource>,
    proofs_per_batch: u64,
}

impl FeeEstimator {
    pub fn new(source: Arc<dyn GasPriceSource>, proofs_per_batch: u64) -> Self {
        Self {
            source,
            proofs_per_batch,
        }
    }

    pub async fn estimate_max_fee_per_proof(&self) -> Result<U256, ClientError> {
        self.estimate_for_batch(self.proofs_per_batch).await
    }

    pub async fn estimate_for_batch(&self, batch_size: u64) -> Result<U256, ClientError> {
        let gas_price = self.source.gas_price().await?;
        tracing::debug!("Gas price {} wei, batch of {}", gas_price, batch_size);
        Ok(fee::estimate_max_fee_per_proof(gas_price, batch_size)?)
    }
}
