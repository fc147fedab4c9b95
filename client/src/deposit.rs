// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::errors::ClientError;
use alloy::network::{EthereumWallet, ReceiptResponse as _, TransactionBuilder};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use futures::future::BoxFuture;
use reqwest::Url;

/// Funds an account's balance in the payment service.
pub trait Depositor: Send + Sync {
    /// Sends `value` from `signer` and resolves once the receipt is in.
    fn deposit<'a>(&'a self, signer: &'a PrivateKeySigner, value: U256) -> BoxFuture<'a, Result<B256, ClientError>>;
}

/// Plain value transfer to the payment service contract through an RPC node.
#[derive(Debug, Clone)]
pub struct RpcDepositor {
    rpc_url: Url,
    payment_service_addr: Address,
}

impl RpcDepositor {
    pub fn new(rpc_url: &str, payment_service_addr: Address) -> Result<Self, ClientError> {
        let rpc_url = rpc_url
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid RPC url {rpc_url:?}: {e}")))?;
        Ok(Self {
            rpc_url,
            payment_service_addr,
        })
    }

    pub async fn send(&self, signer: &PrivateKeySigner, value: U256) -> Result<B256, ClientError> {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(self.rpc_url.clone());

        let tx = TransactionRequest::default()
            .with_to(self.payment_service_addr)
            .with_value(value);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ClientError::Deposit(e.to_string()))?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ClientError::Deposit(e.to_string()))?;

        if !receipt.status() {
            return Err(ClientError::Deposit(format!(
                "transaction {} reverted",
                receipt.transaction_hash
            )));
        }
        Ok(receipt.transaction_hash)
    }
}

impl Depositor for RpcDepositor {
    fn deposit<'a>(&'a self, signer: &'a PrivateKeySigner, value: U256) -> BoxFuture<'a, Result<B256, ClientError>> {
        Box::pin(self.send(signer, value))
    }
}
