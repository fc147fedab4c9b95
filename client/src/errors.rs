// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::orchestrator::Phase;
use crate::pool::PoolError;
use std::time::Duration;
use thiserror::Error;
use zkarcade_kernel::error::KernelError;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The batcher answered with `EthRpcError` or `InvalidRequest`.
    #[error("Batcher protocol error: {0}")]
    Protocol(String),
    /// Socket failure, early close or an undecodable frame.
    #[error("Batcher connection error: {0}")]
    Connection(String),
    #[error("{what} timed out after {after:?}")]
    Timeout { what: &'static str, after: Duration },
    #[error("Fee estimation unavailable: {0}")]
    Estimation(String),
    #[error("Invalid input: {0}")]
    Validation(KernelError),
    #[error("Signature error: {0}")]
    Signature(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Deposit failed: {0}")]
    Deposit(String),
    #[error("Prover error: {0}")]
    Prover(String),
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Run cancelled")]
    Cancelled,
}

impl From<KernelError> for ClientError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::InvalidSignature(msg) => ClientError::Signature(msg),
            other => ClientError::Validation(other),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

/// A phase failure, attributed to exactly one account.
#[derive(Error, Debug)]
#[error("{phase}: {source}")]
pub struct AccountPipelineError {
    pub phase: Phase,
    #[source]
    pub source: ClientError,
}
