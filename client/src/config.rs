// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::errors::ClientError;
use alloy::primitives::{address, Address, U256};
use std::str::FromStr;
use std::time::Duration;
use zkarcade_kernel::config::DEFAULT_PROOFS_PER_BATCH;
use zkarcade_kernel::hex_serde::parse_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Anvil,
    Sepolia,
    Mainnet,
}

impl ChainKind {
    pub fn chain_id(self) -> u64 {
        match self {
            ChainKind::Anvil => 31337,
            ChainKind::Sepolia => 11155111,
            ChainKind::Mainnet => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChainKind::Anvil => "anvil",
            ChainKind::Sepolia => "sepolia",
            ChainKind::Mainnet => "mainnet",
        }
    }

    /// Accounts on Sepolia are funded out of band.
    pub fn skips_deposit(self) -> bool {
        self == ChainKind::Sepolia
    }
}

impl FromStr for ChainKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anvil" | "devnet" => Ok(ChainKind::Anvil),
            "sepolia" => Ok(ChainKind::Sepolia),
            "mainnet" => Ok(ChainKind::Mainnet),
            other => Err(ClientError::Config(format!("unknown chain {other:?}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub rpc_url: String,
    pub arcade_url: String,
    pub batcher_url: String,
    pub payment_service_addr: Address,
    pub chain: ChainKind,
    pub pool_size: usize,
    /// Upper bound of the random delay before each account's step.
    pub max_jitter: Duration,
    pub deposit_value: U256,
    /// Settle time after a deposit receipt before the account moves on.
    pub deposit_wait: Duration,
    pub batcher_timeout: Duration,
    pub proofs_per_batch: u64,
    pub game: String,
    pub game_idx: u32,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".into(),
            arcade_url: "http://localhost:4005".into(),
            batcher_url: "ws://localhost:8080".into(),
            payment_service_addr: address!("7bc06c482DEAd17c0e297aFbC32f6e63d3846650"),
            chain: ChainKind::Anvil,
            pool_size: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_jitter: Duration::from_millis(3_000),
            deposit_value: U256::from(100_000_000_000_000_000u128), // 0.1 ETH
            deposit_wait: Duration::from_secs(10),
            batcher_timeout: Duration::from_secs(30),
            proofs_per_batch: DEFAULT_PROOFS_PER_BATCH,
            game: "Parity".into(),
            game_idx: 0,
        }
    }
}

impl StressConfig {
    /// Defaults overridden by `RPC_URL`, `ZK_ARCADE_URL`, `BATCHER_URL`,
    /// `BATCHER_PAYMENT_SERVICE_ADDR` and `CHAIN_NAME`.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("RPC_URL") {
            cfg.rpc_url = v;
        }
        if let Ok(v) = std::env::var("ZK_ARCADE_URL") {
            cfg.arcade_url = v;
        }
        if let Ok(v) = std::env::var("BATCHER_URL") {
            cfg.batcher_url = v;
        }
        if let Ok(v) = std::env::var("BATCHER_PAYMENT_SERVICE_ADDR") {
            cfg.payment_service_addr = parse_address(&v)?;
        }
        if let Ok(v) = std::env::var("CHAIN_NAME") {
            cfg.chain = v.parse()?;
        }
        Ok(cfg)
    }

    pub fn chain_id(&self) -> U256 {
        U256::from(self.chain.chain_id())
    }
}
