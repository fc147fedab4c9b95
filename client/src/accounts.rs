// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Test account loading.
//!
//! Accepted files are JSON arrays of either private-key strings or
//! `{ "address"?, "privateKey" }` objects. The address is always derived from
//! the key; a provided address that disagrees is reported and replaced.

use crate::errors::ClientError;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Account {
    pub index: usize,
    pub address: Address,
    pub signer: PrivateKeySigner,
}

impl Account {
    pub fn from_private_key(index: usize, private_key: &str) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ClientError::Config(format!("invalid private key at index {index}: {e}")))?;
        Ok(Self {
            index,
            address: signer.address(),
            signer,
        })
    }

    /// `[address - idx]`, the prefix of every log line about this account.
    pub fn label(&self) -> String {
        format!("[{} - {}]", self.address, self.index)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAccount {
    Key(String),
    Entry {
        #[serde(default)]
        address: Option<String>,
        #[serde(rename = "privateKey")]
        private_key: String,
    },
}

pub fn parse_accounts(json: &str) -> Result<Vec<Account>, ClientError> {
    let raw: Vec<RawAccount> = serde_json::from_str(json)
        .map_err(|e| ClientError::Config(format!("accounts file must be an array of keys or accounts: {e}")))?;

    raw.into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            RawAccount::Key(pk) => Account::from_private_key(idx, &pk),
            RawAccount::Entry { address, private_key } => {
                let account = Account::from_private_key(idx, &private_key)?;
                if let Some(provided) = address {
                    if !provided.eq_ignore_ascii_case(&account.address.to_string()) {
                        tracing::warn!(
                            "Provided address does not match the key at idx {}: provided={} derived={}. Using the derived address.",
                            idx,
                            provided,
                            account.address
                        );
                    }
                }
                Ok(account)
            }
        })
        .collect()
}

pub fn load_accounts(path: &Path) -> Result<Vec<Account>, ClientError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ClientError::Config(format!("read {}: {e}", path.display())))?;
    let accounts = parse_accounts(&raw)?;
    tracing::info!("Loaded {} accounts from {}", accounts.len(), path.display());
    Ok(accounts)
}
