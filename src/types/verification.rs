// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Verification data and the signed submission built around it.
//!
//! Field names follow the JSON expected by the submission endpoint, which mixes
//! camelCase (`maxFee`, `verificationData`) with snake_case (`chain_id`,
//! `payment_service_addr`).

use crate::error::{KernelError, KernelResult};
use crate::hex_serde;
use crate::types::enums::ProvingSystem;
use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationData {
    pub proving_system: ProvingSystem,
    pub proof: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_input: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_key: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_program_code: Option<Vec<u8>>,
    /// Hex address of the account that generated the proof.
    pub proof_generator_address: String,
}

impl VerificationData {
    pub fn new(proving_system: ProvingSystem, proof: Vec<u8>, generator: Address) -> Self {
        Self {
            proving_system,
            proof,
            public_input: None,
            verification_key: None,
            vm_program_code: None,
            proof_generator_address: generator.to_checksum(None),
        }
    }

    pub fn with_public_input(mut self, public_input: Vec<u8>) -> Self {
        self.public_input = Some(public_input);
        self
    }

    pub fn with_verification_key(mut self, verification_key: Vec<u8>) -> Self {
        self.verification_key = Some(verification_key);
        self
    }

    pub fn with_vm_program_code(mut self, vm_program_code: Vec<u8>) -> Self {
        self.vm_program_code = Some(vm_program_code);
        self
    }

    /// The proving-system auxiliary data: verification key, else program code.
    pub fn aux_data(&self) -> KernelResult<Option<&[u8]>> {
        match (&self.verification_key, &self.vm_program_code) {
            (Some(_), Some(_)) => Err(KernelError::AmbiguousAuxData),
            (Some(vk), None) => Ok(Some(vk)),
            (None, Some(code)) => Ok(Some(code)),
            (None, None) => Ok(None),
        }
    }

    /// Checks everything a submission needs before it is signed.
    pub fn validate(&self) -> KernelResult<()> {
        if self.proof.is_empty() {
            return Err(KernelError::EmptyProof);
        }
        self.aux_data()?;
        hex_serde::decode_address_bytes(&self.proof_generator_address)?;
        Ok(())
    }
}

/// Verification data bound to a nonce and a fee ceiling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoncedVerificationData {
    #[serde(rename = "maxFee", with = "hex_serde::u256_padded")]
    pub max_fee: U256,
    #[serde(with = "hex_serde::u256_padded")]
    pub nonce: U256,
    #[serde(with = "hex_serde::u256_padded")]
    pub chain_id: U256,
    #[serde(with = "hex_serde::address")]
    pub payment_service_addr: Address,
    #[serde(rename = "verificationData")]
    pub verification_data: VerificationData,
}

impl NoncedVerificationData {
    pub fn new(
        verification_data: VerificationData,
        nonce: U256,
        max_fee: U256,
        chain_id: U256,
        payment_service_addr: Address,
    ) -> Self {
        Self {
            max_fee,
            nonce,
            chain_id,
            payment_service_addr,
            verification_data,
        }
    }

    /// Same data and nonce under a different fee ceiling. The result must be signed again.
    pub fn with_max_fee(&self, max_fee: U256) -> Self {
        Self {
            max_fee,
            ..self.clone()
        }
    }
}

/// ECDSA signature split into its components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParts {
    #[serde(with = "hex_serde::b256")]
    pub r: B256,
    #[serde(with = "hex_serde::b256")]
    pub s: B256,
    pub v: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitProofMessage {
    #[serde(rename = "verificationData")]
    pub verification_data: NoncedVerificationData,
    pub signature: SignatureParts,
}

impl SubmitProofMessage {
    pub fn to_json(&self) -> KernelResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| KernelError::Encoding(e.to_string()))
    }

    pub fn from_json(value: serde_json::Value) -> KernelResult<Self> {
        serde_json::from_value(value).map_err(|e| KernelError::Encoding(e.to_string()))
    }
}
