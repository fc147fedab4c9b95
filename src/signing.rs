// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! EIP-712 hashing of nonced verification data and signature splitting.

use crate::commitment::commit_verification_data;
use crate::config::{EIP712_DOMAIN_NAME, EIP712_DOMAIN_VERSION};
use crate::error::{KernelError, KernelResult};
use crate::types::{NoncedVerificationData, SignatureParts};
use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use std::borrow::Cow;

mod typed {
    alloy::sol! {
        struct NoncedVerificationData {
            bytes32 verification_data_hash;
            uint256 nonce;
            uint256 max_fee;
        }
    }
}

pub fn signing_domain(chain_id: U256, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(EIP712_DOMAIN_NAME)),
        Some(Cow::Borrowed(EIP712_DOMAIN_VERSION)),
        Some(chain_id),
        Some(verifying_contract),
        None,
    )
}

/// Digest a signer must sign to authorize `data`.
///
/// The verification data hash is always recomputed from `data` itself, so a
/// message with a bumped fee never reuses a digest from the original.
pub fn signing_hash(data: &NoncedVerificationData) -> KernelResult<B256> {
    let commitment = commit_verification_data(&data.verification_data)?;
    let message = typed::NoncedVerificationData {
        verification_data_hash: commitment.commitment_digest,
        nonce: data.nonce,
        max_fee: data.max_fee,
    };
    let domain = signing_domain(data.chain_id, data.payment_service_addr);
    Ok(message.eip712_signing_hash(&domain))
}

/// Splits a 65-byte `r || s || v` signature.
///
/// A recovery id of 0/1 is normalized to 27/28.
pub fn split_signature(raw: &[u8]) -> KernelResult<SignatureParts> {
    if raw.len() < 65 {
        return Err(KernelError::InvalidSignature(format!(
            "expected 65 bytes, found {}; v is missing",
            raw.len()
        )));
    }
    if raw.len() > 65 {
        return Err(KernelError::InvalidSignature(format!(
            "expected 65 bytes, found {}",
            raw.len()
        )));
    }
    let v = match raw[64] {
        v @ (0 | 1) => v + 27,
        v @ (27 | 28) => v,
        other => {
            return Err(KernelError::InvalidSignature(format!(
                "unexpected recovery byte {other}"
            )))
        }
    };
    Ok(SignatureParts {
        r: B256::from_slice(&raw[0..32]),
        s: B256::from_slice(&raw[32..64]),
        v,
    })
}
