// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Verification data commitments.
//!
//! The digest binds a proof to its public input, the proving-system auxiliary
//! data (verification key or program code, tagged with the proving system) and
//! the address of the account that generated it. It is the
//! `verification_data_hash` that gets signed for a submission.

use crate::error::{KernelError, KernelResult};
use crate::hex_serde::decode_address_bytes;
use crate::types::{ProvingSystem, VerificationData};
use alloy::primitives::B256;
use sha3::{Digest, Keccak256};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerificationDataCommitment {
    pub proof_commitment: B256,
    pub pub_input_commitment: B256,
    pub proving_system_aux_data_commitment: B256,
    pub commitment_digest: B256,
}

fn keccak(bytes: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(bytes))
}

/// Computes the commitment from raw parts.
///
/// At most one of `verification_key` and `vm_program_code` may be given; both
/// at once is `AmbiguousAuxData`.
pub fn commit(
    proof: &[u8],
    public_input: Option<&[u8]>,
    proving_system: ProvingSystem,
    verification_key: Option<&[u8]>,
    vm_program_code: Option<&[u8]>,
    generator_address: &str,
) -> KernelResult<VerificationDataCommitment> {
    let aux_data = match (verification_key, vm_program_code) {
        (Some(_), Some(_)) => return Err(KernelError::AmbiguousAuxData),
        (vk, code) => vk.or(code),
    };

    let proof_commitment = keccak(proof);

    let pub_input_commitment = public_input.map(keccak).unwrap_or(B256::ZERO);

    let proving_system_aux_data_commitment = match aux_data {
        Some(aux) => {
            let mut hasher = Keccak256::new();
            hasher.update(aux);
            hasher.update([proving_system.tag()]);
            B256::from_slice(&hasher.finalize())
        }
        None => B256::ZERO,
    };

    let generator = decode_address_bytes(generator_address)?;

    let mut hasher = Keccak256::new();
    hasher.update(proof_commitment);
    hasher.update(pub_input_commitment);
    hasher.update(proving_system_aux_data_commitment);
    hasher.update(generator);
    let commitment_digest = B256::from_slice(&hasher.finalize());

    Ok(VerificationDataCommitment {
        proof_commitment,
        pub_input_commitment,
        proving_system_aux_data_commitment,
        commitment_digest,
    })
}

/// Commitment of a full [`VerificationData`].
pub fn commit_verification_data(data: &VerificationData) -> KernelResult<VerificationDataCommitment> {
    commit(
        &data.proof,
        data.public_input.as_deref(),
        data.proving_system,
        data.verification_key.as_deref(),
        data.vm_program_code.as_deref(),
        &data.proof_generator_address,
    )
}
