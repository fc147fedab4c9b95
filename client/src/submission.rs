// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Signed submission messages.
//!
//! A [`SubmitProofMessage`] is built in one go: validate, bind nonce and fee,
//! hash, sign, split. Nothing is handed out half-built, and a fee bump always
//! produces a new message with a fresh signature.

use crate::errors::ClientError;
use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use futures::future::BoxFuture;
use zkarcade_kernel::fee;
use zkarcade_kernel::signing::{signing_hash, split_signature};
use zkarcade_kernel::types::{NoncedVerificationData, SubmitProofMessage, VerificationData};

/// Produces raw 65-byte `r || s || v` signatures over EIP-712 digests.
pub trait TypedDataSigner: Send + Sync {
    fn signer_address(&self) -> Address;
    fn sign_digest(&self, digest: B256) -> BoxFuture<'_, Result<Vec<u8>, ClientError>>;
}

impl TypedDataSigner for PrivateKeySigner {
    fn signer_address(&self) -> Address {
        self.address()
    }

    fn sign_digest(&self, digest: B256) -> BoxFuture<'_, Result<Vec<u8>, ClientError>> {
        let signed = self
            .sign_hash_sync(&digest)
            .map(|sig| sig.as_bytes().to_vec())
            .map_err(|e| ClientError::Signature(e.to_string()));
        Box::pin(async move { signed })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubmissionBuilder {
    chain_id: U256,
    payment_service_addr: Address,
}

impl SubmissionBuilder {
    pub fn new(chain_id: U256, payment_service_addr: Address) -> Self {
        Self {
            chain_id,
            payment_service_addr,
        }
    }

    pub async fn build<S: TypedDataSigner + ?Sized>(
        &self,
        verification_data: VerificationData,
        nonce: U256,
        max_fee: U256,
        signer: &S,
    ) -> Result<SubmitProofMessage, ClientError> {
        verification_data.validate()?;
        let nonced = NoncedVerificationData::new(
            verification_data,
            nonce,
            max_fee,
            self.chain_id,
            self.payment_service_addr,
        );
        sign_nonced(nonced, signer).await
    }

    /// Re-signs `previous` under a higher max fee. Proof, commitment and nonce
    /// are carried over unchanged.
    pub async fn bump_fee<S: TypedDataSigner + ?Sized>(
        &self,
        previous: &SubmitProofMessage,
        new_max_fee: U256,
        signer: &S,
    ) -> Result<SubmitProofMessage, ClientError> {
        let max_fee = fee::check_bump(previous.verification_data.max_fee, new_max_fee)?;
        sign_nonced(previous.verification_data.with_max_fee(max_fee), signer).await
    }
}

pub async fn sign_nonced<S: TypedDataSigner + ?Sized>(
    nonced: NoncedVerificationData,
    signer: &S,
) -> Result<SubmitProofMessage, ClientError> {
    let digest = signing_hash(&nonced)?;
    if !nonced
        .verification_data
        .proof_generator_address
        .eq_ignore_ascii_case(&signer.signer_address().to_checksum(None))
    {
        tracing::warn!(
            "Signer {} differs from proof generator {}",
            signer.signer_address(),
            nonced.verification_data.proof_generator_address
        );
    }
    let raw = signer.sign_digest(digest).await?;
    let signature = split_signature(&raw)?;
    Ok(SubmitProofMessage {
        verification_data: nonced,
        signature,
    })
}
