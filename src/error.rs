// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use alloy::primitives::U256;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Input is not valid hex (odd length or non-hex characters).
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Hex decoded fine but is not a 20-byte address.
    #[error("invalid address length: expected {expected} bytes, found {found}")]
    InvalidAddress { expected: usize, found: usize },
    /// Both a verification key and VM program code were supplied.
    #[error("verification data carries both a verification key and vm program code")]
    AmbiguousAuxData,
    #[error("proof bytes are empty")]
    EmptyProof,
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
    /// Generic overflow error for 256-bit arithmetic.
    #[error("numeric overflow")]
    Overflow,
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("unknown proving system: {0}")]
    UnknownProvingSystem(String),
    #[error("payload encoding failed: {0}")]
    Encoding(String),
    #[error("max fee bump too small: minimum {minimum}, requested {requested}")]
    FeeBumpTooSmall { minimum: U256, requested: U256 },
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
