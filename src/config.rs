// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Fixed gas paid once per batch, independent of its size.
pub const DEFAULT_CONSTANT_GAS_COST: u64 = 537_500;

/// Additional gas charged for every proof in a batch.
pub const ADDITIONAL_SUBMISSION_GAS_COST_PER_PROOF: u64 = 2_000;

/// Safety margin applied on top of the gas price (110 / 100 = +10%).
pub const GAS_PRICE_PERCENTAGE_MULTIPLIER: u64 = 110;
pub const PERCENTAGE_DIVIDER: u64 = 100;

/// Batch size assumed when estimating a per-proof fee.
pub const DEFAULT_PROOFS_PER_BATCH: u64 = 16;

/// A replacement max fee must exceed the previous one by this percentage.
pub const MIN_FEE_BUMP_PERCENT: u64 = 11;

/// EIP-712 domain of the batcher payment service.
pub const EIP712_DOMAIN_NAME: &str = "Aligned";
pub const EIP712_DOMAIN_VERSION: &str = "1";

/// Message signed with a personal signature to accept the service agreement.
pub const AGREEMENT_MESSAGE: &str = "I agree with the service policy";

/// Length of a proof generator address in bytes.
pub const ADDRESS_LEN: usize = 20;
