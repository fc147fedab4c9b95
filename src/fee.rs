// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Per-proof fee model.
//!
//! A batch costs a constant amount of gas plus a fixed amount per proof. The
//! fee for one proof is its share of that gas, priced at the current gas price
//! plus a 10% margin. Every product is taken before the final division.

use crate::config::{
    ADDITIONAL_SUBMISSION_GAS_COST_PER_PROOF, DEFAULT_CONSTANT_GAS_COST,
    GAS_PRICE_PERCENTAGE_MULTIPLIER, MIN_FEE_BUMP_PERCENT, PERCENTAGE_DIVIDER,
};
use crate::error::{KernelError, KernelResult};
use alloy::primitives::U256;

/// Gas attributed to a single proof in a batch of `batch_size`, rounded down.
pub fn gas_per_proof(batch_size: u64) -> KernelResult<U256> {
    if batch_size == 0 {
        return Err(KernelError::InvalidBatchSize);
    }
    let batch = U256::from(batch_size);
    let total_gas = U256::from(ADDITIONAL_SUBMISSION_GAS_COST_PER_PROOF)
        .checked_mul(batch)
        .and_then(|g| g.checked_add(U256::from(DEFAULT_CONSTANT_GAS_COST)))
        .ok_or(KernelError::Overflow)?;
    Ok(total_gas / batch)
}

pub fn estimate_max_fee_per_proof(gas_price: U256, batch_size: u64) -> KernelResult<U256> {
    let fee = gas_per_proof(batch_size)?
        .checked_mul(gas_price)
        .and_then(|f| f.checked_mul(U256::from(GAS_PRICE_PERCENTAGE_MULTIPLIER)))
        .ok_or(KernelError::Overflow)?;
    Ok(fee / U256::from(PERCENTAGE_DIVIDER))
}

/// Smallest max fee the batcher accepts as a replacement for `previous`.
pub fn min_bump_value(previous: U256) -> U256 {
    if previous.is_zero() {
        return previous;
    }
    let increase = previous.saturating_mul(U256::from(MIN_FEE_BUMP_PERCENT)) / U256::from(100u64);
    previous.saturating_add(increase)
}

/// Raises `candidate` to the minimum bump if it falls short.
pub fn ensure_min_bump(previous: U256, candidate: U256) -> U256 {
    candidate.max(min_bump_value(previous))
}

/// Accepts `candidate` only if it is a valid replacement for `previous`.
pub fn check_bump(previous: U256, candidate: U256) -> KernelResult<U256> {
    let minimum = min_bump_value(previous);
    if candidate < minimum || candidate <= previous {
        return Err(KernelError::FeeBumpTooSmall {
            minimum,
            requested: candidate,
        });
    }
    Ok(candidate)
}
