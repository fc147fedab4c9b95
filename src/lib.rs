// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! zkarcade-kernel: deterministic, I/O-free core of the proof submission client.
//!
//! Everything here is a pure function of its inputs: verification data
//! commitments, the per-proof fee model, EIP-712 hashing of nonced
//! verification data and the JSON shape of the final submission.

pub mod config;
pub mod error;
pub mod types;
pub mod hex_serde;
pub mod commitment;
pub mod fee;
pub mod signing;

pub use alloy::primitives::{Address, B256, U256};
