// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! zkarcade-client: the I/O side of proof submission.
//!
//! Talks to the batcher over WebSocket for nonces and fees, signs nonced
//! verification data, generates proofs on a bounded worker pool and drives
//! many accounts through the arcade submission flow.

pub mod accounts;
pub mod arcade;
pub mod batcher;
pub mod config;
pub mod deposit;
pub mod errors;
pub mod gas;
pub mod orchestrator;
pub mod pool;
pub mod prover;
pub mod submission;
pub mod telemetry;

pub use errors::{AccountPipelineError, ClientError};
