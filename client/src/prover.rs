// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Proof generation backends.
//!
//! The proving system itself is opaque: a prover takes a request and hands back
//! proof bytes, public input and the proving-system aux data. Provers run on
//! worker pool threads, so the trait is synchronous.

use crate::errors::ClientError;
use crate::pool::{PoolError, WorkerPool};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use zkarcade_kernel::types::{ProvingSystem, VerificationData};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProofRequest {
    pub index: usize,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifacts {
    pub proving_system: ProvingSystem,
    pub proof: Vec<u8>,
    #[serde(default)]
    pub public_input: Option<Vec<u8>>,
    #[serde(default)]
    pub verification_key: Option<Vec<u8>>,
    #[serde(default)]
    pub vm_program_code: Option<Vec<u8>>,
}

impl ProofArtifacts {
    /// Verification data for `generator`, ready to be nonced and signed.
    pub fn into_verification_data(self, generator: Address) -> VerificationData {
        VerificationData {
            public_input: self.public_input,
            verification_key: self.verification_key,
            vm_program_code: self.vm_program_code,
            ..VerificationData::new(self.proving_system, self.proof, generator)
        }
    }
}

pub trait Prover: Send + Sync {
    fn prove(&self, request: &ProofRequest) -> Result<ProofArtifacts, ClientError>;
}

/// Runs an external program once per proof.
///
/// The request is written to the child's stdin as JSON; the child prints
/// [`ProofArtifacts`] JSON on stdout and exits with status 0.
#[derive(Debug, Clone)]
pub struct CommandProver {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandProver {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Prover for CommandProver {
    fn prove(&self, request: &ProofRequest) -> Result<ProofArtifacts, ClientError> {
        let input = serde_json::to_vec(request).map_err(|e| ClientError::Prover(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ClientError::Prover(format!("spawn {}: {e}", self.program.display())))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&input)
                .map_err(|e| ClientError::Prover(format!("write request: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| ClientError::Prover(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClientError::Prover(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ClientError::Prover(format!("invalid prover output: {e}")))
    }
}

/// Replays precomputed artifacts for every request.
#[derive(Debug, Clone)]
pub struct FixtureProver {
    artifacts: ProofArtifacts,
}

impl FixtureProver {
    pub fn new(artifacts: ProofArtifacts) -> Self {
        Self { artifacts }
    }

    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let raw = std::fs::read(path)
            .map_err(|e| ClientError::Prover(format!("read {}: {e}", path.display())))?;
        let artifacts =
            serde_json::from_slice(&raw).map_err(|e| ClientError::Prover(format!("parse {}: {e}", path.display())))?;
        Ok(Self { artifacts })
    }
}

impl Prover for FixtureProver {
    fn prove(&self, _request: &ProofRequest) -> Result<ProofArtifacts, ClientError> {
        Ok(self.artifacts.clone())
    }
}

pub type ProverPool = WorkerPool<ProofRequest, ProofArtifacts>;

/// A worker pool whose workers run `prover`.
pub fn prover_pool(size: usize, prover: Arc<dyn Prover>) -> Result<ProverPool, ClientError> {
    WorkerPool::new(size, move |request: ProofRequest| {
        let artifacts = prover
            .prove(&request)
            .map_err(|e| PoolError::Task(e.to_string()))?;
        metrics::increment_counter!("zkarcade_proofs_generated_total");
        Ok(artifacts)
    })
    .map_err(|e| ClientError::Config(format!("spawn worker pool: {e}")))
}
