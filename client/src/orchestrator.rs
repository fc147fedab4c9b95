// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Multi-account submission pipeline.
//!
//! Accounts move through the phases in lockstep: every account that is still
//! healthy runs the current phase concurrently (after its own random delay),
//! and the next phase starts only once all of them have finished. A failure
//! only ever marks the account it happened to; that account sits out the
//! remaining phases and shows up in the summary with the phase and cause.

use crate::accounts::Account;
use crate::arcade::{ArcadeApi, ArcadeSession};
use crate::batcher::NonceSource;
use crate::config::StressConfig;
use crate::deposit::Depositor;
use crate::errors::{AccountPipelineError, ClientError};
use crate::gas::FeeEstimator;
use crate::prover::{ProofRequest, ProverPool};
use crate::submission::SubmissionBuilder;
use alloy::primitives::Address;
use alloy::signers::SignerSync;
use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use zkarcade_kernel::config::AGREEMENT_MESSAGE;
use zkarcade_kernel::hex_serde::encode_prefixed;
use zkarcade_kernel::types::SubmitProofMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Created,
    SessionOk,
    AgreementSigned,
    Deposited,
    StatusChecked,
    ProofGenerated,
    Submitted,
}

impl Phase {
    /// Phases a run executes, in order.
    pub const PIPELINE: [Phase; 6] = [
        Phase::SessionOk,
        Phase::AgreementSigned,
        Phase::Deposited,
        Phase::StatusChecked,
        Phase::ProofGenerated,
        Phase::Submitted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::SessionOk => "session_ok",
            Phase::AgreementSigned => "agreement_signed",
            Phase::Deposited => "deposited",
            Phase::StatusChecked => "status_checked",
            Phase::ProofGenerated => "proof_generated",
            Phase::Submitted => "submitted",
        }
    }

    /// The phase after this one; `Submitted` is final.
    pub fn next(self) -> Phase {
        match self {
            Phase::Created => Phase::SessionOk,
            Phase::SessionOk => Phase::AgreementSigned,
            Phase::AgreementSigned => Phase::Deposited,
            Phase::Deposited => Phase::StatusChecked,
            Phase::StatusChecked => Phase::ProofGenerated,
            Phase::ProofGenerated | Phase::Submitted => Phase::Submitted,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the pipeline knows about one account. Only that account's step
/// ever touches it.
pub struct AccountPipelineState {
    pub account: Account,
    /// Last phase completed.
    pub phase: Phase,
    /// Cleared on the first failure and never set again.
    pub ok: bool,
    pub error: Option<AccountPipelineError>,
    pub last_status: Option<Value>,
    pub submit_response: Option<Value>,
    session: Option<Box<dyn ArcadeSession>>,
    message: Option<SubmitProofMessage>,
}

impl AccountPipelineState {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            phase: Phase::Created,
            ok: true,
            error: None,
            last_status: None,
            submit_response: None,
            session: None,
            message: None,
        }
    }

    fn fail(&mut self, phase: Phase, source: ClientError) {
        self.ok = false;
        self.error = Some(AccountPipelineError { phase, source });
    }

    fn session(&self) -> Result<&dyn ArcadeSession, ClientError> {
        self.session
            .as_deref()
            .ok_or_else(|| ClientError::Http("no arcade session for this account".into()))
    }

    fn report(&self) -> AccountReport {
        AccountReport {
            index: self.account.index,
            address: self.account.address,
            ok: self.ok && self.phase == Phase::Submitted,
            phase: self.phase,
            failed_phase: self.error.as_ref().map(|e| e.phase),
            error: self.error.as_ref().map(|e| e.to_string()),
            last_status: self.last_status.clone(),
            submit_response: self.submit_response.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub index: usize,
    pub address: Address,
    pub ok: bool,
    /// Last phase completed.
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_response: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub accounts: Vec<AccountReport>,
}

impl BatchSummary {
    fn from_states(states: &[AccountPipelineState], cancelled: bool) -> Self {
        let accounts: Vec<AccountReport> = states.iter().map(AccountPipelineState::report).collect();
        let succeeded = accounts.iter().filter(|r| r.ok).count();
        Self {
            total: accounts.len(),
            succeeded,
            failed: accounts.len() - succeeded,
            cancelled,
            accounts,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &AccountReport> {
        self.accounts.iter().filter(|r| !r.ok)
    }
}

pub struct BatchOrchestrator {
    config: StressConfig,
    arcade: Arc<dyn ArcadeApi>,
    depositor: Option<Arc<dyn Depositor>>,
    nonces: Arc<dyn NonceSource>,
    fees: FeeEstimator,
    pool: Arc<ProverPool>,
    builder: SubmissionBuilder,
}

impl BatchOrchestrator {
    pub fn new(
        config: StressConfig,
        arcade: Arc<dyn ArcadeApi>,
        nonces: Arc<dyn NonceSource>,
        fees: FeeEstimator,
        pool: Arc<ProverPool>,
    ) -> Self {
        let builder = SubmissionBuilder::new(config.chain_id(), config.payment_service_addr);
        Self {
            config,
            arcade,
            depositor: None,
            nonces,
            fees,
            pool,
            builder,
        }
    }

    /// Without a depositor the deposit phase is a no-op.
    pub fn with_depositor(mut self, depositor: Arc<dyn Depositor>) -> Self {
        self.depositor = Some(depositor);
        self
    }

    pub fn pool(&self) -> &ProverPool {
        &self.pool
    }

    pub async fn run(&self, accounts: Vec<Account>, cancel: CancellationToken) -> BatchSummary {
        let mut states: Vec<AccountPipelineState> = accounts.into_iter().map(AccountPipelineState::new).collect();
        let mut cancelled = false;

        for phase in Phase::PIPELINE {
            let active = states.iter().filter(|s| s.ok).count();
            if active == 0 {
                break;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            tracing::info!("Phase {} starting for {} accounts", phase, active);
            let started = Instant::now();

            let barrier = join_all(
                states
                    .iter_mut()
                    .filter(|s| s.ok)
                    .map(|state| self.run_step(phase, state)),
            );
            let completed = tokio::select! {
                _ = barrier => true,
                _ = cancel.cancelled() => false,
            };
            if !completed {
                cancelled = true;
                break;
            }
            tracing::info!("Phase {} finished in {:?}", phase, started.elapsed());
        }

        if cancelled {
            tracing::warn!("Run cancelled, terminating the worker pool");
            self.pool.terminate();
            for state in states.iter_mut().filter(|s| s.ok && s.phase != Phase::Submitted) {
                let phase = state.phase.next();
                state.fail(phase, ClientError::Cancelled);
            }
        }

        let summary = BatchSummary::from_states(&states, cancelled);
        tracing::info!(
            "SUMMARY: total={} success={} failed={}",
            summary.total,
            summary.succeeded,
            summary.failed
        );
        summary
    }

    async fn run_step(&self, phase: Phase, state: &mut AccountPipelineState) {
        self.jitter().await;
        let started = Instant::now();

        match self.step(phase, state).await {
            Ok(()) => {
                state.phase = phase;
                metrics::histogram!(
                    "zkarcade_phase_duration_seconds",
                    started.elapsed().as_secs_f64(),
                    "phase" => phase.as_str()
                );
                metrics::increment_counter!("zkarcade_phase_completed_total", "phase" => phase.as_str());
            }
            Err(source) => {
                tracing::error!("{} ERROR in {}: {}", state.account.label(), phase, source);
                metrics::increment_counter!("zkarcade_phase_failed_total", "phase" => phase.as_str());
                state.fail(phase, source);
            }
        }
    }

    async fn step(&self, phase: Phase, state: &mut AccountPipelineState) -> Result<(), ClientError> {
        let address = state.account.address;
        let label = state.account.label();

        match phase {
            Phase::Created => {}
            Phase::SessionOk => {
                state.session = Some(self.arcade.open_session(address).await?);
                tracing::info!("{} Obtained CSRF token after new session.", label);
            }
            Phase::AgreementSigned => {
                let signature = state
                    .account
                    .signer
                    .sign_message_sync(AGREEMENT_MESSAGE.as_bytes())
                    .map_err(|e| ClientError::Signature(e.to_string()))?;
                let signature = encode_prefixed(signature.as_bytes());
                state.session()?.sign_agreement(address, &signature).await?;
                tracing::info!("{} Signed service agreement", label);
            }
            Phase::Deposited => match &self.depositor {
                _ if self.config.chain.skips_deposit() => {
                    tracing::info!("{} Deposit skipped ({})", label, self.config.chain.name());
                }
                None => tracing::info!("{} Deposit skipped (no depositor)", label),
                Some(depositor) => {
                    let tx = depositor.deposit(&state.account.signer, self.config.deposit_value).await?;
                    tracing::info!(
                        "{} Deposit {} confirmed. Waiting {:?} for the deposit to be processed...",
                        label,
                        tx,
                        self.config.deposit_wait
                    );
                    tokio::time::sleep(self.config.deposit_wait).await;
                }
            },
            Phase::StatusChecked => {
                let status = state.session()?.agreement_status(address).await?;
                state.last_status = Some(status);
                tracing::info!("{} Fetched agreement status to keep the session alive.", label);
            }
            Phase::ProofGenerated => {
                tracing::info!("{} Generating proof...", label);
                let request = ProofRequest {
                    index: state.account.index,
                    address,
                };
                let artifacts = self.pool.exec(request).await?;
                let nonce = self
                    .bounded("batcher nonce query", self.nonces.nonce_for(address))
                    .await?;
                let max_fee = self.fees.estimate_max_fee_per_proof().await?;
                let message = self
                    .builder
                    .build(
                        artifacts.into_verification_data(address),
                        nonce,
                        max_fee,
                        &state.account.signer,
                    )
                    .await?;
                tracing::info!(
                    "{} Generated proof (nonce {}, max fee {}), sending it to the server...",
                    label,
                    nonce,
                    max_fee
                );
                state.message = Some(message);
            }
            Phase::Submitted => {
                let message = state
                    .message
                    .as_ref()
                    .ok_or_else(|| ClientError::Prover("no signed proof to submit".into()))?;
                let response = state
                    .session()?
                    .submit_proof(message, &self.config.game, self.config.game_idx)
                    .await?;
                state.submit_response = Some(response);
                tracing::info!("{} Proof submitted successfully", label);
            }
        }
        Ok(())
    }

    /// Batcher calls carry no timer of their own.
    async fn bounded<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        let after = self.config.batcher_timeout;
        tokio::time::timeout(after, fut)
            .await
            .map_err(|_| ClientError::Timeout { what, after })?
    }

    async fn jitter(&self) {
        let max_ms = self.config.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return;
        }
        let delay = rand::thread_rng().gen_range(0..=max_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}
