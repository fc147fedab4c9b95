use alloy::primitives::{Address, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zkarcade_client::accounts::Account;
use zkarcade_client::arcade::{ArcadeApi, ArcadeSession};
use zkarcade_client::batcher::NonceSource;
use zkarcade_client::config::{ChainKind, StressConfig};
use zkarcade_client::deposit::Depositor;
use zkarcade_client::gas::{FeeEstimator, FixedGasPrice};
use zkarcade_client::orchestrator::{BatchOrchestrator, Phase};
use zkarcade_client::prover::{prover_pool, FixtureProver, ProofArtifacts, ProverPool};
use zkarcade_client::ClientError;
use zkarcade_kernel::types::{ProvingSystem, SubmitProofMessage};

const KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9d804cdab365a",
];

/// Start and end of every service call, in the order they happened.
type EventLog = Arc<Mutex<Vec<(Phase, Edge)>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

/// Logs the call around `fut`, holding it for `delay` so slow accounts
/// overlap with fast ones.
async fn traced<T>(events: EventLog, phase: Phase, delay: Duration, fut: impl Future<Output = T>) -> T {
    events.lock().unwrap().push((phase, Edge::Start));
    tokio::time::sleep(delay).await;
    let out = fut.await;
    events.lock().unwrap().push((phase, Edge::End));
    out
}

/// Arcade backend that refuses the agreement for selected addresses and
/// records every submitted proof.
#[derive(Default)]
struct MockArcade {
    reject_agreement: HashSet<Address>,
    slow: Option<Address>,
    events: EventLog,
    submitted: Arc<Mutex<Vec<SubmitProofMessage>>>,
}

struct MockSession {
    reject_agreement: bool,
    delay: Duration,
    events: EventLog,
    submitted: Arc<Mutex<Vec<SubmitProofMessage>>>,
}

fn delay_for(slow: Option<Address>, address: Address) -> Duration {
    if slow == Some(address) {
        Duration::from_millis(80)
    } else {
        Duration::ZERO
    }
}

impl ArcadeApi for MockArcade {
    fn open_session(&self, address: Address) -> BoxFuture<'_, Result<Box<dyn ArcadeSession>, ClientError>> {
        let session = MockSession {
            reject_agreement: self.reject_agreement.contains(&address),
            delay: delay_for(self.slow, address),
            events: self.events.clone(),
            submitted: self.submitted.clone(),
        };
        let (events, delay) = (self.events.clone(), session.delay);
        Box::pin(traced(events, Phase::SessionOk, delay, async move {
            Ok(Box::new(session) as Box<dyn ArcadeSession>)
        }))
    }
}

impl ArcadeSession for MockSession {
    fn sign_agreement<'a>(&'a self, _address: Address, _signature: &'a str) -> BoxFuture<'a, Result<Value, ClientError>> {
        let reject = self.reject_agreement;
        Box::pin(traced(self.events.clone(), Phase::AgreementSigned, self.delay, async move {
            if reject {
                Err(ClientError::Http("POST /wallet/sign 403 Forbidden".into()))
            } else {
                Ok(Value::Null)
            }
        }))
    }

    fn agreement_status(&self, _address: Address) -> BoxFuture<'_, Result<Value, ClientError>> {
        Box::pin(traced(self.events.clone(), Phase::StatusChecked, self.delay, async {
            Ok(json!({ "agreed": true }))
        }))
    }

    fn submit_proof<'a>(
        &'a self,
        message: &'a SubmitProofMessage,
        _game: &'a str,
        _game_idx: u32,
    ) -> BoxFuture<'a, Result<Value, ClientError>> {
        self.submitted.lock().unwrap().push(message.clone());
        Box::pin(traced(self.events.clone(), Phase::Submitted, self.delay, async {
            Ok(json!({ "status": "pending" }))
        }))
    }
}

/// Counts deposits per address; refuses the ones listed in `broke`.
#[derive(Default)]
struct CountingDepositor {
    broke: HashSet<Address>,
    calls: Mutex<Vec<(Address, U256)>>,
    events: EventLog,
}

impl Depositor for CountingDepositor {
    fn deposit<'a>(&'a self, signer: &'a PrivateKeySigner, value: U256) -> BoxFuture<'a, Result<B256, ClientError>> {
        let address = signer.address();
        self.calls.lock().unwrap().push((address, value));
        let broke = self.broke.contains(&address);
        Box::pin(traced(self.events.clone(), Phase::Deposited, Duration::ZERO, async move {
            if broke {
                Err(ClientError::Deposit("insufficient funds for transfer".into()))
            } else {
                Ok(B256::repeat_byte(0xab))
            }
        }))
    }
}

/// Hands out a fixed nonce, or never answers.
struct StaticNonces {
    nonce: Option<U256>,
}

impl NonceSource for StaticNonces {
    fn nonce_for(&self, _address: Address) -> BoxFuture<'_, Result<U256, ClientError>> {
        let nonce = self.nonce;
        Box::pin(async move {
            match nonce {
                Some(n) => Ok(n),
                None => futures::future::pending().await,
            }
        })
    }
}

fn accounts() -> Vec<Account> {
    KEYS.iter()
        .enumerate()
        .map(|(i, k)| Account::from_private_key(i, k).unwrap())
        .collect()
}

fn test_config() -> StressConfig {
    StressConfig {
        chain: ChainKind::Anvil,
        max_jitter: Duration::from_millis(20),
        deposit_wait: Duration::ZERO,
        batcher_timeout: Duration::from_millis(200),
        ..StressConfig::default()
    }
}

fn fixture_pool() -> Arc<ProverPool> {
    let artifacts = ProofArtifacts {
        proving_system: ProvingSystem::CircomGroth16Bn256,
        proof: vec![1, 2, 3, 4],
        public_input: Some(vec![5, 6]),
        verification_key: Some(vec![7, 8, 9]),
        vm_program_code: None,
    };
    Arc::new(prover_pool(2, Arc::new(FixtureProver::new(artifacts))).unwrap())
}

fn orchestrator(arcade: MockArcade, nonce: Option<U256>) -> BatchOrchestrator {
    orchestrator_with(test_config(), arcade, nonce)
}

fn orchestrator_with(config: StressConfig, arcade: MockArcade, nonce: Option<U256>) -> BatchOrchestrator {
    BatchOrchestrator::new(
        config,
        Arc::new(arcade),
        Arc::new(StaticNonces { nonce }),
        FeeEstimator::new(Arc::new(FixedGasPrice(U256::from(20_000_000_000u64))), 16),
        fixture_pool(),
    )
}

#[tokio::test]
async fn agreement_failure_is_isolated_to_one_account() {
    let accounts = accounts();
    let failing = accounts[1].address;
    let arcade = MockArcade {
        reject_agreement: HashSet::from([failing]),
        ..MockArcade::default()
    };
    let submitted = arcade.submitted.clone();

    let summary = orchestrator(arcade, Some(U256::from(3)))
        .run(accounts.clone(), CancellationToken::new())
        .await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.cancelled);

    let failures: Vec<_> = summary.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].address, failing);
    assert_eq!(failures[0].failed_phase, Some(Phase::AgreementSigned));
    assert_eq!(failures[0].phase, Phase::SessionOk);
    assert!(failures[0].error.as_deref().unwrap().starts_with("agreement_signed: "));

    for idx in [0, 2] {
        let report = &summary.accounts[idx];
        assert!(report.ok);
        assert_eq!(report.phase, Phase::Submitted);
        assert_eq!(report.last_status, Some(json!({ "agreed": true })));
    }

    let submitted = submitted.lock().unwrap();
    assert_eq!(submitted.len(), 2);
    assert!(submitted.iter().all(|m| m.verification_data.nonce == U256::from(3)));
    assert!(submitted
        .iter()
        .all(|m| m.verification_data.max_fee == U256::from(783_046_000_000_000u64)));
}

#[tokio::test]
async fn batcher_timeout_fails_proof_generation() {
    let summary = orchestrator(MockArcade::default(), None)
        .run(accounts(), CancellationToken::new())
        .await;

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 3);
    for report in &summary.accounts {
        assert_eq!(report.failed_phase, Some(Phase::ProofGenerated));
        assert_eq!(report.phase, Phase::StatusChecked);
        assert!(report.error.as_deref().unwrap().contains("timed out"));
    }
}

#[tokio::test]
async fn cancellation_reports_unfinished_accounts() {
    let orchestrator = orchestrator(MockArcade::default(), None);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        trigger.cancel();
    });

    // The nonce source never answers, so the run is still in flight when cancelled.
    let summary = tokio::time::timeout(Duration::from_secs(5), orchestrator.run(accounts(), cancel))
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 3);
    assert!(summary
        .accounts
        .iter()
        .all(|r| r.error.as_deref() == Some(format!("{}: Run cancelled", r.failed_phase.unwrap()).as_str())));
}

#[tokio::test]
async fn empty_account_list_yields_empty_summary() {
    let summary = orchestrator(MockArcade::default(), Some(U256::ZERO))
        .run(Vec::new(), CancellationToken::new())
        .await;
    assert_eq!(summary.total, 0);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn no_account_enters_a_phase_before_all_finished_the_previous_one() {
    let accounts = accounts();
    let events = EventLog::default();
    let arcade = MockArcade {
        slow: Some(accounts[0].address),
        events: events.clone(),
        ..MockArcade::default()
    };
    let depositor = Arc::new(CountingDepositor {
        events: events.clone(),
        ..CountingDepositor::default()
    });
    let config = StressConfig {
        max_jitter: Duration::from_millis(150),
        ..test_config()
    };

    let summary = orchestrator_with(config, arcade, Some(U256::from(1)))
        .with_depositor(depositor)
        .run(accounts, CancellationToken::new())
        .await;
    assert_eq!(summary.succeeded, 3);

    let events = events.lock().unwrap();
    let traced_phases = [
        Phase::SessionOk,
        Phase::AgreementSigned,
        Phase::Deposited,
        Phase::StatusChecked,
        Phase::Submitted,
    ];
    for phase in traced_phases {
        assert_eq!(events.iter().filter(|e| **e == (phase, Edge::End)).count(), 3, "{phase}");
    }
    for pair in traced_phases.windows(2) {
        let last_end = events.iter().rposition(|e| *e == (pair[0], Edge::End)).unwrap();
        let first_start = events.iter().position(|e| *e == (pair[1], Edge::Start)).unwrap();
        assert!(
            last_end < first_start,
            "{} started before every account finished {}: {:?}",
            pair[1],
            pair[0],
            *events
        );
    }
}

#[tokio::test]
async fn deposit_runs_once_per_account_on_devnet() {
    let accounts = accounts();
    let depositor = Arc::new(CountingDepositor::default());
    let config = test_config();
    let deposit_value = config.deposit_value;

    let summary = orchestrator_with(config, MockArcade::default(), Some(U256::from(2)))
        .with_depositor(depositor.clone())
        .run(accounts.clone(), CancellationToken::new())
        .await;

    assert_eq!(summary.succeeded, 3);
    let mut calls = depositor.calls.lock().unwrap().clone();
    calls.sort();
    let mut expected: Vec<_> = accounts.iter().map(|a| (a.address, deposit_value)).collect();
    expected.sort();
    assert_eq!(calls, expected);
}

#[tokio::test]
async fn deposit_failure_is_isolated_to_one_account() {
    let accounts = accounts();
    let broke = accounts[2].address;
    let depositor = Arc::new(CountingDepositor {
        broke: HashSet::from([broke]),
        ..CountingDepositor::default()
    });
    let arcade = MockArcade::default();
    let submitted = arcade.submitted.clone();

    let summary = orchestrator(arcade, Some(U256::from(2)))
        .with_depositor(depositor.clone())
        .run(accounts, CancellationToken::new())
        .await;

    assert_eq!(depositor.calls.lock().unwrap().len(), 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let failures: Vec<_> = summary.failures().collect();
    assert_eq!(failures[0].address, broke);
    assert_eq!(failures[0].failed_phase, Some(Phase::Deposited));
    assert_eq!(failures[0].phase, Phase::AgreementSigned);
    assert!(failures[0].error.as_deref().unwrap().starts_with("deposited: Deposit failed"));

    assert_eq!(summary.accounts[0].phase, Phase::Submitted);
    assert_eq!(summary.accounts[1].phase, Phase::Submitted);
    assert_eq!(submitted.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn sepolia_never_deposits() {
    let depositor = Arc::new(CountingDepositor::default());
    let config = StressConfig {
        chain: ChainKind::Sepolia,
        ..test_config()
    };

    let summary = orchestrator_with(config, MockArcade::default(), Some(U256::from(2)))
        .with_depositor(depositor.clone())
        .run(accounts(), CancellationToken::new())
        .await;

    assert_eq!(summary.succeeded, 3);
    assert!(depositor.calls.lock().unwrap().is_empty());
    assert!(summary.accounts.iter().all(|r| r.phase == Phase::Submitted));
}
