// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use zkarcade_client::config::{ChainKind, StressConfig};
use zkarcade_kernel::config::DEFAULT_PROOFS_PER_BATCH;
use zkarcade_kernel::types::ProvingSystem;
use zkarcade_kernel::{Address, U256};

#[derive(Parser, Debug)]
#[command(name = "zkarcade")]
#[command(about = "zkarcade proof submission client and stress harness", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a set of accounts through the full submission flow
    Stress(StressArgs),
    /// Ask the batcher for an account's next nonce
    Nonce(BatcherQueryArgs),
    /// Ask the batcher for the max fee of an account's last submission
    MaxFee(BatcherQueryArgs),
    /// Estimate the per-proof max fee from the live gas price
    EstimateFee {
        #[arg(long, env = "RPC_URL", default_value = "http://localhost:8545")]
        rpc_url: String,

        /// Proofs assumed per batch
        #[arg(long, default_value_t = DEFAULT_PROOFS_PER_BATCH)]
        batch_size: u64,
    },
    /// Compute the commitment of a proof and its companions
    Commitment(CommitmentArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NetworkArgs {
    #[arg(long, env = "RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: String,

    #[arg(long, env = "ZK_ARCADE_URL", default_value = "http://localhost:4005")]
    pub arcade_url: String,

    #[arg(long, env = "BATCHER_URL", default_value = "ws://localhost:8080")]
    pub batcher_url: String,

    #[arg(
        long,
        env = "BATCHER_PAYMENT_SERVICE_ADDR",
        default_value = "0x7bc06c482DEAd17c0e297aFbC32f6e63d3846650"
    )]
    pub payment_service_addr: Address,

    /// anvil, sepolia or mainnet
    #[arg(long, env = "CHAIN_NAME", default_value = "anvil")]
    pub chain: ChainKind,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ProverArgs {
    /// External prover program, run once per proof
    #[arg(long)]
    pub prover_cmd: Option<PathBuf>,

    /// JSON file with precomputed proof artifacts
    #[arg(long)]
    pub fixture: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StressArgs {
    /// JSON file with private keys or {address, privateKey} objects
    #[arg(long, short)]
    pub accounts: PathBuf,

    #[command(flatten)]
    pub network: NetworkArgs,

    #[command(flatten)]
    pub prover: ProverArgs,

    /// Extra argument for the prover program (repeatable)
    #[arg(long = "prover-arg", requires = "prover_cmd", allow_hyphen_values = true)]
    pub prover_args: Vec<String>,

    /// Worker threads for proof generation [default: available parallelism]
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Upper bound of the random delay before each step
    #[arg(long, default_value_t = 3_000)]
    pub max_jitter_ms: u64,

    /// Deposit per account, in wei
    #[arg(long, default_value = "100000000000000000")]
    pub deposit_wei: U256,

    #[arg(long, default_value_t = 10)]
    pub deposit_wait_secs: u64,

    /// Skip the deposit phase on every chain
    #[arg(long)]
    pub no_deposit: bool,

    #[arg(long, default_value_t = 30)]
    pub batcher_timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_PROOFS_PER_BATCH)]
    pub proofs_per_batch: u64,

    #[arg(long, default_value = "Parity")]
    pub game: String,

    #[arg(long, default_value_t = 0)]
    pub game_idx: u32,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Print Prometheus metrics after the run
    #[arg(long)]
    pub metrics: bool,
}

impl StressArgs {
    pub fn to_config(&self) -> StressConfig {
        let defaults = StressConfig::default();
        StressConfig {
            rpc_url: self.network.rpc_url.clone(),
            arcade_url: self.network.arcade_url.clone(),
            batcher_url: self.network.batcher_url.clone(),
            payment_service_addr: self.network.payment_service_addr,
            chain: self.network.chain,
            pool_size: self.pool_size.unwrap_or(defaults.pool_size),
            max_jitter: Duration::from_millis(self.max_jitter_ms),
            deposit_value: self.deposit_wei,
            deposit_wait: Duration::from_secs(self.deposit_wait_secs),
            batcher_timeout: Duration::from_secs(self.batcher_timeout_secs),
            proofs_per_batch: self.proofs_per_batch,
            game: self.game.clone(),
            game_idx: self.game_idx,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BatcherQueryArgs {
    pub address: Address,

    #[arg(long, env = "BATCHER_URL", default_value = "ws://localhost:8080")]
    pub batcher_url: String,

    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Args, Debug, Clone)]
pub struct CommitmentArgs {
    /// Raw proof bytes
    #[arg(long)]
    pub proof: PathBuf,

    #[arg(long)]
    pub public_input: Option<PathBuf>,

    #[arg(long, conflicts_with = "vm_program_code")]
    pub verification_key: Option<PathBuf>,

    #[arg(long)]
    pub vm_program_code: Option<PathBuf>,

    #[arg(long, default_value = "CircomGroth16Bn256")]
    pub proving_system: ProvingSystem,

    /// Hex address of the proof generator
    #[arg(long)]
    pub generator: String,

    #[arg(long)]
    pub json: bool,
}
