// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::Parser;
use zkarcade_cli::cli::{Cli, Commands};
use zkarcade_cli::commands::{batcher_query, commitment, estimate_fee, stress};
use zkarcade_client::batcher::QueryKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    zkarcade_client::telemetry::init_telemetry();

    match cli.command {
        Commands::Stress(args) => stress::run(args).await,
        Commands::Nonce(args) => batcher_query::run(QueryKind::Nonce, args).await,
        Commands::MaxFee(args) => batcher_query::run(QueryKind::MaxFee, args).await,
        Commands::EstimateFee { rpc_url, batch_size } => estimate_fee::run(&rpc_url, batch_size).await,
        Commands::Commitment(args) => commitment::run(&args),
    }
}
