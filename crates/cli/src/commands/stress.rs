// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::cli::{ProverArgs, StressArgs};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use zkarcade_client::accounts::load_accounts;
use zkarcade_client::arcade::HttpArcadeApi;
use zkarcade_client::batcher::BatcherClient;
use zkarcade_client::deposit::RpcDepositor;
use zkarcade_client::gas::{FeeEstimator, RpcGasPriceSource};
use zkarcade_client::orchestrator::{BatchOrchestrator, BatchSummary};
use zkarcade_client::prover::{prover_pool, CommandProver, FixtureProver, Prover};
use zkarcade_client::telemetry::render_metrics;

fn build_prover(args: &ProverArgs, prover_args: &[String]) -> anyhow::Result<Arc<dyn Prover>> {
    match (&args.prover_cmd, &args.fixture) {
        (Some(cmd), _) => Ok(Arc::new(CommandProver::new(cmd.clone(), prover_args.to_vec()))),
        (None, Some(path)) => Ok(Arc::new(FixtureProver::from_file(path)?)),
        (None, None) => anyhow::bail!("either --prover-cmd or --fixture is required"),
    }
}

pub async fn run(args: StressArgs) -> anyhow::Result<()> {
    let config = args.to_config();
    let accounts = load_accounts(&args.accounts)?;
    if accounts.is_empty() {
        anyhow::bail!("no accounts found in {}", args.accounts.display());
    }

    tracing::info!(
        "Running {} accounts against {} (chain {}, {} workers)",
        accounts.len(),
        config.arcade_url,
        config.chain.name(),
        config.pool_size
    );

    let prover = build_prover(&args.prover, &args.prover_args)?;
    let pool = Arc::new(prover_pool(config.pool_size, prover)?);
    let fees = FeeEstimator::new(
        Arc::new(RpcGasPriceSource::new(config.rpc_url.clone())),
        config.proofs_per_batch,
    );

    let mut orchestrator = BatchOrchestrator::new(
        config.clone(),
        Arc::new(HttpArcadeApi::new(config.arcade_url.clone())),
        Arc::new(BatcherClient::new(config.batcher_url.clone())),
        fees,
        pool.clone(),
    );
    if !args.no_deposit {
        let depositor = RpcDepositor::new(&config.rpc_url, config.payment_service_addr)?;
        orchestrator = orchestrator.with_depositor(Arc::new(depositor));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling the run");
            on_signal.cancel();
        }
    });

    let summary = orchestrator.run(accounts, cancel).await;
    pool.terminate();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    if args.metrics {
        println!("{}", render_metrics());
    }
    Ok(())
}

pub fn print_summary(summary: &BatchSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Address", "Result", "Last Phase", "Error"]);

    for report in &summary.accounts {
        let result = if report.ok { "SENT" } else { "FAILED" };
        table.add_row(vec![
            report.index.to_string(),
            report.address.to_string(),
            result.to_string(),
            report.phase.to_string(),
            report.error.clone().unwrap_or_default(),
        ]);
    }

    println!("\nStress Run Summary");
    println!("------------------");
    println!("{table}");
    println!(
        "total: {}  success: {}  failed: {}{}\n",
        summary.total,
        summary.succeeded,
        summary.failed,
        if summary.cancelled { "  (cancelled)" } else { "" }
    );
}
