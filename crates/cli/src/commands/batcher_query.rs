// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::cli::BatcherQueryArgs;
use std::time::Duration;
use zkarcade_client::batcher::{BatcherClient, QueryKind};
use zkarcade_client::ClientError;

pub async fn run(kind: QueryKind, args: BatcherQueryArgs) -> anyhow::Result<()> {
    let client = BatcherClient::new(args.batcher_url.clone());
    let after = Duration::from_secs(args.timeout_secs);

    let query = async {
        match kind {
            QueryKind::Nonce => client.get_nonce(args.address).await,
            QueryKind::MaxFee => client.get_max_fee(args.address).await,
        }
    };
    let value = tokio::time::timeout(after, query)
        .await
        .map_err(|_| ClientError::Timeout {
            what: "batcher query",
            after,
        })??;

    println!("{} {}: {}", args.address, kind.as_str(), value);
    Ok(())
}
