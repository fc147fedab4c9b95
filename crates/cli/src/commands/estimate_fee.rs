// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use zkarcade_client::gas::RpcGasPriceSource;
use zkarcade_kernel::fee;

pub async fn run(rpc_url: &str, batch_size: u64) -> anyhow::Result<()> {
    let gas_price = RpcGasPriceSource::new(rpc_url).fetch().await?;
    let max_fee = fee::estimate_max_fee_per_proof(gas_price, batch_size)?;

    println!("gas price:        {} wei", gas_price);
    println!("batch size:       {}", batch_size);
    println!("gas per proof:    {}", fee::gas_per_proof(batch_size)?);
    println!("max fee / proof:  {} wei", max_fee);
    Ok(())
}
