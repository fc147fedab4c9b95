// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::cli::CommitmentArgs;
use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;
use zkarcade_kernel::commitment::{commit, VerificationDataCommitment};
use zkarcade_kernel::hex_serde::encode_prefixed;

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn read_opt(path: Option<&Path>) -> anyhow::Result<Option<Vec<u8>>> {
    path.map(read).transpose()
}

pub fn compute(args: &CommitmentArgs) -> anyhow::Result<VerificationDataCommitment> {
    let proof = read(&args.proof)?;
    let public_input = read_opt(args.public_input.as_deref())?;
    let verification_key = read_opt(args.verification_key.as_deref())?;
    let vm_program_code = read_opt(args.vm_program_code.as_deref())?;

    Ok(commit(
        &proof,
        public_input.as_deref(),
        args.proving_system,
        verification_key.as_deref(),
        vm_program_code.as_deref(),
        &args.generator,
    )?)
}

pub fn run(args: &CommitmentArgs) -> anyhow::Result<()> {
    let c = compute(args)?;

    if args.json {
        let value = serde_json::json!({
            "proofCommitment": encode_prefixed(c.proof_commitment),
            "pubInputCommitment": encode_prefixed(c.pub_input_commitment),
            "provingSystemAuxDataCommitment": encode_prefixed(c.proving_system_aux_data_commitment),
            "commitmentDigest": encode_prefixed(c.commitment_digest),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Commitment", "Keccak-256"]);
    table.add_row(vec!["proof".to_string(), encode_prefixed(c.proof_commitment)]);
    table.add_row(vec!["public input".to_string(), encode_prefixed(c.pub_input_commitment)]);
    table.add_row(vec![
        format!("aux data ({})", args.proving_system),
        encode_prefixed(c.proving_system_aux_data_commitment),
    ]);
    table.add_row(vec!["digest".to_string(), encode_prefixed(c.commitment_digest)]);
    println!("{table}");
    Ok(())
}
