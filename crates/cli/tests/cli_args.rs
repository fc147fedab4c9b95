use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use zkarcade_cli::cli::{Cli, Commands};
use zkarcade_cli::commands::commitment;
use zkarcade_client::config::ChainKind;
use zkarcade_kernel::commitment::commit;
use zkarcade_kernel::types::ProvingSystem;
use zkarcade_kernel::U256;

#[test]
fn stress_requires_a_prover() {
    let parsed = Cli::try_parse_from(["zkarcade", "stress", "--accounts", "keys.json"]);
    assert!(parsed.is_err());

    let parsed = Cli::try_parse_from([
        "zkarcade",
        "stress",
        "--accounts",
        "keys.json",
        "--fixture",
        "proof.json",
        "--prover-cmd",
        "prove",
    ]);
    assert!(parsed.is_err(), "prover sources are mutually exclusive");
}

#[test]
fn stress_args_map_onto_config() {
    let cli = Cli::try_parse_from([
        "zkarcade",
        "stress",
        "-a",
        "keys.json",
        "--prover-cmd",
        "node",
        "--prover-arg",
        "prove.js",
        "--chain",
        "sepolia",
        "--pool-size",
        "3",
        "--max-jitter-ms",
        "0",
        "--deposit-wei",
        "1000",
        "--batcher-timeout-secs",
        "5",
        "--game-idx",
        "2",
    ])
    .unwrap();

    let Commands::Stress(args) = cli.command else {
        panic!("expected the stress command");
    };
    assert_eq!(args.prover_args, vec!["prove.js".to_string()]);

    let config = args.to_config();
    assert_eq!(config.chain, ChainKind::Sepolia);
    assert_eq!(config.chain_id(), U256::from(11155111u64));
    assert_eq!(config.pool_size, 3);
    assert_eq!(config.max_jitter, Duration::ZERO);
    assert_eq!(config.deposit_value, U256::from(1000u64));
    assert_eq!(config.batcher_timeout, Duration::from_secs(5));
    assert_eq!(config.game, "Parity");
    assert_eq!(config.game_idx, 2);
    assert_eq!(config.proofs_per_batch, 16);
}

#[test]
fn unknown_chain_is_rejected() {
    let parsed = Cli::try_parse_from([
        "zkarcade",
        "stress",
        "-a",
        "keys.json",
        "--fixture",
        "p.json",
        "--chain",
        "holesky",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn batcher_queries_parse_addresses() {
    let cli = Cli::try_parse_from([
        "zkarcade",
        "nonce",
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        "--batcher-url",
        "ws://batcher:8080",
    ])
    .unwrap();
    let Commands::Nonce(args) = cli.command else {
        panic!("expected the nonce command");
    };
    assert_eq!(args.batcher_url, "ws://batcher:8080");
    assert_eq!(args.timeout_secs, 30);

    assert!(Cli::try_parse_from(["zkarcade", "max-fee", "not-an-address"]).is_err());
}

#[test]
fn commitment_command_matches_the_kernel() {
    let mut proof = NamedTempFile::new().unwrap();
    proof.write_all(&[1, 2, 3, 4]).unwrap();
    let mut vk = NamedTempFile::new().unwrap();
    vk.write_all(&[9, 9]).unwrap();

    let cli = Cli::try_parse_from([
        "zkarcade",
        "commitment",
        "--proof",
        proof.path().to_str().unwrap(),
        "--verification-key",
        vk.path().to_str().unwrap(),
        "--proving-system",
        "sp1",
        "--generator",
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    ])
    .unwrap();
    let Commands::Commitment(args) = cli.command else {
        panic!("expected the commitment command");
    };
    assert_eq!(args.proving_system, ProvingSystem::Sp1);

    let computed = commitment::compute(&args).unwrap();
    let expected = commit(
        &[1, 2, 3, 4],
        None,
        ProvingSystem::Sp1,
        Some(&[9u8, 9][..]),
        None,
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
    )
    .unwrap();
    assert_eq!(computed, expected);
    assert!(commitment::run(&args).is_ok());
}

#[test]
fn commitment_rejects_both_aux_inputs() {
    let parsed = Cli::try_parse_from([
        "zkarcade",
        "commitment",
        "--proof",
        "p.bin",
        "--verification-key",
        "vk.bin",
        "--vm-program-code",
        "elf.bin",
        "--generator",
        "0x00",
    ]);
    assert!(parsed.is_err());
}
