//! # CLI Interface
//!
//! Command-line structure for `cvm-inspect`, via `clap` derive. Five
//! subcommands: `zeros`, `decode`, `memory`, `verify` and `version`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use code_vm_mirror::config::COMPRESSED_STATE_DEPTH;
use code_vm_mirror::MemoryLayout;

/// Inspect Code VM state offline.
///
/// Decodes virtual accounts and memory-account dumps, derives the zero
/// table of a compressed-state tree, and checks Merkle proofs. Every
/// command prints a JSON report on stdout.
#[derive(Parser, Debug)]
#[command(
    name = "cvm-inspect",
    about = "Inspect Code VM memory dumps, zero tables and proofs",
    version,
    propagate_version = true
)]
pub struct InspectorCli {
    /// Default log filter, used when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "CVM_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format: "pretty" or "json".
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the zero-subtree table for a tree seed and depth.
    Zeros(ZerosArgs),
    /// Decode one hex-encoded virtual account (variant tag included).
    Decode(DecodeArgs),
    /// Parse a raw memory-account dump and list its slots.
    Memory(MemoryArgs),
    /// Check a Merkle proof against a root.
    Verify(VerifyArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct ZerosArgs {
    /// Tree seed, as UTF-8 text.
    #[arg(long, env = "CVM_TREE_SEED", default_value = "merkletree")]
    pub seed: String,

    /// Extra seed parts appended after `--seed`: a base58 pubkey or hex bytes.
    /// Repeat for several parts, in order.
    #[arg(long = "seed-part")]
    pub seed_parts: Vec<String>,

    /// Tree depth.
    #[arg(long, default_value_t = COMPRESSED_STATE_DEPTH)]
    pub depth: u8,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Packed account bytes in hex: `tag ‖ payload`.
    pub data: String,
}

#[derive(Args, Debug)]
pub struct MemoryArgs {
    /// Path to the dumped account data.
    pub path: PathBuf,

    /// JSON file with the memory geometry (`max_accounts`, `num_sectors`,
    /// optional `layout`).
    #[arg(long, short = 'c', env = "CVM_MEMORY_CONFIG", conflicts_with = "production")]
    pub config: Option<PathBuf>,

    /// Use the full-capacity geometry (65,535 slots, 255 sectors).
    #[arg(long)]
    pub production: bool,

    /// The dump is a bare slab with no 74-byte account header.
    #[arg(long)]
    pub no_header: bool,

    /// Page layout of a bare slab: mixed, timelock, nonce or relay. With a
    /// header, the header's layout byte decides.
    #[arg(long, requires = "no_header")]
    pub layout: Option<MemoryLayout>,

    /// Print only this slot, fully decoded.
    #[arg(long)]
    pub slot: Option<u16>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Expected root (hex or base58).
    #[arg(long)]
    pub root: String,

    /// Leaf hash to prove (hex or base58).
    #[arg(long, required_unless_present = "value", conflicts_with = "value")]
    pub leaf: Option<String>,

    /// Raw value in hex; the leaf is its SHA-256.
    #[arg(long)]
    pub value: Option<String>,

    /// Proof siblings from the leaf level up (hex or base58). Repeat once
    /// per level.
    #[arg(long = "sibling")]
    pub siblings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        InspectorCli::command().debug_assert();
    }

    #[test]
    fn test_zeros_defaults() {
        let cli = InspectorCli::try_parse_from(["cvm-inspect", "zeros"]).unwrap();
        match cli.command {
            Commands::Zeros(args) => {
                assert_eq!(args.depth, COMPRESSED_STATE_DEPTH);
                assert!(args.seed_parts.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verify_needs_leaf_or_value() {
        assert!(InspectorCli::try_parse_from(["cvm-inspect", "verify", "--root", "00"]).is_err());
        assert!(InspectorCli::try_parse_from([
            "cvm-inspect",
            "verify",
            "--root",
            "00",
            "--leaf",
            "11",
            "--value",
            "22",
        ])
        .is_err());

        let cli = InspectorCli::try_parse_from([
            "cvm-inspect",
            "verify",
            "--root",
            "00",
            "--value",
            "22",
            "--sibling",
            "aa",
            "--sibling",
            "bb",
        ])
        .unwrap();
        match cli.command {
            Commands::Verify(args) => assert_eq!(args.siblings, vec!["aa", "bb"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_memory_layout_needs_bare_slab() {
        assert!(
            InspectorCli::try_parse_from(["cvm-inspect", "memory", "dump.bin", "--layout", "nonce"])
                .is_err()
        );

        let cli = InspectorCli::try_parse_from([
            "cvm-inspect",
            "memory",
            "slab.bin",
            "--no-header",
            "--layout",
            "Relay",
        ])
        .unwrap();
        match cli.command {
            Commands::Memory(args) => assert_eq!(args.layout, Some(MemoryLayout::Relay)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_memory_config_conflicts_with_production() {
        assert!(InspectorCli::try_parse_from([
            "cvm-inspect",
            "memory",
            "dump.bin",
            "--config",
            "mem.json",
            "--production",
        ])
        .is_err());
    }
}
