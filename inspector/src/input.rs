//! Parsing what the operator types or points us at.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use code_vm_mirror::crypto::Hash;
use code_vm_mirror::MemoryConfig;

fn is_hex(s: &str) -> bool {
    s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode hex, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim().trim_start_matches("0x");
    hex::decode(s).with_context(|| format!("not valid hex: {s:?}"))
}

/// A 32-byte hash, as 64 hex characters or base58.
pub fn parse_hash(s: &str) -> Result<Hash> {
    let s = s.trim();
    let bytes = if s.len() == 64 && is_hex(s) {
        parse_hex(s)?
    } else {
        bs58::decode(s)
            .into_vec()
            .with_context(|| format!("not valid hex or base58: {s:?}"))?
    };
    Hash::try_from_slice(&bytes).with_context(|| format!("bad hash {s:?}"))
}

/// One extra seed part. Hex when it looks like hex, otherwise base58 (the
/// usual case: a VM or mint address).
pub fn parse_seed_part(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if is_hex(s) {
        return parse_hex(s);
    }
    bs58::decode(s)
        .into_vec()
        .with_context(|| format!("seed part is neither hex nor base58: {s:?}"))
}

/// Memory geometry: from a JSON file when given, otherwise one of the
/// presets.
pub fn load_memory_config(path: Option<&Path>, production: bool) -> Result<MemoryConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read memory config {}", path.display()))?;
            serde_json::from_str::<MemoryConfig>(&raw)
                .with_context(|| format!("failed to parse memory config {}", path.display()))?
        }
        None if production => MemoryConfig::production(),
        None => MemoryConfig::test(),
    };

    config.validate().context("invalid memory config")?;
    Ok(config)
}

/// Rejects depths the mirror can't build a tree for.
pub fn check_depth(depth: u8) -> Result<u8> {
    if depth == 0 || depth > code_vm_mirror::config::MAX_TREE_DEPTH {
        bail!(
            "depth must be 1..={}, got {depth}",
            code_vm_mirror::config::MAX_TREE_DEPTH
        );
    }
    Ok(depth)
}
