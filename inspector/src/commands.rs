//! Subcommand handlers. Each one returns the JSON report; `main` prints it.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use tracing::{debug, info};

use code_vm_mirror::merkle::{as_leaf, verify};
use code_vm_mirror::{PagedMemory, VirtualAccount, ZeroSubtrees};

use crate::cli::{DecodeArgs, MemoryArgs, VerifyArgs, ZerosArgs};
use crate::input::{check_depth, load_memory_config, parse_hash, parse_hex, parse_seed_part};
use crate::report;

pub fn zeros(args: &ZerosArgs) -> Result<Value> {
    let depth = check_depth(args.depth)?;

    let mut seed_parts = vec![args.seed.as_bytes().to_vec()];
    for part in &args.seed_parts {
        seed_parts.push(parse_seed_part(part)?);
    }
    let refs: Vec<&[u8]> = seed_parts.iter().map(Vec::as_slice).collect();

    let zeros = ZeroSubtrees::derive_from_parts(&refs, depth);
    debug!(depth, parts = seed_parts.len(), "zero table derived");
    Ok(report::zeros(&seed_parts, &zeros))
}

pub fn decode(args: &DecodeArgs) -> Result<Value> {
    let data = parse_hex(&args.data)?;
    let account = VirtualAccount::unpack(&data).context("failed to decode virtual account")?;
    report::account(&account)
}

pub fn memory(args: &MemoryArgs) -> Result<Value> {
    let mut config = load_memory_config(args.config.as_deref(), args.production)?;
    if let Some(layout) = args.layout {
        config = config.with_layout(layout);
    }
    let data = fs::read(&args.path)
        .with_context(|| format!("failed to read memory dump {}", args.path.display()))?;

    let (header, memory) = if args.no_header {
        let memory = PagedMemory::from_bytes(config, &data).context("failed to parse memory slab")?;
        (None, memory)
    } else {
        let (header, memory) = PagedMemory::from_account_data(config, &data)
            .context("failed to parse memory account")?;
        (Some(header), memory)
    };

    info!(
        path = %args.path.display(),
        bytes = data.len(),
        layout = %memory.config().layout,
        allocated = memory.allocated_slots().count(),
        "memory dump parsed"
    );

    match args.slot {
        Some(index) => report::slot(&memory, index)
            .with_context(|| format!("failed to read slot {index}")),
        None => Ok(report::memory(header.as_ref(), &memory)),
    }
}

pub fn verify_proof(args: &VerifyArgs) -> Result<Value> {
    let root = parse_hash(&args.root).context("bad --root")?;
    let leaf = match (&args.leaf, &args.value) {
        (Some(leaf), _) => parse_hash(leaf).context("bad --leaf")?,
        (None, Some(value)) => as_leaf(&parse_hex(value).context("bad --value")?),
        (None, None) => bail!("either --leaf or --value is required"),
    };
    let siblings = args
        .siblings
        .iter()
        .map(|s| parse_hash(s))
        .collect::<Result<Vec<_>>>()
        .context("bad --sibling")?;

    let valid = verify(&siblings, &root, &leaf);
    info!(%root, %leaf, levels = siblings.len(), valid, "proof checked");
    Ok(report::verification(&root, &leaf, &siblings, valid))
}
