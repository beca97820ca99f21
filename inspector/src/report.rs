//! # JSON Reports
//!
//! Everything the inspector prints is built here. Hashes and addresses are
//! base58, the way explorers show them; raw bytes are hex.

use anyhow::Result;
use serde_json::{json, Value};

use code_vm_mirror::crypto::Hash;
use code_vm_mirror::memory::{MemoryAccountHeader, MemoryAllocator, PagedMemory};
use code_vm_mirror::{VirtualAccount, ZeroSubtrees};

fn hashes(list: &[Hash]) -> Vec<String> {
    list.iter().map(Hash::to_string).collect()
}

pub fn zeros(seed_parts: &[Vec<u8>], zeros: &ZeroSubtrees) -> Value {
    json!({
        "seed_parts": seed_parts.iter().map(hex::encode).collect::<Vec<_>>(),
        "depth": zeros.depth(),
        "empty_leaf": zeros.empty_leaf().to_string(),
        "empty_root": zeros.empty_root().to_string(),
        "zero_values": hashes(zeros.as_slice()),
    })
}

pub fn account(account: &VirtualAccount) -> Result<Value> {
    let fields = match account {
        VirtualAccount::Nonce(nonce) => json!({
            "address": nonce.address.to_string(),
            "nonce": nonce.nonce.to_string(),
        }),
        VirtualAccount::Timelock(timelock) => json!({
            "owner": timelock.owner.to_string(),
            "nonce": timelock.nonce.to_string(),
            "token_bump": timelock.token_bump,
            "unlock_bump": timelock.unlock_bump,
            "receipt_bump": timelock.receipt_bump,
            "balance": timelock.balance,
            "bump": timelock.bump,
        }),
        VirtualAccount::Relay(relay) => json!({
            "address": relay.address.to_string(),
            "commitment": relay.commitment.to_string(),
            "recent_root": relay.recent_root.to_string(),
            "destination": relay.destination.to_string(),
        }),
    };

    Ok(json!({
        "variant": account.variant().to_string(),
        "size": account.get_size(),
        "hash": account.get_hash()?.to_string(),
        "fields": fields,
    }))
}

pub fn header(header: &MemoryAccountHeader) -> Value {
    json!({
        "discriminator": hex::encode(header.discriminator),
        "vm": header.vm.to_string(),
        "bump": header.bump,
        "name": header.name_str(),
        "layout": header.layout.to_string(),
    })
}

/// Overview of a parsed memory account. Slots that don't decode are listed
/// with the error instead of failing the whole report.
pub fn memory(header: Option<&MemoryAccountHeader>, memory: &PagedMemory) -> Value {
    let config = memory.config();

    let sectors: Vec<Value> = memory
        .sectors()
        .iter()
        .enumerate()
        .map(|(i, sector)| {
            json!({
                "sector": i,
                "num_allocated": sector.num_allocated(),
                "num_empty": sector.num_empty(),
            })
        })
        .collect();

    let slots: Vec<Value> = memory
        .allocated_slots()
        .filter_map(|index| memory.account_index(index).map(|entry| (index, *entry)))
        .map(|(index, entry)| {
            let mut slot = json!({
                "index": index,
                "size": entry.size,
                "sector": entry.sector,
                "page": entry.page,
            });
            match memory.read_account(index) {
                Ok(account) => slot["variant"] = json!(account.variant().to_string()),
                Err(err) => slot["error"] = json!(err.to_string()),
            }
            slot
        })
        .collect();

    json!({
        "header": header.map(self::header),
        "layout": config.layout.to_string(),
        "page_size": config.page_size(),
        "max_accounts": config.max_accounts,
        "num_sectors": config.num_sectors,
        "allocated": slots.len(),
        "sectors": sectors,
        "slots": slots,
    })
}

pub fn slot(memory: &PagedMemory, index: u16) -> Result<Value> {
    let data = memory.read(index)?;
    let account = VirtualAccount::unpack(&data)?;
    Ok(json!({
        "index": index,
        "data": hex::encode(&data),
        "account": self::account(&account)?,
    }))
}

pub fn verification(root: &Hash, leaf: &Hash, siblings: &[Hash], valid: bool) -> Value {
    json!({
        "root": root.to_string(),
        "leaf": leaf.to_string(),
        "proof": hashes(siblings),
        "valid": valid,
    })
}
