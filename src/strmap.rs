//! Static name → entry-index hash map
//!
//! We emit a static hash table for entry-point lookup. The hash function
//! is a linear congruential accumulator over the name bytes with a
//! power-of-two table size; the prime numbers were determined
//! experimentally. All entry names live in one packed, NUL-separated
//! string blob so the emitted table needs a single relocation instead of
//! one per name; entries store byte offsets into the blob.

use crate::error::{GenError, Result};
use serde::Serialize;
use std::collections::HashSet;

pub const PRIME_FACTOR: u32 = 5024183;
pub const PRIME_STEP: u32 = 19;

/// Sentinel stored in empty hash slots
pub const NO_ENTRY: u16 = 0xffff;

/// The 32-bit name hash, reproduced byte-for-byte by the runtime lookup
pub fn hash_name(name: &str) -> u32 {
    let mut h: u32 = 0;
    for byte in name.bytes() {
        h = h.wrapping_mul(PRIME_FACTOR).wrapping_add(u32::from(byte));
    }
    h
}

/// One name in the packed string table, sorted lexicographically
#[derive(Debug, Clone, Serialize)]
pub struct StringMapEntry {
    pub name: String,
    /// Byte offset of the name inside the packed blob
    pub offset: u32,
    pub hash: u32,
    /// Dense per-category entry index, the lookup payload
    pub entry_index: u32,
}

/// A baked string map for one category
#[derive(Debug, Clone, Serialize)]
pub struct StringMap {
    /// NUL-separated names, lexicographically sorted
    pub strings: String,
    /// Entries sorted to match the blob
    pub entries: Vec<StringMapEntry>,
    /// Open-addressing slots; `NO_ENTRY` marks an empty slot, anything
    /// else indexes `entries`
    pub slots: Vec<u16>,
    /// Probe-depth histogram: buckets 0..=8, plus "9 or more"
    pub collisions: [u32; 10],
}

/// Accumulates names before baking the table
#[derive(Debug, Default)]
pub struct StringMapBuilder {
    names: Vec<(String, u32)>,
    seen: HashSet<String>,
}

impl StringMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name with its entry index
    pub fn add(&mut self, name: &str, entry_index: u32) -> Result<()> {
        if !self.seen.insert(name.to_string()) {
            return Err(GenError::registry(format!("duplicate entry name {name}")));
        }
        if entry_index >= u32::from(NO_ENTRY) {
            return Err(GenError::Capacity(format!(
                "entry index {entry_index} does not fit 16-bit hash slots"
            )));
        }
        self.names.push((name.to_string(), entry_index));
        Ok(())
    }

    /// Bake the packed blob, sorted entry array, and probe table.
    /// Deterministic for a fixed input set: insertion happens in the
    /// sorted order used for the blob.
    pub fn build(self) -> Result<StringMap> {
        let mut named: Vec<(String, u32)> = self.names;
        named.sort_by(|a, b| a.0.cmp(&b.0));

        let mut strings = String::new();
        let mut entries = Vec::with_capacity(named.len());
        for (name, entry_index) in named {
            let offset = strings.len() as u32;
            let hash = hash_name(&name);
            strings.push_str(&name);
            strings.push('\0');
            entries.push(StringMapEntry {
                name,
                offset,
                hash,
                entry_index,
            });
        }

        let capacity = table_capacity(entries.len());
        let mask = capacity as u32 - 1;
        let mut slots = vec![NO_ENTRY; capacity];
        let mut collisions = [0u32; 10];

        for (idx, entry) in entries.iter().enumerate() {
            let mut h = entry.hash;
            let mut depth = 0usize;
            while slots[(h & mask) as usize] != NO_ENTRY {
                h = h.wrapping_add(PRIME_STEP);
                depth += 1;
                // Capacity always exceeds occupancy and the step is odd,
                // so the probe sequence visits every slot; running past
                // that means the planning above is broken.
                if depth > capacity {
                    return Err(GenError::Capacity(
                        "hash probe sequence exhausted the table".to_string(),
                    ));
                }
            }
            collisions[depth.min(9)] += 1;
            slots[(h & mask) as usize] = idx as u16;
        }

        Ok(StringMap {
            strings,
            entries,
            slots,
            collisions,
        })
    }
}

impl StringMap {
    /// Look up a full entry name, reproducing the emitted runtime probe:
    /// same hash, same step, hash *and* string compared on each hit.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        let mask = self.slots.len() as u32 - 1;
        let hash = hash_name(name);
        let mut h = hash;
        for _ in 0..self.slots.len() {
            let slot = self.slots[(h & mask) as usize];
            if slot == NO_ENTRY {
                return None;
            }
            let entry = &self.entries[usize::from(slot)];
            // Hash equality alone is not sufficient
            if entry.hash == hash && self.string_at(entry.offset) == name {
                return Some(entry.entry_index);
            }
            h = h.wrapping_add(PRIME_STEP);
        }
        None
    }

    /// The NUL-terminated name starting at `offset` in the blob
    pub fn string_at(&self, offset: u32) -> &str {
        let rest = &self.strings[offset as usize..];
        match rest.find('\0') {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Smallest power of two ≥ 1.25 × the entry count, never zero
fn table_capacity(entry_count: usize) -> usize {
    let want = (entry_count as f64 * 1.25).ceil() as usize;
    want.next_power_of_two().max(1)
}
