//! Dispatch-table layout
//!
//! Assigns every non-alias entry point in a category a dense dispatch slot
//! (the compaction index), in declaration order. Aliases never get their
//! own slot; at emission time they overlay their target's, so writing
//! through either name observes the same storage. Every entry, alias or
//! not, gets its own dense entry index, which is the payload of the name
//! hash table.

use crate::entrypoints::{Category, ResolvedEntrypoint};
use crate::error::{GenError, Result};
use crate::strmap::NO_ENTRY;
use serde::Serialize;
use std::collections::HashMap;

/// One entry in a category layout, in entry-index order
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    /// Bare name, API prefix stripped
    pub name: String,
    pub entry_index: u32,
    /// Compaction index; aliases repeat their target's
    pub disp_slot: u32,
    pub is_alias: bool,
    /// Bare names of this command's aliases (empty on alias entries)
    pub aliases: Vec<String>,
    /// Platform guard define, when the entry is tied to a platform
    /// extension
    pub guard: Option<String>,
}

/// The slot layout of one dispatch category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryLayout {
    pub category: Category,
    /// Entry records in entry-index order (declaration order)
    pub entries: Vec<EntryRecord>,
    /// Number of dispatch slots (= non-alias entry count)
    pub slot_count: u32,
}

impl CategoryLayout {
    /// Build the layout for `category` from the retained entry points of
    /// that category, in declaration order.
    pub fn build(category: Category, entrypoints: &[&ResolvedEntrypoint]) -> Result<CategoryLayout> {
        let mut entries: Vec<EntryRecord> = Vec::with_capacity(entrypoints.len());
        let mut slot_by_name: HashMap<&str, u32> = HashMap::new();
        let mut next_slot: u32 = 0;

        for (entry_index, ep) in entrypoints.iter().enumerate() {
            debug_assert_eq!(ep.category, category);
            let disp_slot = match &ep.alias_of {
                None => {
                    let slot = next_slot;
                    next_slot += 1;
                    slot_by_name.insert(ep.name.as_str(), slot);
                    slot
                }
                Some(target) => {
                    let slot = *slot_by_name.get(target.as_str()).ok_or_else(|| {
                        GenError::registry(format!(
                            "alias {} declared before its target {}",
                            ep.name, target
                        ))
                    })?;
                    let target_record = entries
                        .iter_mut()
                        .find(|r| r.name == *target)
                        .expect("slot map and entry records stay in sync");
                    target_record.aliases.push(ep.name.clone());
                    slot
                }
            };
            entries.push(EntryRecord {
                name: ep.name.clone(),
                entry_index: entry_index as u32,
                disp_slot,
                is_alias: ep.alias_of.is_some(),
                aliases: Vec::new(),
                guard: ep.requirement.guard.clone(),
            });
        }

        let layout = CategoryLayout {
            category,
            entries,
            slot_count: next_slot,
        };
        layout.check_capacity()?;
        Ok(layout)
    }

    /// The compaction array: entry index → dispatch slot
    pub fn compaction(&self) -> Vec<u32> {
        self.entries.iter().map(|e| e.disp_slot).collect()
    }

    fn check_capacity(&self) -> Result<()> {
        let width = self.category.compaction_width_bits();
        let max_slots: u64 = 1 << width;
        if u64::from(self.slot_count) > max_slots {
            return Err(GenError::Capacity(format!(
                "{} has {} dispatch slots, more than a u{} compaction table can address",
                self.category.as_str(),
                self.slot_count,
                width
            )));
        }
        // Hash slots are u16 with 0xffff reserved as the empty sentinel
        if self.entries.len() >= usize::from(NO_ENTRY) {
            return Err(GenError::Capacity(format!(
                "{} has {} entries, too many for 16-bit hash slots",
                self.category.as_str(),
                self.entries.len()
            )));
        }
        Ok(())
    }
}
