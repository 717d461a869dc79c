//! Runtime dispatch-table model
//!
//! The boundary contract the emitted tables must satisfy, expressed over
//! an opaque function-pointer type `F`. A `DispatchTable` holds one value
//! per dispatch slot; an `EntrypointTable` holds one per entry index,
//! aliases included. Loading fills slots through a name-resolving
//! callback, retrying aliased slots under each alias's own prefixed name.
//! Whether a resolver hands back a real pointer or a stub is the
//! resolver's business; the table only tracks populated or not.

use crate::enablement::EnablementTable;
use crate::entrypoints::prefixed;
use crate::layout::CategoryLayout;
use crate::strmap::StringMap;
use thiserror::Error;

/// How `merge_from_entrypoints` treats already-populated slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Only populate slots that are currently empty
    Fill,
    /// Clear everything first, then populate, rejecting double writes
    Overwrite,
}

/// Errors raised while merging an entry-point table into a dispatch table
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("slot {slot} written twice, second write from entry {entry_index} ({name})")]
    DuplicateSlot {
        slot: u32,
        entry_index: u32,
        name: String,
    },
}

/// Per-entry-index source table for merges
#[derive(Debug, Clone)]
pub struct EntrypointTable<F> {
    entries: Vec<Option<F>>,
}

impl<F> EntrypointTable<F> {
    /// An empty source table shaped for `layout`
    pub fn new(layout: &CategoryLayout) -> Self {
        Self {
            entries: (0..layout.entries.len()).map(|_| None).collect(),
        }
    }

    pub fn set(&mut self, entry_index: u32, value: F) {
        self.entries[entry_index as usize] = Some(value);
    }

    pub fn get(&self, entry_index: u32) -> Option<&F> {
        self.entries.get(entry_index as usize)?.as_ref()
    }
}

/// Per-dispatch-slot function table for one category
#[derive(Debug, Clone)]
pub struct DispatchTable<F> {
    slots: Vec<Option<F>>,
}

impl<F: Clone> DispatchTable<F> {
    /// An empty table shaped for `layout`
    pub fn new(layout: &CategoryLayout) -> Self {
        Self {
            slots: (0..layout.slot_count).map(|_| None).collect(),
        }
    }

    /// Fill every slot through `resolve`, called with prefixed names.
    /// When the canonical name resolves to nothing, each alias is tried
    /// in declaration order.
    pub fn load(layout: &CategoryLayout, mut resolve: impl FnMut(&str) -> Option<F>) -> Self {
        let mut table = Self::new(layout);
        for record in layout.entries.iter().filter(|r| !r.is_alias) {
            let mut value = resolve(&prefixed(&record.name));
            for alias in &record.aliases {
                if value.is_some() {
                    break;
                }
                value = resolve(&prefixed(alias));
            }
            table.slots[record.disp_slot as usize] = value;
        }
        table
    }

    /// Import a per-entry table, collapsing aliases onto their target's
    /// slot according to the compaction array.
    pub fn merge_from_entrypoints(
        &mut self,
        layout: &CategoryLayout,
        source: &EntrypointTable<F>,
        mode: MergeMode,
    ) -> Result<(), MergeError> {
        match mode {
            MergeMode::Overwrite => {
                for slot in &mut self.slots {
                    *slot = None;
                }
                for record in &layout.entries {
                    let Some(value) = source.get(record.entry_index) else {
                        continue;
                    };
                    let slot = record.disp_slot as usize;
                    if self.slots[slot].is_some() {
                        return Err(MergeError::DuplicateSlot {
                            slot: record.disp_slot,
                            entry_index: record.entry_index,
                            name: record.name.clone(),
                        });
                    }
                    self.slots[slot] = Some(value.clone());
                }
            }
            MergeMode::Fill => {
                for record in &layout.entries {
                    let slot = record.disp_slot as usize;
                    if self.slots[slot].is_none() {
                        if let Some(value) = source.get(record.entry_index) {
                            self.slots[slot] = Some(value.clone());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn slot(&self, disp_slot: u32) -> Option<&F> {
        self.slots.get(disp_slot as usize)?.as_ref()
    }

    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Resolve a prefixed name through the category's string map and
    /// compaction array
    pub fn get_by_name(
        &self,
        layout: &CategoryLayout,
        strings: &StringMap,
        name: &str,
    ) -> Option<&F> {
        let entry_index = strings.lookup(name)?;
        let record = &layout.entries[entry_index as usize];
        self.slot(record.disp_slot)
    }

    /// Like [`get_by_name`](Self::get_by_name), but only when the entry's
    /// core version or one of its extensions is enabled
    #[allow(clippy::too_many_arguments)]
    pub fn get_if_supported(
        &self,
        layout: &CategoryLayout,
        strings: &StringMap,
        rules: &EnablementTable,
        name: &str,
        core_version: u32,
        instance_extensions: &std::collections::HashSet<String>,
        device_extensions: Option<&std::collections::HashSet<String>>,
    ) -> Option<&F> {
        let entry_index = strings.lookup(name)?;
        if !rules.is_enabled(entry_index, core_version, instance_extensions, device_extensions) {
            return None;
        }
        let record = &layout.entries[entry_index as usize];
        self.slot(record.disp_slot)
    }
}
