//! Emitted artifacts and deterministic output writing
//!
//! The compiler emits two JSON artifacts for the downstream code emitter:
//! the table layout (string maps, hash slots, compaction arrays) and the
//! enablement rules. Output is byte-stable for fixed inputs; writes go
//! through a temporary file and are skipped entirely when the content
//! already on disk is identical, so downstream builds only re-run when
//! something conceptually changed.

use crate::enablement::EnableRule;
use crate::entrypoints::Category;
use crate::error::Result;
use crate::layout::EntryRecord;
use crate::pipeline::Model;
use crate::strmap::StringMap;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One category's share of the table-layout artifact
#[derive(Debug, Serialize)]
pub struct CategoryTables {
    pub category: Category,
    /// Entry records in entry-index order
    pub entries: Vec<EntryRecord>,
    pub slot_count: u32,
    /// Entry index → dispatch slot; aliases repeat their target's
    pub compaction: Vec<u32>,
    pub string_map: StringMap,
}

/// The table-layout artifact
#[derive(Debug, Serialize)]
pub struct TablesArtifact {
    pub api: String,
    pub beta: bool,
    pub categories: Vec<CategoryTables>,
}

/// One category's share of the enablement artifact
#[derive(Debug, Serialize)]
pub struct CategoryRules {
    pub category: Category,
    /// Rules in entry-index order
    pub rules: Vec<EnableRule>,
}

/// The enablement-rules artifact
#[derive(Debug, Serialize)]
pub struct RulesArtifact {
    pub api: String,
    pub beta: bool,
    pub categories: Vec<CategoryRules>,
}

impl TablesArtifact {
    pub fn from_model(model: &Model) -> TablesArtifact {
        TablesArtifact {
            api: model.api.clone(),
            beta: model.beta,
            categories: model
                .categories
                .iter()
                .map(|c| CategoryTables {
                    category: c.layout.category,
                    entries: c.layout.entries.clone(),
                    slot_count: c.layout.slot_count,
                    compaction: c.layout.compaction(),
                    string_map: c.string_map.clone(),
                })
                .collect(),
        }
    }
}

impl RulesArtifact {
    pub fn from_model(model: &Model) -> RulesArtifact {
        RulesArtifact {
            api: model.api.clone(),
            beta: model.beta,
            categories: model
                .categories
                .iter()
                .map(|c| CategoryRules {
                    category: c.enablement.category,
                    rules: c.enablement.rules.clone(),
                })
                .collect(),
        }
    }
}

/// Serialize an artifact to its canonical byte form
pub fn to_canonical_json<T: Serialize>(artifact: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(artifact)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write artifact bytes atomically. Returns `false` when the file already
/// holds identical content and nothing was written.
pub fn write_if_changed(path: &Path, bytes: &[u8]) -> Result<bool> {
    if let Ok(existing) = fs::read(path) {
        if existing == bytes {
            debug!(path = %path.display(), "artifact unchanged, skipping write");
            return Ok(false);
        }
    }
    // Temp file in the same directory so the rename stays on one filesystem
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);
    fs::write(tmp, bytes)?;
    fs::rename(tmp, path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
    Ok(true)
}
