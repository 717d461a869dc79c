//! Entry-point enablement rules
//!
//! Lowers each entry's resolved requirement to a boolean predicate over
//! the negotiated core version and the enabled extension sets. Device
//! extensions are considered universally visible at the instance and
//! physical-device level, since no device context exists there yet; in
//! device context an absent device filter means "treat every device
//! extension as enabled".

use crate::entrypoints::Category;
use crate::error::{GenError, Result};
use crate::layout::CategoryLayout;
use crate::registry::ExtensionKind;
use crate::requirements::Requirement;
use crate::version::Version;
use serde::Serialize;
use std::collections::HashSet;

/// One extension reference inside a rule
#[derive(Debug, Clone, Serialize)]
pub struct ExtensionRef {
    pub name: String,
    pub kind: ExtensionKind,
}

/// The compiled predicate of one entry
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnableRule {
    /// Unconditional core-1.0 baseline entry
    Always,
    /// Enabled once the in-use core version reaches this one
    Core { version: Version },
    /// Enabled when any listed extension is enabled
    Extensions { extensions: Vec<ExtensionRef> },
}

/// Per-category enablement table, rules in entry-index order
#[derive(Debug, Clone, Serialize)]
pub struct EnablementTable {
    pub category: Category,
    pub rules: Vec<EnableRule>,
}

impl EnablementTable {
    /// Compile the rules for every entry of a category layout
    pub fn compile(
        layout: &CategoryLayout,
        requirements: &[&Requirement],
    ) -> Result<EnablementTable> {
        debug_assert_eq!(layout.entries.len(), requirements.len());
        let mut rules = Vec::with_capacity(requirements.len());
        for (record, req) in layout.entries.iter().zip(requirements) {
            rules.push(compile_rule(&record.name, req)?);
        }
        Ok(EnablementTable {
            category: layout.category,
            rules,
        })
    }

    /// Evaluate one entry's predicate. `device_extensions` must be `None`
    /// outside device-category context; passing `None` in device context
    /// means "no device filter requested".
    pub fn is_enabled(
        &self,
        entry_index: u32,
        core_version: u32,
        instance_extensions: &HashSet<String>,
        device_extensions: Option<&HashSet<String>>,
    ) -> bool {
        let Some(rule) = self.rules.get(entry_index as usize) else {
            return false;
        };
        match rule {
            EnableRule::Always => true,
            EnableRule::Core { version } => version.packed() <= core_version,
            EnableRule::Extensions { extensions } => extensions.iter().any(|ext| match ext.kind {
                ExtensionKind::Instance => instance_extensions.contains(&ext.name),
                ExtensionKind::Device => match (self.category, device_extensions) {
                    // No device context exists at the instance level, so
                    // device extensions count as enabled there.
                    (Category::Instance | Category::PhysicalDevice, _) => true,
                    (Category::Device, None) => true,
                    (Category::Device, Some(enabled)) => enabled.contains(&ext.name),
                },
            }),
        }
    }
}

fn compile_rule(name: &str, req: &Requirement) -> Result<EnableRule> {
    if let Some(version) = req.core_version {
        return Ok(EnableRule::Core { version });
    }
    if req.extensions.is_empty() {
        return Ok(EnableRule::Always);
    }
    let mut extensions = Vec::with_capacity(req.extensions.len());
    for ext in &req.extensions {
        let kind = ext.kind.ok_or_else(|| {
            GenError::registry(format!(
                "entry {name} requires {}, which has no instance/device type",
                ext.name
            ))
        })?;
        extensions.push(ExtensionRef {
            name: ext.name.clone(),
            kind,
        });
    }
    Ok(EnableRule::Extensions { extensions })
}
