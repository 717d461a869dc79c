//! Requirement resolution
//!
//! Computes, for every command name a registry document can expose, the
//! minimal condition under which the command is available: the first core
//! version that promoted it, or the de-duplicated list of extensions that
//! require it, or nothing at all for unconditional baseline entries.

use crate::error::{GenError, Result};
use crate::registry::{Extension, Registry};
use crate::version::Version;
use indexmap::IndexMap;
use std::collections::HashMap;

/// The enablement condition attached to one command
#[derive(Debug, Clone, Default)]
pub struct Requirement {
    /// First core version whose feature block lists the command
    pub core_version: Option<Version>,
    /// Extensions requiring the command, in discovery order, unique by name
    pub extensions: Vec<Extension>,
    /// Platform guard define, set only for extension-gated commands whose
    /// first guarded extension has a registered platform
    pub guard: Option<String>,
}

impl Requirement {
    /// Record that `ext` requires this command. Re-adding the identical
    /// extension is a no-op; a different extension with the same name is a
    /// registry contradiction.
    fn add_extension(&mut self, ext: &Extension) -> Result<()> {
        for existing in &self.extensions {
            if existing == ext {
                return Ok(());
            }
            if existing.name == ext.name {
                return Err(GenError::registry(format!(
                    "conflicting declarations of extension {}",
                    ext.name
                )));
            }
        }
        self.extensions.push(ext.clone());
        Ok(())
    }
}

/// Resolve the requirement of every command reachable from an enabled core
/// feature or an enabled, non-skipped extension. Keys are full command
/// names; iteration order is discovery order.
pub fn resolve_required_commands(
    registry: &Registry,
    api: &str,
    beta: bool,
) -> Result<IndexMap<String, Requirement>> {
    let mut required: IndexMap<String, Requirement> = IndexMap::new();

    for feature in &registry.features {
        for name in &feature.commands {
            match required.get(name) {
                Some(req) => {
                    // A later feature block may re-affirm availability, but
                    // only at a version at or above the first one.
                    let first = req
                        .core_version
                        .expect("feature-promoted commands always carry a core version");
                    if !first.at_most(&feature.version) {
                        return Err(GenError::Consistency(format!(
                            "command {name} promoted at {} but re-listed at {}",
                            first, feature.version
                        )));
                    }
                }
                None => {
                    required.insert(name.clone(), Requirement {
                        core_version: Some(feature.version),
                        extensions: Vec::new(),
                        guard: None,
                    });
                }
            }
        }
    }

    for decl in &registry.extensions {
        let ext = &decl.extension;
        if !ext.supports(api) {
            continue;
        }
        if !beta && ext.provisional {
            continue;
        }
        for name in &decl.required_commands {
            // Some registries request commands under a struct-alias name;
            // resolve to the canonical name before merging.
            let name = resolve_struct_alias(&registry.struct_aliases, name)?;
            required
                .entry(name.to_string())
                .or_default()
                .add_extension(ext)?;
        }
    }

    for req in required.values_mut() {
        if req.core_version.is_some() {
            continue;
        }
        // First-match, not union: the first extension with a registered
        // platform decides the guard.
        req.guard = req
            .extensions
            .iter()
            .filter_map(|e| e.platform.as_ref())
            .find_map(|p| registry.platform_guards.get(p))
            .cloned();
    }

    Ok(required)
}

/// Follow the struct-alias map to a terminal name, rejecting cycles
fn resolve_struct_alias<'a>(aliases: &'a HashMap<String, String>, name: &'a str) -> Result<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    let mut current = name;
    while let Some(target) = aliases.get(current) {
        if seen.contains(&current) {
            return Err(GenError::registry(format!(
                "struct alias cycle involving {name}"
            )));
        }
        seen.push(current);
        current = target.as_str();
    }
    Ok(current)
}
