//! Entry-point model and classification
//!
//! Turns raw command declarations into the retained entry-point set: the
//! commands reachable from an enabled core feature or extension, with
//! aliases modeled as a tagged variant pointing at an already-loaded,
//! non-alias target. Each entry point is classified into one of three
//! dispatch categories by its first parameter's handle type.

use crate::error::{GenError, Result};
use crate::registry::Registry;
use crate::requirements::{resolve_required_commands, Requirement};
use indexmap::IndexMap;
use serde::Serialize;

/// Two-letter API prefix stripped from declared names and re-added for
/// lookup strings
pub const API_PREFIX: &str = "vk";

/// Dispatch category of an entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Instance,
    PhysicalDevice,
    Device,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Instance,
        Category::PhysicalDevice,
        Category::Device,
    ];

    /// Bit width of the compaction-table element reserved for this category
    pub fn compaction_width_bits(self) -> u32 {
        match self {
            Category::Instance | Category::PhysicalDevice => 8,
            Category::Device => 16,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Instance => "instance",
            Category::PhysicalDevice => "physical_device",
            Category::Device => "device",
        }
    }
}

/// Payload distinguishing plain commands from alias redirects
#[derive(Debug, Clone)]
pub enum EntrypointKind {
    Command {
        /// First parameter's type name; parameterless commands have none
        first_param_type: Option<String>,
        /// Enablement condition for this command
        requirement: Requirement,
    },
    Alias {
        /// Bare name of the non-alias target
        target: String,
    },
}

/// One retained entry point, command or alias
#[derive(Debug, Clone)]
pub struct Entrypoint {
    /// Bare name with the API prefix stripped
    pub name: String,
    pub kind: EntrypointKind,
}

impl Entrypoint {
    pub fn is_alias(&self) -> bool {
        matches!(self.kind, EntrypointKind::Alias { .. })
    }

    /// Full lookup name, prefix re-added
    pub fn prefixed_name(&self) -> String {
        prefixed(&self.name)
    }
}

/// Re-add the API prefix to a bare entry-point name
pub fn prefixed(bare_name: &str) -> String {
    format!("{API_PREFIX}{bare_name}")
}

/// A fully materialized entry point, ready for layout and hashing.
/// Alias targets and requirements are resolved so later stages never need
/// the set they came from.
#[derive(Debug, Clone)]
pub struct ResolvedEntrypoint {
    /// Bare name with the API prefix stripped
    pub name: String,
    pub category: Category,
    /// Bare name of the target when this entry is an alias
    pub alias_of: Option<String>,
    /// Own requirement for commands; the target's for aliases
    pub requirement: Requirement,
}

impl ResolvedEntrypoint {
    pub fn prefixed_name(&self) -> String {
        prefixed(&self.name)
    }
}

/// The retained entry points of one registry document, in declaration order
#[derive(Debug, Default)]
pub struct EntrypointSet {
    map: IndexMap<String, Entrypoint>,
}

impl EntrypointSet {
    /// Build the retained set: commands reachable from the resolved
    /// requirement map, with aliases bound to their targets.
    pub fn from_registry(registry: &Registry, api: &str, beta: bool) -> Result<EntrypointSet> {
        let required = resolve_required_commands(registry, api, beta)?;
        let mut set = EntrypointSet::default();

        for command in &registry.commands {
            if !required.contains_key(&command.name) {
                continue;
            }
            let bare = strip_prefix(&command.name)?;

            let kind = match &command.alias {
                Some(target_full) => {
                    let target = strip_prefix(target_full)?;
                    match set.map.get(target) {
                        Some(t) if t.is_alias() => {
                            return Err(GenError::registry(format!(
                                "alias {} targets another alias {}",
                                command.name, target_full
                            )));
                        }
                        Some(_) => {}
                        None => {
                            return Err(GenError::registry(format!(
                                "alias {} targets unknown command {}",
                                command.name, target_full
                            )));
                        }
                    }
                    EntrypointKind::Alias {
                        target: target.to_string(),
                    }
                }
                None => EntrypointKind::Command {
                    first_param_type: command.first_param_type.clone(),
                    requirement: required[&command.name].clone(),
                },
            };

            let previous = set.map.insert(bare.to_string(), Entrypoint {
                name: bare.to_string(),
                kind,
            });
            if previous.is_some() {
                return Err(GenError::registry(format!(
                    "duplicate command name {}",
                    command.name
                )));
            }
        }

        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, bare_name: &str) -> Option<&Entrypoint> {
        self.map.get(bare_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entrypoint> {
        self.map.values()
    }

    /// Category of an entry point; aliases report their target's
    pub fn category(&self, ep: &Entrypoint) -> Category {
        match &ep.kind {
            EntrypointKind::Command {
                first_param_type, ..
            } => classify(first_param_type.as_deref()),
            EntrypointKind::Alias { target } => {
                self.category(&self.map[target.as_str()])
            }
        }
    }

    /// Requirement of an entry point; aliases inherit their target's
    pub fn requirement<'a>(&'a self, ep: &'a Entrypoint) -> &'a Requirement {
        match &ep.kind {
            EntrypointKind::Command { requirement, .. } => requirement,
            EntrypointKind::Alias { target } => self.requirement(&self.map[target.as_str()]),
        }
    }

    /// Materialize the set into standalone entries in declaration order
    pub fn resolve(&self) -> Vec<ResolvedEntrypoint> {
        self.map
            .values()
            .map(|ep| ResolvedEntrypoint {
                name: ep.name.clone(),
                category: self.category(ep),
                alias_of: match &ep.kind {
                    EntrypointKind::Alias { target } => Some(target.clone()),
                    EntrypointKind::Command { .. } => None,
                },
                requirement: self.requirement(ep).clone(),
            })
            .collect()
    }
}

/// Classify by the first parameter's handle type
fn classify(first_param_type: Option<&str>) -> Category {
    match first_param_type {
        Some("VkPhysicalDevice") => Category::PhysicalDevice,
        Some("VkDevice") | Some("VkCommandBuffer") | Some("VkQueue") => Category::Device,
        _ => Category::Instance,
    }
}

fn strip_prefix(full_name: &str) -> Result<&str> {
    full_name.strip_prefix(API_PREFIX).ok_or_else(|| {
        GenError::registry(format!("command {full_name} lacks the {API_PREFIX} prefix"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    const DOC: &str = r#"
        <registry>
            <commands>
                <command>
                    <proto><type>VkResult</type> <name>vkCreateInstance</name></proto>
                    <param><type>VkInstanceCreateInfo</type> <name>pCreateInfo</name></param>
                </command>
                <command>
                    <proto><type>void</type> <name>vkGetPhysicalDeviceFeatures</name></proto>
                    <param><type>VkPhysicalDevice</type> <name>physicalDevice</name></param>
                </command>
                <command>
                    <proto><type>void</type> <name>vkCmdDraw</name></proto>
                    <param><type>VkCommandBuffer</type> <name>commandBuffer</name></param>
                </command>
                <command name="vkCmdDrawEXT" alias="vkCmdDraw"/>
                <command>
                    <proto><type>void</type> <name>vkNeverRequired</name></proto>
                    <param><type>VkDevice</type> <name>device</name></param>
                </command>
            </commands>
            <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
                <require>
                    <command name="vkCreateInstance"/>
                    <command name="vkGetPhysicalDeviceFeatures"/>
                    <command name="vkCmdDraw"/>
                </require>
            </feature>
            <extensions>
                <extension name="VK_EXT_draw" number="3" type="device" supported="vulkan">
                    <require>
                        <enum value="1" name="VK_EXT_DRAW_SPEC_VERSION"/>
                        <command name="vkCmdDrawEXT"/>
                    </require>
                </extension>
            </extensions>
        </registry>
    "#;

    fn set() -> EntrypointSet {
        let reg = Registry::parse(DOC.as_bytes(), "vulkan").unwrap();
        EntrypointSet::from_registry(&reg, "vulkan", false).unwrap()
    }

    #[test]
    fn test_unreachable_commands_are_dropped() {
        let set = set();
        assert_eq!(set.len(), 4);
        assert!(set.get("NeverRequired").is_none());
    }

    #[test]
    fn test_classification_by_first_param() {
        let set = set();
        let cat = |name: &str| set.category(set.get(name).unwrap());
        assert_eq!(cat("CreateInstance"), Category::Instance);
        assert_eq!(cat("GetPhysicalDeviceFeatures"), Category::PhysicalDevice);
        assert_eq!(cat("CmdDraw"), Category::Device);
        // Aliases report their target's category
        assert_eq!(cat("CmdDrawEXT"), Category::Device);
    }

    #[test]
    fn test_alias_inherits_target_requirement() {
        let set = set();
        let alias = set.get("CmdDrawEXT").unwrap();
        assert!(alias.is_alias());
        let req = set.requirement(alias);
        assert_eq!(req.core_version.unwrap().to_string(), "1.0");
    }

    #[test]
    fn test_requirements_borrowed_across_iteration() {
        let set = set();
        // References into the set must stay valid while iterating the
        // same set, for both commands and aliases.
        let reqs: Vec<&Requirement> = set.iter().map(|ep| set.requirement(ep)).collect();
        assert_eq!(reqs.len(), set.len());
        assert!(reqs
            .iter()
            .all(|r| r.core_version.is_some() || !r.extensions.is_empty()));
    }

    #[test]
    fn test_prefixed_names() {
        let set = set();
        assert_eq!(set.get("CmdDraw").unwrap().prefixed_name(), "vkCmdDraw");
    }

    #[test]
    fn test_alias_to_unknown_target_is_an_error() {
        let doc = r#"
            <registry>
                <commands>
                    <command name="vkLostEXT" alias="vkLost"/>
                </commands>
                <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
                    <require><command name="vkLostEXT"/></require>
                </feature>
            </registry>
        "#;
        let reg = Registry::parse(doc.as_bytes(), "vulkan").unwrap();
        let err = EntrypointSet::from_registry(&reg, "vulkan", false).unwrap_err();
        assert!(matches!(err, GenError::Registry(_)));
    }

    #[test]
    fn test_alias_chain_is_an_error() {
        let doc = r#"
            <registry>
                <commands>
                    <command>
                        <proto><type>void</type> <name>vkRoot</name></proto>
                        <param><type>VkDevice</type> <name>device</name></param>
                    </command>
                    <command name="vkMidEXT" alias="vkRoot"/>
                    <command name="vkLeafNV" alias="vkMidEXT"/>
                </commands>
                <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
                    <require>
                        <command name="vkRoot"/>
                        <command name="vkMidEXT"/>
                        <command name="vkLeafNV"/>
                    </require>
                </feature>
            </registry>
        "#;
        let reg = Registry::parse(doc.as_bytes(), "vulkan").unwrap();
        let err = EntrypointSet::from_registry(&reg, "vulkan", false).unwrap_err();
        assert!(matches!(err, GenError::Registry(_)));
    }

    #[test]
    fn test_resolve_preserves_declaration_order() {
        let names: Vec<String> = set().resolve().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec![
            "CreateInstance",
            "GetPhysicalDeviceFeatures",
            "CmdDraw",
            "CmdDrawEXT",
        ]);
    }
}
