//! End-to-end compilation pipeline
//!
//! A pure function of (registry documents, API id, beta flag): load and
//! filter the entry points, partition them into categories, then build
//! each category's slot layout, string map, and enablement rules. Any
//! validation failure aborts the whole run; no partial model escapes.

use crate::enablement::EnablementTable;
use crate::entrypoints::{Category, EntrypointSet, ResolvedEntrypoint};
use crate::error::{GenError, Result};
use crate::layout::CategoryLayout;
use crate::registry::Registry;
use crate::strmap::{StringMap, StringMapBuilder};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Everything compiled for one dispatch category
#[derive(Debug)]
pub struct CategoryModel {
    pub layout: CategoryLayout,
    pub string_map: StringMap,
    pub enablement: EnablementTable,
}

/// The complete compiled model, one entry per category in
/// instance / physical-device / device order
#[derive(Debug)]
pub struct Model {
    pub api: String,
    pub beta: bool,
    pub categories: Vec<CategoryModel>,
}

impl Model {
    pub fn category(&self, category: Category) -> &CategoryModel {
        self.categories
            .iter()
            .find(|c| c.layout.category == category)
            .expect("model always holds all three categories")
    }
}

/// Load registry documents from disk
pub fn load_files<P: AsRef<Path>>(paths: &[P], api: &str) -> Result<Vec<Registry>> {
    let mut registries = Vec::with_capacity(paths.len());
    for path in paths {
        debug!(path = %path.as_ref().display(), "loading registry");
        registries.push(Registry::from_file(path.as_ref(), api)?);
    }
    Ok(registries)
}

/// Compile registry documents from disk
pub fn compile_files<P: AsRef<Path>>(paths: &[P], api: &str, beta: bool) -> Result<Model> {
    compile(&load_files(paths, api)?, api, beta)
}

/// Compile already-parsed registry documents
pub fn compile(registries: &[Registry], api: &str, beta: bool) -> Result<Model> {
    let mut entrypoints: Vec<ResolvedEntrypoint> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for registry in registries {
        let set = EntrypointSet::from_registry(registry, api, beta)?;
        for ep in set.resolve() {
            if !seen.insert(ep.name.clone()) {
                return Err(GenError::registry(format!(
                    "command {} declared in more than one registry document",
                    ep.prefixed_name()
                )));
            }
            entrypoints.push(ep);
        }
    }
    info!(entrypoints = entrypoints.len(), api, beta, "registry loaded");

    let mut categories = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let members: Vec<&ResolvedEntrypoint> = entrypoints
            .iter()
            .filter(|e| e.category == category)
            .collect();

        let layout = CategoryLayout::build(category, &members)?;

        let mut strings = StringMapBuilder::new();
        for (record, ep) in layout.entries.iter().zip(&members) {
            strings.add(&ep.prefixed_name(), record.entry_index)?;
        }
        let string_map = strings.build()?;

        let requirements: Vec<_> = members.iter().map(|e| &e.requirement).collect();
        let enablement = EnablementTable::compile(&layout, &requirements)?;

        debug!(
            category = category.as_str(),
            entries = layout.entries.len(),
            slots = layout.slot_count,
            hash_capacity = string_map.capacity(),
            "category compiled"
        );
        categories.push(CategoryModel {
            layout,
            string_map,
            enablement,
        });
    }

    Ok(Model {
        api: api.to_string(),
        beta,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
        <registry>
            <commands>
                <command>
                    <proto><type>VkResult</type> <name>vkFoo</name></proto>
                    <param><type>VkDevice</type> <name>device</name></param>
                </command>
                <command name="vkFooEXT" alias="vkFoo"/>
                <command>
                    <proto><type>void</type> <name>vkBar</name></proto>
                    <param><type>VkDevice</type> <name>device</name></param>
                </command>
            </commands>
            <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
                <require><command name="vkFoo"/></require>
            </feature>
            <extensions>
                <extension name="VK_EXT_foo2" number="1" type="device" supported="vulkan">
                    <require>
                        <enum value="1" name="VK_EXT_FOO2_SPEC_VERSION"/>
                        <command name="vkFooEXT"/>
                    </require>
                </extension>
                <extension name="VK_EXT_bar" number="2" type="device" supported="vulkan">
                    <require>
                        <enum value="1" name="VK_EXT_BAR_SPEC_VERSION"/>
                        <command name="vkBar"/>
                    </require>
                </extension>
            </extensions>
        </registry>
    "#;

    fn model() -> Model {
        let reg = Registry::parse(DOC.as_bytes(), "vulkan").unwrap();
        compile(&[reg], "vulkan", false).unwrap()
    }

    #[test]
    fn test_device_category_layout() {
        let model = model();
        let device = model.category(Category::Device);
        assert_eq!(device.layout.slot_count, 2);
        assert_eq!(device.layout.entries.len(), 3);
        assert_eq!(device.layout.compaction(), vec![0, 0, 1]);
    }

    #[test]
    fn test_empty_categories_still_compile() {
        let model = model();
        let instance = model.category(Category::Instance);
        assert_eq!(instance.layout.entries.len(), 0);
        assert_eq!(instance.string_map.capacity(), 1);
        assert_eq!(instance.string_map.lookup("vkAnything"), None);
    }

    #[test]
    fn test_string_map_round_trip() {
        let model = model();
        let device = model.category(Category::Device);
        assert_eq!(device.string_map.lookup("vkFoo"), Some(0));
        assert_eq!(device.string_map.lookup("vkFooEXT"), Some(1));
        assert_eq!(device.string_map.lookup("vkBar"), Some(2));
    }

    #[test]
    fn test_duplicate_across_documents_is_an_error() {
        let reg = Registry::parse(DOC.as_bytes(), "vulkan").unwrap();
        let err = compile(&[reg.clone(), reg], "vulkan", false).unwrap_err();
        assert!(matches!(err, GenError::Registry(_)));
    }
}
