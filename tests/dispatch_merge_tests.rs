//! Dispatch-table load and merge semantics over the scenario registry

mod utils;

use std::collections::HashSet;
use vktabgen::entrypoints::Category;
use vktabgen::table::{DispatchTable, EntrypointTable, MergeError, MergeMode};
use vktabgen::version::Version;

#[test]
fn test_load_fills_all_slots() {
    let model = utils::scenario_model();
    let device = model.category(Category::Device);
    let table = DispatchTable::load(&device.layout, |name| Some(name.to_string()));
    assert_eq!(table.populated_count(), 2);
    assert_eq!(table.slot(0), Some(&"vkFoo".to_string()));
    assert_eq!(table.slot(1), Some(&"vkBar".to_string()));
}

#[test]
fn test_load_falls_back_to_alias_names() {
    let model = utils::scenario_model();
    let device = model.category(Category::Device);
    // A driver that only exports the EXT spelling
    let table = DispatchTable::load(&device.layout, |name| {
        (name == "vkFooEXT").then(|| name.to_string())
    });
    assert_eq!(table.slot(0), Some(&"vkFooEXT".to_string()));
    assert_eq!(table.slot(1), None);
}

#[test]
fn test_overwrite_clears_a_partially_populated_table() {
    let model = utils::scenario_model();
    let device = model.category(Category::Device);
    let mut table = DispatchTable::load(&device.layout, |name| Some(name.to_string()));

    let mut source = EntrypointTable::new(&device.layout);
    source.set(2, "bar_impl".to_string());
    table
        .merge_from_entrypoints(&device.layout, &source, MergeMode::Overwrite)
        .unwrap();
    assert_eq!(table.slot(0), None);
    assert_eq!(table.slot(1), Some(&"bar_impl".to_string()));
}

#[test]
fn test_overwrite_rejects_two_sources_for_one_slot() {
    let model = utils::scenario_model();
    let device = model.category(Category::Device);
    let mut table: DispatchTable<String> = DispatchTable::new(&device.layout);

    // Foo (entry 0) and its alias FooEXT (entry 1) share slot 0
    let mut source = EntrypointTable::new(&device.layout);
    source.set(0, "via_foo".to_string());
    source.set(1, "via_foo_ext".to_string());
    let err = table
        .merge_from_entrypoints(&device.layout, &source, MergeMode::Overwrite)
        .unwrap_err();
    assert!(matches!(err, MergeError::DuplicateSlot { slot: 0, .. }));
}

#[test]
fn test_fill_only_touches_empty_slots() {
    let model = utils::scenario_model();
    let device = model.category(Category::Device);
    let mut table = DispatchTable::load(&device.layout, |name| {
        (name == "vkFoo").then(|| "loader_foo".to_string())
    });

    let mut source = EntrypointTable::new(&device.layout);
    source.set(0, "other_foo".to_string());
    source.set(2, "other_bar".to_string());
    table
        .merge_from_entrypoints(&device.layout, &source, MergeMode::Fill)
        .unwrap();
    assert_eq!(table.slot(0), Some(&"loader_foo".to_string()));
    assert_eq!(table.slot(1), Some(&"other_bar".to_string()));
}

#[test]
fn test_get_if_supported_combines_lookup_and_enablement() {
    let model = utils::scenario_model();
    let device = model.category(Category::Device);
    let table = DispatchTable::load(&device.layout, |name| Some(name.to_string()));

    let v10 = Version::parse("1.0").unwrap().packed();
    let none: HashSet<String> = HashSet::new();
    let with_bar: HashSet<String> = ["VK_EXT_bar".to_string()].into_iter().collect();

    let get = |name: &str, dev: Option<&HashSet<String>>| {
        table
            .get_if_supported(
                &device.layout,
                &device.string_map,
                &device.enablement,
                name,
                v10,
                &none,
                dev,
            )
            .cloned()
    };

    assert_eq!(get("vkBar", Some(&with_bar)), Some("vkBar".to_string()));
    assert_eq!(get("vkBar", Some(&none)), None);
    assert_eq!(get("vkFoo", Some(&none)), Some("vkFoo".to_string()));
    assert_eq!(get("vkNoSuchEntry", None), None);
}
