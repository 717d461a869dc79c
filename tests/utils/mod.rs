//! Shared fixtures for integration tests
#![allow(dead_code)]

use vktabgen::pipeline::{self, Model};
use vktabgen::registry::Registry;

/// The reference scenario: a core command `Foo` (promoted in 1.0), an
/// alias `FooEXT` → `Foo` gated by `VK_EXT_foo2`, and an extension-gated
/// command `Bar` requiring the device extension `VK_EXT_bar`. A lone
/// instance command and a physical-device command keep the other
/// categories non-empty.
pub const SCENARIO_REGISTRY: &str = r#"
<registry>
    <platforms>
        <platform name="win32" protect="VK_USE_PLATFORM_WIN32_KHR"/>
    </platforms>
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
            <proto><type>void</type> <name>vkFoo</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
        </command>
        <command name="vkFooEXT" alias="vkFoo"/>
        <command>
            <proto><type>void</type> <name>vkBar</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
        </command>
        <command>
            <proto><type>void</type> <name>vkBetaOnly</name></proto>
            <param><type>VkDevice</type> <name>device</name></param>
        </command>
    </commands>
    <feature api="vulkan" name="VK_VERSION_1_0" number="1.0">
        <require>
            <command name="vkCreateInstance"/>
            <command name="vkGetPhysicalDeviceFeatures"/>
            <command name="vkFoo"/>
        </require>
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
        <extension name="VK_KHR_beta_stuff" number="3" type="device"
                   supported="vulkan" provisional="true">
            <require>
                <enum value="1" name="VK_KHR_BETA_STUFF_SPEC_VERSION"/>
                <command name="vkBetaOnly"/>
            </require>
        </extension>
    </extensions>
</registry>
"#;

pub fn scenario_registry() -> Registry {
    Registry::parse(SCENARIO_REGISTRY.as_bytes(), "vulkan").unwrap()
}

pub fn scenario_model() -> Model {
    pipeline::compile(&[scenario_registry()], "vulkan", false).unwrap()
}

pub fn scenario_model_beta() -> Model {
    pipeline::compile(&[scenario_registry()], "vulkan", true).unwrap()
}
