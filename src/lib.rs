//! Vktabgen - Vulkan registry compiler for API-dispatch loaders
//!
//! This library compiles a machine-readable Vulkan API registry into the
//! build-time artifacts a runtime dispatch loader consumes: a partitioned,
//! alias-compacted function-pointer table layout, a static name lookup
//! structure built on an open-addressing hash scheme, and per-entry
//! enablement rules derived from the negotiated core version and the
//! active extension sets.

pub mod artifact;
pub mod cli;
pub mod enablement;
pub mod entrypoints;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod registry;
pub mod requirements;
pub mod strmap;
pub mod table;
pub mod version;
pub mod xml_tree;
