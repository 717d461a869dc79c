//! Registry document loader
//!
//! Parses a Vulkan-style API registry into a typed raw model: command
//! declarations, core feature blocks, extension declarations with their
//! require blocks, platform guard defines, and the struct-alias map used
//! later during requirement resolution. Elements carrying an `api`
//! attribute that does not list the requested API are dropped here, so the
//! rest of the pipeline never sees them.

use crate::error::{GenError, Result};
use crate::version::Version;
use crate::xml_tree::Element;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// The known API identifiers a registry element may be scoped to
const KNOWN_APIS: [&str; 2] = ["vulkan", "vulkansc"];

/// Whether an extension extends the instance or the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    Instance,
    Device,
}

/// One extension declaration from the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub number: i32,
    /// Absent only on unsupported placeholder entries
    pub kind: Option<ExtensionKind>,
    /// Spec version; 0 means "unsupported/disabled placeholder"
    pub version: u32,
    pub platform: Option<String>,
    pub provisional: bool,
    pub supported: Vec<String>,
}

impl Extension {
    /// Does this extension support the given API identifier?
    pub fn supports(&self, api: &str) -> bool {
        self.supported.iter().any(|a| a == api)
    }

    fn from_xml(elem: &Element) -> Result<Extension> {
        let name = require_attr(elem, "name")?.to_string();
        let number: i32 = require_attr(elem, "number")?
            .parse()
            .map_err(|_| GenError::registry(format!("extension {name}: bad number")))?;
        let mut supported = api_list(require_attr(elem, "supported")?)?;
        // The registry ships this one with supported="disabled" even though
        // the Android loader consumes it.
        if name == "VK_ANDROID_native_buffer" && supported.is_empty() {
            supported = vec!["vulkan".to_string()];
        }

        if supported.is_empty() {
            return Ok(Extension {
                name,
                number,
                kind: None,
                version: 0,
                platform: None,
                provisional: false,
                supported,
            });
        }

        let mut version: Option<u32> = None;
        for require in elem.find_all("require") {
            for enum_elem in require.find_all("enum") {
                let enum_name = enum_elem.attr("name").unwrap_or_default();
                // Skip alias SPEC_VERSIONs, which carry no value
                if enum_name.ends_with("_SPEC_VERSION") {
                    if let Some(value) = enum_elem.attr("value") {
                        if version.is_some() {
                            return Err(GenError::registry(format!(
                                "extension {name}: multiple spec versions"
                            )));
                        }
                        version = Some(value.parse().map_err(|_| {
                            GenError::registry(format!("extension {name}: bad spec version"))
                        })?);
                    }
                }
            }
        }
        let version = version
            .ok_or_else(|| GenError::registry(format!("extension {name}: no spec version")))?;

        let kind = match require_attr(elem, "type")? {
            "instance" => ExtensionKind::Instance,
            "device" => ExtensionKind::Device,
            other => {
                return Err(GenError::registry(format!(
                    "extension {name}: unknown type {other:?}"
                )))
            }
        };

        Ok(Extension {
            name,
            number,
            kind: Some(kind),
            version,
            platform: elem.attr("platform").map(str::to_string),
            provisional: elem.attr("provisional") == Some("true"),
            supported,
        })
    }
}

/// A command declaration, before retained-set filtering
#[derive(Debug, Clone)]
pub struct RawCommand {
    /// Full name as declared, including the API prefix
    pub name: String,
    /// Alias target's full name, when this declaration is a redirect
    pub alias: Option<String>,
    /// Type of the first parameter; `None` for parameterless commands
    pub first_param_type: Option<String>,
}

/// A core feature block: one version plus the commands it promotes
#[derive(Debug, Clone)]
pub struct Feature {
    pub version: Version,
    pub commands: Vec<String>,
}

/// An extension declaration together with its API-filtered require blocks
#[derive(Debug, Clone)]
pub struct ExtensionDecl {
    pub extension: Extension,
    /// Command names listed across this extension's require blocks
    pub required_commands: Vec<String>,
}

/// The typed raw model of one registry document
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub commands: Vec<RawCommand>,
    pub features: Vec<Feature>,
    pub extensions: Vec<ExtensionDecl>,
    /// Platform name → preprocessor guard define
    pub platform_guards: BTreeMap<String, String>,
    /// Struct alias name → target type name
    pub struct_aliases: HashMap<String, String>,
}

impl Registry {
    /// Parse one registry document, keeping only elements visible to `api`
    pub fn parse<R: Read>(reader: R, api: &str) -> Result<Registry> {
        let root = Element::parse(reader)?;
        let mut registry = Registry::default();

        if let Some(platforms) = root.find("platforms") {
            for platform in platforms.find_all("platform") {
                registry.platform_guards.insert(
                    require_attr(platform, "name")?.to_string(),
                    require_attr(platform, "protect")?.to_string(),
                );
            }
        }

        if let Some(types) = root.find("types") {
            for ty in types.find_all("type") {
                if ty.attr("category") != Some("struct") || !filter_api(ty, api) {
                    continue;
                }
                if let (Some(name), Some(alias)) = (ty.attr("name"), ty.attr("alias")) {
                    registry
                        .struct_aliases
                        .insert(name.to_string(), alias.to_string());
                }
            }
        }

        if let Some(commands) = root.find("commands") {
            for command in commands.find_all("command") {
                if !filter_api(command, api) {
                    continue;
                }
                registry.commands.push(parse_command(command, api)?);
            }
        }

        for feature in root.find_all("feature") {
            if !filter_api(feature, api) {
                continue;
            }
            let version = Version::parse(require_attr(feature, "number")?)?;
            let mut commands = Vec::new();
            for require in feature.find_all("require") {
                for command in require.find_all("command") {
                    commands.push(require_attr(command, "name")?.to_string());
                }
            }
            registry.features.push(Feature { version, commands });
        }

        if let Some(extensions) = root.find("extensions") {
            for ext_elem in extensions.find_all("extension") {
                let extension = Extension::from_xml(ext_elem)?;
                let mut required_commands = Vec::new();
                for require in ext_elem.find_all("require") {
                    if !filter_api(require, api) {
                        continue;
                    }
                    for command in require.find_all("command") {
                        required_commands.push(require_attr(command, "name")?.to_string());
                    }
                }
                registry.extensions.push(ExtensionDecl {
                    extension,
                    required_commands,
                });
            }
        }

        Ok(registry)
    }

    /// Parse a registry document from disk
    pub fn from_file(path: &Path, api: &str) -> Result<Registry> {
        let file = File::open(path)?;
        Registry::parse(BufReader::new(file), api)
    }

    /// Extensions supporting `api`, in the stable listing order:
    /// KHR first, then EXT, then vendors, with digit runs compared
    /// as whole numbers
    pub fn sorted_extensions(&self, api: &str) -> Vec<&Extension> {
        let mut exts: Vec<&Extension> = self
            .extensions
            .iter()
            .map(|d| &d.extension)
            .filter(|e| e.supports(api))
            .collect();
        exts.sort_by_key(|e| extension_order(&e.name));
        exts
    }
}

/// Is `elem` visible to `api`? Elements without an `api` attribute are
/// visible to every API.
pub fn filter_api(elem: &Element, api: &str) -> bool {
    match elem.attr("api") {
        Some(apis) => apis.split(',').any(|a| a == api),
        None => true,
    }
}

fn parse_command(elem: &Element, api: &str) -> Result<RawCommand> {
    if let Some(alias) = elem.attr("alias") {
        let name = require_attr(elem, "name")?;
        return Ok(RawCommand {
            name: name.to_string(),
            alias: Some(alias.to_string()),
            first_param_type: None,
        });
    }

    let proto = elem
        .find("proto")
        .ok_or_else(|| GenError::registry("command without proto or alias"))?;
    let name = proto
        .find("name")
        .map(|n| n.text_trimmed().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| GenError::registry("command proto without a name"))?;

    let first_param_type = elem
        .find_all("param")
        .find(|p| filter_api(p, api))
        .and_then(|p| p.find("type"))
        .map(|t| t.text_trimmed().to_string());

    Ok(RawCommand {
        name,
        alias: None,
        first_param_type,
    })
}

fn require_attr<'a>(elem: &'a Element, name: &str) -> Result<&'a str> {
    elem.attr(name)
        .ok_or_else(|| GenError::registry(format!("<{}> missing {name:?} attribute", elem.name)))
}

fn api_list(supported: &str) -> Result<Vec<String>> {
    let mut apis = Vec::new();
    for api in supported.split(',') {
        if api == "disabled" {
            continue;
        }
        if !KNOWN_APIS.contains(&api) {
            return Err(GenError::registry(format!("unknown API id {api:?}")));
        }
        apis.push(api.to_string());
    }
    Ok(apis)
}

/// Sort key tokens for extension names. Numeric tokens order before text
/// tokens, which puts KHR (1) and EXT (2) ahead of vendor suffixes.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderToken {
    Num(u64),
    Text(String),
}

fn extension_order(name: &str) -> Vec<OrderToken> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let flush = |text: &mut String, tokens: &mut Vec<OrderToken>| {
        if !text.is_empty() {
            tokens.push(OrderToken::Text(std::mem::take(text)));
        }
    };

    let mut rest = name;
    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix("KHR") {
            flush(&mut text, &mut tokens);
            tokens.push(OrderToken::Num(1));
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("EXT") {
            flush(&mut text, &mut tokens);
            tokens.push(OrderToken::Num(2));
            rest = stripped;
        } else if rest.starts_with(|c: char| c.is_ascii_digit()) {
            flush(&mut text, &mut tokens);
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            tokens.push(OrderToken::Num(rest[..end].parse().unwrap_or(u64::MAX)));
            rest = &rest[end..];
        } else {
            let mut chars = rest.chars();
            text.push(chars.next().expect("rest is non-empty"));
            rest = chars.as_str();
        }
    }
    flush(&mut text, &mut tokens);
    tokens
}
