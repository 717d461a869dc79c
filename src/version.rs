//! Core API version handling
//!
//! Registry feature blocks carry two-part versions ("1.2"); a few places
//! use a full three-part version. Comparison ignores the patch component
//! when only one side carries it, matching the registry's convention that
//! `VK_MAKE_VERSION` range bits define the packing.

use crate::error::{GenError, Result};
use serde::Serialize;
use std::fmt;

/// A core API version from a registry feature block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

impl Version {
    /// Parse a `"M.m"` or `"M.m.p"` version string
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(GenError::registry(format!("malformed version: {s:?}")));
        }
        let field = |p: &str| -> Result<u32> {
            p.parse()
                .map_err(|_| GenError::registry(format!("malformed version: {s:?}")))
        };
        let version = Version {
            major: field(parts[0])?,
            minor: field(parts[1])?,
            patch: if parts.len() == 3 {
                Some(field(parts[2])?)
            } else {
                None
            },
        };
        // Range bits required by the VK_MAKE_VERSION packing
        if version.major >= 1024 || version.minor >= 1024 {
            return Err(GenError::registry(format!("version out of range: {s}")));
        }
        if version.patch.unwrap_or(0) >= 4096 {
            return Err(GenError::registry(format!("version out of range: {s}")));
        }
        Ok(version)
    }

    /// Pack into the `VK_MAKE_VERSION` bit layout
    pub fn packed(&self) -> u32 {
        (self.major << 22) | (self.minor << 12) | self.patch.unwrap_or(0)
    }

    /// Ordering test that ignores the patch component when only one side
    /// carries one
    pub fn at_most(&self, other: &Version) -> bool {
        let (own_patch, other_patch) = if self.patch.is_some() != other.patch.is_some() {
            (self.patch, self.patch)
        } else {
            (self.patch, other.patch)
        };
        let pack = |v: &Version, p: Option<u32>| (v.major << 22) | (v.minor << 12) | p.unwrap_or(0);
        pack(self, own_patch) <= pack(other, other_patch)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(p) => write!(f, "{}.{}.{}", self.major, self.minor, p),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}
