// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Catalog entries parsed from bucket keys.
//!
//! Artifact file names follow a fixed grammar:
//!
//! ```text
//! opscode_<os>-<version>[-<arch>]_chef-provisionerless.box
//! ```
//!
//! where `<os>` is lowercase ASCII letters, `<version>` is a dotted numeric
//! version and `<arch>` is absent, `i386` or `x86_64`.

use std::cmp::Ordering;
use std::fmt;

use crate::error::EntryError;
use crate::version::Version;

const NAME_PREFIX: &str = "opscode_";
const NAME_SUFFIX: &str = "_chef-provisionerless.box";

/// Word size of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bitness {
    /// 32-bit (`i386` or no arch token)
    X86,
    /// 64-bit (`x86_64`)
    X64,
}

impl Bitness {
    /// Both bitnesses, in ascending order.
    pub const ALL: [Bitness; 2] = [Bitness::X86, Bitness::X64];

    pub fn bits(self) -> u8 {
        match self {
            Self::X86 => 32,
            Self::X64 => 64,
        }
    }
}

impl fmt::Display for Bitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Fields recovered from an artifact file name.
struct ArtifactName<'a> {
    os: &'a str,
    version: Version,
    bitness: Bitness,
}

impl<'a> ArtifactName<'a> {
    fn parse(filename: &'a str) -> Option<Self> {
        let stem = filename.strip_prefix(NAME_PREFIX)?.strip_suffix(NAME_SUFFIX)?;

        let (os, rest) = stem.split_once('-')?;
        if os.is_empty() || !os.bytes().all(|b| b.is_ascii_lowercase()) {
            return None;
        }

        let (version, bitness) = if let Some(v) = rest.strip_suffix("-i386") {
            (v, Bitness::X86)
        } else if let Some(v) = rest.strip_suffix("-x86_64") {
            (v, Bitness::X64)
        } else {
            (rest, Bitness::X86)
        };

        if !version.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return None;
        }
        let version = Version::parse(version).ok()?;

        Some(Self { os, version, bitness })
    }
}

/// Keys become local paths, so they must be plain relative paths.
fn is_relative_key(key: &str) -> bool {
    !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// One remote artifact. Immutable once constructed.
///
/// Two entries are equal when their remote path and fingerprint are equal.
/// Selection uses [`CatalogEntry::catalog_cmp`], which orders by os, then
/// version, then bitness.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    remote_path: String,
    fingerprint: String,
    os: String,
    version: Version,
    bitness: Bitness,
}

impl CatalogEntry {
    /// Build an entry from a bucket key and its fingerprint (ETag).
    ///
    /// Fails with [`EntryError::UnrecognizedArtifactName`] if the file name
    /// part of `remote_path` does not follow the naming grammar.
    pub fn new(
        remote_path: impl Into<String>,
        fingerprint: impl Into<String>,
    ) -> Result<Self, EntryError> {
        let remote_path = remote_path.into();
        if !is_relative_key(&remote_path) {
            return Err(EntryError::UnrecognizedArtifactName(remote_path));
        }
        let filename = remote_path.rsplit('/').next().unwrap_or_default();

        let name = ArtifactName::parse(filename)
            .ok_or_else(|| EntryError::UnrecognizedArtifactName(remote_path.clone()))?;
        let os = name.os.to_string();
        let (version, bitness) = (name.version, name.bitness);

        Ok(Self {
            remote_path,
            fingerprint: fingerprint.into(),
            os,
            version,
            bitness,
        })
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn bitness(&self) -> Bitness {
        self.bitness
    }

    /// Last path segment of the remote key.
    pub fn filename(&self) -> &str {
        self.remote_path.rsplit('/').next().unwrap_or_default()
    }

    /// Download URL of this artifact under `base`.
    pub fn url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.remote_path)
    }

    /// Total order used for selection: os, then version, then bitness.
    pub fn catalog_cmp(&self, other: &CatalogEntry) -> Ordering {
        self.os
            .cmp(&other.os)
            .then_with(|| self.version.compare(&other.version))
            .then_with(|| self.bitness.bits().cmp(&other.bitness.bits()))
    }
}

impl PartialEq for CatalogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.remote_path == other.remote_path && self.fingerprint == other.fingerprint
    }
}

impl Eq for CatalogEntry {}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}bit", self.os, self.version, self.bitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> String {
        format!("vagrant/virtualbox/{name}")
    }

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry::new(key(name), "\"etag\"").unwrap()
    }

    #[test]
    fn test_parse_without_arch() {
        let e = entry("opscode_centos-6.5_chef-provisionerless.box");
        assert_eq!(e.os(), "centos");
        assert_eq!(e.version().to_string(), "6.5");
        assert_eq!(e.bitness(), Bitness::X86);
        assert_eq!(e.filename(), "opscode_centos-6.5_chef-provisionerless.box");
    }

    #[test]
    fn test_parse_with_arch() {
        let e = entry("opscode_ubuntu-14.04-i386_chef-provisionerless.box");
        assert_eq!(e.os(), "ubuntu");
        assert_eq!(e.version().components(), &[14, 4]);
        assert_eq!(e.bitness(), Bitness::X86);

        let e = entry("opscode_debian-7.8-x86_64_chef-provisionerless.box");
        assert_eq!(e.os(), "debian");
        assert_eq!(e.version().to_string(), "7.8");
        assert_eq!(e.bitness(), Bitness::X64);
    }

    #[test]
    fn test_rejects_unrecognized_names() {
        let bad = [
            "opscode_centos-6.5_chef-provisionerless.box.sha",
            "opscode_CentOS-6.5_chef-provisionerless.box",
            "opscode_centos-6.5-arm64_chef-provisionerless.box",
            "opscode_centos-_chef-provisionerless.box",
            "opscode_centos-6.x_chef-provisionerless.box",
            "opscode_centos6.5_chef-provisionerless.box",
            "opscode_-6.5_chef-provisionerless.box",
            "bento_centos-6.5_chef-provisionerless.box",
            "opscode_centos-6.5_chef.box",
        ];
        for name in bad {
            match CatalogEntry::new(key(name), "x") {
                Err(EntryError::UnrecognizedArtifactName(path)) => assert_eq!(path, key(name)),
                Ok(e) => panic!("{name} should be rejected, parsed as {e}"),
            }
        }
    }

    #[test]
    fn test_rejects_keys_escaping_destination() {
        let name = "opscode_centos-6.5_chef-provisionerless.box";
        for path in [
            format!("vagrant/virtualbox/../../{name}"),
            format!("/etc/{name}"),
            format!("vagrant//{name}"),
            format!("vagrant/./{name}"),
        ] {
            assert!(CatalogEntry::new(&path, "x").is_err(), "{path} should be rejected");
        }
    }

    #[test]
    fn test_url() {
        let e = entry("opscode_centos-6.5_chef-provisionerless.box");
        assert_eq!(
            e.url("http://bucket.example/"),
            "http://bucket.example/vagrant/virtualbox/opscode_centos-6.5_chef-provisionerless.box"
        );
    }

    #[test]
    fn test_equality_uses_path_and_fingerprint() {
        let name = key("opscode_centos-6.5_chef-provisionerless.box");
        let a = CatalogEntry::new(&name, "one").unwrap();
        let b = CatalogEntry::new(&name, "one").unwrap();
        let c = CatalogEntry::new(&name, "two").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_catalog_order() {
        let centos_65 = entry("opscode_centos-6.5_chef-provisionerless.box");
        let centos_65_64 = entry("opscode_centos-6.5-x86_64_chef-provisionerless.box");
        let centos_610 = entry("opscode_centos-6.10_chef-provisionerless.box");
        let debian_70 = entry("opscode_debian-7.0_chef-provisionerless.box");

        assert_eq!(centos_65.catalog_cmp(&centos_65_64), Ordering::Less);
        assert_eq!(centos_65_64.catalog_cmp(&centos_610), Ordering::Less);
        assert_eq!(centos_610.catalog_cmp(&debian_70), Ordering::Less);

        let padded = entry("opscode_centos-6.5.0_chef-provisionerless.box");
        assert_eq!(centos_65.catalog_cmp(&padded), Ordering::Equal);
    }

    #[test]
    fn test_display() {
        let e = entry("opscode_centos-7.0-x86_64_chef-provisionerless.box");
        assert_eq!(e.to_string(), "centos-7.0 64bit");
    }
}
