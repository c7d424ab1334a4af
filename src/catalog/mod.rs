// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Remote box catalog and selection.
//!
//! The catalog is built once from a bucket listing. Keys that do not follow
//! the artifact naming pattern are dropped while building it. Selection then
//! picks, per `(os, bitness, requirement)`, the greatest entry under
//! [`CatalogEntry::catalog_cmp`].
//!
//! ```
//! use bento_mirror::catalog::{Bitness, Catalog, ListingRecord};
//!
//! let catalog = Catalog::from_records(vec![
//!     ListingRecord::new("vagrant/virtualbox/opscode_centos-6.4_chef-provisionerless.box", "a"),
//!     ListingRecord::new("vagrant/virtualbox/opscode_centos-6.5_chef-provisionerless.box", "b"),
//! ]);
//! let best = catalog.latest("centos", "~> 6.0", Bitness::X86).unwrap().unwrap();
//! assert_eq!(best.version().to_string(), "6.5");
//! ```

pub mod entry;
pub mod listing;

pub use entry::{Bitness, CatalogEntry};
pub use listing::{BucketClient, ListingRecord, ListingSource};

use crate::config::BoxSpec;
use crate::error::{ListingError, VersionError};
use crate::version::VersionRequirement;

/// Parsed catalog entries, in listing order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Fetch the listing from `source` and build the catalog.
    ///
    /// Listing failures propagate unchanged. No retry is attempted.
    pub fn fetch(source: &dyn ListingSource) -> Result<Self, ListingError> {
        Ok(Self::from_records(source.fetch_listing()?))
    }

    /// Build a catalog, skipping records whose key is not a recognized
    /// artifact name.
    pub fn from_records(records: impl IntoIterator<Item = ListingRecord>) -> Self {
        let entries = records
            .into_iter()
            .filter_map(|record| match CatalogEntry::new(record.key, record.fingerprint) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping listing record: {}", e);
                    None
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Greatest entry for `os` and `bitness` whose version satisfies
    /// `requirement`, or `None` if nothing qualifies.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::MalformedConstraint`] if `requirement` cannot
    /// be parsed.
    pub fn latest(
        &self,
        os: &str,
        requirement: &str,
        bitness: Bitness,
    ) -> Result<Option<&CatalogEntry>, VersionError> {
        let requirement = VersionRequirement::parse(requirement)?;
        Ok(self.latest_matching(os, &requirement, bitness))
    }

    /// Like [`Catalog::latest`] with an already parsed requirement.
    ///
    /// Entries that tie under the catalog order resolve to the one that
    /// appears last in the listing.
    pub fn latest_matching(
        &self,
        os: &str,
        requirement: &VersionRequirement,
        bitness: Bitness,
    ) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.os() == os)
            .filter(|entry| entry.bitness() == bitness)
            .filter(|entry| requirement.satisfied_by(entry.version()))
            .max_by(|a, b| a.catalog_cmp(b))
    }

    /// Select the latest entry of every bitness for each registry row.
    ///
    /// Rows without a match are skipped. The result is sorted by the catalog
    /// order, with repeated selections collapsed.
    pub fn select(&self, boxes: &[BoxSpec]) -> Result<Vec<CatalogEntry>, VersionError> {
        let mut selected = Vec::new();

        for wanted in boxes {
            let requirement = VersionRequirement::parse(&wanted.requirement)?;
            for bitness in Bitness::ALL {
                match self.latest_matching(&wanted.os, &requirement, bitness) {
                    Some(entry) => selected.push(entry.clone()),
                    None => tracing::debug!(
                        "No {} {}bit box satisfies {}",
                        wanted.os,
                        bitness,
                        requirement
                    ),
                }
            }
        }

        selected.sort_by(|a, b| a.catalog_cmp(b));
        selected.dedup();
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, fingerprint: &str) -> ListingRecord {
        ListingRecord::new(format!("vagrant/virtualbox/{name}"), fingerprint)
    }

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            record("opscode_centos-6.0_chef-provisionerless.box", "c60"),
            record("opscode_centos-6.5_chef-provisionerless.box", "c65"),
            record("opscode_centos-7.0_chef-provisionerless.box", "c70"),
            record("opscode_centos-6.5-x86_64_chef-provisionerless.box", "c65-64"),
            record("opscode_centos-5.10-i386_chef-provisionerless.box", "c510"),
            record("opscode_ubuntu-14.04_chef-provisionerless.box", "u1404"),
            record("opscode_ubuntu-14.10_chef-provisionerless.box", "u1410"),
            record("not-a-box.box", "junk"),
        ])
    }

    #[test]
    fn test_unrecognized_records_are_skipped() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 7);
        assert!(catalog.entries().iter().all(|e| e.fingerprint() != "junk"));
    }

    #[test]
    fn test_latest_picks_highest_in_range() {
        let catalog = catalog();
        let best = catalog.latest("centos", "~> 6.0", Bitness::X86).unwrap().unwrap();
        assert_eq!(best.fingerprint(), "c65");
        assert_eq!(best.bitness(), Bitness::X86);

        let best = catalog.latest("centos", "~> 6.0", Bitness::X64).unwrap().unwrap();
        assert_eq!(best.fingerprint(), "c65-64");
    }

    #[test]
    fn test_latest_default_requirement() {
        let catalog = catalog();
        let best = catalog.latest("centos", "", Bitness::X86).unwrap().unwrap();
        assert_eq!(best.fingerprint(), "c70");
    }

    #[test]
    fn test_latest_none_when_nothing_qualifies() {
        let catalog = catalog();
        assert!(catalog.latest("debian", "~> 7.0", Bitness::X86).unwrap().is_none());
        assert!(catalog.latest("centos", "~> 8.0", Bitness::X86).unwrap().is_none());
        assert!(catalog.latest("ubuntu", "14.04", Bitness::X64).unwrap().is_none());
    }

    #[test]
    fn test_latest_malformed_requirement() {
        let catalog = catalog();
        let result = catalog.latest("centos", "~> six", Bitness::X86);
        assert!(matches!(result, Err(VersionError::MalformedConstraint { .. })));
    }

    #[test]
    fn test_ties_resolve_to_last_listed() {
        let catalog = Catalog::from_records(vec![
            record("opscode_centos-6.5_chef-provisionerless.box", "first"),
            ListingRecord::new(
                "vagrant/virtualbox/old/opscode_centos-6.5_chef-provisionerless.box",
                "second",
            ),
        ]);
        let best = catalog.latest("centos", "~> 6.0", Bitness::X86).unwrap().unwrap();
        assert_eq!(best.fingerprint(), "second");
    }

    #[test]
    fn test_select_sorted_and_deduplicated() {
        let boxes = vec![
            BoxSpec::new("ubuntu", "14.04"),
            BoxSpec::new("centos", "~> 6.0"),
            BoxSpec::new("centos", ">= 6.5, < 7"),
            BoxSpec::new("debian", "~> 7.0"),
        ];
        let selected = catalog().select(&boxes).unwrap();
        let fingerprints: Vec<_> = selected.iter().map(|e| e.fingerprint()).collect();
        assert_eq!(fingerprints, vec!["c65", "c65-64", "u1404"]);
    }

    #[test]
    fn test_select_malformed_requirement() {
        let boxes = vec![BoxSpec::new("centos", "~>")];
        assert!(catalog().select(&boxes).is_err());
    }

    struct FailingSource;

    impl ListingSource for FailingSource {
        fn fetch_listing(&self) -> Result<Vec<ListingRecord>, ListingError> {
            Err(ListingError::Status {
                url: "http://bucket.example/".into(),
                status: 503,
            })
        }
    }

    #[test]
    fn test_fetch_propagates_listing_failure() {
        let result = Catalog::fetch(&FailingSource);
        assert!(matches!(result, Err(ListingError::Status { status: 503, .. })));
    }
}
