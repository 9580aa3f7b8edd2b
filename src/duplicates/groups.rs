//! Digest grouping and the confirmed duplicate set.
//!
//! # Overview
//!
//! [`HashGroups`] is the per-phase accumulator: an ordered map from
//! [`Digest`] to the files that produced it. Both the digest keys and the
//! files under each key keep insertion order, which is what makes the final
//! output stable: a group lists its files in the order they were enumerated.
//!
//! [`DuplicateSet`] is the result handed to the actions: only groups with
//! two or more files, each keyed by a full-content digest.
//!
//! # Example
//!
//! ```
//! use dupsweep::duplicates::HashGroups;
//! use dupsweep::scanner::Digest;
//! use std::path::PathBuf;
//!
//! let a = Digest::from_bytes([1; 16]);
//! let b = Digest::from_bytes([2; 16]);
//!
//! let mut groups = HashGroups::new();
//! groups.insert(a, PathBuf::from("/x"));
//! groups.insert(b, PathBuf::from("/y"));
//! groups.insert(a, PathBuf::from("/z"));
//!
//! // Only the digest shared by two files survives
//! assert_eq!(groups.candidates(), vec![PathBuf::from("/x"), PathBuf::from("/z")]);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::scanner::Digest;

/// Ordered map from digest to the files sharing it.
#[derive(Debug, Clone, Default)]
pub struct HashGroups {
    index: HashMap<Digest, usize>,
    entries: Vec<(Digest, Vec<PathBuf>)>,
}

impl HashGroups {
    /// Create an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the group for `digest`, creating the group on first sight.
    pub fn insert(&mut self, digest: Digest, path: PathBuf) {
        match self.index.get(&digest) {
            Some(&slot) => self.entries[slot].1.push(path),
            None => {
                self.index.insert(digest, self.entries.len());
                self.entries.push((digest, vec![path]));
            }
        }
    }

    /// Files recorded under `digest`, in insertion order.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&[PathBuf]> {
        self.index
            .get(digest)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of files across all digests.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|(_, files)| files.len()).sum()
    }

    /// Number of digests seen exactly once.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, files)| files.len() == 1)
            .count()
    }

    /// Iterate `(digest, files)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(digest, files)| (digest, files.as_slice()))
    }

    /// Every file belonging to a group of two or more, group by group in
    /// first-seen order.
    #[must_use]
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|(_, files)| files.len() > 1)
            .flat_map(|(_, files)| files.iter().cloned())
            .collect()
    }

    /// Drop every group of fewer than two files and freeze the rest.
    #[must_use]
    pub fn into_duplicates(self) -> DuplicateSet {
        self.entries
            .into_iter()
            .map(|(digest, files)| DuplicateGroup::new(digest, files))
            .collect()
    }
}

/// Files confirmed to share identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Full-content digest shared by every file
    pub digest: Digest,
    /// Member files in enumeration order
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(digest: Digest, files: Vec<PathBuf>) -> Self {
        Self { digest, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The copy kept by deletion: the first file in enumeration order.
    #[must_use]
    pub fn keeper(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    /// Every file except the keeper.
    #[must_use]
    pub fn redundant(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or(&[])
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        self.digest.to_hex()
    }
}

/// The confirmed duplicates of one run.
///
/// Every group holds at least two files and no path appears in more than one
/// group. Groups are ordered by the first time their digest was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSet {
    groups: Vec<DuplicateGroup>,
}

impl DuplicateSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate groups in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DuplicateGroup> {
        self.groups.iter()
    }

    /// All groups as a slice.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// Group for `digest`, if any.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&DuplicateGroup> {
        self.groups.iter().find(|g| &g.digest == digest)
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Number of files that deletion would remove.
    #[must_use]
    pub fn redundant_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }
}

impl FromIterator<DuplicateGroup> for DuplicateSet {
    /// Collect groups, dropping any with fewer than two files and any path
    /// already claimed by an earlier group.
    fn from_iter<I: IntoIterator<Item = DuplicateGroup>>(iter: I) -> Self {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let groups = iter
            .into_iter()
            .filter_map(|group| {
                let files: Vec<PathBuf> = group
                    .files
                    .into_iter()
                    .filter(|p| seen.insert(p.clone()))
                    .collect();
                (files.len() > 1).then(|| DuplicateGroup::new(group.digest, files))
            })
            .collect();
        Self { groups }
    }
}

impl<'a> IntoIterator for &'a DuplicateSet {
    type Item = &'a DuplicateGroup;
    type IntoIter = std::slice::Iter<'a, DuplicateGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}
