//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Partial hash comparison over the first 4 KiB (Phase 1)
//! - Full hash comparison of the remaining candidates (Phase 2)
//! - Ordered digest grouping and the confirmed duplicate set

pub mod finder;
pub mod groups;

pub use finder::{
    DetectError, DetectionStats, DetectorConfig, DuplicateDetector, ReadErrorPolicy,
};
pub use groups::{DuplicateGroup, DuplicateSet, HashGroups};
