//! Platform capability queries
//!
//! The engine only needs cache geometry to pick a row-block size for the hot
//! loop. It depends on the [`CacheGeometry`] trait; how the numbers are obtained
//! (CPUID on x86, nothing elsewhere) stays behind it. Results never affect
//! simulation output.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod cpuid;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use cpuid::CpuidProbe;

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a cache level stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CacheKind {
    Data,
    Instruction,
    Unified,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.pad("data"),
            Self::Instruction => f.pad("instruction"),
            Self::Unified => f.pad("unified"),
        }
    }
}

/// Geometry of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheLevel {
    /// Cache level (1 = closest to the core)
    pub level: u8,
    /// Data, instruction or unified
    pub kind: CacheKind,
    /// Coherency line size in bytes
    pub line_size: u32,
    /// Physical line partitions
    pub partitions: u32,
    /// Ways of associativity
    pub ways: u32,
    /// Number of sets
    pub sets: u32,
}

impl CacheLevel {
    /// Total capacity in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.ways)
            * u64::from(self.partitions)
            * u64::from(self.line_size)
            * u64::from(self.sets)
    }

    /// Whether this cache holds data (data or unified)
    #[must_use]
    pub fn holds_data(&self) -> bool {
        matches!(self.kind, CacheKind::Data | CacheKind::Unified)
    }
}

/// Narrow platform interface for cache geometry.
pub trait CacheGeometry {
    /// All caches the platform reports, closest first. Empty if unknown.
    fn cache_levels(&self) -> Vec<CacheLevel>;

    /// CPU vendor string, if the platform exposes one
    fn vendor(&self) -> Option<String> {
        None
    }
}

/// Platform without a cache query; reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCacheInfo;

impl CacheGeometry for NoCacheInfo {
    fn cache_levels(&self) -> Vec<CacheLevel> {
        Vec::new()
    }
}

/// Fixed geometry, for callers that already know their target.
#[derive(Debug, Clone, Default)]
pub struct KnownGeometry(pub Vec<CacheLevel>);

impl CacheGeometry for KnownGeometry {
    fn cache_levels(&self) -> Vec<CacheLevel> {
        self.0.clone()
    }
}

/// Best available cache query for the build target.
#[must_use]
pub fn detect() -> Box<dyn CacheGeometry> {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        Box::new(CpuidProbe)
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    {
        Box::new(NoCacheInfo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_size() {
        let l1 = CacheLevel {
            level: 1,
            kind: CacheKind::Data,
            line_size: 64,
            partitions: 1,
            ways: 8,
            sets: 64,
        };
        assert_eq!(l1.size(), 32 * 1024);
        assert!(l1.holds_data());
    }

    #[test]
    fn test_no_cache_info_is_empty() {
        assert!(NoCacheInfo.cache_levels().is_empty());
        assert!(NoCacheInfo.vendor().is_none());
    }

    #[test]
    fn test_detect_reports_sane_levels() {
        for level in detect().cache_levels() {
            assert!(level.line_size >= 1);
        }
    }
}
