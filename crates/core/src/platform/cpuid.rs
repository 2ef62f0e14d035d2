//! Cache geometry from CPUID leaf 4 (deterministic cache parameters)

#[cfg(target_arch = "x86")]
use std::arch::x86::{__cpuid_count, CpuidResult};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{__cpuid_count, CpuidResult};

use super::{CacheGeometry, CacheKind, CacheLevel};

const CACHE_PARAMETERS_LEAF: u32 = 4;
// Leaf 4 enumerates sub-leaves until it reports a null cache; real CPUs stop well before this.
const MAX_SUBLEAVES: u32 = 16;

/// CPUID-backed cache query.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuidProbe;

fn cpuid(leaf: u32, subleaf: u32) -> CpuidResult {
    // SAFETY: CPUID is available on every x86_64 CPU and on all x86 CPUs Rust targets.
    #[allow(unused_unsafe)]
    unsafe {
        __cpuid_count(leaf, subleaf)
    }
}

/// Decode one leaf-4 sub-leaf. `None` marks the end of the list.
pub(super) fn decode_leaf4(regs: CpuidResult) -> Option<CacheLevel> {
    let kind = match regs.eax & 0x1f {
        1 => CacheKind::Data,
        2 => CacheKind::Instruction,
        3 => CacheKind::Unified,
        _ => return None,
    };
    Some(CacheLevel {
        level: ((regs.eax >> 5) & 0x7) as u8,
        kind,
        line_size: (regs.ebx & 0xfff) + 1,
        partitions: ((regs.ebx >> 12) & 0x3ff) + 1,
        ways: ((regs.ebx >> 22) & 0x3ff) + 1,
        sets: regs.ecx.wrapping_add(1),
    })
}

impl CacheGeometry for CpuidProbe {
    fn cache_levels(&self) -> Vec<CacheLevel> {
        let max_leaf = cpuid(0, 0).eax;
        if max_leaf < CACHE_PARAMETERS_LEAF {
            return Vec::new();
        }
        (0..MAX_SUBLEAVES)
            .map_while(|subleaf| decode_leaf4(cpuid(CACHE_PARAMETERS_LEAF, subleaf)))
            .collect()
    }

    fn vendor(&self) -> Option<String> {
        let regs = cpuid(0, 0);
        let mut bytes = Vec::with_capacity(12);
        for reg in [regs.ebx, regs.edx, regs.ecx] {
            bytes.extend_from_slice(&reg.to_le_bytes());
        }
        String::from_utf8(bytes)
            .ok()
            .map(|s| s.trim_end_matches('\0').to_string())
            .filter(|s| !s.is_empty())
    }
}
