//! Delimited text ingestion
//!
//! [`read_row`] parses one comma-separated row into typed numeric slots.
//! [`GridLoader`] builds on it to populate a [`crate::GridStore`] from one row
//! per cell.

mod loader;

pub use loader::{CellRecord, GridLoader, CELL_ROW_KINDS};

use crate::error::IngestError;

/// Field delimiter
pub const DELIMITER: char = ',';

/// Declared type of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Signed 64-bit integer
    Int64,
    /// Double-precision float
    Double,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Double => "double",
        }
    }

    fn parse(self, text: &str, position: usize) -> Result<FieldValue, IngestError> {
        let parsed = match self {
            Self::Int64 => text.parse::<i64>().ok().map(FieldValue::Int64),
            Self::Double => text.parse::<f64>().ok().map(FieldValue::Double),
        };
        parsed.ok_or_else(|| IngestError::Parse {
            position,
            kind: self.name(),
            text: text.to_string(),
        })
    }
}

/// One parsed numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int64(i64),
    Double(f64),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Int64(0)
    }
}

impl FieldValue {
    /// Integer payload, `None` for a double
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(v),
            Self::Double(_) => None,
        }
    }

    /// Numeric payload as `f64` (integers are widened)
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int64(v) => v as f64,
            Self::Double(v) => v,
        }
    }
}

/// Parse one delimited row into `slots` according to `kinds`.
///
/// Fields are split on [`DELIMITER`] and trimmed; a trailing line terminator is
/// ignored. `slots` is written only if every field parses.
///
/// # Errors
///
/// Returns [`IngestError::SlotsTooShort`] if `slots` cannot hold one value per
/// kind, [`IngestError::FieldCount`] if the row's field count differs from
/// `kinds.len()`, and [`IngestError::Parse`] if a field is not a valid number of
/// its declared kind.
pub fn read_row(row: &str, kinds: &[FieldKind], slots: &mut [FieldValue]) -> Result<(), IngestError> {
    if slots.len() < kinds.len() {
        return Err(IngestError::SlotsTooShort {
            kinds: kinds.len(),
            slots: slots.len(),
        });
    }

    let row = row.trim_end_matches(['\n', '\r']);
    let found = row.split(DELIMITER).count();
    if found != kinds.len() {
        return Err(IngestError::FieldCount {
            expected: kinds.len(),
            found,
        });
    }

    let parsed = row
        .split(DELIMITER)
        .zip(kinds)
        .enumerate()
        .map(|(position, (text, kind))| kind.parse(text.trim(), position))
        .collect::<Result<Vec<_>, _>>()?;

    slots[..parsed.len()].copy_from_slice(&parsed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_mixed_row() {
        let kinds = [FieldKind::Int64, FieldKind::Double, FieldKind::Int64];
        let mut slots = [FieldValue::default(); 3];
        read_row(" 4, 2.5 ,-7\n", &kinds, &mut slots).unwrap();
        assert_eq!(
            slots,
            [
                FieldValue::Int64(4),
                FieldValue::Double(2.5),
                FieldValue::Int64(-7)
            ]
        );
    }

    #[test]
    fn test_field_count_mismatch_leaves_slots() {
        let kinds = [FieldKind::Double, FieldKind::Double];
        let mut slots = [FieldValue::Double(9.0); 2];
        let err = read_row("1.0,2.0,3.0", &kinds, &mut slots).unwrap_err();
        assert_eq!(
            err,
            IngestError::FieldCount {
                expected: 2,
                found: 3
            }
        );
        assert_eq!(slots, [FieldValue::Double(9.0); 2]);
    }

    #[test]
    fn test_short_slot_buffer_rejected() {
        let kinds = [FieldKind::Int64, FieldKind::Int64, FieldKind::Int64];
        let mut slots = [FieldValue::Int64(5); 2];
        let err = read_row("1,2,3", &kinds, &mut slots).unwrap_err();
        assert_eq!(err, IngestError::SlotsTooShort { kinds: 3, slots: 2 });
        assert_eq!(slots, [FieldValue::Int64(5); 2]);
    }

    #[test]
    fn test_parse_failure_leaves_slots() {
        let kinds = [FieldKind::Double, FieldKind::Int64];
        let mut slots = [FieldValue::Int64(1); 2];
        let err = read_row("1.5,2.5", &kinds, &mut slots).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Parse {
                position: 1,
                kind: "int64",
                ..
            }
        ));
        assert_eq!(slots, [FieldValue::Int64(1); 2]);
    }

    #[test]
    fn test_empty_field_rejected() {
        let kinds = [FieldKind::Int64, FieldKind::Int64];
        let mut slots = [FieldValue::default(); 2];
        assert!(read_row("1,", &kinds, &mut slots).is_err());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(FieldValue::Int64(3).as_i64(), Some(3));
        assert_eq!(FieldValue::Double(3.0).as_i64(), None);
        assert_eq!(FieldValue::Int64(3).as_f64(), 3.0);
    }
}
