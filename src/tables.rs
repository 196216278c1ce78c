//! # Tables — Regulatory Sample-Size Resolution
//!
//! Holds the official SAG-USDA lookup tables and resolves a lot size to the
//! number of boxes that must be inspected.
//!
//! ## Table Families
//!
//! | Family | Basis |
//! |--------|-------|
//! | Hypergeometric 3% | 3% infestation, 95% confidence |
//! | Hypergeometric 6% | 6% infestation, 95% confidence, never above 49 |
//! | Biometric | fixed tiers for pome fruit and citrus |
//! | Percentage | 2% of the lot with a 0.50 cutoff toward the ceiling |
//!
//! Each table is an ordered run of inclusive ranges that must partition
//! `[1, ∞)` with no gaps or overlaps. The ranges are checked once, on first
//! use, and a malformed table is treated as a programming error.
//!
//! ## Post-Resolution Clamps
//!
//! Whatever the table says, the final size is clamped in this order:
//! cap at 49 for the 6% table, cap at the lot size, floor at 1.

use crate::error::SamplingError;
use crate::species::TableFamily;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Absolute ceiling for the 6% hypergeometric table.
pub const HYPERGEOMETRIC_6_CAP: u32 = 49;

/// Lots at or below this size take the percentage-rule floor.
const PERCENTAGE_FLOOR_LOT: u32 = 100;
const PERCENTAGE_FLOOR_SAMPLE: u32 = 2;

/// Sample size listed for a table range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSample {
    /// Every unit in the lot is inspected.
    All,
    Fixed(u32),
}

/// One row of a regulatory table: `min..=max` maps to `sample`.
/// `max == None` marks the unbounded terminal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRange {
    pub min: u32,
    pub max: Option<u32>,
    pub sample: RangeSample,
}

impl TableRange {
    const fn new(min: u32, max: u32, sample: RangeSample) -> Self {
        TableRange {
            min,
            max: Some(max),
            sample,
        }
    }

    const fn open(min: u32, sample: RangeSample) -> Self {
        TableRange {
            min,
            max: None,
            sample,
        }
    }

    pub fn contains(&self, lot_size: u32) -> bool {
        lot_size >= self.min && self.max.map_or(true, |max| lot_size <= max)
    }

    fn sample_for(&self, lot_size: u32) -> u32 {
        match self.sample {
            RangeSample::All => lot_size,
            RangeSample::Fixed(n) => n,
        }
    }
}

impl std::fmt::Display for TableRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) => write!(f, "{:>6} – {:<6}", self.min, max)?,
            None => write!(f, "{:>6} – {:<6}", self.min, "∞")?,
        }
        match self.sample {
            RangeSample::All => write!(f, " → all units"),
            RangeSample::Fixed(n) => write!(f, " → {}", n),
        }
    }
}

use RangeSample::{All, Fixed};

static HYPERGEOMETRIC_3: [TableRange; 7] = [
    TableRange::new(1, 900, All),
    TableRange::new(901, 1500, Fixed(63)),
    TableRange::new(1501, 4000, Fixed(90)),
    TableRange::new(4001, 10000, Fixed(94)),
    TableRange::new(10001, 15000, Fixed(96)),
    TableRange::new(15001, 20000, Fixed(98)),
    TableRange::open(20001, Fixed(99)),
];

static HYPERGEOMETRIC_6: [TableRange; 14] = [
    TableRange::new(1, 37, All),
    TableRange::new(38, 78, Fixed(37)),
    TableRange::new(79, 88, Fixed(38)),
    TableRange::new(89, 117, Fixed(39)),
    TableRange::new(118, 140, Fixed(40)),
    TableRange::new(141, 157, Fixed(41)),
    TableRange::new(158, 175, Fixed(42)),
    TableRange::new(176, 207, Fixed(43)),
    TableRange::new(208, 257, Fixed(44)),
    TableRange::new(258, 335, Fixed(45)),
    TableRange::new(336, 425, Fixed(46)),
    TableRange::new(426, 850, Fixed(47)),
    TableRange::new(851, 2250, Fixed(48)),
    TableRange::open(2251, Fixed(HYPERGEOMETRIC_6_CAP)),
];

static BIOMETRIC: [TableRange; 4] = [
    TableRange::new(1, 30, All),
    TableRange::new(31, 2000, Fixed(30)),
    TableRange::new(2001, 10000, Fixed(50)),
    TableRange::open(10001, Fixed(100)),
];

fn raw_table(family: TableFamily) -> Option<&'static [TableRange]> {
    match family {
        TableFamily::Hypergeometric3 => Some(&HYPERGEOMETRIC_3),
        TableFamily::Hypergeometric6 => Some(&HYPERGEOMETRIC_6),
        TableFamily::Biometric => Some(&BIOMETRIC),
        TableFamily::Percentage => None,
    }
}

/// The lookup table for a family, or `None` for the rule-based percentage
/// family. All tables are verified on the first call.
pub fn table_for(family: TableFamily) -> Option<&'static [TableRange]> {
    static CHECKED: OnceLock<()> = OnceLock::new();
    CHECKED.get_or_init(|| {
        for f in TableFamily::ALL {
            if let Some(ranges) = raw_table(f) {
                if let Err(e) = validate_ranges(ranges) {
                    panic!("regulatory table {} is malformed: {}", f, e);
                }
            }
        }
    });
    raw_table(family)
}

/// Check that ranges are sorted, contiguous, start at 1 and end unbounded.
pub fn validate_ranges(ranges: &[TableRange]) -> Result<(), String> {
    let first = ranges.first().ok_or("table is empty")?;
    if first.min != 1 {
        return Err(format!("first range starts at {}, not 1", first.min));
    }
    for (i, pair) in ranges.windows(2).enumerate() {
        let max = pair[0]
            .max
            .ok_or_else(|| format!("range {} is unbounded but not last", i))?;
        if max < pair[0].min {
            return Err(format!("range {} is inverted ({} > {})", i, pair[0].min, max));
        }
        if pair[1].min != max + 1 {
            return Err(format!(
                "gap or overlap between {} and {} (next range starts at {})",
                i,
                i + 1,
                pair[1].min
            ));
        }
    }
    match ranges.last() {
        Some(last) if last.max.is_some() => Err("last range is bounded".into()),
        _ => Ok(()),
    }
}

/// Size listed by a table before clamping. Falls back to the last range if
/// nothing matches, which cannot happen for a validated table.
fn lookup(ranges: &[TableRange], lot_size: u32) -> u32 {
    ranges
        .iter()
        .find(|r| r.contains(lot_size))
        .or_else(|| ranges.last())
        .map_or(lot_size, |r| r.sample_for(lot_size))
}

/// Two percent of the lot, in exact hundredths: round up when the fractional
/// part is 0.50 or more, down otherwise. Lots of 100 or fewer take 2.
pub fn percentage_rule(lot_size: u32) -> u32 {
    if lot_size <= PERCENTAGE_FLOOR_LOT {
        return PERCENTAGE_FLOOR_SAMPLE;
    }
    let hundredths = lot_size as u64 * 2;
    let whole = hundredths / 100;
    let fraction = hundredths % 100;
    let size = if fraction >= 50 { whole + 1 } else { whole };
    size as u32
}

/// Apply the regulatory clamps: 6% cap, lot-size cap, floor of one.
pub fn clamp_sample_size(size: u32, lot_size: u32, family: TableFamily) -> u32 {
    let mut size = size;
    if family == TableFamily::Hypergeometric6 && size > HYPERGEOMETRIC_6_CAP {
        size = HYPERGEOMETRIC_6_CAP;
    }
    if size > lot_size {
        size = lot_size;
    }
    size.max(1)
}

/// Resolve the regulatory sample size for a lot.
///
/// Returns the clamped size and the official display name of the table.
pub fn resolve_sample_size(
    lot_size: u32,
    family: TableFamily,
) -> Result<(u32, &'static str), SamplingError> {
    if lot_size == 0 {
        return Err(SamplingError::InvalidLotSize);
    }
    let raw = match table_for(family) {
        Some(ranges) => lookup(ranges, lot_size),
        None => percentage_rule(lot_size),
    };
    Ok((clamp_sample_size(raw, lot_size, family), family.display_name()))
}

/// Resolve the sample size from an explicit percentage: `ceil(lot × pct / 100)`.
pub fn resolve_sample_size_manual(lot_size: u32, percentage: f64) -> Result<u32, SamplingError> {
    if lot_size == 0 {
        return Err(SamplingError::InvalidLotSize);
    }
    if !percentage.is_finite() || percentage <= 0.0 || percentage > 100.0 {
        return Err(SamplingError::InvalidPercentage(percentage));
    }
    let raw = lot_size as f64 * percentage / 100.0;
    // Products like 1000 × 5% land a hair above the integer in binary.
    let nearest = raw.round();
    let size = if (raw - nearest).abs() < 1e-9 {
        nearest
    } else {
        raw.ceil()
    };
    Ok(clamp_sample_size(
        size as u32,
        lot_size,
        TableFamily::Percentage,
    ))
}

/// Display name for a manual-percentage resolution.
pub fn manual_display_name(percentage: f64) -> String {
    format!("Porcentual {}%", percentage)
}

// ── Sampling Intensity ──────────────────────────────────────────

/// Optional increase of sampling intensity requested by the inspector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum IntensityIncrement {
    #[default]
    None,
    Twenty,
    Forty,
}

impl IntensityIncrement {
    pub fn percent(&self) -> u32 {
        match self {
            IntensityIncrement::None => 0,
            IntensityIncrement::Twenty => 20,
            IntensityIncrement::Forty => 40,
        }
    }

    /// Raise a base sample by this increment and re-apply the clamps.
    pub fn apply(&self, base: u32, lot_size: u32, family: TableFamily) -> u32 {
        let pct = self.percent() as u64;
        let raised = (base as u64 * (100 + pct)).div_ceil(100);
        clamp_sample_size(raised.min(u32::MAX as u64) as u32, lot_size, family)
    }
}

impl TryFrom<u32> for IntensityIncrement {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(IntensityIncrement::None),
            20 => Ok(IntensityIncrement::Twenty),
            40 => Ok(IntensityIncrement::Forty),
            other => Err(format!(
                "intensity increment must be 0, 20 or 40, got {}",
                other
            )),
        }
    }
}

impl From<IntensityIncrement> for u32 {
    fn from(value: IntensityIncrement) -> Self {
        value.percent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(lot: u32, family: TableFamily) -> u32 {
        resolve_sample_size(lot, family).unwrap().0
    }

    #[test]
    fn all_tables_partition_the_positive_integers() {
        for family in TableFamily::ALL {
            if let Some(ranges) = table_for(family) {
                assert_eq!(validate_ranges(ranges), Ok(()), "table {}", family);
            }
        }
    }

    #[test]
    fn validate_ranges_rejects_gap() {
        let ranges = [
            TableRange::new(1, 10, All),
            TableRange::open(12, Fixed(5)),
        ];
        assert!(validate_ranges(&ranges).is_err());
    }

    #[test]
    fn validate_ranges_rejects_bounded_tail_and_bad_start() {
        assert!(validate_ranges(&[TableRange::new(1, 10, All)]).is_err());
        assert!(validate_ranges(&[TableRange::open(2, All)]).is_err());
        assert!(validate_ranges(&[]).is_err());
    }

    #[test]
    fn hypergeometric_3_boundaries() {
        let f = TableFamily::Hypergeometric3;
        let cases = [
            (1, 1),
            (900, 900),
            (901, 63),
            (1500, 63),
            (1501, 90),
            (4000, 90),
            (4001, 94),
            (10000, 94),
            (10001, 96),
            (15000, 96),
            (15001, 98),
            (20000, 98),
            (20001, 99),
            (25000, 99),
        ];
        for (lot, expected) in cases {
            assert_eq!(size(lot, f), expected, "lot {}", lot);
        }
    }

    #[test]
    fn hypergeometric_6_boundaries() {
        let f = TableFamily::Hypergeometric6;
        let cases = [
            (1, 1),
            (37, 37),
            (38, 37),
            (78, 37),
            (79, 38),
            (88, 38),
            (89, 39),
            (117, 39),
            (118, 40),
            (140, 40),
            (141, 41),
            (157, 41),
            (158, 42),
            (175, 42),
            (176, 43),
            (207, 43),
            (208, 44),
            (257, 44),
            (258, 45),
            (335, 45),
            (336, 46),
            (425, 46),
            (426, 47),
            (850, 47),
            (851, 48),
            (2250, 48),
            (2251, 49),
            (50000, 49),
        ];
        for (lot, expected) in cases {
            assert_eq!(size(lot, f), expected, "lot {}", lot);
        }
    }

    #[test]
    fn hypergeometric_6_never_exceeds_cap() {
        for lot in [3000, 10000, 100000, 500000, u32::MAX] {
            assert!(size(lot, TableFamily::Hypergeometric6) <= HYPERGEOMETRIC_6_CAP);
        }
    }

    #[test]
    fn biometric_boundaries() {
        let f = TableFamily::Biometric;
        for (lot, expected) in [(1, 1), (30, 30), (31, 30), (2000, 30), (2001, 50), (10000, 50), (10001, 100)] {
            assert_eq!(size(lot, f), expected, "lot {}", lot);
        }
    }

    #[test]
    fn percentage_rule_cutoff_rounds_toward_ceiling_at_half() {
        let f = TableFamily::Percentage;
        assert_eq!(size(124, f), 2);
        assert_eq!(size(125, f), 3);
        assert_eq!(size(150, f), 3);
        assert_eq!(size(174, f), 3);
        assert_eq!(size(175, f), 4);
        assert_eq!(size(1000, f), 20);
    }

    #[test]
    fn percentage_floor_applies_up_to_one_hundred() {
        assert_eq!(percentage_rule(1), 2);
        assert_eq!(percentage_rule(100), 2);
        assert_eq!(percentage_rule(101), 2);
        // Lot of one: the floor of 2 is capped back to the lot size.
        assert_eq!(size(1, TableFamily::Percentage), 1);
    }

    #[test]
    fn zero_lot_is_rejected() {
        assert_eq!(
            resolve_sample_size(0, TableFamily::Biometric),
            Err(SamplingError::InvalidLotSize)
        );
        assert_eq!(
            resolve_sample_size_manual(0, 5.0),
            Err(SamplingError::InvalidLotSize)
        );
    }

    #[test]
    fn display_name_follows_family() {
        let (_, name) = resolve_sample_size(1000, TableFamily::Hypergeometric6).unwrap();
        assert_eq!(name, "Hipergeométrica del 6%");
        let (_, name) = resolve_sample_size(1000, TableFamily::Percentage).unwrap();
        assert_eq!(name, "Porcentual 2%");
    }

    #[test]
    fn manual_percentage_rounds_up() {
        assert_eq!(resolve_sample_size_manual(2332, 2.0), Ok(47));
        assert_eq!(resolve_sample_size_manual(1000, 5.0), Ok(50));
        assert_eq!(resolve_sample_size_manual(100, 2.0), Ok(2));
        assert_eq!(resolve_sample_size_manual(10, 0.5), Ok(1));
        assert_eq!(resolve_sample_size_manual(37, 100.0), Ok(37));
    }

    #[test]
    fn manual_percentage_out_of_range_is_rejected() {
        for pct in [0.0, -1.0, 100.5, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(
                    resolve_sample_size_manual(100, pct),
                    Err(SamplingError::InvalidPercentage(_))
                ),
                "percentage {} accepted",
                pct
            );
        }
    }

    #[test]
    fn clamps_apply_in_order() {
        assert_eq!(clamp_sample_size(60, 40, TableFamily::Hypergeometric6), 40);
        assert_eq!(clamp_sample_size(60, 400, TableFamily::Hypergeometric6), 49);
        assert_eq!(clamp_sample_size(60, 400, TableFamily::Biometric), 60);
        assert_eq!(clamp_sample_size(0, 400, TableFamily::Biometric), 1);
    }

    #[test]
    fn increment_raises_and_reclamps() {
        let f = TableFamily::Biometric;
        assert_eq!(IntensityIncrement::None.apply(30, 1000, f), 30);
        assert_eq!(IntensityIncrement::Twenty.apply(30, 1000, f), 36);
        assert_eq!(IntensityIncrement::Forty.apply(30, 1000, f), 42);
        assert_eq!(IntensityIncrement::Twenty.apply(31, 1000, f), 38);
        assert_eq!(IntensityIncrement::Forty.apply(30, 35, f), 35);
        assert_eq!(
            IntensityIncrement::Forty.apply(48, 5000, TableFamily::Hypergeometric6),
            49
        );
    }

    #[test]
    fn increment_parses_only_regulatory_values() {
        assert_eq!(IntensityIncrement::try_from(20), Ok(IntensityIncrement::Twenty));
        assert!(IntensityIncrement::try_from(10).is_err());
        let parsed: IntensityIncrement = serde_json::from_str("40").unwrap();
        assert_eq!(parsed, IntensityIncrement::Forty);
        assert!(serde_json::from_str::<IntensityIncrement>("15").is_err());
    }

    #[test]
    fn range_display_marks_open_end() {
        let text = HYPERGEOMETRIC_3[6].to_string();
        assert!(text.contains("20001"));
        assert!(text.contains("∞"));
        assert!(text.ends_with("→ 99"));
    }
}
