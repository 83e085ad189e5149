use std::sync::OnceLock;

use regex::Regex;

use crate::workflows::pricing::normalizer::fold_diacritics;
use crate::workflows::pricing::OperationType;

/// Band bounds in m² parsed from an item label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Band {
    pub(crate) min: Option<u32>,
    pub(crate) max: Option<u32>,
}

impl Band {
    pub(crate) fn is_set(self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LabelClass {
    pub(crate) operation_type: OperationType,
    pub(crate) is_combo: bool,
    pub(crate) is_memorial_or_special: bool,
    pub(crate) band: Band,
}

struct BandPatterns {
    up_to: Regex,
    range: Regex,
    above: Regex,
}

static BAND_PATTERNS: OnceLock<BandPatterns> = OnceLock::new();

fn band_patterns() -> &'static BandPatterns {
    BAND_PATTERNS.get_or_init(|| BandPatterns {
        up_to: Regex::new(r"do\s*(\d+)").unwrap_or_else(|_| unreachable!()),
        range: Regex::new(r"(\d+)\s*[-–]\s*(\d+)").unwrap_or_else(|_| unreachable!()),
        above: Regex::new(r"(?:vice nez|nad)\s*(\d+)").unwrap_or_else(|_| unreachable!()),
    })
}

pub(crate) fn classify_label(label: &str) -> LabelClass {
    let folded = fold_diacritics(label);
    let (operation_type, is_combo) = operation_from_folded(&folded);

    LabelClass {
        operation_type,
        is_combo,
        is_memorial_or_special: folded.contains("pamatne") || folded.contains("vyjimecne"),
        band: band_from_folded(&folded),
    }
}

fn operation_from_folded(folded: &str) -> (OperationType, bool) {
    if folded.contains("kombinace") {
        return (OperationType::Other, true);
    }
    let operation_type = if folded.starts_with("zdravotni rez") {
        OperationType::Health
    } else if folded.starts_with("bezpecnostni rez") {
        OperationType::Safety
    } else if folded.starts_with("lokalni redukce") {
        OperationType::LocalReduction
    } else if folded.contains("obvodova redukce") {
        OperationType::PeripheralReduction
    } else {
        OperationType::Other
    };
    (operation_type, false)
}

fn band_from_folded(folded: &str) -> Band {
    let patterns = band_patterns();

    if let Some(max) = capture_number(&patterns.up_to, folded, 1) {
        return Band {
            min: Some(0),
            max: Some(max),
        };
    }
    if let Some(captures) = patterns.range.captures(folded) {
        let min = captures.get(1).and_then(|m| m.as_str().parse().ok());
        let max = captures.get(2).and_then(|m| m.as_str().parse().ok());
        if min.is_some() && max.is_some() {
            return Band { min, max };
        }
    }
    if let Some(above) = capture_number(&patterns.above, folded, 1) {
        return Band {
            min: above.checked_add(1),
            max: None,
        };
    }

    Band::default()
}

fn capture_number(pattern: &Regex, haystack: &str, group: usize) -> Option<u32> {
    pattern
        .captures(haystack)?
        .get(group)?
        .as_str()
        .parse()
        .ok()
}
