use serde::Serialize;

use super::domain::Assessment;

const NEUTRAL_MULTIPLIER: f64 = 1.00;

const ACCESS_OBSTACLE_TABLE: &[(u8, f64, &str)] = &[
    (0, 1.00, "Volné stanoviště"),
    (1, 1.30, "Pomístní překážky (+30 %)"),
    (2, 1.60, "Omezená přístupnost / plné spouštění (+60 %)"),
];

const MISTLETOE_TABLE: &[(u8, f64, &str)] = &[
    (1, 1.15, "R – vzácné (do 5 % objemu koruny)"),
    (2, 1.15, "O – příležitostné (6–10 % objemu koruny)"),
    (3, 1.30, "F – časté (11–30 % objemu koruny)"),
    (4, 1.50, "A – hojné (31–50 % objemu koruny)"),
    (5, 1.50, "D – dominantní (> 50 % objemu koruny)"),
];

const UNKNOWN_LEVEL_LABEL: &str = "Neznámá kategorie";

/// Multipliers derived from the qualitative fields of a single assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentPricingContext {
    pub access_obstacle_level: u8,
    pub access_obstacle_label: &'static str,
    pub access_obstacle_multiplier: f64,
    pub mistletoe_level: Option<u8>,
    pub mistletoe_label: Option<&'static str>,
    pub mistletoe_multiplier: f64,
    pub combined_multiplier: f64,
}

impl AssessmentPricingContext {
    pub fn from_levels(access_obstacle_level: u8, mistletoe_level: Option<u8>) -> Self {
        let (access_obstacle_multiplier, access_obstacle_label) =
            access_obstacle_entry(access_obstacle_level);
        let (mistletoe_multiplier, mistletoe_label) = mistletoe_entry(mistletoe_level);

        Self {
            access_obstacle_level,
            access_obstacle_label,
            access_obstacle_multiplier,
            mistletoe_level,
            mistletoe_label,
            mistletoe_multiplier,
            combined_multiplier: round_multiplier(access_obstacle_multiplier * mistletoe_multiplier),
        }
    }

    /// Context for a tree without any assessment: every multiplier is neutral.
    pub fn neutral() -> Self {
        Self::from_levels(0, None)
    }
}

impl From<&Assessment> for AssessmentPricingContext {
    fn from(assessment: &Assessment) -> Self {
        Self::from_levels(
            assessment.access_obstacle_level,
            assessment.mistletoe_level,
        )
    }
}

/// Table factors have two decimals, so four decimals hold every product exactly.
fn round_multiplier(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn access_obstacle_entry(level: u8) -> (f64, &'static str) {
    ACCESS_OBSTACLE_TABLE
        .iter()
        .find(|(candidate, _, _)| *candidate == level)
        .map(|(_, multiplier, label)| (*multiplier, *label))
        .unwrap_or((NEUTRAL_MULTIPLIER, UNKNOWN_LEVEL_LABEL))
}

fn mistletoe_entry(level: Option<u8>) -> (f64, Option<&'static str>) {
    match level {
        None | Some(0) => (NEUTRAL_MULTIPLIER, None),
        Some(level) => MISTLETOE_TABLE
            .iter()
            .find(|(candidate, _, _)| *candidate == level)
            .map(|(_, multiplier, label)| (*multiplier, Some(*label)))
            .unwrap_or((NEUTRAL_MULTIPLIER, Some(UNKNOWN_LEVEL_LABEL))),
    }
}
