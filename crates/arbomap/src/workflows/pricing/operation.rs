use serde::{Deserialize, Serialize};

use super::domain::InterventionType;
use super::normalizer::fold_diacritics;

/// Canonical bucket of arborist work used to select a price-list row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationType {
    Health,
    Safety,
    LocalReduction,
    PeripheralReduction,
    Other,
}

impl OperationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            OperationType::Health => "health",
            OperationType::Safety => "safety",
            OperationType::LocalReduction => "local-reduction",
            OperationType::PeripheralReduction => "peripheral-reduction",
            OperationType::Other => "other",
        }
    }
}

/// Which rule produced the operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Code,
    Name,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationMapping {
    pub operation_type: OperationType,
    pub source: MappingSource,
    /// The code or name that matched; `None` for the fallback.
    pub raw: Option<String>,
}

// NOO methodology codes, matched against the uppercased intervention type code.
const CODE_RULES: &[(&str, OperationType)] = &[
    ("RZ", OperationType::Health),
    ("RB", OperationType::Safety),
    ("RL", OperationType::LocalReduction),
    ("RO", OperationType::PeripheralReduction),
    ("SSK", OperationType::PeripheralReduction),
];

// Matched against the diacritic-folded, lowercased name.
const NAME_RULES: &[(&str, OperationType)] = &[
    ("zdravotni", OperationType::Health),
    ("bezpecnostni", OperationType::Safety),
    ("lokalni", OperationType::LocalReduction),
    ("obvodov", OperationType::PeripheralReduction),
    ("sekundarni korun", OperationType::PeripheralReduction),
    ("stabiliz", OperationType::PeripheralReduction),
];

/// Classifies an intervention type: code rules first, then name rules, then health.
pub fn map_operation_type(intervention_type: Option<&InterventionType>) -> OperationMapping {
    if let Some(kind) = intervention_type {
        let code = kind.code.trim();
        let upper = code.to_uppercase();
        if let Some(operation_type) = first_match(&upper, CODE_RULES) {
            return OperationMapping {
                operation_type,
                source: MappingSource::Code,
                raw: Some(code.to_string()),
            };
        }

        let name = kind.name.trim();
        if let Some(operation_type) = first_match(&fold_diacritics(name), NAME_RULES) {
            return OperationMapping {
                operation_type,
                source: MappingSource::Name,
                raw: Some(name.to_string()),
            };
        }
    }

    OperationMapping {
        operation_type: OperationType::Health,
        source: MappingSource::Fallback,
        raw: None,
    }
}

fn first_match(haystack: &str, rules: &[(&str, OperationType)]) -> Option<OperationType> {
    if haystack.is_empty() {
        return None;
    }
    rules
        .iter()
        .find(|(needle, _)| haystack.contains(needle))
        .map(|(_, operation_type)| *operation_type)
}
