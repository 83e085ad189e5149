use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::estimate::PriceBreakdown;

/// Identifier wrapper for inventoried trees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TreeId(pub String);

/// Assessment identifiers are sequential, so they also break ties between same-day snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterventionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterventionTypeId(pub String);

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_inner!(TreeId, AssessmentId, InterventionId, InterventionTypeId);

/// One arborist measurement snapshot of a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub tree_id: TreeId,
    pub assessed_on: NaiveDate,
    #[serde(default)]
    pub height_m: Option<f64>,
    #[serde(default)]
    pub crown_width_m: Option<f64>,
    #[serde(default)]
    pub crown_area_m2: Option<f64>,
    #[serde(default)]
    pub access_obstacle_level: u8,
    #[serde(default)]
    pub mistletoe_level: Option<u8>,
}

impl Assessment {
    /// Crown area derived from the measured height and width, rounded half-up to centimetres.
    pub fn derived_crown_area(&self) -> Option<f64> {
        match (self.height_m, self.crown_width_m) {
            (Some(height), Some(width)) if height > 0.0 && width > 0.0 => {
                Some(round_to_hundredths(height * width))
            }
            _ => None,
        }
    }

    /// Refreshes the stored crown area when both dimensions are known.
    pub fn refresh_crown_area(&mut self) {
        if let Some(area) = self.derived_crown_area() {
            self.crown_area_m2 = Some(area);
        }
    }

    pub fn recency_key(&self) -> (NaiveDate, AssessmentId) {
        (self.assessed_on, self.id)
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    // Snap float noise first so 12.345 stored as 12.344999.. still rounds up.
    let scaled = (value * 100.0 * 1e6).round() / 1e6;
    (scaled + 0.5).floor() / 100.0
}

/// Picks the most recent assessment by date, then by id.
pub fn latest_assessment<'a, I>(assessments: I) -> Option<&'a Assessment>
where
    I: IntoIterator<Item = &'a Assessment>,
{
    assessments
        .into_iter()
        .max_by_key(|assessment| assessment.recency_key())
}

/// Catalog entry describing a kind of arborist work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionType {
    pub id: InterventionTypeId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Lifecycle of a proposed unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionStatus {
    #[default]
    Proposed,
    DonePendingOwner,
    Completed,
}

impl InterventionStatus {
    /// Display label shown to municipal staff.
    pub const fn label(self) -> &'static str {
        match self {
            InterventionStatus::Proposed => "Navrženo",
            InterventionStatus::DonePendingOwner => "Provedeno, čeká na potvrzení vlastníka",
            InterventionStatus::Completed => "Dokončeno",
        }
    }
}

/// Proposed or tracked work against a tree, carrying the persisted estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub id: InterventionId,
    pub tree_id: TreeId,
    #[serde(default)]
    pub intervention_type_id: Option<InterventionTypeId>,
    #[serde(default)]
    pub status: InterventionStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_price_czk: Option<i64>,
    #[serde(default)]
    pub estimated_price_breakdown: Option<PriceBreakdown>,
}

impl Intervention {
    pub fn stored_estimate(&self) -> StoredEstimate {
        StoredEstimate {
            estimated_price_czk: self.estimated_price_czk,
            breakdown: self.estimated_price_breakdown.clone(),
        }
    }
}

/// The two derived fields written back onto an intervention.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoredEstimate {
    pub estimated_price_czk: Option<i64>,
    pub breakdown: Option<PriceBreakdown>,
}
