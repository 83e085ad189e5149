use serde::{Deserialize, Serialize};

use super::catalog::{format_band, ActivePriceList};
use super::context::AssessmentPricingContext;
use super::domain::{Assessment, InterventionType};
use super::operation::{map_operation_type, MappingSource, OperationType};
use crate::config::PricingConfig;

pub const NOTE_MISSING_ASSESSMENT: &str = "missing tree assessment";
pub const NOTE_MISSING_AREA: &str = "missing crown-area data";
pub const NOTE_MISSING_MULTIPLIERS: &str = "missing assessment multipliers";

/// Upper band limit (inclusive, m²) and price used when the price list has no match.
const FALLBACK_PRICE_BANDS: &[(u32, i64)] = &[
    (50, 2000),
    (100, 3500),
    (200, 5500),
    (300, 7500),
    (400, 9500),
    (500, 11500),
    (600, 13500),
];
const FALLBACK_OVERFLOW_PRICE: i64 = 15500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceSource {
    PriceList,
    Fallback,
}

/// Audit trail stored next to the estimated price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: Option<i64>,
    pub base_price_source: PriceSource,
    pub base_price_item_code: Option<String>,
    pub base_price_operation_type: Option<OperationType>,
    pub base_price_band: Option<String>,
    pub mapped_operation_type_source: Option<MappingSource>,
    pub mapped_operation_type_raw: Option<String>,
    pub area_m2: Option<f64>,
    pub access_obstacle_multiplier: f64,
    pub mistletoe_multiplier: f64,
    pub combined_multiplier: Option<f64>,
    pub estimated_price: Option<i64>,
    pub notes: String,
}

/// Result of pricing one intervention. A `None` price is a displayable "cannot price yet" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionEstimate {
    pub estimated_price_czk: Option<i64>,
    pub breakdown: PriceBreakdown,
}

struct BasePrice {
    price: i64,
    source: PriceSource,
    item_code: Option<String>,
    band: String,
}

/// Stateless estimator bound to an activity code.
#[derive(Debug, Clone)]
pub struct PriceEstimator {
    activity_code: String,
}

impl PriceEstimator {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            activity_code: config.activity_code.clone(),
        }
    }

    /// Prices one intervention from already loaded records. Never fails.
    pub fn estimate(
        &self,
        intervention_type: Option<&InterventionType>,
        latest_assessment: Option<&Assessment>,
        price_list: Option<&ActivePriceList>,
    ) -> InterventionEstimate {
        let Some(assessment) = latest_assessment else {
            return missing_assessment();
        };

        let context = AssessmentPricingContext::from(assessment);
        let area_m2 = crown_area(assessment);
        let mapping = map_operation_type(intervention_type);

        let base = area_m2
            .and_then(|area| self.price_list_base(price_list, mapping.operation_type, area))
            .or_else(|| area_m2.and_then(fallback_base));

        let combined = Some(context.combined_multiplier);
        let (estimated, notes) = match (&base, combined) {
            (None, _) => (None, NOTE_MISSING_AREA),
            (Some(_), None) => (None, NOTE_MISSING_MULTIPLIERS),
            (Some(base), Some(multiplier)) => {
                (Some(round_half_up(base.price as f64 * multiplier)), "")
            }
        };

        let (base_price, base_price_source, base_price_item_code, base_price_band) = match base {
            Some(base) => (Some(base.price), base.source, base.item_code, Some(base.band)),
            None => (None, PriceSource::Fallback, None, None),
        };

        InterventionEstimate {
            estimated_price_czk: estimated,
            breakdown: PriceBreakdown {
                base_price,
                base_price_source,
                base_price_item_code,
                base_price_operation_type: Some(mapping.operation_type),
                base_price_band,
                mapped_operation_type_source: Some(mapping.source),
                mapped_operation_type_raw: mapping.raw,
                area_m2,
                access_obstacle_multiplier: context.access_obstacle_multiplier,
                mistletoe_multiplier: context.mistletoe_multiplier,
                combined_multiplier: combined,
                estimated_price: estimated,
                notes: notes.to_string(),
            },
        }
    }

    fn price_list_base(
        &self,
        price_list: Option<&ActivePriceList>,
        operation_type: OperationType,
        area_m2: f64,
    ) -> Option<BasePrice> {
        let item = price_list?.find_item(&self.activity_code, operation_type, area_m2)?;
        Some(BasePrice {
            price: item.price_czk,
            source: PriceSource::PriceList,
            item_code: Some(item.item_code.clone()),
            band: item.band_label().unwrap_or_default(),
        })
    }
}

fn missing_assessment() -> InterventionEstimate {
    let neutral = AssessmentPricingContext::neutral();
    InterventionEstimate {
        estimated_price_czk: None,
        breakdown: PriceBreakdown {
            base_price: None,
            base_price_source: PriceSource::Fallback,
            base_price_item_code: None,
            base_price_operation_type: None,
            base_price_band: None,
            mapped_operation_type_source: None,
            mapped_operation_type_raw: None,
            area_m2: None,
            access_obstacle_multiplier: neutral.access_obstacle_multiplier,
            mistletoe_multiplier: neutral.mistletoe_multiplier,
            combined_multiplier: None,
            estimated_price: None,
            notes: NOTE_MISSING_ASSESSMENT.to_string(),
        },
    }
}

/// Stored crown area, else the height × width rectangle.
pub fn crown_area(assessment: &Assessment) -> Option<f64> {
    assessment.crown_area_m2.or_else(|| {
        match (assessment.height_m, assessment.crown_width_m) {
            (Some(height), Some(width)) => Some(height * width),
            _ => None,
        }
    })
}

/// Base price from the fixed area table; non-positive areas have no price.
fn fallback_base(area_m2: f64) -> Option<BasePrice> {
    if area_m2.is_nan() || area_m2 <= 0.0 {
        return None;
    }

    let mut lower = 0;
    for &(upper, price) in FALLBACK_PRICE_BANDS {
        if area_m2 <= f64::from(upper) {
            return Some(fallback_price(price, format_band(lower, Some(upper))));
        }
        lower = upper;
    }
    Some(fallback_price(FALLBACK_OVERFLOW_PRICE, format_band(lower, None)))
}

fn fallback_price(price: i64, band: String) -> BasePrice {
    BasePrice {
        price,
        source: PriceSource::Fallback,
        item_code: None,
        band,
    }
}

/// Rounds to the nearest integer with halves going up, ignoring sub-micro float noise.
pub fn round_half_up(value: f64) -> i64 {
    let snapped = (value * 1e6).round() / 1e6;
    (snapped + 0.5).floor() as i64
}
