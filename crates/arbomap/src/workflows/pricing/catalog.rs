use serde::{Deserialize, Serialize};

use super::operation::OperationType;

/// Named snapshot of a pricing methodology, e.g. `NOO_2026`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListVersion {
    pub code: String,
    pub label: String,
}

/// Banded base price for one activity and operation type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListItem {
    pub item_code: String,
    pub activity_code: String,
    pub label: String,
    pub unit: String,
    pub price_czk: i64,
    pub band_min_m2: Option<u32>,
    pub band_max_m2: Option<u32>,
    pub operation_type: OperationType,
    pub is_combo: bool,
    pub is_memorial_or_special: bool,
}

impl PriceListItem {
    /// Whether `area_m2` lies inside `[band_min, band_max]`; items without a lower bound never match.
    pub fn covers(&self, area_m2: f64) -> bool {
        let Some(min) = self.band_min_m2 else {
            return false;
        };
        if f64::from(min) > area_m2 {
            return false;
        }
        self.band_max_m2
            .map_or(true, |max| f64::from(max) >= area_m2)
    }

    pub fn band_label(&self) -> Option<String> {
        match (self.band_min_m2, self.band_max_m2) {
            (None, None) => None,
            (min, max) => Some(format_band(min.unwrap_or(0), max)),
        }
    }
}

pub(crate) fn format_band(min: u32, max: Option<u32>) -> String {
    match max {
        Some(max) => format!("{min}–{max}"),
        None => format!("{min}–"),
    }
}

/// A price-list version together with all of its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePriceList {
    pub version: PriceListVersion,
    pub items: Vec<PriceListItem>,
}

impl ActivePriceList {
    /// Non-combo item for the activity and operation whose band contains the area, lowest band first.
    pub fn find_item(
        &self,
        activity_code: &str,
        operation_type: OperationType,
        area_m2: f64,
    ) -> Option<&PriceListItem> {
        self.items
            .iter()
            .filter(|item| {
                item.activity_code == activity_code
                    && item.operation_type == operation_type
                    && !item.is_combo
                    && item.covers(area_m2)
            })
            .min_by_key(|item| item.band_min_m2)
    }
}
