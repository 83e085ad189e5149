//! Import of NOO price-list exports into an [`ActivePriceList`].

mod mapping;
mod parser;

use std::io::Read;
use std::path::Path;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PricingConfig;
use crate::workflows::pricing::{ActivePriceList, PriceListItem, PriceListVersion};

const EXAMPLE_LIMIT: usize = 5;

#[derive(Debug)]
pub enum PriceListImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidActivityCode(String),
}

impl std::fmt::Display for PriceListImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceListImportError::Io(err) => write!(f, "failed to read price list: {}", err),
            PriceListImportError::Csv(err) => write!(f, "invalid price list CSV data: {}", err),
            PriceListImportError::InvalidActivityCode(code) => {
                write!(f, "activity code '{}' cannot be used as an item prefix", code)
            }
        }
    }
}

impl std::error::Error for PriceListImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PriceListImportError::Io(err) => Some(err),
            PriceListImportError::Csv(err) => Some(err),
            PriceListImportError::InvalidActivityCode(_) => None,
        }
    }
}

impl From<std::io::Error> for PriceListImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for PriceListImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Counts reported after an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub with_band: usize,
    pub combos: usize,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PriceListImport {
    pub price_list: ActivePriceList,
    pub summary: ImportSummary,
}

pub struct PriceListImporter {
    activity_code: String,
    item_code: Regex,
    version: PriceListVersion,
}

impl PriceListImporter {
    /// Importer for the configured activity, labelling the version after its code (`NOO_2026` → `NOO 2026`).
    pub fn new(config: &PricingConfig) -> Result<Self, PriceListImportError> {
        let label = config.price_list_version.replace('_', " ");
        Self::with_version(config, &config.price_list_version, &label)
    }

    pub fn with_version(
        config: &PricingConfig,
        version_code: &str,
        version_label: &str,
    ) -> Result<Self, PriceListImportError> {
        let activity_code = config.activity_code.trim();
        let item_code = Regex::new(&format!("(?i)^{}[a-z]+$", regex::escape(activity_code)))
            .map_err(|_| PriceListImportError::InvalidActivityCode(activity_code.to_string()))?;

        Ok(Self {
            activity_code: activity_code.to_string(),
            item_code,
            version: PriceListVersion {
                code: version_code.to_string(),
                label: version_label.to_string(),
            },
        })
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<PriceListImport, PriceListImportError> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file)
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<PriceListImport, PriceListImportError> {
        let mut items: Vec<PriceListItem> = Vec::new();
        let mut summary = ImportSummary::default();

        for row in parser::parse_rows(reader, &self.item_code)? {
            let class = mapping::classify_label(&row.label);
            if class.band.is_set() {
                summary.with_band += 1;
            }
            if class.is_combo {
                summary.combos += 1;
            }

            let item = PriceListItem {
                item_code: row.item_code,
                activity_code: self.activity_code.clone(),
                label: row.label,
                unit: row.unit,
                price_czk: row.price_czk,
                band_min_m2: class.band.min,
                band_max_m2: class.band.max,
                operation_type: class.operation_type,
                is_combo: class.is_combo,
                is_memorial_or_special: class.is_memorial_or_special,
            };

            if summary.examples.len() < EXAMPLE_LIMIT {
                summary.examples.push(example_line(&item));
            }
            summary.imported += 1;

            match items
                .iter_mut()
                .find(|existing| existing.item_code == item.item_code)
            {
                Some(existing) => {
                    debug!(item = %item.item_code, "replacing duplicate price list item");
                    *existing = item;
                }
                None => items.push(item),
            }
        }

        info!(
            version = %self.version.code,
            imported = summary.imported,
            with_band = summary.with_band,
            combos = summary.combos,
            "price list imported"
        );

        Ok(PriceListImport {
            price_list: ActivePriceList {
                version: self.version.clone(),
                items,
            },
            summary,
        })
    }
}

fn example_line(item: &PriceListItem) -> String {
    let band = match (item.band_min_m2, item.band_max_m2) {
        (None, None) => "-".to_string(),
        (min, max) => format!(
            "{}-{}",
            min.map(|value| value.to_string()).unwrap_or_default(),
            max.map(|value| value.to_string()).unwrap_or_default()
        ),
    };
    format!(
        "{} | {} | {} | {}",
        item.item_code,
        item.operation_type.as_str(),
        band,
        item.price_czk
    )
}
