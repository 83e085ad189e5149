use crate::infra::{load_dataset, write_dataset, Dataset, InMemoryStore};
use arbomap::config::{AppConfig, PricingConfig};
use arbomap::error::AppError;
use arbomap::telemetry;
use arbomap::workflows::noo::{ImportSummary, PriceListImporter};
use arbomap::workflows::pricing::{
    ActivePriceList, ApplyOutcome, InterventionId, InterventionRepository, InterventionStatus,
    PriceBreakdown, PricingService, PricingServiceError, RepricedIntervention,
};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// JSON dataset with intervention types, assessments and interventions
    #[arg(long)]
    pub(crate) dataset: PathBuf,
    /// NOO price-list export (CSV) loaded as the configured version
    #[arg(long)]
    pub(crate) price_list: Option<PathBuf>,
    /// Estimate a single intervention instead of the whole dataset
    #[arg(long)]
    pub(crate) intervention: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct RecomputeArgs {
    /// JSON dataset with intervention types, assessments and interventions
    #[arg(long)]
    pub(crate) dataset: PathBuf,
    /// NOO price-list export (CSV) loaded as the configured version
    #[arg(long)]
    pub(crate) price_list: Option<PathBuf>,
    /// Write the repriced dataset to this path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PriceListImportArgs {
    /// NOO price-list export (CSV)
    #[arg(long)]
    pub(crate) path: PathBuf,
    /// Price-list version code (defaults to the configured version)
    #[arg(long)]
    pub(crate) version: Option<String>,
    /// Human-readable version label
    #[arg(long)]
    pub(crate) label: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EstimateReport {
    pub(crate) intervention_id: InterventionId,
    pub(crate) status: InterventionStatus,
    pub(crate) status_label: &'static str,
    pub(crate) estimated_price_czk: Option<i64>,
    pub(crate) breakdown: PriceBreakdown,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct RecomputeSummary {
    pub(crate) trees: usize,
    pub(crate) updated: usize,
    pub(crate) unchanged: usize,
    pub(crate) interventions: Vec<RepricedIntervention>,
}

type StoreService = PricingService<InMemoryStore, InMemoryStore, InMemoryStore>;

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let dataset = load_dataset(&args.dataset)?;
    let price_list = load_price_list(&config.pricing, args.price_list.as_deref())?;
    let only = args.intervention.map(InterventionId);

    let reports = estimate_dataset(&config.pricing, dataset, price_list, only.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

pub(crate) fn run_recompute(args: RecomputeArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let dataset = load_dataset(&args.dataset)?;
    let price_list = load_price_list(&config.pricing, args.price_list.as_deref())?;

    let (summary, repriced) = recompute_dataset(&config.pricing, dataset, price_list)?;
    if let Some(output) = args.output.as_deref() {
        write_dataset(output, &repriced)?;
        info!(path = %output.display(), "repriced dataset written");
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub(crate) fn run_price_list_import(args: PriceListImportArgs) -> Result<(), AppError> {
    let config = bootstrap()?;
    let summary = import_price_list(
        &config.pricing,
        &args.path,
        args.version.as_deref(),
        args.label.as_deref(),
    )?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn load_price_list(
    config: &PricingConfig,
    path: Option<&Path>,
) -> Result<Option<ActivePriceList>, AppError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let import = PriceListImporter::new(config)?.import_path(path)?;
    Ok(Some(import.price_list))
}

fn service_for(
    config: &PricingConfig,
    dataset: Dataset,
    price_list: Option<ActivePriceList>,
) -> Result<(InMemoryStore, StoreService), AppError> {
    let store = InMemoryStore::from_dataset(dataset);
    if let Some(price_list) = price_list {
        store.add_price_list(price_list).map_err(pricing_error)?;
    }
    let shared = Arc::new(store.clone());
    let service = PricingService::new(shared.clone(), shared.clone(), shared, config);
    Ok((store, service))
}

/// Estimates without persisting, in dataset order.
pub(crate) fn estimate_dataset(
    config: &PricingConfig,
    dataset: Dataset,
    price_list: Option<ActivePriceList>,
    only: Option<&InterventionId>,
) -> Result<Vec<EstimateReport>, AppError> {
    let (store, service) = service_for(config, dataset, price_list)?;
    let ids = match only {
        Some(id) => vec![id.clone()],
        None => store.intervention_ids().map_err(pricing_error)?,
    };

    ids.into_iter()
        .map(|intervention_id| {
            let status = store
                .fetch(&intervention_id)
                .map_err(pricing_error)?
                .map(|intervention| intervention.status)
                .ok_or_else(|| {
                    PricingServiceError::InterventionNotFound(intervention_id.clone())
                })?;
            let estimate = service.estimate_intervention_price(&intervention_id)?;
            Ok(EstimateReport {
                intervention_id,
                status,
                status_label: status.label(),
                estimated_price_czk: estimate.estimated_price_czk,
                breakdown: estimate.breakdown,
            })
        })
        .collect()
}

/// Applies estimates tree by tree and returns the summary with the updated records.
pub(crate) fn recompute_dataset(
    config: &PricingConfig,
    dataset: Dataset,
    price_list: Option<ActivePriceList>,
) -> Result<(RecomputeSummary, Dataset), AppError> {
    let (store, service) = service_for(config, dataset, price_list)?;
    let trees = store.intervention_tree_ids().map_err(pricing_error)?;

    let mut summary = RecomputeSummary {
        trees: trees.len(),
        ..RecomputeSummary::default()
    };
    for tree_id in &trees {
        for repriced in service.on_assessment_saved(tree_id)? {
            match repriced.outcome {
                ApplyOutcome::Updated => summary.updated += 1,
                ApplyOutcome::Unchanged => summary.unchanged += 1,
            }
            summary.interventions.push(repriced);
        }
    }
    info!(
        trees = summary.trees,
        updated = summary.updated,
        unchanged = summary.unchanged,
        "recompute finished"
    );

    let repriced = store.snapshot().map_err(pricing_error)?;
    Ok((summary, repriced))
}

pub(crate) fn import_price_list(
    config: &PricingConfig,
    path: &Path,
    version: Option<&str>,
    label: Option<&str>,
) -> Result<ImportSummary, AppError> {
    let version = version.unwrap_or(config.price_list_version.as_str());
    let label = label
        .map(str::to_string)
        .unwrap_or_else(|| version.replace('_', " "));
    let import = PriceListImporter::with_version(config, version, &label)?.import_path(path)?;
    Ok(import.summary)
}

fn pricing_error(err: arbomap::workflows::pricing::RepositoryError) -> AppError {
    AppError::Pricing(err.into())
}
