use arbomap::error::AppError;
use arbomap::workflows::pricing::domain::latest_assessment;
use arbomap::workflows::pricing::{
    ActivePriceList, Assessment, AssessmentRepository, Intervention, InterventionId,
    InterventionRepository, InterventionType, InterventionTypeId, PriceListRepository,
    RepositoryError, StoredEstimate, TreeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// JSON snapshot of the records the pricing engine reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Dataset {
    #[serde(default)]
    pub(crate) intervention_types: Vec<InterventionType>,
    #[serde(default)]
    pub(crate) assessments: Vec<Assessment>,
    #[serde(default)]
    pub(crate) interventions: Vec<Intervention>,
}

pub(crate) fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub(crate) fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, dataset)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[derive(Default)]
struct StoreState {
    intervention_types: HashMap<InterventionTypeId, InterventionType>,
    assessments: Vec<Assessment>,
    interventions: Vec<Intervention>,
    price_lists: HashMap<String, ActivePriceList>,
}

/// Dataset-backed store implementing every repository the pricing service needs.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub(crate) fn from_dataset(dataset: Dataset) -> Self {
        let Dataset {
            intervention_types,
            assessments,
            interventions,
        } = dataset;

        let state = StoreState {
            intervention_types: intervention_types
                .into_iter()
                .map(|kind| (kind.id.clone(), kind))
                .collect(),
            assessments,
            interventions,
            price_lists: HashMap::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn add_price_list(&self, price_list: ActivePriceList) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        state
            .price_lists
            .insert(price_list.version.code.clone(), price_list);
        Ok(())
    }

    pub(crate) fn intervention_ids(&self) -> Result<Vec<InterventionId>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.interventions.iter().map(|i| i.id.clone()).collect())
    }

    /// Tree ids in first-seen order across the stored interventions.
    pub(crate) fn intervention_tree_ids(&self) -> Result<Vec<TreeId>, RepositoryError> {
        let state = self.lock()?;
        let mut trees: Vec<TreeId> = Vec::new();
        for intervention in &state.interventions {
            if !trees.contains(&intervention.tree_id) {
                trees.push(intervention.tree_id.clone());
            }
        }
        Ok(trees)
    }

    /// Current records with the catalog sorted by id, ready to be written back out.
    pub(crate) fn snapshot(&self) -> Result<Dataset, RepositoryError> {
        let state = self.lock()?;
        let mut intervention_types: Vec<InterventionType> =
            state.intervention_types.values().cloned().collect();
        intervention_types.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Dataset {
            intervention_types,
            assessments: state.assessments.clone(),
            interventions: state.interventions.clone(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl AssessmentRepository for InMemoryStore {
    fn latest_for_tree(&self, tree_id: &TreeId) -> Result<Option<Assessment>, RepositoryError> {
        let state = self.lock()?;
        Ok(latest_assessment(
            state
                .assessments
                .iter()
                .filter(|assessment| &assessment.tree_id == tree_id),
        )
        .cloned())
    }

    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut state = self.lock()?;
        if state.assessments.iter().any(|a| a.id == assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        state.assessments.push(assessment.clone());
        Ok(assessment)
    }
}

impl InterventionRepository for InMemoryStore {
    fn fetch(&self, id: &InterventionId) -> Result<Option<Intervention>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.interventions.iter().find(|i| &i.id == id).cloned())
    }

    fn for_tree(&self, tree_id: &TreeId) -> Result<Vec<Intervention>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .interventions
            .iter()
            .filter(|intervention| &intervention.tree_id == tree_id)
            .cloned()
            .collect())
    }

    fn intervention_type(
        &self,
        id: &InterventionTypeId,
    ) -> Result<Option<InterventionType>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.intervention_types.get(id).cloned())
    }

    fn update_estimate(
        &self,
        id: &InterventionId,
        expected: &StoredEstimate,
        next: StoredEstimate,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let record = state
            .interventions
            .iter_mut()
            .find(|intervention| &intervention.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if &record.stored_estimate() != expected {
            return Err(RepositoryError::Conflict);
        }
        record.estimated_price_czk = next.estimated_price_czk;
        record.estimated_price_breakdown = next.breakdown;
        Ok(())
    }
}

impl PriceListRepository for InMemoryStore {
    fn active_price_list(
        &self,
        version_code: &str,
    ) -> Result<Option<ActivePriceList>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.price_lists.get(version_code).cloned())
    }
}
