//! End-to-end pricing scenarios driven through the public service facade, with the price list
//! loaded through the NOO importer.

mod common {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use arbomap::config::PricingConfig;
    use arbomap::workflows::noo::PriceListImporter;
    use arbomap::workflows::pricing::domain::latest_assessment;
    use arbomap::workflows::pricing::{
        ActivePriceList, Assessment, AssessmentId, AssessmentRepository, Intervention,
        InterventionId, InterventionRepository, InterventionStatus, InterventionType,
        InterventionTypeId, PriceListRepository, PricingService, RepositoryError,
        StoredEstimate, TreeId,
    };

    pub(super) const NOO_EXPORT: &str = "\
ZE41a,Zdravotní řez do 50 m2,ks,\"2 400\"
ZE41b,Zdravotní řez 51-100 m2,ks,\"3 900\"
ZE41g,Bezpečnostní řez do 50 m2,ks,1800
ZE41h,Bezpečnostní řez 51-100 m2,ks,2900
";

    pub(super) fn oak() -> TreeId {
        TreeId("dub-042".to_string())
    }

    pub(super) fn assessment(id: u64, day: u32, crown_area_m2: Option<f64>) -> Assessment {
        Assessment {
            id: AssessmentId(id),
            tree_id: oak(),
            assessed_on: NaiveDate::from_ymd_opt(2026, 4, day).expect("valid date"),
            height_m: None,
            crown_width_m: None,
            crown_area_m2,
            access_obstacle_level: 0,
            mistletoe_level: None,
        }
    }

    pub(super) fn intervention(id: &str, type_id: &str) -> Intervention {
        Intervention {
            id: InterventionId(id.to_string()),
            tree_id: oak(),
            intervention_type_id: Some(InterventionTypeId(type_id.to_string())),
            status: InterventionStatus::Proposed,
            description: String::new(),
            estimated_price_czk: None,
            estimated_price_breakdown: None,
        }
    }

    fn catalog() -> Vec<InterventionType> {
        vec![
            InterventionType {
                id: InterventionTypeId("rz".to_string()),
                code: "S-RZ".to_string(),
                name: "Zdravotní řez".to_string(),
                category: None,
            },
            InterventionType {
                id: InterventionTypeId("rb".to_string()),
                code: "S-RB".to_string(),
                name: "Zdravotní řez s prvky bezpečnostního".to_string(),
                category: None,
            },
        ]
    }

    #[derive(Default)]
    pub(super) struct Store {
        assessments: Mutex<Vec<Assessment>>,
        interventions: Mutex<HashMap<InterventionId, Intervention>>,
        types: Mutex<HashMap<InterventionTypeId, InterventionType>>,
        price_list: Mutex<Option<ActivePriceList>>,
        writes: Mutex<usize>,
    }

    impl Store {
        pub(super) fn add_intervention(&self, intervention: Intervention) {
            self.interventions
                .lock()
                .expect("mutex poisoned")
                .insert(intervention.id.clone(), intervention);
        }

        pub(super) fn writes(&self) -> usize {
            *self.writes.lock().expect("mutex poisoned")
        }

        pub(super) fn stored(&self, id: &str) -> Intervention {
            self.interventions
                .lock()
                .expect("mutex poisoned")
                .get(&InterventionId(id.to_string()))
                .cloned()
                .expect("intervention present")
        }
    }

    impl AssessmentRepository for Store {
        fn latest_for_tree(
            &self,
            tree_id: &TreeId,
        ) -> Result<Option<Assessment>, RepositoryError> {
            let guard = self.assessments.lock().expect("mutex poisoned");
            Ok(latest_assessment(guard.iter().filter(|a| &a.tree_id == tree_id)).cloned())
        }

        fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
            self.assessments
                .lock()
                .expect("mutex poisoned")
                .push(assessment.clone());
            Ok(assessment)
        }
    }

    impl InterventionRepository for Store {
        fn fetch(&self, id: &InterventionId) -> Result<Option<Intervention>, RepositoryError> {
            Ok(self.interventions.lock().expect("mutex poisoned").get(id).cloned())
        }

        fn for_tree(&self, tree_id: &TreeId) -> Result<Vec<Intervention>, RepositoryError> {
            let guard = self.interventions.lock().expect("mutex poisoned");
            let mut found: Vec<Intervention> = guard
                .values()
                .filter(|i| &i.tree_id == tree_id)
                .cloned()
                .collect();
            found.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(found)
        }

        fn intervention_type(
            &self,
            id: &InterventionTypeId,
        ) -> Result<Option<InterventionType>, RepositoryError> {
            Ok(self.types.lock().expect("mutex poisoned").get(id).cloned())
        }

        fn update_estimate(
            &self,
            id: &InterventionId,
            expected: &StoredEstimate,
            next: StoredEstimate,
        ) -> Result<(), RepositoryError> {
            let mut guard = self.interventions.lock().expect("mutex poisoned");
            let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
            if &record.stored_estimate() != expected {
                return Err(RepositoryError::Conflict);
            }
            record.estimated_price_czk = next.estimated_price_czk;
            record.estimated_price_breakdown = next.breakdown;
            *self.writes.lock().expect("mutex poisoned") += 1;
            Ok(())
        }
    }

    impl PriceListRepository for Store {
        fn active_price_list(
            &self,
            version_code: &str,
        ) -> Result<Option<ActivePriceList>, RepositoryError> {
            Ok(self
                .price_list
                .lock()
                .expect("mutex poisoned")
                .clone()
                .filter(|list| list.version.code == version_code))
        }
    }

    pub(super) fn store_with_price_list() -> Arc<Store> {
        let config = PricingConfig::default();
        let import = PriceListImporter::new(&config)
            .expect("importer builds")
            .import_reader(Cursor::new(NOO_EXPORT))
            .expect("export imports");

        let store = Store::default();
        *store.price_list.lock().expect("mutex poisoned") = Some(import.price_list);
        {
            let mut types = store.types.lock().expect("mutex poisoned");
            for kind in catalog() {
                types.insert(kind.id.clone(), kind);
            }
        }
        Arc::new(store)
    }

    pub(super) fn service(store: &Arc<Store>) -> PricingService<Store, Store, Store> {
        PricingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            &PricingConfig::default(),
        )
    }
}

use arbomap::workflows::pricing::{ApplyOutcome, InterventionId, OperationType, PriceSource};
use common::*;

#[test]
fn recording_assessments_reprices_interventions_from_the_price_list() {
    let store = store_with_price_list();
    store.add_intervention(intervention("int-a", "rz"));
    store.add_intervention(intervention("int-b", "rb"));
    let service = service(&store);

    let mut first = assessment(1, 2, Some(45.0));
    first.access_obstacle_level = 1;
    first.mistletoe_level = Some(3);
    let recorded = service.record_assessment(first).expect("recorded");
    assert_eq!(recorded.repriced.len(), 2);

    let health = store.stored("int-a");
    let breakdown = health.estimated_price_breakdown.expect("breakdown");
    assert_eq!(breakdown.base_price_source, PriceSource::PriceList);
    assert_eq!(breakdown.base_price_item_code.as_deref(), Some("ZE41a"));
    // 2400 × 1.69
    assert_eq!(health.estimated_price_czk, Some(4056));

    let safety = store.stored("int-b");
    let breakdown = safety.estimated_price_breakdown.expect("breakdown");
    assert_eq!(breakdown.base_price_operation_type, Some(OperationType::Safety));
    // 1800 × 1.69
    assert_eq!(safety.estimated_price_czk, Some(3042));

    let mut regrown = assessment(2, 20, None);
    regrown.height_m = Some(9.0);
    regrown.crown_width_m = Some(8.0);
    service.record_assessment(regrown).expect("recorded");

    assert_eq!(store.stored("int-a").estimated_price_czk, Some(3900));
    assert_eq!(store.stored("int-b").estimated_price_czk, Some(2900));
}

#[test]
fn saving_an_intervention_twice_writes_once() {
    let store = store_with_price_list();
    store.add_intervention(intervention("int-a", "rz"));
    let service = service(&store);
    service
        .record_assessment(assessment(1, 2, Some(70.0)))
        .expect("recorded");
    let writes_after_assessment = store.writes();

    let id = InterventionId("int-a".to_string());
    let outcome = service.on_intervention_saved(&id).expect("applied");

    assert_eq!(outcome.outcome, ApplyOutcome::Unchanged);
    assert_eq!(store.writes(), writes_after_assessment);
}

#[test]
fn oversized_crown_falls_back_to_fixed_table() {
    let store = store_with_price_list();
    store.add_intervention(intervention("int-a", "rz"));
    let service = service(&store);
    service
        .record_assessment(assessment(1, 2, Some(1000.0)))
        .expect("recorded");

    let stored = store.stored("int-a");
    let breakdown = stored.estimated_price_breakdown.expect("breakdown");
    assert_eq!(breakdown.base_price_source, PriceSource::Fallback);
    assert_eq!(breakdown.base_price_band.as_deref(), Some("600–"));
    assert_eq!(stored.estimated_price_czk, Some(15500));
}
