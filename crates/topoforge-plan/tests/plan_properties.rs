//! Property-based checks for resource counts and naming determinism.

use proptest::collection::btree_set;
use proptest::prelude::*;
use topoforge_core::{Configuration, ResourceKind};
use topoforge_plan::compile;

/// Region-like identifiers such as `us-west-2`.
fn region_id() -> impl Strategy<Value = String> {
    ("[a-z]{2}", "[a-z]{4,9}", 1u8..=9).prop_map(|(area, zone, n)| format!("{area}-{zone}-{n}"))
}

fn region_set() -> impl Strategy<Value = Vec<String>> {
    btree_set(region_id(), 1..6).prop_map(|set| set.into_iter().collect())
}

fn label() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,9}").unwrap()
}

fn configuration(regions: Vec<String>, ses: bool, location: bool) -> Configuration {
    let mut config = Configuration::new("reparaya", "test", regions);
    if ses {
        config = config.with_ses("test@example.com");
    }
    if location {
        config = config.with_location_service();
    }
    config
}

proptest! {
    #[test]
    fn count_is_per_region_total(regions in region_set(), ses in any::<bool>(), location in any::<bool>()) {
        let per_region = 6 + if ses { 3 } else { 0 } + if location { 2 } else { 0 };
        let plan = compile(&configuration(regions.clone(), ses, location)).unwrap();
        prop_assert_eq!(plan.resource_count(), regions.len() * per_region);
    }

    #[test]
    fn replication_adds_four(regions in btree_set(region_id(), 2..6), ses in any::<bool>(), location in any::<bool>()) {
        let regions: Vec<String> = regions.into_iter().collect();
        let base = compile(&configuration(regions.clone(), ses, location)).unwrap();
        let with_crr = compile(
            &configuration(regions.clone(), ses, location)
                .with_replication(regions[0].clone(), regions[1].clone()),
        )
        .unwrap();

        prop_assert_eq!(with_crr.resource_count(), base.resource_count() + 4);
        let outputs = with_crr.outputs();
        prop_assert!(outputs.crr_enabled);
        prop_assert_eq!(outputs.crr_primary_region, Some(regions[0].clone()));
        prop_assert_eq!(outputs.crr_replica_region, Some(regions[1].clone()));
    }

    #[test]
    fn bucket_names_are_keyed_by_region(regions in region_set()) {
        let plan = compile(&configuration(regions.clone(), false, false)).unwrap();
        let names = plan.outputs().s3_bucket_names;
        prop_assert_eq!(names.len(), regions.len());
        for region in &regions {
            prop_assert_eq!(&names[region], &format!("reparaya-media-test-{region}"));
        }
    }

    #[test]
    fn names_are_rederivable(project in label(), environment in label(), region in region_id()) {
        let config = Configuration::new(project.clone(), environment.clone(), [region.clone()])
            .with_location_service();
        let plan = compile(&config).unwrap();

        for decl in plan.declarations() {
            let expected = topoforge_core::canonical_name(decl.kind, &project, &environment, &region);
            prop_assert_eq!(&decl.name, &expected);
        }
        let routes = plan.names_for(ResourceKind::GeoRouteCalculator);
        prop_assert_eq!(
            &routes[&region],
            &format!("{project}-routes-{environment}-{region}")
        );
    }

    #[test]
    fn compilation_is_deterministic(regions in region_set(), ses in any::<bool>(), location in any::<bool>()) {
        let config = configuration(regions, ses, location);
        let first = compile(&config).unwrap();
        let second = compile(&config).unwrap();
        prop_assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        prop_assert_eq!(first, second);
    }
}
