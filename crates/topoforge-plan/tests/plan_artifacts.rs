use topoforge_core::{Configuration, ResourceKind};
use topoforge_plan::{Plan, compile, plan_json_schema};

fn full_config() -> Configuration {
    Configuration::new("reparaya", "test", ["us-west-2", "eu-central-1"])
        .with_ses("noreply@reparaya.mx")
        .with_location_service()
        .with_replication("us-west-2", "eu-central-1")
}

#[test]
fn outputs_serialize_with_runtime_names() {
    let plan = compile(&full_config()).expect("compile");
    let outputs = serde_json::to_value(plan.outputs()).expect("serialize outputs");

    assert_eq!(outputs["resource_count"], 26);
    assert!(outputs["s3_bucket_names"].is_object());
    assert!(outputs["location_place_index_names"].is_object());
    assert!(outputs["location_route_calculator_names"].is_object());
    assert_eq!(outputs["crr_enabled"], true);
    assert_eq!(outputs["crr_primary_region"], "us-west-2");
    assert_eq!(outputs["crr_replica_region"], "eu-central-1");
    assert_eq!(
        outputs["s3_bucket_names"]["eu-central-1"],
        "reparaya-media-test-eu-central-1"
    );
}

#[test]
fn compiling_twice_is_byte_identical() {
    let first = compile(&full_config()).expect("compile");
    let second = compile(&full_config()).expect("compile");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
    assert_eq!(
        first.fingerprint().expect("fingerprint"),
        second.fingerprint().expect("fingerprint")
    );
}

#[test]
fn fingerprint_changes_with_naming_inputs() {
    let base = compile(&full_config()).expect("compile");
    let mut renamed = full_config();
    renamed.environment = "prod".to_string();
    let other = compile(&renamed).expect("compile");

    let fingerprint = base.fingerprint().expect("fingerprint");
    assert_eq!(fingerprint.len(), 64);
    assert_ne!(fingerprint, other.fingerprint().expect("fingerprint"));
}

#[test]
fn plan_json_round_trips() {
    let plan = compile(&full_config()).expect("compile");
    let json = serde_json::to_string_pretty(&plan).expect("serialize plan");
    let parsed: Plan = serde_json::from_str(&json).expect("parse plan");
    assert_eq!(parsed, plan);
}

#[test]
fn plan_json_matches_its_schema() {
    let plan = compile(&full_config()).expect("compile");
    let instance = serde_json::to_value(&plan).expect("serialize plan");
    let schema = serde_json::to_value(plan_json_schema()).expect("serialize schema");

    let compiled = jsonschema::JSONSchema::compile(&schema).expect("compile schema");
    assert!(compiled.is_valid(&instance));
}

#[test]
fn apply_order_creates_dependencies_first() {
    let plan = compile(&full_config()).expect("compile");
    let order = plan.apply_order().expect("acyclic plan");
    assert_eq!(order.len(), plan.resource_count());

    let position = |id: topoforge_plan::DeclarationId| {
        order
            .iter()
            .position(|candidate| *candidate == id)
            .expect("id in order")
    };
    for (idx, decl) in plan.declarations().iter().enumerate() {
        for dep in &decl.depends_on {
            assert!(
                position(*dep) < position(topoforge_plan::DeclarationId(idx)),
                "{} applied before its dependency",
                decl.address()
            );
        }
    }
}

#[test]
fn env_exports_cover_enabled_features() {
    let plan = compile(&full_config()).expect("compile");
    let env = plan.env_exports("eu-central-1").expect("planned region");

    assert_eq!(env["AWS_REGION"], "eu-central-1");
    assert_eq!(env["AWS_S3_BUCKET_MEDIA"], "reparaya-media-test-eu-central-1");
    assert_eq!(
        env["AWS_LOCATION_PLACE_INDEX"],
        "reparaya-places-test-eu-central-1"
    );
    assert_eq!(
        env["AWS_LOCATION_ROUTE_CALCULATOR"],
        "reparaya-routes-test-eu-central-1"
    );
    assert_eq!(env["AWS_SES_CONFIGURATION_SET"], "reparaya-email-test-eu-central-1");
    assert_eq!(env["SES_SENDER_EMAIL"], "noreply@reparaya.mx");

    assert!(plan.env_exports("global").is_none());
    assert!(plan.env_exports("sa-east-1").is_none());
}

#[test]
fn env_exports_skip_disabled_features() {
    let plan = compile(&Configuration::new("reparaya", "test", ["us-west-2"])).expect("compile");
    let env = plan.env_exports("us-west-2").expect("planned region");
    assert_eq!(
        env.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["AWS_REGION", "AWS_S3_BUCKET_MEDIA"]
    );
}

#[test]
fn global_resources_are_indexed_under_global_scope() {
    let plan = compile(&full_config()).expect("compile");
    let roles = plan.names_for(ResourceKind::ReplicationRole);
    assert_eq!(roles.len(), 1);
    assert_eq!(roles["global"], "reparaya-media-replication-test");
    assert_eq!(plan.count_in("global"), 3);
}

#[test]
fn compiled_plans_pass_integrity_checks() {
    let plan = compile(&full_config()).expect("compile");
    assert_eq!(plan.check_integrity(), Ok(()));
}

#[test]
fn edited_region_index_is_rejected_on_load() {
    let plan = compile(&full_config()).expect("compile");
    let mut value = serde_json::to_value(&plan).expect("serialize plan");
    value["region_index"]["storage_bucket"]["us-west-2"] =
        serde_json::Value::String("someone-elses-bucket".to_string());

    let err = serde_json::from_value::<Plan>(value).unwrap_err();
    assert!(
        err.to_string().contains("region_index does not match"),
        "{err}"
    );
}

#[test]
fn forward_dependency_is_rejected_on_load() {
    let plan = compile(&full_config()).expect("compile");
    let mut value = serde_json::to_value(&plan).expect("serialize plan");
    value["declarations"][0]["depends_on"] = serde_json::json!([5]);

    let err = serde_json::from_value::<Plan>(value).unwrap_err();
    assert!(err.to_string().contains("#0 depends on #5"), "{err}");
}

#[test]
fn dropped_replication_wiring_is_rejected_on_load() {
    let plan = compile(&full_config()).expect("compile");
    let mut value = serde_json::to_value(&plan).expect("serialize plan");
    value
        .as_object_mut()
        .expect("plan object")
        .remove("crr");

    let err = serde_json::from_value::<Plan>(value).unwrap_err();
    assert!(err.to_string().contains("replication wiring"), "{err}");
}
