use schemars::schema_for;
use topoforge_core::Configuration;

#[test]
fn schema_lists_runtime_variables() {
    let schema = serde_json::to_value(schema_for!(Configuration)).expect("serialize schema");
    let properties = schema["properties"].as_object().expect("properties object");

    for field in [
        "project_name",
        "environment",
        "regions",
        "ses_sender_email",
        "enable_ses",
        "enable_location_service",
        "enable_crr",
        "primary_region",
        "replica_region",
        "region_overrides",
    ] {
        assert!(properties.contains_key(field), "missing property {field}");
    }

    let required: Vec<&str> = schema["required"]
        .as_array()
        .expect("required array")
        .iter()
        .filter_map(|value| value.as_str())
        .collect();
    assert_eq!(required, vec!["environment", "project_name", "regions"]);
    assert_eq!(schema["additionalProperties"], serde_json::Value::Bool(false));
}
