use schemars::schema::RootSchema;
use schemars::schema_for;
use serde_json::Value;
use topoforge_core::Configuration;

use crate::errors::Result;
use crate::model::Plan;
use crate::outputs::PlanOutputs;

/// Emit the JSON Schema for configuration documents.
pub fn configuration_json_schema() -> RootSchema {
    schema_for!(Configuration)
}

/// Configuration schema as a JSON value, ready for validation.
pub fn configuration_schema_value() -> Result<Value> {
    Ok(serde_json::to_value(configuration_json_schema())?)
}

/// Emit the JSON Schema for `plan.json`.
pub fn plan_json_schema() -> RootSchema {
    schema_for!(Plan)
}

/// Emit the JSON Schema for `outputs.json`.
pub fn outputs_json_schema() -> RootSchema {
    schema_for!(PlanOutputs)
}
