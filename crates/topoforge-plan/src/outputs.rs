use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use topoforge_core::ResourceKind;

use crate::model::Plan;

/// Region-indexed values handed to downstream tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlanOutputs {
    pub resource_count: usize,
    pub s3_bucket_names: BTreeMap<String, String>,
    pub location_place_index_names: BTreeMap<String, String>,
    pub location_route_calculator_names: BTreeMap<String, String>,
    pub ses_configuration_set_names: BTreeMap<String, String>,
    pub access_policy_names: BTreeMap<String, String>,
    pub crr_enabled: bool,
    pub crr_primary_region: Option<String>,
    pub crr_replica_region: Option<String>,
}

impl PlanOutputs {
    pub fn from_plan(plan: &Plan) -> Self {
        let crr = plan.crr();
        Self {
            resource_count: plan.resource_count(),
            s3_bucket_names: plan.names_for(ResourceKind::StorageBucket),
            location_place_index_names: plan.names_for(ResourceKind::GeoPlaceIndex),
            location_route_calculator_names: plan.names_for(ResourceKind::GeoRouteCalculator),
            ses_configuration_set_names: plan.names_for(ResourceKind::EmailConfigSet),
            access_policy_names: plan.names_for(ResourceKind::AccessPolicy),
            crr_enabled: crr.is_some(),
            crr_primary_region: crr.map(|wiring| wiring.primary.clone()),
            crr_replica_region: crr.map(|wiring| wiring.replica.clone()),
        }
    }
}

/// Environment variable -> resource kind read by the application.
const ENV_BINDINGS: [(&str, ResourceKind); 4] = [
    ("AWS_S3_BUCKET_MEDIA", ResourceKind::StorageBucket),
    ("AWS_LOCATION_PLACE_INDEX", ResourceKind::GeoPlaceIndex),
    ("AWS_LOCATION_ROUTE_CALCULATOR", ResourceKind::GeoRouteCalculator),
    ("AWS_SES_CONFIGURATION_SET", ResourceKind::EmailConfigSet),
];

/// Environment an application deployed to `region` needs to reach its resources.
///
/// Only kinds planned in that region are exported. `SES_SENDER_EMAIL` is
/// set only when the email identity was declared for a configured sender.
pub fn env_exports(plan: &Plan, region: &str) -> Option<BTreeMap<String, String>> {
    if !plan.regions().iter().any(|planned| planned == region) {
        return None;
    }

    let index = plan.region_index();
    let mut env = BTreeMap::new();
    env.insert("AWS_REGION".to_string(), region.to_string());
    for (var, kind) in ENV_BINDINGS {
        if let Some(name) = index.get(&kind).and_then(|names| names.get(region)) {
            env.insert(var.to_string(), name.clone());
        }
    }
    if let Some(sender) = plan
        .find(ResourceKind::EmailIdentity, region)
        .and_then(|id| plan.get(id))
        .and_then(|identity| identity.attributes.get("sender_address"))
    {
        env.insert("SES_SENDER_EMAIL".to_string(), sender.clone());
    }
    Some(env)
}
