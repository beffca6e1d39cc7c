//! Multi-region topology compiler.
//!
//! Turns a [`Configuration`](topoforge_core::Configuration) into an immutable
//! [`Plan`]: per-region resource declarations, cross-region replication
//! wiring and the region-indexed outputs consumed by provisioning tooling.

pub mod compile;
pub mod errors;
pub mod model;
pub mod outputs;
pub mod region;
pub mod replication;
pub mod report;
pub mod schema;
pub mod validate;

pub use compile::compile;
pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use model::{
    CrrWiring, DeclarationId, DependencyEdge, Plan, PlanIntegrityError, ResourceDeclaration,
};
pub use outputs::{PlanOutputs, env_exports};
pub use region::{RegionFragment, plan_region};
pub use replication::{BucketAnchor, ReplicationWiring, wire};
pub use report::render_plan_summary;
pub use schema::{
    configuration_json_schema, configuration_schema_value, outputs_json_schema, plan_json_schema,
};
pub use validate::{
    ValidatedConfiguration, validate_configuration_document, validate_configuration_json,
    validate_configuration_report,
};
