//! Core contracts and helpers for Topoforge.
//!
//! This crate defines the configuration model, resource kinds, canonical
//! naming and validation shared by the plan compiler and the CLI.

pub mod config;
pub mod error;
pub mod graph;
pub mod kind;
pub mod naming;
pub mod validation;

pub use config::{Configuration, FeatureOverride, RegionFeatures};
pub use error::{ConfigurationError, LoadError, Result};
pub use graph::{GraphReport, GraphSummary, build_graph_report};
pub use kind::{FeatureGroup, ResourceKind};
pub use naming::{GLOBAL_SCOPE, NameTemplate, NamingContext, canonical_name, template_for};
pub use validation::{MAX_BUCKET_NAME_LEN, configuration_errors, validate_configuration};

/// Current contract version for compiled `plan.json` artifacts.
pub const PLAN_VERSION: &str = "0.1";
