use std::collections::BTreeMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};
use crate::naming::NamingContext;
use crate::validation::validate_configuration;

/// Declarative input of one compilation.
///
/// Field names match the variables the surrounding IaC runtime passes in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Project prefix used in every resource name.
    pub project_name: String,
    /// Deployment environment (e.g. `dev`, `prod`).
    pub environment: String,
    /// Target regions, in the order their resources are declared.
    pub regions: Vec<String>,
    /// Verified sender address for SES.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ses_sender_email: Option<String>,
    #[serde(default)]
    pub enable_ses: bool,
    #[serde(default)]
    pub enable_location_service: bool,
    /// Cross-region replication of the media bucket.
    #[serde(default)]
    pub enable_crr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_region: Option<String>,
    /// Per-region replacements for the global feature toggles.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub region_overrides: BTreeMap<String, FeatureOverride>,
}

/// Optional per-region feature toggles; `None` keeps the global value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FeatureOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ses: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_location_service: Option<bool>,
}

/// Effective feature set of a single region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionFeatures {
    pub ses: bool,
    pub location: bool,
}

impl Configuration {
    /// Minimal configuration with every feature disabled.
    pub fn new<I, S>(project_name: impl Into<String>, environment: impl Into<String>, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            project_name: project_name.into(),
            environment: environment.into(),
            regions: regions.into_iter().map(Into::into).collect(),
            ses_sender_email: None,
            enable_ses: false,
            enable_location_service: false,
            enable_crr: false,
            primary_region: None,
            replica_region: None,
            region_overrides: BTreeMap::new(),
        }
    }

    pub fn with_ses(mut self, sender_email: impl Into<String>) -> Self {
        self.enable_ses = true;
        self.ses_sender_email = Some(sender_email.into());
        self
    }

    pub fn with_location_service(mut self) -> Self {
        self.enable_location_service = true;
        self
    }

    pub fn with_replication(
        mut self,
        primary_region: impl Into<String>,
        replica_region: impl Into<String>,
    ) -> Self {
        self.enable_crr = true;
        self.primary_region = Some(primary_region.into());
        self.replica_region = Some(replica_region.into());
        self
    }

    pub fn with_override(mut self, region: impl Into<String>, features: FeatureOverride) -> Self {
        self.region_overrides.insert(region.into(), features);
        self
    }

    /// Feature set that applies to `region` after overrides.
    pub fn features_for(&self, region: &str) -> RegionFeatures {
        let overrides = self.region_overrides.get(region);
        RegionFeatures {
            ses: overrides
                .and_then(|o| o.enable_ses)
                .unwrap_or(self.enable_ses),
            location: overrides
                .and_then(|o| o.enable_location_service)
                .unwrap_or(self.enable_location_service),
        }
    }

    /// True when at least one configured region declares SES resources.
    pub fn uses_ses(&self) -> bool {
        self.regions.iter().any(|region| self.features_for(region).ses)
    }

    /// Primary and replica regions, when replication is enabled and both are set.
    pub fn replication_pair(&self) -> Option<(&str, &str)> {
        if !self.enable_crr {
            return None;
        }
        match (&self.primary_region, &self.replica_region) {
            (Some(primary), Some(replica)) => Some((primary.as_str(), replica.as_str())),
            _ => None,
        }
    }

    pub fn naming(&self) -> NamingContext {
        NamingContext::new(&self.project_name, &self.environment)
            .with_sender_email(self.ses_sender_email.clone())
    }

    /// Fail-fast validation; returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        validate_configuration(self)
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, LoadError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> std::result::Result<Self, LoadError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a configuration file, picking the format from its extension.
    pub fn load(path: &Path) -> std::result::Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(LoadError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
