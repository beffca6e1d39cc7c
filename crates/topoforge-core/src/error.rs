use thiserror::Error;

/// A configuration that cannot be compiled into a plan.
///
/// Every variant carries the offending field and, where relevant, the
/// offending region so the caller can fix the input without re-running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No regions were configured.
    #[error("regions: at least one region must be configured")]
    EmptyRegions,
    /// The same region appears more than once in `regions`.
    #[error("regions: duplicate region '{region}'")]
    DuplicateRegion { region: String },
    /// A region identifier is not usable in resource names.
    #[error("regions: invalid region '{region}': {reason}")]
    InvalidRegion { region: String, reason: String },
    /// A naming parameter produces names the provider would reject.
    #[error("{field}: invalid value '{value}': {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// Replication is enabled but one endpoint is not set.
    #[error("{field}: required when enable_crr is true")]
    MissingReplicationRegion { field: &'static str },
    /// A replication endpoint is not one of the configured regions.
    #[error("{field}: region '{region}' is not in the configured regions")]
    UnknownReplicationRegion { field: &'static str, region: String },
    /// Primary and replica point at the same region.
    #[error("replica_region: must differ from primary_region (both are '{region}')")]
    SameReplicationRegions { region: String },
    /// The sender address is not a plausible email address.
    #[error("ses_sender_email: invalid address '{value}'")]
    InvalidSenderEmail { value: String },
    /// A per-region override targets a region that is not configured.
    #[error("region_overrides: region '{region}' is not in the configured regions")]
    UnknownOverrideRegion { region: String },
}

impl ConfigurationError {
    /// Name of the configuration field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyRegions | Self::DuplicateRegion { .. } | Self::InvalidRegion { .. } => {
                "regions"
            }
            Self::InvalidName { field, .. }
            | Self::MissingReplicationRegion { field }
            | Self::UnknownReplicationRegion { field, .. } => field,
            Self::SameReplicationRegions { .. } => "replica_region",
            Self::InvalidSenderEmail { .. } => "ses_sender_email",
            Self::UnknownOverrideRegion { .. } => "region_overrides",
        }
    }

    /// Region the error refers to, if any.
    pub fn region(&self) -> Option<&str> {
        match self {
            Self::DuplicateRegion { region }
            | Self::InvalidRegion { region, .. }
            | Self::UnknownReplicationRegion { region, .. }
            | Self::SameReplicationRegions { region }
            | Self::UnknownOverrideRegion { region } => Some(region),
            _ => None,
        }
    }

    /// Stable machine-readable code for reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyRegions => "regions_empty",
            Self::DuplicateRegion { .. } => "duplicate_region",
            Self::InvalidRegion { .. } => "invalid_region",
            Self::InvalidName { .. } => "invalid_name",
            Self::MissingReplicationRegion { .. } => "missing_replication_region",
            Self::UnknownReplicationRegion { .. } => "unknown_replication_region",
            Self::SameReplicationRegions { .. } => "same_replication_regions",
            Self::InvalidSenderEmail { .. } => "invalid_sender_email",
            Self::UnknownOverrideRegion { .. } => "unknown_override_region",
        }
    }
}

/// Failures while reading a configuration document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

/// Convenience alias for compiler results.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
