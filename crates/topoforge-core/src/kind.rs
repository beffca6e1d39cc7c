use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every resource the compiler knows how to declare.
///
/// The discriminant doubles as the row index into the naming table, so the
/// variant order here must match [`ResourceKind::ALL`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    StorageBucket,
    StorageVersioning,
    StorageCors,
    StoragePublicAccessBlock,
    StorageEncryption,
    EmailIdentity,
    EmailConfigSet,
    EmailEventDestination,
    GeoPlaceIndex,
    GeoRouteCalculator,
    AccessPolicy,
    ReplicationRole,
    ReplicationPolicy,
    ReplicationAttachment,
    ReplicationConfig,
}

/// Feature group a resource kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    /// Always declared for every region.
    Baseline,
    /// Declared when SES is enabled for the region.
    Email,
    /// Declared when the location service is enabled for the region.
    Geo,
    /// Declared once per plan when cross-region replication is enabled.
    Replication,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 15] = [
        ResourceKind::StorageBucket,
        ResourceKind::StorageVersioning,
        ResourceKind::StorageCors,
        ResourceKind::StoragePublicAccessBlock,
        ResourceKind::StorageEncryption,
        ResourceKind::EmailIdentity,
        ResourceKind::EmailConfigSet,
        ResourceKind::EmailEventDestination,
        ResourceKind::GeoPlaceIndex,
        ResourceKind::GeoRouteCalculator,
        ResourceKind::AccessPolicy,
        ResourceKind::ReplicationRole,
        ResourceKind::ReplicationPolicy,
        ResourceKind::ReplicationAttachment,
        ResourceKind::ReplicationConfig,
    ];

    /// Stable snake_case identifier, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        KIND_IDS[self as usize]
    }

    pub fn feature(self) -> FeatureGroup {
        match self {
            ResourceKind::StorageBucket
            | ResourceKind::StorageVersioning
            | ResourceKind::StorageCors
            | ResourceKind::StoragePublicAccessBlock
            | ResourceKind::StorageEncryption
            | ResourceKind::AccessPolicy => FeatureGroup::Baseline,
            ResourceKind::EmailIdentity
            | ResourceKind::EmailConfigSet
            | ResourceKind::EmailEventDestination => FeatureGroup::Email,
            ResourceKind::GeoPlaceIndex | ResourceKind::GeoRouteCalculator => FeatureGroup::Geo,
            ResourceKind::ReplicationRole
            | ResourceKind::ReplicationPolicy
            | ResourceKind::ReplicationAttachment
            | ResourceKind::ReplicationConfig => FeatureGroup::Replication,
        }
    }

    /// True for kinds that live outside any single region.
    pub fn is_global(self) -> bool {
        matches!(
            self,
            ResourceKind::ReplicationRole
                | ResourceKind::ReplicationPolicy
                | ResourceKind::ReplicationAttachment
        )
    }
}

const KIND_IDS: [&str; 15] = [
    "storage_bucket",
    "storage_versioning",
    "storage_cors",
    "storage_public_access_block",
    "storage_encryption",
    "email_identity",
    "email_config_set",
    "email_event_destination",
    "geo_place_index",
    "geo_route_calculator",
    "access_policy",
    "replication_role",
    "replication_policy",
    "replication_attachment",
    "replication_config",
];

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
