use std::collections::{BTreeMap, BTreeSet};

use topoforge_core::{ConfigurationError, GLOBAL_SCOPE, NamingContext, ResourceKind};

use crate::model::{DeclarationId, DependencyEdge, ResourceDeclaration};

/// Plan-level ids of the bucket resources replication attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketAnchor {
    pub bucket: DeclarationId,
    pub versioning: DeclarationId,
    pub bucket_name: String,
}

/// Declarations and edges added by cross-region replication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationWiring {
    /// Role, policy, attachment and replication configuration, in that order.
    pub declarations: Vec<ResourceDeclaration>,
    pub edges: Vec<DependencyEdge>,
}

/// Wire replication from `primary` to `replica`.
///
/// `anchors` maps every planned region to its bucket ids; the new
/// declarations are numbered from `first_id`. Fails without producing
/// anything when either endpoint has no anchor.
pub fn wire(
    anchors: &BTreeMap<String, BucketAnchor>,
    naming: &NamingContext,
    primary: &str,
    replica: &str,
    first_id: DeclarationId,
) -> Result<ReplicationWiring, ConfigurationError> {
    let source = anchor_for(anchors, "primary_region", primary)?;
    let destination = anchor_for(anchors, "replica_region", replica)?;
    if primary == replica {
        return Err(ConfigurationError::SameReplicationRegions {
            region: primary.to_string(),
        });
    }

    let mut wiring = WiringBuilder {
        next: first_id,
        declarations: Vec::with_capacity(4),
        edges: Vec::new(),
    };

    let role_name = naming.global_name(ResourceKind::ReplicationRole);
    let policy_name = naming.global_name(ResourceKind::ReplicationPolicy);

    let role = wiring.declare(
        ResourceKind::ReplicationRole,
        GLOBAL_SCOPE,
        naming,
        [source.bucket],
        [("trusted_service", "s3.amazonaws.com".to_string())],
    );
    let policy = wiring.declare(
        ResourceKind::ReplicationPolicy,
        GLOBAL_SCOPE,
        naming,
        [source.bucket, destination.bucket],
        [
            ("source_bucket", source.bucket_name.clone()),
            ("destination_bucket", destination.bucket_name.clone()),
        ],
    );
    let attachment = wiring.declare(
        ResourceKind::ReplicationAttachment,
        GLOBAL_SCOPE,
        naming,
        [role, policy],
        [("role", role_name.clone()), ("policy", policy_name)],
    );
    wiring.declare(
        ResourceKind::ReplicationConfig,
        primary,
        naming,
        [
            source.bucket,
            destination.bucket,
            source.versioning,
            destination.versioning,
            role,
            attachment,
        ],
        [
            ("source_bucket", source.bucket_name.clone()),
            ("destination_bucket", destination.bucket_name.clone()),
            ("destination_region", replica.to_string()),
            ("role", role_name),
        ],
    );

    Ok(ReplicationWiring {
        declarations: wiring.declarations,
        edges: wiring.edges,
    })
}

fn anchor_for<'a>(
    anchors: &'a BTreeMap<String, BucketAnchor>,
    field: &'static str,
    region: &str,
) -> Result<&'a BucketAnchor, ConfigurationError> {
    anchors
        .get(region)
        .ok_or_else(|| ConfigurationError::UnknownReplicationRegion {
            field,
            region: region.to_string(),
        })
}

struct WiringBuilder {
    next: DeclarationId,
    declarations: Vec<ResourceDeclaration>,
    edges: Vec<DependencyEdge>,
}

impl WiringBuilder {
    fn declare<D, A>(
        &mut self,
        kind: ResourceKind,
        region: &str,
        naming: &NamingContext,
        depends_on: D,
        attributes: A,
    ) -> DeclarationId
    where
        D: IntoIterator<Item = DeclarationId>,
        A: IntoIterator<Item = (&'static str, String)>,
    {
        let id = self.next;
        let depends_on: BTreeSet<DeclarationId> = depends_on.into_iter().collect();
        self.edges
            .extend(depends_on.iter().map(|to| DependencyEdge { from: id, to: *to }));
        self.declarations.push(ResourceDeclaration {
            kind,
            region: region.to_string(),
            name: naming.name(kind, region),
            depends_on,
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        });
        self.next = DeclarationId(id.index() + 1);
        id
    }
}
