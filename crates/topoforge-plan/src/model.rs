use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, de};
use sha2::{Digest, Sha256};
use thiserror::Error;
use topoforge_core::{GLOBAL_SCOPE, ResourceKind, build_graph_report};

use crate::outputs::{PlanOutputs, env_exports};

/// Index of a declaration inside the plan that owns it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DeclarationId(pub usize);

impl DeclarationId {
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn offset(self, base: usize) -> Self {
        Self(self.0 + base)
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single resource to be provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceDeclaration {
    pub kind: ResourceKind,
    /// Region identifier, or `global` for region-less resources.
    pub region: String,
    pub name: String,
    /// Declarations that must exist before this one.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<DeclarationId>,
    /// Names of other resources this declaration points at.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl ResourceDeclaration {
    /// Address unique within a plan, e.g. `storage_bucket.us-west-2`.
    pub fn address(&self) -> String {
        format!("{}.{}", self.kind, self.region)
    }

    pub fn is_global(&self) -> bool {
        self.region == GLOBAL_SCOPE
    }
}

/// Directed dependency: `from` must be created after `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyEdge {
    pub from: DeclarationId,
    pub to: DeclarationId,
}

/// Cross-region replication wiring recorded in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CrrWiring {
    pub primary: String,
    pub replica: String,
    /// Every edge introduced by the replication declarations.
    pub edges: Vec<DependencyEdge>,
}

/// Compiled, immutable resource plan.
///
/// A plan read back from JSON is checked against the rules `compile` upholds:
/// dependencies point inside the arena, addresses are unique, the region
/// index mirrors the declarations and replication wiring matches its
/// declarations. Counts and names are not re-derived from a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Plan {
    plan_version: String,
    regions: Vec<String>,
    declarations: Vec<ResourceDeclaration>,
    /// `region_index[kind][region] = name`.
    region_index: BTreeMap<ResourceKind, BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crr: Option<CrrWiring>,
}

/// A serialized plan that contradicts itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanIntegrityError {
    #[error("{declaration} depends on {dependency}, which is not an earlier declaration")]
    InvalidDependency {
        declaration: DeclarationId,
        dependency: DeclarationId,
    },
    #[error("address '{0}' is declared more than once")]
    DuplicateAddress(String),
    #[error("{declaration} is placed in region '{region}', which the plan does not cover")]
    UnknownRegion {
        declaration: DeclarationId,
        region: String,
    },
    #[error("region_index does not match the declarations")]
    IndexMismatch,
    #[error("replication wiring does not match the declarations")]
    ReplicationMismatch,
}

#[derive(Deserialize)]
struct PlanDocument {
    plan_version: String,
    regions: Vec<String>,
    declarations: Vec<ResourceDeclaration>,
    region_index: BTreeMap<ResourceKind, BTreeMap<String, String>>,
    #[serde(default)]
    crr: Option<CrrWiring>,
}

impl<'de> Deserialize<'de> for Plan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let doc = PlanDocument::deserialize(deserializer)?;
        let plan = Plan {
            plan_version: doc.plan_version,
            regions: doc.regions,
            declarations: doc.declarations,
            region_index: doc.region_index,
            crr: doc.crr,
        };
        plan.check_integrity().map_err(de::Error::custom)?;
        Ok(plan)
    }
}

impl Plan {
    pub(crate) fn new(
        regions: Vec<String>,
        declarations: Vec<ResourceDeclaration>,
        region_index: BTreeMap<ResourceKind, BTreeMap<String, String>>,
        crr: Option<CrrWiring>,
    ) -> Self {
        Self {
            plan_version: topoforge_core::PLAN_VERSION.to_string(),
            regions,
            declarations,
            region_index,
            crr,
        }
    }

    pub fn plan_version(&self) -> &str {
        &self.plan_version
    }

    /// Configured regions in declaration order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn declarations(&self) -> &[ResourceDeclaration] {
        &self.declarations
    }

    pub fn region_index(&self) -> &BTreeMap<ResourceKind, BTreeMap<String, String>> {
        &self.region_index
    }

    pub fn crr(&self) -> Option<&CrrWiring> {
        self.crr.as_ref()
    }

    /// Number of resources the plan adds.
    pub fn resource_count(&self) -> usize {
        self.declarations.len()
    }

    pub fn get(&self, id: DeclarationId) -> Option<&ResourceDeclaration> {
        self.declarations.get(id.index())
    }

    /// Locate the declaration of `kind` in `region` (`global` for global kinds).
    pub fn find(&self, kind: ResourceKind, region: &str) -> Option<DeclarationId> {
        self.declarations
            .iter()
            .position(|decl| decl.kind == kind && decl.region == region)
            .map(DeclarationId)
    }

    /// Region -> name map for one resource kind; empty when the kind is not planned.
    pub fn names_for(&self, kind: ResourceKind) -> BTreeMap<String, String> {
        self.region_index.get(&kind).cloned().unwrap_or_default()
    }

    /// Number of declarations placed in `region`.
    pub fn count_in(&self, region: &str) -> usize {
        self.declarations
            .iter()
            .filter(|decl| decl.region == region)
            .count()
    }

    pub fn outputs(&self) -> PlanOutputs {
        PlanOutputs::from_plan(self)
    }

    /// Application environment for `region`, or `None` if it is not planned.
    pub fn env_exports(&self, region: &str) -> Option<BTreeMap<String, String>> {
        env_exports(self, region)
    }

    /// Creation order honouring every `depends_on` edge.
    ///
    /// On failure returns the declarations that could not be ordered.
    pub fn apply_order(&self) -> Result<Vec<DeclarationId>, Vec<DeclarationId>> {
        let deps: Vec<BTreeSet<usize>> = self
            .declarations
            .iter()
            .map(|decl| decl.depends_on.iter().map(|id| id.index()).collect())
            .collect();
        let report = build_graph_report(&deps);

        let mut unresolved: Vec<DeclarationId> = report
            .dangling
            .iter()
            .map(|(node, _)| DeclarationId(*node))
            .collect();
        match (report.topo_order, report.cycle) {
            (Some(order), _) if unresolved.is_empty() => {
                Ok(order.into_iter().map(DeclarationId).collect())
            }
            (_, cycle) => {
                unresolved.extend(cycle.unwrap_or_default().into_iter().map(DeclarationId));
                unresolved.sort();
                unresolved.dedup();
                Err(unresolved)
            }
        }
    }

    /// Check the structural rules a compiled plan always satisfies.
    pub fn check_integrity(&self) -> Result<(), PlanIntegrityError> {
        let mut addresses = BTreeSet::new();
        let mut index: BTreeMap<ResourceKind, BTreeMap<String, String>> = BTreeMap::new();

        for (idx, decl) in self.declarations.iter().enumerate() {
            let id = DeclarationId(idx);
            if let Some(dep) = decl.depends_on.iter().find(|dep| dep.index() >= idx) {
                return Err(PlanIntegrityError::InvalidDependency {
                    declaration: id,
                    dependency: *dep,
                });
            }
            if !decl.is_global() && !self.regions.contains(&decl.region) {
                return Err(PlanIntegrityError::UnknownRegion {
                    declaration: id,
                    region: decl.region.clone(),
                });
            }
            let address = decl.address();
            if !addresses.insert(address.clone()) {
                return Err(PlanIntegrityError::DuplicateAddress(address));
            }
            index
                .entry(decl.kind)
                .or_default()
                .insert(decl.region.clone(), decl.name.clone());
        }

        if index != self.region_index {
            return Err(PlanIntegrityError::IndexMismatch);
        }

        let replicated = self
            .declarations
            .iter()
            .find(|decl| decl.kind == ResourceKind::ReplicationConfig);
        match (&self.crr, replicated) {
            (None, None) => Ok(()),
            (Some(crr), Some(decl))
                if decl.region == crr.primary
                    && self.regions.contains(&crr.replica)
                    && crr.edges.iter().all(|edge| {
                        edge.from.index() < self.declarations.len()
                            && edge.to.index() < self.declarations.len()
                    }) =>
            {
                Ok(())
            }
            _ => Err(PlanIntegrityError::ReplicationMismatch),
        }
    }

    /// Hex SHA-256 of the canonical JSON encoding.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
