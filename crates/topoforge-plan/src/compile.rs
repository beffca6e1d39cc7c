use std::collections::BTreeMap;

use rayon::prelude::*;
use topoforge_core::{Configuration, ConfigurationError, ResourceKind};
use tracing::{debug, info};

use crate::model::{CrrWiring, DeclarationId, Plan, ResourceDeclaration};
use crate::region::{RegionFragment, plan_region};
use crate::replication::{BucketAnchor, ReplicationWiring, wire};

/// Compile a configuration into a plan.
///
/// The configuration is validated first; on error nothing is planned.
/// Regions are planned in parallel and reassembled in configured order, so
/// the result does not depend on scheduling.
pub fn compile(config: &Configuration) -> Result<Plan, ConfigurationError> {
    config.validate()?;

    let naming = config.naming();
    let fragments: Vec<RegionFragment> = config
        .regions
        .par_iter()
        .map(|region| {
            let fragment = plan_region(region, &naming, config.features_for(region));
            debug!(region = %region, declarations = fragment.len(), "planned region");
            fragment
        })
        .collect();

    let mut builder = PlanBuilder::default();
    for fragment in fragments {
        builder.absorb_region(fragment);
    }

    let crr = match config.replication_pair() {
        Some((primary, replica)) => {
            let wiring = wire(
                &builder.anchors,
                &naming,
                primary,
                replica,
                builder.next_id(),
            )?;
            Some(builder.absorb_replication(primary, replica, wiring))
        }
        None => None,
    };

    let plan = builder.finish(config.regions.clone(), crr);
    info!(
        project = %config.project_name,
        environment = %config.environment,
        regions = plan.regions().len(),
        declarations = plan.resource_count(),
        crr = plan.crr().is_some(),
        "compiled topology"
    );
    Ok(plan)
}

#[derive(Default)]
struct PlanBuilder {
    declarations: Vec<ResourceDeclaration>,
    region_index: BTreeMap<ResourceKind, BTreeMap<String, String>>,
    anchors: BTreeMap<String, BucketAnchor>,
}

impl PlanBuilder {
    fn next_id(&self) -> DeclarationId {
        DeclarationId(self.declarations.len())
    }

    fn absorb_region(&mut self, fragment: RegionFragment) {
        let base = self.declarations.len();
        let anchor = BucketAnchor {
            bucket: fragment.bucket.offset(base),
            versioning: fragment.versioning.offset(base),
            bucket_name: fragment
                .declarations
                .get(fragment.bucket.index())
                .map(|decl| decl.name.clone())
                .unwrap_or_default(),
        };
        self.anchors.insert(fragment.region, anchor);

        for mut decl in fragment.declarations {
            decl.depends_on = decl
                .depends_on
                .into_iter()
                .map(|id| id.offset(base))
                .collect();
            self.push(decl);
        }
    }

    fn absorb_replication(
        &mut self,
        primary: &str,
        replica: &str,
        wiring: ReplicationWiring,
    ) -> CrrWiring {
        for decl in wiring.declarations {
            self.push(decl);
        }
        CrrWiring {
            primary: primary.to_string(),
            replica: replica.to_string(),
            edges: wiring.edges,
        }
    }

    fn push(&mut self, decl: ResourceDeclaration) {
        self.region_index
            .entry(decl.kind)
            .or_default()
            .insert(decl.region.clone(), decl.name.clone());
        self.declarations.push(decl);
    }

    fn finish(self, regions: Vec<String>, crr: Option<CrrWiring>) -> Plan {
        Plan::new(regions, self.declarations, self.region_index, crr)
    }
}
