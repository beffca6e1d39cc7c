use std::collections::{BTreeMap, BTreeSet};

use topoforge_core::{NamingContext, RegionFeatures, ResourceKind};

use crate::model::{DeclarationId, ResourceDeclaration};

/// Resources that always configure the media bucket.
const BUCKET_SETTINGS: [ResourceKind; 4] = [
    ResourceKind::StorageVersioning,
    ResourceKind::StorageCors,
    ResourceKind::StoragePublicAccessBlock,
    ResourceKind::StorageEncryption,
];

/// Declarations of a single region.
///
/// `depends_on` ids are local to `declarations` until the aggregator rebases
/// them into the plan arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFragment {
    pub region: String,
    pub declarations: Vec<ResourceDeclaration>,
    /// Local id of the media bucket.
    pub bucket: DeclarationId,
    /// Local id of the bucket versioning declaration.
    pub versioning: DeclarationId,
}

impl RegionFragment {
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.declarations.iter().map(|decl| decl.kind)
    }
}

/// Plan every resource of `region`.
///
/// The baseline is the media bucket, its four settings and the application
/// access policy; SES adds three declarations and the location service two.
pub fn plan_region(
    region: &str,
    naming: &NamingContext,
    features: RegionFeatures,
) -> RegionFragment {
    let mut builder = FragmentBuilder::new(region, naming);

    let bucket = builder.declare(ResourceKind::StorageBucket, []);
    let bucket_name = builder.name_of(bucket);
    let mut versioning = bucket;
    for kind in BUCKET_SETTINGS {
        let id = builder.declare_with(kind, [bucket], [("bucket", bucket_name.clone())]);
        if kind == ResourceKind::StorageVersioning {
            versioning = id;
        }
    }

    let mut policy_deps = vec![bucket];
    let mut policy_attrs = vec![("bucket", bucket_name)];

    if features.ses {
        let config_set = builder.declare(ResourceKind::EmailConfigSet, []);
        let config_set_name = builder.name_of(config_set);
        let mut identity_attrs = vec![("configuration_set", config_set_name.clone())];
        if let Some(sender) = &naming.sender_email {
            identity_attrs.push(("sender_address", sender.clone()));
        }
        let identity =
            builder.declare_with(ResourceKind::EmailIdentity, [config_set], identity_attrs);
        builder.declare_with(
            ResourceKind::EmailEventDestination,
            [config_set],
            [("configuration_set", config_set_name)],
        );
        policy_attrs.push(("email_identity", builder.name_of(identity)));
        policy_deps.push(identity);
    }

    if features.location {
        let places = builder.declare(ResourceKind::GeoPlaceIndex, []);
        let routes = builder.declare(ResourceKind::GeoRouteCalculator, []);
        policy_attrs.push(("place_index", builder.name_of(places)));
        policy_attrs.push(("route_calculator", builder.name_of(routes)));
        policy_deps.extend([places, routes]);
    }

    builder.declare_with(ResourceKind::AccessPolicy, policy_deps, policy_attrs);

    RegionFragment {
        region: region.to_string(),
        declarations: builder.declarations,
        bucket,
        versioning,
    }
}

struct FragmentBuilder<'a> {
    region: &'a str,
    naming: &'a NamingContext,
    declarations: Vec<ResourceDeclaration>,
}

impl<'a> FragmentBuilder<'a> {
    fn new(region: &'a str, naming: &'a NamingContext) -> Self {
        Self {
            region,
            naming,
            declarations: Vec::with_capacity(11),
        }
    }

    fn declare<D>(&mut self, kind: ResourceKind, depends_on: D) -> DeclarationId
    where
        D: IntoIterator<Item = DeclarationId>,
    {
        self.declare_with(kind, depends_on, Vec::<(&str, String)>::new())
    }

    fn declare_with<D, A>(&mut self, kind: ResourceKind, depends_on: D, attributes: A) -> DeclarationId
    where
        D: IntoIterator<Item = DeclarationId>,
        A: IntoIterator<Item = (&'static str, String)>,
    {
        let id = DeclarationId(self.declarations.len());
        self.declarations.push(ResourceDeclaration {
            kind,
            region: self.region.to_string(),
            name: self.naming.name(kind, self.region),
            depends_on: depends_on.into_iter().collect::<BTreeSet<_>>(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect::<BTreeMap<_, _>>(),
        });
        id
    }

    fn name_of(&self, id: DeclarationId) -> String {
        self.declarations
            .get(id.index())
            .map(|decl| decl.name.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naming() -> NamingContext {
        NamingContext::new("reparaya", "test")
            .with_sender_email(Some("test@example.com".to_string()))
    }

    #[test]
    fn baseline_has_six_declarations() {
        let fragment = plan_region("us-west-2", &naming(), RegionFeatures::default());
        let kinds: Vec<_> = fragment.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::StorageBucket,
                ResourceKind::StorageVersioning,
                ResourceKind::StorageCors,
                ResourceKind::StoragePublicAccessBlock,
                ResourceKind::StorageEncryption,
                ResourceKind::AccessPolicy,
            ]
        );
    }

    #[test]
    fn all_features_give_eleven_declarations() {
        let fragment = plan_region(
            "eu-central-1",
            &naming(),
            RegionFeatures {
                ses: true,
                location: true,
            },
        );
        assert_eq!(fragment.len(), 11);
        assert_eq!(
            fragment.declarations[fragment.bucket.index()].name,
            "reparaya-media-test-eu-central-1"
        );
        assert_eq!(
            fragment.declarations[fragment.versioning.index()].kind,
            ResourceKind::StorageVersioning
        );
    }

    #[test]
    fn feature_groups_add_independently() {
        let ses_only = plan_region(
            "us-west-2",
            &naming(),
            RegionFeatures {
                ses: true,
                location: false,
            },
        );
        let geo_only = plan_region(
            "us-west-2",
            &naming(),
            RegionFeatures {
                ses: false,
                location: true,
            },
        );
        assert_eq!(ses_only.len(), 9);
        assert_eq!(geo_only.len(), 8);
    }

    #[test]
    fn dependencies_point_backwards() {
        let fragment = plan_region(
            "us-west-2",
            &naming(),
            RegionFeatures {
                ses: true,
                location: true,
            },
        );
        for (idx, decl) in fragment.declarations.iter().enumerate() {
            for dep in &decl.depends_on {
                assert!(dep.index() < idx, "{} depends forward", decl.address());
            }
        }

        let policy = fragment
            .declarations
            .last()
            .expect("access policy declared last");
        assert_eq!(policy.kind, ResourceKind::AccessPolicy);
        assert_eq!(policy.depends_on.len(), 4);
        assert_eq!(
            policy.attributes.get("place_index").map(String::as_str),
            Some("reparaya-places-test-us-west-2")
        );
    }

    #[test]
    fn email_identity_is_named_after_sender() {
        let fragment = plan_region(
            "us-west-2",
            &naming(),
            RegionFeatures {
                ses: true,
                location: false,
            },
        );
        let identity = fragment
            .declarations
            .iter()
            .find(|decl| decl.kind == ResourceKind::EmailIdentity)
            .expect("identity declared");
        assert_eq!(identity.name, "test@example.com");
        assert_eq!(
            identity.attributes.get("sender_address").map(String::as_str),
            Some("test@example.com")
        );
        assert_eq!(
            identity.attributes.get("configuration_set").map(String::as_str),
            Some("reparaya-email-test-us-west-2")
        );
    }

    #[test]
    fn email_identity_falls_back_to_canonical_name() {
        let fragment = plan_region(
            "us-west-2",
            &NamingContext::new("reparaya", "test"),
            RegionFeatures {
                ses: true,
                location: false,
            },
        );
        assert_eq!(fragment.len(), 9);
        let identity = fragment
            .declarations
            .iter()
            .find(|decl| decl.kind == ResourceKind::EmailIdentity)
            .expect("identity declared");
        assert_eq!(identity.name, "reparaya-sender-test-us-west-2");
        assert!(!identity.attributes.contains_key("sender_address"));
    }
}
