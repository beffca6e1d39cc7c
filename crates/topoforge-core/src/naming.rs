//! Canonical resource names.
//!
//! Names are a pure function of the naming parameters and are re-derived by
//! downstream tooling to detect drift, so the templates below are a wire
//! contract: `{project}-{segment}-{environment}-{region}` for regional
//! resources and `{project}-{segment}-{environment}` for global ones.

use crate::kind::ResourceKind;

/// Scope value used for resources that do not belong to a region.
pub const GLOBAL_SCOPE: &str = "global";

/// How a resource kind derives its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTemplate {
    /// `{project}-{segment}-{environment}-{region}`
    Regional(&'static str),
    /// `{project}-{segment}-{environment}`
    Global(&'static str),
    /// The configured sender address; falls back to the regional form with
    /// the given segment when no sender is known.
    SenderAddress(&'static str),
}

/// Naming table indexed by `ResourceKind as usize`.
const NAME_TEMPLATES: [NameTemplate; 15] = [
    NameTemplate::Regional("media"),
    NameTemplate::Regional("media"),
    NameTemplate::Regional("media"),
    NameTemplate::Regional("media"),
    NameTemplate::Regional("media"),
    NameTemplate::SenderAddress("sender"),
    NameTemplate::Regional("email"),
    NameTemplate::Regional("email-events"),
    NameTemplate::Regional("places"),
    NameTemplate::Regional("routes"),
    NameTemplate::Regional("app-access"),
    NameTemplate::Global("media-replication"),
    NameTemplate::Global("media-replication-policy"),
    NameTemplate::Global("media-replication-attachment"),
    NameTemplate::Regional("media-replication"),
];

/// Template used to name resources of `kind`.
pub fn template_for(kind: ResourceKind) -> NameTemplate {
    NAME_TEMPLATES[kind as usize]
}

/// Canonical name for `kind` from the raw naming parameters.
///
/// `region` is ignored for global kinds.
pub fn canonical_name(
    kind: ResourceKind,
    project: &str,
    environment: &str,
    region: &str,
) -> String {
    match template_for(kind) {
        NameTemplate::Regional(segment) | NameTemplate::SenderAddress(segment) => {
            format!("{project}-{segment}-{environment}-{region}")
        }
        NameTemplate::Global(segment) => format!("{project}-{segment}-{environment}"),
    }
}

/// Naming parameters shared by every declaration of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingContext {
    pub project: String,
    pub environment: String,
    pub sender_email: Option<String>,
}

impl NamingContext {
    pub fn new(project: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            environment: environment.into(),
            sender_email: None,
        }
    }

    pub fn with_sender_email(mut self, sender_email: Option<String>) -> Self {
        self.sender_email = sender_email;
        self
    }

    /// Name of `kind` in `region`.
    pub fn name(&self, kind: ResourceKind, region: &str) -> String {
        match (template_for(kind), self.sender_email.as_deref()) {
            (NameTemplate::SenderAddress(_), Some(sender)) => sender.to_string(),
            _ => canonical_name(kind, &self.project, &self.environment, region),
        }
    }

    /// Name of a kind that has no region.
    pub fn global_name(&self, kind: ResourceKind) -> String {
        self.name(kind, GLOBAL_SCOPE)
    }
}
