use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::Configuration;
use crate::error::{ConfigurationError, Result};
use crate::kind::ResourceKind;
use crate::naming::{GLOBAL_SCOPE, canonical_name};

/// Longest bucket name the storage provider accepts.
pub const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate a configuration before compilation, stopping at the first error.
pub fn validate_configuration(config: &Configuration) -> Result<()> {
    match configuration_errors(config).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Collect every problem in a configuration.
///
/// This checks:
/// - region list is non-empty, well-formed and free of duplicates
/// - project and environment are usable name segments
/// - derived bucket names stay within provider limits
/// - overrides only target configured regions
/// - a sender address, when SES uses one, is plausible
/// - replication endpoints are set, configured and distinct
pub fn configuration_errors(config: &Configuration) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();

    if config.regions.is_empty() {
        errors.push(ConfigurationError::EmptyRegions);
    }

    let mut seen = BTreeSet::new();
    for region in &config.regions {
        if let Err(reason) = check_region(region) {
            errors.push(ConfigurationError::InvalidRegion {
                region: region.clone(),
                reason,
            });
            continue;
        }
        if !seen.insert(region.as_str()) {
            errors.push(ConfigurationError::DuplicateRegion {
                region: region.clone(),
            });
        }
    }

    let project_ok = push_label_error(&mut errors, "project_name", &config.project_name);
    let environment_ok = push_label_error(&mut errors, "environment", &config.environment);

    if project_ok && environment_ok {
        for region in &seen {
            let bucket = canonical_name(
                ResourceKind::StorageBucket,
                &config.project_name,
                &config.environment,
                region,
            );
            if bucket.len() > MAX_BUCKET_NAME_LEN {
                errors.push(ConfigurationError::InvalidName {
                    field: "project_name",
                    value: config.project_name.clone(),
                    reason: format!(
                        "bucket name '{bucket}' for region '{region}' has {} characters, the limit is {MAX_BUCKET_NAME_LEN}",
                        bucket.len()
                    ),
                });
            }
        }
    }

    for region in config.region_overrides.keys() {
        if !seen.contains(region.as_str()) {
            errors.push(ConfigurationError::UnknownOverrideRegion {
                region: region.clone(),
            });
        }
    }

    if config.uses_ses()
        && let Some(sender) = config.ses_sender_email.as_deref()
        && !is_plausible_email(sender)
    {
        errors.push(ConfigurationError::InvalidSenderEmail {
            value: sender.to_string(),
        });
    }

    if config.enable_crr {
        check_replication(config, &seen, &mut errors);
    }

    errors
}

fn check_replication(
    config: &Configuration,
    regions: &BTreeSet<&str>,
    errors: &mut Vec<ConfigurationError>,
) {
    let endpoints = [
        ("primary_region", config.primary_region.as_deref()),
        ("replica_region", config.replica_region.as_deref()),
    ];

    let mut resolved = Vec::with_capacity(2);
    for (field, value) in endpoints {
        match value {
            None => errors.push(ConfigurationError::MissingReplicationRegion { field }),
            Some(region) if !regions.contains(region) => {
                errors.push(ConfigurationError::UnknownReplicationRegion {
                    field,
                    region: region.to_string(),
                })
            }
            Some(region) => resolved.push(region),
        }
    }

    if let [primary, replica] = resolved.as_slice()
        && primary == replica
    {
        errors.push(ConfigurationError::SameReplicationRegions {
            region: primary.to_string(),
        });
    }
}

fn push_label_error(errors: &mut Vec<ConfigurationError>, field: &'static str, value: &str) -> bool {
    match check_label(value) {
        Ok(()) => true,
        Err(reason) => {
            errors.push(ConfigurationError::InvalidName {
                field,
                value: value.to_string(),
                reason,
            });
            false
        }
    }
}

fn check_region(region: &str) -> std::result::Result<(), String> {
    check_label(region)?;
    if region == GLOBAL_SCOPE {
        return Err(format!("'{GLOBAL_SCOPE}' is reserved for region-less resources"));
    }
    Ok(())
}

/// Name segments must survive inside bucket names unchanged.
fn check_label(value: &str) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if !matches_pattern(&LABEL_CHARS, r"^[a-z0-9-]+$", value) {
        return Err("only lowercase letters, digits and '-' are allowed".to_string());
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Err("must not start or end with '-'".to_string());
    }
    Ok(())
}

fn is_plausible_email(value: &str) -> bool {
    matches_pattern(
        &SENDER_ADDRESS,
        r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$",
        value,
    )
}

static LABEL_CHARS: OnceLock<Option<Regex>> = OnceLock::new();
static SENDER_ADDRESS: OnceLock<Option<Regex>> = OnceLock::new();

fn matches_pattern(cell: &OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Configuration {
        Configuration::new("reparaya", "test", ["us-west-2", "eu-central-1"])
    }

    #[test]
    fn accepts_minimal_configuration() {
        assert_eq!(validate_configuration(&base()), Ok(()));
    }

    #[test]
    fn rejects_empty_regions() {
        let config = Configuration::new("reparaya", "test", Vec::<String>::new());
        assert_eq!(
            validate_configuration(&config),
            Err(ConfigurationError::EmptyRegions)
        );
    }

    #[test]
    fn rejects_duplicate_regions() {
        let config = Configuration::new("reparaya", "test", ["us-west-2", "us-west-2"]);
        assert_eq!(
            validate_configuration(&config),
            Err(ConfigurationError::DuplicateRegion {
                region: "us-west-2".to_string()
            })
        );
    }

    #[test]
    fn rejects_reserved_and_malformed_regions() {
        let config = Configuration::new("reparaya", "test", ["global", "US-WEST-2"]);
        let errors = configuration_errors(&config);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|err| err.code() == "invalid_region"));
    }

    #[test]
    fn rejects_primary_outside_regions() {
        let config = base().with_replication("ap-southeast-1", "eu-central-1");
        let err = validate_configuration(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownReplicationRegion {
                field: "primary_region",
                region: "ap-southeast-1".to_string()
            }
        );
        assert_eq!(err.field(), "primary_region");
        assert_eq!(err.region(), Some("ap-southeast-1"));
    }

    #[test]
    fn rejects_identical_replication_endpoints() {
        let config = base().with_replication("us-west-2", "us-west-2");
        assert_eq!(
            validate_configuration(&config),
            Err(ConfigurationError::SameReplicationRegions {
                region: "us-west-2".to_string()
            })
        );
    }

    #[test]
    fn rejects_missing_replica() {
        let mut config = base().with_replication("us-west-2", "eu-central-1");
        config.replica_region = None;
        assert_eq!(
            validate_configuration(&config),
            Err(ConfigurationError::MissingReplicationRegion {
                field: "replica_region"
            })
        );
    }

    #[test]
    fn ignores_replication_fields_when_disabled() {
        let mut config = base().with_replication("nowhere-1", "us-west-2");
        config.enable_crr = false;
        assert_eq!(validate_configuration(&config), Ok(()));
    }

    #[test]
    fn ses_sender_is_optional_but_must_be_plausible() {
        let mut config = base().with_ses("noreply@example.com");
        assert_eq!(validate_configuration(&config), Ok(()));

        config.ses_sender_email = None;
        assert_eq!(validate_configuration(&config), Ok(()));

        for bad in ["not-an-address", "", "a@b@c.io", "no reply@example.com"] {
            config.ses_sender_email = Some(bad.to_string());
            assert_eq!(
                validate_configuration(&config),
                Err(ConfigurationError::InvalidSenderEmail {
                    value: bad.to_string()
                }),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn accepts_ordinary_sender_addresses() {
        for good in ["noreply@reparaya.mx", "test@example.com", "ops+ses@mail.example.co.uk"] {
            assert!(is_plausible_email(good), "{good}");
        }
        assert!(!is_plausible_email("noreply@localhost"));
        assert!(!is_plausible_email("noreply@example."));
    }

    #[test]
    fn unused_sender_is_not_checked() {
        let mut config = base();
        config.ses_sender_email = Some("not-an-address".to_string());
        assert_eq!(validate_configuration(&config), Ok(()));
    }

    #[test]
    fn labels_follow_name_segment_rules() {
        assert!(check_label("reparaya-test").is_ok());
        assert!(check_label("eu-central-1").is_ok());
        assert!(check_label("").is_err());
        assert!(check_label("Reparaya").is_err());
        assert!(check_label("re_paraya").is_err());
        assert!(check_label("-reparaya").is_err());
        assert!(check_label("reparaya-").is_err());
    }

    #[test]
    fn rejects_overlong_bucket_names() {
        let config = Configuration::new("a".repeat(50), "test", ["ap-southeast-1"]);
        let err = validate_configuration(&config).unwrap_err();
        assert_eq!(err.code(), "invalid_name");
        assert_eq!(err.field(), "project_name");
    }

    #[test]
    fn rejects_override_for_unknown_region() {
        let config = base().with_override("sa-east-1", Default::default());
        assert_eq!(
            validate_configuration(&config),
            Err(ConfigurationError::UnknownOverrideRegion {
                region: "sa-east-1".to_string()
            })
        );
    }
}
