use jsonschema::JSONSchema;
use serde_json::Value;
use topoforge_core::{Configuration, ConfigurationError, configuration_errors};

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::schema::configuration_schema_value;

/// Configuration that passed validation, with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedConfiguration {
    pub configuration: Configuration,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a configuration JSON document against the configuration JSON Schema.
pub fn validate_configuration_json(
    config_json: &Value,
    config_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(config_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(config_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Collect every semantic problem in a parsed configuration.
pub fn validate_configuration_report(config: &Configuration) -> ValidationReport {
    let mut report = ValidationReport::default();

    for err in configuration_errors(config) {
        report.push_error(issue_from_error(config, &err));
    }

    if !config.enable_crr && (config.primary_region.is_some() || config.replica_region.is_some()) {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "crr_regions_ignored",
            "/enable_crr",
            "primary_region/replica_region are set but enable_crr is false",
            Some("set enable_crr=true or remove the replication regions".to_string()),
        ));
    }

    if config.uses_ses() && config.ses_sender_email.is_none() {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "sender_missing",
            "/ses_sender_email",
            "SES is enabled but no sender is set; email identities use their canonical names",
            Some("set ses_sender_email to the verified sender address".to_string()),
        ));
    }

    if config.ses_sender_email.is_some() && !config.uses_ses() {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "sender_email_unused",
            "/ses_sender_email",
            "ses_sender_email is set but SES is disabled in every region",
            None,
        ));
    }

    report
}

/// Validate a configuration document end-to-end, returning structured issues on failure.
pub fn validate_configuration_document(
    config_json: &Value,
) -> Result<ValidatedConfiguration, ValidationReport> {
    let structural = match configuration_schema_value()
        .and_then(|schema| validate_configuration_json(config_json, &schema))
    {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let configuration: Configuration = match serde_json::from_value(config_json.clone()) {
        Ok(configuration) => configuration,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_configuration_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let mut report = structural;
    report.merge(validate_configuration_report(&configuration));
    if !report.is_ok() {
        return Err(report);
    }

    Ok(ValidatedConfiguration {
        configuration,
        warnings: report.warnings,
    })
}

fn issue_from_error(config: &Configuration, err: &ConfigurationError) -> ValidationIssue {
    ValidationIssue::new(
        IssueSeverity::Error,
        err.code(),
        error_path(config, err),
        err.to_string(),
        hint_for(err),
    )
}

fn error_path(config: &Configuration, err: &ConfigurationError) -> String {
    match err {
        ConfigurationError::DuplicateRegion { region } => config
            .regions
            .iter()
            .rposition(|candidate| candidate == region)
            .map(|idx| format!("/regions/{idx}"))
            .unwrap_or_else(|| "/regions".to_string()),
        ConfigurationError::InvalidRegion { region, .. } => config
            .regions
            .iter()
            .position(|candidate| candidate == region)
            .map(|idx| format!("/regions/{idx}"))
            .unwrap_or_else(|| "/regions".to_string()),
        ConfigurationError::UnknownOverrideRegion { region } => {
            format!("/region_overrides/{region}")
        }
        other => format!("/{}", other.field()),
    }
}

fn hint_for(err: &ConfigurationError) -> Option<String> {
    let hint = match err {
        ConfigurationError::EmptyRegions => "add at least one region identifier",
        ConfigurationError::DuplicateRegion { .. } => "list each region only once",
        ConfigurationError::InvalidRegion { .. } => "use provider region ids such as us-west-2",
        ConfigurationError::InvalidName { .. } => {
            "use a short lowercase value made of letters, digits and '-'"
        }
        ConfigurationError::MissingReplicationRegion { .. }
        | ConfigurationError::UnknownReplicationRegion { .. } => {
            "set primary_region and replica_region to configured regions"
        }
        ConfigurationError::SameReplicationRegions { .. } => {
            "pick a replica_region different from primary_region"
        }
        ConfigurationError::InvalidSenderEmail { .. } => {
            "set ses_sender_email to a verified sender address"
        }
        ConfigurationError::UnknownOverrideRegion { .. } => {
            "remove the override or add the region to regions"
        }
    };
    Some(hint.to_string())
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
