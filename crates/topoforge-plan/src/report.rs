use topoforge_core::{FeatureGroup, GLOBAL_SCOPE};

use crate::model::Plan;

/// Render a deterministic markdown summary of a plan for review.
pub fn render_plan_summary(plan: &Plan) -> String {
    let mut lines = Vec::new();

    lines.push("# Topoforge Plan Summary".to_string());
    lines.push(String::new());
    lines.push("## Overview".to_string());
    lines.push(format!("- plan_version: {}", plan.plan_version()));
    lines.push(format!("- regions: {}", plan.regions().join(", ")));
    lines.push(format!("- resource_count: {}", plan.resource_count()));
    match plan.crr() {
        Some(crr) => lines.push(format!("- crr: {} -> {}", crr.primary, crr.replica)),
        None => lines.push("- crr: disabled".to_string()),
    }
    lines.push(String::new());

    lines.push("## Resources per region".to_string());
    lines.push("| region | baseline | email | geo | replication | total |".to_string());
    lines.push("| --- | --- | --- | --- | --- | --- |".to_string());
    let mut scopes: Vec<&str> = plan.regions().iter().map(String::as_str).collect();
    if plan.count_in(GLOBAL_SCOPE) > 0 {
        scopes.push(GLOBAL_SCOPE);
    }
    for scope in scopes {
        let count = |group: FeatureGroup| {
            plan.declarations()
                .iter()
                .filter(|decl| decl.region == scope && decl.kind.feature() == group)
                .count()
        };
        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} |",
            scope,
            count(FeatureGroup::Baseline),
            count(FeatureGroup::Email),
            count(FeatureGroup::Geo),
            count(FeatureGroup::Replication),
            plan.count_in(scope)
        ));
    }
    lines.push(String::new());

    lines.push("## Declarations".to_string());
    lines.push("| id | address | name | depends_on |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for (idx, decl) in plan.declarations().iter().enumerate() {
        let deps = if decl.depends_on.is_empty() {
            "-".to_string()
        } else {
            decl.depends_on
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        };
        lines.push(format!(
            "| #{} | {} | {} | {} |",
            idx,
            decl.address(),
            decl.name,
            deps
        ));
    }

    if let Some(crr) = plan.crr() {
        lines.push(String::new());
        lines.push("## Replication edges".to_string());
        for edge in &crr.edges {
            let from = plan
                .get(edge.from)
                .map(|decl| decl.address())
                .unwrap_or_else(|| edge.from.to_string());
            let to = plan
                .get(edge.to)
                .map(|decl| decl.address())
                .unwrap_or_else(|| edge.to.to_string());
            lines.push(format!("- {from} -> {to}"));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}
