// crates/schoolsphere-cli/src/render.rs
// ============================================================================
// Module: CLI Rendering
// Description: Human-readable rendering of plans and reports.
// Purpose: Keep the text shape of command output testable apart from I/O.
// Dependencies: schoolsphere-core, schoolsphere-e2e
// ============================================================================

//! ## Overview
//! Every function here returns the lines to print; `main` decides where they
//! go. JSON output bypasses this module and serializes the report types
//! directly.

use schoolsphere_core::AttributeKind;
use schoolsphere_core::BackupManifest;
use schoolsphere_core::MigrationPlan;
use schoolsphere_core::MigrationReport;
use schoolsphere_core::ProvisionOutcome;
use schoolsphere_e2e::Scenario;
use schoolsphere_e2e::ScenarioReport;
use schoolsphere_e2e::SmokeOutcome;

use crate::t;

// ============================================================================
// SECTION: Migration
// ============================================================================

/// Renders the attributes a plan declares and their backfill defaults.
#[must_use]
pub fn plan_lines(plan: &MigrationPlan) -> Vec<String> {
    let mut lines = vec![t!("migrate.plan.header", plan = plan.name, count = plan.attribute_count())];
    for collection in &plan.collections {
        for field in &collection.fields {
            lines.push(t!(
                "migrate.plan.field",
                collection = collection.collection,
                key = field.spec.key,
                kind = field.spec.kind.label(),
                constraints = constraints(&field.spec.kind, field.spec.array),
                default = field.default
            ));
        }
    }
    lines
}

fn constraints(kind: &AttributeKind, array: bool) -> String {
    let mut parts = match kind {
        AttributeKind::String {
            size,
        } => vec![format!("size {size}")],
        AttributeKind::Integer {
            min,
            max,
        } => {
            let mut bounds = Vec::new();
            if let Some(min) = min {
                bounds.push(format!("min {min}"));
            }
            if let Some(max) = max {
                bounds.push(format!("max {max}"));
            }
            bounds
        }
    };
    parts.push("optional".to_string());
    if array {
        parts.push("array".to_string());
    }
    format!("({})", parts.join(", "))
}

fn outcome_label(outcome: &ProvisionOutcome) -> String {
    match outcome {
        ProvisionOutcome::Created => "created".to_string(),
        ProvisionOutcome::Skipped => "already exists".to_string(),
        ProvisionOutcome::Planned => "would be created".to_string(),
        ProvisionOutcome::Failed {
            error,
        } => format!("FAILED: {error}"),
    }
}

/// Renders a finished migration run.
#[must_use]
pub fn migration_lines(report: &MigrationReport) -> Vec<String> {
    let mode = if report.dry_run { t!("migrate.report.mode.dry_run") } else { String::new() };
    let mut lines = vec![t!("migrate.report.header", plan = report.plan, database = report.database, mode = mode)];

    lines.push(t!("migrate.report.provisioning"));
    for record in &report.provisioning {
        lines.push(t!(
            "migrate.report.provision",
            collection = record.collection,
            key = record.key,
            outcome = outcome_label(&record.outcome)
        ));
    }

    if !report.waits.is_empty() {
        lines.push(t!("migrate.report.waits"));
        for wait in &report.waits {
            let line = if wait.visible {
                t!("migrate.report.wait.visible", collection = wait.collection, key = wait.key, polls = wait.polls)
            } else {
                t!("migrate.report.wait.missing", collection = wait.collection, key = wait.key, polls = wait.polls)
            };
            lines.push(line);
        }
    }

    lines.push(t!("migrate.report.backfills"));
    for backfill in &report.backfills {
        lines.push(t!(
            "migrate.report.backfill",
            collection = backfill.collection,
            scanned = backfill.scanned,
            pending = backfill.pending,
            updated = backfill.updated,
            failed = backfill.failed()
        ));
        for failure in &backfill.failures {
            lines.push(t!("migrate.report.document_failure", document = failure.document_id, error = failure.error));
        }
    }

    if !report.collection_failures.is_empty() {
        lines.push(t!("migrate.report.collection_failures"));
        for failure in &report.collection_failures {
            lines.push(t!("migrate.report.collection_failure", collection = failure.collection, error = failure.error));
        }
    }

    lines.push(t!("migrate.report.total", updated = report.total_updated()));
    lines
}

// ============================================================================
// SECTION: Backup
// ============================================================================

/// Renders a written backup.
#[must_use]
pub fn backup_lines(manifest: &BackupManifest) -> Vec<String> {
    let mut lines = vec![t!("backup.ok", path = manifest.directory.display())];
    for collection in &manifest.collections {
        lines.push(t!(
            "backup.collection",
            id = collection.id,
            name = collection.name.as_deref().unwrap_or("-"),
            count = collection.count
        ));
    }
    lines
}

// ============================================================================
// SECTION: UI Scenarios
// ============================================================================

/// Renders one line per scenario with its login role.
#[must_use]
pub fn scenario_list_lines(scenarios: &[Scenario]) -> Vec<String> {
    scenarios
        .iter()
        .map(|scenario| {
            let role = scenario.login.map_or_else(|| t!("e2e.list.no_login"), |role| role.to_string());
            t!("e2e.list.entry", name = scenario.name, role = role, description = scenario.description)
        })
        .collect()
}

/// Renders scenario results followed by a pass/fail summary.
#[must_use]
pub fn scenario_report_lines(reports: &[ScenarioReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for report in reports {
        match &report.failure {
            None => lines.push(t!(
                "e2e.report.pass",
                name = report.name,
                passed = report.steps_passed,
                total = report.steps_total,
                elapsed = report.elapsed_ms
            )),
            Some(failure) => lines.push(t!(
                "e2e.report.fail",
                name = report.name,
                index = failure.index,
                step = failure.step,
                error = failure.message
            )),
        }
        for path in &report.screenshots {
            lines.push(t!("e2e.report.screenshot", path = path.display()));
        }
    }
    let passed = reports.iter().filter(|report| report.passed()).count();
    lines.push(t!("e2e.report.summary", passed = passed, failed = reports.len() - passed));
    lines
}

/// Renders a smoke probe result.
#[must_use]
pub fn smoke_line(base_url: &str, outcome: &SmokeOutcome) -> String {
    match outcome {
        SmokeOutcome::Healthy => t!("e2e.smoke.healthy", url = base_url),
        SmokeOutcome::Skipped(reason) => t!("e2e.smoke.skipped", reason = reason),
        SmokeOutcome::Failed(reason) => t!("e2e.smoke.failed", reason = reason),
    }
}
