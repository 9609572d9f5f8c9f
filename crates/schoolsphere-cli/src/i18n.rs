// crates/schoolsphere-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings behind stable keys.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every line the CLI prints goes through the [`t!`](crate::t) macro, which
//! looks up a key in the catalog and substitutes `{placeholder}` arguments.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitutions apply in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "schoolsphere {version}"),
    ("main.logging_failed", "Failed to initialize logging: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to serialize output: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid ({source})."),
    ("config.validate.defaults", "built-in defaults"),
    ("config.validate.connection_ok", "Appwrite connection settings found for {endpoint} (project {project})."),
    ("config.validate.connection_missing", "Appwrite connection settings incomplete: {error}"),
    ("connection.missing", "Cannot connect to Appwrite: {error}"),
    ("connection.client_failed", "Failed to create Appwrite client: {error}"),
    ("migrate.plan.header", "Migration plan {plan} ({count} attributes)"),
    ("migrate.plan.field", "  {collection}.{key}: {kind} {constraints}, default {default}"),
    ("migrate.failed", "Migration aborted: {error}"),
    ("migrate.report.header", "Migration {plan} on database {database}{mode}"),
    ("migrate.report.mode.dry_run", " (dry run, nothing written)"),
    ("migrate.report.provisioning", "Attributes:"),
    ("migrate.report.provision", "  {collection}.{key}: {outcome}"),
    ("migrate.report.waits", "Schema visibility:"),
    ("migrate.report.wait.visible", "  {collection}.{key}: visible after {polls} poll(s)"),
    ("migrate.report.wait.missing", "  {collection}.{key}: NOT visible after {polls} poll(s)"),
    ("migrate.report.backfills", "Backfill:"),
    (
        "migrate.report.backfill",
        "  {collection}: scanned {scanned}, pending {pending}, updated {updated}, failed {failed}",
    ),
    ("migrate.report.document_failure", "    {document}: {error}"),
    ("migrate.report.collection_failures", "Collections not processed:"),
    ("migrate.report.collection_failure", "  {collection}: {error}"),
    ("migrate.report.total", "Documents updated: {updated}"),
    ("migrate.warn.failures", "Warning: the migration finished with failures; re-run after fixing them."),
    ("backup.failed", "Backup failed: {error}"),
    ("backup.ok", "Backup written to {path}"),
    ("backup.collection", "  {id} ({name}): {count} document(s)"),
    ("e2e.select.failed", "Cannot select scenarios: {error}"),
    ("e2e.list.entry", "{name}  [{role}]  {description}"),
    ("e2e.list.no_login", "anonymous"),
    ("e2e.report.pass", "PASS {name} ({passed}/{total} steps, {elapsed} ms)"),
    ("e2e.report.fail", "FAIL {name} at step {index} ({step}): {error}"),
    ("e2e.report.screenshot", "  screenshot: {path}"),
    ("e2e.report.summary", "Scenarios: {passed} passed, {failed} failed"),
    ("e2e.smoke.healthy", "Health check OK at {url}"),
    ("e2e.smoke.skipped", "Smoke: {reason}; skipping health check."),
    ("e2e.smoke.failed", "Health check failed: {reason}"),
];

/// Returns the message catalog.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| CATALOG_EN.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Resolves `key` while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
