// crates/schoolsphere-cli/src/main.rs
// ============================================================================
// Module: SchoolSphere CLI Entry Point
// Description: Command dispatcher for migrations, backups, and UI scenarios.
// Purpose: Provide one operator binary for SchoolSphere maintenance tasks.
// Dependencies: clap, schoolsphere-{core,config,appwrite,e2e}, serde, thiserror.
// ============================================================================

//! ## Overview
//! The `schoolsphere` binary applies the phase-1 schema migration, exports
//! database backups, and drives browser scenarios against a running web
//! application. All user-facing strings are routed through the message
//! catalog; diagnostics go to stderr through `tracing`, and command output
//! goes to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use schoolsphere_appwrite::AppwriteClient;
use schoolsphere_cli::logging::LogFormat;
use schoolsphere_cli::logging::init_tracing;
use schoolsphere_cli::render;
use schoolsphere_cli::t;
use schoolsphere_cli::wiring;
use schoolsphere_config::AppwriteConnection;
use schoolsphere_config::SchoolSphereConfig;
use schoolsphere_config::config_toml_example;
use schoolsphere_core::MigrationPlan;
use schoolsphere_core::MigrationRunner;
use schoolsphere_core::runtime::export_database;
use schoolsphere_e2e::ScenarioRunner;
use schoolsphere_e2e::SmokeOutcome;
use schoolsphere_e2e::WebDriverSession;
use schoolsphere_e2e::probe_health;
use schoolsphere_e2e::run_scenarios;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "schoolsphere", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Configuration file (overrides `SCHOOLSPHERE_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Diagnostic log encoding on stderr.
    #[arg(long, value_enum, value_name = "FORMAT", default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Phase-1 schema migration.
    Migrate {
        /// Selected migrate subcommand.
        #[command(subcommand)]
        command: MigrateCommand,
    },
    /// Export every collection to JSON files.
    Backup(BackupCommand),
    /// Browser scenario utilities.
    E2e {
        /// Selected e2e subcommand.
        #[command(subcommand)]
        command: E2eCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Report encoding on stdout.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Migration subcommands.
#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Print the plan without contacting Appwrite.
    Plan(PlanCommand),
    /// Provision attributes and backfill documents.
    Run(RunMigrationCommand),
}

/// Arguments for `migrate plan`.
#[derive(Args, Debug)]
struct PlanCommand {
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `migrate run`.
#[derive(Args, Debug)]
struct RunMigrationCommand {
    /// Report what would change without writing anything.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Exit non-zero when any attribute or document failed.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `backup`.
#[derive(Args, Debug)]
struct BackupCommand {
    /// Directory receiving the timestamped backup.
    #[arg(long, value_name = "DIR", default_value = "backups")]
    out: PathBuf,
}

/// UI scenario subcommands.
#[derive(Subcommand, Debug)]
enum E2eCommand {
    /// List built-in and file scenarios.
    List(ListScenariosCommand),
    /// Run scenarios against the web application.
    Run(RunScenariosCommand),
    /// Probe the application's health endpoint.
    Smoke(SmokeCommand),
}

/// Arguments for `e2e list`.
#[derive(Args, Debug)]
struct ListScenariosCommand {
    /// Additional scenario file (JSON); repeatable.
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
}

/// Arguments for `e2e run`.
#[derive(Args, Debug)]
struct RunScenariosCommand {
    /// Scenario names, run in the given order.
    #[arg(value_name = "NAME")]
    names: Vec<String>,
    /// Run every available scenario.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "names")]
    all: bool,
    /// Additional scenario file (JSON); repeatable.
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
    /// Web application base URL (overrides `e2e.base_url`).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// WebDriver server URL (overrides `e2e.webdriver_url`).
    #[arg(long, value_name = "URL")]
    webdriver_url: Option<String>,
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `e2e smoke`.
#[derive(Args, Debug)]
struct SmokeCommand {
    /// API server base URL (overrides `BASE_URL` and `e2e.api_url`).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Validate,
    /// Print an example configuration file.
    Example,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    init_tracing(cli.log_format).map_err(|err| CliError::new(t!("main.logging_failed", error = err)))?;
    let config_path = cli.config.as_deref();

    match command {
        Commands::Migrate {
            command,
        } => command_migrate(command, config_path),
        Commands::Backup(command) => command_backup(&command, config_path),
        Commands::E2e {
            command,
        } => command_e2e(command, config_path),
        Commands::Config {
            command,
        } => command_config(&command, config_path),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

/// Loads configuration from the explicit path, env override, or default.
fn load_config(path: Option<&Path>) -> CliResult<SchoolSphereConfig> {
    SchoolSphereConfig::load(path).map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Reads Appwrite connection settings from the environment.
fn load_connection() -> CliResult<AppwriteConnection> {
    AppwriteConnection::from_env().map_err(|err| CliError::new(t!("connection.missing", error = err)))
}

/// Builds the REST client for the configured project.
fn connect(config: &SchoolSphereConfig, connection: &AppwriteConnection) -> CliResult<AppwriteClient> {
    AppwriteClient::new(wiring::appwrite_client_config(connection, &config.appwrite))
        .map_err(|err| CliError::new(t!("connection.client_failed", error = err)))
}

// ============================================================================
// SECTION: Migrate Commands
// ============================================================================

/// Dispatches migrate subcommands.
fn command_migrate(command: MigrateCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        MigrateCommand::Plan(command) => command_migrate_plan(&command),
        MigrateCommand::Run(command) => command_migrate_run(&command, config_path),
    }
}

/// Executes `migrate plan`.
fn command_migrate_plan(command: &PlanCommand) -> CliResult<ExitCode> {
    let plan = MigrationPlan::phase1();
    match command.format {
        OutputFormat::Text => write_lines(&render::plan_lines(&plan))?,
        OutputFormat::Json => write_json(&plan)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `migrate run`.
fn command_migrate_run(command: &RunMigrationCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let connection = load_connection()?;
    let client = connect(&config, &connection)?;

    let runner = MigrationRunner::new(client, config.migration.options(command.dry_run));
    info!(strict = command.strict, "starting migration");
    let report = runner
        .run(&MigrationPlan::phase1())
        .map_err(|err| CliError::new(t!("migrate.failed", error = err)))?;

    match command.format {
        OutputFormat::Text => write_lines(&render::migration_lines(&report))?,
        OutputFormat::Json => write_json(&report)?,
    }
    if report.has_failures() {
        write_stderr_line(&t!("migrate.warn.failures"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    if wiring::migration_succeeded(&report, command.strict) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

// ============================================================================
// SECTION: Backup Command
// ============================================================================

/// Executes `backup`.
fn command_backup(command: &BackupCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let connection = load_connection()?;
    let client = connect(&config, &connection)?;

    let options = wiring::backup_options(&command.out, &connection, &config.migration);
    let manifest =
        export_database(&client, &options).map_err(|err| CliError::new(t!("backup.failed", error = err)))?;
    write_lines(&render::backup_lines(&manifest))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: E2E Commands
// ============================================================================

/// Dispatches e2e subcommands.
fn command_e2e(command: E2eCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        E2eCommand::List(command) => command_e2e_list(&command),
        E2eCommand::Run(command) => command_e2e_run(&command, config_path),
        E2eCommand::Smoke(command) => command_e2e_smoke(&command, config_path),
    }
}

/// Executes `e2e list`.
fn command_e2e_list(command: &ListScenariosCommand) -> CliResult<ExitCode> {
    let scenarios = wiring::available_scenarios(&command.files)
        .map_err(|err| CliError::new(t!("e2e.select.failed", error = err)))?;
    write_lines(&render::scenario_list_lines(&scenarios))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `e2e run`.
fn command_e2e_run(command: &RunScenariosCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let scenarios = wiring::select_scenarios(&command.names, command.all, &command.files)
        .map_err(|err| CliError::new(t!("e2e.select.failed", error = err)))?;

    let driver = wiring::webdriver_config(&config.e2e, command.webdriver_url.as_deref());
    let runner = ScenarioRunner::new(wiring::runner_config(&config.e2e, command.base_url.as_deref()));
    info!(count = scenarios.len(), webdriver = %driver.webdriver_url, "running scenarios");
    let reports = run_scenarios(&runner, &scenarios, || WebDriverSession::start(&driver));

    match command.format {
        OutputFormat::Text => write_lines(&render::scenario_report_lines(&reports))?,
        OutputFormat::Json => write_json(&reports)?,
    }
    if reports.iter().all(schoolsphere_e2e::ScenarioReport::passed) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Executes `e2e smoke`.
fn command_e2e_smoke(command: &SmokeCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let base_url = wiring::smoke_target(&config.e2e, command.base_url.as_deref(), |name| env::var(name).ok());
    let outcome = probe_health(&base_url, config.e2e.default_timeout());

    let line = render::smoke_line(&base_url, &outcome);
    if let SmokeOutcome::Failed(_) = outcome {
        write_stderr_line(&line).map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(config_path),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes `config validate`.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = load_config(config_path)?;
    let source = config
        .source
        .as_ref()
        .map_or_else(|| t!("config.validate.defaults"), |path| path.display().to_string());
    let mut lines = vec![t!("config.validate.ok", source = source)];
    match AppwriteConnection::from_env() {
        Ok(connection) => lines.push(t!(
            "config.validate.connection_ok",
            endpoint = connection.endpoint,
            project = connection.project_id
        )),
        Err(err) => lines.push(t!("config.validate.connection_missing", error = err)),
    }
    write_lines(&lines)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes each line to stdout.
fn write_lines(lines: &[String]) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(&mut stdout, "{line}").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(())
}

/// Writes a value as pretty-printed JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let output =
        serde_json::to_string_pretty(value).map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
