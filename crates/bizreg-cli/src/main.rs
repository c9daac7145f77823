// crates/bizreg-cli/src/main.rs
// ============================================================================
// Module: Bizreg CLI Entry Point
// Description: Command dispatcher for registry lookups through the gateway.
// Purpose: Run catalog operations from the shell and print output records.
// Dependencies: bizreg-config, bizreg-core, bizreg-transport, clap, serde_json, time
// ============================================================================

//! ## Overview
//! The `bizreg` binary lists the operation catalog and executes single
//! records or JSON batches against the configured gateway. Output records are
//! written to stdout as JSON lines; fatal errors go to stderr with a non-zero
//! exit code.
//!
//! Security posture: parameter and batch inputs are untrusted; file reads are
//! size-bounded and the API key is never printed.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use bizreg_config::BizregConfig;
use bizreg_core::AuditSink;
use bizreg_core::ExecutionOptions;
use bizreg_core::FileAuditSink;
use bizreg_core::InputRecord;
use bizreg_core::NoopAuditSink;
use bizreg_core::OperationSpec;
use bizreg_core::OutputRecord;
use bizreg_core::RecordError;
use bizreg_core::Registry;
use bizreg_core::RegistryClient;
use bizreg_core::registry_catalog;
use bizreg_transport::HttpTransport;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::Date;
use time::OffsetDateTime;
use time::macros::format_description;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a batch input file.
const MAX_BATCH_INPUT_BYTES: usize = 16 * 1024 * 1024;
/// Maximum size of an inline `--params` payload.
const MAX_INLINE_PARAMS_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "bizreg", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List catalog operations as JSON.
    Operations(OperationsCommand),
    /// Execute a single operation.
    Run(RunCommand),
    /// Execute a JSON array of input records.
    Batch(BatchCommand),
}

/// Arguments for `operations`.
#[derive(Args, Debug)]
struct OperationsCommand {
    /// Restrict the listing to one registry (`ceidg` or `gus`).
    #[arg(long, value_name = "REGISTRY", value_parser = parse_registry)]
    registry: Option<Registry>,
}

/// Execution flags shared by `run` and `batch`.
#[derive(Args, Debug)]
struct ExecutionArgs {
    /// Optional config file path (defaults to bizreg.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit failed records as error output instead of aborting.
    #[arg(long)]
    continue_on_fail: bool,
    /// Reference date for relative date checks (defaults to today, UTC).
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_reference_date)]
    reference_date: Option<Date>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Registry that owns the operation.
    #[arg(value_name = "REGISTRY", value_parser = parse_registry)]
    registry: Registry,
    /// Operation tag or alias.
    #[arg(value_name = "OPERATION")]
    operation: String,
    /// Raw parameter object as JSON.
    #[arg(long, value_name = "JSON")]
    params: Option<String>,
    /// Shared execution flags.
    #[command(flatten)]
    execution: ExecutionArgs,
}

/// Arguments for `batch`.
#[derive(Args, Debug)]
struct BatchCommand {
    /// Registry that owns every operation in the batch.
    #[arg(value_name = "REGISTRY", value_parser = parse_registry)]
    registry: Registry,
    /// JSON file holding an array of `{operation, parameters}` records.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
    /// Shared execution flags.
    #[command(flatten)]
    execution: ExecutionArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a message and an optional remediation hint.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
    /// Optional remediation hint printed after the message.
    description: Option<String>,
}

impl CliError {
    /// Constructs a new [`CliError`] without a hint.
    const fn new(message: String) -> Self {
        Self {
            message,
            description: None,
        }
    }

    /// Attaches a remediation hint.
    fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_string);
        self
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
        Err(err) => emit_error(&err),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Operations(command) => command_operations(&command),
        Commands::Run(command) => command_run(command),
        Commands::Batch(command) => command_batch(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `operations` command.
fn command_operations(command: &OperationsCommand) -> CliResult<ExitCode> {
    let registries: Vec<Registry> = match command.registry {
        Some(registry) => vec![registry],
        None => Registry::ALL.to_vec(),
    };
    let mut listing = Vec::new();
    for registry in registries {
        for spec in registry_catalog(registry) {
            listing.push(describe_operation(spec)?);
        }
    }
    let rendered = serde_json::to_string_pretty(&Value::Array(listing))
        .map_err(|err| CliError::new(format!("failed to render catalog: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `run` command.
fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let parameters = match command.params.as_deref() {
        Some(text) => parse_params(text)?,
        None => Map::new(),
    };
    let records = vec![InputRecord::new(command.operation, parameters)];
    execute(command.registry, &records, &command.execution)
}

/// Executes the `batch` command.
fn command_batch(command: &BatchCommand) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.input, MAX_BATCH_INPUT_BYTES).map_err(|err| {
        match err {
            ReadLimitError::Io(err) => CliError::new(format!(
                "failed to read batch input {}: {err}",
                command.input.display()
            )),
            ReadLimitError::TooLarge {
                size,
                limit,
            } => CliError::new(format!(
                "batch input {} is too large ({size} bytes, limit {limit})",
                command.input.display()
            )),
        }
    })?;
    let records = parse_batch_input(&bytes)?;
    execute(command.registry, &records, &command.execution)
}

/// Runs records through a configured client and prints the output records.
fn execute(
    registry: Registry,
    records: &[InputRecord],
    execution: &ExecutionArgs,
) -> CliResult<ExitCode> {
    let config = BizregConfig::load(execution.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let transport = HttpTransport::new(config.http_transport_config())
        .map_err(|err| CliError::new(err.to_string()))?;
    let credentials = config.resolve_credentials().map_err(|err| CliError::new(err.to_string()))?;
    let client = RegistryClient::new(registry, transport, credentials)
        .with_audit_sink(open_audit_sink(config.audit.path())?);
    let reference_date =
        execution.reference_date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let options = ExecutionOptions::new(reference_date)
        .with_continue_on_fail(execution.continue_on_fail || config.execution.continue_on_fail);
    let outputs = client.execute_batch(records, &options).map_err(record_error)?;
    write_output_records(&outputs)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a registry label for clap.
fn parse_registry(value: &str) -> Result<Registry, String> {
    value.parse::<Registry>().map_err(|err| err.to_string())
}

/// Parses a `YYYY-MM-DD` reference date for clap.
fn parse_reference_date(value: &str) -> Result<Date, String> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

/// Parses an inline parameter object.
fn parse_params(text: &str) -> CliResult<Map<String, Value>> {
    if text.len() > MAX_INLINE_PARAMS_BYTES {
        return Err(CliError::new(format!(
            "--params exceeds size limit ({} bytes, limit {MAX_INLINE_PARAMS_BYTES})",
            text.len()
        )));
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::new("--params must be a JSON object".to_string())),
        Err(err) => Err(CliError::new(format!("--params is not valid JSON: {err}"))),
    }
}

/// Parses batch input bytes into input records.
fn parse_batch_input(bytes: &[u8]) -> CliResult<Vec<InputRecord>> {
    serde_json::from_slice(bytes)
        .map_err(|err| CliError::new(format!("batch input must be a JSON array of records: {err}")))
}

/// Opens the audit sink named by the config, or a no-op sink.
fn open_audit_sink(path: Option<&Path>) -> CliResult<Box<dyn AuditSink>> {
    match path {
        Some(path) => {
            let sink = FileAuditSink::new(path).map_err(|err| {
                CliError::new(format!("failed to open audit log {}: {err}", path.display()))
            })?;
            Ok(Box::new(sink))
        }
        None => Ok(Box::new(NoopAuditSink)),
    }
}

/// Converts a fatal record error into a CLI error.
fn record_error(err: RecordError) -> CliError {
    let message = match err.item_index() {
        Some(index) => format!("record {index}: {err}"),
        None => err.to_string(),
    };
    CliError::new(message).with_description(err.description())
}

/// Renders one catalog entry.
fn describe_operation(spec: &OperationSpec) -> CliResult<Value> {
    let params = serde_json::to_value(spec.params)
        .map_err(|err| CliError::new(format!("failed to render catalog: {err}")))?;
    Ok(json!({
        "registry": spec.registry().as_str(),
        "registry_name": spec.registry().display_name(),
        "operation": spec.operation.tag(),
        "aliases": spec.operation.aliases(),
        "method": spec.method.as_str(),
        "path": spec.path,
        "summary": spec.summary,
        "params": params,
    }))
}

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes output records to stdout, one JSON document per line.
fn write_output_records(records: &[OutputRecord]) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|err| CliError::new(format!("failed to render output record: {err}")))?;
        writeln!(&mut stdout, "{line}").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(())
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error and its hint to stderr and returns a failure exit code.
fn emit_error(err: &CliError) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {}", err.message));
    if let Some(description) = &err.description {
        let _ = write_stderr_line(description);
    }
    ExitCode::FAILURE
}
