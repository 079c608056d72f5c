use crate::domain::{
    Command, DeviceCatalog, DeviceQuery, MatchField, ResolveError, launcher_items, resolve_all,
};
use crate::infra::{
    ApiClient, ApiError, CacheError, DispatchReport, Settings, dispatch_all, load_or_refresh,
};
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Device type turned on when no subcommand is given.
pub const DEFAULT_DEVICE_TYPE: &str = "Bot";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Command(CliCommand),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    TurnOn {
        queries: Vec<DeviceQuery>,
        cached: bool,
    },
    List {
        refresh: bool,
    },
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("`on` needs at least one device (NAME, --name NAME or --type TYPE)")]
    MissingQuery,
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1);
    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Command(CliCommand::TurnOn {
            queries: vec![DeviceQuery::by_type(DEFAULT_DEVICE_TYPE)],
            cached: false,
        }));
    };

    match subcommand.as_str() {
        "on" => {
            let mut queries: Vec<DeviceQuery> = Vec::new();
            let mut cached = false;

            let mut args = iter;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--name" | "-n" => {
                        let value = args
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--name".to_string()))?;
                        queries.push(DeviceQuery::by_name(value.as_str()));
                    }
                    "--type" | "-t" => {
                        let value = args
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--type".to_string()))?;
                        queries.push(DeviceQuery::by_type(value.as_str()));
                    }
                    "--by" => {
                        let field = args
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--by".to_string()))?;
                        let field = parse_match_field("--by", field)?;
                        let value = args
                            .next()
                            .ok_or_else(|| CliParseError::MissingFlagValue("--by".to_string()))?;
                        queries.push(DeviceQuery {
                            field,
                            value: value.to_string(),
                        });
                    }
                    "--cached" => {
                        cached = true;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        queries.push(DeviceQuery::by_name(arg.as_str()));
                    }
                }
            }

            if queries.is_empty() {
                return Err(CliParseError::MissingQuery);
            }
            Ok(CliInvocation::Command(CliCommand::TurnOn { queries, cached }))
        }
        "list" => {
            let mut refresh = false;
            for arg in iter {
                match arg.as_str() {
                    "--refresh" | "-r" => {
                        refresh = true;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }
            Ok(CliInvocation::Command(CliCommand::List { refresh }))
        }
        other if other.starts_with('-') => Err(CliParseError::UnknownFlag(other.to_string())),
        other => Err(CliParseError::UnknownSubcommand(other.to_string())),
    }
}

fn parse_match_field(flag: &str, value: &str) -> Result<MatchField, CliParseError> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse::<MatchField>()
        .map_err(|_| CliParseError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        })
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Fetch(#[from] ApiError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("{0}\nHint: run `sbctl list --refresh` to see device names and types.")]
    Resolve(#[from] ResolveError),

    #[error("failed to encode launcher items: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{failed} of {total} devices could not be turned on")]
    DispatchFailed { failed: usize, total: usize },

    #[error(transparent)]
    WriteOutput(#[from] io::Error),
}

/// Runs one command end to end. The API client lives for exactly this call.
pub fn run(command: CliCommand, settings: &Settings) -> Result<(), CliRunError> {
    run_with(command, settings, io::stdout, io::stderr)
}

/// Stdio is opened only after the network work finishes: dispatch workers
/// log to stderr, and a held stderr lock would block them.
fn run_with<O, E>(
    command: CliCommand,
    settings: &Settings,
    stdout: impl FnOnce() -> O,
    stderr: impl FnOnce() -> E,
) -> Result<(), CliRunError>
where
    O: Write,
    E: Write,
{
    let client = ApiClient::new(&settings.api_host, settings.credentials.clone());

    match command {
        CliCommand::List { refresh } => {
            let max_age = if refresh {
                Duration::ZERO
            } else {
                settings.cache_max_age
            };
            let catalog = load_or_refresh(&settings.cache_path, max_age, || {
                client.fetch_catalog()
            })?;
            let text = serde_json::to_string(&launcher_items(&catalog))?;
            write_line(&mut stdout(), &text)?;
            Ok(())
        }
        CliCommand::TurnOn { queries, cached } => {
            let catalog = if cached {
                load_or_refresh(&settings.cache_path, settings.cache_max_age, || {
                    client.fetch_catalog()
                })?
            } else {
                client.fetch_catalog()?
            };

            let report = turn_on(&catalog, &queries, |device_id, command| {
                client.send_command(device_id, command)
            })?;
            write_report(&mut stdout(), &mut stderr(), &report)?;

            debug!(
                succeeded = report.succeeded().count(),
                total = report.total(),
                "dispatch finished"
            );
            let failed = report.failure_count();
            if failed > 0 {
                return Err(CliRunError::DispatchFailed {
                    failed,
                    total: report.total(),
                });
            }
            Ok(())
        }
    }
}

/// Resolves every query first, then dispatches `turnOn` to each device.
/// Resolution failures abort before anything is sent.
pub fn turn_on<F>(
    catalog: &DeviceCatalog,
    queries: &[DeviceQuery],
    send: F,
) -> Result<DispatchReport, ResolveError>
where
    F: Fn(&str, &Command) -> Result<(), ApiError> + Sync,
{
    let targets = resolve_all(catalog, queries)?;
    debug!(targets = targets.len(), "resolved devices");
    Ok(dispatch_all(&targets, &Command::turn_on(), send))
}

/// Success lines go to stdout until it closes; failures always reach stderr.
fn write_report(
    out: &mut impl Write,
    err: &mut impl Write,
    report: &DispatchReport,
) -> io::Result<()> {
    let mut out_open = true;
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) if out_open => {
                let line = format!(
                    "on\t{}\t{}",
                    outcome.target.device_name, outcome.target.device_id
                );
                out_open = write_line(out, &line)?;
            }
            Ok(()) => {}
            Err(error) => {
                write_line(err, &error.to_string())?;
            }
        }
    }
    Ok(())
}

fn write_line(out: &mut impl Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(error) => Err(error),
    }
}
