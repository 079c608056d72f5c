mod cli;
mod domain;
mod infra;

use crate::cli::CliInvocation;
use crate::infra::{ConfigError, DEFAULT_LOG_FILTER, Settings, init_tracing, log_json_from_env};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Command(command) => {
            init_tracing(DEFAULT_LOG_FILTER, log_json_from_env());
            let settings = Settings::from_env()?;
            tracing::debug!(api_host = %settings.api_host, cache = %settings.cache_path.display(), "loaded settings");
            crate::cli::run(command, &settings)?;
            Ok(())
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} - turn on SwitchBot devices and export the device list\n\nUSAGE:\n  {name}                          Turn on the first device of type \"Bot\"\n  {name} on [--cached] QUERY...   Turn on every queried device\n  {name} list [--refresh]         Print launcher items for all devices (cached)\n  {name} --help | --version\n\nQUERY:\n  NAME             Same as --name NAME\n  --name NAME      Match the device name exactly (first match wins)\n  --type TYPE      Match the device type exactly (first match wins)\n  --by FIELD VALUE FIELD is `name` or `type`\n\nFLAGS:\n  --cached         Resolve devices from the local cache instead of a fresh fetch\n  --refresh        Ignore cache age and refetch the device list\n\nOUTPUT:\n  on:   on<TAB>device_name<TAB>device_id per device; failures go to stderr\n  list: {{\"items\":[{{\"title\",\"subtitle\",\"arg\",\"uid\"}}]}}\n\nENV:\n  OPEN_TOKEN        API token (required)\n  SECRET            API signing secret (required)\n  SBCTL_API_HOST    Override API host (default: https://api.switch-bot.com)\n  SBCTL_CACHE_PATH  Override cache file (default: workflow/device-list.json, refreshed after 24h)\n  SBCTL_LOG_FORMAT  Set to `json` for JSON log lines on stderr\n  RUST_LOG          Log filter (default: sbctl=warn)\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}
