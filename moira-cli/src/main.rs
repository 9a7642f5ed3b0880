//! moira-dumper: dump Moira alerting objects to YAML and apply them back.
//!
//! # Usage
//!
//! ```text
//! moira-dumper --action dump  --directory <dir>
//! moira-dumper --action apply --file <file.yml> [--dry-run] [--with-subscriptions]
//! moira-dumper --action apply --directory <dir> [--dry-run] [--with-subscriptions]
//! ```
//!
//! The API root comes from `--api` or `MOIRA_API`. Older scripts that spell
//! the long flags with a single dash (`-api`, `-action`, `-file`,
//! `-directory`) keep working.

mod commands;

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use moira_api::{ApplyOptions, ClientConfig, MoiraClient, DEFAULT_API_URL};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "moira-dumper",
    version,
    about = "Dump Moira triggers, tags and user settings to YAML files and apply them back",
    long_about = None,
)]
struct Cli {
    /// Moira API root, e.g. http://moira.local/api.
    #[arg(long, env = "MOIRA_API", default_value = DEFAULT_API_URL)]
    api: String,

    /// What to do.
    #[arg(long, value_enum, default_value_t = Action::Dump)]
    action: Action,

    /// Local file to apply.
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Output directory for dump; input directory for apply.
    #[arg(long, short = 'd')]
    directory: Option<PathBuf>,

    /// Report what apply would change without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Also create and update subscriptions when applying user settings.
    #[arg(long)]
    with_subscriptions: bool,

    /// Per-request timeout in seconds.
    #[arg(long, env = "MOIRA_TIMEOUT_SECS", default_value_t = 5)]
    timeout_secs: u64,

    /// Log every request to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    Dump,
    Apply,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse_from(single_dash_long_flags(std::env::args_os()));
    init_tracing(cli.verbose);

    let config =
        ClientConfig::new(cli.api.clone()).with_timeout(Duration::from_secs(cli.timeout_secs));
    tracing::debug!(api = %config.normalized_base_url(), timeout = ?config.timeout, "client configured");

    match cli.action {
        Action::Dump => {
            let Some(dir) = cli.directory.as_deref() else {
                bail!("directory must not be empty, dump cancelled (use --directory)");
            };
            let client = MoiraClient::from_config(&config);
            commands::dump::run(&client, dir)
        }
        Action::Apply => {
            let options = ApplyOptions {
                dry_run: cli.dry_run,
                upload_subscriptions: cli.with_subscriptions,
            };
            match (cli.file.as_deref(), cli.directory.as_deref()) {
                (Some(file), None) => {
                    let client = MoiraClient::from_config(&config);
                    commands::apply::run_file(&client, file, options)
                }
                (None, Some(dir)) => {
                    let client = MoiraClient::from_config(&config);
                    commands::apply::run_dir(&client, dir, options)
                }
                (Some(_), Some(_)) => bail!("use either --file or --directory with apply, not both"),
                (None, None) => bail!("file must not be empty, apply cancelled (use --file or --directory)"),
            }
        }
    }
}

/// Long flags that may also be given with one dash, as in `-api <url>`.
const SINGLE_DASH_FLAGS: &[&str] = &["api", "action", "file", "directory"];

/// Rewrite `-api` / `-api=<url>` style arguments to their `--` form.
fn single_dash_long_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(args: &[&str]) -> Vec<String> {
        single_dash_long_flags(args.iter().map(OsString::from))
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn single_dash_long_flags_become_double_dash() {
        assert_eq!(
            rewrite(&["moira-dumper", "-api", "http://m/api", "-action=apply", "-file", "a.yml"]),
            vec!["moira-dumper", "--api", "http://m/api", "--action=apply", "--file", "a.yml"]
        );
    }

    #[test]
    fn other_arguments_are_left_alone() {
        let args = ["moira-dumper", "--api", "x", "-d", "out", "-v", "-apix", "-", "--dry-run"];
        assert_eq!(rewrite(&args), args);
    }

    #[test]
    fn rewritten_flags_parse() {
        let cli = Cli::try_parse_from(single_dash_long_flags(
            ["moira-dumper", "-action", "apply", "-directory", "out"].map(OsString::from),
        ))
        .unwrap();
        assert_eq!(cli.action, Action::Apply);
        assert_eq!(cli.directory, Some(PathBuf::from("out")));
    }
}
