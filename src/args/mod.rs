use crate::error::{Error, Result};
use crate::report::OutputMode;
use crate::scanner::ping::DEFAULT_TIMEOUT;
use crate::target::{SortOrder, Sources};
use crate::utils::address::Target;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const HELP_TEXT: &str = r#"Usage:
  multi-ping [options] [targets...]

  Tests which ip addresses are occupied, using the system "ping" command.
  Results look like:
    200.200.137.21: × occupied
    200.200.137.22: √ available
  Without any target the default config file (~/.multi_ping_conf) is used.

Targets:
  ip_address            test a single address
  ip_start-ip_end       test every address from ip_start to ip_end; leading
                        octets missing from ip_end are taken from ip_start
  ip_address/prefix     test every address of a CIDR block
  -c file               read targets from "file", one address or range per line

Options:
  -a                    show only available addresses
  -o                    show only occupied addresses
  -f                    do not ask for confirmation above 20 addresses
  -s                    print results in target order
  -d                    also use the default config file
  -h, --help            show this help text
  --timeout <ms>        per-address timeout in milliseconds
  --concurrency <n>     probe at most n addresses at a time
  --numeric-sort        order targets by address value instead of text
  --json                print the results as JSON
  --log-dir <dir>       also write a daily log file into dir

  Short options can be combined, e.g. -afs. Targets given on the command line
  or with -c are saved to the default config file for the next run."#;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Parser)]
#[command(name = "multi-ping", author, version = "0.1.0", about, long_about = None, disable_help_flag = true)]
pub struct Args {
    /// ip addresses, ranges (start-end) or CIDR blocks.
    pub targets: Vec<String>,
    /// read targets from this config file.
    #[arg(short = 'c', value_name = "FILE")]
    pub conf: Option<PathBuf>,
    /// also read the default config file.
    #[arg(short)]
    pub default: bool,
    /// show available addresses only.
    #[arg(short)]
    pub available: bool,
    /// show occupied addresses only.
    #[arg(short)]
    pub occupied: bool,
    /// skip the confirmation for large target sets.
    #[arg(short)]
    pub force: bool,
    /// print results in target order.
    #[arg(short)]
    pub sort: bool,
    #[arg(short, long)]
    pub help: bool,
    /// per-address timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,
    /// maximum number of probes in flight.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
    /// sort targets by address value.
    #[arg(long)]
    pub numeric_sort: bool,
    /// print the results as JSON.
    #[arg(long)]
    pub json: bool,
    /// directory for the rolling log file.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Everything a run needs, fixed once the arguments are parsed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sources: Sources,
    /// Rewritten with the targets when `sources` has explicit entries.
    pub default_conf: PathBuf,
    pub mode: OutputMode,
    pub order: SortOrder,
    pub force: bool,
    pub json: bool,
    pub timeout: Duration,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum Invocation {
    Help,
    Run(RunConfig),
}

/// Turns an unknown dash token into `IllegalParam`, naming the whole token
/// from `argv` (`-ax` rather than clap's `-x`). Other clap errors are handed
/// back unchanged.
pub fn illegal_param(error: clap::Error, argv: &[String]) -> std::result::Result<Error, clap::Error> {
    if error.kind() != ErrorKind::UnknownArgument {
        return Err(error);
    }
    let invalid = match error.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(invalid)) => invalid.clone(),
        _ => return Err(error),
    };
    let token = match invalid.strip_prefix('-').filter(|flag| !flag.starts_with('-')) {
        Some(flag) => argv.iter().map(String::as_str).find(|token| {
            token.starts_with('-') && !token.starts_with("--") && token[1..].contains(flag)
        }),
        None => argv.iter().map(String::as_str).find(|token| {
            *token == invalid || token.starts_with(&format!("{}=", invalid))
        }),
    };
    Ok(Error::IllegalParam(token.unwrap_or(invalid.as_str()).to_string()))
}

impl Args {
    /// `default_conf` is only called once help has been ruled out.
    pub fn invocation<F>(&self, default_conf: F) -> Result<Invocation>
    where
        F: FnOnce() -> Result<PathBuf>,
    {
        if self.help {
            return Ok(Invocation::Help);
        }
        let mut targets = vec![];
        for token in &self.targets {
            if token == "help" || token == "h" {
                return Ok(Invocation::Help);
            }
            match Target::parse(token) {
                Some(target) => targets.push(target),
                None => return Err(Error::IllegalParam(token.clone())),
            }
        }
        let default_conf = default_conf()?;
        // No arguments at all means the default config file only.
        let use_default = self.default || *self == Args::default();
        let sources = Sources {
            default_conf: use_default.then(|| default_conf.clone()),
            conf: self.conf.clone(),
            targets,
        };
        let order = if self.numeric_sort {
            SortOrder::Numeric
        } else {
            SortOrder::Lexical
        };
        Ok(Invocation::Run(RunConfig {
            sources,
            default_conf,
            mode: OutputMode {
                available_only: self.available,
                occupied_only: self.occupied,
                sorted: self.sort,
            },
            order,
            force: self.force,
            json: self.json,
            timeout: self.timeout.map(Duration::from_millis).unwrap_or(DEFAULT_TIMEOUT),
            concurrency: self.concurrency,
        }))
    }
}
