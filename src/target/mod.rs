use crate::error::{Error, Result};
use crate::utils::address::Target;
use crate::utils::conf::read_conf;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Above this many targets the user has to confirm the run.
pub const CONFIRM_THRESHOLD: usize = 20;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Compare the dotted text, so `10.0.0.100` sorts before `10.0.0.2`.
    #[default]
    Lexical,
    Numeric,
}

/// The deduplicated, sorted addresses of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSet {
    ips: Vec<Ipv4Addr>,
}

impl TargetSet {
    pub fn new<I: IntoIterator<Item = Ipv4Addr>>(ips: I, order: SortOrder) -> Self {
        let mut ips = ips.into_iter().unique().collect::<Vec<Ipv4Addr>>();
        match order {
            SortOrder::Lexical => ips.sort_by_cached_key(|ip| ip.to_string()),
            SortOrder::Numeric => ips.sort(),
        }
        Self { ips }
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ipv4Addr> {
        self.ips.iter()
    }

    pub fn as_slice(&self) -> &[Ipv4Addr] {
        &self.ips
    }

    /// Length of the longest dotted address, used to align the report.
    pub fn max_width(&self) -> usize {
        self.ips
            .iter()
            .map(|ip| ip.to_string().len())
            .max()
            .unwrap_or(0)
    }
}

/// Where the addresses of a run come from.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    /// Default config file, read only when it exists.
    pub default_conf: Option<PathBuf>,
    /// Explicit config file, which must exist.
    pub conf: Option<PathBuf>,
    /// Single addresses and ranges given on the command line.
    pub targets: Vec<Target>,
}

impl Sources {
    /// Whether anything besides the default config file contributes. Such
    /// runs rewrite the default config file.
    pub fn has_explicit(&self) -> bool {
        self.conf.is_some() || !self.targets.is_empty()
    }

    pub fn resolve(&self, order: SortOrder) -> Result<TargetSet> {
        let mut ips = vec![];
        if let Some(path) = &self.default_conf {
            if path.is_file() {
                ips.extend(read_conf(path)?);
            } else {
                tracing::debug!("default config {} not present", path.display());
            }
        }
        if let Some(path) = &self.conf {
            if !path.is_file() {
                return Err(Error::ConfigNotFound(path.clone()));
            }
            ips.extend(read_conf(path)?);
        }
        for target in &self.targets {
            ips.extend(target.addresses());
        }
        Ok(TargetSet::new(ips, order))
    }
}

/// Asks whether to go on with `count` targets until the answer is one of
/// `y`, `n`, `yes` or `no`. End of input counts as no.
pub fn confirm<R: BufRead, W: Write>(count: usize, mut input: R, mut output: W) -> Result<bool> {
    loop {
        writeln!(
            output,
            "The number of ip addrs is {}, bigger than {}, continue?(y/n)",
            count, CONFIRM_THRESHOLD
        )?;
        output.flush()?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}
