use crate::scanner::result::{ProbeResult, Status};
use crate::target::TargetSet;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Which addresses a report contains and in what order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMode {
    pub available_only: bool,
    pub occupied_only: bool,
    /// Follow the target order instead of grouping by status.
    pub sorted: bool,
}

#[derive(Debug, Serialize)]
struct Entry {
    address: Ipv4Addr,
    status: Status,
}

pub struct Reporter {
    mode: OutputMode,
    width: usize,
}

impl Reporter {
    pub fn new(mode: OutputMode, targets: &TargetSet) -> Self {
        Self {
            mode,
            width: targets.max_width(),
        }
    }

    /// The addresses to print with their status, in print order.
    fn entries(&self, targets: &TargetSet, result: &ProbeResult) -> Vec<(Ipv4Addr, Status)> {
        if self.mode.sorted {
            return targets
                .iter()
                .filter_map(|addr| result.get(addr).map(|status| (*addr, status)))
                .collect();
        }
        let unfiltered = !self.mode.available_only && !self.mode.occupied_only;
        let mut entries = vec![];
        if self.mode.available_only || unfiltered {
            entries.extend(result.available().iter().map(|addr| (*addr, Status::Available)));
        }
        if self.mode.occupied_only || unfiltered {
            entries.extend(result.occupied().iter().map(|addr| (*addr, Status::Occupied)));
        }
        entries
    }

    fn line(&self, addr: Ipv4Addr, status: &dyn std::fmt::Display) -> String {
        let width = self.width;
        format!("{:<width$.width$}: {}", addr.to_string(), status)
    }

    pub fn render(&self, targets: &TargetSet, result: &ProbeResult) -> Vec<String> {
        self.entries(targets, result)
            .into_iter()
            .map(|(addr, status)| self.line(addr, &status))
            .collect()
    }

    pub fn render_json(&self, targets: &TargetSet, result: &ProbeResult) -> serde_json::Result<String> {
        let entries = self
            .entries(targets, result)
            .into_iter()
            .map(|(address, status)| Entry { address, status })
            .collect::<Vec<Entry>>();
        serde_json::to_string_pretty(&entries)
    }

    /// Prints the text report to stdout, coloring the status when stdout is a terminal.
    pub fn print(&self, targets: &TargetSet, result: &ProbeResult) {
        use std::io::IsTerminal;
        if !std::io::stdout().is_terminal() {
            for line in self.render(targets, result) {
                println!("{}", line);
            }
            return;
        }
        for (addr, status) in self.entries(targets, result) {
            let painted = match status {
                Status::Available => status.to_string().green(),
                Status::Occupied => status.to_string().red(),
            };
            println!("{}", self.line(addr, &painted));
        }
    }
}
