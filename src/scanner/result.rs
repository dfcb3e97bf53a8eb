use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No reply seen, the address looks free.
    Available,
    /// The host replied.
    Occupied,
}

impl Status {
    pub fn from_reply(replied: bool) -> Self {
        if replied {
            Status::Occupied
        } else {
            Status::Available
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Available => write!(f, "√ available"),
            Status::Occupied => write!(f, "× occupied"),
        }
    }
}

/// Outcome of every probe, kept in completion order per partition.
#[derive(Debug, Clone, Default)]
pub struct ProbeResult {
    statuses: HashMap<Ipv4Addr, Status>,
    available: Vec<Ipv4Addr>,
    occupied: Vec<Ipv4Addr>,
}

impl ProbeResult {
    /// Stores the outcome of `addr`. An address is recorded only once; a
    /// second call returns `false` and changes nothing.
    pub fn record(&mut self, addr: Ipv4Addr, status: Status) -> bool {
        if self.statuses.contains_key(&addr) {
            return false;
        }
        self.statuses.insert(addr, status);
        match status {
            Status::Available => self.available.push(addr),
            Status::Occupied => self.occupied.push(addr),
        }
        true
    }

    pub fn get(&self, addr: &Ipv4Addr) -> Option<Status> {
        self.statuses.get(addr).copied()
    }

    pub fn available(&self) -> &[Ipv4Addr] {
        &self.available
    }

    pub fn occupied(&self) -> &[Ipv4Addr] {
        &self.occupied
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }
}

#[cfg(test)]
pub mod result_test {
    use crate::scanner::result::{ProbeResult, Status};
    use std::net::Ipv4Addr;

    #[test]
    fn status_text_test() {
        assert_eq!(Status::Available.to_string(), "√ available");
        assert_eq!(Status::Occupied.to_string(), "× occupied");
        assert_eq!(Status::from_reply(true), Status::Occupied);
        assert_eq!(Status::from_reply(false), Status::Available);
    }

    #[test]
    fn record_once_test() {
        let addr: Ipv4Addr = "10.0.0.1".parse().unwrap();
        let mut result = ProbeResult::default();
        assert!(result.record(addr, Status::Occupied));
        assert!(!result.record(addr, Status::Available));
        assert_eq!(result.get(&addr), Some(Status::Occupied));
        assert_eq!(result.len(), 1);
        assert!(result.available().is_empty());
        assert_eq!(result.occupied(), [addr]);
    }
}
