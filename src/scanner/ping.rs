use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;

/// Decides whether a single address answers within `timeout`.
#[async_trait]
pub trait ReachabilityChecker: Send + Sync {
    async fn is_reachable(&self, addr: Ipv4Addr, timeout: Duration) -> bool;
}

#[cfg(windows)]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);
#[cfg(not(windows))]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Runs the platform `ping` utility once per address.
#[derive(Debug, Clone, Default)]
pub struct SystemPing;

impl SystemPing {
    fn command(addr: Ipv4Addr, timeout: Duration) -> Command {
        let mut command = Command::new("ping");
        #[cfg(windows)]
        let (count_flag, wait_flag, wait) = ("-n", "-w", timeout.as_millis().to_string());
        #[cfg(target_os = "macos")]
        let (count_flag, wait_flag, wait) = ("-c", "-W", timeout.as_millis().to_string());
        #[cfg(all(not(windows), not(target_os = "macos")))]
        let (count_flag, wait_flag, wait) = ("-c", "-W", timeout.as_secs().max(1).to_string());
        command.args([count_flag, "1", wait_flag, wait.as_str()]);
        command
            .arg(addr.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ReachabilityChecker for SystemPing {
    async fn is_reachable(&self, addr: Ipv4Addr, timeout: Duration) -> bool {
        return match Self::command(addr, timeout).output().await {
            Ok(output) => has_reply(&String::from_utf8_lossy(&output.stdout)),
            Err(error) => {
                tracing::debug!("ping {} could not run: {}", addr, error);
                false
            }
        };
    }
}

/// Looks for a `ttl=` field, which every echo reply line carries.
pub fn has_reply(output: &str) -> bool {
    static TTL: OnceLock<regex::Regex> = OnceLock::new();
    TTL.get_or_init(|| regex::Regex::new("(?i)ttl=\\d{2}").unwrap())
        .is_match(output)
}
