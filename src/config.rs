//! Configuration management for abusefinder.
//!
//! Defaults, overridden by `ABUSEFINDER_*` environment variables, overridden
//! by command-line flags. Centralizes the collaborator timeouts and the host
//! address selection policy.

use std::net::IpAddr;
use std::time::Duration;

use crate::cli::Cli;
use crate::errors::{AbuseFinderError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// WHOIS / DNS collaborator settings
    pub network: NetworkConfig,

    /// Orchestration settings
    pub resolve: ResolveConfig,
}

/// Which WHOIS client to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhoisBackend {
    /// Spawn the system `whois` utility.
    System,
    /// Built-in port-43 client following referrals.
    Native,
}

/// Network-related configuration options
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Timeout for a whole WHOIS lookup (process run or each socket step)
    pub whois_timeout: Duration,

    /// Timeout for the forward DNS lookup
    pub dns_timeout: Duration,

    pub whois_backend: WhoisBackend,

    /// Program spawned by the system backend
    pub whois_program: String,

    /// First server asked by the native backend
    pub whois_bootstrap_server: String,

    /// Maximum number of servers visited by the native backend
    pub max_whois_depth: usize,

    /// Echo shell-equivalent commands on stderr
    pub show_commands: bool,
}

/// Which resolved addresses get a host lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostSelection {
    /// Only the first address returned by the resolver.
    #[default]
    First,
    /// Every distinct address, in resolver order.
    All,
}

impl HostSelection {
    /// Addresses to look up, in resolver order.
    pub fn select(&self, addresses: &[IpAddr]) -> Vec<IpAddr> {
        match self {
            HostSelection::First => addresses.iter().take(1).copied().collect(),
            HostSelection::All => {
                let mut out: Vec<IpAddr> = Vec::with_capacity(addresses.len());
                for a in addresses {
                    if !out.contains(a) {
                        out.push(*a);
                    }
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResolveConfig {
    pub host_selection: HostSelection,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            whois_timeout: Duration::from_secs(30),
            dns_timeout: Duration::from_secs(5),
            whois_backend: WhoisBackend::System,
            whois_program: "whois".to_string(),
            whois_bootstrap_server: "whois.iana.org".to_string(),
            max_whois_depth: 4,
            show_commands: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = lookup("ABUSEFINDER_WHOIS_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.network.whois_timeout = Duration::from_secs(secs);
        }

        if let Some(secs) =
            lookup("ABUSEFINDER_DNS_TIMEOUT_SECS").and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.network.dns_timeout = Duration::from_secs(secs);
        }

        if let Some(program) = lookup("ABUSEFINDER_WHOIS_PROGRAM")
            && !program.trim().is_empty()
        {
            config.network.whois_program = program.trim().to_string();
        }

        if let Some(depth) =
            lookup("ABUSEFINDER_MAX_WHOIS_DEPTH").and_then(|v| v.trim().parse::<usize>().ok())
        {
            config.network.max_whois_depth = depth;
        }

        config
    }

    /// Merge with CLI arguments, giving CLI precedence
    pub fn merge_with_cli(&mut self, cli: &Cli) {
        if let Some(secs) = cli.whois_timeout {
            self.network.whois_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = cli.dns_timeout {
            self.network.dns_timeout = Duration::from_secs(secs);
        }
        if cli.native_whois {
            self.network.whois_backend = WhoisBackend::Native;
        }
        if cli.show_commands {
            self.network.show_commands = true;
        }
        if cli.all_addresses {
            self.resolve.host_selection = HostSelection::All;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.network.whois_timeout.is_zero() {
            return Err(AbuseFinderError::configuration(
                "network.whois_timeout must be greater than 0",
            ));
        }
        if self.network.dns_timeout.is_zero() {
            return Err(AbuseFinderError::configuration(
                "network.dns_timeout must be greater than 0",
            ));
        }
        if self.network.max_whois_depth == 0 {
            return Err(AbuseFinderError::configuration(
                "network.max_whois_depth must be at least 1",
            ));
        }
        if self.network.whois_program.is_empty() {
            return Err(AbuseFinderError::configuration(
                "network.whois_program must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.dns_timeout, Duration::from_secs(5));
        assert_eq!(config.network.whois_timeout, Duration::from_secs(30));
        assert_eq!(config.network.whois_backend, WhoisBackend::System);
        assert_eq!(config.resolve.host_selection, HostSelection::First);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.network.dns_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.max_whois_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_loading() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ABUSEFINDER_WHOIS_TIMEOUT_SECS", "12"),
            ("ABUSEFINDER_DNS_TIMEOUT_SECS", " 3 "),
            ("ABUSEFINDER_WHOIS_PROGRAM", "/usr/local/bin/whois"),
            ("ABUSEFINDER_MAX_WHOIS_DEPTH", "not-a-number"),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.network.whois_timeout, Duration::from_secs(12));
        assert_eq!(config.network.dns_timeout, Duration::from_secs(3));
        assert_eq!(config.network.whois_program, "/usr/local/bin/whois");
        assert_eq!(config.network.max_whois_depth, 4);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let vars: HashMap<&str, &str> = HashMap::from([("ABUSEFINDER_DNS_TIMEOUT_SECS", "9")]);
        let mut config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        let cli = Cli::parse_from([
            "abusefinder",
            "example.com",
            "--dns-timeout",
            "2",
            "--native-whois",
            "--all-addresses",
        ]);
        config.merge_with_cli(&cli);
        assert_eq!(config.network.dns_timeout, Duration::from_secs(2));
        assert_eq!(config.network.whois_backend, WhoisBackend::Native);
        assert_eq!(config.resolve.host_selection, HostSelection::All);
    }
}
