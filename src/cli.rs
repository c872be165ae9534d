use clap::Parser;
use log::LevelFilter;

/// Command-line interface definition.
///
/// Verbosity levels:
/// 0 - silent (only the report and fatal errors)
/// 1 - errors (default)
/// 2 - warnings + errors
/// 3 - info
/// 4 - debug
/// 5 - trace
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Find where to report abuse for a domain: its registrar and host, or the shared platform serving it"
)]
pub struct Cli {
    /// Domain name to investigate (e.g. www.example.co.uk). URLs are accepted.
    pub domain: String,

    /// Verbosity level (0-5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Show approximate shell-equivalent commands
    #[arg(long)]
    pub show_commands: bool,

    /// Emit a JSON document instead of text
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Look up the host of every resolved address instead of only the first
    #[arg(long)]
    pub all_addresses: bool,

    /// Use the built-in WHOIS client instead of the system `whois` program
    #[arg(long)]
    pub native_whois: bool,

    /// WHOIS timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub whois_timeout: Option<u64>,

    /// DNS timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub dns_timeout: Option<u64>,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Log level implied by `--verbose`.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Off,
            1 => LevelFilter::Error,
            2 => LevelFilter::Warn,
            3 => LevelFilter::Info,
            4 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["abusefinder", "example.com"]);
        assert_eq!(cli.domain, "example.com");
        assert_eq!(cli.log_level(), LevelFilter::Error);
        assert!(!cli.json && !cli.all_addresses && !cli.native_whois);
    }

    #[test]
    fn verbosity_levels() {
        let cli = Cli::parse_from(["abusefinder", "example.com", "--verbose", "0"]);
        assert_eq!(cli.log_level(), LevelFilter::Off);
        let cli = Cli::parse_from(["abusefinder", "example.com", "--verbose=9"]);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
    }

    #[test]
    fn domain_is_required() {
        assert!(Cli::try_parse_from(["abusefinder"]).is_err());
    }
}
