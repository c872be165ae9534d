//! Unified error handling.
//!
//! Every fallible operation in the crate returns [`Result`], backed by the
//! `thiserror`-derived [`AbuseFinderError`]. The model has:
//!   * Typed variants for the I/O boundaries (WHOIS, DNS, output)
//!   * Phase-context variants wrapping the cause of a fatal run failure
//!   * A coarse categorization layer (`ErrorCategory`) for structured output
//!   * Helper constructors
//!
//! Classification itself cannot fail: only the collaborators (process
//! invocation, sockets, DNS) and the output sink produce errors, and every one
//! of them terminates the run.

use std::io;

use thiserror::Error;

/// High-level classification for structured reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum AbuseFinderError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Invalid domain name '{domain}': {reason}")]
    InvalidDomain { domain: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ----------------------------- WHOIS ------------------------------------
    #[error("failed to execute {program}: {source}")]
    WhoisSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("whois {query} exited with {status}: {stderr}")]
    WhoisExit {
        query: String,
        status: String,
        stderr: String,
    },

    #[error("WHOIS query '{query}' to server '{server}' failed: {reason}")]
    WhoisQuery {
        server: String,
        query: String,
        reason: String,
    },

    #[error("WHOIS query timed out after {seconds}s: {query}")]
    WhoisTimeout { query: String, seconds: u64 },

    // ------------------------------ DNS -------------------------------------
    #[error("DNS lookup failed for {domain}: {reason}")]
    DnsResolution { domain: String, reason: String },

    #[error("DNS query timed out after {seconds}s: {query}")]
    DnsTimeout { query: String, seconds: u64 },

    #[error("no addresses found for {domain}")]
    NoAddresses { domain: String },

    // ------------------------- Phase context --------------------------------
    #[error("failed to get registrar abuse details: {source}")]
    RegistrarLookup {
        #[source]
        source: Box<AbuseFinderError>,
    },

    #[error("failed to resolve host: {source}")]
    HostResolution {
        #[source]
        source: Box<AbuseFinderError>,
    },

    #[error("failed to get host abuse details: {source}")]
    HostLookup {
        #[source]
        source: Box<AbuseFinderError>,
    },

    // ----------------------------- Output -----------------------------------
    #[error("failed to write report: {source}")]
    Output {
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AbuseFinderError {
    /// Categorize the error for structured output.
    ///
    /// Phase-context wrappers report the category of their cause.
    pub fn category(&self) -> ErrorCategory {
        use AbuseFinderError::*;
        match self {
            InvalidDomain { .. } | Configuration { .. } => ErrorCategory::Input,

            WhoisSpawn { .. }
            | WhoisExit { .. }
            | WhoisQuery { .. }
            | WhoisTimeout { .. }
            | DnsResolution { .. }
            | DnsTimeout { .. }
            | NoAddresses { .. } => ErrorCategory::Network,

            RegistrarLookup { source } | HostResolution { source } | HostLookup { source } => {
                source.category()
            }

            Output { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn invalid_domain(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn whois_query(
        server: impl Into<String>,
        query: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::WhoisQuery {
            server: server.into(),
            query: query.into(),
            reason: reason.into(),
        }
    }

    pub fn whois_timeout(query: impl Into<String>, seconds: u64) -> Self {
        Self::WhoisTimeout {
            query: query.into(),
            seconds,
        }
    }

    pub fn dns_resolution(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DnsResolution {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn dns_timeout(query: impl Into<String>, seconds: u64) -> Self {
        Self::DnsTimeout {
            query: query.into(),
            seconds,
        }
    }

    pub fn registrar_lookup(cause: AbuseFinderError) -> Self {
        Self::RegistrarLookup {
            source: Box::new(cause),
        }
    }

    pub fn host_resolution(cause: AbuseFinderError) -> Self {
        Self::HostResolution {
            source: Box::new(cause),
        }
    }

    pub fn host_lookup(cause: AbuseFinderError) -> Self {
        Self::HostLookup {
            source: Box::new(cause),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, AbuseFinderError>;

/// Writes to the report sink are the only plain I/O the orchestrator does.
impl From<io::Error> for AbuseFinderError {
    fn from(source: io::Error) -> Self {
        AbuseFinderError::Output { source }
    }
}
