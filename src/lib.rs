//! AbuseFinder Library
//!
//! A Rust library for finding where to report abuse of a domain name. Given a
//! domain it reports either:
//!
//! - the shared hosting platform serving it (GitHub Pages, Netlify, ...), or
//! - the abuse contacts of the domain's registrar and of the host behind its
//!   first resolved address.
//!
//! WHOIS and DNS are injected through the [`WhoisLookup`] and [`HostResolver`]
//! traits, so the whole pipeline runs offline with [`CannedWhois`] and
//! [`StaticResolver`].
//!
//! # Example
//!
//! ```rust,no_run
//! use abusefinder::{CollectingSink, Resolver, StaticResolver, CannedWhois};
//!
//! # async fn demo() -> abusefinder::Result<()> {
//! let whois = CannedWhois::new().with_response("example.com", "abuse@example.com");
//! let dns = StaticResolver::new().with_answer("example.com", vec!["192.0.2.1".parse().unwrap()]);
//! let mut sink = CollectingSink::default();
//! let result = Resolver::new(whois, dns).run("example.com", &mut sink).await?;
//! println!("{:?}", result.registrar);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod classify;
pub mod cli;
pub mod config;
pub mod contacts;
pub mod dns;
pub mod domain_utils;
pub mod emails;
pub mod errors;
pub mod output;
pub mod resolve;
pub mod rules;
pub mod whois;

// Re-export commonly used types and functions for convenience
pub use classify::{abuse_contacts, classify_shared_host, classify_whois_text};
pub use contacts::ContactDetails;
pub use dns::{HostResolver, StaticResolver, SystemResolver};
pub use errors::{AbuseFinderError, ErrorCategory, Result};
pub use output::{JsonReporter, TextReporter};
pub use resolve::{CollectingSink, Phase, PhaseReport, ReportSink, ResolutionResult, Resolver};
pub use rules::Registry;
pub use whois::{CannedWhois, NetworkWhois, SystemWhois, WhoisLookup};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
