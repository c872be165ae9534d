//! High-level application orchestration layer.
//!
//! This module provides the CLI-facing `App` façade. It loads configuration,
//! builds the WHOIS and DNS collaborators, runs the [`Resolver`] and renders
//! either the text report (streamed phase by phase) or one JSON document.
//!
//! Major steps in `App::run`:
//!   1. Config load / validation
//!   2. Collaborator construction (system or native WHOIS, system DNS)
//!   3. Resolution with the chosen report sink
//!   4. Exit code selection

use std::io;

use crate::cli::Cli;
use crate::config::{Config, WhoisBackend};
use crate::dns::SystemResolver;
use crate::errors::{AbuseFinderError, Result};
use crate::output::{JsonReporter, TextReporter, should_use_colors};
use crate::resolve::Resolver;
use crate::whois::{NetworkWhois, SystemWhois, WhoisLookup};

/// Application façade.
pub struct App;

impl App {
    /// Execute the end-to-end abuse contact lookup.
    ///
    /// Returns: intended process exit code. In text mode a failed run is
    /// returned as `Err` for `main` to print; in JSON mode the error is part
    /// of the document and the exit code is 1.
    pub async fn run(cli: &Cli) -> Result<i32> {
        let config = Self::load_config(cli)?;
        log::debug!("configuration: {config:?}");

        let whois = Self::build_whois(&config);
        let dns = SystemResolver::new(config.network.dns_timeout)
            .show_commands(config.network.show_commands);
        let resolver =
            Resolver::new(whois, dns).with_host_selection(config.resolve.host_selection);

        if cli.json {
            let mut sink = JsonReporter::new();
            let outcome = resolver.run(&cli.domain, &mut sink).await;
            if let Err(e) = &outcome {
                log::error!("{e}");
            }
            let document = sink.into_document(&cli.domain, &outcome);
            let json = document
                .to_json()
                .map_err(|e| AbuseFinderError::internal(e.to_string()))?;
            println!("{json}");
            return Ok(if outcome.is_ok() { 0 } else { 1 });
        }

        let mut sink = TextReporter::new(io::stdout(), should_use_colors(cli.no_color));
        let result = resolver.run(&cli.domain, &mut sink).await?;
        log::info!(
            "done: {} ({} host block(s))",
            result.root,
            result.hosts.len()
        );
        Ok(0)
    }

    fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::from_env();
        config.merge_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn build_whois(config: &Config) -> Box<dyn WhoisLookup> {
        let net = &config.network;
        match net.whois_backend {
            WhoisBackend::System => Box::new(
                SystemWhois::new(net.whois_program.clone(), net.whois_timeout)
                    .show_commands(net.show_commands),
            ),
            WhoisBackend::Native => Box::new(
                NetworkWhois::new(
                    net.whois_bootstrap_server.clone(),
                    net.whois_timeout,
                    net.max_whois_depth,
                )
                .show_commands(net.show_commands),
            ),
        }
    }
}
