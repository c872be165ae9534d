//! Resolution orchestrator.
//!
//! Runs the phases strictly in sequence:
//!   1. registrable root + shared-host classification
//!   2. shared host matched: report it and stop (no WHOIS, no DNS)
//!   3. registrar WHOIS of the root, classified and reported
//!   4. DNS of the original host, WHOIS of the selected address(es),
//!      classified and reported
//!
//! Each phase is handed to the [`ReportSink`] as soon as it completes, so a
//! failure in a later phase still leaves the earlier blocks visible. Any
//! collaborator failure ends the run with a phase-context error.

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::classify::{abuse_contacts, classify_shared_host};
use crate::config::HostSelection;
use crate::contacts::ContactDetails;
use crate::dns::HostResolver;
use crate::domain_utils::{clean_domain_input, registrable_domain};
use crate::errors::{AbuseFinderError, Result};
use crate::rules::Registry;
use crate::whois::WhoisLookup;

/// Which party a block of contacts belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    SharedHost,
    Registrar,
    Host {
        address: IpAddr,
        /// Several host blocks are reported, so the label names the address.
        #[serde(skip)]
        one_of_many: bool,
    },
}

impl Phase {
    pub fn label(&self) -> String {
        match self {
            Phase::SharedHost => "Report abuse to shared hosting provider:".to_string(),
            Phase::Registrar => "Report abuse to domain registrar:".to_string(),
            Phase::Host {
                one_of_many: false, ..
            } => "Report abuse to host:".to_string(),
            Phase::Host {
                address,
                one_of_many: true,
            } => format!("Report abuse to host ({address}):"),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One completed phase, as handed to the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct PhaseReport<'a> {
    pub phase: Phase,
    /// Domain root or address the contacts were derived from.
    pub subject: &'a str,
    pub contacts: &'a ContactDetails,
}

/// Receives each phase as soon as it completes.
pub trait ReportSink {
    fn report(&mut self, report: &PhaseReport<'_>) -> std::io::Result<()>;
}

/// Contacts found for one host address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostContacts {
    pub address: IpAddr,
    pub contacts: ContactDetails,
}

/// Everything one successful run produced.
///
/// Either `shared_host` is set, or `registrar` and at least one `hosts` entry
/// are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub domain: String,
    pub root: String,
    pub shared_host: Option<ContactDetails>,
    pub registrar: Option<ContactDetails>,
    pub hosts: Vec<HostContacts>,
}

impl ResolutionResult {
    fn new(domain: String, root: String) -> Self {
        Self {
            domain,
            root,
            shared_host: None,
            registrar: None,
            hosts: Vec::new(),
        }
    }

    pub fn is_shared_host(&self) -> bool {
        self.shared_host.is_some()
    }
}

/// Abuse-contact resolver over injectable WHOIS and DNS collaborators.
pub struct Resolver<'r, W, D> {
    registry: &'r Registry,
    whois: W,
    dns: D,
    selection: HostSelection,
}

impl<W, D> Resolver<'static, W, D>
where
    W: WhoisLookup,
    D: HostResolver,
{
    /// Resolver over the built-in rule tables, first-address host selection.
    pub fn new(whois: W, dns: D) -> Self {
        Self {
            registry: Registry::builtin(),
            whois,
            dns,
            selection: HostSelection::First,
        }
    }
}

impl<'r, W, D> Resolver<'r, W, D>
where
    W: WhoisLookup,
    D: HostResolver,
{
    pub fn with_registry<'n>(self, registry: &'n Registry) -> Resolver<'n, W, D> {
        Resolver {
            registry,
            whois: self.whois,
            dns: self.dns,
            selection: self.selection,
        }
    }

    pub fn with_host_selection(mut self, selection: HostSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn whois(&self) -> &W {
        &self.whois
    }

    pub fn dns(&self) -> &D {
        &self.dns
    }

    /// Resolve the abuse contacts for `domain`, reporting each phase to
    /// `sink` as it completes.
    pub async fn run<S>(&self, domain: &str, sink: &mut S) -> Result<ResolutionResult>
    where
        S: ReportSink + ?Sized,
    {
        let host = clean_domain_input(domain)?;
        let root = registrable_domain(&host);
        log::info!("resolving abuse contacts for {host} (registrable root {root})");
        let mut result = ResolutionResult::new(host.clone(), root.clone());

        let shared = classify_shared_host(self.registry, &root);
        if shared.is_shared_host() {
            log::info!("{root} is served by a shared host; skipping WHOIS");
            sink.report(&PhaseReport {
                phase: Phase::SharedHost,
                subject: &root,
                contacts: &shared.contacts,
            })?;
            result.shared_host = Some(shared.contacts);
            return Ok(result);
        }

        let registrar = self
            .lookup_contacts(&root)
            .await
            .map_err(AbuseFinderError::registrar_lookup)?;
        sink.report(&PhaseReport {
            phase: Phase::Registrar,
            subject: &root,
            contacts: &registrar,
        })?;
        result.registrar = Some(registrar);

        let addresses = self
            .dns
            .resolve(&host)
            .await
            .map_err(AbuseFinderError::host_resolution)?;
        if addresses.is_empty() {
            return Err(AbuseFinderError::host_resolution(
                AbuseFinderError::NoAddresses { domain: host },
            ));
        }

        let selected = self.selection.select(&addresses);
        let one_of_many = selected.len() > 1;
        for address in selected {
            let subject = address.to_string();
            let contacts = self
                .lookup_contacts(&subject)
                .await
                .map_err(AbuseFinderError::host_lookup)?;
            sink.report(&PhaseReport {
                phase: Phase::Host {
                    address,
                    one_of_many,
                },
                subject: &subject,
                contacts: &contacts,
            })?;
            result.hosts.push(HostContacts { address, contacts });
        }

        Ok(result)
    }

    async fn lookup_contacts(&self, subject: &str) -> Result<ContactDetails> {
        let text = self.whois.lookup(subject).await?;
        Ok(abuse_contacts(self.registry, subject, &text))
    }
}

/// Sink that keeps owned copies of every report, in order.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub reports: Vec<(Phase, String, ContactDetails)>,
}

impl ReportSink for CollectingSink {
    fn report(&mut self, report: &PhaseReport<'_>) -> std::io::Result<()> {
        self.reports.push((
            report.phase,
            report.subject.to_string(),
            report.contacts.clone(),
        ));
        Ok(())
    }
}
