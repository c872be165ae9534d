/*!
Forward DNS for the host phase.

The orchestrator only needs "domain -> addresses"; [`SystemResolver`] answers
that with trust-dns-resolver using the system configuration, and
[`StaticResolver`] with fixed answers for tests.
*/

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};

use crate::errors::{AbuseFinderError, Result};

/// Resolves a host name to its addresses, in resolver order.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>>;
}

#[async_trait]
impl<T: HostResolver + ?Sized> HostResolver for Box<T> {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        self.as_ref().resolve(domain).await
    }
}

/// A/AAAA lookups through trust-dns-resolver.
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
    show_commands: bool,
}

impl SystemResolver {
    /// Use the system resolver configuration, or public defaults if it cannot
    /// be read.
    pub fn new(timeout: Duration) -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("could not read system DNS configuration ({e}); using defaults");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self {
            resolver,
            timeout,
            show_commands: false,
        }
    }

    pub fn show_commands(mut self, show: bool) -> Self {
        self.show_commands = show;
        self
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        if self.show_commands {
            eprintln!("(cmd) host {domain}");
        }
        log::debug!("resolving {domain}");

        match timeout(self.timeout, self.resolver.lookup_ip(domain)).await {
            Ok(Ok(answer)) => {
                let addrs: Vec<IpAddr> = answer.iter().collect();
                log::debug!("{domain} resolved to {addrs:?}");
                Ok(addrs)
            }
            Ok(Err(e)) => Err(AbuseFinderError::dns_resolution(domain, e.to_string())),
            Err(_) => Err(AbuseFinderError::dns_timeout(domain, self.timeout.as_secs())),
        }
    }
}

/// Fixed answers keyed by domain. Unknown domains fail like NXDOMAIN.
#[derive(Debug, Default)]
pub struct StaticResolver {
    answers: HashMap<String, Vec<IpAddr>>,
    calls: Mutex<Vec<String>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, domain: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        self.answers.insert(domain.into(), addrs);
        self
    }

    /// Domains resolved so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(domain.to_string());
        }
        self.answers
            .get(domain)
            .cloned()
            .ok_or_else(|| AbuseFinderError::dns_resolution(domain, "NXDOMAIN"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_answers_in_order() {
        let a: IpAddr = "192.0.2.10".parse().unwrap();
        let b: IpAddr = "2001:db8::10".parse().unwrap();
        let resolver = StaticResolver::new().with_answer("example.com", vec![a, b]);

        assert_eq!(resolver.resolve("example.com").await.unwrap(), vec![a, b]);
        let err = resolver.resolve("missing.test").await.unwrap_err();
        assert!(err.to_string().contains("NXDOMAIN"));
        assert_eq!(resolver.calls(), vec!["example.com", "missing.test"]);
    }

    #[tokio::test]
    async fn system_resolver_rejects_invalid_tld() {
        let resolver = SystemResolver::new(Duration::from_secs(5));
        // Network dependent: .invalid is reserved (RFC 2606) and never
        // resolves, and without a resolver the lookup fails as well.
        assert!(resolver.resolve("abusefinder.invalid").await.is_err());
    }
}
