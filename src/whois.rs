use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;

use crate::errors::{AbuseFinderError, Result};

/// Source of raw WHOIS text for a domain or IP address.
///
/// Implementations surface any failure (spawn error, non-zero exit, socket
/// error, timeout) as an error; the caller decides whether it is fatal.
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    async fn lookup(&self, subject: &str) -> Result<String>;
}

#[async_trait]
impl<T: WhoisLookup + ?Sized> WhoisLookup for Box<T> {
    async fn lookup(&self, subject: &str) -> Result<String> {
        self.as_ref().lookup(subject).await
    }
}

/// WHOIS TCP port.
const WHOIS_PORT: u16 = 43;

// ----------------------------------------------------------------------------
// System `whois` utility
// ----------------------------------------------------------------------------

/// Runs the system `whois` client and returns its combined stdout + stderr.
#[derive(Debug, Clone)]
pub struct SystemWhois {
    program: String,
    timeout: Duration,
    show_commands: bool,
}

impl SystemWhois {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
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
impl WhoisLookup for SystemWhois {
    async fn lookup(&self, subject: &str) -> Result<String> {
        if self.show_commands {
            eprintln!("(cmd) {} {subject}", self.program);
        }
        log::debug!("running {} {subject}", self.program);

        let mut cmd = Command::new(&self.program);
        cmd.arg(subject)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(AbuseFinderError::WhoisSpawn {
                    program: self.program.clone(),
                    source,
                });
            }
            Err(_) => {
                return Err(AbuseFinderError::whois_timeout(
                    subject,
                    self.timeout.as_secs(),
                ));
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(AbuseFinderError::WhoisExit {
                query: subject.to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if !stderr.trim().is_empty() {
            text.push('\n');
            text.push_str(&stderr);
        }
        log::trace!("whois {subject} returned {} bytes", text.len());
        Ok(text)
    }
}

// ----------------------------------------------------------------------------
// Native port-43 client
// ----------------------------------------------------------------------------

/// Port-43 client starting at a bootstrap server (IANA by default) and
/// following referrals up to `max_depth` servers.
#[derive(Debug, Clone)]
pub struct NetworkWhois {
    bootstrap: String,
    timeout: Duration,
    max_depth: usize,
    show_commands: bool,
}

impl NetworkWhois {
    pub fn new(bootstrap: impl Into<String>, timeout: Duration, max_depth: usize) -> Self {
        Self {
            bootstrap: bootstrap.into(),
            timeout,
            max_depth,
            show_commands: false,
        }
    }

    pub fn show_commands(mut self, show: bool) -> Self {
        self.show_commands = show;
        self
    }
}

#[async_trait]
impl WhoisLookup for NetworkWhois {
    async fn lookup(&self, subject: &str) -> Result<String> {
        let mut server = self.bootstrap.clone();
        let mut last: Option<String> = None;

        for depth in 0..self.max_depth.max(1) {
            if self.show_commands {
                eprintln!("(cmd) whois -h {server} {subject}");
            }
            log::debug!("WHOIS(depth={depth}) server={server} query={subject}");

            let resp = match simple_whois(&server, subject, self.timeout).await {
                Ok(r) => r,
                Err(e) => match last {
                    // A referral target failing still leaves a usable answer.
                    Some(prev) => {
                        log::warn!("WHOIS referral to {server} failed: {e}");
                        return Ok(prev);
                    }
                    None => {
                        return Err(AbuseFinderError::whois_query(
                            server,
                            subject,
                            e.to_string(),
                        ));
                    }
                },
            };

            let next = find_referral(&resp);
            last = Some(resp);
            match next {
                Some(n) if !n.eq_ignore_ascii_case(&server) => {
                    log::debug!("  referral to {n}");
                    server = n;
                }
                _ => break,
            }
        }

        last.ok_or_else(|| AbuseFinderError::internal("WHOIS referral loop produced no response"))
    }
}

/// Perform a basic WHOIS query (over TCP 43) with a timeout on each step.
///
/// Returns the raw textual response.
pub async fn simple_whois(server: &str, query: &str, to: Duration) -> anyhow::Result<String> {
    let mut stream = match timeout(to, TcpStream::connect((server, WHOIS_PORT))).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => return Err(anyhow!("connect error to {server}: {e}")),
        Err(_) => return Err(anyhow!("connect timeout to {server}")),
    };

    // Canonical WHOIS request: "<query>\r\n"
    let line = format!("{query}\r\n");
    timeout(to, stream.write_all(line.as_bytes()))
        .await
        .map_err(|_| anyhow!("write timeout to {server}"))??;

    let mut buf = Vec::new();
    timeout(to, stream.read_to_end(&mut buf))
        .await
        .map_err(|_| anyhow!("read timeout from {server}"))??;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// "refer: whois.verisign-grs.com" (IANA)
static RE_REFER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*refer:[ \t]*([A-Z0-9._\-]+)\s*$").unwrap());

/// "ReferralServer: whois://whois.ripe.net" (ARIN)
static RE_REFERRAL_SERVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*ReferralServer:[ \t]*whois://([A-Z0-9._\-]+)(?::43)?/?\s*$")
        .unwrap()
});

/// "Registrar WHOIS Server: whois.godaddy.com" (thin gTLD registries)
static RE_REGISTRAR_SERVER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*Registrar WHOIS Server:[ \t]*(?:whois://)?([A-Z0-9._\-]+)\s*$")
        .unwrap()
});

/// Next server to ask, if the response points elsewhere.
pub fn find_referral(resp: &str) -> Option<String> {
    [&*RE_REFER, &*RE_REFERRAL_SERVER, &*RE_REGISTRAR_SERVER]
        .iter()
        .find_map(|re| re.captures(resp))
        .and_then(|c| c.get(1).map(|m| m.as_str().to_ascii_lowercase()))
}

// ----------------------------------------------------------------------------
// Canned responses
// ----------------------------------------------------------------------------

/// Fixed responses keyed by subject, for tests and offline embedding.
///
/// Subjects without a response fail like an unreachable server. Every call is
/// recorded.
#[derive(Debug, Default)]
pub struct CannedWhois {
    responses: HashMap<String, std::result::Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl CannedWhois {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, subject: impl Into<String>, text: impl Into<String>) -> Self {
        self.responses.insert(subject.into(), Ok(text.into()));
        self
    }

    pub fn with_failure(mut self, subject: impl Into<String>, reason: impl Into<String>) -> Self {
        self.responses.insert(subject.into(), Err(reason.into()));
        self
    }

    /// Subjects looked up so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WhoisLookup for CannedWhois {
    async fn lookup(&self, subject: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(subject.to_string());
        }
        match self.responses.get(subject) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(reason)) => Err(AbuseFinderError::whois_query("canned", subject, reason)),
            None => Err(AbuseFinderError::whois_query(
                "canned",
                subject,
                "no canned response",
            )),
        }
    }
}
