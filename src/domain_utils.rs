//! Domain utilities with Public Suffix List integration.
//!
//! The registrable root decides both which shared-host rules apply and what
//! gets sent to the registrar WHOIS lookup:
//! - www.blog.example.co.uk -> example.co.uk
//! - subdomain.example.com -> example.com
//! - mysite.github.io -> mysite.github.io (github.io is itself a public suffix)
//!
//! When the PSL has no answer (single labels, bare suffixes) the cleaned
//! input is used unchanged.

use psl::domain_str;

use crate::errors::{AbuseFinderError, Result};

/// Normalize user input into a bare lower-case host name.
///
/// Accepts values pasted from a browser: scheme, path and port are removed,
/// as is a trailing root dot.
pub fn clean_domain_input(input: &str) -> Result<String> {
    let lowered = input.trim().to_lowercase();
    let without_scheme = match lowered.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => lowered.as_str(),
    };
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .trim()
        .trim_end_matches('.')
        .to_string();

    if host.is_empty() {
        return Err(AbuseFinderError::invalid_domain(input, "empty domain"));
    }
    if host.starts_with('.') || host.contains("..") {
        return Err(AbuseFinderError::invalid_domain(input, "empty label"));
    }
    if host.chars().any(char::is_whitespace) {
        return Err(AbuseFinderError::invalid_domain(input, "contains whitespace"));
    }

    Ok(host)
}

/// RFC 3986 scheme syntax: a letter followed by letters, digits, `+`, `-`, `.`.
fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Effective registrable domain (eTLD+1) of an already cleaned host name.
///
/// Never fails: without a PSL answer the host itself is returned.
pub fn registrable_domain(host: &str) -> String {
    match domain_str(host) {
        Some(root) => root.to_string(),
        None => {
            log::debug!("no registrable domain for {host}; using it unchanged");
            host.to_string()
        }
    }
}

/// True when `root` is `suffix` or one of its subdomains (case-insensitive).
pub fn is_within(root: &str, suffix: &str) -> bool {
    let root = root.trim_end_matches('.').to_ascii_lowercase();
    let suffix = suffix.to_ascii_lowercase();
    root == suffix || root.ends_with(&format!(".{suffix}"))
}
