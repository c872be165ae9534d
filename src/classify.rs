//! Classifiers over the matcher registry.
//!
//! Pure functions: they cannot fail and keep no state between calls, so the
//! same input always yields the same mapping.

use crate::contacts::{ContactDetails, EMAIL_KEY};
use crate::emails::EmailSet;
use crate::rules::{Query, Registry};

/// Outcome of the shared-host check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedHostMatch {
    pub contacts: ContactDetails,
}

impl SharedHostMatch {
    /// At least one platform rule matched.
    pub fn is_shared_host(&self) -> bool {
        !self.contacts.is_empty()
    }
}

/// Apply every suffix rule to a registrable root.
pub fn classify_shared_host(registry: &Registry, root: &str) -> SharedHostMatch {
    SharedHostMatch {
        contacts: registry.apply(&Query::shared_host(root)),
    }
}

/// Apply every text rule to a WHOIS response.
pub fn classify_whois_text(registry: &Registry, subject: &str, text: &str) -> ContactDetails {
    registry.apply(&Query::whois(subject, text))
}

/// Generic e-mail scan used when no provider rule matched.
///
/// Returns a single `Email` entry listing the ranked addresses, or an empty
/// mapping when the text holds none. When any `abuse@` address is present
/// only those are listed; the other addresses are dropped on purpose.
pub fn fallback_emails(text: &str) -> ContactDetails {
    let found = EmailSet::scan(text).finalize();
    let mut details = ContactDetails::new();
    if !found.is_empty() {
        details.insert(EMAIL_KEY, found.join(", "));
    }
    details
}

/// Full classification of one WHOIS response: provider rules, then the
/// fallback only if they found nothing, then the "nothing found" entry.
/// The result is never empty.
pub fn abuse_contacts(registry: &Registry, subject: &str, text: &str) -> ContactDetails {
    let specific = classify_whois_text(registry, subject, text);
    if !specific.is_empty() {
        return specific;
    }
    log::debug!("no provider rule matched {subject}; scanning for e-mail addresses");
    let fallback = fallback_emails(text);
    if fallback.is_empty() {
        log::info!("no contact details found in WHOIS for {subject}");
    }
    fallback.or_not_found()
}
