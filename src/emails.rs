use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Loose e-mail syntax used to pull candidates out of free text.
static EMAIL_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,})").unwrap());

/// E-mail addresses found in a WHOIS response, with an occurrence count
/// (larger value means the address is repeated more often in the record).
#[derive(Default, Debug, Clone)]
pub struct EmailSet {
    map: HashMap<String, u32>,
}

impl EmailSet {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Collect every plausible address appearing in `text`.
    pub fn scan(text: &str) -> Self {
        let mut set = Self::new();
        for cap in EMAIL_IN_TEXT.captures_iter(text) {
            let email = cap[1].trim_end_matches('.');
            if is_plausible_email(email) {
                set.bump(email);
            }
        }
        set
    }

    /// Increase the count by 1 (creates entry if absent).
    pub fn bump<S: AsRef<str>>(&mut self, email: S) {
        let e = canonical(email.as_ref());
        *self.map.entry(e).or_insert(0) += 1;
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// If any entry has the local part `abuse`, keep only those.
    pub fn prefer_abuse_local_part(&mut self) {
        let has_abuse = self.map.keys().any(|e| e.starts_with("abuse@"));
        if has_abuse {
            self.map.retain(|e, _| e.starts_with("abuse@"));
        }
    }

    /// Consume and return addresses ordered by count desc, then lexicographic.
    pub fn into_sorted(self) -> Vec<(String, u32)> {
        let mut v: Vec<_> = self.map.into_iter().collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        v
    }

    /// Apply the abuse preference and return the ranked addresses only.
    pub fn finalize(mut self) -> Vec<String> {
        self.prefer_abuse_local_part();
        self.into_sorted().into_iter().map(|(e, _)| e).collect()
    }
}

/// Lightweight plausibility check (syntax only).
pub fn is_plausible_email(e: &str) -> bool {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9._%+\-]+@[A-Z0-9.\-]+\.[A-Z]{2,}$").unwrap());
    e.len() <= 254 && RE.is_match(e)
}

/// Canonicalization used internally (lowercase, trailing dot removed).
fn canonical(s: &str) -> String {
    s.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_merges_case_variants() {
        let set = EmailSet::scan("Tech: Hostmaster@Example.org\nAdmin: hostmaster@example.org.");
        let v = set.into_sorted();
        assert_eq!(v, vec![("hostmaster@example.org".to_string(), 2)]);
    }

    #[test]
    fn test_prefer_abuse() {
        let text = "Registrant: owner@example.net\nAbuse: ABUSE@example.net\nTech: noc@example.net";
        assert_eq!(EmailSet::scan(text).finalize(), vec!["abuse@example.net"]);
    }

    #[test]
    fn test_ranking_without_abuse() {
        let text = "a: noc@host.test\nb: ops@host.test\nc: ops@host.test";
        assert_eq!(
            EmailSet::scan(text).finalize(),
            vec!["ops@host.test", "noc@host.test"]
        );
    }

    #[test]
    fn test_plausibility() {
        assert!(is_plausible_email("abuse@example.com"));
        assert!(!is_plausible_email("abuse@localhost"));
        assert!(!is_plausible_email("not an email"));
    }

    #[test]
    fn test_scan_ignores_text_without_addresses() {
        assert!(EmailSet::scan("Domain Name: EXAMPLE.COM\nStatus: active").is_empty());
    }
}
