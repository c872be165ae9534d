//! Matcher registry.
//!
//! Two disjoint, ordered rule tables drive classification:
//!   * suffix rules: recognise shared hosting platforms from a registrable root
//!   * text rules: recognise registrars / hosts from raw WHOIS text
//!
//! Applying a table evaluates every rule against the query and keeps every
//! match under the rule's name. There is no precedence between rules of the
//! same kind; two rules matching the same record both show up.
//!
//! The built-in tables live in [`builtin`]; new providers are added by
//! appending to them.

pub mod builtin;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::contacts::ContactDetails;
use crate::domain_utils::is_within;

/// Input to a rule table. Immutable once constructed.
#[derive(Debug, Clone)]
pub enum Query<'a> {
    /// Registrable root of the domain being checked for a shared host.
    SharedHost { root: &'a str },
    /// Raw WHOIS response for `subject` (a domain root or an IP address).
    Whois {
        subject: &'a str,
        text: &'a str,
        folded: String,
    },
}

impl<'a> Query<'a> {
    pub fn shared_host(root: &'a str) -> Self {
        Query::SharedHost { root }
    }

    pub fn whois(subject: &'a str, text: &'a str) -> Self {
        Query::Whois {
            subject,
            text,
            folded: text.to_lowercase(),
        }
    }

    /// The domain or IP address this query is about.
    pub fn subject(&self) -> &'a str {
        match self {
            Query::SharedHost { root } => *root,
            Query::Whois { subject, .. } => *subject,
        }
    }
}

/// A named predicate-plus-extractor pair.
pub trait Rule {
    fn name(&self) -> &str;

    /// Returns the extracted contact detail when the rule matches `query`.
    /// Rules never match queries of the other kind.
    fn evaluate(&self, query: &Query<'_>) -> Option<String>;
}

/// Apply every rule in order, collecting each match under its rule name.
pub fn apply_rules<R: Rule>(rules: &[R], query: &Query<'_>) -> ContactDetails {
    let mut details = ContactDetails::new();
    for rule in rules {
        if let Some(detail) = rule.evaluate(query) {
            log::debug!("rule '{}' matched {}", rule.name(), query.subject());
            details.insert(rule.name(), detail);
        }
    }
    details
}

// ----------------------------------------------------------------------------
// Suffix rules
// ----------------------------------------------------------------------------

/// Shared-host rule: matches when the root is, or sits under, one of
/// `suffixes`.
#[derive(Debug, Clone, Copy)]
pub struct SuffixRule {
    pub name: &'static str,
    pub suffixes: &'static [&'static str],
    pub contact: &'static str,
}

impl Rule for SuffixRule {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, query: &Query<'_>) -> Option<String> {
        let Query::SharedHost { root } = query else {
            return None;
        };
        self.suffixes
            .iter()
            .any(|s| is_within(root, s))
            .then(|| self.contact.to_string())
    }
}

// ----------------------------------------------------------------------------
// Text rules
// ----------------------------------------------------------------------------

/// Predicate over WHOIS text.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Any of the signatures appears (case-insensitive). Signatures must be
    /// lower case.
    Contains(&'static [&'static str]),
    /// The regex matches anywhere in the original text.
    Pattern(Regex),
}

impl TextMatcher {
    fn is_match(&self, text: &str, folded: &str) -> bool {
        match self {
            TextMatcher::Contains(signatures) => signatures.iter().any(|s| folded.contains(s)),
            TextMatcher::Pattern(re) => re.is_match(text),
        }
    }
}

/// Produces the contact detail once a text rule matched.
#[derive(Debug, Clone)]
pub enum Extractor {
    /// Constant detail (URL, e-mail, instructions).
    Fixed(&'static str),
    /// Distinct values of the first capture group in order of appearance,
    /// joined with `", "`. Yields nothing when no value is captured.
    Capture(Regex),
}

impl Extractor {
    fn extract(&self, text: &str) -> Option<String> {
        match self {
            Extractor::Fixed(detail) => Some((*detail).to_string()),
            Extractor::Capture(re) => {
                let mut values: Vec<&str> = Vec::new();
                for cap in re.captures_iter(text) {
                    if let Some(m) = cap.get(1) {
                        let v = m.as_str().trim();
                        if !v.is_empty() && !values.iter().any(|seen| seen.eq_ignore_ascii_case(v))
                        {
                            values.push(v);
                        }
                    }
                }
                (!values.is_empty()).then(|| values.join(", "))
            }
        }
    }
}

/// WHOIS content rule.
#[derive(Debug, Clone)]
pub struct TextRule {
    pub name: &'static str,
    pub matcher: TextMatcher,
    pub extractor: Extractor,
}

impl TextRule {
    /// Provider signature rule with a fixed contact detail.
    pub fn signature(
        name: &'static str,
        signatures: &'static [&'static str],
        contact: &'static str,
    ) -> Self {
        Self {
            name,
            matcher: TextMatcher::Contains(signatures),
            extractor: Extractor::Fixed(contact),
        }
    }

    /// Structured-field rule: the pattern is both predicate and extractor.
    pub fn capture(name: &'static str, pattern: &str) -> Self {
        let re = Regex::new(pattern).unwrap_or_else(|e| panic!("bad pattern for {name}: {e}"));
        Self {
            name,
            matcher: TextMatcher::Pattern(re.clone()),
            extractor: Extractor::Capture(re),
        }
    }
}

impl Rule for TextRule {
    fn name(&self) -> &str {
        self.name
    }

    fn evaluate(&self, query: &Query<'_>) -> Option<String> {
        let Query::Whois { text, folded, .. } = query else {
            return None;
        };
        if self.matcher.is_match(text, folded) {
            self.extractor.extract(text)
        } else {
            None
        }
    }
}

// ----------------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------------

/// The two rule tables used by the classifiers.
#[derive(Debug, Clone)]
pub struct Registry {
    shared_host: Vec<SuffixRule>,
    whois: Vec<TextRule>,
}

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    Registry::new(
        builtin::SHARED_HOST_RULES.to_vec(),
        builtin::whois_rules(),
    )
});

impl Registry {
    pub fn new(shared_host: Vec<SuffixRule>, whois: Vec<TextRule>) -> Self {
        Self { shared_host, whois }
    }

    /// Registry populated with the built-in provider tables.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn shared_host_rules(&self) -> &[SuffixRule] {
        &self.shared_host
    }

    pub fn whois_rules(&self) -> &[TextRule] {
        &self.whois
    }

    /// Apply the table matching the query's kind.
    pub fn apply(&self, query: &Query<'_>) -> ContactDetails {
        match query {
            Query::SharedHost { .. } => apply_rules(&self.shared_host, query),
            Query::Whois { .. } => apply_rules(&self.whois, query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGES: SuffixRule = SuffixRule {
        name: "Pages",
        suffixes: &["pages.test", "static.test"],
        contact: "abuse@pages.test",
    };

    #[test]
    fn suffix_rule_matches_root_and_subdomains() {
        assert_eq!(
            PAGES.evaluate(&Query::shared_host("pages.test")).as_deref(),
            Some("abuse@pages.test")
        );
        assert!(PAGES.evaluate(&Query::shared_host("me.static.test")).is_some());
        assert!(PAGES.evaluate(&Query::shared_host("mypages.test")).is_none());
    }

    #[test]
    fn rules_ignore_other_query_kind() {
        let text_rule = TextRule::signature("Host", &["pages.test"], "x");
        assert!(text_rule.evaluate(&Query::shared_host("pages.test")).is_none());
        assert!(PAGES.evaluate(&Query::whois("pages.test", "pages.test")).is_none());
    }

    #[test]
    fn signature_is_case_insensitive() {
        let rule = TextRule::signature("Host", &["abuse@host.test"], "https://host.test/abuse");
        let q = Query::whois("192.0.2.1", "OrgAbuseEmail: ABUSE@HOST.TEST");
        assert_eq!(rule.evaluate(&q).as_deref(), Some("https://host.test/abuse"));
    }

    #[test]
    fn capture_joins_distinct_values() {
        let rule = TextRule::capture("Mailbox", r"(?im)^abuse-mailbox:\s*(\S+)$");
        let text = "abuse-mailbox: a@x.test\nabuse-mailbox: b@x.test\nabuse-mailbox: A@x.test";
        let q = Query::whois("198.51.100.1", text);
        assert_eq!(rule.evaluate(&q).as_deref(), Some("a@x.test, b@x.test"));
    }

    #[test]
    fn all_matches_are_kept() {
        let rules = vec![
            TextRule::signature("Specific", &["abuse@host.test"], "form"),
            TextRule::capture("Generic", r"(?im)^OrgAbuseEmail:\s*(\S+)$"),
            TextRule::signature("Other", &["nothing-here"], "x"),
        ];
        let q = Query::whois("192.0.2.1", "OrgAbuseEmail: abuse@host.test");
        let details = apply_rules(&rules, &q);
        assert_eq!(details.len(), 2);
        assert_eq!(details.get("Specific"), Some("form"));
        assert_eq!(details.get("Generic"), Some("abuse@host.test"));
    }

    #[test]
    fn registry_dispatches_by_kind() {
        let registry = Registry::new(
            vec![PAGES],
            vec![TextRule::signature("Host", &["pages.test"], "x")],
        );
        let shared = registry.apply(&Query::shared_host("site.pages.test"));
        assert_eq!(shared.get("Pages"), Some("abuse@pages.test"));
        assert!(!shared.contains("Host"));

        let text = registry.apply(&Query::whois("pages.test", "served by pages.test"));
        assert_eq!(text.get("Host"), Some("x"));
        assert!(!text.contains("Pages"));
    }
}
