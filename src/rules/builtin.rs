//! Built-in provider tables.
//!
//! Suffix rules list platforms whose customers share infrastructure, so the
//! registrar / IP owner of record cannot act on a single site. Text rules
//! list registrars and hosts identified by the abuse addresses they publish in
//! WHOIS, followed by generic captures of the standard abuse fields.
//!
//! Rule names must be unique within a table and must not be `Email` or
//! `Error`, which are reserved for the fallback and "nothing found" entries.

use super::{SuffixRule, TextRule};

pub static SHARED_HOST_RULES: &[SuffixRule] = &[
    SuffixRule {
        name: "000webhost",
        suffixes: &["000webhostapp.com"],
        contact: "https://www.000webhost.com/report-abuse",
    },
    SuffixRule {
        name: "Azure App Service",
        suffixes: &["azurewebsites.net"],
        contact: "https://msrc.microsoft.com/report/abuse",
    },
    SuffixRule {
        name: "Blogger",
        suffixes: &["blogger.com", "blogspot.com"],
        contact: "https://support.google.com/blogger/answer/76315",
    },
    SuffixRule {
        name: "Cloudflare Pages",
        suffixes: &["pages.dev", "workers.dev"],
        contact: "https://abuse.cloudflare.com",
    },
    SuffixRule {
        name: "Firebase",
        suffixes: &["firebaseapp.com", "web.app"],
        contact: "https://firebase.google.com/support/troubleshooter/report/abuse",
    },
    SuffixRule {
        name: "GitHub",
        suffixes: &["github.io", "githubusercontent.com"],
        contact: "https://support.github.com/contact/report-abuse?category=report-abuse&report=other&report_type=unspecified",
    },
    SuffixRule {
        name: "GitLab",
        suffixes: &["gitlab.io"],
        contact: "abuse@gitlab.com",
    },
    SuffixRule {
        name: "Google App Engine",
        suffixes: &["appspot.com"],
        contact: "https://support.google.com/code/contact/cloud_platform_report",
    },
    SuffixRule {
        name: "Heroku",
        suffixes: &["herokuapp.com"],
        contact: "abuse@heroku.com",
    },
    SuffixRule {
        name: "Netlify",
        suffixes: &["netlify.app", "netlify.com"],
        contact: "fraud@netlify.com",
    },
    SuffixRule {
        name: "Vercel",
        suffixes: &["vercel.app", "now.sh"],
        contact: "abuse@vercel.com",
    },
    SuffixRule {
        name: "Weebly",
        suffixes: &["weebly.com"],
        contact: "https://www.weebly.com/spam",
    },
    SuffixRule {
        name: "Wix",
        suffixes: &["wixsite.com"],
        contact: "https://www.wix.com/abuse-report",
    },
    SuffixRule {
        name: "WordPress.com",
        suffixes: &["wordpress.com"],
        contact: "https://wordpress.com/abuse/",
    },
];

/// Text rules in evaluation order.
pub fn whois_rules() -> Vec<TextRule> {
    vec![
        // Registrars
        TextRule::signature(
            "GoDaddy",
            &["abuse@godaddy.com"],
            "https://supportcenter.godaddy.com/AbuseReport",
        ),
        TextRule::signature(
            "Google Domains",
            &["registrar-abuse@google.com"],
            "https://support.google.com/domains/contact/report_abuse",
        ),
        TextRule::signature("Namecheap", &["abuse@namecheap.com"], "abuse@namecheap.com"),
        TextRule::signature(
            "Tucows",
            &["domainabuse@tucows.com"],
            "domainabuse@tucows.com",
        ),
        // Hosts and CDNs
        TextRule::signature(
            "Amazon AWS",
            &["abuse@amazonaws.com", "trustandsafety@support.aws.com"],
            "https://aws.amazon.com/forms/report-abuse",
        ),
        TextRule::signature(
            "Cloudflare",
            &["abuse@cloudflare.com"],
            "https://abuse.cloudflare.com",
        ),
        TextRule::signature(
            "DigitalOcean",
            &["abuse@digitalocean.com"],
            "https://www.digitalocean.com/company/contact/abuse",
        ),
        TextRule::signature("Fastly", &["abuse@fastly.com"], "abuse@fastly.com"),
        TextRule::signature(
            "Google Cloud",
            &["google-cloud-compliance@google.com", "network-abuse@google.com"],
            "https://support.google.com/code/contact/cloud_platform_report",
        ),
        TextRule::signature("Hetzner", &["abuse@hetzner.com", "abuse@hetzner.de"], "abuse@hetzner.com"),
        TextRule::signature(
            "Microsoft Azure",
            &["abuse@microsoft.com", "abuse@msn.com"],
            "https://msrc.microsoft.com/report",
        ),
        TextRule::signature("OVH", &["abuse@ovh.net", "abuse@ovh.ca"], "https://www.ovh.com/abuse/"),
        // Standard fields published by most registrars and RIRs
        TextRule::capture(
            "Registrar abuse email",
            r"(?im)^[ \t]*Registrar Abuse Contact Email:[ \t]*(\S+@\S+)\s*$",
        ),
        TextRule::capture(
            "Registrar abuse phone",
            r"(?im)^[ \t]*Registrar Abuse Contact Phone:[ \t]*(\+?[0-9][0-9. \-]*[0-9])\s*$",
        ),
        TextRule::capture(
            "Abuse mailbox",
            r"(?im)^[ \t]*abuse-mailbox:[ \t]*(\S+@\S+)\s*$",
        ),
        TextRule::capture(
            "Org abuse email",
            r"(?im)^[ \t]*OrgAbuseEmail:[ \t]*(\S+@\S+)\s*$",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{EMAIL_KEY, ERROR_KEY};
    use crate::rules::TextMatcher;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_unreserved() {
        let text = whois_rules();
        for names in [
            SHARED_HOST_RULES.iter().map(|r| r.name).collect::<Vec<_>>(),
            text.iter().map(|r| r.name).collect::<Vec<_>>(),
        ] {
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len(), "duplicate rule name in {names:?}");
            assert!(!names.contains(&EMAIL_KEY));
            assert!(!names.contains(&ERROR_KEY));
        }
    }

    #[test]
    fn signatures_are_lower_case() {
        for rule in whois_rules() {
            if let TextMatcher::Contains(sigs) = rule.matcher {
                for s in sigs {
                    assert_eq!(*s, s.to_lowercase(), "rule {}", rule.name);
                }
            }
        }
    }

    #[test]
    fn suffixes_are_lower_case() {
        for rule in SHARED_HOST_RULES {
            for s in rule.suffixes {
                assert_eq!(*s, s.to_lowercase(), "rule {}", rule.name);
            }
        }
    }
}
