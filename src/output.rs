//! Output formatting for resolution reports.
//!
//! Two [`ReportSink`] implementations:
//!   * [`TextReporter`]: a label line per phase followed by aligned
//!     `name: detail` lines, written and flushed as each phase completes
//!   * [`JsonReporter`]: collects phases and renders one JSON document at the
//!     end of the run, including the error when the run failed

use std::io::{self, IsTerminal, Write};

use anstyle::{AnsiColor, Color, Style};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contacts::{ContactDetails, ERROR_KEY};
use crate::errors::{AbuseFinderError, Result};
use crate::resolve::{Phase, PhaseReport, ReportSink, ResolutionResult};

/// Style definitions for the text report
#[derive(Debug, Clone)]
pub struct Styles {
    pub label: Style,
    pub name: Style,
    pub missing: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            label: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Blue))),
            name: Style::new().bold(),
            missing: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        }
    }
}

/// Human-oriented report writer.
pub struct TextReporter<W: Write> {
    out: W,
    styles: Styles,
    use_colors: bool,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, use_colors: bool) -> Self {
        Self {
            out,
            styles: Styles::default(),
            use_colors,
        }
    }

    /// Create a reporter without colors (for non-interactive use)
    pub fn plain(out: W) -> Self {
        Self::new(out, false)
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Apply style to text if colors are enabled
    fn styled(&self, text: &str, style: &Style) -> String {
        if self.use_colors {
            format!("{}{}{}", style.render(), text, style.render_reset())
        } else {
            text.to_string()
        }
    }

    fn write_block(&mut self, label: &str, contacts: &ContactDetails) -> io::Result<()> {
        let width = contacts.name_width() + 1;
        let header = self.styled(label, &self.styles.label);
        writeln!(self.out, "{header}")?;
        for (name, detail) in contacts.iter() {
            let cell = format!("{name}:");
            let pad = " ".repeat(width.saturating_sub(cell.len()) + 1);
            let style = if name == ERROR_KEY {
                &self.styles.missing
            } else {
                &self.styles.name
            };
            let cell = self.styled(&cell, style);
            writeln!(self.out, "  {cell}{pad}{detail}")?;
        }
        self.out.flush()
    }
}

impl<W: Write> ReportSink for TextReporter<W> {
    fn report(&mut self, report: &PhaseReport<'_>) -> io::Result<()> {
        self.write_block(&report.phase.label(), report.contacts)
    }
}

/// Colors only on an interactive stdout, and never when `NO_COLOR` is set.
pub fn should_use_colors(no_color_flag: bool) -> bool {
    !no_color_flag && io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

// ----------------------------------------------------------------------------
// JSON
// ----------------------------------------------------------------------------

/// One reported phase in the JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPhase {
    #[serde(flatten)]
    pub phase: Phase,
    pub label: String,
    pub subject: String,
    pub contacts: ContactDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    pub message: String,
    pub category: String,
}

/// Top-level JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDocument {
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub success: bool,
    pub phases: Vec<JsonPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl JsonDocument {
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Collects phases for a single JSON document.
#[derive(Debug, Default)]
pub struct JsonReporter {
    phases: Vec<JsonPhase>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the document for a finished run.
    pub fn into_document(self, input: &str, outcome: &Result<ResolutionResult>) -> JsonDocument {
        let (domain, root, error) = match outcome {
            Ok(result) => (result.domain.clone(), Some(result.root.clone()), None),
            Err(e) => (input.trim().to_string(), None, Some(json_error(e))),
        };
        JsonDocument {
            domain,
            root,
            generated_at: Utc::now(),
            success: error.is_none(),
            phases: self.phases,
            error,
        }
    }
}

fn json_error(e: &AbuseFinderError) -> JsonError {
    JsonError {
        message: e.to_string(),
        category: e.category().to_string(),
    }
}

impl ReportSink for JsonReporter {
    fn report(&mut self, report: &PhaseReport<'_>) -> io::Result<()> {
        self.phases.push(JsonPhase {
            phase: report.phase,
            label: report.phase.label(),
            subject: report.subject.to_string(),
            contacts: report.contacts.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{EMAIL_KEY, NOT_FOUND_MESSAGE};

    fn render(phase: Phase, contacts: &ContactDetails) -> String {
        let mut reporter = TextReporter::plain(Vec::new());
        reporter
            .report(&PhaseReport {
                phase,
                subject: "example.com",
                contacts,
            })
            .unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn text_block_is_aligned() {
        let contacts: ContactDetails = [
            ("GoDaddy", "https://supportcenter.godaddy.com/AbuseReport"),
            ("Registrar abuse email", "abuse@godaddy.com"),
        ]
        .into_iter()
        .collect();
        let text = render(Phase::Registrar, &contacts);
        assert_eq!(
            text,
            "Report abuse to domain registrar:\n\
             \x20 GoDaddy:               https://supportcenter.godaddy.com/AbuseReport\n\
             \x20 Registrar abuse email: abuse@godaddy.com\n"
        );
    }

    #[test]
    fn not_found_block() {
        let text = render(Phase::Registrar, &ContactDetails::not_found());
        assert!(text.ends_with(&format!("  Error: {NOT_FOUND_MESSAGE}\n")));
    }

    #[test]
    fn colored_output_wraps_label() {
        let contacts: ContactDetails = [(EMAIL_KEY, "abuse@example.com")].into_iter().collect();
        let mut reporter = TextReporter::new(Vec::new(), true);
        reporter
            .report(&PhaseReport {
                phase: Phase::Registrar,
                subject: "example.com",
                contacts: &contacts,
            })
            .unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("\x1b["));
        assert!(text.contains("abuse@example.com"));
    }

    #[test]
    fn json_document_for_failure_keeps_partial_phases() {
        let contacts: ContactDetails = [(EMAIL_KEY, "abuse@example.com")].into_iter().collect();
        let mut reporter = JsonReporter::new();
        reporter
            .report(&PhaseReport {
                phase: Phase::Registrar,
                subject: "example.com",
                contacts: &contacts,
            })
            .unwrap();
        let outcome: Result<ResolutionResult> = Err(AbuseFinderError::host_resolution(
            AbuseFinderError::NoAddresses {
                domain: "example.com".into(),
            },
        ));
        let doc = reporter.into_document("example.com", &outcome);
        assert!(!doc.success);

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["phases"][0]["kind"], "registrar");
        assert_eq!(value["phases"][0]["contacts"]["Email"], "abuse@example.com");
        assert_eq!(value["error"]["category"], "network");
        assert!(
            value["error"]["message"]
                .as_str()
                .unwrap()
                .starts_with("failed to resolve host")
        );
    }
}
