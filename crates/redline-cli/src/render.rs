//! Terminal panels for scan results.
//!
//! Every panel renders to a `String` so output can be checked without a
//! terminal. Colours are only emitted when the renderer was built with
//! `use_color`.

use crossterm::style::{Color, Stylize};
use redline_core::{
    FileKind, GroupOptions, Match, NerFilter, NerItem, RuleGroups, Validity, entry_count,
    group_by_rule,
};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Chip colour per rule. Unknown rules get the default tone.
pub fn rule_color(rule: &str) -> Color {
    match rule {
        "rrn" => Color::Red,
        "fgn" => Color::Magenta,
        "email" => Color::Blue,
        "phone_mobile" => Color::Green,
        "phone_city" => Color::Cyan,
        "phone_service" => Color::DarkCyan,
        "card" => Color::Yellow,
        "passport" => Color::DarkYellow,
        "driver_license" => Color::DarkMagenta,
        _ => Color::Grey,
    }
}

pub struct Renderer {
    pub use_color: bool,
}

impl Renderer {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn chip(&self, rule: &str, value: &str) -> String {
        self.paint(&format!("[{}]", value), rule_color(rule))
    }

    fn chip_rows(&self, out: &mut String, groups: &RuleGroups) {
        let width = groups.keys().map(|r| r.chars().count()).max().unwrap_or(0);
        for (rule, values) in groups {
            let chips: Vec<String> = values.iter().map(|v| self.chip(rule, v)).collect();
            let _ = writeln!(out, "  {:<width$}  {}", rule, chips.join(" "), width = width);
        }
    }

    /// One-line summary of the per-rule match counts
    pub fn counts(&self, counts: &BTreeMap<String, usize>) -> String {
        let total: usize = counts.values().sum();
        if total == 0 {
            return "No matches.\n".to_string();
        }

        let parts: Vec<String> = counts
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(rule, n)| format!("{} {}", self.paint(rule, rule_color(rule)), n))
            .collect();
        format!("Matches ({}): {}\n", total, parts.join(", "))
    }

    /// Masked chips of validated matches, one row per rule
    pub fn preview(&self, full_text: &str, matches: &[Match], kind: FileKind) -> String {
        let groups = group_by_rule(
            full_text,
            matches,
            GroupOptions::new(kind).validity(Validity::Ok).masked(true),
        );

        let mut out = self.heading("Preview (validated, masked)");
        out.push('\n');
        if groups.is_empty() {
            out.push_str("  No validated matches.\n");
        } else {
            self.chip_rows(&mut out, &groups);
        }
        out
    }

    /// Every match, unmasked, grouped by rule
    pub fn raw(&self, full_text: &str, matches: &[Match], kind: FileKind) -> String {
        let groups = group_by_rule(full_text, matches, GroupOptions::new(kind).masked(false));

        let mut out = self.heading("Raw matches");
        out.push('\n');
        if groups.is_empty() {
            out.push_str("  No matches.\n");
            return out;
        }
        for (rule, values) in &groups {
            let _ = writeln!(out, "  {} ({})", self.paint(rule, rule_color(rule)), values.len());
            for value in values {
                let _ = writeln!(out, "    {}", value);
            }
        }
        out
    }

    /// Valid and invalid matches as two unmasked chip lists
    pub fn chip_lists(&self, full_text: &str, matches: &[Match], kind: FileKind) -> String {
        let mut out = String::new();
        for (title, validity) in [("Valid", Validity::Ok), ("Invalid", Validity::Ng)] {
            let groups = group_by_rule(
                full_text,
                matches,
                GroupOptions::new(kind).validity(validity).masked(false),
            );
            let _ = writeln!(
                out,
                "{}",
                self.heading(&format!("{} ({})", title, entry_count(&groups)))
            );
            if groups.is_empty() {
                out.push_str("  (none)\n");
            } else {
                self.chip_rows(&mut out, &groups);
            }
        }
        out
    }

    /// Entity table limited to the allowed labels, with a per-label summary
    pub fn ner_table(&self, entities: &[NerItem], filter: &NerFilter) -> String {
        let rows = filter.apply(entities);

        let mut out = self.heading("Entities");
        out.push('\n');
        if rows.is_empty() {
            out.push_str("  No entities.\n");
        } else {
            let width = rows.iter().map(|e| e.text.chars().count()).max().unwrap_or(0);
            for item in &rows {
                let score = item
                    .score
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "-".to_string());
                let _ = writeln!(
                    out,
                    "  {:<3} {:<width$}  {:>5}..{:<5} {}",
                    item.label,
                    item.text,
                    item.start,
                    item.end,
                    score,
                    width = width
                );
            }
        }

        let summary: Vec<String> = filter
            .counts(entities)
            .into_iter()
            .map(|(label, n)| format!("{} {}", label, n))
            .collect();
        let _ = writeln!(out, "  {}", summary.join(" · "));
        out
    }
}
