//! Terminal output for trialplan commands.
//!
//! Human mode prints styled lines and tables on stdout. JSON mode prints a
//! single `{"status", "data"}` document on stdout; everything meant for a
//! person is dropped, except diagnostics, which go to stderr as JSON lines.

use console::{style, StyledObject};
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    fn human(&self, line: impl FnOnce() -> String) {
        if !self.json {
            println!("{}", line());
        }
    }

    /// A plot-level problem. Kept on stderr so stdout stays parseable.
    fn diagnostic(&self, status: &str, marker: StyledObject<&str>, message: impl Display) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "status": status, "message": message.to_string() }));
        } else {
            eprintln!("{} {}", marker, message);
        }
    }

    pub fn success(&self, message: impl Display) {
        self.human(|| format!("{} {}", style("✓").green().bold(), message));
    }

    pub fn info(&self, message: impl Display) {
        self.human(|| format!("{} {}", style("ℹ").blue().bold(), message));
    }

    pub fn kv(&self, key: impl Display, value: impl Display) {
        self.human(|| format!("{}: {}", style(key).bold(), value));
    }

    pub fn section(&self, title: impl Display) {
        self.human(|| format!("\n{}", style(title).bold().underlined()));
    }

    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        self.human(|| {
            if rows.is_empty() {
                style("(none)").dim().to_string()
            } else {
                Table::new(rows).with(Style::rounded()).to_string()
            }
        });
    }

    pub fn warning(&self, message: impl Display) {
        self.diagnostic("warning", style("⚠").yellow().bold(), message);
    }

    pub fn error(&self, message: impl Display) {
        self.diagnostic("error", style("✗").red().bold(), message);
    }

    /// The command's structured result, printed in JSON mode
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let document = serde_json::json!({ "status": "success", "data": data });
        println!("{}", serde_json::to_string_pretty(&document)?);
        Ok(())
    }
}
