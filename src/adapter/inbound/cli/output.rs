//! CLI output formatting.
//!
//! Human-readable output by default; `--json` switches every line to a
//! `{"type": ..., "payload": ...}` object for scripting, and `--quiet`
//! suppresses everything except errors.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::{OwoColorize, Stream};
use serde_json::json;

use super::command::ColorChoice;

/// Output settings from the global CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

static OUTPUT_CONFIG: OnceLock<OutputConfig> = OnceLock::new();

fn config() -> OutputConfig {
    OUTPUT_CONFIG.get().copied().unwrap_or_default()
}

/// Apply output settings. Only the first call has an effect.
pub fn configure(config: OutputConfig, color: ColorChoice) {
    match color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    let _ = OUTPUT_CONFIG.set(config);
}

#[must_use]
pub fn is_json() -> bool {
    config().json
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Print the application header.
pub fn header(version: &str) {
    let config = config();
    if config.json {
        emit_json_line("header", json!({ "app": "vesselwatch", "version": version }));
        return;
    }
    if config.quiet {
        return;
    }
    println!(
        "{} {}",
        "vesselwatch".if_supports_color(Stream::Stdout, |t| t.bold()),
        version.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
    println!();
}

/// Print a section header.
pub fn section(title: &str) {
    let config = config();
    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if config.quiet {
        return;
    }
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = config();
    let value = value.to_string();
    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if config.quiet {
        return;
    }
    let label = format!("{label:<18}");
    println!(
        "  {} {value}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
}

pub fn success(message: &str) {
    let config = config();
    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if config.quiet {
        return;
    }
    println!(
        "  {} {message}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green())
    );
}

pub fn note(message: &str) {
    let config = config();
    if config.json || config.quiet {
        return;
    }
    println!("  {}", message.if_supports_color(Stream::Stdout, |t| t.dimmed()));
}

/// Print an error line on stderr. Never suppressed.
pub fn error(message: &str) {
    if config().json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!(
        "  {} {message}",
        "×".if_supports_color(Stream::Stderr, |t| t.red())
    );
}
