//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::manifest::{Manifest, ManifestStage};

use super::commands::OutputFormat;

/// Placeholder for unset manifest fields.
const UNSET: &str = "-";

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Manifest field row for table display.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a manifest and its stage for display.
    #[must_use]
    pub fn format_manifest(&self, manifest: &Manifest) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&ManifestJson {
                stage: manifest.stage(),
                manifest,
            })
            .unwrap_or_default(),
            OutputFormat::Text => Self::format_manifest_text(manifest),
        }
    }

    fn format_manifest_text(manifest: &Manifest) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "\nBead: {} ({})\n",
            manifest.service_name().bold(),
            Self::format_stage(manifest.stage())
        );

        let host = manifest.host.as_ref();
        let rows = vec![
            FieldRow {
                field: "Username",
                value: display(host.map(|h| h.username.as_str())),
            },
            FieldRow {
                field: "IP",
                value: display(host.map(|h| h.ip.as_str())),
            },
            FieldRow {
                field: "SSH key",
                value: display(host.map(|h| h.ssh_key_file.display())),
            },
            FieldRow {
                field: "Container port",
                value: display(manifest.container_port),
            },
            FieldRow {
                field: "Domain",
                value: display(manifest.domain_name.as_deref()),
            },
            FieldRow {
                field: "Env file",
                value: display(manifest.env_file.as_ref().map(|p| p.display())),
            },
            FieldRow {
                field: "Image",
                value: display(manifest.image.as_deref()),
            },
        ];

        let _ = writeln!(output, "{}", Table::new(rows));
        output
    }

    /// Formats a lifecycle stage with color.
    fn format_stage(stage: ManifestStage) -> String {
        match stage {
            ManifestStage::Initialized => stage.to_string().dimmed().to_string(),
            ManifestStage::HostConfigured => stage.to_string().yellow().to_string(),
            ManifestStage::Deployed => stage.to_string().green().to_string(),
        }
    }

    /// Formats the URL a running bead is served on.
    #[must_use]
    pub fn format_url(&self, url: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({ "url": url }).to_string(),
            OutputFormat::Text => url.to_string(),
        }
    }
}

fn display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| UNSET.to_string(), |v| v.to_string())
}

// JSON serialization helpers

#[derive(serde::Serialize)]
struct ManifestJson<'a> {
    stage: ManifestStage,
    #[serde(flatten)]
    manifest: &'a Manifest,
}
