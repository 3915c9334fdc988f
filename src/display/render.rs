//! Snapshot rendering
//!
//! Turns each state snapshot delivered to the driver's observer into text
//! or a single JSON line.

use anyhow::{Context, Result};
use serde::Serialize;

use super::colours::ColourManager;
use crate::notifications::{Notification, NotificationState, Variant};

/// Output formatting modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented human-readable listing
    #[default]
    Text,
    /// One JSON object per snapshot
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}. Valid options: text, json", s)),
        }
    }
}

#[derive(Serialize)]
struct SnapshotRecord<'a> {
    sequence: usize,
    capacity: usize,
    toasts: &'a [Notification],
}

#[derive(Debug, Clone)]
pub struct SnapshotRenderer {
    format: OutputFormat,
    colours: ColourManager,
    capacity: usize,
}

impl SnapshotRenderer {
    pub fn new(format: OutputFormat, colours: ColourManager, capacity: usize) -> Self {
        Self {
            format,
            colours,
            capacity,
        }
    }

    /// Render snapshot number `sequence`
    pub fn render(&self, sequence: usize, state: &NotificationState) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.render_text(sequence, state)),
            OutputFormat::Json => {
                let record = SnapshotRecord {
                    sequence,
                    capacity: self.capacity,
                    toasts: state.toasts(),
                };
                serde_json::to_string(&record).context("Failed to serialize snapshot")
            }
        }
    }

    fn render_text(&self, sequence: usize, state: &NotificationState) -> String {
        let header = format!("snapshot {} ({}/{})", sequence, state.len(), self.capacity);
        let mut lines = vec![self.colours.header(&header).to_string()];

        if state.is_empty() {
            lines.push(format!("  {}", self.colours.closed("(empty)")));
        }
        for toast in state.iter() {
            lines.push(self.render_toast(toast));
        }

        lines.join("\n")
    }

    fn render_toast(&self, toast: &Notification) -> String {
        let marker = if toast.open { "[open]  " } else { "[closed]" };

        let mut body = toast.title().unwrap_or("(untitled)").to_string();
        if let Some(description) = &toast.payload.description {
            body.push_str(" | ");
            body.push_str(description);
        }

        let body = if !toast.open {
            self.colours.closed(&body).to_string()
        } else if toast.payload.variant == Variant::Destructive {
            self.colours.destructive(&body).to_string()
        } else {
            body
        };

        let mut line = format!("  {} {}  {}", marker, toast.id(), body);
        if let Some(action) = &toast.payload.action {
            line.push_str(&format!("  ({})", self.colours.action(&action.label)));
        }
        line
    }
}
