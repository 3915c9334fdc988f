//! Notification script parsing
//!
//! One command per line; blank lines and everything after `#` are ignored.
//!
//! ```text
//! enqueue Saved | All changes stored
//! enqueue! Delete failed
//! update @1 description Stored twice
//! dismiss @2
//! remove-wait
//! show
//! ```

use std::time::Duration;
use thiserror::Error;

use crate::notifications::{NotificationId, NotificationUpdate, ToastAction, ToastPayload, Variant};

/// Script parse and replay failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' requires {argument}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        argument: &'static str,
    },

    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },

    #[error("line {line}: invalid {field} value '{value}'")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unknown field '{field}' (expected title, description, variant, open or action)")]
    UnknownField { line: usize, field: String },

    #[error("no toast matches '{reference}'")]
    UnknownToastRef { reference: String },
}

/// Reference to a toast from within a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastRef {
    /// N-th toast enqueued by the script, 1-based
    Index(usize),
    /// Literal notification id
    Id(NotificationId),
}

impl std::fmt::Display for ToastRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToastRef::Index(index) => write!(f, "@{}", index),
            ToastRef::Id(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Enqueue(ToastPayload),
    /// The update's id is filled in once `target` is resolved
    Update {
        target: ToastRef,
        update: NotificationUpdate,
    },
    Dismiss(Option<ToastRef>),
    RemoveWait,
    Wait(Duration),
    Show,
    Shutdown,
}

/// A parsed command and the line it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

/// Parse a whole script
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut commands = Vec::new();
    for (index, text) in source.lines().enumerate() {
        if let Some(command) = parse_line(index + 1, text)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Parse one line, returning `None` for blanks and comments
pub fn parse_line(line: usize, text: &str) -> Result<Option<ScriptLine>, ScriptError> {
    let text = match text.split_once('#') {
        Some((before, _)) => before,
        None => text,
    }
    .trim();

    if text.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    };

    let command = match word {
        "enqueue" => ScriptCommand::Enqueue(parse_payload(line, "enqueue", rest)?),
        "enqueue!" => ScriptCommand::Enqueue(
            parse_payload(line, "enqueue!", rest)?.with_variant(Variant::Destructive),
        ),
        "update" => parse_update(line, rest)?,
        "dismiss" => {
            if rest.is_empty() {
                ScriptCommand::Dismiss(None)
            } else {
                ScriptCommand::Dismiss(Some(parse_ref(line, rest)?))
            }
        }
        "remove-wait" => ScriptCommand::RemoveWait,
        "wait" => {
            if rest.is_empty() {
                return Err(ScriptError::MissingArgument {
                    line,
                    command: "wait",
                    argument: "a duration in milliseconds",
                });
            }
            let ms = rest.parse::<u64>().map_err(|_| ScriptError::InvalidNumber {
                line,
                value: rest.to_string(),
            })?;
            ScriptCommand::Wait(Duration::from_millis(ms))
        }
        "show" => ScriptCommand::Show,
        "shutdown" => ScriptCommand::Shutdown,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };

    Ok(Some(ScriptLine { line, command }))
}

fn parse_payload(line: usize, command: &'static str, rest: &str) -> Result<ToastPayload, ScriptError> {
    let (title, description) = match rest.split_once('|') {
        Some((title, description)) => (title.trim(), Some(description.trim())),
        None => (rest, None),
    };

    if title.is_empty() {
        return Err(ScriptError::MissingArgument {
            line,
            command,
            argument: "a title",
        });
    }

    let payload = ToastPayload::titled(title);
    Ok(match description {
        Some(description) if !description.is_empty() => payload.with_description(description),
        _ => payload,
    })
}

fn parse_update(line: usize, rest: &str) -> Result<ScriptCommand, ScriptError> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let target = match parts.next().filter(|s| !s.is_empty()) {
        Some(reference) => parse_ref(line, reference)?,
        None => {
            return Err(ScriptError::MissingArgument {
                line,
                command: "update",
                argument: "a toast reference",
            })
        }
    };
    let field = parts.next().ok_or(ScriptError::MissingArgument {
        line,
        command: "update",
        argument: "a field",
    })?;
    let value = parts.next().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(ScriptError::MissingArgument {
            line,
            command: "update",
            argument: "a value",
        });
    }

    let update = NotificationUpdate::default();
    let update = match field {
        "title" => update.title(value),
        "description" => update.description(value),
        "variant" => update.variant(value.parse::<Variant>().map_err(|_| ScriptError::InvalidValue {
            line,
            field: "variant",
            value: value.to_string(),
        })?),
        "open" => update.open(value.parse::<bool>().map_err(|_| ScriptError::InvalidValue {
            line,
            field: "open",
            value: value.to_string(),
        })?),
        "action" => update.action(parse_action(value)),
        other => {
            return Err(ScriptError::UnknownField {
                line,
                field: other.to_string(),
            })
        }
    };

    Ok(ScriptCommand::Update { target, update })
}

/// `label` or `label | alt text`
fn parse_action(value: &str) -> ToastAction {
    match value.split_once('|') {
        Some((label, alt_text)) => ToastAction {
            label: label.trim().to_string(),
            alt_text: alt_text.trim().to_string(),
        },
        None => ToastAction::new(value),
    }
}

fn parse_ref(line: usize, reference: &str) -> Result<ToastRef, ScriptError> {
    match reference.strip_prefix('@') {
        Some(index) => match index.parse::<usize>() {
            Ok(index) if index > 0 => Ok(ToastRef::Index(index)),
            _ => Err(ScriptError::InvalidNumber {
                line,
                value: reference.to_string(),
            }),
        },
        None => Ok(ToastRef::Id(NotificationId::from(reference))),
    }
}
