//! CLI module containing argument parsing and script handling

pub mod args;
pub mod script;

pub use args::Args;
pub use script::{parse_script, ScriptCommand, ScriptError, ScriptLine, ToastRef};
