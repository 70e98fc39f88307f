//! Output formatting for CLI.

mod events;
mod prompt;

pub use events::JsonlEventOutput;
pub use prompt::TerminalPrompt;
