//! Commands from the popup/background side

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::host::Host;
use crate::mode::DisplayMode;
use crate::EngineError;

/// Command accepted by the engine, tagged by `action` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    SetMode { mode: DisplayMode },
    SetEnabled { enabled: bool },
    /// Page reload; handled by the embedder
    Reload,
}

impl Command {
    pub fn from_json(message: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(message)?)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What a command did to one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Markers restyled
    ModeUpdated(usize),
    /// Markers inserted by the synchronous part of the pass
    Started(usize),
    /// Markers reverted
    Stopped(usize),
    /// Left to the embedder
    Ignored,
}

/// Deliver one command to every engine (one per tab)
pub fn broadcast<'a, H, I>(engines: I, command: Command) -> Vec<CommandOutcome>
where
    H: Host + 'a,
    I: IntoIterator<Item = &'a mut Engine<H>>,
{
    engines
        .into_iter()
        .map(|engine| engine.handle_command(command))
        .collect()
}
