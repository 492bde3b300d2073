//! Room configuration.

use serde::{Deserialize, Serialize};

/// The word announced with every `game_started` unless configured.
pub const DEFAULT_GAME_WORD: &str = "Wilfried";

/// Default command mailbox size for room actors.
pub const DEFAULT_MAILBOX_SIZE: usize = 64;

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Word sent in `game_started` for the current mover to draw.
    pub game_word: String,

    /// Capacity of each room's command mailbox. When it fills up, sessions
    /// sending to that room wait, so one flooded room applies backpressure
    /// to its own members only.
    pub mailbox_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            game_word: DEFAULT_GAME_WORD.to_string(),
            mailbox_size: DEFAULT_MAILBOX_SIZE,
        }
    }
}
