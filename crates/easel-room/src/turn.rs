//! Turn controller: whose move it is while a game runs.
//!
//! ```text
//! NoGame        ──start(n > 0)─────────────→ InProgress(0)
//! InProgress(i) ──start(n > 0)─────────────→ InProgress(0)
//! InProgress(i) ──member_left, others stay─→ InProgress(re-aimed i)
//! InProgress(i) ──member_left, room empty──→ NoGame
//! ```
//!
//! The pointer is an index into the room's join order. There is no rule
//! for advancing it after the first move; `start` is the only way to move
//! it forward.
//!
//! When a member leaves mid-game:
//! - someone before the mover leaves: the pointer shifts down one, so the
//!   same member keeps the turn;
//! - the mover leaves: the turn passes to whoever now holds that position,
//!   wrapping to the first member if the mover was last;
//! - someone after the mover leaves: nothing changes;
//! - the room empties: the game ends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game-turn state for one room.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum TurnState {
    /// No game running.
    #[default]
    NoGame,
    /// A game is running and `turn` indexes the current mover.
    InProgress { turn: usize },
}

impl TurnState {
    /// Starts (or restarts) a game with `members` players, handing the
    /// turn to the first one. Returns the mover's index.
    ///
    /// With no members there is nobody to move: the state becomes
    /// `NoGame` and `None` is returned.
    pub fn start(&mut self, members: usize) -> Option<usize> {
        if members == 0 {
            *self = Self::NoGame;
            return None;
        }
        *self = Self::InProgress { turn: 0 };
        Some(0)
    }

    /// Re-aims the pointer after the member at `removed` left, leaving
    /// `remaining` members.
    pub fn member_left(&mut self, removed: usize, remaining: usize) {
        let Self::InProgress { turn } = *self else {
            return;
        };
        if remaining == 0 {
            *self = Self::NoGame;
            return;
        }

        let next = if removed < turn {
            turn - 1
        } else if removed == turn && turn >= remaining {
            0
        } else {
            turn
        };
        *self = Self::InProgress {
            turn: next.min(remaining - 1),
        };
    }

    /// Index of the current mover, if a game is running.
    pub fn current(&self) -> Option<usize> {
        match self {
            Self::NoGame => None,
            Self::InProgress { turn } => Some(*turn),
        }
    }

    /// Returns `true` while a game is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGame => write!(f, "NoGame"),
            Self::InProgress { turn } => write!(f, "InProgress({turn})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_progress(turn: usize) -> TurnState {
        TurnState::InProgress { turn }
    }

    #[test]
    fn test_default_is_no_game() {
        assert_eq!(TurnState::default(), TurnState::NoGame);
        assert_eq!(TurnState::default().current(), None);
    }

    #[test]
    fn test_start_points_at_first_member() {
        let mut state = TurnState::NoGame;
        assert_eq!(state.start(3), Some(0));
        assert_eq!(state, in_progress(0));
        assert!(state.is_active());
    }

    #[test]
    fn test_start_resets_running_game() {
        let mut state = in_progress(2);
        assert_eq!(state.start(3), Some(0));
        assert_eq!(state, in_progress(0));
    }

    #[test]
    fn test_start_with_no_members_is_no_game() {
        let mut state = in_progress(1);
        assert_eq!(state.start(0), None);
        assert_eq!(state, TurnState::NoGame);
    }

    #[test]
    fn test_leave_before_mover_keeps_same_mover() {
        // [a, b, c], turn on c (2). a leaves → [b, c], c is now index 1.
        let mut state = in_progress(2);
        state.member_left(0, 2);
        assert_eq!(state, in_progress(1));
    }

    #[test]
    fn test_leave_after_mover_changes_nothing() {
        let mut state = in_progress(0);
        state.member_left(2, 2);
        assert_eq!(state, in_progress(0));
    }

    #[test]
    fn test_mover_leaves_turn_passes_to_next() {
        // [a, b, c], turn on b. b leaves → [a, c], c takes index 1.
        let mut state = in_progress(1);
        state.member_left(1, 2);
        assert_eq!(state, in_progress(1));
    }

    #[test]
    fn test_last_mover_leaves_wraps_to_first() {
        // [a, b, c], turn on c. c leaves → [a, b], wrap to a.
        let mut state = in_progress(2);
        state.member_left(2, 2);
        assert_eq!(state, in_progress(0));
    }

    #[test]
    fn test_room_empties_ends_game() {
        let mut state = in_progress(0);
        state.member_left(0, 0);
        assert_eq!(state, TurnState::NoGame);
    }

    #[test]
    fn test_member_left_without_game_is_noop() {
        let mut state = TurnState::NoGame;
        state.member_left(0, 3);
        assert_eq!(state, TurnState::NoGame);
    }

    #[test]
    fn test_pointer_always_valid_after_any_leave() {
        // Exhaustive over small rooms: every (turn, removed) pair leaves
        // the pointer inside the shrunken roster.
        for size in 1..=6usize {
            for turn in 0..size {
                for removed in 0..size {
                    let mut state = in_progress(turn);
                    state.member_left(removed, size - 1);
                    match state.current() {
                        None => assert_eq!(size, 1),
                        Some(t) => assert!(
                            t < size - 1,
                            "size {size} turn {turn} removed {removed} → {t}"
                        ),
                    }
                }
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TurnState::NoGame.to_string(), "NoGame");
        assert_eq!(in_progress(2).to_string(), "InProgress(2)");
    }
}
