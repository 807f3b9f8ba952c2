//! Keyboard mapping
//!
//! The host forwards `KeyboardEvent.key` strings; anything unmapped is ignored.

use serde::{Deserialize, Serialize};

use crate::sim::Direction;

/// A player intent decoded from one key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    PlaceBomb,
    /// Start or restart from a menu screen
    Confirm,
}

const KEYS_UP: &[&str] = &["ArrowUp", "w", "W"];
const KEYS_DOWN: &[&str] = &["ArrowDown", "s", "S"];
const KEYS_LEFT: &[&str] = &["ArrowLeft", "a", "A"];
const KEYS_RIGHT: &[&str] = &["ArrowRight", "d", "D"];
const KEYS_BOMB: &[&str] = &[" ", "Spacebar", "x", "X"];
const KEYS_CONFIRM: &[&str] = &["Enter"];

/// Decode a `KeyboardEvent.key` value
pub fn command_for_key(key: &str) -> Option<Command> {
    if KEYS_UP.contains(&key) {
        Some(Command::Move(Direction::Up))
    } else if KEYS_DOWN.contains(&key) {
        Some(Command::Move(Direction::Down))
    } else if KEYS_LEFT.contains(&key) {
        Some(Command::Move(Direction::Left))
    } else if KEYS_RIGHT.contains(&key) {
        Some(Command::Move(Direction::Right))
    } else if KEYS_BOMB.contains(&key) {
        Some(Command::PlaceBomb)
    } else if KEYS_CONFIRM.contains(&key) {
        Some(Command::Confirm)
    } else {
        None
    }
}
