use kisatai_core::game_trait::PlayerSlot;
use thiserror::Error;

/// Errors raised while building a match. The simulation itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("unknown character id `{0}`")]
    UnknownCharacter(String),
    #[error("a match needs at least {required} contestants, got {got}")]
    NotEnoughContestants { required: usize, got: usize },
    #[error("a match supports at most {max} contestants, got {got}")]
    TooManyContestants { max: usize, got: usize },
    #[error("contestant at position {position} claims slot {slot}")]
    SlotMismatch { position: usize, slot: PlayerSlot },
}

pub type Result<T> = std::result::Result<T, RosterError>;
