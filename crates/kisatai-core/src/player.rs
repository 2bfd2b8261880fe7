use serde::{Deserialize, Serialize};

use crate::game_trait::PlayerSlot;

/// A combatant entered into a match, as chosen before the match starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub slot: PlayerSlot,
    pub display_name: String,
    /// Character identifier looked up in the roster (e.g. `"katshuma"`).
    pub character: String,
    pub controller: Controller,
}

/// Who produces the contestant's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    #[default]
    Keyboard,
    Cpu,
    Scripted,
}

impl Contestant {
    pub fn new(slot: PlayerSlot, character: impl Into<String>) -> Self {
        Self {
            slot,
            display_name: format!("Player{}", slot + 1),
            character: character.into(),
            controller: Controller::default(),
        }
    }

    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }
}
