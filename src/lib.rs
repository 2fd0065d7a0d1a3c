#![warn(missing_docs)]
//! Hex territory exploration game.
//!
//! Walk a hex grid, gather wood and stone from resource nodes, and spend them
//! to claim neighboring hexes. Each claim reveals the cells around it.

pub mod editor;
pub mod gathering;
pub mod hud;
pub mod inventory;
pub mod math;
pub mod player;
pub mod territory;

use bevy::prelude::*;

/// Application-wide game state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal gameplay: walking, gathering, paying.
    #[default]
    Running,
    /// Debug overlay active (Tab to toggle).
    Debugging,
}

/// Player position on the ground plane. The player controller writes it;
/// payment and gathering read it.
#[derive(Resource, Default, Reflect)]
pub struct PlayerPos {
    /// World position; `y` stays 0.
    pub pos: Vec3,
}
