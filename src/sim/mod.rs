//! Simulation module
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Seeded RNG only (map and spawn are reproducible per seed)
//! - Session clock advances with the normalized frame step
//! - Phase transitions come back from `tick` as events

pub mod map;
pub mod state;
pub mod tick;

pub use map::{generate_map, generate_map_with, open_column, spawn_row};
pub use state::{
    Duplicate, DuplicateState, GameEvent, GamePhase, GameSession, MapRow, Player, SessionId,
    World,
};
pub use tick::tick;
