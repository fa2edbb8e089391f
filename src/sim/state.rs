//! Session state and core simulation types
//!
//! A `GameSession` is built on start and replaced wholesale on restart; nothing
//! in here survives from one session to the next.

use glam::{UVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::map::{generate_map, spawn_row};
use crate::settings::{EncounterSettings, Settings, WorldSettings};

/// Identity of one session, used to key delayed tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Top-level session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GamePhase {
    /// Scenery preview before the first start; never ticks
    NotStarted,
    /// Free movement, duplicate idles
    Exploring,
    /// Player frozen, duplicate walks to the village
    Swapped,
    /// Terminal; ending overlay shown
    Ended,
}

impl GamePhase {
    /// Whether the update loop should keep running
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Exploring | GamePhase::Swapped)
    }
}

/// Phase transitions reported by `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Player came within trigger distance of the duplicate
    Swapped,
    /// Duplicate reached the village
    Ended,
}

/// Immutable grid dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    pub cols: u32,
    pub rows: u32,
    /// Cell size in world pixels
    pub cell: f32,
}

impl From<WorldSettings> for World {
    fn from(ws: WorldSettings) -> Self {
        Self {
            cols: ws.cols,
            rows: ws.rows,
            cell: ws.cell,
        }
    }
}

impl World {
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell
    }

    /// World-pixel center of a grid cell
    pub fn cell_center(&self, cell: UVec2) -> Vec2 {
        (cell.as_vec2() + Vec2::splat(0.5)) * self.cell
    }

    /// Inclusive movement bounds: half a cell in from every edge
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = self.cell / 2.0;
        (
            Vec2::splat(half),
            Vec2::new(self.width() - half, self.height() - half),
        )
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        let (min, max) = self.bounds();
        pos.clamp(min, max)
    }
}

/// One map row with a single passable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRow {
    pub open_column: u32,
}

impl MapRow {
    pub fn is_open(&self, col: u32) -> bool {
        col == self.open_column
    }
}

/// The lantern carrier
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Spawn cell
    pub cell: UVec2,
    /// World px per `dt` unit; zeroed on the swap
    pub speed: f32,
    pub lantern_radius: f32,
}

/// Duplicate behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateState {
    /// Cosmetic bob in place
    Idle,
    /// Walking to the village after the swap
    Returning,
}

/// The player's double
#[derive(Debug, Clone)]
pub struct Duplicate {
    pub pos: Vec2,
    pub cell: UVec2,
    pub state: DuplicateState,
}

/// The single live game session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    pub seed: u64,
    pub world: World,
    pub rows: Vec<MapRow>,
    pub player: Player,
    pub duplicate: Option<Duplicate>,
    pub phase: GamePhase,
    /// Simulated milliseconds since start (sum of normalized frame steps)
    pub clock_ms: f64,
    /// Last measured player-duplicate distance
    pub distance: Option<f32>,
    /// Where the duplicate walks after the swap
    pub village_x: f32,
    pub encounter: EncounterSettings,
}

impl GameSession {
    /// Build a running session: map, player and duplicate from `seed`
    pub fn new(id: SessionId, settings: &Settings, seed: u64) -> Self {
        let (mut session, mut rng) = Self::build(id, settings, seed);

        let row = spawn_row(&session.world, &mut rng);
        let cell = UVec2::new(session.rows[row as usize].open_column, row);
        session.duplicate = Some(Duplicate {
            pos: session.world.cell_center(cell),
            cell,
            state: DuplicateState::Idle,
        });
        session.phase = GamePhase::Exploring;
        session
    }

    /// Build a scenery-only session (no duplicate) for the title screen
    pub fn preview(id: SessionId, settings: &Settings, seed: u64) -> Self {
        Self::build(id, settings, seed).0
    }

    /// Map and player; returns the RNG so spawning continues the same stream
    fn build(id: SessionId, settings: &Settings, seed: u64) -> (Self, Pcg32) {
        let world = World::from(settings.world);
        let mut rng = Pcg32::seed_from_u64(seed);
        let rows = generate_map(&world, &mut rng);

        let start_col = settings.player.start_col.min(world.cols - 1);
        let cell = UVec2::new(start_col, world.rows / 2);
        let player = Player {
            pos: world.cell_center(cell),
            cell,
            speed: settings.player.speed,
            lantern_radius: settings.player.lantern_radius,
        };

        let session = Self {
            id,
            seed,
            world,
            rows,
            player,
            duplicate: None,
            phase: GamePhase::NotStarted,
            clock_ms: 0.0,
            distance: None,
            village_x: settings.village_x(),
            encounter: settings.encounter,
        };
        (session, rng)
    }

    /// Distance from the player to the duplicate, if one exists
    pub fn duplicate_distance(&self) -> Option<f32> {
        self.duplicate
            .as_ref()
            .map(|d| d.pos.distance(self.player.pos))
    }

    /// Integer readout for the status display
    pub fn distance_readout(&self) -> Option<u32> {
        self.distance.map(|d| d.max(0.0).round() as u32)
    }

    /// Whether the duplicate is close enough to the lantern to be drawn
    pub fn duplicate_visible(&self) -> bool {
        self.duplicate_distance()
            .is_some_and(|d| d < self.player.lantern_radius + self.encounter.reveal_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_spawns() {
        let settings = Settings::default();
        let session = GameSession::new(SessionId(1), &settings, 42);

        assert_eq!(session.phase, GamePhase::Exploring);
        assert_eq!(session.rows.len(), 12);
        assert_eq!(session.player.cell, UVec2::new(2, 6));
        assert_eq!(session.player.pos, Vec2::new(120.0, 312.0));

        let dup = session.duplicate.as_ref().unwrap();
        assert_eq!(dup.state, DuplicateState::Idle);
        assert!((3..=10).contains(&dup.cell.y));
        assert!(session.rows[dup.cell.y as usize].is_open(dup.cell.x));
        assert_eq!(dup.pos, session.world.cell_center(dup.cell));
    }

    #[test]
    fn test_same_seed_same_session() {
        let settings = Settings::default();
        let a = GameSession::new(SessionId(1), &settings, 7);
        let b = GameSession::new(SessionId(2), &settings, 7);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.duplicate.unwrap().cell, b.duplicate.unwrap().cell);
    }

    #[test]
    fn test_preview_has_no_duplicate() {
        let session = GameSession::preview(SessionId(0), &Settings::default(), 3);
        assert_eq!(session.phase, GamePhase::NotStarted);
        assert!(session.duplicate.is_none());
        assert!(!session.duplicate_visible());
        assert_eq!(session.distance_readout(), None);
    }

    #[test]
    fn test_world_bounds() {
        let world = World::from(WorldSettings::default());
        let (min, max) = world.bounds();
        assert_eq!(min, Vec2::splat(24.0));
        assert_eq!(max, Vec2::new(15.0 * 48.0 - 24.0, 12.0 * 48.0 - 24.0));
        assert_eq!(world.clamp(Vec2::new(-100.0, 9999.0)), Vec2::new(24.0, max.y));
    }

    #[test]
    fn test_duplicate_visibility_margin() {
        let mut session = GameSession::new(SessionId(1), &Settings::default(), 1);
        let player = session.player.pos;
        let dup = session.duplicate.as_mut().unwrap();

        dup.pos = player + Vec2::new(149.0, 0.0);
        assert!(session.duplicate_visible());

        session.duplicate.as_mut().unwrap().pos = player + Vec2::new(150.0, 0.0);
        assert!(!session.duplicate_visible());
    }

    #[test]
    fn test_phase_order() {
        assert!(GamePhase::Exploring < GamePhase::Swapped);
        assert!(GamePhase::Swapped < GamePhase::Ended);
        assert!(GamePhase::Swapped.is_running());
        assert!(!GamePhase::Ended.is_running());
        assert!(!GamePhase::NotStarted.is_running());
    }
}
