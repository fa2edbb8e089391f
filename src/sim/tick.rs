//! Per-frame simulation step
//!
//! Advances one session by a normalized `dt` (1.0 = one 60fps frame) and
//! reports phase transitions. Walls are drawn but never collide.

use super::state::{DuplicateState, GameEvent, GamePhase, GameSession};
use crate::consts::{BOB_AMPLITUDE, BOB_PERIOD_MS, FRAME_MS};
use crate::input::ControlInput;

/// Advance the session by one step
///
/// Returns the transitions that happened during this step, in order. At most
/// one `Swapped` and one `Ended` event is ever produced per session.
pub fn tick(session: &mut GameSession, input: &ControlInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if !session.phase.is_running() {
        return events;
    }

    session.clock_ms += dt as f64 * FRAME_MS;

    // Player movement
    let dir = input.direction();
    let player = &mut session.player;
    player.pos = session.world.clamp(player.pos + dir * player.speed * dt);

    // Encounter trigger
    session.distance = session.duplicate_distance();
    if let Some(d) = session.distance {
        if d < session.encounter.trigger_distance && session.phase == GamePhase::Exploring {
            trigger_swap(session);
            events.push(GameEvent::Swapped);
        }
    }

    // Duplicate behaviour
    let clock_ms = session.clock_ms;
    let village_x = session.village_x;
    let Some(dup) = session.duplicate.as_mut() else {
        return events;
    };
    match dup.state {
        DuplicateState::Idle => {
            let phase = clock_ms / BOB_PERIOD_MS + dup.cell.y as f64;
            dup.pos.x += phase.sin() as f32 * BOB_AMPLITUDE;
        }
        DuplicateState::Returning => {
            let step = (village_x - dup.pos.x).signum() * session.encounter.return_speed * dt;
            dup.pos.x += step;
            if (dup.pos.x - village_x).abs() < session.encounter.arrive_tolerance
                && session.phase == GamePhase::Swapped
            {
                session.phase = GamePhase::Ended;
                log::info!("Session {} ended: duplicate reached the village", session.id.0);
                events.push(GameEvent::Ended);
            }
        }
    }

    events
}

/// `Exploring -> Swapped`: freeze the player, send the duplicate home
fn trigger_swap(session: &mut GameSession) {
    session.phase = GamePhase::Swapped;
    session.player.speed = 0.0;
    if let Some(dup) = session.duplicate.as_mut() {
        dup.state = DuplicateState::Returning;
    }
    log::info!(
        "Session {} swapped at distance {:.1}",
        session.id.0,
        session.distance.unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::SessionId;
    use glam::Vec2;
    use proptest::prelude::*;

    fn session() -> GameSession {
        GameSession::new(SessionId(1), &Settings::default(), 12345)
    }

    /// Put the duplicate `dx` px to the right of the player
    fn place_duplicate(session: &mut GameSession, dx: f32) {
        let target = session.player.pos + Vec2::new(dx, 0.0);
        session.duplicate.as_mut().unwrap().pos = target;
    }

    fn input(up: bool, down: bool, left: bool, right: bool) -> ControlInput {
        ControlInput {
            up,
            down,
            left,
            right,
        }
    }

    #[test]
    fn test_distance_50_no_swap_47_swaps() {
        let mut s = session();
        place_duplicate(&mut s, 50.0);
        // dt = 0 keeps both entities still except for the idle bob
        let events = tick(&mut s, &ControlInput::default(), 0.0);
        assert!(events.is_empty());
        assert_eq!(s.phase, GamePhase::Exploring);
        assert_eq!(s.distance_readout(), Some(50));

        place_duplicate(&mut s, 47.0);
        let events = tick(&mut s, &ControlInput::default(), 0.0);
        assert_eq!(events, vec![GameEvent::Swapped]);
        assert_eq!(s.phase, GamePhase::Swapped);
        assert_eq!(s.player.speed, 0.0);
        assert_eq!(
            s.duplicate.as_ref().unwrap().state,
            DuplicateState::Returning
        );
    }

    #[test]
    fn test_swap_fires_once() {
        let mut s = session();
        place_duplicate(&mut s, 10.0);
        let mut swaps = 0;
        for _ in 0..30 {
            let events = tick(&mut s, &input(false, false, false, true), 1.0);
            swaps += events.iter().filter(|e| **e == GameEvent::Swapped).count();
        }
        assert_eq!(swaps, 1);
    }

    #[test]
    fn test_player_frozen_after_swap() {
        let mut s = session();
        place_duplicate(&mut s, 20.0);
        tick(&mut s, &ControlInput::default(), 1.0);
        assert_eq!(s.phase, GamePhase::Swapped);

        let frozen = s.player.pos;
        for _ in 0..20 {
            tick(&mut s, &input(true, false, true, false), 2.5);
        }
        assert_eq!(s.player.pos, frozen);
    }

    #[test]
    fn test_duplicate_walks_home_and_ends() {
        let mut s = session();
        place_duplicate(&mut s, 30.0);
        tick(&mut s, &ControlInput::default(), 0.0);
        assert_eq!(s.phase, GamePhase::Swapped);

        let start_x = s.duplicate.as_ref().unwrap().pos.x;
        tick(&mut s, &ControlInput::default(), 1.0);
        let after = s.duplicate.as_ref().unwrap().pos.x;
        assert!((start_x - after - 0.6).abs() < 1e-4, "moves 0.6 px per frame toward x=48");

        let mut ended = 0;
        for _ in 0..2000 {
            let events = tick(&mut s, &ControlInput::default(), 1.0);
            ended += events.iter().filter(|e| **e == GameEvent::Ended).count();
            if s.phase == GamePhase::Ended {
                break;
            }
        }
        assert_eq!(ended, 1);
        assert_eq!(s.phase, GamePhase::Ended);
        let dup_x = s.duplicate.as_ref().unwrap().pos.x;
        assert!((dup_x - s.village_x).abs() < 8.0);
    }

    #[test]
    fn test_no_updates_after_end() {
        let mut s = session();
        s.phase = GamePhase::Ended;
        let player = s.player.pos;
        let dup = s.duplicate.as_ref().unwrap().pos;
        let clock = s.clock_ms;

        let events = tick(&mut s, &input(false, true, false, true), 2.5);
        assert!(events.is_empty());
        assert_eq!(s.player.pos, player);
        assert_eq!(s.duplicate.as_ref().unwrap().pos, dup);
        assert_eq!(s.clock_ms, clock);
    }

    #[test]
    fn test_end_only_fires_while_swapped() {
        let mut s = session();
        // Returning duplicate parked at the village while still exploring
        let village_x = s.village_x;
        let far_y = s.player.pos.y + 400.0;
        let dup = s.duplicate.as_mut().unwrap();
        dup.state = DuplicateState::Returning;
        dup.pos = Vec2::new(village_x + 1.0, far_y);

        let events = tick(&mut s, &ControlInput::default(), 1.0);
        assert!(events.is_empty());
        assert_eq!(s.phase, GamePhase::Exploring);
    }

    #[test]
    fn test_preview_never_ticks() {
        let mut s = GameSession::preview(SessionId(0), &Settings::default(), 1);
        let before = s.player.pos;
        tick(&mut s, &input(false, false, false, true), 1.0);
        assert_eq!(s.player.pos, before);
    }

    #[test]
    fn test_walls_do_not_block() {
        let mut s = session();
        // Keep the duplicate far away
        s.duplicate = None;
        let start = s.player.pos;
        // Walk straight up through whatever obstacles are in the way
        for _ in 0..20 {
            tick(&mut s, &input(true, false, false, false), 1.0);
        }
        assert!((start.y - s.player.pos.y - 44.0).abs() < 1e-3);
    }

    #[test]
    fn test_idle_bob_is_tiny() {
        let mut s = session();
        s.player.pos = Vec2::splat(24.0);
        let before = s.duplicate.as_ref().unwrap().pos;
        tick(&mut s, &ControlInput::default(), 1.0);
        let after = s.duplicate.as_ref().unwrap().pos;
        assert_eq!(before.y, after.y);
        assert!((before.x - after.x).abs() <= 0.021);
    }

    proptest! {
        #[test]
        fn prop_displacement_is_speed_times_dt(
            up in any::<bool>(),
            down in any::<bool>(),
            left in any::<bool>(),
            right in any::<bool>(),
            dt in 0.01f32..2.5,
        ) {
            let mut s = session();
            s.duplicate = None;
            // Middle of the world so clamping never interferes
            s.player.pos = Vec2::new(s.world.width() / 2.0, s.world.height() / 2.0);
            let ci = input(up, down, left, right);
            let before = s.player.pos;
            tick(&mut s, &ci, dt);
            let moved = (s.player.pos - before).length();
            if ci.direction() == Vec2::ZERO {
                prop_assert_eq!(moved, 0.0);
            } else {
                prop_assert!((moved - s.player.speed * dt).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_player_stays_in_bounds(
            steps in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), 0.0f32..2.5), 1..200),
            speed in 0.0f32..80.0,
        ) {
            let mut s = session();
            s.duplicate = None;
            s.player.speed = speed;
            let (min, max) = s.world.bounds();
            for (up, down, left, right, dt) in steps {
                tick(&mut s, &input(up, down, left, right), dt);
                prop_assert!(s.player.pos.x >= min.x && s.player.pos.x <= max.x);
                prop_assert!(s.player.pos.y >= min.y && s.player.pos.y <= max.y);
            }
        }

        #[test]
        fn prop_phase_is_monotonic(
            seed in any::<u64>(),
            steps in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()), 1..400),
        ) {
            let mut s = GameSession::new(SessionId(1), &Settings::default(), seed);
            let mut last = s.phase;
            let mut swaps = 0;
            for (up, down, left, right) in steps {
                let events = tick(&mut s, &input(up, down, left, right), 2.5);
                swaps += events.iter().filter(|e| **e == GameEvent::Swapped).count();
                prop_assert!(s.phase >= last);
                last = s.phase;
            }
            prop_assert!(swaps <= 1);
        }
    }
}
