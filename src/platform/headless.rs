//! Headless scripted session
//!
//! Drives a full session without a browser: manual frames at a fixed 16ms
//! step, silent audio, a recording surface, and an autopilot that walks the
//! player straight at the duplicate.

use crate::audio::SilentBackend;
use crate::consts::FRAME_MS;
use crate::controller::{GameController, StatusSink};
use crate::input::ControlInput;
use crate::renderer::{RecordingSurface, Viewport};
use crate::scheduler::ManualFrames;
use crate::settings::{Settings, SettingsError};
use crate::sim::{GamePhase, GameSession};

/// Outcome of a scripted run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub seed: u64,
    pub frames: u32,
    pub phase: GamePhase,
    /// Frame on which the swap happened
    pub swap_frame: Option<u32>,
    pub last_distance: Option<u32>,
    pub hint: Option<String>,
    /// Draw calls issued across all frames
    pub draw_ops: usize,
}

#[derive(Debug, Default)]
struct LogStatus {
    last_distance: Option<u32>,
    hint: Option<String>,
}

impl StatusSink for LogStatus {
    fn set_distance(&mut self, distance: u32) {
        if self.last_distance != Some(distance) {
            log::trace!("distance {}", distance);
        }
        self.last_distance = Some(distance);
    }

    fn set_hint(&mut self, hint: &str) {
        log::info!("hint: {}", hint);
        self.hint = Some(hint.to_string());
    }
}

/// Steer toward the duplicate, one axis pair at a time
pub fn autopilot(session: &GameSession) -> ControlInput {
    let Some(dup) = &session.duplicate else {
        return ControlInput::default();
    };
    let delta = dup.pos - session.player.pos;
    ControlInput {
        up: delta.y < -1.0,
        down: delta.y > 1.0,
        left: delta.x < -1.0,
        right: delta.x > 1.0,
    }
}

/// Play one session to the end (or until `max_frames`)
pub fn run(settings: Settings, seed: u64, max_frames: u32) -> Result<HeadlessReport, SettingsError> {
    settings.validate()?;

    let mut game = GameController::new(
        settings,
        ManualFrames::new(),
        SilentBackend,
        Viewport::default(),
        seed,
    );
    let mut surface = RecordingSurface::new();
    let mut status = LogStatus::default();

    game.start(seed);

    let mut now = 0.0;
    let mut frames = 0;
    let mut swap_frame = None;
    let mut draw_ops = 0;

    while frames < max_frames && game.scheduler_mut().take() {
        now += FRAME_MS;
        let input = game.session().map(autopilot).unwrap_or_default();
        surface.clear();
        game.frame(now, &input, &mut surface, &mut status);
        frames += 1;
        draw_ops += surface.ops.len();

        if swap_frame.is_none()
            && matches!(game.phase(), Some(GamePhase::Swapped | GamePhase::Ended))
        {
            log::info!("Swap on frame {}", frames);
            swap_frame = Some(frames);
        }
    }

    let phase = game.phase().unwrap_or(GamePhase::NotStarted);
    if phase != GamePhase::Ended {
        log::warn!("Run stopped after {} frames in {:?}", frames, phase);
    }

    Ok(HeadlessReport {
        seed,
        frames,
        phase,
        swap_frame,
        last_distance: status.last_distance,
        hint: status.hint,
        draw_ops,
    })
}
