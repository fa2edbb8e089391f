//! Top-level game controller
//!
//! Owns the one live `GameSession` plus everything with a lifetime tied to it:
//! the ambient audio engine, the frame scheduler and pending delayed tasks.
//! Platforms feed it frames, input, resizes and the three control actions.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AmbientEngine, AudioBackend};
use crate::frame_dt;
use crate::input::ControlInput;
use crate::renderer::{Surface, Viewport, draw_ending, draw_scene, draw_swap_flash};
use crate::scheduler::{FrameScheduler, TaskQueue};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameSession, SessionId, tick};

/// Text outputs outside the canvas
pub trait StatusSink {
    /// Live distance to the duplicate, every running frame
    fn set_distance(&mut self, distance: u32);
    /// One-shot hint once the session ends
    fn set_hint(&mut self, hint: &str);
}

/// Delayed side effects a session can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTask {
    EncounterPulse,
}

/// Game controller
pub struct GameController<S: FrameScheduler, B: AudioBackend> {
    settings: Settings,
    session: Option<GameSession>,
    next_session: u64,
    scheduler: S,
    ambient: AmbientEngine<B>,
    tasks: TaskQueue<SessionTask>,
    viewport: Viewport,
    last_frame_ms: Option<f64>,
    /// Background flicker only
    streak_rng: Pcg32,
}

impl<S: FrameScheduler, B: AudioBackend> GameController<S, B> {
    /// `entropy` seeds the cosmetic RNG streams (flicker, noise)
    pub fn new(settings: Settings, scheduler: S, backend: B, viewport: Viewport, entropy: u64) -> Self {
        let ambient = AmbientEngine::new(backend, settings.audio, entropy);
        Self {
            settings,
            session: None,
            next_session: 1,
            scheduler,
            ambient,
            tasks: TaskQueue::new(),
            viewport,
            last_frame_ms: None,
            streak_rng: Pcg32::seed_from_u64(entropy ^ 0x5eed),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    /// Direct session access for scripted drivers and tests
    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    pub fn phase(&self) -> Option<GamePhase> {
        self.session.as_ref().map(|s| s.phase)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn ambient(&self) -> &AmbientEngine<B> {
        &self.ambient
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Show the scenery behind the title screen; ignored once a game started
    pub fn preview<Su: Surface>(&mut self, seed: u64, surface: &mut Su) {
        if self.session.as_ref().is_some_and(|s| s.phase != GamePhase::NotStarted) {
            return;
        }
        self.session = Some(GameSession::preview(SessionId(0), &self.settings, seed));
        self.redraw(surface);
    }

    /// Begin a new session, discarding the current one
    pub fn start(&mut self, seed: u64) -> SessionId {
        self.teardown();

        let id = SessionId(self.next_session);
        self.next_session += 1;
        self.session = Some(GameSession::new(id, &self.settings, seed));
        self.last_frame_ms = None;
        log::info!("Session {} started (seed {})", id.0, seed);

        self.ambient.start();
        self.scheduler.request_frame();
        id
    }

    /// Silence ambient audio without touching the session
    pub fn stop_ambient(&mut self) {
        self.ambient.stop();
    }

    /// Flip sound on/off; returns the new enabled state
    pub fn toggle_audio(&mut self) -> bool {
        let active = self.session.as_ref().is_some_and(|s| s.phase.is_running());
        self.ambient.toggle(active)
    }

    /// New canvas size; redraws immediately
    pub fn resize<Su: Surface>(&mut self, viewport: Viewport, surface: &mut Su) {
        self.viewport = viewport;
        self.redraw(surface);
    }

    /// Draw the current state without advancing it
    pub fn redraw<Su: Surface>(&mut self, surface: &mut Su) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        draw_scene(surface, session, self.viewport, &mut self.streak_rng);
        if session.phase == GamePhase::Ended {
            draw_ending(surface, self.viewport, &self.settings.ending);
        }
    }

    /// One scheduled frame: update, render, dispatch transitions, re-arm
    pub fn frame<Su: Surface, St: StatusSink>(
        &mut self,
        now_ms: f64,
        input: &ControlInput,
        surface: &mut Su,
        status: &mut St,
    ) {
        self.scheduler.frame_started();

        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.phase.is_running() {
            return;
        }

        let dt = self.last_frame_ms.map_or(0.0, |last| frame_dt(now_ms - last));
        self.last_frame_ms = Some(now_ms);

        for (owner, task) in self.tasks.drain_due(now_ms) {
            if owner != session.id {
                continue;
            }
            match task {
                SessionTask::EncounterPulse => self.ambient.pulse(),
            }
        }

        let events = tick(session, input, dt);
        if let Some(distance) = session.distance_readout() {
            status.set_distance(distance);
        }
        draw_scene(surface, session, self.viewport, &mut self.streak_rng);
        log::trace!("Frame dt={:.3} phase={:?}", dt, session.phase);

        for event in events {
            match event {
                GameEvent::Swapped => {
                    let due = now_ms + session.encounter.pulse_delay_ms;
                    self.tasks.schedule(session.id, due, SessionTask::EncounterPulse);
                    draw_swap_flash(surface, self.viewport);
                }
                GameEvent::Ended => {
                    let id = session.id;
                    self.ambient.stop();
                    self.tasks.invalidate(id);
                    draw_ending(surface, self.viewport, &self.settings.ending);
                    status.set_hint(&self.settings.ending.hint);
                    self.scheduler.cancel_frame();
                    return;
                }
            }
        }

        self.scheduler.request_frame();
    }

    /// Drop the current session and everything keyed to it
    fn teardown(&mut self) {
        let Some(old) = self.session.take() else {
            return;
        };
        let dropped = self.tasks.invalidate(old.id);
        self.ambient.stop();
        self.scheduler.cancel_frame();
        log::debug!(
            "Session {} torn down ({:?}, {} pending tasks dropped)",
            old.id.0,
            old.phase,
            dropped
        );
    }
}
