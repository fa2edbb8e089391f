//! Ambient audio
//!
//! Procedurally generated - no external files needed! A looped, decaying noise
//! buffer through a bandpass filter forms the bed, a near-silent sine drone sits
//! under it, and the encounter layers a short swelling pulse on top.
//!
//! Audio is optional: every failure degrades to silence with a warning.

#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::settings::{AudioSettings, PulseSettings};

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

/// Audio subsystem failures (never fatal to the game)
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio unavailable: {0}")]
    Unavailable(String),
    #[error("failed to build audio node: {0}")]
    Node(String),
}

/// An acquired, playing ambient graph
pub trait AmbientGraph {
    /// Layer one encounter pulse on top of the bed
    fn pulse(&mut self, params: &PulseSettings) -> Result<(), AudioError>;
    /// Stop every node and release the underlying device
    fn release(self);
}

/// Something that can build an ambient graph
pub trait AudioBackend {
    type Graph: AmbientGraph;

    /// Build and start the bed; `rng` feeds the noise buffer
    fn acquire(&mut self, params: &AudioSettings, rng: &mut Pcg32)
    -> Result<Self::Graph, AudioError>;
}

/// Synthesize the looped noise bed
///
/// White noise in `[-1, 1)` shaped by `exp(-decay * i / n)`, so every loop
/// starts loud and fades out.
pub fn synthesize_noise(sample_rate: f32, params: &AudioSettings, rng: &mut impl Rng) -> Vec<f32> {
    let len = (params.noise_seconds * sample_rate).round().max(1.0) as usize;
    let n = len as f32;
    (0..len)
        .map(|i| {
            let white = rng.random::<f32>() * 2.0 - 1.0;
            white * (-(i as f32) / n * params.noise_decay).exp()
        })
        .collect()
}

/// Backend for environments with no audio device
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentBackend;

/// Never constructed; `SilentBackend` always fails to acquire
#[derive(Debug)]
pub enum NoGraph {}

impl AmbientGraph for NoGraph {
    fn pulse(&mut self, _params: &PulseSettings) -> Result<(), AudioError> {
        match *self {}
    }

    fn release(self) {
        match self {}
    }
}

impl AudioBackend for SilentBackend {
    type Graph = NoGraph;

    fn acquire(&mut self, _params: &AudioSettings, _rng: &mut Pcg32) -> Result<NoGraph, AudioError> {
        Err(AudioError::Unavailable("no audio device".to_string()))
    }
}

/// Ambient engine: enabled flag plus at most one live graph
pub struct AmbientEngine<B: AudioBackend> {
    backend: B,
    graph: Option<B::Graph>,
    enabled: bool,
    params: AudioSettings,
    rng: Pcg32,
}

impl<B: AudioBackend> AmbientEngine<B> {
    pub fn new(backend: B, params: AudioSettings, seed: u64) -> Self {
        Self {
            backend,
            graph: None,
            enabled: params.enabled,
            params,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a graph is currently acquired
    pub fn is_playing(&self) -> bool {
        self.graph.is_some()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start the bed if enabled and not already playing
    pub fn start(&mut self) {
        if !self.enabled || self.graph.is_some() {
            return;
        }
        match self.backend.acquire(&self.params, &mut self.rng) {
            Ok(graph) => {
                log::info!("Ambient audio started");
                self.graph = Some(graph);
            }
            Err(e) => log::warn!("Audio not available - continuing silently: {}", e),
        }
    }

    /// Stop and release the bed (keeps the enabled flag)
    pub fn stop(&mut self) {
        if let Some(graph) = self.graph.take() {
            graph.release();
            log::info!("Ambient audio stopped");
        }
    }

    /// Flip the enabled flag; starts the bed only when `session_active`
    ///
    /// Returns the new enabled state.
    pub fn toggle(&mut self, session_active: bool) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.stop();
        } else if session_active {
            self.start();
        }
        log::debug!("Audio enabled: {}", self.enabled);
        self.enabled
    }

    /// Play the encounter pulse; no-op when silent or already torn down
    pub fn pulse(&mut self) {
        if !self.enabled {
            return;
        }
        let Some(graph) = self.graph.as_mut() else {
            log::debug!("Pulse skipped - no ambient graph");
            return;
        };
        if let Err(e) = graph.pulse(&self.params.pulse) {
            log::warn!("Encounter pulse failed: {}", e);
        }
    }
}

impl<B: AudioBackend> Drop for AmbientEngine<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
