//! Lantern Double - a lantern-lit walk through a striped forest
//!
//! Core modules:
//! - `sim`: Map generation, session state and the per-frame update step
//! - `renderer`: Camera projection and layered 2D drawing over a `Surface`
//! - `audio`: Procedural ambient bed and encounter pulse
//! - `scheduler`: Frame scheduling capability and session-keyed delayed tasks
//! - `controller`: Owns the live session and wires everything together
//! - `platform`: Browser wiring (wasm32) or a headless scripted driver
//! - `settings`: Data-driven tuning loaded from JSON

pub mod audio;
pub mod controller;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use controller::{GameController, StatusSink};
pub use input::ControlInput;
pub use settings::Settings;

/// Game loop constants
pub mod consts {
    /// Milliseconds that count as one `dt` unit (60fps-equivalent frame)
    pub const FRAME_MS: f64 = 16.0;
    /// Largest real frame gap honoured; longer gaps (tab inactive) are capped
    pub const MAX_FRAME_MS: f64 = 40.0;

    /// Touch drag displacement (px) before an axis counts as pressed
    pub const DRAG_THRESHOLD: f32 = 8.0;

    /// Idle bob period divisor (ms) and per-frame amplitude (world px)
    pub const BOB_PERIOD_MS: f64 = 800.0;
    pub const BOB_AMPLITUDE: f32 = 0.02;

    /// Shallowest row the duplicate may spawn in
    pub const DUPLICATE_MIN_ROW: u32 = 3;
}

/// Convert a frame gap in milliseconds to a normalized `dt`
#[inline]
pub fn frame_dt(elapsed_ms: f64) -> f32 {
    (elapsed_ms.clamp(0.0, consts::MAX_FRAME_MS) / consts::FRAME_MS) as f32
}
