//! Platform layer
//!
//! - `web` (wasm32): DOM wiring, `requestAnimationFrame` scheduling, exported
//!   console entry points
//! - `headless` (native): scripted autopilot session for smoke runs

#[cfg(not(target_arch = "wasm32"))]
pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;
