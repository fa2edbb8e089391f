//! 2D rendering module
//!
//! The scene is drawn through the `Surface` trait so the same layering code
//! runs against a browser canvas or a recorder.

pub mod camera;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;
pub mod surface;

pub use camera::{Camera, Viewport};
#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{draw_ending, draw_scene, draw_swap_flash};
pub use surface::{Composite, DrawOp, RadialGradient, RecordingSurface, Surface};
