//! Lantern Double entry point
//!
//! On the web this boots the page; natively it plays one scripted session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    lantern_double::platform::web::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lantern_double::Settings;
    use lantern_double::platform::headless;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lantern Double (native) starting...");
    log::info!("Native mode runs a headless autopilot session - build for wasm32 to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(0x1a47e2);

    match headless::run(Settings::default(), seed, 20_000) {
        Ok(report) => {
            log::info!(
                "Seed {}: {:?} after {} frames (swap on {:?}, {} draw calls)",
                report.seed,
                report.phase,
                report.frames,
                report.swap_frame,
                report.draw_ops
            );
            if let Some(hint) = report.hint {
                println!("{hint}");
            }
        }
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
