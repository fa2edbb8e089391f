//! Layered scene drawing
//!
//! Draw order per frame: background streaks, map, darkness, lantern hole,
//! lit map, duplicate (light-gated), player, vignette.

use glam::Vec2;
use rand::Rng;

use super::camera::{Camera, Viewport};
use super::surface::{Composite, RadialGradient, Surface};
use crate::settings::EndingText;
use crate::sim::{GameSession, World};

const BACKGROUND: &str = "#060607";
const GROUND: &str = "#091015";
const OBSTACLE: &str = "#071013";
const TRUNK: &str = "rgba(30,22,20,0.6)";
const OPENING: &str = "#11141a";
const DARKNESS: &str = "rgba(0,0,0,0.85)";
const VIGNETTE: &str = "rgba(0,0,0,0.2)";
const SWAP_FLASH: &str = "rgba(255,255,255,0.12)";
const ENDING_BACKDROP: &str = "rgba(0,0,0,0.98)";
const ENDING_HEADLINE: &str = "#e6e6e6";
const ENDING_SUBLINE: &str = "#d9a94b";
const PLAYER_BODY: &str = "#e6d9c4";
const LANTERN_ICON: &str = "#d9a94b";
const DUPLICATE_OUTLINE: &str = "rgba(200,220,255,0.7)";

const LANTERN_HOLE_STOPS: &[(f32, &str)] = &[
    (0.0, "rgba(0,0,0,1)"),
    (0.7, "rgba(0,0,0,0.85)"),
    (1.0, "rgba(0,0,0,0)"),
];
const LANTERN_GLOW_STOPS: &[(f32, &str)] = &[
    (0.0, "rgba(255,235,200,0.95)"),
    (0.4, "rgba(255,220,140,0.28)"),
    (1.0, "rgba(0,0,0,0)"),
];
const DUPLICATE_GLOW_STOPS: &[(f32, &str)] =
    &[(0.0, "rgba(180,200,255,0.9)"), (1.0, "rgba(0,0,0,0)")];

/// Number of background tree streaks
pub const STREAK_COUNT: usize = 18;
/// Height of each vignette strip
pub const VIGNETTE_HEIGHT: f64 = 30.0;
/// Gap left between neighbouring tiles
const TILE_GAP: f32 = 2.0;
const PLAYER_RADIUS: f64 = 8.0;

/// Draw one full frame of a session
///
/// `rng` drives the tree streak flicker only.
pub fn draw_scene<S: Surface, R: Rng>(
    surface: &mut S,
    session: &GameSession,
    viewport: Viewport,
    rng: &mut R,
) {
    let camera = Camera::follow(session.player.pos, viewport);
    let lantern = session.player.lantern_radius as f64;
    let p = camera.world_to_screen(session.player.pos);
    let (px, py) = (p.x as f64, p.y as f64);

    draw_background(surface, viewport, rng);
    draw_map(surface, session, &camera);

    // Darkness over everything
    surface.set_fill_color(DARKNESS);
    surface.fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);

    // Cut the lantern hole
    surface.save();
    surface.set_composite(Composite::DestinationOut);
    surface.set_fill_gradient(&RadialGradient {
        x: px,
        y: py,
        inner_radius: 10.0,
        outer_radius: lantern,
        stops: LANTERN_HOLE_STOPS,
    });
    surface.fill_circle(px, py, lantern);
    surface.restore();

    // Tile detail only inside the light
    surface.save();
    surface.clip_circle(px, py, lantern);
    draw_map(surface, session, &camera);
    surface.restore();

    if session.duplicate_visible() {
        if let Some(dup) = &session.duplicate {
            draw_duplicate(surface, camera.world_to_screen(dup.pos));
        }
    }

    draw_player(surface, p, lantern);

    surface.set_fill_color(VIGNETTE);
    surface.fill_rect(0.0, 0.0, viewport.width as f64, VIGNETTE_HEIGHT);
    surface.fill_rect(
        0.0,
        viewport.height as f64 - VIGNETTE_HEIGHT,
        viewport.width as f64,
        VIGNETTE_HEIGHT,
    );
}

/// Faint white flash drawn over the frame in which the swap happens
pub fn draw_swap_flash<S: Surface>(surface: &mut S, viewport: Viewport) {
    surface.save();
    surface.set_fill_color(SWAP_FLASH);
    surface.fill_rect(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    surface.restore();
}

/// Final blackout with two centered lines
pub fn draw_ending<S: Surface>(surface: &mut S, viewport: Viewport, text: &EndingText) {
    let (w, h) = (viewport.width as f64, viewport.height as f64);
    surface.set_fill_color(ENDING_BACKDROP);
    surface.fill_rect(0.0, 0.0, w, h);

    surface.set_fill_color(ENDING_HEADLINE);
    surface.fill_text_centered(&text.headline, w / 2.0, h / 2.0 - 14.0, "28px sans-serif");
    surface.set_fill_color(ENDING_SUBLINE);
    surface.fill_text_centered(&text.subline, w / 2.0, h / 2.0 + 24.0, "20px sans-serif");
}

fn draw_background<S: Surface, R: Rng>(surface: &mut S, viewport: Viewport, rng: &mut R) {
    let (w, h) = (viewport.width as f64, viewport.height as f64);
    surface.set_fill_color(BACKGROUND);
    surface.fill_rect(0.0, 0.0, w, h);

    // Distant trees
    for i in 0..STREAK_COUNT {
        let alpha = 0.03 + rng.random::<f64>() * 0.08;
        surface.set_fill_color(&format!("rgba(10,10,12,{alpha:.3})"));
        let x = (i as f64 / STREAK_COUNT as f64) * w + (i as f64 * 3.0).sin() * 20.0;
        let y = 40.0 + (i % 3) as f64 * 10.0;
        surface.fill_rect(x, y, 14.0, h - 80.0);
    }
}

fn draw_map<S: Surface>(surface: &mut S, session: &GameSession, camera: &Camera) {
    let World { cols, cell, .. } = session.world;
    let size = cell - TILE_GAP;
    let side = size as f64;

    for (r, row) in session.rows.iter().enumerate() {
        for c in 0..cols {
            let origin = Vec2::new(c as f32 * cell, r as f32 * cell);
            if !camera.is_visible(origin, Vec2::splat(size)) {
                continue;
            }
            let scr = camera.world_to_screen(origin);
            let (x, y) = (scr.x as f64, scr.y as f64);

            surface.set_fill_color(GROUND);
            surface.fill_rect(x, y, side, side);
            if row.is_open(c) {
                surface.set_fill_color(OPENING);
                surface.fill_rect(x, y, side, side);
            } else {
                surface.set_fill_color(OBSTACLE);
                surface.fill_rect(x, y, side, side);
                surface.set_fill_color(TRUNK);
                surface.fill_rect(x + 10.0, y, 10.0, side);
            }
        }
    }
}

fn draw_duplicate<S: Surface>(surface: &mut S, s: Vec2) {
    let (x, y) = (s.x as f64, s.y as f64);
    surface.set_fill_gradient(&RadialGradient {
        x,
        y,
        inner_radius: 4.0,
        outer_radius: 28.0,
        stops: DUPLICATE_GLOW_STOPS,
    });
    surface.fill_circle(x, y, 10.0);
    surface.set_stroke_color(DUPLICATE_OUTLINE);
    surface.stroke_circle(x, y, 9.0);
}

fn draw_player<S: Surface>(surface: &mut S, s: Vec2, lantern: f64) {
    let (x, y) = (s.x as f64, s.y as f64);

    // Lantern glow
    surface.set_composite(Composite::Lighter);
    surface.set_fill_gradient(&RadialGradient {
        x,
        y,
        inner_radius: 20.0,
        outer_radius: lantern,
        stops: LANTERN_GLOW_STOPS,
    });
    surface.fill_circle(x, y, lantern);
    surface.set_composite(Composite::SourceOver);

    surface.set_fill_color(PLAYER_BODY);
    surface.fill_circle(x, y, PLAYER_RADIUS);
    surface.set_fill_color(LANTERN_ICON);
    surface.fill_rect(x + 10.0, y - 4.0, 6.0, 8.0);
}
