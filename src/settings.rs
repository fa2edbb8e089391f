//! Game settings and tuning
//!
//! Every section carries serde defaults, so the host page can override only the
//! values it cares about. Settings are read-only for the lifetime of a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{FRAME_MS, MAX_FRAME_MS};

/// Settings loading/validation failures
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("world needs at least 3 columns, got {0}")]
    TooFewColumns(u32),
    #[error("world needs at least 5 rows, got {0}")]
    TooFewRows(u32),
    #[error("`{0}` must be positive")]
    NonPositive(&'static str),
    #[error("return step {step} can jump the {tolerance}px arrival window")]
    ReturnOvershoot { step: f32, tolerance: f32 },
}

/// Grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    pub cols: u32,
    pub rows: u32,
    /// Cell size in world pixels
    pub cell: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            cols: 15,
            rows: 12,
            cell: 48.0,
        }
    }
}

/// Player spawn and movement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Spawn column (row is always the middle row)
    pub start_col: u32,
    /// World px per `dt` unit
    pub speed: f32,
    pub lantern_radius: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            start_col: 2,
            speed: 2.2,
            lantern_radius: 120.0,
        }
    }
}

/// Encounter and ending thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterSettings {
    /// Distance below which the swap fires
    pub trigger_distance: f32,
    /// Extra distance past the lantern radius at which the duplicate is drawn
    pub reveal_margin: f32,
    /// Duplicate walk speed after the swap (world px per `dt` unit)
    pub return_speed: f32,
    /// Target x the duplicate walks to; `None` means one cell from the left edge
    pub village_x: Option<f32>,
    /// Arrival tolerance around `village_x`
    pub arrive_tolerance: f32,
    /// Delay between the swap and the audio pulse
    pub pulse_delay_ms: f64,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            trigger_distance: 48.0,
            reveal_margin: 30.0,
            return_speed: 0.6,
            village_x: None,
            arrive_tolerance: 8.0,
            pulse_delay_ms: 600.0,
        }
    }
}

/// Encounter pulse envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    pub frequency: f32,
    pub bus_gain: f32,
    pub start_gain: f32,
    pub peak_gain: f32,
    pub floor_gain: f32,
    /// Seconds from pulse start to peak
    pub attack: f64,
    /// Seconds from pulse start to floor
    pub release: f64,
    /// Seconds from pulse start to oscillator stop
    pub stop_after: f64,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            frequency: 190.0,
            bus_gain: 0.12,
            start_gain: 0.001,
            peak_gain: 0.05,
            floor_gain: 0.0001,
            attack: 0.12,
            release: 0.9,
            stop_after: 1.1,
        }
    }
}

/// Ambient bed and pulse parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Whether sound starts enabled
    pub enabled: bool,
    pub master_gain: f32,
    /// Length of the looped noise buffer
    pub noise_seconds: f32,
    /// Exponential decay rate baked into the noise buffer
    pub noise_decay: f32,
    pub filter_frequency: f32,
    pub filter_q: f32,
    pub drone_frequency: f32,
    pub drone_gain: f32,
    pub pulse: PulseSettings,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            master_gain: 0.08,
            noise_seconds: 2.0,
            noise_decay: 4.0,
            filter_frequency: 700.0,
            filter_q: 0.7,
            drone_frequency: 220.0,
            drone_gain: 0.0001,
            pulse: PulseSettings::default(),
        }
    }
}

/// Text shown once the session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingText {
    pub headline: String,
    pub subline: String,
    /// Written to the status hint slot
    pub hint: String,
}

impl Default for EndingText {
    fn default() -> Self {
        Self {
            headline: "في الصباح عاد... لكنّه لم يكن هو.".to_string(),
            subline: "دور ضحية جديدة...".to_string(),
            hint: "انتهت الجولة — شاهد النهاية الصادمة".to_string(),
        }
    }
}

/// Complete game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub world: WorldSettings,
    pub player: PlayerSettings,
    pub encounter: EncounterSettings,
    pub audio: AudioSettings,
    pub ending: EndingText,
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants the map generator and spawner rely on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.world.cols < 3 {
            return Err(SettingsError::TooFewColumns(self.world.cols));
        }
        if self.world.rows < 5 {
            return Err(SettingsError::TooFewRows(self.world.rows));
        }
        if self.world.cell <= 0.0 {
            return Err(SettingsError::NonPositive("world.cell"));
        }
        if self.player.speed <= 0.0 {
            return Err(SettingsError::NonPositive("player.speed"));
        }
        if self.player.lantern_radius <= 0.0 {
            return Err(SettingsError::NonPositive("player.lantern_radius"));
        }
        if self.encounter.trigger_distance <= 0.0 {
            return Err(SettingsError::NonPositive("encounter.trigger_distance"));
        }
        let encounter = &self.encounter;
        if encounter.return_speed <= 0.0 {
            return Err(SettingsError::NonPositive("encounter.return_speed"));
        }
        if encounter.arrive_tolerance <= 0.0 {
            return Err(SettingsError::NonPositive("encounter.arrive_tolerance"));
        }
        // Largest single step must land inside the window around village_x
        let step = encounter.return_speed * (MAX_FRAME_MS / FRAME_MS) as f32;
        if step >= 2.0 * encounter.arrive_tolerance {
            return Err(SettingsError::ReturnOvershoot {
                step,
                tolerance: encounter.arrive_tolerance,
            });
        }
        if self.audio.noise_seconds <= 0.0 {
            return Err(SettingsError::NonPositive("audio.noise_seconds"));
        }
        Ok(())
    }

    /// Resolved target x for the returning duplicate
    pub fn village_x(&self) -> f32 {
        self.encounter.village_x.unwrap_or(self.world.cell)
    }
}
