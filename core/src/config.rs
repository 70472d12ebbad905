use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::models::ActivityKind;

/// Kaloritabell (kcal per km) per aktivitet. Heuristikk, ikke fysiologi.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CalorieTable {
    pub standing: f64,
    pub walking: f64,
    pub running: f64,
}

impl Default for CalorieTable {
    fn default() -> Self {
        Self {
            standing: 30.0,
            walking: 50.0,
            running: 62.0,
        }
    }
}

impl CalorieTable {
    pub fn kcal_per_km(&self, kind: ActivityKind) -> f64 {
        match kind {
            ActivityKind::Standing => self.standing,
            ActivityKind::Walking => self.walking,
            ActivityKind::Running => self.running,
        }
    }
}

/// Statisk konfigurasjon for hele sporingskjernen.
/// Leveres utenfra ved `start`; ingen prosessglobal tilstand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Fixes med dårligere horisontal nøyaktighet enn dette forkastes (m).
    pub accuracy_limit_m: f64,
    /// Minste bevegelse som gir nytt rutepunkt (m) — jitterdemping.
    pub min_movement_m: f64,
    /// Implisert hastighet over dette er GPS-teleport; fixen droppes (m/s).
    pub max_speed_ms: f64,
    /// Eksponentielt tyngdekraftfilter: gravity ← α·gravity + (1−α)·rå.
    pub gravity_alpha: f64,
    /// Magnituder under dette klippes til 0 (demper drift i ro).
    pub noise_floor: f64,
    /// Blokkstørrelse for feature-ekstraksjon. Må være en potens av to.
    pub block_size: usize,
    /// Vindusstørrelse K for flertallsglatting av prediksjoner.
    pub smoothing_window: usize,
    /// Kapasitet på prøvekøen mellom sensor-callback og arbeidstråd.
    pub queue_capacity: usize,
    /// Dokumentert samplingkadens (Hz). Kjernen styrer ikke strømforbruk.
    pub sample_rate_hz: f64,
    pub calories: CalorieTable,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            accuracy_limit_m: 20.0,
            min_movement_m: 2.0,
            max_speed_ms: 44.7, // ≈ 100 mph
            gravity_alpha: 0.99,
            noise_floor: 0.2,
            block_size: 64,
            smoothing_window: 10,
            queue_capacity: 1024,
            sample_rate_hz: 50.0,
            calories: CalorieTable::default(),
        }
    }
}

/// Leser inn konfigurasjon fra disk (JSON).
/// Hvis filen ikke finnes, returneres default-konfigurasjonen.
pub fn load_config(path: &str) -> Result<TrackerConfig, TrackError> {
    if Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)?;
        let cfg: TrackerConfig = serde_json::from_str(&contents)?;
        info!("📂 Konfigurasjon lastet fra {path}");
        Ok(cfg)
    } else {
        warn!("⚠️ Fant ikke konfigurasjon på {path}, returnerer default");
        Ok(TrackerConfig::default())
    }
}

/// Lagrer konfigurasjon til disk som JSON (pretty-print).
pub fn save_config(cfg: &TrackerConfig, path: &str) -> Result<(), TrackError> {
    let json = serde_json::to_string_pretty(cfg)?;
    std::fs::write(path, json)?;
    info!("✅ Konfigurasjon lagret til {path}");
    Ok(())
}
