use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hvordan økten ble startet. Manual-økter konsumerer ingen sensorstrømmer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingMode {
    Manual,
    Gps,
    Automatic,
}

/// Aktivitetsklasse fra klassifisereren (og fra brukerens hint i manuell modus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Standing,
    Walking,
    Running,
}

impl ActivityKind {
    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Standing => "Standing",
            ActivityKind::Walking => "Walking",
            ActivityKind::Running => "Running",
        }
    }

    /// Mapping fra aktivitets-id (hint fra UI-laget). Ukjent id => Standing.
    pub fn from_id(id: i32) -> Self {
        match id {
            1 => ActivityKind::Walking,
            2 => ActivityKind::Running,
            _ => ActivityKind::Standing,
        }
    }
}

/// Ett punkt i ruta (grader). Rekkefølgen i ruta = kronologisk aksept-rekkefølge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Rå posisjonsoppdatering fra stedstjenesten (ekstern input).
#[derive(Debug, Clone, Copy)]
pub struct LocationFix {
    pub lat: f64,                // grader
    pub lon: f64,                // grader
    pub speed_ms: Option<f64>,   // m/s, rapportert av enheten hvis tilgjengelig
    pub altitude_m: Option<f64>, // meter
    pub accuracy_m: f64,         // horisontal nøyaktighet, meter
    pub timestamp_ms: i64,       // epoch-millisekunder
}

/// Øktaggregatet. Muteres av nøyaktig én logisk skriver (SessionTracker);
/// observatører ser kun klonede snapshots, aldri et halvoppdatert aggregat.
///
/// Alle interne enheter er SI: meter, sekunder, m/s. Pace lagres som s/m.
/// Konvertering til visningsenheter skjer utenfor kjernen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub mode: TrackingMode,
    pub activity: ActivityKind,
    pub start_time_utc: DateTime<Utc>,
    pub duration_s: f64,
    pub distance_m: f64,
    pub avg_speed_ms: f64,
    pub avg_pace_s_per_m: f64,
    pub current_speed_ms: f64,
    pub climb_m: f64,
    pub calories_kcal: f64,
    pub route: Vec<GeoPoint>,
}

impl Session {
    pub fn new(mode: TrackingMode, activity: ActivityKind, start_time_utc: DateTime<Utc>) -> Self {
        Self {
            mode,
            activity,
            start_time_utc,
            duration_s: 0.0,
            distance_m: 0.0,
            avg_speed_ms: 0.0,
            avg_pace_s_per_m: 0.0,
            current_speed_ms: 0.0,
            climb_m: 0.0,
            calories_kcal: 0.0,
            route: Vec::new(),
        }
    }
}

/// Ferdigstilt økt slik den overleveres til lagringslaget.
///
/// `route_bytes = None` betyr "aldri sporet" (manuell økt). En økt som
/// sporet uten å akseptere punkter får en gyldig null-telling-payload,
/// ikke `None` — kallere må kunne skille de to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRecord {
    pub id: i64,
    pub mode: TrackingMode,
    pub activity: ActivityKind,
    pub start_time_utc: DateTime<Utc>,
    pub duration_s: f64,
    pub distance_m: f64,
    pub avg_speed_ms: f64,
    pub avg_pace_s_per_m: f64,
    pub climb_m: f64,
    pub calories_kcal: f64,
    pub route_bytes: Option<Vec<u8>>,
}

impl ExerciseRecord {
    /// Fryser et øktsnapshot til en lagringsrad. Id settes av lagringslaget.
    pub fn from_session(session: &Session, route_bytes: Option<Vec<u8>>) -> Self {
        Self {
            id: 0,
            mode: session.mode,
            activity: session.activity,
            start_time_utc: session.start_time_utc,
            duration_s: session.duration_s,
            distance_m: session.distance_m,
            avg_speed_ms: session.avg_speed_ms,
            avg_pace_s_per_m: session.avg_pace_s_per_m,
            climb_m: session.climb_m,
            calories_kcal: session.calories_kcal,
            route_bytes,
        }
    }
}
