//! RunTrack-kjernen: gjør to uavhengige sensorstrømmer (GPS-fixes og rå
//! 3-akse-akselerometer) om til én levende øktpost — distanse, hastighet,
//! pace, stigning, kaloriestimat, klassifisert aktivitet og rute.
//!
//! Dataflyt: akselerometer-callback → tyngdekraftfilter → magnitude →
//! begrenset kø → arbeidstråd → FFT-features → beslutningstre → glatting →
//! `SessionTracker`. Posisjons-callback → `LocationTracker` →
//! `SessionTracker`. Aggregatoren publiserer et frosset snapshot etter
//! hver oppdatering og leverer en ferdigstilt post ved stopp.
//!
//! UI, kartvisning og selve lagringsimplementasjonen i appen er eksterne
//! samarbeidspartnere; kjernen konsumerer kun kontraktene deres.

pub mod classifier;
pub mod codec;
pub mod config;
pub mod error;
pub mod features;
pub mod geo;
pub mod ingest;
pub mod location;
pub mod models;
pub mod session;
pub mod smoothing;
pub mod storage;

pub use config::{load_config, save_config, CalorieTable, TrackerConfig};
pub use error::TrackError;
pub use models::{
    ActivityKind, ExerciseRecord, GeoPoint, LocationFix, Session, TrackingMode,
};
pub use session::{SessionTracker, SnapshotObserver};
pub use storage::{JsonFileStore, SessionStore};
