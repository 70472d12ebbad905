use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{debug, warn};

use crate::classifier::ActivityClassifier;
use crate::codec;
use crate::config::{CalorieTable, TrackerConfig};
use crate::error::TrackError;
use crate::features::FeatureExtractor;
use crate::geo::RoundTo;
use crate::ingest::AccelerometerIngest;
use crate::location::{FixOutcome, LocationTracker};
use crate::models::{ActivityKind, ExerciseRecord, LocationFix, Session, TrackingMode};
use crate::smoothing::ActivitySmoother;

/// Mottar et frosset snapshot etter hver aksepterte oppdatering,
/// og et siste ved `stop`. Kalles aldri med delvis oppdatert tilstand.
pub trait SnapshotObserver: Send + Sync {
    fn on_update(&self, snapshot: &Session);
}

/// All muterbar økt-tilstand. Finnes kun mellom `start` og `stop` —
/// ingen prosessglobal tilstand (eksplisitt øktkontekst, ikke singleton).
struct ActiveSession {
    session: Session,
    location: LocationTracker,
    smoother: ActivitySmoother,
    calories: CalorieTable,
    start_ms: i64,
}

impl ActiveSession {
    /// Regner om de avledede feltene. Kalles med låsen holdt.
    fn refresh_derived(&mut self, now_ms: i64) {
        self.session.duration_s = ((now_ms - self.start_ms).max(0)) as f64 / 1000.0;
        self.session.distance_m = self.location.total_distance_m();
        self.session.climb_m = self.location.climb_m();
        self.session.current_speed_ms = self.location.current_speed_ms();

        self.session.avg_speed_ms = if self.session.duration_s > 0.0 {
            self.session.distance_m / self.session.duration_s
        } else {
            0.0
        };
        // Vakt mot null distanse — pace er udefinert uten bevegelse.
        self.session.avg_pace_s_per_m = if self.session.distance_m > 0.0 {
            self.session.duration_s / self.session.distance_m
        } else {
            0.0
        };
        self.session.calories_kcal =
            (self.session.distance_m / 1000.0) * self.calories.kcal_per_km(self.session.activity);
    }
}

struct Worker {
    handle: JoinHandle<()>,
    shutdown_tx: Sender<()>,
}

/// Aggregatoren: eier øktaggregatet, fletter begge sensorstrømmene og
/// orkestrerer start/stopp.
///
/// Tilstandsmaskin: Idle → Tracking → Idle. `start` på aktiv økt og
/// `stop` på inaktiv er no-ops.
pub struct SessionTracker {
    config: TrackerConfig,
    observer: Option<Arc<dyn SnapshotObserver>>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    worker: Option<Worker>,
}

impl SessionTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            observer: None,
            active: Arc::new(Mutex::new(None)),
            worker: None,
        }
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SnapshotObserver>) {
        self.observer = Some(observer);
    }

    pub fn is_tracking(&self) -> bool {
        let guard = match self.active.lock() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        guard.is_some()
    }

    /// Frosset kopi av gjeldende økt (None når Idle).
    pub fn snapshot(&self) -> Option<Session> {
        let guard = match self.active.lock() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        guard.as_ref().map(|a| a.session.clone())
    }

    /// Starter en ny økt. No-op (Ok(None)) hvis en økt allerede spores.
    ///
    /// I automatisk modus returneres `AccelerometerIngest`; kalleren eier
    /// den i sensorens callback-kontekst og mater den med råavlesninger.
    /// `has_linear_acceleration` sier om plattformen alt leverer
    /// tyngdekraftfri akselerasjon.
    pub fn start(
        &mut self,
        mode: TrackingMode,
        activity_hint: ActivityKind,
        has_linear_acceleration: bool,
    ) -> Result<Option<AccelerometerIngest>, TrackError> {
        if self.is_tracking() {
            debug!("start ignorert: økt pågår allerede");
            return Ok(None);
        }

        // Valider blokkstørrelsen FØR tilstanden settes, så en ugyldig
        // konfigurasjon ikke etterlater en halvstartet økt.
        let extractor = if mode == TrackingMode::Automatic {
            Some(FeatureExtractor::new(self.config.block_size)?)
        } else {
            None
        };

        {
            let mut guard = match self.active.lock() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            let now = Utc::now();
            *guard = Some(ActiveSession {
                session: Session::new(mode, activity_hint, now),
                location: LocationTracker::new(
                    self.config.accuracy_limit_m,
                    self.config.min_movement_m,
                    self.config.max_speed_ms,
                ),
                smoother: ActivitySmoother::new(self.config.smoothing_window),
                calories: self.config.calories,
                start_ms: now.timestamp_millis(),
            });
        }
        debug!("økt startet i {:?}-modus", mode);

        let Some(extractor) = extractor else {
            return Ok(None);
        };

        // Automatisk modus: én dedikert arbeidstråd drenerer køen og kjører
        // feature-ekstraksjon → klassifisering → glatting.
        let ingest = AccelerometerIngest::new(&self.config, has_linear_acceleration);
        let sample_rx = ingest.receiver();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let active = Arc::clone(&self.active);
        let observer = self.observer.clone();
        let handle = thread::spawn(move || {
            classification_loop(extractor, sample_rx, shutdown_rx, active, observer);
        });

        self.worker = Some(Worker { handle, shutdown_tx });
        Ok(Some(ingest))
    }

    /// Én posisjonsoppdatering inn. Ignoreres når Idle og i manuell modus;
    /// forkastede fixes endrer ingenting og publiserer ikke.
    pub fn on_location(&self, fix: &LocationFix) {
        let snapshot = {
            let mut guard = match self.active.lock() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            let Some(a) = guard.as_mut() else { return };
            if a.session.mode == TrackingMode::Manual {
                return;
            }

            match a.location.accept(fix) {
                FixOutcome::Rejected => return,
                FixOutcome::Accepted => {
                    a.session.route = a.location.route().to_vec();
                }
                FixOutcome::Jitter => {}
            }
            a.refresh_derived(Utc::now().timestamp_millis());
            a.session.clone()
        };
        self.publish(&snapshot);
    }

    /// Stopper økten og leverer den ferdigstilte posten til kalleren.
    /// No-op (None) når Idle.
    ///
    /// Rekkefølgen er kontraktsfestet: (1) koble fra begge kildene,
    /// (2) ferdigstill klassifisering/varighetsregnskap, (3) beregn
    /// endelige avledede verdier, (4) serialiser ruta, (5) varsle.
    pub fn stop(&mut self) -> Option<ExerciseRecord> {
        // (1) Ta tilstanden ut: videre fixes og klassifiseringer ser Idle
        // og blir no-ops. Deretter stoppes arbeidstråden kooperativt.
        let mut a = {
            let mut guard = match self.active.lock() {
                Ok(g) => g,
                Err(p) => p.into_inner(),
            };
            guard.take()?
        };
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown_tx.send(());
            if worker.handle.join().is_err() {
                warn!("klassifiseringstråden avsluttet med panikk");
            }
        }

        let now_ms = Utc::now().timestamp_millis();

        // (2) Varighetsdominant aktivitet overstyrer siste glattede etikett.
        if a.session.mode == TrackingMode::Automatic {
            a.session.activity = a.smoother.finalize_at(now_ms);
        }

        // (3) Endelige avledede verdier, avrundet ved frysing.
        a.refresh_derived(now_ms);
        a.session.distance_m = a.session.distance_m.round_to(2);
        a.session.climb_m = a.session.climb_m.round_to(2);
        a.session.avg_speed_ms = a.session.avg_speed_ms.round_to(2);
        a.session.avg_pace_s_per_m = a.session.avg_pace_s_per_m.round_to(4);
        a.session.calories_kcal = a.session.calories_kcal.round_to(2);

        // (4) Rute-payload: manuelle økter sporet aldri (None); sporede
        // økter får alltid en gyldig payload, også med null punkter.
        let route_bytes = if a.session.mode == TrackingMode::Manual {
            None
        } else {
            Some(codec::encode_route(&a.session.route))
        };

        // (5) Siste snapshot ut til observatøren, post til kalleren.
        self.publish(&a.session);
        debug!(
            "økt stoppet: {:?}, {:.0} m på {:.0} s",
            a.session.activity, a.session.distance_m, a.session.duration_s
        );
        Some(ExerciseRecord::from_session(&a.session, route_bytes))
    }

    fn publish(&self, snapshot: &Session) {
        if let Some(obs) = &self.observer {
            obs.on_update(snapshot);
        }
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        // Rydd opp arbeidstråden også når kalleren glemmer stop().
        if let Some(worker) = self.worker.take() {
            let _ = worker.shutdown_tx.send(());
            let _ = worker.handle.join();
        }
    }
}

/// Arbeidstrådens konsumsløyfe. Kanselleringssignalet sjekkes øverst i
/// hver runde (kooperativt, ingen tvungen avbrytelse).
///
/// En dårlig blokk absorberes lokalt: hopp over, behold forrige etikett —
/// tråden dør aldri av sensorfeil.
fn classification_loop(
    extractor: FeatureExtractor,
    sample_rx: Receiver<f64>,
    shutdown_rx: Receiver<()>,
    active: Arc<Mutex<Option<ActiveSession>>>,
    observer: Option<Arc<dyn SnapshotObserver>>,
) {
    let block_size = extractor.block_size();
    let mut classifier = ActivityClassifier::new(extractor.feature_len());
    let mut block: Vec<f64> = Vec::with_capacity(block_size);
    debug!("klassifiseringstråd startet (blokk = {block_size})");

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(sample_rx) -> msg => {
                let Ok(m) = msg else { break }; // produsenten er borte
                block.push(m);
                if block.len() < block_size {
                    continue;
                }

                match extractor.extract(&block) {
                    Ok(features) => {
                        let prediction = classifier.classify(&features);
                        apply_prediction(prediction, &active, &observer);
                    }
                    Err(e) => warn!("hopper over blokk: {e}"),
                }
                block.clear();
            }
        }
    }
    debug!("klassifiseringstråd stoppet");
}

fn apply_prediction(
    prediction: ActivityKind,
    active: &Arc<Mutex<Option<ActiveSession>>>,
    observer: &Option<Arc<dyn SnapshotObserver>>,
) {
    let snapshot = {
        let mut guard = match active.lock() {
            Ok(g) => g,
            Err(p) => p.into_inner(),
        };
        let Some(a) = guard.as_mut() else { return };

        let now_ms = Utc::now().timestamp_millis();
        let smoothed = a.smoother.push_at(prediction, now_ms);
        a.session.activity = smoothed;
        a.refresh_derived(now_ms);
        a.session.clone()
    };
    if let Some(obs) = observer {
        obs.on_update(&snapshot);
    }
}
