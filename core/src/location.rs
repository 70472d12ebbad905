use log::debug;

use crate::geo::haversine_m;
use crate::models::{GeoPoint, LocationFix};

/// Utfall av ett fix. Forkastede fixes er ikke feil — de ignoreres stille.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// Punktet ble lagt til ruta og distansen oppdatert.
    Accepted,
    /// Bevegelse under terskel: hastighet/stigning oppdatert, intet rutepunkt.
    Jitter,
    /// Dårlig nøyaktighet eller implausibelt hopp: tilstanden er urørt.
    Rejected,
}

#[derive(Debug, Clone, Copy)]
struct LastFix {
    point: GeoPoint,
    timestamp_ms: i64,
    altitude_m: Option<f64>,
}

/// Filtrerer og akkumulerer GPS-fixes til distanse, hastighet og stigning.
///
/// Invarianter: total distanse er monotont ikke-synkende; ruta inneholder
/// aldri to nabopunkter nærmere enn `min_movement_m`, og aldri et punkt som
/// impliserer hastighet over `max_speed_ms` mot forgjengeren.
#[derive(Debug, Clone)]
pub struct LocationTracker {
    accuracy_limit_m: f64,
    min_movement_m: f64,
    max_speed_ms: f64,

    route: Vec<GeoPoint>,
    total_distance_m: f64,
    climb_m: f64,
    current_speed_ms: f64,
    last: Option<LastFix>,
}

impl LocationTracker {
    pub fn new(accuracy_limit_m: f64, min_movement_m: f64, max_speed_ms: f64) -> Self {
        Self {
            accuracy_limit_m,
            min_movement_m,
            max_speed_ms,
            route: Vec::new(),
            total_distance_m: 0.0,
            climb_m: 0.0,
            current_speed_ms: 0.0,
            last: None,
        }
    }

    pub fn accept(&mut self, fix: &LocationFix) -> FixOutcome {
        if !fix.accuracy_m.is_finite() || fix.accuracy_m > self.accuracy_limit_m {
            debug!("fix forkastet: nøyaktighet {:.1} m", fix.accuracy_m);
            return FixOutcome::Rejected;
        }

        let point = GeoPoint { lat: fix.lat, lon: fix.lon };

        let Some(last) = self.last else {
            // Første aksepterte fix: frø for videre beregning, null distanse.
            self.route.push(point);
            self.current_speed_ms = fix.speed_ms.unwrap_or(0.0).max(0.0);
            self.last = Some(LastFix {
                point,
                timestamp_ms: fix.timestamp_ms,
                altitude_m: fix.altitude_m,
            });
            return FixOutcome::Accepted;
        };

        let d = haversine_m(last.point, point);
        let dt_s = (fix.timestamp_ms - last.timestamp_ms) as f64 / 1000.0;
        if dt_s <= 0.0 {
            // Uten gyldig tidssteg kan ikke implisert hastighet vurderes.
            debug!("fix forkastet: ikke-positivt tidssteg ({dt_s} s)");
            return FixOutcome::Rejected;
        }

        let implied_ms = d / dt_s;
        if implied_ms >= self.max_speed_ms {
            // GPS-teleport: dropp helt, ikke engang last_accepted røres.
            debug!("fix forkastet: implisert hastighet {:.1} m/s", implied_ms);
            return FixOutcome::Rejected;
        }

        // Foretrekk enhetens rapporterte hastighet, ellers avledet d/Δt.
        self.current_speed_ms = fix.speed_ms.unwrap_or(implied_ms).max(0.0);

        // Stigning: kun positive høydedeltaer akkumuleres, aldri trekk.
        if let (Some(prev_alt), Some(alt)) = (last.altitude_m, fix.altitude_m) {
            let dh = alt - prev_alt;
            if dh > 0.0 {
                self.climb_m += dh;
            }
        }

        let appended = d >= self.min_movement_m;
        if appended {
            self.route.push(point);
            self.total_distance_m += d;
        }

        self.last = Some(LastFix {
            point,
            timestamp_ms: fix.timestamp_ms,
            altitude_m: fix.altitude_m.or(last.altitude_m),
        });

        if appended { FixOutcome::Accepted } else { FixOutcome::Jitter }
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn climb_m(&self) -> f64 {
        self.climb_m
    }

    pub fn current_speed_ms(&self) -> f64 {
        self.current_speed_ms
    }

    pub fn route(&self) -> &[GeoPoint] {
        &self.route
    }
}
