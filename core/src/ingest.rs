use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::config::TrackerConfig;

/// Begrenset prøvekø mellom sensor-callback og arbeidstråd.
/// Innsetting blokkerer aldri: ved full kø droppes eldste verdi —
/// lav latens prioriteres foran fullstendighet.
#[derive(Clone)]
pub struct SampleQueue {
    tx: Sender<f64>,
    rx: Receiver<f64>,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Ikke-blokkerende innsetting med dropp-eldst ved overløp.
    pub fn offer(&self, magnitude: f64) {
        if let Err(TrySendError::Full(v)) = self.tx.try_send(magnitude) {
            let _ = self.rx.try_recv();
            let _ = self.tx.try_send(v);
        }
    }

    /// Konsumentsiden: blokkerende `recv` på denne.
    pub fn receiver(&self) -> Receiver<f64> {
        self.rx.clone()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[inline]
pub fn magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

/// Sensorinntak: tyngdekraftkompensasjon, støygulv og kø-overlevering.
///
/// `on_raw_reading` kjøres i sensorens egen callback-kontekst og må aldri
/// blokkere. Eies av produsentsiden; arbeidstråden får kun `Receiver`.
pub struct AccelerometerIngest {
    gravity_alpha: f64,
    noise_floor: f64,
    /// Plattformen leverer allerede tyngdekraftfri (lineær) akselerasjon.
    has_linear: bool,
    gravity: [f64; 3],
    queue: SampleQueue,
}

impl AccelerometerIngest {
    pub fn new(cfg: &TrackerConfig, has_linear_acceleration: bool) -> Self {
        Self {
            gravity_alpha: cfg.gravity_alpha,
            noise_floor: cfg.noise_floor,
            has_linear: has_linear_acceleration,
            gravity: [0.0; 3],
            queue: SampleQueue::new(cfg.queue_capacity),
        }
    }

    /// Én rå 3-akse-avlesning (m/s²) inn, én filtrert magnitude i køen.
    pub fn on_raw_reading(&mut self, x: f64, y: f64, z: f64) {
        let (lx, ly, lz) = if self.has_linear {
            (x, y, z)
        } else {
            // Eksponentielt estimat av tyngdekraften, deretter subtraksjon.
            let a = self.gravity_alpha;
            self.gravity[0] = a * self.gravity[0] + (1.0 - a) * x;
            self.gravity[1] = a * self.gravity[1] + (1.0 - a) * y;
            self.gravity[2] = a * self.gravity[2] + (1.0 - a) * z;
            (x - self.gravity[0], y - self.gravity[1], z - self.gravity[2])
        };

        let raw = magnitude(lx, ly, lz);
        // Støygulv: små magnituder klippes til 0 for å dempe drift i ro.
        let filtered = if raw < self.noise_floor { 0.0 } else { raw };
        self.queue.offer(filtered);
    }

    pub fn receiver(&self) -> Receiver<f64> {
        self.queue.receiver()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}
