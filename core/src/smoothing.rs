use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use log::debug;

use crate::models::ActivityKind;

/// Akkumulert veggklokketid (ms) per aktivitet, målt over den *glattede*
/// etiketten. Brukes kun til ferdigstilling i automatisk modus.
#[derive(Debug, Clone, Default)]
pub struct DurationTally {
    buckets: HashMap<ActivityKind, i64>,
}

impl DurationTally {
    fn add(&mut self, kind: ActivityKind, ms: i64) {
        if ms > 0 {
            *self.buckets.entry(kind).or_insert(0) += ms;
        }
    }

    pub fn millis(&self, kind: ActivityKind) -> i64 {
        self.buckets.get(&kind).copied().unwrap_or(0)
    }

    /// Aktiviteten med størst akkumulert varighet.
    pub fn dominant(&self) -> Option<ActivityKind> {
        self.buckets
            .iter()
            .max_by_key(|(_, &ms)| ms)
            .map(|(&kind, _)| kind)
    }
}

/// Glidende flertallsavstemning over de siste K prediksjonene, pluss
/// varighetsregnskap for å kåre dominant aktivitet ved øktslutt.
///
/// Den ferdigstilte etiketten er eksplisitt varighetsvektet og overstyrer
/// den siste glattede: én lang løpetur med mange korte gå-blipp skal
/// ferdigstilles som Running, ikke Walking.
#[derive(Debug, Clone)]
pub struct ActivitySmoother {
    window: VecDeque<ActivityKind>,
    capacity: usize,
    tally: DurationTally,
    current: Option<ActivityKind>,
    last_change_ms: i64,
}

impl ActivitySmoother {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            tally: DurationTally::default(),
            current: None,
            last_change_ms: 0,
        }
    }

    /// Som `push`, men med eksplisitt klokke — testbar uten veggklokke.
    pub fn push_at(&mut self, prediction: ActivityKind, now_ms: i64) -> ActivityKind {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(prediction);

        let smoothed = self.vote();
        match self.current {
            None => {
                self.current = Some(smoothed);
                self.last_change_ms = now_ms;
            }
            Some(cur) if cur != smoothed => {
                // Tid siden forrige skifte krediteres den FORRIGE etiketten.
                self.tally.add(cur, now_ms - self.last_change_ms);
                debug!("glattet etikett: {:?} → {:?}", cur, smoothed);
                self.current = Some(smoothed);
                self.last_change_ms = now_ms;
            }
            _ => {}
        }
        smoothed
    }

    pub fn push(&mut self, prediction: ActivityKind) -> ActivityKind {
        self.push_at(prediction, Utc::now().timestamp_millis())
    }

    /// Flertall i vinduet; uavgjort brytes av den nyeste blant de likestilte.
    fn vote(&self) -> ActivityKind {
        let mut counts: HashMap<ActivityKind, usize> = HashMap::new();
        for &k in &self.window {
            *counts.entry(k).or_insert(0) += 1;
        }
        let best = counts.values().copied().max().unwrap_or(0);
        self.window
            .iter()
            .rev()
            .find(|&&k| counts[&k] == best)
            .copied()
            .unwrap_or(ActivityKind::Standing)
    }

    /// Kalles én gang ved øktslutt: skyller det siste påbegynte intervallet
    /// inn i regnskapet og returnerer varighetsdominant aktivitet.
    pub fn finalize_at(&mut self, now_ms: i64) -> ActivityKind {
        if let Some(cur) = self.current {
            self.tally.add(cur, now_ms - self.last_change_ms);
            self.last_change_ms = now_ms;
        }
        self.tally
            .dominant()
            .or(self.current)
            .unwrap_or(ActivityKind::Standing)
    }

    pub fn finalize(&mut self) -> ActivityKind {
        self.finalize_at(Utc::now().timestamp_millis())
    }

    /// Gjeldende glattede etikett (None før første prediksjon).
    pub fn smoothed(&self) -> Option<ActivityKind> {
        self.current
    }

    pub fn tally(&self) -> &DurationTally {
        &self.tally
    }
}
