use log::debug;
use once_cell::sync::Lazy;

use crate::models::ActivityKind;

/// Hvilken komponent i feature-vektoren en node tester.
/// `Peak` er siste element (toppmagnituden) uansett blokkstørrelse.
#[derive(Debug, Clone, Copy)]
enum FeatureRef {
    Bin(usize),
    Peak,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(ActivityKind),
    Split {
        feature: FeatureRef,
        threshold: f64,
        /// nodeindeks når verdien er <= terskel
        le: usize,
        /// nodeindeks når verdien er > terskel
        gt: usize,
    },
}

/// Beslutningstre trent offline (Weka J48 over spektralfeatures).
/// Statisk konfigurasjonsdata — læres aldri om i kjørende system.
static DECISION_TREE: Lazy<Vec<Node>> = Lazy::new(|| {
    use ActivityKind::*;
    vec![
        // 0: DC-komponenten skiller ro fra bevegelse
        Node::Split { feature: FeatureRef::Bin(0), threshold: 13.390311, le: 1, gt: 2 },
        // 1
        Node::Leaf(Standing),
        // 2: toppmagnitude skiller løping fra gange
        Node::Split { feature: FeatureRef::Peak, threshold: 14.534508, le: 3, gt: 4 },
        // 3
        Node::Split { feature: FeatureRef::Bin(4), threshold: 14.034383, le: 5, gt: 6 },
        // 4
        Node::Leaf(Running),
        // 5
        Node::Split { feature: FeatureRef::Bin(7), threshold: 4.804712, le: 7, gt: 8 },
        // 6
        Node::Leaf(Walking),
        // 7
        Node::Leaf(Walking),
        // 8
        Node::Leaf(Running),
    ]
});

/// Deterministisk tre-evaluering over en feature-vektor med fast lengde.
///
/// Kaster aldri på misformet input: ved feil lengde eller ikke-finite
/// verdier returneres forrige stabile etikett, så pipelinen aldri dør
/// på en dårlig blokk.
pub struct ActivityClassifier {
    feature_len: usize,
    last: ActivityKind,
}

impl ActivityClassifier {
    pub fn new(feature_len: usize) -> Self {
        Self {
            feature_len,
            last: ActivityKind::Standing,
        }
    }

    pub fn classify(&mut self, features: &[f64]) -> ActivityKind {
        if features.len() != self.feature_len || features.iter().any(|v| !v.is_finite()) {
            debug!(
                "misformet feature-vektor (len {}), beholder {:?}",
                features.len(),
                self.last
            );
            return self.last;
        }

        let mut idx = 0usize;
        loop {
            match DECISION_TREE[idx] {
                Node::Leaf(kind) => {
                    self.last = kind;
                    return kind;
                }
                Node::Split { feature, threshold, le, gt } => {
                    let value = match feature {
                        FeatureRef::Peak => features[features.len() - 1],
                        FeatureRef::Bin(i) => {
                            // Bin utenfor vektoren: tre og blokk er inkonsistente.
                            let Some(&v) = features.get(i) else {
                                return self.last;
                            };
                            v
                        }
                    };
                    idx = if value <= threshold { le } else { gt };
                }
            }
        }
    }

    /// Forrige stabile etikett (brukes også som fallback).
    pub fn last_label(&self) -> ActivityKind {
        self.last
    }
}
