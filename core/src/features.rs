use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::TrackError;

/// Gjør en blokk med akselerasjonsmagnituder om til en spektral
/// feature-vektor: |FFT-koeffisient| for alle B bins, etterfulgt av
/// blokkas toppmagnitude. Lengde = B + 1.
///
/// Ren funksjon av input — identisk blokk gir identisk vektor.
pub struct FeatureExtractor {
    block_size: usize,
    fft: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}

impl FeatureExtractor {
    /// `block_size` må være en potens av to (radix-2 FFT).
    pub fn new(block_size: usize) -> Result<Self, TrackError> {
        if block_size == 0 || !block_size.is_power_of_two() {
            return Err(TrackError::BlockSize(block_size));
        }
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(block_size);
        Ok(Self { block_size, fft })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Lengden på feature-vektoren (B spektralbins + 1 toppverdi).
    pub fn feature_len(&self) -> usize {
        self.block_size + 1
    }

    /// Feil blokklengde er en bruksfeil, ikke noe som trunkeres stille.
    pub fn extract(&self, block: &[f64]) -> Result<Vec<f64>, TrackError> {
        if block.len() != self.block_size {
            return Err(TrackError::BlockLength {
                expected: self.block_size,
                got: block.len(),
            });
        }

        let max = block.iter().copied().fold(0.0_f64, f64::max);

        // Imaginærdel initialiseres til null; transformen kjøres in-place.
        let mut buf: Vec<Complex<f64>> =
            block.iter().map(|&m| Complex::new(m, 0.0)).collect();
        self.fft.process(&mut buf);

        let mut features: Vec<f64> = buf.iter().map(|c| c.norm()).collect();
        features.push(max);
        Ok(features)
    }
}
