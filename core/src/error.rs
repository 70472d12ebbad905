use thiserror::Error;

/// Felles feiltype for kjernen.
/// Sensorstøy og forkastede fixes er IKKE feil (de absorberes lokalt);
/// dette er kontraktsbrudd og IO-problemer som skal opp til kalleren.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("feature-blokk har feil lengde: ventet {expected}, fikk {got}")]
    BlockLength { expected: usize, got: usize },

    #[error("blokkstørrelse må være en potens av to, fikk {0}")]
    BlockSize(usize),

    #[error("ugyldig rutedata: {0}")]
    RouteData(String),

    #[error("io-feil: {0}")]
    Io(#[from] std::io::Error),

    #[error("json-feil: {0}")]
    Json(#[from] serde_json::Error),
}
