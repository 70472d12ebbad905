use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::models::ExerciseRecord;

/// Lagringskontrakt for ferdigstilte økter. Kjernen gjør aldri retry —
/// feil går uendret tilbake til kalleren.
pub trait SessionStore {
    fn insert(&mut self, record: ExerciseRecord) -> Result<i64, TrackError>;
    fn get_by_id(&self, id: i64) -> Result<Option<ExerciseRecord>, TrackError>;
    fn delete(&mut self, id: i64) -> Result<(), TrackError>;
    fn delete_all(&mut self) -> Result<(), TrackError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: i64,
    records: Vec<ExerciseRecord>,
}

/// Enkel JSON-fil-lagring av øktposter.
/// Hvis filen ikke finnes ved åpning, startes det med et tomt arkiv.
pub struct JsonFileStore {
    path: PathBuf,
    file: StoreFile,
}

impl JsonFileStore {
    pub fn open(path: &str) -> Result<Self, TrackError> {
        let file = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            info!("📂 Øktarkiv lastet fra {path} ({} poster)", file.records.len());
            file
        } else {
            warn!("⚠️ Fant ikke øktarkiv på {path}, starter tomt");
            StoreFile { next_id: 1, records: Vec::new() }
        };
        Ok(Self { path: PathBuf::from(path), file })
    }

    fn persist(&self) -> Result<(), TrackError> {
        let json = serde_json::to_string_pretty(&self.file)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl SessionStore for JsonFileStore {
    fn insert(&mut self, mut record: ExerciseRecord) -> Result<i64, TrackError> {
        let id = self.file.next_id;
        self.file.next_id += 1;
        record.id = id;
        self.file.records.push(record);
        self.persist()?;
        info!("✅ Økt {id} lagret til {}", self.path.display());
        Ok(id)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<ExerciseRecord>, TrackError> {
        Ok(self.file.records.iter().find(|r| r.id == id).cloned())
    }

    fn delete(&mut self, id: i64) -> Result<(), TrackError> {
        let before = self.file.records.len();
        self.file.records.retain(|r| r.id != id);
        if self.file.records.len() != before {
            self.persist()?;
        }
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), TrackError> {
        self.file.records.clear();
        self.persist()
    }
}
