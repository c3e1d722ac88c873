//! Storage for questions submitted about talks.

use crate::{
    error::DataError,
    models::{StoredQuestion, TalkQuestion},
};
use actix_web::web;
use chrono::Utc;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use uuid::Uuid;

/// Append-only question log, optionally mirrored to a JSON file
#[derive(Clone, Default)]
pub struct QuestionStore {
    questions: Arc<Mutex<Vec<StoredQuestion>>>,
    path: Option<PathBuf>,
}

impl QuestionStore {
    /// Store that keeps questions in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading any questions already saved there
    pub fn open(path: PathBuf) -> Result<Self, DataError> {
        let existing = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| DataError::Io {
                path: path.clone(),
                source,
            })?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&raw).map_err(|source| DataError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            Vec::new()
        };

        tracing::info!(
            path = %path.display(),
            existing = existing.len(),
            "Opened question store"
        );

        Ok(Self {
            questions: Arc::new(Mutex::new(existing)),
            path: Some(path),
        })
    }

    /// Record a validated question for `talk_id`
    ///
    /// With a backing file the append and rewrite run on the blocking pool,
    /// so this must be awaited inside the actix runtime.
    pub async fn submit(
        &self,
        talk_id: &str,
        question: &TalkQuestion,
    ) -> Result<StoredQuestion, DataError> {
        let stored = StoredQuestion {
            id: format!("q_{}", Uuid::new_v4().simple()),
            talk_id: talk_id.to_string(),
            name: question.name.trim().to_string(),
            email: question.email.as_ref().map(|e| e.trim().to_string()),
            question: question.question.trim().to_string(),
            submitted_at: Utc::now(),
        };

        if self.path.is_none() {
            self.append(stored.clone())?;
            return Ok(stored);
        }

        let store = self.clone();
        let record = stored.clone();
        web::block(move || store.append(record)).await??;

        Ok(stored)
    }

    /// Push `stored` and rewrite the backing file, undoing the push on failure
    fn append(&self, stored: StoredQuestion) -> Result<(), DataError> {
        let mut questions = self.questions.lock().unwrap_or_else(PoisonError::into_inner);
        questions.push(stored);

        if let Some(path) = &self.path {
            if let Err(err) = persist(path, &questions) {
                questions.pop();
                return Err(err);
            }
        }

        Ok(())
    }

    pub fn all(&self) -> Vec<StoredQuestion> {
        self.questions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn for_talk(&self, talk_id: &str) -> Vec<StoredQuestion> {
        self.all()
            .into_iter()
            .filter(|q| q.talk_id == talk_id)
            .collect()
    }
}

fn persist(path: &Path, questions: &[StoredQuestion]) -> Result<(), DataError> {
    let encoded = serde_json::to_vec_pretty(questions).map_err(DataError::Encode)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DataError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Write to a sibling file first so a crash never leaves a truncated log
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, encoded).map_err(|source| DataError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
