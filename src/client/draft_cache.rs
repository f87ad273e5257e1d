use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{client::error::WorkflowError, models::pds::StudentRecordData};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);

/// Local crash-recovery copy of an unsubmitted PDS, keyed by user.
pub trait DraftCache {
    fn load(&self, user_id: i32) -> Result<Option<StudentRecordData>, WorkflowError>;
    fn store(&self, user_id: i32, record: &StudentRecordData) -> Result<(), WorkflowError>;
    fn clear(&self, user_id: i32) -> Result<(), WorkflowError>;
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedDraft {
    user_id: i32,
    record: StudentRecordData,
}

/// One JSON file per user under `dir`.
#[derive(Debug, Clone)]
pub struct FileDraftCache {
    dir: PathBuf,
}

impl FileDraftCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path(&self, user_id: i32) -> PathBuf {
        self.dir.join(format!("pds_draft_{}.json", user_id))
    }
}

impl DraftCache for FileDraftCache {
    fn load(&self, user_id: i32) -> Result<Option<StudentRecordData>, WorkflowError> {
        let raw = match fs::read_to_string(self.path(user_id)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        // An unreadable draft is treated as absent.
        match serde_json::from_str::<CachedDraft>(&raw) {
            Ok(draft) if draft.user_id == user_id => Ok(Some(draft.record)),
            Ok(_) => Ok(None),
            Err(err) => {
                tracing::warn!(user_id, "discarding unreadable draft: {}", err);
                Ok(None)
            }
        }
    }

    fn store(&self, user_id: i32, record: &StudentRecordData) -> Result<(), WorkflowError> {
        fs::create_dir_all(&self.dir)?;
        let draft = CachedDraft {
            user_id,
            record: record.clone(),
        };
        let raw =
            serde_json::to_string(&draft).map_err(|err| WorkflowError::Transport(err.to_string()))?;
        let tmp = self.path(user_id).with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, self.path(user_id))?;
        Ok(())
    }

    fn clear(&self, user_id: i32) -> Result<(), WorkflowError> {
        match fs::remove_file(self.path(user_id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Debounced auto-save: due once `delay` has passed since the last change.
#[derive(Debug, Clone)]
pub struct AutoSave {
    delay: Duration,
    last_change: Option<Instant>,
}

impl AutoSave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_change: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.last_change.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_change {
            Some(changed) => now.saturating_duration_since(changed) >= self.delay,
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.last_change = None;
    }
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}
