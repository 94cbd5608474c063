//! File-backed session store and session data helpers.
//!
//! One JSON file per session under the configured directory, named by the
//! session id. Expired records are treated as absent and swept periodically.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion};
use tower_sessions::{Session, SessionStore};
use tracing::{debug, warn};
use uuid::Uuid;

/// Session key holding the logged-in user id
pub const USER_ID_KEY: &str = "user_id";
/// Session key holding the path to return to after login
pub const RETURN_TO_KEY: &str = "return_to";
/// Session key holding pending flash messages
pub const FLASH_KEY: &str = "flash";

/// Session store writing one JSON file per session
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Open (and create if needed) a session directory
    pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &Id) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn read_record(path: &Path) -> session_store::Result<Option<Record>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| session_store::Error::Decode(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(session_store::Error::Backend(e.to_string())),
        }
    }

    async fn remove(path: &Path) -> session_store::Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(session_store::Error::Backend(e.to_string())),
        }
    }
}

/// Temp files older than this are left over from a failed write
const TEMP_FILE_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(300);

async fn is_abandoned_temp(entry: &tokio::fs::DirEntry) -> bool {
    let modified = match entry.metadata().await.and_then(|meta| meta.modified()) {
        Ok(modified) => modified,
        Err(_) => return false,
    };
    modified
        .elapsed()
        .is_ok_and(|age| age > TEMP_FILE_MAX_AGE)
}

fn is_expired(record: &Record) -> bool {
    record.expiry_date <= OffsetDateTime::now_utc()
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while tokio::fs::try_exists(self.path_for(&record.id))
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?
        {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let bytes =
            serde_json::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;

        // Write to a unique temp file then rename, so readers never see a partial record
        let path = self.path_for(&record.id);
        let tmp = self
            .dir
            .join(format!("{}.{}.tmp", record.id, Uuid::new_v4().simple()));
        let written = match tokio::fs::write(&tmp, bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = Self::remove(&tmp).await {
                warn!(error = %cleanup, path = %tmp.display(), "Failed to remove temp session file");
            }
            return Err(session_store::Error::Backend(e.to_string()));
        }
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let path = self.path_for(session_id);
        match Self::read_record(&path).await? {
            Some(record) if is_expired(&record) => {
                debug!(session_id = %session_id, "Session expired");
                Self::remove(&path).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        Self::remove(&self.path_for(session_id)).await
    }
}

#[async_trait]
impl ExpiredDeletion for FileSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?;

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))?
        {
            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => {}
                Some("tmp") => {
                    if is_abandoned_temp(&entry).await {
                        Self::remove(&path).await?;
                        removed += 1;
                    }
                    continue;
                }
                _ => continue,
            }

            let stale = match Self::read_record(&path).await {
                Ok(Some(record)) => is_expired(&record),
                Ok(None) => false,
                // Unreadable records can never be loaded again
                Err(session_store::Error::Decode(_)) => true,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Failed to inspect session file");
                    false
                }
            };

            if stale {
                Self::remove(&path).await?;
                removed += 1;
            }
        }

        debug!(removed, "Swept expired sessions");
        Ok(())
    }
}

/// The user id stored in the session, if any.
///
/// Store failures fail open: the request is treated as having no session user.
pub async fn session_user_id(session: &Session) -> Option<Uuid> {
    match session.get::<Uuid>(USER_ID_KEY).await {
        Ok(user_id) => user_id,
        Err(e) => {
            warn!(error = %e, "Session lookup failed, continuing unauthenticated");
            None
        }
    }
}

/// Attach a user to the session, rotating the session id first.
pub async fn log_in(session: &Session, user_id: Uuid) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await
}

/// Remember where to send the user after a successful login.
pub async fn set_return_to(session: &Session, path: &str) {
    if let Err(e) = session.insert(RETURN_TO_KEY, path).await {
        warn!(error = %e, "Failed to store return-to path");
    }
}

/// Take the return-to path, accepting only local absolute paths.
pub async fn take_return_to(session: &Session) -> Option<String> {
    match session.remove::<String>(RETURN_TO_KEY).await {
        Ok(path) => path.filter(|p| is_local_path(p)),
        Err(e) => {
            warn!(error = %e, "Failed to read return-to path");
            None
        }
    }
}

/// Queue a flash message for the next page render.
pub async fn push_flash(session: &Session, message: &str) {
    let mut messages = session
        .get::<Vec<String>>(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    messages.push(message.to_string());
    if let Err(e) = session.insert(FLASH_KEY, messages).await {
        warn!(error = %e, "Failed to store flash message");
    }
}

/// Take and clear pending flash messages.
pub async fn take_flash(session: &Session) -> Vec<String> {
    session
        .remove::<Vec<String>>(FLASH_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
