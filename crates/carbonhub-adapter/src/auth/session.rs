/*
[INPUT]:  Session triples produced by the authenticator
[OUTPUT]: Durable session persistence and an explicit session context
[POS]:    Auth layer - session storage (file / memory) and lifecycle
[UPDATE]: When storage format or session lifecycle changes
*/

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::http::{CarbonHubError, Result};
use crate::types::Session;

/// Persistence for the `{publicKey, token, accountType}` triple
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Write the whole triple; readers never observe a partial write
    fn save(&self, session: &Session) -> Result<()>;

    /// Stored session, or `None` when absent or unreadable. Never fails.
    fn load(&self) -> Option<Session>;

    /// Remove the stored session; clearing an empty store is fine
    fn clear(&self) -> Result<()>;
}

/// JSON file store, written via temp file + rename
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<data_dir>/carbonhub/session.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("carbonhub").join("session.json"))
            .ok_or_else(|| {
                CarbonHubError::Config("could not determine data directory".to_string())
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, contents: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp_file = NamedTempFile::new_in(&parent)?;
        temp_file.write_all(contents)?;
        temp_file.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp_file.path(), fs::Permissions::from_mode(0o600))?;
        }

        temp_file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_vec_pretty(session)?;
        self.write_atomic(&json).map_err(|e| {
            CarbonHubError::Storage(format!(
                "failed to write session to {}: {e}",
                self.path.display()
            ))
        })
    }

    fn load(&self) -> Option<Session> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "unreadable session file, treating as logged out");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) if session.is_complete() => Some(session),
            Ok(_) => {
                warn!(path = %self.path.display(), "incomplete stored session, treating as logged out");
                None
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "malformed stored session, treating as logged out");
                None
            }
        }
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CarbonHubError::Storage(format!(
                "failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}

/// In-process store, for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(Session::is_complete)
    }

    fn clear(&self) -> Result<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Explicit session context shared by the authenticator, guard and services.
///
/// `init` restores whatever the store holds at startup; `clear` is the
/// logout path.
#[derive(Debug, Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    current: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    /// Context with an empty cache; nothing is read from the store
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Context primed from the store
    pub fn init(store: Arc<dyn SessionStore>) -> Self {
        let restored = store.load();
        if let Some(session) = &restored {
            info!(public_key = %session.public_key, account_type = %session.account_type, "restored stored session");
        }
        Self {
            store,
            current: Arc::new(RwLock::new(restored)),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current session or `NotAuthenticated`
    pub fn require(&self) -> Result<Session> {
        self.current().ok_or(CarbonHubError::NotAuthenticated)
    }

    /// Whether the stored session belongs to the given wallet
    pub fn matches_wallet(&self, public_key: &str) -> bool {
        self.current()
            .is_some_and(|session| session.public_key == public_key)
    }

    /// Persist, then cache. A failed write leaves the context unchanged.
    pub fn establish(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        info!(public_key = %session.public_key, account_type = %session.account_type, "session stored");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear()?;
        info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::AccountType;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new("PK1", "T1", AccountType::User)
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert!(store.load().is_none());
        store.save(&session()).unwrap();
        assert_eq!(store.load(), Some(session()));

        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_uses_camel_case_triple() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"publicKey": "PK1", "token": "T1", "accountType": "user"})
        );
    }

    #[test]
    fn test_file_store_malformed_data_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(&path);

        fs::write(&path, "{not json").unwrap();
        assert!(store.load().is_none());

        fs::write(&path, r#"{"publicKey":"PK1","token":"","accountType":"user"}"#).unwrap();
        assert!(store.load().is_none());

        fs::write(&path, r#"{"publicKey":"PK1","token":"T1","accountType":"admin"}"#).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_overwrite_keeps_latest() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&session()).unwrap();

        let company = Session::new("PK2", "T2", AccountType::Company);
        store.save(&company).unwrap();
        assert_eq!(store.load(), Some(company));

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_memory_store_load_after_clear_is_absent() {
        let store = MemorySessionStore::new();
        store.save(&session()).unwrap();
        assert_eq!(store.load(), Some(session()));
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_context_init_restores_and_clear_forgets() {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&session()).unwrap();

        let context = SessionContext::init(store.clone());
        assert!(context.is_authenticated());
        assert!(context.matches_wallet("PK1"));
        assert!(!context.matches_wallet("PK2"));

        context.clear().unwrap();
        assert!(context.current().is_none());
        assert!(store.load().is_none());
        assert!(matches!(
            context.require(),
            Err(CarbonHubError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_context_new_ignores_store_until_established() {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&session()).unwrap();

        let context = SessionContext::new(store.clone());
        assert!(!context.is_authenticated());

        let company = Session::new("PK2", "T2", AccountType::Company);
        context.establish(company.clone()).unwrap();
        assert_eq!(context.current(), Some(company.clone()));
        assert_eq!(store.load(), Some(company));
    }
}
