/*
[INPUT]:  Resolved AppConfig
[OUTPUT]: Client, session context, wallet and services wired together
[POS]:    Application layer - shared setup for every command
[UPDATE]: When commands need new collaborators
*/

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use carbonhub_adapter::{
    AccountService, Authenticator, CarbonHubClient, FileSessionStore, KeypairWallet,
    SessionContext,
};
use tracing::debug;

use crate::config::AppConfig;

/// `<data_dir>/carbonhub/wallet.key`
pub fn default_key_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("carbonhub").join("wallet.key"))
        .ok_or_else(|| anyhow!("could not determine data directory"))
}

/// Everything a command needs, built once at startup
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    client: CarbonHubClient,
    sessions: SessionContext,
    key_path: PathBuf,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client =
            CarbonHubClient::with_config(config.client_config()).context("create HTTP client")?;

        let session_path = match &config.session_path {
            Some(path) => path.clone(),
            None => FileSessionStore::default_path()?,
        };
        let key_path = match &config.key_path {
            Some(path) => path.clone(),
            None => default_key_path()?,
        };
        debug!(
            session_path = %session_path.display(),
            key_path = %key_path.display(),
            "resolved storage paths"
        );

        let sessions = SessionContext::init(Arc::new(FileSessionStore::new(session_path)));

        Ok(Self {
            config,
            client,
            sessions,
            key_path,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn client(&self) -> &CarbonHubClient {
        &self.client
    }

    pub fn sessions(&self) -> &SessionContext {
        &self.sessions
    }

    pub fn key_path(&self) -> &PathBuf {
        &self.key_path
    }

    /// Stored wallet key, connected. `None` until `keygen` has run.
    pub fn wallet(&self) -> Result<Option<KeypairWallet>> {
        let wallet = KeypairWallet::load(&self.key_path)?;
        if let Some(wallet) = &wallet {
            wallet.connect();
        }
        Ok(wallet)
    }

    pub fn require_wallet(&self) -> Result<KeypairWallet> {
        self.wallet()?.ok_or_else(|| {
            anyhow!(
                "no wallet key at {}; run `carbonhub keygen` first",
                self.key_path.display()
            )
        })
    }

    /// Load the wallet key, creating one if none is stored
    pub fn create_wallet(&self) -> Result<KeypairWallet> {
        KeypairWallet::load_or_create(&self.key_path)
            .with_context(|| format!("create wallet key at {}", self.key_path.display()))
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.client.clone(), self.sessions.clone())
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.client.clone(), self.sessions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use carbonhub_adapter::{AccountType, Session};
    use carbonhub_adapter::WalletAdapter;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> AppConfig {
        AppConfig {
            session_path: Some(dir.path().join("session.json")),
            key_path: Some(dir.path().join("wallet.key")),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_wallet_absent_until_created() {
        let dir = TempDir::new().unwrap();
        let app = App::new(config_in(&dir)).unwrap();

        assert!(app.wallet().unwrap().is_none());
        assert!(app.require_wallet().is_err());

        let created = app.create_wallet().unwrap();
        let loaded = app.wallet().unwrap().unwrap();
        assert_eq!(created.address(), loaded.address());
        assert!(loaded.is_connected());
    }

    #[test]
    fn test_unreadable_key_is_reported() {
        let dir = TempDir::new().unwrap();
        let app = App::new(config_in(&dir)).unwrap();
        std::fs::write(app.key_path(), "garbage!").unwrap();

        assert!(app.wallet().is_err());
        assert!(app.create_wallet().is_err());
        assert_eq!(std::fs::read_to_string(app.key_path()).unwrap(), "garbage!");
    }

    #[test]
    fn test_session_restored_on_startup() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let first = App::new(config.clone()).unwrap();
        first
            .sessions()
            .establish(Session::new("PK1", "T1", AccountType::Company))
            .unwrap();

        let second = App::new(config).unwrap();
        assert_eq!(
            second.sessions().current(),
            Some(Session::new("PK1", "T1", AccountType::Company))
        );
    }
}
