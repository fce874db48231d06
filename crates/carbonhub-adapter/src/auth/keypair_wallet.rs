/*
[INPUT]:  Ed25519 secret key (file, base58 or generated)
[OUTPUT]: Solana-compatible wallet that signs challenges locally
[POS]:    Auth layer - local keypair wallet implementation
[UPDATE]: When key storage format or address encoding changes
*/

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use rand::rngs::OsRng;
use tempfile::NamedTempFile;
use tokio::sync::watch;
use tracing::info;

use crate::auth::connection::ConnectionTracker;
use crate::auth::wallet::WalletAdapter;
use crate::http::{CarbonHubError, Result};
use crate::types::ConnectionState;

/// Wallet backed by an ed25519 key held on this machine.
///
/// The address is the base58 public key, the same encoding Solana uses.
#[derive(Debug)]
pub struct KeypairWallet {
    signing_key: SigningKey,
    address: String,
    tracker: ConnectionTracker,
}

impl KeypairWallet {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Create wallet from existing secret key bytes (32 bytes)
    pub fn from_secret_key(bytes: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(bytes))
    }

    /// Create wallet from a base58 private key.
    /// Supports 64-byte keypair or 32-byte seed
    pub fn from_base58(private_key: &str) -> Result<Self> {
        let bytes = bs58::decode(private_key.trim())
            .into_vec()
            .map_err(|e| CarbonHubError::Config(format!("Invalid base58 private key: {e}")))?;

        match bytes.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ok(Self::from_secret_key(&seed))
            }
            64 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes[..32]);
                let wallet = Self::from_secret_key(&seed);
                if wallet.public_key_bytes()[..] != bytes[32..] {
                    return Err(CarbonHubError::Config(
                        "Keypair public half does not match its secret half".to_string(),
                    ));
                }
                Ok(wallet)
            }
            len => Err(CarbonHubError::Config(format!(
                "Invalid private key length: expected 32 or 64 bytes, got {len}"
            ))),
        }
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = bs58::encode(signing_key.verifying_key().as_bytes()).into_string();
        Self {
            signing_key,
            address,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Load the key stored at `path`, or create and store a new one.
    ///
    /// A new key is only generated when no file exists; an existing file that
    /// cannot be decoded is an error and is left untouched.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(wallet) = Self::load(path)? {
            return Ok(wallet);
        }

        let wallet = Self::generate();
        wallet.save(path)?;
        info!(path = %path.display(), address = %wallet.address, "created wallet key");
        Ok(wallet)
    }

    /// Load a key file holding a base64 secret or a base58 seed/keypair.
    ///
    /// `Ok(None)` only when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(CarbonHubError::Storage(format!(
                    "read wallet key {}: {err}",
                    path.display()
                )));
            }
        };

        Self::decode_key(content.trim()).map(Some).map_err(|err| {
            CarbonHubError::Config(format!(
                "wallet key {} could not be decoded: {err}",
                path.display()
            ))
        })
    }

    fn decode_key(content: &str) -> Result<Self> {
        if let Ok(bytes) = STANDARD.decode(content) {
            if let Ok(key_bytes) = <[u8; 32]>::try_from(bytes.as_slice()) {
                return Ok(Self::from_secret_key(&key_bytes));
            }
        }
        Self::from_base58(content)
    }

    /// Write the secret key as base64, readable by the owner only
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.write_key(path).map_err(|err| {
            CarbonHubError::Storage(format!("write wallet key {}: {err}", path.display()))
        })
    }

    fn write_key(&self, path: &Path) -> io::Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;

        let mut temp_file = NamedTempFile::new_in(&parent)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp_file.path(), fs::Permissions::from_mode(0o600))?;
        }

        temp_file.write_all(STANDARD.encode(self.signing_key.to_bytes()).as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Verify a signature against a message
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        self.signing_key
            .verifying_key()
            .verify(message, &signature)
            .is_ok()
    }

    /// A local key is available immediately
    pub fn connect(&self) {
        self.tracker.begin_connect();
        self.tracker.set_connected(self.address.clone());
    }

    pub fn disconnect(&self) {
        self.tracker.set_disconnected();
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<String> {
        self.tracker
            .current()
            .connected
            .then(|| self.address.clone())
    }

    fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.tracker.subscribe()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        if !self.is_connected() {
            return Err(CarbonHubError::WalletNotConnected);
        }
        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }
}
