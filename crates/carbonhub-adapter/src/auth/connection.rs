/*
[INPUT]:  Connect/disconnect events from a wallet adapter
[OUTPUT]: Observable ConnectionState via a watch channel
[POS]:    Auth layer - explicit wallet connection context
[UPDATE]: When connection lifecycle or observers change
*/

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::types::ConnectionState;

/// Publishes the wallet's connection state to the authenticator and guard
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    tx: Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::with_state(ConnectionState::default())
    }

    pub fn with_state(state: ConnectionState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }

    pub fn begin_connect(&self) {
        self.tx.send_modify(|state| {
            state.connecting = true;
            state.last_error = None;
        });
    }

    pub fn set_connected(&self, public_key: impl Into<String>) {
        let public_key = public_key.into();
        info!(public_key = %public_key, "wallet connected");
        self.tx.send_replace(ConnectionState::connected(public_key));
    }

    pub fn set_disconnected(&self) {
        info!("wallet disconnected");
        self.tx.send_replace(ConnectionState::default());
    }

    pub fn set_failed(&self, error: impl Into<String>) {
        self.tx.send_replace(ConnectionState {
            last_error: Some(error.into()),
            ..ConnectionState::default()
        });
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once the observed wallet is no longer connected.
///
/// A closed channel never resolves: without a sender there is nobody left to
/// report a disconnect.
pub async fn wait_for_disconnect(connection: &mut watch::Receiver<ConnectionState>) {
    loop {
        if !connection.borrow_and_update().connected {
            return;
        }
        if connection.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
