/*
[INPUT]:  Wallet adapters, authentication service, session storage
[OUTPUT]: Stored sessions, login phases, guard decisions
[POS]:    Auth layer - wallet-gated authentication and session flow
[UPDATE]: When auth flow, storage or guarding changes
*/

pub mod connection;
pub mod guard;
pub mod keypair_wallet;
pub mod manager;
pub mod notice;
pub mod session;
pub mod state;
pub mod wallet;

pub use connection::{ConnectionTracker, wait_for_disconnect};
pub use guard::{
    GuardAction, GuardPolicy, GuardState, Navigator, PUBLIC_ENTRY_ROUTE, RecordingNavigator,
    RouteGuard,
};
pub use keypair_wallet::KeypairWallet;
pub use manager::{Authenticator, PROTECTED_ROUTE, SignInOutcome};
pub use notice::{Notice, NoticeLevel};
pub use session::{FileSessionStore, MemorySessionStore, SessionContext, SessionStore};
pub use state::{LoginEvent, LoginPhase, LoginStateMachine, StateError};
pub use wallet::{MockSignBehavior, MockWallet, WalletAdapter};
