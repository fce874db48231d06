/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public CarbonHub adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod account;
pub mod auth;
pub mod format;
pub mod http;
pub mod order;
pub mod price;
pub mod types;

pub use account::AccountService;

// Re-export commonly used types from auth
pub use auth::{
    Authenticator,
    ConnectionTracker,
    FileSessionStore,
    GuardAction,
    GuardPolicy,
    GuardState,
    KeypairWallet,
    LoginPhase,
    MemorySessionStore,
    MockWallet,
    Navigator,
    Notice,
    NoticeLevel,
    RecordingNavigator,
    RouteGuard,
    SessionContext,
    SessionStore,
    SignInOutcome,
    WalletAdapter,
};

// Re-export commonly used types from http
pub use http::{CarbonHubClient, CarbonHubError, ClientConfig, Result};

pub use order::{OrderReceipt, OrderTicket};
pub use price::{PriceSubscription, PriceTicker};

// Re-export all types
pub use types::*;
