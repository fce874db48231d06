/*
[INPUT]:  LoginPhase and LoginEvent values raised by the authenticator
[OUTPUT]: Validated phase transitions for a sign-in attempt
[POS]:    Auth layer - state machine for the challenge/verify flow
[UPDATE]: When sign-in steps or failure handling change
*/

use std::fmt;

use thiserror::Error;

/// Phase of a sign-in attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    RequestingChallenge,
    AwaitingSignature,
    Verifying,
    Authenticated,
    Failed,
}

impl LoginPhase {
    /// A new attempt may start from this phase
    pub fn accepts_new_attempt(&self) -> bool {
        matches!(self, LoginPhase::Idle | LoginPhase::Authenticated)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            LoginPhase::RequestingChallenge | LoginPhase::AwaitingSignature | LoginPhase::Verifying
        )
    }
}

impl fmt::Display for LoginPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoginPhase::Idle => "idle",
            LoginPhase::RequestingChallenge => "requesting challenge",
            LoginPhase::AwaitingSignature => "awaiting signature",
            LoginPhase::Verifying => "verifying",
            LoginPhase::Authenticated => "authenticated",
            LoginPhase::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Events that move a sign-in attempt forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    Start,
    ChallengeIssued,
    Signed,
    Verified,
    Fail(String),
    /// Wallet went away while a signature was pending
    Abort,
    Reset,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid transition: {from} -> {event:?}")]
    InvalidTransition { from: LoginPhase, event: LoginEvent },
}

/// State machine for one authenticator's sign-in attempts
#[derive(Debug)]
pub struct LoginStateMachine {
    phase: LoginPhase,
    last_error: Option<String>,
}

impl LoginStateMachine {
    pub fn new() -> Self {
        Self {
            phase: LoginPhase::Idle,
            last_error: None,
        }
    }

    fn next_phase(&self, event: &LoginEvent) -> Option<LoginPhase> {
        use LoginPhase::*;

        match (self.phase, event) {
            (Idle | Authenticated, LoginEvent::Start) => Some(RequestingChallenge),
            (RequestingChallenge, LoginEvent::ChallengeIssued) => Some(AwaitingSignature),
            (AwaitingSignature, LoginEvent::Signed) => Some(Verifying),
            (Verifying, LoginEvent::Verified) => Some(Authenticated),
            (RequestingChallenge | AwaitingSignature | Verifying, LoginEvent::Fail(_)) => {
                Some(Failed)
            }
            (AwaitingSignature, LoginEvent::Abort) => Some(Idle),
            (Failed | Authenticated | Idle, LoginEvent::Reset) => Some(Idle),
            _ => None,
        }
    }

    pub fn can_transition(&self, event: &LoginEvent) -> bool {
        self.next_phase(event).is_some()
    }

    /// Perform a state transition
    pub fn transition(&mut self, event: LoginEvent) -> Result<LoginPhase, StateError> {
        let Some(next) = self.next_phase(&event) else {
            return Err(StateError::InvalidTransition {
                from: self.phase,
                event,
            });
        };

        match event {
            LoginEvent::Fail(reason) => self.last_error = Some(reason),
            LoginEvent::Start => self.last_error = None,
            _ => {}
        }

        self.phase = next;
        Ok(next)
    }

    pub fn phase(&self) -> LoginPhase {
        self.phase
    }

    /// Reason recorded by the most recent failed attempt
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Default for LoginStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
