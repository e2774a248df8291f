use std::fmt;

/// Initiator phases, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InitiatorPhase {
    Build,
    SelfValidate,
    SelfSign,
    OpenSession,
    CollectCounterSignature,
    SubmitFinality,
    Complete,
}

/// Responder phases, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResponderPhase {
    Receive,
    PreSignValidate,
    CounterSign,
    AwaitFinality,
    Complete,
}

/// Which side of an exchange a session plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Initiator,
    Responder,
}

impl Role {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Initiator => "initiator",
            Role::Responder => "responder",
        }
    }
}

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminalState {
    Completed,
    ValidationFailed,
    SignatureCollectionFailed,
    FinalityFailed,
    FinalityTimeout,
}

impl TerminalState {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalState::Completed => "completed",
            TerminalState::ValidationFailed => "validation_failed",
            TerminalState::SignatureCollectionFailed => "signature_collection_failed",
            TerminalState::FinalityFailed => "finality_failed",
            TerminalState::FinalityTimeout => "finality_timeout",
        }
    }
}

impl fmt::Display for InitiatorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for ResponderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
