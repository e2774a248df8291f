//! Session phases and terminal states

mod phase;

pub use phase::{InitiatorPhase, ResponderPhase, Role, TerminalState};
