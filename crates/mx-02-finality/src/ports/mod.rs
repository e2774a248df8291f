//! Ports module for the Finality subsystem

pub mod inbound;
pub mod outbound;

pub use inbound::FinalityAuthority;
pub use outbound::TimeSource;
