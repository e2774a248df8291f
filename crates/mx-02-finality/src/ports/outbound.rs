//! Driven Ports (SPI - Outbound Dependencies)

/// Wall-clock source for certificate timestamps
pub trait TimeSource: Send + Sync {
    /// Current Unix time in milliseconds
    fn now_millis(&self) -> u64;
}
