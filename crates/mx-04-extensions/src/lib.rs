//! # mx-04-extensions
//!
//! Concrete hook variants plugged into the exchange sessions.
//!
//! | Variant | Initiator hooks | Responder hooks |
//! |---------|-----------------|-----------------|
//! | Persistence | store pending / committed message | store committed message |
//! | Notification | POST new / signed / committed | POST signed / committed |
//! | Validation | `RequiredPhrase` predicate on both sides | |
//!
//! Persistence and notification only observe. The validation variant is a
//! contract predicate, so its rejection fails the session.

pub mod error;
pub mod notification;
pub mod persistence;
pub mod validation;

pub use error::{ExtensionError, ExtensionResult};
pub use notification::{AcknowledgerConfig, MessageAcknowledger, MessageDto, NotificationHooks};
pub use persistence::{
    InMemoryMessageRepository, MessageEntity, MessageRepository, PersistenceHooks,
};
pub use validation::{RequiredPhrase, DEFAULT_PASSPHRASE};
