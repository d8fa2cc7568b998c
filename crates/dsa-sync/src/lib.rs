//! Persistence and sync for DSA 4.1 characters.
//!
//! The [`Store`] keeps the character graph in SQLite with foreign keys
//! enforced. [`export_character`] turns one character into a portable
//! [`CharacterSnapshot`] whose cross-references are natural keys only, and
//! the import reconciler ([`import_character`], [`apply_snapshot_from_sync`])
//! merges a snapshot back in, idempotently and inside a single transaction.
//! [`SyncSession`] ships snapshots between devices over any
//! [`PeerTransport`].

pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod transfer;
pub mod transport;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use export::{build_snapshot, export_character, export_character_json};
pub use import::{ImportOutcome, apply_snapshot_from_sync, import_character, import_character_json};
pub use session::{SyncEvent, SyncMessage, SyncSession};
pub use snapshot::{CharacterSnapshot, SNAPSHOT_VERSION};
pub use store::Store;
pub use transfer::transfer_location_to_character;
pub use transport::{ChannelTransport, ConnectionState, PeerTransport, Received};
