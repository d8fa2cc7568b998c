//! Real-time sync between two stores over a [`PeerTransport`].
//!
//! Every message is a full character snapshot, so a duplicated or replayed
//! delivery is harmless: the import reconciler is idempotent.

use dsa_core::{Guid, LocalId};
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::export::export_character;
use crate::import::{ImportOutcome, apply_snapshot_from_sync};
use crate::snapshot::CharacterSnapshot;
use crate::store::Store;
use crate::transport::{PeerTransport, Received};

/// Envelope exchanged between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SyncMessage {
    /// The full state of one character.
    CharacterSnapshot {
        /// The snapshot.
        snapshot: Box<CharacterSnapshot>,
    },
    /// A snapshot was applied.
    Ack {
        /// GUID of the applied character.
        guid: Guid,
        /// Export timestamp of the applied snapshot.
        export_timestamp: i64,
    },
    /// A snapshot could not be applied.
    Error {
        /// Why.
        message: String,
    },
}

impl SyncMessage {
    /// Encode as JSON bytes.
    pub fn encode(&self) -> SyncResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode JSON bytes. Snapshots from a newer schema are rejected.
    pub fn decode(bytes: &[u8]) -> SyncResult<Self> {
        let message: Self = serde_json::from_slice(bytes)?;
        if let Self::CharacterSnapshot { snapshot } = &message {
            snapshot.check_version()?;
        }
        Ok(message)
    }
}

/// What [`SyncSession::receive_next`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A peer's snapshot was applied to the local store.
    Applied {
        /// Sender.
        from: String,
        /// Result of the import.
        outcome: ImportOutcome,
    },
    /// A peer confirmed one of our snapshots.
    Acknowledged {
        /// Sender.
        from: String,
        /// GUID of the character.
        guid: Guid,
        /// Export timestamp the peer applied.
        export_timestamp: i64,
    },
    /// A peer reported that one of our snapshots failed.
    PeerError {
        /// Sender.
        from: String,
        /// The peer's message.
        message: String,
    },
    /// An incoming payload was malformed or could not be applied. The
    /// local store is unchanged.
    Rejected {
        /// Sender.
        from: String,
        /// Why.
        reason: String,
    },
    /// The transport closed.
    Closed,
}

/// Pushes local characters to peers and applies what peers send.
#[derive(Debug)]
pub struct SyncSession<T> {
    store: Store,
    transport: T,
    allow_create_new: bool,
}

impl<T: PeerTransport> SyncSession<T> {
    /// A session over `transport`. Unknown characters are created as the
    /// store's configuration allows.
    pub fn new(store: Store, transport: T) -> Self {
        let allow_create_new = store.config().allow_create_new;
        Self {
            store,
            transport,
            allow_create_new,
        }
    }

    /// Override whether snapshots of unknown characters create them.
    pub fn with_allow_create_new(mut self, allow: bool) -> Self {
        self.allow_create_new = allow;
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The local store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Export a character and send it to `endpoint_id`.
    pub async fn push_character(&mut self, endpoint_id: &str, character_id: LocalId) -> SyncResult<()> {
        let snapshot = export_character(&self.store, character_id).await?;
        let guid = snapshot.character.guid;
        let message = SyncMessage::CharacterSnapshot {
            snapshot: Box::new(snapshot),
        };
        self.transport.send_data(endpoint_id, message.encode()?).await?;
        tracing::info!(character = %guid.short(), to = endpoint_id, "pushed snapshot");
        Ok(())
    }

    /// Wait for the next message and handle it. Incoming snapshots are
    /// applied and answered with an ack or an error message. Only transport
    /// failures on receive are returned as errors.
    pub async fn receive_next(&mut self) -> SyncResult<SyncEvent> {
        let Some(Received {
            endpoint_id: from,
            payload,
        }) = self.transport.receive_data().await?
        else {
            return Ok(SyncEvent::Closed);
        };

        let message = match SyncMessage::decode(&payload) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(from = %from, error = %err, "malformed sync payload");
                return Ok(self.reject(from, err.to_string()).await);
            }
        };

        match message {
            SyncMessage::CharacterSnapshot { snapshot } => {
                match apply_snapshot_from_sync(&self.store, &snapshot, self.allow_create_new).await {
                    Ok(outcome) => {
                        let ack = SyncMessage::Ack {
                            guid: snapshot.character.guid,
                            export_timestamp: snapshot.export_timestamp,
                        };
                        self.reply(&from, &ack).await;
                        Ok(SyncEvent::Applied { from, outcome })
                    }
                    Err(err) => {
                        tracing::warn!(from = %from, error = %err, "sync snapshot rejected");
                        Ok(self.reject(from, err.to_string()).await)
                    }
                }
            }
            SyncMessage::Ack {
                guid,
                export_timestamp,
            } => Ok(SyncEvent::Acknowledged {
                from,
                guid,
                export_timestamp,
            }),
            SyncMessage::Error { message } => Ok(SyncEvent::PeerError { from, message }),
        }
    }

    async fn reject(&mut self, from: String, reason: String) -> SyncEvent {
        let reply = SyncMessage::Error {
            message: reason.clone(),
        };
        self.reply(&from, &reply).await;
        SyncEvent::Rejected { from, reason }
    }

    /// Best-effort answer; a peer that went away is not our failure.
    async fn reply(&mut self, to: &str, message: &SyncMessage) {
        let sent = match message.encode() {
            Ok(bytes) => self.transport.send_data(to, bytes).await,
            Err(err) => Err(err),
        };
        if let Err(err) = sent {
            tracing::warn!(to, error = %err, "could not answer peer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_wire_format() {
        let guid: Guid = "6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11".parse().unwrap();
        let json = String::from_utf8(
            SyncMessage::Ack {
                guid,
                export_timestamp: 42,
            }
            .encode()
            .unwrap(),
        )
        .unwrap();
        insta::assert_snapshot!(json, @r#"{"type":"ack","guid":"6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11","exportTimestamp":42}"#);
    }

    #[test]
    fn unknown_message_type_is_a_decode_error() {
        assert!(matches!(
            SyncMessage::decode(br#"{"type":"hug"}"#),
            Err(crate::SyncError::Decode(_))
        ));
    }

    #[test]
    fn newer_snapshot_versions_are_refused() {
        let payload = br#"{"type":"characterSnapshot","snapshot":{
            "version": 99,
            "character": {"guid": "6f1c1f7e-2b7d-4f57-9a40-4a7c2b0e9a11", "name": "Alrik"},
            "exportTimestamp": 1
        }}"#;
        assert!(matches!(
            SyncMessage::decode(payload),
            Err(crate::SyncError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
