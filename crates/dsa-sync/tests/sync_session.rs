//! Integration tests for sync sessions.

use dsa_core::{Character, Item, Location};
use dsa_sync::{
    ChannelTransport, ConnectionState, PeerTransport, Store, SyncEvent, SyncMessage, SyncSession,
};

async fn store_with_character(name: &str) -> (Store, Character) {
    let store = Store::in_memory().await.unwrap();
    store.seed_default_catalog().await.unwrap();
    let c = store.create_character(Character::new(name)).await.unwrap();
    let backpack = store.locations(c.id).await.unwrap().remove(1);
    store
        .add_item(Item::new(c.id, "Kletterseil").with_location(Some(backpack.id)))
        .await
        .unwrap();
    (store, c)
}

#[tokio::test]
async fn pushed_snapshot_is_applied_and_acknowledged() {
    let (master, c) = store_with_character("Alrik").await;
    let player = Store::in_memory().await.unwrap();
    let (left, right) = ChannelTransport::pair("meister", "tablet");
    let mut master_session = SyncSession::new(master, left);
    let mut player_session = SyncSession::new(player.clone(), right);

    master_session.push_character("tablet", c.id).await.unwrap();
    let event = player_session.receive_next().await.unwrap();
    let SyncEvent::Applied { from, outcome } = event else {
        panic!("unexpected event {event:?}");
    };
    assert_eq!(from, "meister");
    assert!(outcome.created);

    let imported = player.character(outcome.character_id).await.unwrap();
    assert_eq!(imported.guid, c.guid);

    match master_session.receive_next().await.unwrap() {
        SyncEvent::Acknowledged { from, guid, .. } => {
            assert_eq!(from, "tablet");
            assert_eq!(guid, c.guid);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_delivery_changes_nothing() {
    let (master, c) = store_with_character("Alrik").await;
    let player = Store::in_memory().await.unwrap();
    let (left, right) = ChannelTransport::pair("meister", "tablet");
    let mut master_session = SyncSession::new(master, left);
    let mut player_session = SyncSession::new(player.clone(), right);

    for _ in 0..3 {
        master_session.push_character("tablet", c.id).await.unwrap();
    }
    let mut ids = Vec::new();
    for _ in 0..3 {
        match player_session.receive_next().await.unwrap() {
            SyncEvent::Applied { outcome, .. } => ids.push(outcome.character_id),
            other => panic!("unexpected event {other:?}"),
        }
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let items = player.items(ids[0]).await.unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items.iter().filter(|i| i.is_self_item).count(), 2);
    let locations = player.locations(ids[0]).await.unwrap();
    assert_eq!(locations[1].name, Location::BACKPACK);
}

#[tokio::test]
async fn malformed_payload_is_rejected_and_answered() {
    let player = Store::in_memory().await.unwrap();
    let (mut raw, right) = ChannelTransport::pair("meister", "tablet");
    let mut player_session = SyncSession::new(player.clone(), right);

    raw.send_data("tablet", b"{ kaputt".to_vec()).await.unwrap();
    assert!(matches!(
        player_session.receive_next().await.unwrap(),
        SyncEvent::Rejected { .. }
    ));

    let answer = raw.receive_data().await.unwrap().unwrap();
    assert!(matches!(
        SyncMessage::decode(&answer.payload).unwrap(),
        SyncMessage::Error { .. }
    ));
    assert!(player.characters().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_character_is_refused_when_creation_is_off() {
    let (master, c) = store_with_character("Alrik").await;
    let player = Store::in_memory().await.unwrap();
    let (left, right) = ChannelTransport::pair("meister", "tablet");
    let mut master_session = SyncSession::new(master, left);
    let mut player_session = SyncSession::new(player.clone(), right).with_allow_create_new(false);

    master_session.push_character("tablet", c.id).await.unwrap();
    assert!(matches!(
        player_session.receive_next().await.unwrap(),
        SyncEvent::Rejected { .. }
    ));
    assert!(matches!(
        master_session.receive_next().await.unwrap(),
        SyncEvent::PeerError { .. }
    ));
    assert!(player.characters().await.unwrap().is_empty());
}

#[tokio::test]
async fn closed_transport_ends_the_session() {
    let player = Store::in_memory().await.unwrap();
    let (left, right) = ChannelTransport::pair("meister", "tablet");
    let mut player_session = SyncSession::new(player, right);
    drop(left);

    assert_eq!(player_session.receive_next().await.unwrap(), SyncEvent::Closed);
    assert_eq!(player_session.transport().state(), ConnectionState::Idle);
}
