//! Integration tests for the relay: JSON frames in, room events out.

use std::sync::Arc;
use std::time::Duration;

use globetrotter::prelude::*;
use tokio::sync::mpsc;
use tokio::time::timeout;

// =========================================================================
// Fixture catalog
// =========================================================================

struct Paris;

impl Catalog for Paris {
    async fn destination(&self) -> Result<Destination, CatalogError> {
        Ok(Destination::new(
            "1",
            "Paris",
            vec!["City of light".into()],
            vec!["The tower was meant to be temporary.".into()],
        ))
    }

    async fn destination_names(
        &self,
    ) -> Result<Vec<DestinationName>, CatalogError> {
        Ok(["Paris", "Rome", "Tokyo", "Lima"]
            .iter()
            .enumerate()
            .map(|(i, name)| DestinationName::new((i + 1).to_string(), *name))
            .collect())
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn relay() -> Relay<Paris> {
    Relay::new(Arc::new(Paris), RoomConfig::default())
}

fn frame(json: &str) -> Vec<u8> {
    json.as_bytes().to_vec()
}

async fn recv_until(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    mut pred: impl FnMut(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed");
        if pred(&event) {
            return event;
        }
    }
}

/// Joins `player` to room `TRAVEL` and waits until they see round 1.
async fn joined(
    relay: &Relay<Paris>,
    player: u64,
    name: &str,
) -> (PlayerSender, mpsc::UnboundedReceiver<ServerEvent>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let join = format!(
        r#"{{"seq":1,"room":"travel","payload":{{"type":"Join","data":{{"name":"{name}"}}}}}}"#
    );
    relay
        .handle(PlayerId(player), &frame(&join), &tx)
        .await
        .unwrap();
    recv_until(&mut rx, |e| {
        matches!(
            e,
            ServerEvent::RoundStarted { .. }
                | ServerEvent::Snapshot { round: Some(_), .. }
        )
    })
    .await;
    (tx, rx)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_join_frame_welcomes_player() {
    let relay = relay();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let join = r#"{"seq":1,"room":"travel","payload":{"type":"Join","data":{"name":"Ann"}}}"#;

    relay.handle(PlayerId(1), &frame(join), &tx).await.unwrap();

    let welcome = recv_until(&mut rx, |_| true).await;
    assert_eq!(
        welcome,
        ServerEvent::Welcome {
            room: RoomCode::parse("TRAVEL").unwrap(),
            player: PlayerId(1),
        }
    );
    assert_eq!(
        relay.player_room(PlayerId(1)).await,
        Some(RoomCode::parse("TRAVEL").unwrap())
    );
    assert_eq!(relay.room_count().await, 1);
}

#[tokio::test]
async fn test_guess_frame_resolves_round() {
    let relay = relay();
    let (tx, mut rx) = joined(&relay, 1, "Ann").await;

    let guess = r#"{"seq":2,"room":"TRAVEL","payload":{"type":"Event","data":{"type":"Guess","round":1,"option":"Paris"}}}"#;
    relay.handle(PlayerId(1), &frame(guess), &tx).await.unwrap();

    let resolved = recv_until(&mut rx, |e| {
        matches!(e, ServerEvent::GuessResolved { .. })
    })
    .await;
    let ServerEvent::GuessResolved {
        player, phase, feedback, ..
    } = resolved
    else {
        unreachable!()
    };
    assert_eq!(player, PlayerId(1));
    assert_eq!(phase, RoundPhase::ResolvedCorrect);
    assert!(matches!(feedback, Feedback::Correct { .. }));
}

#[tokio::test]
async fn test_garbage_frame_reports_decode_error() {
    let relay = relay();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = relay.handle(PlayerId(1), b"{not json", &tx).await;
    assert!(matches!(
        result,
        Err(GlobetrotterError::Protocol(ProtocolError::Decode(_)))
    ));
    let event = recv_until(&mut rx, |_| true).await;
    assert!(matches!(event, ServerEvent::Error { code: 400, .. }));
}

#[tokio::test]
async fn test_impersonation_is_rejected() {
    let relay = relay();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let join = r#"{"seq":1,"room":"TRAVEL","player":2,"payload":{"type":"Join","data":{"name":"Ann"}}}"#;

    let result = relay.handle(PlayerId(1), &frame(join), &tx).await;
    assert!(matches!(
        result,
        Err(GlobetrotterError::Protocol(ProtocolError::InvalidMessage(_)))
    ));
    assert!(matches!(
        recv_until(&mut rx, |_| true).await,
        ServerEvent::Error { code: 400, .. }
    ));
    assert_eq!(relay.room_count().await, 0);
}

#[tokio::test]
async fn test_participant_cannot_broadcast() {
    let relay = relay();
    let (tx, _rx) = joined(&relay, 1, "Ann").await;

    let envelope = Envelope {
        seq: 2,
        room: RoomCode::parse("TRAVEL").unwrap(),
        player: Some(PlayerId(1)),
        payload: Payload::Broadcast(ServerEvent::RoundLoading { round: 9 }),
    };
    let result = relay.handle_envelope(PlayerId(1), envelope, &tx).await;
    assert!(matches!(result, Err(GlobetrotterError::Protocol(_))));
}

#[tokio::test]
async fn test_event_for_other_room_is_rejected() {
    let relay = relay();
    let (tx, mut rx) = joined(&relay, 1, "Ann").await;

    let envelope = Envelope {
        seq: 2,
        room: RoomCode::parse("ELSEWHERE").unwrap(),
        player: None,
        payload: Payload::Event(ClientEvent::NextRound { round: 1 }),
    };
    let result = relay.handle_envelope(PlayerId(1), envelope, &tx).await;
    assert!(matches!(
        result,
        Err(GlobetrotterError::Room(RoomError::NotInRoom(..)))
    ));
    assert!(matches!(
        recv_until(&mut rx, |e| matches!(e, ServerEvent::Error { .. })).await,
        ServerEvent::Error { code: 403, .. }
    ));
}

#[tokio::test]
async fn test_event_without_room_is_not_found() {
    let relay = relay();
    let (tx, _rx) = mpsc::unbounded_channel();

    let envelope = Envelope {
        seq: 1,
        room: RoomCode::parse("TRAVEL").unwrap(),
        player: None,
        payload: Payload::Event(ClientEvent::NextRound { round: 1 }),
    };
    let result = relay.handle_envelope(PlayerId(7), envelope, &tx).await;
    let err = result.unwrap_err();
    assert_eq!(err.code(), 404);
}

#[tokio::test]
async fn test_second_participant_shares_the_round() {
    let relay = relay();
    let (_tx1, mut rx1) = joined(&relay, 1, "Ann").await;
    let (_tx2, _rx2) = joined(&relay, 2, "Bo").await;

    let joined_event = recv_until(&mut rx1, |e| {
        matches!(e, ServerEvent::PlayerJoined { .. })
    })
    .await;
    let ServerEvent::PlayerJoined { player } = joined_event else {
        unreachable!()
    };
    assert_eq!(player.name, "Bo");

    let rooms = relay.list_rooms().await;
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].player_count, 2);
}

#[tokio::test]
async fn test_leave_and_disconnect_close_the_room() {
    let relay = relay();
    let (tx1, _rx1) = joined(&relay, 1, "Ann").await;
    let (_tx2, _rx2) = joined(&relay, 2, "Bo").await;

    let leave = r#"{"seq":3,"room":"TRAVEL","payload":{"type":"Leave"}}"#;
    relay.handle(PlayerId(1), &frame(leave), &tx1).await.unwrap();
    assert_eq!(relay.player_room(PlayerId(1)).await, None);
    assert_eq!(relay.room_count().await, 1);

    relay.disconnect(PlayerId(2)).await.unwrap();
    assert_eq!(relay.room_count().await, 0);

    // Nobody left to disconnect.
    relay.disconnect(PlayerId(2)).await.unwrap();
}

#[tokio::test]
async fn test_encode_broadcast_wraps_event() {
    let relay = relay();
    let room = RoomCode::parse("TRAVEL").unwrap();

    let bytes = relay
        .encode_broadcast(&room, 5, ServerEvent::RoundLoading { round: 2 })
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["seq"], 5);
    assert_eq!(json["room"], "TRAVEL");
    assert_eq!(json["payload"]["type"], "Broadcast");
    assert_eq!(json["payload"]["data"]["type"], "RoundLoading");
    assert_eq!(json["payload"]["data"]["round"], 2);
}
