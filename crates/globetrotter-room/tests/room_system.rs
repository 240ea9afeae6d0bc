//! Integration tests for the room system against a fixed catalog.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use globetrotter_protocol::{ClientEvent, PlayerId, RoomCode, ServerEvent};
use globetrotter_room::{
    PlayerSender, RoomConfig, RoomError, RoomManager, RoomMirror, RoomState,
};
use globetrotter_round::{Destination, DestinationName, Feedback, RoundPhase};
use globetrotter_session::{Catalog, CatalogError};
use tokio::sync::mpsc;
use tokio::time::timeout;

// =========================================================================
// Fixed catalog: always Paris, counts fetches.
// =========================================================================

#[derive(Default)]
struct ParisCatalog {
    fetches: AtomicUsize,
}

impl Catalog for ParisCatalog {
    async fn destination(&self) -> Result<Destination, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
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
        Ok(vec![
            DestinationName::new("1", "Paris"),
            DestinationName::new("2", "Rome"),
            DestinationName::new("3", "Tokyo"),
            DestinationName::new("4", "Lima"),
            DestinationName::new("5", "Oslo"),
        ])
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn manager() -> (RoomManager<ParisCatalog>, Arc<ParisCatalog>) {
    let catalog = Arc::new(ParisCatalog::default());
    (RoomManager::new(Arc::clone(&catalog), RoomConfig::default()), catalog)
}

fn channel() -> (PlayerSender, mpsc::UnboundedReceiver<ServerEvent>) {
    mpsc::unbounded_channel()
}

/// Creates a dummy player sender (receiver is dropped immediately).
fn dummy_sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

/// Receives events until one matches, failing after a second.
async fn recv_until(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    mut pred: impl FnMut(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("room closed the channel");
        if pred(&event) {
            return event;
        }
    }
}

async fn wait_round_started(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    round: u64,
) {
    recv_until(rx, |e| {
        matches!(e, ServerEvent::RoundStarted { view } if view.round == round)
    })
    .await;
}

/// Two players in room `ABC123` with round 1 loaded.
async fn two_player_room() -> (
    RoomManager<ParisCatalog>,
    RoomCode,
    mpsc::UnboundedReceiver<ServerEvent>,
    mpsc::UnboundedReceiver<ServerEvent>,
) {
    let (mut mgr, _) = manager();
    let code = RoomCode::parse("abc123").unwrap();
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();

    mgr.join_or_create(pid(1), "Ann", Some(code.clone()), tx1)
        .await
        .unwrap();
    wait_round_started(&mut rx1, 1).await;
    mgr.join_or_create(pid(2), "Bo", Some(code.clone()), tx2)
        .await
        .unwrap();
    recv_until(&mut rx2, |e| matches!(e, ServerEvent::Snapshot { .. })).await;

    (mgr, code, rx1, rx2)
}

// =========================================================================
// RoomManager
// =========================================================================

#[tokio::test]
async fn test_create_room_returns_unique_codes() {
    let (mut mgr, _) = manager();
    let r1 = mgr.create_room();
    let r2 = mgr.create_room();
    assert_ne!(r1, r2);
    assert_eq!(mgr.room_count(), 2);
}

#[tokio::test]
async fn test_join_unknown_room_not_found() {
    let (mut mgr, _) = manager();
    let code = RoomCode::parse("NOPE").unwrap();
    let result = mgr.join_room(pid(1), "Ann", &code, dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_join_or_create_by_code_shares_room() {
    let (mgr, code, _rx1, _rx2) = two_player_room().await;

    assert_eq!(mgr.room_count(), 1);
    assert_eq!(mgr.player_room(&pid(1)), Some(&code));
    assert_eq!(mgr.player_room(&pid(2)), Some(&code));

    let info = mgr.get_room_info(&code).await.unwrap();
    assert_eq!(info.player_count, 2);
    assert_eq!(info.round, 1);
    assert_eq!(info.state, RoomState::InRound);
}

#[tokio::test]
async fn test_join_or_create_without_code_makes_new_room() {
    let (mut mgr, _) = manager();
    let code = mgr
        .join_or_create(pid(1), "Ann", None, dummy_sender())
        .await
        .unwrap();
    assert_eq!(code.as_str().len(), RoomCode::GENERATED_LEN);
    assert_eq!(mgr.player_room(&pid(1)), Some(&code));
}

#[tokio::test]
async fn test_one_room_at_a_time() {
    let (mut mgr, _) = manager();
    mgr.join_or_create(pid(1), "Ann", None, dummy_sender())
        .await
        .unwrap();
    let other = RoomCode::parse("OTHER").unwrap();
    let result = mgr
        .join_or_create(pid(1), "Ann", Some(other), dummy_sender())
        .await;
    assert!(matches!(result, Err(RoomError::InOtherRoom(..))));
    assert_eq!(mgr.room_count(), 1);
}

#[tokio::test]
async fn test_blank_name_rejected_and_room_cleaned_up() {
    let (mut mgr, _) = manager();
    let result = mgr
        .join_or_create(pid(1), "  ", None, dummy_sender())
        .await;
    assert!(matches!(result, Err(RoomError::BlankName)));
    assert_eq!(mgr.room_count(), 0);
}

#[tokio::test]
async fn test_last_leave_destroys_room() {
    let (mut mgr, code, _rx1, mut rx2) = two_player_room().await;

    mgr.leave_room(pid(1)).await.unwrap();
    recv_until(&mut rx2, |e| {
        matches!(e, ServerEvent::PlayerLeft { player } if *player == PlayerId(1))
    })
    .await;
    assert_eq!(mgr.room_count(), 1);

    mgr.leave_room(pid(2)).await.unwrap();
    assert_eq!(mgr.room_count(), 0);
    assert!(mgr.get_room_info(&code).await.is_err());
    assert!(matches!(
        mgr.leave_room(pid(2)).await,
        Err(RoomError::NoRoom(_))
    ));
}

#[tokio::test]
async fn test_route_event_not_in_room() {
    let (mgr, _) = manager();
    let result = mgr
        .route_event(pid(1), ClientEvent::NextRound { round: 1 })
        .await;
    assert!(matches!(result, Err(RoomError::NoRoom(_))));
}

#[tokio::test]
async fn test_list_rooms_skips_full_rooms() {
    let catalog = Arc::new(ParisCatalog::default());
    let mut mgr = RoomManager::new(catalog, RoomConfig {
        max_players: 1,
        ..RoomConfig::default()
    });
    let open = mgr.create_room();
    mgr.join_or_create(pid(1), "Ann", None, dummy_sender())
        .await
        .unwrap();

    let rooms = mgr.list_rooms().await;
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].code, open);
}

// =========================================================================
// Shared round
// =========================================================================

#[tokio::test]
async fn test_guesses_are_broadcast_to_everyone() {
    let (mgr, _code, mut rx1, mut rx2) = two_player_room().await;

    mgr.route_event(pid(1), ClientEvent::Guess {
        round: 1,
        option: "Rome".into(),
    })
    .await
    .unwrap();

    for rx in [&mut rx1, &mut rx2] {
        let event =
            recv_until(rx, |e| matches!(e, ServerEvent::GuessResolved { .. })).await;
        let ServerEvent::GuessResolved { player, phase, feedback, .. } = event
        else {
            unreachable!()
        };
        assert_eq!(player, pid(1));
        assert_eq!(phase, RoundPhase::ResolvedIncorrectRetry);
        assert!(matches!(feedback, Feedback::IncorrectRetry { attempts_left: 1, .. }));
    }

    mgr.route_event(pid(2), ClientEvent::Guess {
        round: 1,
        option: "Paris".into(),
    })
    .await
    .unwrap();

    let board = recv_until(&mut rx1, |e| matches!(e, ServerEvent::Scoreboard { .. })).await;
    let ServerEvent::Scoreboard { players, score } = board else {
        unreachable!()
    };
    assert_eq!(score.correct, 1);
    assert_eq!(players[1].name, "Bo");
    assert_eq!(players[1].score, 1);
}

#[tokio::test]
async fn test_duplicate_next_round_loads_once() {
    let (mut mgr, catalog) = manager();
    let code = RoomCode::parse("DUP").unwrap();
    let (tx1, mut rx1) = channel();
    mgr.join_or_create(pid(1), "Ann", Some(code.clone()), tx1)
        .await
        .unwrap();
    mgr.join_or_create(pid(2), "Bo", Some(code.clone()), dummy_sender())
        .await
        .unwrap();
    wait_round_started(&mut rx1, 1).await;

    mgr.route_event(pid(1), ClientEvent::Guess {
        round: 1,
        option: "Paris".into(),
    })
    .await
    .unwrap();
    mgr.route_event(pid(1), ClientEvent::NextRound { round: 1 })
        .await
        .unwrap();
    mgr.route_event(pid(2), ClientEvent::NextRound { round: 1 })
        .await
        .unwrap();
    wait_round_started(&mut rx1, 2).await;

    // Let any wrongly spawned fetch land.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let info = mgr.get_room_info(&code).await.unwrap();
    assert_eq!(info.round, 2);
    assert_eq!(info.state, RoomState::InRound);
    assert_eq!(catalog.fetches.load(Ordering::SeqCst), 2);
}

/// Feeds events into `mirror` until `done` holds.
async fn sync_until(
    rx: &mut mpsc::UnboundedReceiver<ServerEvent>,
    mirror: &mut RoomMirror,
    done: impl Fn(&RoomMirror) -> bool,
) {
    while !done(mirror) {
        let event = recv_until(rx, |_| true).await;
        mirror.apply(event);
    }
}

#[tokio::test]
async fn test_mirrors_converge() {
    let (mut mgr, _) = manager();
    let code = RoomCode::parse("MIRROR").unwrap();
    let (tx1, mut rx1) = channel();
    let (tx2, mut rx2) = channel();
    let mut ann = RoomMirror::new();
    let mut bo = RoomMirror::new();

    mgr.join_or_create(pid(1), "Ann", Some(code.clone()), tx1)
        .await
        .unwrap();
    mgr.join_or_create(pid(2), "Bo", Some(code.clone()), tx2)
        .await
        .unwrap();
    sync_until(&mut rx1, &mut ann, |m| m.round().is_some()).await;
    sync_until(&mut rx2, &mut bo, |m| m.round().is_some()).await;
    assert_eq!(ann.room(), Some(&code));
    assert_eq!(bo.me(), Some(pid(2)));

    let guess = bo.guess("Lima").unwrap();
    mgr.route_event(pid(2), guess).await.unwrap();
    let guess = ann.guess("Tokyo").unwrap();
    mgr.route_event(pid(1), guess).await.unwrap();

    let lost = |m: &RoomMirror| {
        m.phase() == Some(RoundPhase::ResolvedIncorrectExhausted)
    };
    sync_until(&mut rx1, &mut ann, lost).await;
    sync_until(&mut rx2, &mut bo, lost).await;

    assert_eq!(ann.round(), bo.round());
    assert_eq!(ann.round().unwrap().attempts_left, 0);
    assert_eq!(ann.feedback(), bo.feedback());
    assert!(matches!(
        ann.feedback(),
        Some(Feedback::IncorrectExhausted { answer, .. }) if answer == "Paris"
    ));
    assert_eq!(ann.next_round(), Some(ClientEvent::NextRound { round: 1 }));
    assert_eq!(bo.guess("Paris"), None);
}
