//! Integration tests for the lobby actor: concurrency, ordering, fan-out.

use std::time::Duration;

use huddle_lobby::{spawn_lobby, LobbyConfig, LobbyError, LobbyHandle, Subscription};
use huddle_protocol::{CborCodec, Codec, LobbyEvent, ParticipantId, Roster};
use huddle_transport::ConnectionId;

// =========================================================================
// Helpers
// =========================================================================

fn lobby() -> LobbyHandle {
    spawn_lobby(LobbyConfig::default(), CborCodec)
}

fn conn(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

/// Waits for the next frame on a subscription and decodes it.
async fn next_event(sub: &mut Subscription) -> LobbyEvent {
    let frame = tokio::time::timeout(Duration::from_secs(1), sub.frames.recv())
        .await
        .expect("frame should arrive")
        .expect("queue should be open");
    CborCodec.decode(&frame).expect("frame should decode")
}

async fn next_roster(sub: &mut Subscription) -> Roster {
    match next_event(sub).await {
        LobbyEvent::PlayersInLobby { players } => players,
        other => panic!("expected PlayersInLobby, got {other:?}"),
    }
}

fn names(roster: &Roster) -> Vec<&str> {
    roster.iter().map(|p| p.name.as_str()).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_concurrent_adds_get_unique_sequential_ids() {
    let handle = spawn_lobby(
        LobbyConfig {
            max_participants: 64,
            ..LobbyConfig::default()
        },
        CborCodec,
    );

    let mut tasks = Vec::new();
    for i in 0..32 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle.add_participant(&format!("p{i}")).await
        }));
    }

    let mut ids: Vec<u64> = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap().expect("add should succeed").0);
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=32).collect::<Vec<u64>>(), "no duplicates, no gaps");

    // Roster order matches commit order, which is id order.
    let roster = handle.snapshot().await.unwrap();
    let roster_ids: Vec<u64> = roster.iter().map(|p| p.id.0).collect();
    assert_eq!(roster_ids, (1..=32).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_register_sends_your_id_before_roster() {
    let handle = lobby();
    let mut sub = handle.attach(conn(1)).await.unwrap();

    let id = handle.register(Some(conn(1)), "Alice").await.unwrap();

    assert_eq!(next_event(&mut sub).await, LobbyEvent::YourId { id });
    let roster = next_roster(&mut sub).await;
    assert_eq!(names(&roster), ["Alice"]);
    assert_eq!(roster[0].id, id);
}

#[tokio::test]
async fn test_register_invalid_name_sends_nothing() {
    let handle = lobby();
    let mut sub = handle.attach(conn(1)).await.unwrap();

    let result = handle.register(Some(conn(1)), "   ").await;
    assert!(matches!(result, Err(LobbyError::InvalidName(_))));
    assert!(handle.snapshot().await.unwrap().is_empty());

    // Nothing was queued for the failed attempt.
    assert!(sub.frames.try_recv().is_err());
}

#[tokio::test]
async fn test_every_mutation_is_broadcast_to_everyone() {
    let handle = lobby();
    let mut a = handle.attach(conn(1)).await.unwrap();
    let mut b = handle.attach(conn(2)).await.unwrap();

    let alice = handle.register(Some(conn(1)), "Alice").await.unwrap();
    assert_eq!(next_event(&mut a).await, LobbyEvent::YourId { id: alice });
    assert_eq!(names(&next_roster(&mut a).await), ["Alice"]);
    assert_eq!(names(&next_roster(&mut b).await), ["Alice"]);

    let bob = handle.register(Some(conn(2)), "Bob").await.unwrap();
    assert_eq!(names(&next_roster(&mut a).await), ["Alice", "Bob"]);
    assert_eq!(next_event(&mut b).await, LobbyEvent::YourId { id: bob });
    assert_eq!(names(&next_roster(&mut b).await), ["Alice", "Bob"]);

    assert_eq!(handle.toggle_ready(alice).await, Ok(true));
    for sub in [&mut a, &mut b] {
        let roster = next_roster(sub).await;
        assert!(roster[0].ready, "Alice should be ready");
        assert!(!roster[1].ready, "Bob should not be ready");
    }

    assert_eq!(handle.remove_participant(alice).await, Ok(true));
    assert_eq!(names(&next_roster(&mut b).await), ["Bob"]);
}

#[tokio::test]
async fn test_failed_mutations_are_not_broadcast() {
    let handle = lobby();
    let mut sub = handle.attach(conn(1)).await.unwrap();

    assert_eq!(
        handle.toggle_ready(ParticipantId(77)).await,
        Err(LobbyError::UnknownParticipant(ParticipantId(77)))
    );
    assert_eq!(handle.remove_participant(ParticipantId(77)).await, Ok(false));

    // Round-trip through the actor so any stray frame would be queued by now.
    handle.snapshot().await.unwrap();
    assert!(sub.frames.try_recv().is_err());
}

#[tokio::test]
async fn test_send_roster_is_unicast() {
    let handle = lobby();
    handle.add_participant("Alice").await.unwrap();
    let mut a = handle.attach(conn(1)).await.unwrap();
    let mut b = handle.attach(conn(2)).await.unwrap();

    handle.send_roster(conn(1)).await.unwrap();

    assert_eq!(names(&next_roster(&mut a).await), ["Alice"]);
    handle.snapshot().await.unwrap();
    assert!(b.frames.try_recv().is_err());
}

#[tokio::test]
async fn test_disconnect_removes_participant_once() {
    let handle = lobby();
    let mut observer = handle.attach(conn(1)).await.unwrap();
    let _leaver = handle.attach(conn(2)).await.unwrap();
    let id = handle.register(Some(conn(2)), "Leaver").await.unwrap();
    assert_eq!(names(&next_roster(&mut observer).await), ["Leaver"]);

    handle.disconnect(conn(2), Some(id)).await.unwrap();
    assert!(next_roster(&mut observer).await.is_empty());

    // A duplicate notification is a no-op: no further broadcast.
    handle.disconnect(conn(2), Some(id)).await.unwrap();
    assert_eq!(handle.remove_participant(id).await, Ok(false));
    assert!(observer.frames.try_recv().is_err());
}

#[tokio::test]
async fn test_slow_connection_is_evicted_without_stalling_others() {
    let handle = spawn_lobby(
        LobbyConfig {
            outbound_capacity: 2,
            ..LobbyConfig::default()
        },
        CborCodec,
    );
    let mut slow = handle.attach(conn(1)).await.unwrap();
    let mut fast = handle.attach(conn(2)).await.unwrap();

    for i in 0..5 {
        handle.add_participant(&format!("p{i}")).await.unwrap();
        next_roster(&mut fast).await;
    }

    let evicted = tokio::time::timeout(Duration::from_secs(1), &mut slow.evicted)
        .await
        .expect("eviction should be signalled");
    assert_eq!(evicted, Ok(()));

    // The fast connection keeps receiving.
    handle.add_participant("late").await.unwrap();
    assert_eq!(next_roster(&mut fast).await.len(), 6);
}

#[tokio::test]
async fn test_snapshots_never_go_backwards_per_connection() {
    let handle = lobby();
    let mut sub = handle.attach(conn(1)).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..10 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            handle.add_participant(&format!("p{i}")).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut last = 0;
    for _ in 0..10 {
        let len = next_roster(&mut sub).await.len();
        assert!(len > last, "roster went from {last} to {len}");
        last = len;
    }
}
