//! End-to-end tests: `LobbyClient` against a real lobby server.

use std::time::Duration;

use huddle::HuddleServerBuilder;
use huddle_client::{ClientError, LobbyClient, Phase, Readiness, Update};
use huddle_protocol::ParticipantId;

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port and returns its `ws://` URL.
async fn start_server() -> String {
    let server = HuddleServerBuilder::new()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");
    let addr = server.local_addr().expect("should have local addr");

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    format!("ws://{addr}")
}

async fn next(client: &mut LobbyClient) -> Update {
    tokio::time::timeout(Duration::from_secs(2), client.next_update())
        .await
        .expect("update should arrive in time")
        .expect("next_update")
        .expect("connection should be open")
}

/// Registers and waits for both the id and the first roster.
async fn join(url: &str, name: &str) -> LobbyClient {
    let mut client = LobbyClient::connect(url).await.expect("connect");
    client.register(name).await.expect("register");
    assert!(matches!(next(&mut client).await, Update::Registered(_)));
    assert_eq!(next(&mut client).await, Update::Roster);
    client
}

fn names(client: &LobbyClient) -> Vec<String> {
    client.state().roster().iter().map(|p| p.name.clone()).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_register_assigns_id_and_roster() {
    let url = start_server().await;
    let client = join(&url, "Alice").await;

    assert_eq!(client.state().phase(), Phase::InLobby);
    assert_eq!(client.state().id(), Some(ParticipantId(1)));
    assert_eq!(names(&client), ["Alice"]);
    assert_eq!(client.state().readiness(), Some(Readiness::NotReady));
}

#[tokio::test]
async fn test_toggle_ready_is_reflected_after_broadcast() {
    let url = start_server().await;
    let mut alice = join(&url, "Alice").await;
    let mut bob = join(&url, "Bob").await;
    assert_eq!(next(&mut alice).await, Update::Roster);
    assert_eq!(names(&alice), ["Alice", "Bob"]);

    bob.toggle_ready().await.expect("toggle");
    // Not applied locally until the server says so.
    assert_eq!(bob.state().readiness(), Some(Readiness::NotReady));

    assert_eq!(next(&mut bob).await, Update::Roster);
    assert_eq!(bob.state().readiness(), Some(Readiness::Ready));

    assert_eq!(next(&mut alice).await, Update::Roster);
    assert!(alice.state().roster()[1].ready);
    assert_eq!(alice.state().readiness(), Some(Readiness::NotReady));
}

#[tokio::test]
async fn test_request_roster_before_register() {
    let url = start_server().await;
    let _alice = join(&url, "Alice").await;

    let mut viewer = LobbyClient::connect(&url).await.expect("connect");
    viewer.request_roster().await.expect("request");
    assert_eq!(next(&mut viewer).await, Update::Roster);
    assert_eq!(names(&viewer), ["Alice"]);
    assert_eq!(viewer.state().phase(), Phase::Unregistered);
    assert_eq!(viewer.state().readiness(), None);
}

#[tokio::test]
async fn test_invalid_actions_fail_locally() {
    let url = start_server().await;
    let mut client = LobbyClient::connect(&url).await.expect("connect");

    assert!(matches!(client.register("  ").await, Err(ClientError::EmptyName)));
    assert!(matches!(
        client.toggle_ready().await,
        Err(ClientError::InvalidPhase { .. })
    ));
    assert_eq!(client.state().phase(), Phase::Unregistered);
}

#[tokio::test]
async fn test_register_retry_after_server_rejects_name() {
    let url = start_server().await;
    let mut client = LobbyClient::connect(&url).await.expect("connect");

    // Longer than the server's default name limit: dropped without a reply.
    client.register(&"x".repeat(40)).await.expect("first register");
    assert_eq!(client.state().phase(), Phase::AwaitingId);

    client.register("Alice").await.expect("retry");
    assert_eq!(next(&mut client).await, Update::Registered(ParticipantId(1)));
    assert_eq!(next(&mut client).await, Update::Roster);
    assert_eq!(client.state().phase(), Phase::InLobby);
    assert_eq!(names(&client), ["Alice"]);
}

#[tokio::test]
async fn test_peer_leaving_updates_roster() {
    let url = start_server().await;
    let mut alice = join(&url, "Alice").await;
    let mut bob = join(&url, "Bob").await;
    assert_eq!(next(&mut alice).await, Update::Roster);

    bob.close().await.expect("close");
    assert_eq!(bob.state().phase(), Phase::Closed);
    assert!(bob.next_update().await.expect("closed client").is_none());

    assert_eq!(next(&mut alice).await, Update::Roster);
    assert_eq!(names(&alice), ["Alice"]);
}
