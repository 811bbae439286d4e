//! PRIVMSG and NOTICE routing: channels, nicknames, away, and error numerics.

mod common;

use std::time::Duration;

use common::TestServer;

#[tokio::test]
async fn channel_privmsg_reaches_everyone_but_the_sender() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();
    let mut carol = server.connect_registered("carol").await.unwrap();
    alice.join("#room").await.unwrap();
    bob.join("#room").await.unwrap();
    carol.join("#room").await.unwrap();
    alice.recv_until("carol").await.unwrap();
    bob.recv_until("carol").await.unwrap();

    alice.send("PRIVMSG #room :hello").await.unwrap();
    for peer in [&mut bob, &mut carol] {
        let line = peer.recv().await.unwrap();
        assert!(
            line.starts_with(":alice!alice@") && line.ends_with(" PRIVMSG #room :hello"),
            "got {}",
            line
        );
    }
    assert!(alice.drain_for(Duration::from_millis(200)).await.is_empty());
}

#[tokio::test]
async fn notice_to_channel_uses_notice_verb() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();
    alice.join("#room").await.unwrap();
    bob.join("#room").await.unwrap();
    alice.recv_until(" JOIN #room").await.unwrap();

    alice.send("NOTICE #room :heads up").await.unwrap();
    let line = bob.recv().await.unwrap();
    assert!(line.ends_with(" NOTICE #room :heads up"), "got {}", line);
}

#[tokio::test]
async fn direct_privmsg_matches_nickname_case_insensitively() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();

    alice.send("PRIVMSG BOB :psst").await.unwrap();
    let line = bob.recv().await.unwrap();
    assert!(
        line.starts_with(":alice!alice@") && line.ends_with(" PRIVMSG bob :psst"),
        "got {}",
        line
    );
}

#[tokio::test]
async fn away_target_notifies_the_sender() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();
    let mut bob = server.connect_registered("bob").await.unwrap();

    bob.send("AWAY :gone fishing").await.unwrap();
    bob.recv_until(" 306 ").await.unwrap();

    alice.send("PRIVMSG bob :you there?").await.unwrap();
    assert_eq!(
        alice.recv().await.unwrap(),
        ":localhost 301 alice bob :gone fishing"
    );
    // The message is still delivered.
    let line = bob.recv().await.unwrap();
    assert!(line.ends_with(" PRIVMSG bob :you there?"), "got {}", line);

    bob.send("AWAY").await.unwrap();
    bob.recv_until(" 305 ").await.unwrap();
    alice.send("PRIVMSG bob :welcome back").await.unwrap();
    assert!(alice.drain_for(Duration::from_millis(200)).await.is_empty());
}

#[tokio::test]
async fn messaging_error_numerics() {
    let server = TestServer::spawn().await.expect("spawn server");
    let mut alice = server.connect_registered("alice").await.unwrap();

    alice.send("PRIVMSG").await.unwrap();
    assert_eq!(
        alice.recv().await.unwrap(),
        ":localhost 411 alice :No recipient given (PRIVMSG)"
    );
    alice.send("NOTICE").await.unwrap();
    assert_eq!(
        alice.recv().await.unwrap(),
        ":localhost 411 alice :No recipient given (NOTICE)"
    );
    alice.send("PRIVMSG bob").await.unwrap();
    assert_eq!(
        alice.recv().await.unwrap(),
        ":localhost 412 alice :No text to send"
    );
    // Nonexistent target: 401 and nothing is forwarded anywhere.
    alice.send("PRIVMSG nobody :hi").await.unwrap();
    assert_eq!(
        alice.recv().await.unwrap(),
        ":localhost 401 alice nobody :No such nick/channel"
    );
}
