//! End-to-end chat scenarios over in-memory byte streams

use std::time::Duration;

use chat_lobby::{handle_connection, inspect, ClientId, Config, Lobby, LobbyEvent};
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};
use tokio::sync::mpsc;

const WELCOME: &str = "Welcome to the server! Type \"/help\" to get a list of commands.";

struct Peer {
    id: ClientId,
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Peer {
    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();
    }

    async fn recv(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
    }

    async fn expect(&mut self, expected: &str) {
        assert_eq!(self.recv().await.as_deref(), Some(expected));
    }
}

fn start(config: &Config) -> mpsc::Sender<LobbyEvent> {
    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(Lobby::new(config, rx).run());
    tx
}

async fn connect(events: &mpsc::Sender<LobbyEvent>, config: &Config) -> Peer {
    let (server, client) = tokio::io::duplex(64 * 1024);
    let session = handle_connection(server, events.clone(), config)
        .await
        .unwrap();
    let (read, writer) = tokio::io::split(client);
    Peer {
        id: session.client_id,
        lines: BufReader::new(read).lines(),
        writer,
    }
}

#[tokio::test]
async fn create_join_chat_and_list() {
    let config = Config::default();
    let events = start(&config);
    let mut alice = connect(&events, &config).await;
    alice.expect(WELCOME).await;

    alice.send("/create general").await;
    alice.expect("Notice: Created chat room \"general\".").await;

    // Fresh room: nothing to replay, only the join notice
    alice.send("/join general").await;
    alice
        .expect("Notice: \"Anonymous\" joined the chat room.")
        .await;

    alice.send("hi").await;
    let line = alice.recv().await.unwrap();
    assert!(line.ends_with(" - Anonymous: hi"), "got {:?}", line);

    alice.send("/list").await;
    alice.expect("").await;
    alice.expect("Chat Rooms:").await;
    alice.expect("general").await;
    alice.expect("").await;

    let snapshot = inspect(&events).await.unwrap();
    let history = &snapshot.room("general").unwrap().history;
    assert!(history.last().unwrap().ends_with(" - Anonymous: hi"));
}

#[tokio::test]
async fn rename_is_announced_to_the_room() {
    let config = Config::default();
    let events = start(&config);
    let mut a = connect(&events, &config).await;
    let mut b = connect(&events, &config).await;
    a.expect(WELCOME).await;
    b.expect(WELCOME).await;

    a.send("/create general").await;
    a.expect("Notice: Created chat room \"general\".").await;
    a.send("/join general").await;
    a.expect("Notice: \"Anonymous\" joined the chat room.").await;
    b.send("/join general").await;
    // History replay, then the live join notice
    b.expect("Notice: \"Anonymous\" joined the chat room.").await;
    b.expect("Notice: \"Anonymous\" joined the chat room.").await;
    a.expect("Notice: \"Anonymous\" joined the chat room.").await;

    a.send("/name Bob").await;
    let rename = "Notice: \"Anonymous\" changed their name to \"Bob\".";
    a.expect(rename).await;
    b.expect(rename).await;

    a.send("hello").await;
    assert!(a.recv().await.unwrap().ends_with(" - Bob: hello"));
    assert!(b.recv().await.unwrap().ends_with(" - Bob: hello"));
}

#[tokio::test]
async fn leave_from_lobby_is_an_error() {
    let config = Config::default();
    let events = start(&config);
    let mut peer = connect(&events, &config).await;
    peer.expect(WELCOME).await;
    let before = inspect(&events).await.unwrap();

    peer.send("/leave").await;
    peer.expect("Error: You cannot leave the lobby.").await;

    let after = inspect(&events).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn second_client_rejected_at_capacity_one() {
    let config = Config {
        max_clients: 1,
        ..Config::default()
    };
    let events = start(&config);
    let mut x = connect(&events, &config).await;
    x.expect(WELCOME).await;

    let mut y = connect(&events, &config).await;
    y.expect("Server is full. Please try reconnecting later.")
        .await;
    assert_eq!(y.recv().await, None);

    let snapshot = inspect(&events).await.unwrap();
    assert_eq!(snapshot.clients.len(), 1);
    assert!(snapshot.client(x.id).is_some());
    assert!(snapshot.client(y.id).is_none());

    // The admitted client is unaffected
    x.send("/create solo").await;
    x.expect("Notice: Created chat room \"solo\".").await;
}

#[tokio::test]
async fn history_is_replayed_in_order() {
    let config = Config::default();
    let events = start(&config);
    let mut a = connect(&events, &config).await;
    a.expect(WELCOME).await;
    a.send("/create general").await;
    a.send("/join general").await;
    a.send("one").await;
    a.send("two").await;
    a.expect("Notice: Created chat room \"general\".").await;
    a.expect("Notice: \"Anonymous\" joined the chat room.").await;
    a.recv().await;
    a.recv().await;

    let mut b = connect(&events, &config).await;
    b.expect(WELCOME).await;
    b.send("/join general").await;
    b.expect("Notice: \"Anonymous\" joined the chat room.").await;
    assert!(b.recv().await.unwrap().ends_with(": one"));
    assert!(b.recv().await.unwrap().ends_with(": two"));
    b.expect("Notice: \"Anonymous\" joined the chat room.").await;

    a.send("three").await;
    assert!(b.recv().await.unwrap().ends_with(": three"));
}
