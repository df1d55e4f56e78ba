use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use rustph::config::MAX_BATCH_SIZE;
use rustph::context::Context;
use rustph::record::Record;
use rustph::schema::FieldSchema;
use rustph::server::serve;
use rustph::source::StaticText;
use rustph::store::Store;
use rustph::Error;

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn send(&mut self, text: &str) {
        self.writer.write_all(text.as_bytes()).await.unwrap();
    }

    /// Reads lines until `results` terminating lines (lines not starting with `-`) arrived.
    async fn read_results(&mut self, results: usize) -> Vec<String> {
        let mut lines = vec![];
        let mut seen = 0;

        while seen < results {
            let mut line = String::new();
            let read = timeout(Duration::from_secs(5), self.reader.read_line(&mut line))
                .await
                .expect("timed out waiting for the server")
                .unwrap();
            assert!(read > 0, "connection closed early, got {lines:?}");

            assert!(line.ends_with("\r\n"), "line without CR LF: {line:?}");
            let line = line.trim_end_matches("\r\n").to_string();
            if !line.starts_with('-') {
                seen += 1;
            }
            lines.push(line);
        }

        lines
    }

    async fn expect_closed(&mut self) {
        let mut rest = vec![];
        let read = timeout(Duration::from_secs(5), self.reader.read_to_end(&mut rest))
            .await
            .expect("timed out waiting for the server to hang up")
            .unwrap();
        assert_eq!(read, 0, "unexpected data: {:?}", String::from_utf8_lossy(&rest));
    }
}

fn records() -> Vec<Record> {
    vec![
        Record::from_iter([
            ("alias", "b-smith"),
            ("name", "Smith Bob"),
            ("species", "human"),
        ]),
        Record::from_iter([("alias", "j-smith"), ("name", "Smith John"), ("species", "elf")]),
        Record::from_iter([("alias", "a-jones"), ("name", "Jones Ann"), ("species", "human")]),
    ]
}

async fn start(store: Store) -> Client {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let schema = FieldSchema::new(["name"], ["species"], ["name", "species"]);
    let ctx = Context::new(store, schema, StaticText::default());
    tokio::spawn(serve(listener, ctx, MAX_BATCH_SIZE));

    let stream = TcpStream::connect(address).await.unwrap();
    let (reader, writer) = stream.into_split();

    Client {
        reader: BufReader::new(reader),
        writer,
    }
}

#[tokio::test]
async fn status_and_siteinfo() {
    let mut client = start(Store::from_records(records())).await;

    client.send("status\r\n").await;
    assert_eq!(
        client.read_results(1).await,
        vec!["201:Database ready, read-only."]
    );

    client.send("siteinfo\r\n").await;
    let lines = client.read_results(1).await;
    assert_eq!(lines.last().map(String::as_str), Some("200:Ok."));
    assert!(lines[0].starts_with("-200:0:version:"));
}

#[tokio::test]
async fn query_session() {
    let mut client = start(Store::from_records(records())).await;

    client.send("id rustph-tests\r\n").await;
    assert_eq!(client.read_results(1).await, vec!["200:Ok."]);

    // `alias` exists but is not filterable.
    client
        .send("query species=\"HUMAN\" return name alias\r\n")
        .await;
    assert_eq!(
        client.read_results(2).await,
        vec![
            "-200:1: name: Smith Bob",
            "-200:2: name: Jones Ann",
            "508:Field not present in requested entries.",
            "200:Ok.",
        ]
    );

    client.send("query name=\"smith john\"\r\n").await;
    assert_eq!(
        client.read_results(1).await,
        vec![
            "-200:1: alias: j-smith",
            "-200:1: name: Smith John",
            "-200:1: species: elf",
            "200:Ok.",
        ]
    );

    client.send("query species=\"dwarf\" return name\r\n").await;
    assert_eq!(
        client.read_results(2).await,
        vec!["502:No matches to your query.", "200:Ok."]
    );

    client.send("query return name\r\n").await;
    assert_eq!(
        client.read_results(1).await,
        vec!["512:Illegal value - no search criteria provided."]
    );

    client.send("quit\r\n").await;
    assert_eq!(client.read_results(1).await, vec!["200:Bye!"]);
    client.expect_closed().await;
}

#[tokio::test]
async fn batch_in_one_write() {
    let mut client = start(Store::from_records(records())).await;

    client
        .send("fields\r\nbogus\r\n\r\nquery alias=\"a-jones\" return species\r\n")
        .await;

    assert_eq!(
        client.read_results(3).await,
        vec![
            "-200:1:alias:max 64",
            "-200:1:alias:Alias",
            "-200:2:name:max 64 Always Default",
            "-200:2:name:Name",
            "-200:3:species:max 64 Indexed Lookup Default",
            "-200:3:species:Species",
            "200:Ok.",
            "514:Unknown command.",
            "-200:1: species: human",
            "-200:1: name: Jones Ann",
            "200:Ok.",
        ]
    );
}

#[tokio::test]
async fn command_split_across_writes() {
    let mut client = start(Store::from_records(records())).await;

    client.send("query alias=\"b-sm").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.send("ith\" return name\r\n").await;

    assert_eq!(
        client.read_results(1).await,
        vec!["-200:1: name: Smith Bob", "200:Ok."]
    );
}

#[tokio::test]
async fn exit_discards_the_rest_of_the_batch() {
    let mut client = start(Store::from_records(records())).await;

    client.send("exit\r\nstatus\r\n").await;

    assert_eq!(client.read_results(1).await, vec!["200:Bye!"]);
    client.expect_closed().await;
}

#[tokio::test]
async fn reload_is_throttled_across_connections() {
    let store = Store::new(
        || -> Result<Vec<Record>, Error> { Ok(records()) },
        Duration::from_secs(3600),
    )
    .unwrap();

    let mut first = start(store.clone()).await;
    let mut second = start(store).await;

    first.send("reload\r\n").await;
    assert_eq!(first.read_results(1).await, vec!["200:Database reloaded."]);

    second.send("reload\r\n").await;
    let lines = second.read_results(1).await;
    assert_eq!(lines.len(), 1);
    assert!(
        lines[0].starts_with("520:Please wait "),
        "unexpected reply {lines:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn status_is_answered_during_a_slow_reload() {
    let loads = AtomicUsize::new(0);
    let store = Store::new(
        move || -> Result<Vec<Record>, Error> {
            // Start up is quick, every reload after it takes a while.
            if loads.fetch_add(1, Ordering::SeqCst) > 0 {
                std::thread::sleep(Duration::from_millis(1500));
            }
            Ok(records())
        },
        Duration::from_secs(3600),
    )
    .unwrap();

    let mut reloading = start(store.clone()).await;
    let mut other = start(store).await;

    reloading.send("reload\r\n").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    other.send("status\r\n").await;
    assert_eq!(
        other.read_results(1).await,
        vec!["201:Database ready, read-only."]
    );

    // The reload in flight already counts against the cooldown.
    other.send("reload\r\n").await;
    let lines = other.read_results(1).await;
    assert!(
        lines[0].starts_with("520:Please wait "),
        "unexpected reply {lines:?}"
    );
    assert!(
        started.elapsed() < Duration::from_millis(1000),
        "blocked behind the reload for {:?}",
        started.elapsed()
    );

    assert_eq!(
        reloading.read_results(1).await,
        vec!["200:Database reloaded."]
    );
}
