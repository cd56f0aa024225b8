use std::net::TcpStream;
use std::time::Duration;

use fanlog::log::sinks::TcpSink;
use fanlog::log::{ClientEvent, LogLevel, LogSink, Logger, SinkInfo, SinkWriter, TcpLogClient};

const WAIT: Duration = Duration::from_millis(200);

fn next_message(client: &TcpLogClient) -> Option<String> {
    for _ in 0..25 {
        match client.recv_timeout(WAIT) {
            Some(ClientEvent::Message(m)) => return Some(m),
            Some(ClientEvent::Disconnected) => return None,
            None => {}
        }
    }
    None
}

fn start_sink() -> (Logger, String) {
    let mut tcp = TcpSink::new(0);
    tcp.set_property("address", "127.0.0.1").expect("address");
    let info = SinkInfo {
        name: "net".into(),
        threshold: LogLevel::Info,
    };
    tcp.open(&info).expect("bind");
    let addr = tcp.local_addr().expect("bound").to_string();
    let sink = LogSink::start("net", LogLevel::Info, Box::new(tcp)).expect("start");
    (Logger::with_origin("billing", vec![sink]), addr)
}

#[test]
fn client_gets_welcome_then_entries() {
    let (logger, addr) = start_sink();
    let client = TcpLogClient::connect(&addr).expect("connect");

    let welcome = next_message(&client).expect("welcome");
    assert!(
        welcome.contains("is now connected to the logging service at"),
        "{welcome}"
    );
    assert!(!welcome.contains('\r') && !welcome.contains('\n'));

    // The acceptor registers the client right after the welcome; ping until
    // broadcasts reach it.
    let mut ready = false;
    for _ in 0..25 {
        logger.info("ping");
        if client
            .recv_timeout(WAIT)
            .is_some_and(|e| matches!(e, ClientEvent::Message(_)))
        {
            ready = true;
            break;
        }
    }
    assert!(ready, "client never received a broadcast");

    logger.debug("filtered out");
    logger.warning("payment declined");
    let found = std::iter::from_fn(|| next_message(&client))
        .find(|m| !m.ends_with("Message: ping"))
        .expect("entry");
    assert!(found.starts_with("Severity: WARNING Application: billing"), "{found}");
    assert!(found.ends_with("Message: payment declined"));

    logger.shutdown();
    assert_eq!(
        std::iter::from_fn(|| client.recv_timeout(WAIT))
            .find(|e| *e == ClientEvent::Disconnected),
        Some(ClientEvent::Disconnected)
    );
}

#[test]
fn departed_client_is_dropped_without_affecting_the_logger() {
    let (logger, addr) = start_sink();
    let client = TcpLogClient::connect(&addr).expect("connect");
    assert!(next_message(&client).is_some());
    client.disconnect();

    for i in 0..20 {
        logger.info(&format!("after disconnect {i}"));
    }
    assert!(logger.wait_idle(Duration::from_secs(5)));
    let stats = logger.get_sink("net").expect("net").stats();
    assert_eq!(stats.delivered + stats.failed, 20);
    logger.shutdown();
}

#[test]
fn client_that_never_reads_does_not_stall_the_others() {
    let (logger, addr) = start_sink();
    // Connected but never read from; its socket buffer fills up.
    let _idle = TcpStream::connect(&addr).expect("idle connect");
    let client = TcpLogClient::connect(&addr).expect("connect");
    assert!(next_message(&client).is_some());

    let mut ready = false;
    for _ in 0..25 {
        logger.info("ping");
        if client
            .recv_timeout(WAIT)
            .is_some_and(|e| matches!(e, ClientEvent::Message(_)))
        {
            ready = true;
            break;
        }
    }
    assert!(ready, "client never received a broadcast");

    let bulk = "x".repeat(64 * 1024);
    for _ in 0..200 {
        logger.info(&bulk);
    }
    logger.warning("done");

    let done = std::iter::from_fn(|| next_message(&client)).find(|m| m.ends_with("Message: done"));
    assert!(done.is_some(), "broadcast stalled behind the idle client");

    let stats = logger.get_sink("net").expect("net").stats();
    assert!(stats.failed >= 1, "idle client was never dropped: {stats:?}");
    logger.shutdown();
}
