use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::ConfigError;
use crate::log::log_item::LogItem;
use crate::log::sink_error::SinkError;
use crate::log::sink_writer::{SinkInfo, SinkWriter};

/// Delimiter terminating every message on the wire.
pub const MESSAGE_DELIMITER: char = '\u{000C}';
pub const DEFAULT_TCP_PORT: u16 = 23;

const ACCEPT_POLL: Duration = Duration::from_millis(25);
/// A client that stops reading is dropped once a send blocks this long.
pub const CLIENT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

struct Client {
    peer: SocketAddr,
    stream: TcpStream,
}

/// Broadcasts every entry to all connected TCP clients.
///
/// Clients connect at any time; each receives a one-line welcome and then
/// every entry as `<text>\f`. A client whose send fails is dropped.
pub struct TcpSink {
    address: String,
    port: u16,
    local_addr: Option<SocketAddr>,
    clients: Arc<Mutex<Vec<Client>>>,
    stop: Arc<AtomicBool>,
    acceptor: Option<JoinHandle<()>>,
}

impl Default for TcpSink {
    fn default() -> Self {
        Self::new(DEFAULT_TCP_PORT)
    }
}

impl TcpSink {
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port,
            local_addr: None,
            clients: Arc::new(Mutex::new(Vec::new())),
            stop: Arc::new(AtomicBool::new(false)),
            acceptor: None,
        }
    }

    /// Listening address once [`open`](SinkWriter::open) has succeeded.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    fn bind(&mut self, name: &str) -> io::Result<()> {
        let listener = TcpListener::bind((self.address.as_str(), self.port))?;
        listener.set_nonblocking(true)?;
        let local = listener.local_addr()?;

        let clients = Arc::clone(&self.clients);
        let stop = Arc::clone(&self.stop);
        let handle = thread::Builder::new()
            .name(format!("sink-{name}-accept"))
            .spawn(move || accept_loop(&listener, &clients, &stop))?;

        tracing::debug!(sink = name, %local, "tcp sink listening");
        self.local_addr = Some(local);
        self.acceptor = Some(handle);
        Ok(())
    }
}

impl SinkWriter for TcpSink {
    fn kind(&self) -> &'static str {
        "tcp"
    }

    fn set_property(&mut self, key: &str, value: &str) -> Result<(), SinkError> {
        let key_lc = key.to_ascii_lowercase();
        if !matches!(key_lc.as_str(), "port" | "address") {
            return Err(ConfigError::UnknownProperty {
                sink_type: "tcp",
                property: key.to_string(),
            }
            .into());
        }
        if self.local_addr.is_some() {
            return Err(ConfigError::invalid(key, value, "listener already bound").into());
        }
        match key_lc.as_str() {
            "port" => {
                self.port = value
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid(key, value, format!("{e}")))?;
            }
            _ => self.address = value.trim().to_string(),
        }
        Ok(())
    }

    /// Binds the listener and starts accepting. Calling it again is a no-op.
    fn open(&mut self, sink: &SinkInfo) -> Result<(), SinkError> {
        if self.local_addr.is_none() {
            self.bind(&sink.name)?;
        }
        Ok(())
    }

    fn write_one(&mut self, sink: &SinkInfo, item: &LogItem) -> Result<(), SinkError> {
        let payload = format!("{item}{MESSAGE_DELIMITER}");
        let mut clients = self.clients.lock();
        let total = clients.len();
        let mut failed = 0;

        clients.retain_mut(|c| match send(&mut c.stream, payload.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                failed += 1;
                tracing::debug!(sink = %sink.name, peer = %c.peer, error = %e, "dropping tcp client");
                let _ = c.stream.shutdown(Shutdown::Both);
                false
            }
        });

        if failed > 0 {
            Err(SinkError::Broadcast { failed, total })
        } else {
            Ok(())
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.acceptor.take() {
            let _ = handle.join();
        }
        for c in self.clients.lock().drain(..) {
            let _ = c.stream.shutdown(Shutdown::Both);
        }
    }
}

impl Drop for TcpSink {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

fn send(stream: &mut TcpStream, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes)?;
    stream.flush()
}

fn accept_loop(listener: &TcpListener, clients: &Mutex<Vec<Client>>, stop: &AtomicBool) {
    let host = host_name();
    while !stop.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((mut stream, peer)) => {
                if let Err(e) = stream
                    .set_nonblocking(false)
                    .and_then(|()| stream.set_nodelay(true))
                    .and_then(|()| stream.set_write_timeout(Some(CLIENT_WRITE_TIMEOUT)))
                {
                    tracing::warn!(%peer, error = %e, "could not configure tcp client");
                    continue;
                }
                let welcome = welcome_message(&peer, &host);
                match send(&mut stream, welcome.as_bytes()) {
                    Ok(()) => clients.lock().push(Client { peer, stream }),
                    Err(e) => tracing::debug!(%peer, error = %e, "welcome failed"),
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                tracing::warn!(error = %e, "tcp accept failed (continuing to accept)");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

/// First message a new client receives.
#[must_use]
pub fn welcome_message(peer: &SocketAddr, host: &str) -> String {
    format!("\r\n{peer} is now connected to the logging service at {host}\r\n{MESSAGE_DELIMITER}")
}

fn host_name() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn welcome_ends_with_delimiter() {
        let peer: SocketAddr = "10.0.0.7:5100".parse().unwrap();
        let msg = welcome_message(&peer, "box");
        assert!(msg.ends_with('\u{000C}'));
        assert!(msg.contains("10.0.0.7:5100 is now connected to the logging service at box"));
    }

    #[test]
    fn port_is_validated_and_frozen_after_open() {
        let mut sink = TcpSink::default();
        assert!(sink.set_property("PORT", "not-a-port").is_err());
        sink.set_property("Port", "0").unwrap();
        sink.set_property("address", "127.0.0.1").unwrap();

        let info = SinkInfo {
            name: "t".into(),
            threshold: crate::log::log_level::LogLevel::Debug,
        };
        sink.open(&info).unwrap();
        assert!(sink.local_addr().is_some());
        assert!(sink.set_property("port", "4000").is_err());
        sink.close();
    }
}
