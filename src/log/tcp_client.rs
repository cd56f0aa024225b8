//! Client side of the TCP sink: connects to a running logger and receives
//! its entries as they are broadcast.

use std::io::{self, Read};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::{Buf, BytesMut};

use crate::config::ConfigError;
use crate::log::sinks::tcp_sink::{DEFAULT_TCP_PORT, MESSAGE_DELIMITER};

const DEFAULT_HOST: &str = "127.0.0.1";
const READ_CHUNK: usize = 4096;

/// Reassembles `\f`-delimited messages from an arbitrary chunking of bytes.
#[derive(Debug, Default)]
pub struct MessageSplitter {
    pending: BytesMut,
}

impl MessageSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every message it completes.
    ///
    /// Line breaks and delimiters are stripped; messages that are empty after
    /// stripping are skipped. An unterminated tail stays pending.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let delim = MESSAGE_DELIMITER as u8;

        let mut out = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == delim) {
            let frame = self.pending.split_to(pos);
            self.pending.advance(1);
            let text: String = String::from_utf8_lossy(&frame)
                .chars()
                .filter(|c| !matches!(*c, '\r' | '\n' | MESSAGE_DELIMITER))
                .collect();
            if !text.is_empty() {
                out.push(text);
            }
        }
        out
    }

    /// Bytes received after the last delimiter.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

/// Parses `host[:port]`. An empty string means `127.0.0.1:23`; a missing
/// port means 23.
pub fn parse_endpoint(endpoint: &str) -> Result<(String, u16), ConfigError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Ok((DEFAULT_HOST.to_string(), DEFAULT_TCP_PORT));
    }
    // Bracketed IPv6 literal, e.g. [::1]:9023
    if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| ConfigError::invalid("endpoint", endpoint, "unclosed '['"))?;
        let port = match tail.strip_prefix(':') {
            Some(p) => parse_port(endpoint, p)?,
            None if tail.is_empty() => DEFAULT_TCP_PORT,
            None => return Err(ConfigError::invalid("endpoint", endpoint, "junk after ']'")),
        };
        return Ok((host.to_string(), port));
    }
    match endpoint.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => {
            let host = if host.is_empty() { DEFAULT_HOST } else { host };
            Ok((host.to_string(), parse_port(endpoint, port)?))
        }
        _ => Ok((endpoint.to_string(), DEFAULT_TCP_PORT)),
    }
}

fn parse_port(endpoint: &str, port: &str) -> Result<u16, ConfigError> {
    port.trim()
        .parse()
        .map_err(|e| ConfigError::invalid("endpoint", endpoint, format!("bad port: {e}")))
}

/// What the reader thread reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Message(String),
    /// The connection closed or failed; no more events follow.
    Disconnected,
}

/// A connection to a TCP sink.
///
/// A background thread reads the socket and delivers [`ClientEvent`]s in
/// arrival order.
pub struct TcpLogClient {
    peer: SocketAddr,
    stream: TcpStream,
    events: Receiver<ClientEvent>,
    reader: Option<JoinHandle<()>>,
}

impl TcpLogClient {
    /// Connects to `host[:port]` and starts the reader thread.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a malformed endpoint, otherwise the connect error.
    pub fn connect(endpoint: &str) -> io::Result<Self> {
        let (host, port) = parse_endpoint(endpoint)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let addrs: Vec<SocketAddr> = (host.as_str(), port).to_socket_addrs()?.collect();
        let stream = TcpStream::connect(&addrs[..])?;
        Self::from_stream(stream)
    }

    fn from_stream(stream: TcpStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        let reader_stream = stream.try_clone()?;
        let (tx, rx) = mpsc::channel();

        let reader = thread::Builder::new()
            .name(format!("fanlog-client-{peer}"))
            .spawn(move || {
                let mut stream = reader_stream;
                let mut splitter = MessageSplitter::new();
                let mut buf = [0u8; READ_CHUNK];
                loop {
                    match stream.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            for msg in splitter.push(&buf[..n]) {
                                if tx.send(ClientEvent::Message(msg)).is_err() {
                                    return;
                                }
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            tracing::debug!(%peer, error = %e, "log stream read failed");
                            break;
                        }
                    }
                }
                let _ = tx.send(ClientEvent::Disconnected);
            })?;

        tracing::debug!(%peer, "connected to log stream");
        Ok(Self {
            peer,
            stream,
            events: rx,
            reader: Some(reader),
        })
    }

    #[must_use]
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Blocks for the next event. `None` once the reader has finished and
    /// every event was consumed.
    pub fn recv(&self) -> Option<ClientEvent> {
        self.events.recv().ok()
    }

    /// Like [`recv`](Self::recv) but gives up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Closes the connection and waits for the reader thread.
    pub fn disconnect(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TcpLogClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}
