use std::io::{self, Write};
use std::{env, process};

use fanlog::log::{ClientEvent, TcpLogClient};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // --- Parse CLI args ----------------------------------------------------
    //
    // Supported:
    //   fanlog-tail                 -> 127.0.0.1:23
    //   fanlog-tail logs.local      -> logs.local:23
    //   fanlog-tail logs.local:9023

    let args: Vec<String> = env::args().collect();
    let endpoint = match args.len() {
        1 => String::new(),
        2 => args[1].clone(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  {}               # connect to 127.0.0.1:23", args[0]);
            eprintln!("  {} HOST[:PORT]   # e.g. logs.local:9023", args[0]);
            process::exit(1);
        }
    };

    // --- Diagnostics go to stderr, log entries to stdout -------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let client = match TcpLogClient::connect(&endpoint) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[fanlog-tail] cannot connect to {endpoint:?}: {e}");
            process::exit(2);
        }
    };
    eprintln!("[fanlog-tail] connected to {}", client.peer_addr());

    let stdout = io::stdout();
    while let Some(event) = client.recv() {
        match event {
            ClientEvent::Message(text) => {
                let mut out = stdout.lock();
                writeln!(out, "{text}")?;
                out.flush()?;
            }
            ClientEvent::Disconnected => {
                eprintln!("[fanlog-tail] disconnected");
                break;
            }
        }
    }
    client.disconnect();
    Ok(())
}
