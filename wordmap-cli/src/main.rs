//! wordmap — host or join a live word cloud from the terminal.
//!
//! `wordmap host` claims a room code and prints every change to the
//! aggregated cloud; `wordmap join CODE` connects to a running host and
//! submits one word per line of stdin.

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use wordmap_collab::{
    HostEvent, HostSession, JoinEvent, JoinSession, TransportConfig, WsTransport,
};
use wordmap_core::{color_for, RoomCode, WordEntry};
use wordmap_layout::{layout_seeded, HeuristicMeasure};

/// Seed for the terminal preview so repeated renders of the same cloud
/// keep each word in place.
const LAYOUT_SEED: u64 = 0x776f7264;

#[derive(Parser)]
#[command(name = "wordmap", about = "Live collaborative word clouds", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host a new room and print the code to share.
    Host {
        /// Interface to listen on.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on.
        #[arg(long, default_value_t = 9090)]
        port: u16,
        /// Web origin used when printing the join URL.
        #[arg(long, default_value = "http://localhost:5173")]
        origin: String,
    },
    /// Join an existing room and submit words from stdin.
    Join {
        /// The six-character room code.
        code: String,
        /// Host to connect to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to connect to.
        #[arg(long, default_value_t = 9090)]
        port: u16,
    },
}

fn config_for(host: String, port: u16) -> TransportConfig {
    TransportConfig {
        host,
        port,
        ..TransportConfig::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Host { host, port, origin } => run_host(host, port, origin).await,
        Command::Join { code, host, port } => run_join(code, host, port).await,
    }
}

async fn run_host(
    host: String,
    port: u16,
    origin: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = WsTransport::new();
    let config = config_for(host, port);
    let mut session = HostSession::open(&transport, &config).await?;
    let mut events = session.take_event_rx().expect("fresh session");

    println!("Room code: {}", session.code());
    println!("Join URL:  {}", session.join_url(&origin));
    println!("Waiting for participants (Ctrl-C to close the room)...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.close().await;
            }
            event = events.recv() => match event {
                Some(HostEvent::CodeReady(code)) => {
                    log::info!("room {code} ready");
                }
                Some(HostEvent::ParticipantCountChanged(count)) => {
                    println!("-- {count} participant(s) connected");
                }
                Some(HostEvent::CloudChanged(entries)) => {
                    render_cloud(&entries);
                }
                Some(HostEvent::Closed) | None => {
                    println!("Room closed.");
                    return Ok(());
                }
            },
        }
    }
}

async fn run_join(
    code: String,
    host: String,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let code: RoomCode = code.parse()?;
    let transport = WsTransport::new();
    let config = config_for(host, port);
    let mut session = JoinSession::connect(&transport, code, &config).await?;
    let mut events = session.take_event_rx().expect("fresh session");

    println!("Joined room {}. Type a word and press Enter.", session.code());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !session.submit(&line).await? {
                        log::debug!("submission skipped");
                    }
                }
                None => {
                    session.leave();
                    return Ok(());
                }
            },
            event = events.recv() => match event {
                Some(JoinEvent::Connected) => {
                    log::info!("connected");
                }
                Some(JoinEvent::CloudUpdated(entries)) => {
                    render_cloud(&entries);
                }
                Some(JoinEvent::Disconnected) => {
                    println!("Host closed the room.");
                    return Ok(());
                }
                Some(JoinEvent::Error(message)) => {
                    eprintln!("Connection lost: {message}");
                    return Err(message.into());
                }
                None => return Ok(()),
            },
        }
    }
}

/// One line per word with its layout placement, largest first.
fn render_cloud(entries: &[WordEntry]) {
    if entries.is_empty() {
        return;
    }
    let nodes = layout_seeded(entries, &HeuristicMeasure, LAYOUT_SEED);
    // Colors follow insertion order, so index before sorting for display.
    let mut by_size: Vec<_> = nodes.iter().enumerate().collect();
    by_size.sort_by(|(_, a), (_, b)| {
        b.font_size
            .partial_cmp(&a.font_size)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.text.cmp(&b.text))
    });

    let total: u32 = entries.iter().map(|e| e.count).sum();
    println!("---- {} word(s), {} submission(s) ----", entries.len(), total);
    for (index, node) in by_size {
        println!(
            "  {:>3}pt {:>7} x{:<4} at ({:>6.1}, {:>6.1}) {}",
            node.font_size.round() as i32,
            node.text,
            node.count,
            node.x,
            node.y,
            color_for(index),
        );
    }
}
